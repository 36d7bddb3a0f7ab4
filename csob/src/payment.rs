//! The payment request and its finalization.
//!
//! A request goes through two phases:
//!
//! 1. [`PaymentRequest`] is a builder. Everything except the order number is
//!    optional, and the mutators validate their input eagerly.
//! 2. [`PaymentRequest::check_and_prepare`] consumes the builder, resolves
//!    every default from the [`MerchantConfig`], runs the checks that need
//!    the configuration and returns a [`PreparedPayment`]. Only a prepared
//!    payment can be signed, and the only thing that can change on it
//!    afterwards is the pay ID the gateway assigns.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//!
//! use csob::config::{KeyMaterial, MerchantConfig};
//! use csob::payment::PaymentRequest;
//! use rust_decimal::Decimal;
//!
//! let config = MerchantConfig::new(
//!     "A1029DTmM7",
//!     "Test shop",
//!     KeyMaterial { path: PathBuf::from("merchant.key"), password: None },
//! )
//! .with_return_url("https://shop.example/return");
//!
//! let mut request = PaymentRequest::new("1234");
//! request
//!     .add_cart_item("Coffee", 1, Decimal::new(12_000, 0), "")?
//!     .add_cart_item("Shipping", 1, Decimal::new(9_950, 1), "DPD")?;
//!
//! let payment = request.check_and_prepare(&config)?;
//! assert_eq!(payment.total_amount(), 12_995);
//! # Ok::<(), csob::error::ValidationError>(())
//! ```

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::cart::{self, CartItem, MAX_CART_ITEMS};
use crate::config::MerchantConfig;
use crate::customer::{Customer, CustomerData};
use crate::error::ValidationError;
use crate::order::{AddressData, Order};
use crate::proto::{
    DEFAULT_CURRENCY, DEFAULT_LANGUAGE, DEFAULT_PAY_METHOD, DEFAULT_TTL_SEC, MerchantData,
    OrderType, PayOperation, ReturnMethod,
};
use crate::text;
use crate::timestamp::Dttm;

static ORDER_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,10}$").expect("valid order number pattern"));

const DESCRIPTION_MAX_LEN: usize = 240;
const CUSTOMER_ID_MAX_LEN: usize = 50;

/// A payment request being assembled by the integrator.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    order_no: String,
    currency: Option<String>,
    close_payment: Option<bool>,
    return_url: Option<String>,
    return_method: Option<ReturnMethod>,
    description: Option<String>,
    customer_id: Option<String>,
    language: Option<String>,
    pay_operation: Option<PayOperation>,
    pay_method: Option<String>,
    ttl_sec: Option<u32>,
    logo_version: Option<u32>,
    color_scheme_version: Option<u32>,
    merchant_data: Option<MerchantData>,
    cart: Vec<CartItem>,
    customer: Option<Customer>,
    order: Option<Order>,
}

impl PaymentRequest {
    /// Starts a request for the given order number.
    ///
    /// The order number (the variable symbol of the payment) must be 1 to 10
    /// digits; this is checked by [`Self::check_and_prepare`].
    #[must_use]
    pub fn new(order_no: impl Into<String>) -> Self {
        Self {
            order_no: order_no.into(),
            currency: None,
            close_payment: None,
            return_url: None,
            return_method: None,
            description: None,
            customer_id: None,
            language: None,
            pay_operation: None,
            pay_method: None,
            ttl_sec: None,
            logo_version: None,
            color_scheme_version: None,
            merchant_data: None,
            cart: Vec::new(),
            customer: None,
            order: None,
        }
    }

    /// Starts a request with the commonly used optional values.
    ///
    /// Empty merchant data and an empty customer ID are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MerchantDataTooLong`] if the merchant data
    /// is too long once encoded.
    pub fn with_options(
        order_no: impl Into<String>,
        merchant_data: Option<&[u8]>,
        customer_id: Option<String>,
        one_click: Option<bool>,
    ) -> Result<Self, ValidationError> {
        let mut request = Self::new(order_no);
        if let Some(data) = merchant_data.filter(|d| !d.is_empty()) {
            request.set_merchant_data(data)?;
        }
        if let Some(id) = customer_id.filter(|id| !id.is_empty()) {
            request.set_customer_id(id);
        }
        if let Some(one_click) = one_click {
            request.set_one_click_payment(one_click);
        }
        Ok(request)
    }

    /// Adds one cart line. The gateway accepts one or two.
    ///
    /// `amount` is the total price of the line (all pieces together) in
    /// hundredths of the currency unit, rounded half away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CartFull`] if the cart already holds two
    /// items, or [`ValidationError::InvalidQuantity`] if `quantity` is zero.
    /// The cart is left unchanged on error.
    pub fn add_cart_item(
        &mut self,
        name: &str,
        quantity: u32,
        amount: Decimal,
        description: &str,
    ) -> Result<&mut Self, ValidationError> {
        if self.cart.len() >= MAX_CART_ITEMS {
            return Err(ValidationError::CartFull {
                max: MAX_CART_ITEMS,
            });
        }
        self.cart
            .push(CartItem::new(name, quantity, amount, description)?);
        Ok(self)
    }

    /// Sets the extended customer data, replacing any previous value.
    ///
    /// Invalid phone numbers are dropped silently. If no usable field is
    /// left, the request carries no customer record at all.
    pub fn set_customer_data(&mut self, data: CustomerData) -> &mut Self {
        self.customer = Customer::from_data(data);
        self
    }

    /// Sets the extended order data, replacing any previous value.
    ///
    /// `order_type` defaults to [`OrderType::Purchase`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the billing address, or the shipping
    /// address when given, is incomplete or has a malformed country code.
    pub fn set_order_data(
        &mut self,
        billing: AddressData,
        address_match: bool,
        shipping: Option<AddressData>,
        order_type: Option<OrderType>,
    ) -> Result<&mut Self, ValidationError> {
        self.order = Some(Order::new(billing, address_match, shipping, order_type)?);
        Ok(self)
    }

    /// Sets arbitrary data the gateway returns when the customer comes back.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MerchantDataTooLong`] if the data exceeds
    /// 255 characters after base64 encoding.
    pub fn set_merchant_data(&mut self, data: impl AsRef<[u8]>) -> Result<&mut Self, ValidationError> {
        self.merchant_data = Some(MerchantData::encode(data)?);
        Ok(self)
    }

    /// Sets merchant data that is already base64-encoded. The value is
    /// passed through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MerchantDataTooLong`] if the value is
    /// longer than 255 characters.
    pub fn set_merchant_data_encoded(
        &mut self,
        encoded: impl Into<String>,
    ) -> Result<&mut Self, ValidationError> {
        self.merchant_data = Some(MerchantData::from_encoded(encoded)?);
        Ok(self)
    }

    /// Marks the payment as a one-click payment template, or back as a
    /// regular payment.
    pub fn set_one_click_payment(&mut self, one_click: bool) -> &mut Self {
        self.pay_operation = Some(if one_click {
            PayOperation::OneClick
        } else {
            PayOperation::Payment
        });
        self
    }

    /// Marks the payment as a recurrent payment template, or back as a
    /// regular payment.
    #[deprecated(note = "recurrent payments were replaced by one-click payments in eAPI 1.7, use `set_one_click_payment`")]
    pub fn set_recurrent_payment(&mut self, recurrent: bool) -> &mut Self {
        #[cfg(feature = "telemetry")]
        tracing::warn!(
            order_no = %self.order_no,
            "set_recurrent_payment() is deprecated, use set_one_click_payment() instead"
        );
        self.pay_operation = Some(if recurrent {
            PayOperation::Recurrent
        } else {
            PayOperation::Payment
        });
        self
    }

    /// Sets the currency code. Defaults to `CZK`.
    pub fn set_currency(&mut self, currency: impl Into<String>) -> &mut Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the gateway language. Defaults to `cs`.
    pub fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the payment method. Defaults to `card`.
    pub fn set_pay_method(&mut self, pay_method: impl Into<String>) -> &mut Self {
        self.pay_method = Some(pay_method.into());
        self
    }

    /// Overrides the return URL from the merchant config.
    pub fn set_return_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.return_url = Some(url.into());
        self
    }

    /// Overrides the return method from the merchant config.
    pub const fn set_return_method(&mut self, method: ReturnMethod) -> &mut Self {
        self.return_method = Some(method);
        self
    }

    /// Sets the description shown to the customer. Defaults to
    /// `"<shop name>, <order number>"`.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the customer ID (e-mail, number, ...). Longer values are
    /// shortened to 50 characters.
    pub fn set_customer_id(&mut self, customer_id: impl Into<String>) -> &mut Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Overrides the close-payment flag from the merchant config.
    pub const fn set_close_payment(&mut self, close: bool) -> &mut Self {
        self.close_payment = Some(close);
        self
    }

    /// Sets the payment lifetime in seconds (300 to 1800 at the gateway).
    /// Zero means the default of 1800.
    pub const fn set_ttl_sec(&mut self, ttl_sec: u32) -> &mut Self {
        self.ttl_sec = Some(ttl_sec);
        self
    }

    /// Sets the version of the shop logo shown on the gateway.
    pub const fn set_logo_version(&mut self, version: u32) -> &mut Self {
        self.logo_version = Some(version);
        self
    }

    /// Sets the version of the gateway color scheme.
    pub const fn set_color_scheme_version(&mut self, version: u32) -> &mut Self {
        self.color_scheme_version = Some(version);
        self
    }

    /// Order number.
    #[must_use]
    pub fn order_no(&self) -> &str {
        &self.order_no
    }

    /// Requested payment operation, if set.
    #[must_use]
    pub const fn pay_operation(&self) -> Option<PayOperation> {
        self.pay_operation
    }

    /// Cart items in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Customer record, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Order record, if any.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Merchant data decoded back to raw bytes, empty if unset.
    #[must_use]
    pub fn merchant_data(&self) -> Vec<u8> {
        self.merchant_data
            .as_ref()
            .map(MerchantData::decode)
            .unwrap_or_default()
    }

    /// Merchant data as base64, empty if unset.
    #[must_use]
    pub fn merchant_data_encoded(&self) -> &str {
        self.merchant_data.as_ref().map_or("", MerchantData::as_str)
    }

    /// Sum of the cart amounts in hundredths of the currency unit.
    #[must_use]
    pub fn total_amount(&self) -> i64 {
        cart::total_amount(&self.cart)
    }

    /// Resolves defaults and validates the request, timestamping it with the
    /// current local time.
    ///
    /// # Errors
    ///
    /// See [`Self::check_and_prepare_at`].
    pub fn check_and_prepare(self, config: &MerchantConfig) -> Result<PreparedPayment, ValidationError> {
        self.check_and_prepare_at(config, Dttm::now())
    }

    /// Resolves defaults and validates the request, timestamping it with
    /// `dttm`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingReturnUrl`] if neither the request
    /// nor the config has a return URL, [`ValidationError::EmptyCart`] if no
    /// item was added, and [`ValidationError::InvalidOrderNo`] if the order
    /// number is not 1 to 10 digits.
    pub fn check_and_prepare_at(
        self,
        config: &MerchantConfig,
        dttm: Dttm,
    ) -> Result<PreparedPayment, ValidationError> {
        let pay_operation = self.pay_operation.unwrap_or_default();
        let pay_method = or_default(self.pay_method, DEFAULT_PAY_METHOD);
        let currency = or_default(self.currency, DEFAULT_CURRENCY);
        let language = or_default(self.language, DEFAULT_LANGUAGE);
        let ttl_sec = self.ttl_sec.filter(|ttl| *ttl > 0).unwrap_or(DEFAULT_TTL_SEC);
        let close_payment = self.close_payment.unwrap_or(config.close_payment);

        let return_url = non_blank(self.return_url)
            .or_else(|| non_blank(config.return_url.clone()))
            .ok_or(ValidationError::MissingReturnUrl)?;
        let return_method = self.return_method.unwrap_or(config.return_method);

        let description = non_blank(self.description)
            .unwrap_or_else(|| format!("{}, {}", config.shop_name, self.order_no));
        let description = text::shorten_with_ellipsis(&description, DESCRIPTION_MAX_LEN);

        let customer_id =
            non_blank(self.customer_id.map(|id| text::shorten(&id, CUSTOMER_ID_MAX_LEN)));

        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        if !ORDER_NO.is_match(&self.order_no) {
            return Err(ValidationError::InvalidOrderNo(self.order_no));
        }
        let total_amount = cart::total_amount(&self.cart);

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            order_no = %self.order_no,
            total_amount,
            pay_operation = %pay_operation,
            "payment request prepared"
        );

        Ok(PreparedPayment {
            merchant_id: config.merchant_id.clone(),
            order_no: self.order_no,
            dttm,
            pay_operation,
            pay_method,
            total_amount,
            currency,
            close_payment,
            return_url,
            return_method,
            cart: self.cart,
            customer: self.customer,
            order: self.order,
            description,
            merchant_data: self.merchant_data,
            customer_id,
            language,
            ttl_sec,
            logo_version: self.logo_version,
            color_scheme_version: self.color_scheme_version,
            pay_id: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_owned())
}

/// A validated payment request with every default resolved.
///
/// Produced by [`PaymentRequest::check_and_prepare`]. Its canonical field
/// sequence and signed payload are built by the methods in
/// [`crate::canonical`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPayment {
    merchant_id: String,
    order_no: String,
    dttm: Dttm,
    pay_operation: PayOperation,
    pay_method: String,
    total_amount: i64,
    currency: String,
    close_payment: bool,
    return_url: String,
    return_method: ReturnMethod,
    cart: Vec<CartItem>,
    customer: Option<Customer>,
    order: Option<Order>,
    description: String,
    merchant_data: Option<MerchantData>,
    customer_id: Option<String>,
    language: String,
    ttl_sec: u32,
    logo_version: Option<u32>,
    color_scheme_version: Option<u32>,
    pay_id: Option<String>,
}

impl PreparedPayment {
    /// Stores the pay ID the gateway assigned to this payment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PayIdAlreadyAssigned`] if a pay ID was
    /// stored before; the existing ID is kept.
    pub fn set_pay_id(&mut self, pay_id: impl Into<String>) -> Result<(), ValidationError> {
        if let Some(existing) = &self.pay_id {
            return Err(ValidationError::PayIdAlreadyAssigned(existing.clone()));
        }
        self.pay_id = Some(pay_id.into());
        Ok(())
    }

    /// Pay ID assigned by the gateway, once the payment was initialized.
    #[must_use]
    pub fn pay_id(&self) -> Option<&str> {
        self.pay_id.as_deref()
    }

    /// Merchant ID taken from the config.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Order number.
    #[must_use]
    pub fn order_no(&self) -> &str {
        &self.order_no
    }

    /// Time the payment was prepared.
    #[must_use]
    pub const fn dttm(&self) -> Dttm {
        self.dttm
    }

    /// Payment operation.
    #[must_use]
    pub const fn pay_operation(&self) -> PayOperation {
        self.pay_operation
    }

    /// Payment method.
    #[must_use]
    pub fn pay_method(&self) -> &str {
        &self.pay_method
    }

    /// Sum of the cart amounts in hundredths of the currency unit.
    #[must_use]
    pub const fn total_amount(&self) -> i64 {
        self.total_amount
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Whether the payment is closed automatically.
    #[must_use]
    pub const fn close_payment(&self) -> bool {
        self.close_payment
    }

    /// Return URL.
    #[must_use]
    pub fn return_url(&self) -> &str {
        &self.return_url
    }

    /// Return method.
    #[must_use]
    pub const fn return_method(&self) -> ReturnMethod {
        self.return_method
    }

    /// Cart items in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[CartItem] {
        &self.cart
    }

    /// Customer record, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Order record, if any.
    #[must_use]
    pub const fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Description shown to the customer.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Merchant data decoded back to raw bytes, empty if unset.
    #[must_use]
    pub fn merchant_data(&self) -> Vec<u8> {
        self.merchant_data
            .as_ref()
            .map(MerchantData::decode)
            .unwrap_or_default()
    }

    /// Merchant data as base64, `None` if unset.
    #[must_use]
    pub fn merchant_data_encoded(&self) -> Option<&str> {
        self.merchant_data.as_ref().map(MerchantData::as_str)
    }

    /// Customer ID, if any.
    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    /// Gateway language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Payment lifetime in seconds.
    #[must_use]
    pub const fn ttl_sec(&self) -> u32 {
        self.ttl_sec
    }

    /// Logo version, if set.
    #[must_use]
    pub const fn logo_version(&self) -> Option<u32> {
        self.logo_version
    }

    /// Color scheme version, if set.
    #[must_use]
    pub const fn color_scheme_version(&self) -> Option<u32> {
        self.color_scheme_version
    }
}
