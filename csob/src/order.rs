//! Extended order data: order type and billing/shipping addresses.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::proto::OrderType;
use crate::text;

static COUNTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid country pattern"));

const ADDRESS_MAX_LEN: usize = 50;
const CITY_MAX_LEN: usize = 50;
const ZIP_MAX_LEN: usize = 16;

/// Address fields as supplied by the integrator, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressData {
    /// Street and house number.
    pub address1: Option<String>,
    /// City.
    pub city: Option<String>,
    /// Postal code.
    pub zip: Option<String>,
    /// ISO 3166-1 alpha-3 country code, any case.
    pub country: Option<String>,
}

impl AddressData {
    /// Creates address data with all four mandatory fields set.
    #[must_use]
    pub fn new(
        address1: impl Into<String>,
        city: impl Into<String>,
        zip: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            address1: Some(address1.into()),
            city: Some(city.into()),
            zip: Some(zip.into()),
            country: Some(country.into()),
        }
    }
}

/// A validated billing or shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    address1: String,
    city: String,
    zip: String,
    country: String,
}

impl TryFrom<AddressData> for Address {
    type Error = ValidationError;

    fn try_from(data: AddressData) -> Result<Self, Self::Error> {
        let address1 = required("address1", data.address1)?;
        let city = required("city", data.city)?;
        let zip = required("zip", data.zip)?;
        let country = required("country", data.country)?;
        if !COUNTRY.is_match(&country) {
            return Err(ValidationError::InvalidCountryCode(country));
        }

        Ok(Self {
            address1: text::shorten(&address1, ADDRESS_MAX_LEN),
            city: text::shorten(&city, CITY_MAX_LEN),
            zip: text::shorten(&zip, ZIP_MAX_LEN),
            country: country.to_ascii_uppercase(),
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingAddressField(field))
}

impl Address {
    /// Street and house number.
    #[must_use]
    pub fn address1(&self) -> &str {
        &self.address1
    }

    /// City.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Postal code.
    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// Uppercase ISO 3166-1 alpha-3 country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }
}

/// Order record, as sent to the gateway.
///
/// `addressMatch` is only emitted when it is `true`; the gateway treats an
/// absent flag as "not known to match".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "type")]
    order_type: OrderType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    address_match: bool,
    billing: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping: Option<Address>,
}

impl Order {
    /// Validates the addresses and builds the order record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the billing address, or the shipping
    /// address when given, is incomplete or has a malformed country code.
    pub fn new(
        billing: AddressData,
        address_match: bool,
        shipping: Option<AddressData>,
        order_type: Option<OrderType>,
    ) -> Result<Self, ValidationError> {
        let billing = Address::try_from(billing)?;
        let shipping = shipping.map(Address::try_from).transpose()?;
        Ok(Self {
            order_type: order_type.unwrap_or_default(),
            address_match,
            billing,
            shipping,
        })
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Whether billing and shipping addresses match.
    #[must_use]
    pub const fn address_match(&self) -> bool {
        self.address_match
    }

    /// Billing address.
    #[must_use]
    pub const fn billing(&self) -> &Address {
        &self.billing
    }

    /// Shipping address, if one was given.
    #[must_use]
    pub const fn shipping(&self) -> Option<&Address> {
        self.shipping.as_ref()
    }
}
