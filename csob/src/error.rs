//! Error types for building, signing and submitting payment requests.
//!
//! [`ValidationError`] is the only error the request model itself raises.
//! The remaining types describe failures of the signing and transport
//! collaborators and are bundled into [`PaymentError`] by [`crate::client::Client`].

use std::fmt;

/// A payment request violates one of the gateway's field constraints.
///
/// Raised synchronously at the point of violation: by the mutators on
/// [`crate::payment::PaymentRequest`], or by
/// [`crate::payment::PaymentRequest::check_and_prepare`] for checks that
/// depend on merchant configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The cart already holds the maximum number of items.
    #[error("the gateway accepts at most {max} cart items in a single payment")]
    CartFull {
        /// Maximum number of cart items.
        max: usize,
    },
    /// The cart item quantity is below one.
    #[error("invalid quantity {0}: it must be a number >= 1")]
    InvalidQuantity(u32),
    /// A mandatory address field is missing or blank.
    #[error("missing mandatory address field `{0}`")]
    MissingAddressField(&'static str),
    /// The country is not a three-letter ISO 3166-1 alpha-3 code.
    #[error("invalid country code {0:?}: expected three letters")]
    InvalidCountryCode(String),
    /// Merchant data is too long after base64 encoding.
    #[error("merchant data is {len} characters long after base64 encoding, at most {max} allowed")]
    MerchantDataTooLong {
        /// Encoded length.
        len: usize,
        /// Maximum encoded length.
        max: usize,
    },
    /// No return URL was set on the request nor in the merchant config.
    #[error("a return URL must be set either on the payment or in the merchant config")]
    MissingReturnUrl,
    /// The cart has no items.
    #[error("cart is empty, add one or two items before submitting the payment")]
    EmptyCart,
    /// The order number is not 1 to 10 digits.
    #[error("invalid order number {0:?}: it must be 1 to 10 digits")]
    InvalidOrderNo(String),
    /// The gateway-assigned pay ID was already stored.
    #[error("pay ID is already assigned ({0})")]
    PayIdAlreadyAssigned(String),
    /// An API version string could not be parsed.
    #[error("invalid API version {0:?}: expected `major.minor`")]
    InvalidApiVersion(String),
}

/// The signing collaborator failed to produce a signature.
#[derive(Debug, Clone)]
pub struct SignatureError {
    /// Machine-readable reason for the error.
    pub reason: String,
    /// Human-readable details.
    pub message: Option<String>,
}

impl SignatureError {
    /// Creates a new signature error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message: None,
        }
    }

    /// Sets the human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "signing failed, {}: {}", self.reason, msg)
        } else {
            write!(f, "signing failed, {}", self.reason)
        }
    }
}

impl std::error::Error for SignatureError {}

/// The transport collaborator failed to deliver the request or the gateway
/// rejected it.
#[derive(Debug, Clone)]
pub struct TransportError {
    /// Machine-readable reason for the error.
    pub reason: String,
    /// Gateway result code, when the gateway answered.
    pub result_code: Option<i64>,
    /// Human-readable details.
    pub message: Option<String>,
}

impl TransportError {
    /// Creates a new transport error.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            result_code: None,
            message: None,
        }
    }

    /// Sets the gateway result code.
    #[must_use]
    pub fn with_result_code(mut self, code: i64) -> Self {
        self.result_code = Some(code);
        self
    }

    /// Sets the human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(code) = self.result_code {
            write!(f, " (result code {code})")?;
        }
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {}

/// Any failure while preparing, signing or submitting a payment.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The request failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request could not be signed.
    #[error("{0}")]
    Signature(#[from] SignatureError),

    /// The request could not be submitted.
    #[error("{0}")]
    Transport(#[from] TransportError),
}
