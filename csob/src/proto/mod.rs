//! Wire format types for the `payment/init` request.
//!
//! This module defines the enumerated values the gateway accepts and the
//! shape of the outgoing payload. All names follow the gateway's camelCase
//! spelling on the wire.

use serde::{Deserialize, Serialize};

pub mod encoding;
pub mod version;

pub use encoding::MerchantData;
pub use version::ApiVersion;

/// The signed request body: field name to value, in canonical order.
///
/// Backed by an insertion-ordered map, so serializing it reproduces the
/// exact order the signature was computed over.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Currency used when the request does not set one.
pub const DEFAULT_CURRENCY: &str = "CZK";

/// Gateway language used when the request does not set one.
pub const DEFAULT_LANGUAGE: &str = "cs";

/// Payment method used when the request does not set one.
pub const DEFAULT_PAY_METHOD: &str = "card";

/// Payment lifetime in seconds used when the request does not set one.
pub const DEFAULT_TTL_SEC: u32 = 1800;

/// Kind of payment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayOperation {
    /// A regular one-off payment.
    #[default]
    #[serde(rename = "payment")]
    Payment,
    /// Template for recurrent payments.
    ///
    /// Deprecated since eAPI 1.7 in favour of [`PayOperation::OneClick`].
    #[serde(rename = "recurrentPayment")]
    Recurrent,
    /// Template for one-click payments.
    #[serde(rename = "oneclickPayment")]
    OneClick,
}

impl PayOperation {
    /// The wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Recurrent => "recurrentPayment",
            Self::OneClick => "oneclickPayment",
        }
    }
}

impl std::fmt::Display for PayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method the gateway uses to send the customer back to the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReturnMethod {
    /// `POST` back to the return URL.
    #[default]
    Post,
    /// `GET` back to the return URL.
    Get,
}

impl ReturnMethod {
    /// The wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
        }
    }
}

impl std::fmt::Display for ReturnMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of the order in the extended purchase data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Purchase of goods or services.
    #[default]
    Purchase,
    /// Account balance top-up.
    Balance,
    /// Prepaid card top-up.
    Prepaid,
    /// Cash withdrawal.
    Cash,
    /// Check acceptance.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_operation_wire_values() {
        assert_eq!(
            serde_json::to_value(PayOperation::OneClick).unwrap(),
            serde_json::json!("oneclickPayment")
        );
        assert_eq!(PayOperation::Recurrent.as_str(), "recurrentPayment");
        assert_eq!(PayOperation::default(), PayOperation::Payment);
    }

    #[test]
    fn test_return_method_wire_values() {
        assert_eq!(serde_json::to_value(ReturnMethod::Get).unwrap(), "GET");
        let m: ReturnMethod = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(m, ReturnMethod::Post);
    }

    #[test]
    fn test_order_type_wire_values() {
        assert_eq!(serde_json::to_value(OrderType::Purchase).unwrap(), "purchase");
        assert_eq!(serde_json::to_value(OrderType::Prepaid).unwrap(), "prepaid");
    }
}
