//! Extended customer data.
//!
//! Customer data is optional. Fields the integrator leaves empty are left out
//! of the record entirely, and phone numbers that do not match the gateway's
//! pattern are dropped instead of failing the request.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::text;

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+|00|)[0-9]{1,3}\.[0-9 ]{3,}$").expect("valid phone pattern"));

const NAME_MAX_LEN: usize = 45;
const EMAIL_MAX_LEN: usize = 100;

/// Customer data as supplied by the integrator.
///
/// Every field is optional. `account` and `login` are passed to the gateway
/// verbatim, with their key order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerData {
    /// Full name.
    pub name: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
    /// Home phone, e.g. `+420.800123456`.
    pub home_phone: Option<String>,
    /// Work phone.
    pub work_phone: Option<String>,
    /// Mobile phone.
    pub mobile_phone: Option<String>,
    /// Customer account details (`createdAt`, `changedAt`, ...).
    pub account: Option<Map<String, Value>>,
    /// Customer login details (`auth`, `authAt`, ...).
    pub login: Option<Map<String, Value>>,
}

/// Normalized customer record, as sent to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    home_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    work_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    login: Option<Map<String, Value>>,
}

impl Customer {
    /// Normalizes customer data.
    ///
    /// Returns `None` if nothing usable is left, e.g. when the only field
    /// given was an invalid phone number.
    #[must_use]
    pub fn from_data(data: CustomerData) -> Option<Self> {
        let customer = Self {
            name: non_empty(data.name.map(|n| text::shorten(&n, NAME_MAX_LEN))),
            email: non_empty(data.email.map(|e| text::shorten(&e, EMAIL_MAX_LEN))),
            home_phone: filter_phone(data.home_phone),
            work_phone: filter_phone(data.work_phone),
            mobile_phone: filter_phone(data.mobile_phone),
            account: data.account.filter(|m| !m.is_empty()),
            login: data.login.filter(|m| !m.is_empty()),
        };
        (!customer.is_empty()).then_some(customer)
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.home_phone.is_none()
            && self.work_phone.is_none()
            && self.mobile_phone.is_none()
            && self.account.is_none()
            && self.login.is_none()
    }

    /// Customer name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Customer e-mail.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Home phone, if it was valid.
    #[must_use]
    pub fn home_phone(&self) -> Option<&str> {
        self.home_phone.as_deref()
    }

    /// Work phone, if it was valid.
    #[must_use]
    pub fn work_phone(&self) -> Option<&str> {
        self.work_phone.as_deref()
    }

    /// Mobile phone, if it was valid.
    #[must_use]
    pub fn mobile_phone(&self) -> Option<&str> {
        self.mobile_phone.as_deref()
    }

    /// Account details.
    #[must_use]
    pub const fn account(&self) -> Option<&Map<String, Value>> {
        self.account.as_ref()
    }

    /// Login details.
    #[must_use]
    pub const fn login(&self) -> Option<&Map<String, Value>> {
        self.login.as_ref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn filter_phone(phone: Option<String>) -> Option<String> {
    phone.filter(|p| PHONE.is_match(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phone_pattern() {
        for valid in ["+420.800123456", "00420.800 123 456", "420.123", "1.999"] {
            assert!(PHONE.is_match(valid), "{valid} should match");
        }
        for invalid in [
            "notaphone",
            "+420800123456",
            "+420.12",
            "+1234.800123",
            "",
            "+\u{664}\u{662}\u{660}.777123",
        ] {
            assert!(!PHONE.is_match(invalid), "{invalid} should not match");
        }
    }

    #[test]
    fn test_non_ascii_digits_dropped() {
        let customer = Customer::from_data(CustomerData {
            name: Some("Jan".into()),
            mobile_phone: Some("+\u{664}\u{662}\u{660}.777123".into()),
            ..CustomerData::default()
        })
        .unwrap();
        assert_eq!(customer.mobile_phone(), None);
    }

    #[test]
    fn test_only_invalid_phone_yields_no_customer() {
        let data = CustomerData {
            home_phone: Some("notaphone".into()),
            ..CustomerData::default()
        };
        assert!(Customer::from_data(data).is_none());
        assert!(Customer::from_data(CustomerData::default()).is_none());
    }

    #[test]
    fn test_invalid_phone_dropped_rest_kept() {
        let customer = Customer::from_data(CustomerData {
            name: Some("Jan Novák".into()),
            email: Some("jan@example.com".into()),
            home_phone: Some("notaphone".into()),
            mobile_phone: Some("+420.777123456".into()),
            ..CustomerData::default()
        })
        .unwrap();
        assert_eq!(customer.home_phone(), None);
        assert_eq!(
            serde_json::to_value(&customer).unwrap(),
            json!({
                "name": "Jan Novák",
                "email": "jan@example.com",
                "mobilePhone": "+420.777123456"
            })
        );
    }

    #[test]
    fn test_field_order_is_fixed() {
        let mut account = Map::new();
        account.insert("createdAt".into(), json!("2024-01-01T00:00:00+01:00"));
        account.insert("changedAt".into(), json!("2024-02-01T00:00:00+01:00"));
        let customer = Customer::from_data(CustomerData {
            account: Some(account),
            work_phone: Some("+420.123456789".into()),
            name: Some("Eva".into()),
            ..CustomerData::default()
        })
        .unwrap();
        assert_eq!(
            serde_json::to_string(&customer).unwrap(),
            concat!(
                r#"{"name":"Eva","workPhone":"+420.123456789","#,
                r#""account":{"createdAt":"2024-01-01T00:00:00+01:00","changedAt":"2024-02-01T00:00:00+01:00"}}"#
            )
        );
    }

    #[test]
    fn test_name_and_email_shortened() {
        let customer = Customer::from_data(CustomerData {
            name: Some("x".repeat(60)),
            email: Some(format!("{}@example.com", "y".repeat(120))),
            ..CustomerData::default()
        })
        .unwrap();
        assert_eq!(customer.name().map(|n| n.chars().count()), Some(45));
        assert_eq!(customer.email().map(|e| e.chars().count()), Some(100));
    }

    #[test]
    fn test_blank_name_omitted() {
        let customer = Customer::from_data(CustomerData {
            name: Some("   ".into()),
            email: Some("a@b.cz".into()),
            ..CustomerData::default()
        })
        .unwrap();
        assert_eq!(customer.name(), None);
    }
}
