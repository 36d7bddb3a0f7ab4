//! Canonical field order of the `payment/init` request.
//!
//! The same ordered field table drives both the wire payload and the
//! signature base, so the two can never disagree on order. Each field is
//! described by its wire name, an accessor and a predicate deciding whether
//! the negotiated API version carries it at all.
//!
//! Two rules differ between the payload and the signature base:
//!
//! - an empty record (cart, customer, order) is left out of the payload, but
//!   stays in the entry sequence, where it flattens to nothing;
//! - an absent scalar is sent as `""` and signed as an empty segment.
//!
//! The auxiliary fields `logoVersion` and `colorSchemeVersion` follow the
//! main sequence and appear in neither output unless set.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::MerchantConfig;
use crate::error::SignatureError;
use crate::payment::PreparedPayment;
use crate::proto::{ApiVersion, Payload};
use crate::signature::{Entry, Signer};

/// Name of the payload field carrying the signature.
pub const SIGNATURE_FIELD: &str = "signature";

enum FieldValue {
    Absent,
    Scalar(Value),
    Record(Value),
}

struct Field {
    name: &'static str,
    value: fn(&PreparedPayment) -> FieldValue,
    include: fn(ApiVersion) -> bool,
}

const fn always(_: ApiVersion) -> bool {
    true
}

/// `description` was dropped from the request in eAPI 1.8.
fn before_1_8(version: ApiVersion) -> bool {
    !version.is_at_least(ApiVersion::V1_8)
}

fn scalar(value: impl Into<Value>) -> FieldValue {
    FieldValue::Scalar(value.into())
}

fn optional(value: Option<impl Into<Value>>) -> FieldValue {
    value.map_or(FieldValue::Absent, scalar)
}

/// Panics if the record does not convert to JSON; every record type
/// derives `Serialize` over plain data.
fn record<T: Serialize + ?Sized>(value: Option<&T>) -> FieldValue {
    FieldValue::Record(value.map_or_else(
        || Value::Object(Map::new()),
        |v| serde_json::to_value(v).expect("payment records serialize to JSON"),
    ))
}

fn is_empty_record(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

static FIELDS: [Field; 18] = [
    Field {
        name: "merchantId",
        value: |p| scalar(p.merchant_id()),
        include: always,
    },
    Field {
        name: "orderNo",
        value: |p| scalar(p.order_no()),
        include: always,
    },
    Field {
        name: "dttm",
        value: |p| scalar(p.dttm().to_string()),
        include: always,
    },
    Field {
        name: "payOperation",
        value: |p| scalar(p.pay_operation().as_str()),
        include: always,
    },
    Field {
        name: "payMethod",
        value: |p| scalar(p.pay_method()),
        include: always,
    },
    Field {
        name: "totalAmount",
        value: |p| scalar(p.total_amount()),
        include: always,
    },
    Field {
        name: "currency",
        value: |p| scalar(p.currency()),
        include: always,
    },
    Field {
        name: "closePayment",
        value: |p| scalar(p.close_payment()),
        include: always,
    },
    Field {
        name: "returnUrl",
        value: |p| scalar(p.return_url()),
        include: always,
    },
    Field {
        name: "returnMethod",
        value: |p| scalar(p.return_method().as_str()),
        include: always,
    },
    Field {
        name: "cart",
        value: |p| record(Some(p.cart())),
        include: always,
    },
    Field {
        name: "customer",
        value: |p| record(p.customer()),
        include: always,
    },
    Field {
        name: "order",
        value: |p| record(p.order()),
        include: always,
    },
    Field {
        name: "description",
        value: |p| scalar(p.description()),
        include: before_1_8,
    },
    Field {
        name: "merchantData",
        value: |p| optional(p.merchant_data_encoded()),
        include: always,
    },
    Field {
        name: "customerId",
        value: |p| optional(p.customer_id()),
        include: always,
    },
    Field {
        name: "language",
        value: |p| scalar(p.language()),
        include: always,
    },
    Field {
        name: "ttlSec",
        value: |p| scalar(p.ttl_sec()),
        include: always,
    },
];

static AUX_FIELDS: [Field; 2] = [
    Field {
        name: "logoVersion",
        value: |p| optional(p.logo_version()),
        include: always,
    },
    Field {
        name: "colorSchemeVersion",
        value: |p| optional(p.color_scheme_version()),
        include: always,
    },
];

/// Names of the main fields carried by `version`, in canonical order.
#[must_use]
pub fn field_names(version: ApiVersion) -> Vec<&'static str> {
    FIELDS
        .iter()
        .filter(|f| (f.include)(version))
        .map(|f| f.name)
        .collect()
}

impl PreparedPayment {
    fn fields(&self, version: ApiVersion) -> impl Iterator<Item = (&'static str, FieldValue)> + '_ {
        let main = FIELDS
            .iter()
            .filter(move |f| (f.include)(version))
            .map(move |f| (f.name, (f.value)(self)));
        let aux = AUX_FIELDS
            .iter()
            .map(move |f| (f.name, (f.value)(self)))
            .filter(|(_, value)| !matches!(value, FieldValue::Absent));
        main.chain(aux)
    }

    /// The canonical entry sequence the signature base is built from.
    #[must_use]
    pub fn signature_entries(&self, version: ApiVersion) -> Vec<Entry> {
        self.fields(version)
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::Absent => Value::Null,
                    FieldValue::Scalar(v) | FieldValue::Record(v) => v,
                };
                Entry::new(name, value)
            })
            .collect()
    }

    /// The unsigned request body, in canonical order.
    #[must_use]
    pub fn payload(&self, version: ApiVersion) -> Payload {
        let mut payload = Payload::new();
        for (name, value) in self.fields(version) {
            let value = match value {
                FieldValue::Absent => Value::String(String::new()),
                FieldValue::Record(v) if is_empty_record(&v) => continue,
                FieldValue::Scalar(v) | FieldValue::Record(v) => v,
            };
            payload.insert(name.to_owned(), value);
        }
        payload
    }

    /// Signs the payment and returns the request body with the `signature`
    /// field appended.
    ///
    /// The field set follows `config.api_version`; the key and hash
    /// algorithm come from `config` as well.
    ///
    /// # Errors
    ///
    /// Returns the [`SignatureError`] reported by `signer`.
    pub fn to_signed_payload<S: Signer + ?Sized>(
        &self,
        config: &MerchantConfig,
        signer: &S,
    ) -> Result<Payload, SignatureError> {
        let version = config.api_version;
        let base = signer.signature_base(&self.signature_entries(version));

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            order_no = %self.order_no(),
            api_version = %version,
            base = %base,
            "signing payment request"
        );

        let signature = signer.sign(&base, &config.private_key, config.hash_algorithm())?;
        let mut payload = self.payload(version);
        payload.insert(SIGNATURE_FIELD.to_owned(), Value::String(signature));
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::config::{HashAlgorithm, KeyMaterial};
    use crate::customer::{Customer, CustomerData};
    use crate::order::AddressData;
    use crate::payment::PaymentRequest;
    use crate::signature::signature_base;
    use crate::timestamp::Dttm;

    /// Records every base it signs and returns a fixed signature.
    #[derive(Default)]
    struct RecordingSigner {
        calls: Mutex<Vec<(String, HashAlgorithm)>>,
    }

    impl Signer for RecordingSigner {
        fn sign(
            &self,
            base: &str,
            _key: &KeyMaterial,
            hash: HashAlgorithm,
        ) -> Result<String, SignatureError> {
            self.calls.lock().unwrap().push((base.to_owned(), hash));
            Ok("c2lnbmF0dXJl".to_owned())
        }
    }

    struct FailingSigner;

    impl Signer for FailingSigner {
        fn sign(
            &self,
            _base: &str,
            _key: &KeyMaterial,
            _hash: HashAlgorithm,
        ) -> Result<String, SignatureError> {
            Err(SignatureError::new("key unreadable"))
        }
    }

    fn config(version: ApiVersion) -> MerchantConfig {
        MerchantConfig::new(
            "M1MIPS0000",
            "Test shop",
            KeyMaterial {
                path: PathBuf::from("merchant.key"),
                password: None,
            },
        )
        .with_return_url("https://shop.example/return")
        .with_api_version(version)
    }

    fn dttm() -> Dttm {
        Dttm::parse("20240131120000").unwrap()
    }

    fn minimal(version: ApiVersion) -> PreparedPayment {
        let mut request = PaymentRequest::new("5547");
        request
            .add_cart_item("Coffee", 1, Decimal::new(12_000, 0), "")
            .unwrap();
        request.check_and_prepare_at(&config(version), dttm()).unwrap()
    }

    fn full(version: ApiVersion) -> PreparedPayment {
        let mut request = PaymentRequest::new("5547");
        request
            .add_cart_item("Coffee", 2, Decimal::new(12_000, 0), "Arabica")
            .unwrap()
            .add_cart_item("Shipping", 1, Decimal::new(9_950, 1), "DPD")
            .unwrap()
            .set_customer_data(CustomerData {
                name: Some("Jan Novák".into()),
                email: Some("jan@example.com".into()),
                mobile_phone: Some("+420.777123456".into()),
                ..CustomerData::default()
            })
            .set_order_data(
                AddressData::new("Na Příkopě 14", "Praha", "11000", "cze"),
                true,
                None,
                None,
            )
            .unwrap()
            .set_merchant_data("hello")
            .unwrap()
            .set_customer_id("cust-1")
            .set_logo_version(1)
            .set_color_scheme_version(2);
        request.check_and_prepare_at(&config(version), dttm()).unwrap()
    }

    #[test]
    fn test_field_names_version_gated() {
        let legacy = field_names(ApiVersion::V1_7);
        let current = field_names(ApiVersion::V1_9);
        assert_eq!(legacy.len(), 18);
        assert_eq!(current.len(), 17);
        assert!(legacy.contains(&"description"));
        assert!(!current.contains(&"description"));
        assert_eq!(current[..3], ["merchantId", "orderNo", "dttm"]);
        assert_eq!(current.last(), Some(&"ttlSec"));
    }

    #[test]
    fn test_minimal_payload_legacy() {
        let payload = minimal(ApiVersion::V1_7).payload(ApiVersion::V1_7);
        assert_eq!(
            Value::Object(payload.clone()),
            json!({
                "merchantId": "M1MIPS0000",
                "orderNo": "5547",
                "dttm": "20240131120000",
                "payOperation": "payment",
                "payMethod": "card",
                "totalAmount": 12000,
                "currency": "CZK",
                "closePayment": true,
                "returnUrl": "https://shop.example/return",
                "returnMethod": "POST",
                "cart": [{"name": "Coffee", "quantity": 1, "amount": 12000, "description": ""}],
                "description": "Test shop, 5547",
                "merchantData": "",
                "customerId": "",
                "language": "cs",
                "ttlSec": 1800
            })
        );
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "merchantId", "orderNo", "dttm", "payOperation", "payMethod", "totalAmount",
                "currency", "closePayment", "returnUrl", "returnMethod", "cart", "description",
                "merchantData", "customerId", "language", "ttlSec",
            ]
        );
    }

    #[test]
    fn test_description_dropped_since_1_8() {
        let payment = minimal(ApiVersion::V1_8);
        assert!(!payment.payload(ApiVersion::V1_8).contains_key("description"));
        assert!(
            payment
                .signature_entries(ApiVersion::V1_8)
                .iter()
                .all(|e| e.name != "description")
        );
        assert_eq!(
            payment.payload(ApiVersion::V1_7)["description"],
            json!("Test shop, 5547")
        );
    }

    #[test]
    fn test_minimal_signature_base() {
        let payment = minimal(ApiVersion::V1_7);
        assert_eq!(
            signature_base(&payment.signature_entries(ApiVersion::V1_7)),
            "M1MIPS0000|5547|20240131120000|payment|card|12000|CZK|true|\
             https://shop.example/return|POST|Coffee|1|12000||Test shop, 5547|||cs|1800"
        );
    }

    #[test]
    fn test_empty_records_stay_in_entries() {
        let entries = minimal(ApiVersion::V1_9).signature_entries(ApiVersion::V1_9);
        let names: Vec<&str> = entries.iter().map(|e| e.name).collect();
        assert!(names.contains(&"customer"));
        assert!(names.contains(&"order"));
        assert!(!names.contains(&"logoVersion"));
        let payload = minimal(ApiVersion::V1_9).payload(ApiVersion::V1_9);
        assert!(!payload.contains_key("customer"));
        assert!(!payload.contains_key("order"));
    }

    #[test]
    fn test_full_signature_base() {
        let payment = full(ApiVersion::V1_9);
        assert_eq!(
            signature_base(&payment.signature_entries(ApiVersion::V1_9)),
            "M1MIPS0000|5547|20240131120000|payment|card|12995|CZK|true|\
             https://shop.example/return|POST|Coffee|2|12000|Arabica|Shipping|1|995|DPD|\
             Jan Novák|jan@example.com|+420.777123456|purchase|true|\
             Na Příkopě 14|Praha|11000|CZE|aGVsbG8=|cust-1|cs|1800|1|2"
        );
    }

    #[test]
    fn test_full_payload_order_and_aux_fields() {
        let payload = full(ApiVersion::V1_9).payload(ApiVersion::V1_9);
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "merchantId", "orderNo", "dttm", "payOperation", "payMethod", "totalAmount",
                "currency", "closePayment", "returnUrl", "returnMethod", "cart", "customer",
                "order", "merchantData", "customerId", "language", "ttlSec", "logoVersion",
                "colorSchemeVersion",
            ]
        );
        assert_eq!(payload["logoVersion"], json!(1));
        assert_eq!(payload["customer"]["mobilePhone"], json!("+420.777123456"));
        assert_eq!(payload["order"]["billing"]["country"], json!("CZE"));
    }

    #[test]
    fn test_signed_payload() {
        let config = config(ApiVersion::V1_9);
        let signer = RecordingSigner::default();
        let payment = full(ApiVersion::V1_9);
        let signed = payment.to_signed_payload(&config, &signer).unwrap();

        assert_eq!(signed.keys().last().map(String::as_str), Some(SIGNATURE_FIELD));
        assert_eq!(signed[SIGNATURE_FIELD], json!("c2lnbmF0dXJl"));
        assert!(signed.contains_key("returnUrl"));
        assert!(signed.contains_key("orderNo"));
        assert!(signed.contains_key("cart"));

        let calls = signer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, HashAlgorithm::Sha256);
        assert_eq!(
            calls[0].0,
            signature_base(&payment.signature_entries(ApiVersion::V1_9))
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let config = config(ApiVersion::V1_9);
        let signer = RecordingSigner::default();
        let payment = full(ApiVersion::V1_9);
        let first = payment.to_signed_payload(&config, &signer).unwrap();
        let second = payment.to_signed_payload(&config, &signer).unwrap();
        assert_eq!(first, second);

        let calls = signer.calls.lock().unwrap();
        assert_eq!(calls[0].0, calls[1].0);
    }

    #[test]
    fn test_legacy_version_signs_with_sha1() {
        let config = config(ApiVersion::V1_7);
        let signer = RecordingSigner::default();
        minimal(ApiVersion::V1_7)
            .to_signed_payload(&config, &signer)
            .unwrap();
        assert_eq!(signer.calls.lock().unwrap()[0].1, HashAlgorithm::Sha1);
    }

    #[test]
    fn test_absent_record_is_empty_object() {
        let FieldValue::Record(value) = record::<Customer>(None) else {
            panic!("expected a record");
        };
        assert_eq!(value, json!({}));
    }

    #[test]
    #[should_panic(expected = "payment records serialize to JSON")]
    fn test_unserializable_record_panics() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("unsupported"))
            }
        }

        let _ = record(Some(&Unserializable));
    }

    #[test]
    fn test_signer_error_propagates() {
        let err = minimal(ApiVersion::V1_9)
            .to_signed_payload(&config(ApiVersion::V1_9), &FailingSigner)
            .unwrap_err();
        assert_eq!(err.reason, "key unreadable");
    }
}
