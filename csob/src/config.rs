//! Merchant configuration.
//!
//! Provides the values a payment request falls back to when the integrator
//! leaves them unset, together with the key material and protocol version
//! used when the request is signed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::proto::{ApiVersion, ReturnMethod};

/// Hash algorithm used by the RSA signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, used by API versions before 1.8.
    Sha1,
    /// SHA-256, used since API version 1.8.
    Sha256,
}

/// Location of the merchant's private key and its optional passphrase.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    /// Path to the PEM-encoded private key.
    pub path: PathBuf,
    /// Passphrase of the private key, if it is encrypted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("path", &self.path)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Configuration of a merchant account at the gateway.
///
/// # Example
///
/// ```rust
/// use csob::config::MerchantConfig;
///
/// let config: MerchantConfig = serde_json::from_value(serde_json::json!({
///     "merchantId": "A1029DTmM7",
///     "shopName": "Test shop",
///     "returnUrl": "https://shop.example/return",
///     "privateKey": { "path": "keys/rsa_A1029DTmM7.key" },
///     "apiVersion": "1.9"
/// })).unwrap();
///
/// assert!(config.close_payment);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantConfig {
    /// Merchant identifier assigned by the bank.
    pub merchant_id: String,

    /// Shop name, used to derive a default payment description.
    pub shop_name: String,

    /// Default URL the customer is sent back to after paying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    /// Default HTTP method for the return URL.
    #[serde(default)]
    pub return_method: ReturnMethod,

    /// Whether payments are closed (settled) automatically. Defaults to `true`.
    #[serde(default = "default_close_payment")]
    pub close_payment: bool,

    /// Negotiated API version.
    #[serde(default)]
    pub api_version: ApiVersion,

    /// Key used to sign requests.
    pub private_key: KeyMaterial,
}

const fn default_close_payment() -> bool {
    true
}

impl MerchantConfig {
    /// Creates a configuration with default return method, close-payment
    /// flag and API version.
    #[must_use]
    pub fn new(
        merchant_id: impl Into<String>,
        shop_name: impl Into<String>,
        private_key: KeyMaterial,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            shop_name: shop_name.into(),
            return_url: None,
            return_method: ReturnMethod::default(),
            close_payment: default_close_payment(),
            api_version: ApiVersion::default(),
            private_key,
        }
    }

    /// Sets the default return URL.
    #[must_use]
    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }

    /// Sets the default return method.
    #[must_use]
    pub fn with_return_method(mut self, method: ReturnMethod) -> Self {
        self.return_method = method;
        self
    }

    /// Sets the close-payment default.
    #[must_use]
    pub fn with_close_payment(mut self, close: bool) -> Self {
        self.close_payment = close;
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Returns `true` if the negotiated API version is `min` or newer.
    #[must_use]
    pub fn query_api_version(&self, min: ApiVersion) -> bool {
        self.api_version.is_at_least(min)
    }

    /// Hash algorithm the negotiated API version signs with.
    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        if self.query_api_version(ApiVersion::V1_8) {
            HashAlgorithm::Sha256
        } else {
            HashAlgorithm::Sha1
        }
    }
}
