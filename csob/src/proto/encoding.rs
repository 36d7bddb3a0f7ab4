//! Base64 encoding of merchant data.

use std::fmt::{self, Display, Formatter};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;

use crate::error::ValidationError;

/// Arbitrary merchant data, held in its base64-encoded wire form.
///
/// The gateway echoes this value back when the customer returns to the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantData(String);

impl MerchantData {
    /// Maximum length of the encoded value accepted by the gateway.
    pub const MAX_ENCODED_LEN: usize = 255;

    /// Encodes raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MerchantDataTooLong`] if the encoded value
    /// exceeds [`Self::MAX_ENCODED_LEN`] characters.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Result<Self, ValidationError> {
        Self::checked(b64.encode(input.as_ref()))
    }

    /// Wraps data the integrator already encoded.
    ///
    /// Only the length is checked; the value is sent to the gateway as given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MerchantDataTooLong`] if the value exceeds
    /// [`Self::MAX_ENCODED_LEN`] characters.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, ValidationError> {
        Self::checked(encoded.into())
    }

    fn checked(encoded: String) -> Result<Self, ValidationError> {
        if encoded.len() > Self::MAX_ENCODED_LEN {
            return Err(ValidationError::MerchantDataTooLong {
                len: encoded.len(),
                max: Self::MAX_ENCODED_LEN,
            });
        }
        Ok(Self(encoded))
    }

    /// Decodes back to the raw bytes. Pre-encoded values that are not valid
    /// base64 decode to an empty vector.
    #[must_use]
    pub fn decode(&self) -> Vec<u8> {
        b64.decode(&self.0).unwrap_or_default()
    }

    /// The encoded text as sent to the gateway.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MerchantData {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for MerchantData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
