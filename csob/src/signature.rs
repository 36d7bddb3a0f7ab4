//! Signature base construction and the signing collaborator.
//!
//! The gateway verifies a request by rebuilding the signature base from the
//! fields it received and checking the merchant's RSA signature over it. The
//! base is the depth-first flattening of the canonical entries, joined with
//! `|`. Any difference in order or formatting makes verification fail on the
//! gateway side, with no way to detect it locally.

use serde_json::Value;

use crate::config::{HashAlgorithm, KeyMaterial};
use crate::error::SignatureError;

/// Separator between flattened values in the signature base.
pub const SEPARATOR: char = '|';

/// One named value of the canonical field sequence.
///
/// Records (cart, customer, order) are carried as JSON arrays or objects
/// whose own order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Wire name of the field.
    pub name: &'static str,
    /// Field value. `Null` stands for an absent scalar.
    pub value: Value,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(name: &'static str, value: Value) -> Self {
        Self { name, value }
    }
}

/// Flattens entries into the signature base string.
///
/// Scalars contribute one segment each: strings verbatim, numbers in
/// decimal, booleans as `true`/`false`, `null` as an empty segment. Arrays
/// and objects contribute their values in order, so an empty record
/// contributes nothing.
#[must_use]
pub fn signature_base(entries: &[Entry]) -> String {
    let mut parts = Vec::with_capacity(entries.len());
    for entry in entries {
        flatten(&entry.value, &mut parts);
    }
    let mut base = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            base.push(SEPARATOR);
        }
        base.push_str(part);
    }
    base
}

fn flatten(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => out.push(String::new()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| flatten(v, out)),
        Value::Object(map) => map.values().for_each(|v| flatten(v, out)),
    }
}

/// Signs request data with the merchant's private key.
///
/// Implementations wrap an RSA library; this crate only prepares the base
/// string and passes the key location and hash algorithm from the merchant
/// configuration.
pub trait Signer: Send + Sync {
    /// Signs `base` and returns the base64-encoded signature.
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] if the key cannot be loaded or the
    /// signing operation fails.
    fn sign(
        &self,
        base: &str,
        key: &KeyMaterial,
        hash: HashAlgorithm,
    ) -> Result<String, SignatureError>;

    /// Builds the string to sign from the canonical entries.
    fn signature_base(&self, entries: &[Entry]) -> String {
        signature_base(entries)
    }
}
