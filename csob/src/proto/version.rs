//! Gateway API version.
//!
//! Provides [`ApiVersion`], a `major.minor` pair that serializes as the
//! string used in gateway URLs (e.g. `"1.9"`) and orders numerically, so
//! that `1.10 > 1.9`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A negotiated gateway API version.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    major: u16,
    minor: u16,
}

impl ApiVersion {
    /// eAPI 1.7, which introduced one-click payments.
    pub const V1_7: Self = Self::new(1, 7);
    /// eAPI 1.8, which dropped `description` and switched to SHA-256.
    pub const V1_8: Self = Self::new(1, 8);
    /// eAPI 1.9, the current default.
    pub const V1_9: Self = Self::new(1, 9);

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Major component.
    #[must_use]
    pub const fn major(&self) -> u16 {
        self.major
    }

    /// Minor component.
    #[must_use]
    pub const fn minor(&self) -> u16 {
        self.minor
    }

    /// Returns `true` if this version is `min` or newer.
    #[must_use]
    pub fn is_at_least(&self, min: Self) -> bool {
        *self >= min
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V1_9
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidApiVersion(s.to_owned());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse().map_err(|_| invalid())?;
        let minor = minor.parse().map_err(|_| invalid())?;
        Ok(Self::new(major, minor))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let v: ApiVersion = "1.8".parse().unwrap();
        assert_eq!(v, ApiVersion::V1_8);
        assert_eq!(v.to_string(), "1.8");
    }

    #[test]
    fn test_ordering_is_numeric() {
        let v110: ApiVersion = "1.10".parse().unwrap();
        assert!(v110 > ApiVersion::V1_9);
        assert!(ApiVersion::V1_7 < ApiVersion::V1_8);
        assert!(ApiVersion::V1_8.is_at_least(ApiVersion::V1_8));
        assert!(!ApiVersion::V1_7.is_at_least(ApiVersion::V1_8));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "1", "1.", "a.b", "1.8.1"] {
            assert!(
                matches!(bad.parse::<ApiVersion>(), Err(ValidationError::InvalidApiVersion(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ApiVersion::V1_9).unwrap();
        assert_eq!(json, "\"1.9\"");
        let back: ApiVersion = serde_json::from_str("\"1.7\"").unwrap();
        assert_eq!(back, ApiVersion::V1_7);
        assert!(serde_json::from_str::<ApiVersion>("\"latest\"").is_err());
    }
}
