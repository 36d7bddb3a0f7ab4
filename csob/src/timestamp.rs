//! Request timestamps in the gateway's `dttm` format.
//!
//! Every request carries the local time of its creation as fourteen digits,
//! `YYYYMMDDHHMMSS`. The gateway rejects requests whose `dttm` drifts too far
//! from its own clock, so the value is taken when the payment is prepared.

use std::fmt::{Display, Formatter};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Format string of the `dttm` field.
pub const DTTM_FORMAT: &str = "%Y%m%d%H%M%S";

/// A local wall-clock timestamp serialized as `YYYYMMDDHHMMSS`.
///
/// ```json
/// "20240131235959"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct Dttm(NaiveDateTime);

impl Dttm {
    /// Wraps a wall-clock time.
    #[must_use]
    pub const fn from_naive(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Returns the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Parses a fourteen-digit `dttm` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `YYYYMMDDHHMMSS` time.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, DTTM_FORMAT).map(Self)
    }

    /// Returns the wrapped wall-clock time.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl Display for Dttm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DTTM_FORMAT))
    }
}

impl Serialize for Dttm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dttm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_fourteen_digits() {
        let dttm = Dttm::parse("20240131235959").unwrap();
        assert_eq!(dttm.to_string(), "20240131235959");

        let now = Dttm::now().to_string();
        assert_eq!(now.len(), 14);
        assert!(now.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Dttm::parse("2024-01-31").is_err());
        assert!(Dttm::parse("20241301000000").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let dttm = Dttm::parse("20230615120000").unwrap();
        let json = serde_json::to_string(&dttm).unwrap();
        assert_eq!(json, "\"20230615120000\"");
        let back: Dttm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dttm);
    }
}
