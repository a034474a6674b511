use crate::base62;
use crate::error::CoreError;
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A short code identifying a link record.
///
/// Generated codes are base62 strings of a fixed width (7 symbols by default).
/// A code may be longer than that width once the counter outgrows it, but it
/// never contains anything outside the base62 alphabet.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ShortCode(SmolStr);

pub const MIN_LENGTH: usize = 1;
/// Longest accepted code; matches the width of the store's `short_code` column.
pub const MAX_LENGTH: usize = 16;

impl ShortCode {
    /// Creates a `ShortCode` after validating the input.
    ///
    /// Valid codes are 1-16 characters drawn from `[0-9A-Za-z]`.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CoreError> {
        let code = code.as_ref();
        Self::validate(code)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Encodes a counter value as a code at least `length` symbols wide.
    pub fn from_value(value: u64, length: usize) -> Self {
        Self(SmolStr::new(base62::encode(value, length)))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes read back from trusted sources such as the
    /// backing store or the cache.
    pub fn new_unchecked(code: impl AsRef<str>) -> Self {
        Self(SmolStr::new(code.as_ref()))
    }

    /// Decodes the code back into the counter value it was produced from.
    pub fn value(&self) -> Result<u64, CoreError> {
        base62::decode(&self.0)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    fn validate(code: &str) -> Result<(), CoreError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !base62::is_base62(code) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only base62 characters: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCode").field(&self.0).finish()
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShortCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("abc").is_ok());
        assert!(ShortCode::new("015ftgH").is_ok());
        assert!(ShortCode::new("z".repeat(16)).is_ok());
    }

    #[test]
    fn empty_or_too_long() {
        assert!(ShortCode::new("").is_err());
        assert!(ShortCode::new("a".repeat(17)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc-def").is_err());
        assert!(ShortCode::new("abc_def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
    }

    #[test]
    fn from_value_pads_to_width() {
        let code = ShortCode::from_value(1_000_000_001, 7);
        assert_eq!(code.as_str(), "015ftgH");
        assert_eq!(code.value().unwrap(), 1_000_000_001);
    }

    #[test]
    fn parse_via_from_str() {
        let code: ShortCode = "015ftgH".parse().unwrap();
        assert_eq!(code.to_string(), "015ftgH");
        assert!("bad!".parse::<ShortCode>().is_err());
    }

    #[test]
    fn to_url_joins_cleanly() {
        let code = ShortCode::new("abc1234").unwrap();
        assert_eq!(code.to_url("https://lz.ap"), "https://lz.ap/abc1234");
        assert_eq!(code.to_url("https://lz.ap/"), "https://lz.ap/abc1234");
    }
}
