use crate::error::CacheError;
use crate::expiration;
use crate::repository::LinkRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use std::collections::HashMap;

/// Result type for cache and counter operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Prefix of every cache entry key.
pub const ENTRY_KEY_PREFIX: &str = "url:";

const FIELD_ID: &str = "id";
const FIELD_SHORT_CODE: &str = "short_code";
const FIELD_ORIGINAL_URL: &str = "original_url";
const FIELD_IS_ACTIVE: &str = "is_active";
const FIELD_EXPIRES_AT: &str = "expires_at";

/// The cached projection of a [`LinkRecord`].
///
/// On the wire every field is a string. `expires_at` is an RFC 3339 timestamp
/// and is left out entirely when the link has no expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub id: i64,
    pub short_code: ShortCode,
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<Timestamp>,
}

impl CacheEntry {
    /// Returns `true` if the entry has passed its expiry at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        expiration::is_expired(self.expires_at, now)
    }

    /// Serializes the entry into hash fields.
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            (FIELD_ID, self.id.to_string()),
            (FIELD_SHORT_CODE, self.short_code.to_string()),
            (FIELD_ORIGINAL_URL, self.original_url.clone()),
            (FIELD_IS_ACTIVE, self.is_active.to_string()),
        ];
        if let Some(expires_at) = self.expires_at {
            fields.push((FIELD_EXPIRES_AT, expires_at.to_string()));
        }
        fields
    }

    /// Parses hash fields written by [`CacheEntry::to_fields`].
    ///
    /// Returns `Ok(None)` for an empty map, which is how a missing hash reads back.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Option<Self>> {
        if fields.is_empty() {
            return Ok(None);
        }

        let id = required(fields, FIELD_ID)?
            .parse::<i64>()
            .map_err(|e| CacheError::InvalidData(format!("field '{FIELD_ID}': {e}")))?;
        let short_code = ShortCode::new(required(fields, FIELD_SHORT_CODE)?)
            .map_err(|e| CacheError::InvalidData(format!("field '{FIELD_SHORT_CODE}': {e}")))?;
        let original_url = required(fields, FIELD_ORIGINAL_URL)?.to_string();
        let is_active = parse_bool(required(fields, FIELD_IS_ACTIVE)?)?;
        let expires_at = fields
            .get(FIELD_EXPIRES_AT)
            .map(|raw| {
                raw.parse::<Timestamp>().map_err(|e| {
                    CacheError::InvalidData(format!("field '{FIELD_EXPIRES_AT}': {e}"))
                })
            })
            .transpose()?;

        Ok(Some(Self {
            id,
            short_code,
            original_url,
            is_active,
            expires_at,
        }))
    }
}

impl From<&LinkRecord> for CacheEntry {
    fn from(record: &LinkRecord) -> Self {
        Self {
            id: record.id,
            short_code: record.short_code.clone(),
            original_url: record.original_url.clone(),
            is_active: record.is_active,
            expires_at: record.expires_at,
        }
    }
}

/// Builds the cache key for a short code: `"url:" + code`.
pub fn entry_key(code: &ShortCode) -> String {
    format!("{ENTRY_KEY_PREFIX}{code}")
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| CacheError::InvalidData(format!("missing field '{name}'")))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(CacheError::InvalidData(format!(
            "field '{FIELD_IS_ACTIVE}': expected a boolean, got '{other}'"
        ))),
    }
}

/// A cache of link entries keyed by short code.
///
/// The cache is a disposable mirror of the backing store. Callers populate
/// and invalidate it themselves (cache-aside).
#[async_trait]
pub trait LinkCache: Send + Sync + 'static {
    /// Get the entry for `code`.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_entry(&self, code: &ShortCode) -> Result<Option<CacheEntry>>;

    /// Store `entry`, replacing every field of a previous entry for the same code.
    async fn set_entry(&self, entry: &CacheEntry) -> Result<()>;

    /// Remove the entry for `code`.
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expires_at: Option<Timestamp>) -> CacheEntry {
        CacheEntry {
            id: 42,
            short_code: ShortCode::new_unchecked("015ftgH"),
            original_url: "https://example.com/a?b=c".to_string(),
            is_active: true,
            expires_at,
        }
    }

    fn as_map(fields: Vec<(&'static str, String)>) -> HashMap<String, String> {
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn entry_key_uses_url_prefix() {
        let code = ShortCode::new_unchecked("015ftgH");
        assert_eq!(entry_key(&code), "url:015ftgH");
    }

    #[test]
    fn missing_expiry_is_omitted() {
        let fields = entry(None).to_fields();
        assert!(fields.iter().all(|(name, _)| *name != "expires_at"));
        assert!(fields.contains(&("is_active", "true".to_string())));
        assert!(fields.contains(&("id", "42".to_string())));
    }

    #[test]
    fn expiry_is_written_as_rfc3339() {
        let at: Timestamp = "2030-01-02T03:04:05Z".parse().unwrap();
        let fields = as_map(entry(Some(at)).to_fields());
        assert_eq!(fields["expires_at"], "2030-01-02T03:04:05Z");
    }

    #[test]
    fn parses_back_what_it_writes() {
        let at: Timestamp = "2030-01-02T03:04:05.25Z".parse().unwrap();
        let original = entry(Some(at));
        let parsed = CacheEntry::from_fields(&as_map(original.to_fields()))
            .unwrap()
            .unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn empty_hash_is_a_miss() {
        assert!(CacheEntry::from_fields(&HashMap::new()).unwrap().is_none());
    }

    #[test]
    fn accepts_numeric_booleans() {
        let mut fields = as_map(entry(None).to_fields());
        fields.insert("is_active".to_string(), "0".to_string());
        let parsed = CacheEntry::from_fields(&fields).unwrap().unwrap();
        assert!(!parsed.is_active);
    }

    #[test]
    fn rejects_partial_hash() {
        let mut fields = as_map(entry(None).to_fields());
        fields.remove("original_url");
        let err = CacheEntry::from_fields(&fields).unwrap_err();
        assert!(matches!(err, CacheError::InvalidData(_)));
    }

    #[test]
    fn rejects_garbage_expiry() {
        let mut fields = as_map(entry(None).to_fields());
        fields.insert("expires_at".to_string(), String::new());
        assert!(CacheEntry::from_fields(&fields).is_err());
    }
}
