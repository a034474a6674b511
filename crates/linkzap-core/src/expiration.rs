use crate::error::CoreError;
use jiff::{SignedDuration, Timestamp};
use std::time::Duration;

/// Expiration policy for a shortened URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// The link never expires.
    Never,
    /// The link expires after a certain duration from now.
    AfterDuration(Duration),
    /// The link expires at a specific timestamp.
    AtTimestamp(Timestamp),
}

impl ExpirationPolicy {
    /// Converts the policy into an absolute expiry relative to `now`.
    pub fn expires_at(&self, now: Timestamp) -> Result<Option<Timestamp>, CoreError> {
        match self {
            ExpirationPolicy::Never => Ok(None),
            ExpirationPolicy::AfterDuration(duration) => {
                let offset = SignedDuration::try_from(*duration)
                    .map_err(|e| CoreError::InvalidExpiration(format!("invalid duration: {e}")))?;
                now.checked_add(offset)
                    .map(Some)
                    .map_err(|e| CoreError::InvalidExpiration(format!("expiry out of range: {e}")))
            }
            ExpirationPolicy::AtTimestamp(timestamp) => Ok(Some(*timestamp)),
        }
    }
}

impl From<Option<Timestamp>> for ExpirationPolicy {
    fn from(value: Option<Timestamp>) -> Self {
        value.map_or(ExpirationPolicy::Never, ExpirationPolicy::AtTimestamp)
    }
}

/// Returns `true` once `now` has reached `expires_at`.
///
/// A link without an expiry never expires.
pub fn is_expired(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    expires_at.is_some_and(|expires_at| now >= expires_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_has_no_expiry() {
        let now = Timestamp::now();
        assert_eq!(ExpirationPolicy::Never.expires_at(now).unwrap(), None);
    }

    #[test]
    fn after_duration_is_relative_to_now() {
        let now = Timestamp::from_second(1_700_000_000).unwrap();
        let policy = ExpirationPolicy::AfterDuration(Duration::from_secs(60));

        let expires_at = policy.expires_at(now).unwrap().unwrap();
        assert_eq!(expires_at.as_second(), 1_700_000_060);
    }

    #[test]
    fn at_timestamp_is_taken_verbatim() {
        let at = Timestamp::from_second(1_800_000_000).unwrap();
        let policy = ExpirationPolicy::AtTimestamp(at);
        assert_eq!(policy.expires_at(Timestamp::now()).unwrap(), Some(at));
    }

    #[test]
    fn huge_duration_is_rejected() {
        let policy = ExpirationPolicy::AfterDuration(Duration::from_secs(u64::MAX));
        assert!(policy.expires_at(Timestamp::now()).is_err());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let at = Timestamp::from_second(1_700_000_000).unwrap();
        assert!(is_expired(Some(at), at));
        assert!(!is_expired(Some(at), at - SignedDuration::from_secs(1)));
        assert!(!is_expired(None, at));
    }
}
