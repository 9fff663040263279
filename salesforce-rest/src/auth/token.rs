use std::time::{Duration, SystemTime};

/// A bearer token and the moment it was issued.
///
/// Tokens are immutable; a refresh replaces the whole value. Expiry is
/// evaluated lazily against the lifetime the token was created with.
#[derive(Debug, Clone)]
pub struct AccessToken {
    value: oauth2::AccessToken,
    created_at: SystemTime,
    lifetime: Duration,
}

impl AccessToken {
    /// Creates a token issued now.
    pub fn new(value: impl Into<String>, lifetime: Duration) -> Self {
        Self::with_created_at(value, SystemTime::now(), lifetime)
    }

    /// Creates a token with an explicit issue time.
    pub fn with_created_at(
        value: impl Into<String>,
        created_at: SystemTime,
        lifetime: Duration,
    ) -> Self {
        Self {
            value: oauth2::AccessToken::new(value.into()),
            created_at,
            lifetime,
        }
    }

    /// Returns the token string.
    pub fn secret(&self) -> &str {
        self.value.secret()
    }

    /// Returns when the token was issued.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns how long the token stays valid after [`created_at`](Self::created_at).
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Returns true once the token is older than its lifetime.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Returns true if, at `now`, the token is older than its lifetime.
    ///
    /// A token exactly as old as its lifetime is still valid. A `now` earlier
    /// than the issue time counts as zero elapsed time.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        let elapsed = now.duration_since(self.created_at).unwrap_or_default();
        elapsed > self.lifetime
    }
}

impl PartialEq for AccessToken {
    fn eq(&self, other: &Self) -> bool {
        self.secret() == other.secret()
            && self.created_at == other.created_at
            && self.lifetime == other.lifetime
    }
}

impl Eq for AccessToken {}

#[cfg(test)]
mod tests {
    use super::*;

    const LIFETIME: Duration = Duration::from_secs(5400);

    #[test]
    fn test_new_token_is_not_expired() {
        let token = AccessToken::new("00Dxx!token", LIFETIME);
        assert!(!token.is_expired());
        assert_eq!(token.secret(), "00Dxx!token");
        assert_eq!(token.lifetime(), LIFETIME);
    }

    #[test]
    fn test_expiry_boundary() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let token = AccessToken::with_created_at("t", created_at, LIFETIME);
        assert_eq!(token.created_at(), created_at);

        assert!(!token.is_expired_at(created_at));
        assert!(!token.is_expired_at(created_at + LIFETIME));
        assert!(token.is_expired_at(created_at + LIFETIME + Duration::from_secs(1)));
    }

    #[test]
    fn test_expiry_matches_elapsed_time() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let lifetime = Duration::from_secs(60);
        let token = AccessToken::with_created_at("t", created_at, lifetime);

        for elapsed in [0u64, 1, 59, 60, 61, 3600] {
            let now = created_at + Duration::from_secs(elapsed);
            assert_eq!(token.is_expired_at(now), elapsed > 60, "elapsed {elapsed}");
        }
    }

    #[test]
    fn test_clock_before_creation_is_not_expired() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let token = AccessToken::with_created_at("t", created_at, Duration::ZERO);
        assert!(!token.is_expired_at(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn test_old_token_is_expired() {
        let token = AccessToken::with_created_at("t", SystemTime::UNIX_EPOCH, LIFETIME);
        assert!(token.is_expired());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AccessToken::new("super-secret", LIFETIME);
        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("AccessToken"));
        assert!(!debug_str.contains("super-secret"));
    }
}
