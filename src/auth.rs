//! Archive-provider credential cache
//!
//! Obtains a bearer credential via the client-credentials grant and reuses
//! it until expiry. The credential survives process restarts through a
//! single on-disk slot (`token|expiryRFC3339`, one line). Every failure
//! mode (missing configuration, non-2xx exchange, malformed body, corrupt
//! slot file) degrades to a sentinel credential instead of raising, so the
//! rest of the pipeline falls back to synthetic data rather than aborting
//! the query.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;

/// Token the degraded sentinel carries, matching what archive calls see
/// when no real credential exists
pub const DEGRADED_TOKEN: &str = "dummy_token";

/// Fallback lifetime when the provider omits `expires_in`
const DEFAULT_EXPIRY_SECS: i64 = 3600;

/// Bearer credential for the archive provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Sentinel returned when no credential could be obtained
    ///
    /// Carries an already-expired timestamp so archive calls treat the
    /// provider as unavailable while a later `acquire()` may retry.
    pub fn degraded() -> Self {
        Self {
            token: DEGRADED_TOKEN.to_string(),
            expires_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.token == DEGRADED_TOKEN
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.is_degraded() && now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Process-wide credential cache with single-flight refresh
///
/// Concurrent callers during a refresh wait on the refresh mutex and
/// observe the refreshed credential; callers hitting a valid cached
/// credential read it concurrently without contention.
pub struct TokenCache {
    auth_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    slot_path: String,
    cached: RwLock<Option<Credential>>,
    refresh: Mutex<()>,
}

impl TokenCache {
    pub fn new(config: &Config) -> Self {
        Self {
            auth_url: config.auth_url.clone(),
            client_id: config.archive_client_id.clone(),
            client_secret: config.archive_client_secret.clone(),
            slot_path: config.token_cache_path.clone(),
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return a usable credential, refreshing at most once per expiry
    ///
    /// Never fails: any exchange problem yields the degraded sentinel.
    pub async fn acquire(&self) -> Credential {
        let now = Utc::now();

        // Fast path: unexpired in-memory credential, concurrent reads
        if let Some(cred) = self.cached.read().await.as_ref() {
            if cred.is_valid(now) {
                return cred.clone();
            }
        }

        // Single-flight: one refresh at a time; late arrivals re-check
        // the slot filled by whoever held the lock before them
        let _guard = self.refresh.lock().await;
        if let Some(cred) = self.cached.read().await.as_ref() {
            if cred.is_valid(now) {
                return cred.clone();
            }
        }

        // Disk slot: a previous process run may have left a live token
        if let Some(cred) = read_slot(&self.slot_path) {
            if cred.is_valid(now) {
                log::info!("Reusing archive credential from {}", self.slot_path);
                *self.cached.write().await = Some(cred.clone());
                return cred;
            }
        }

        let cred = match self.exchange().await {
            Ok(cred) => {
                if let Err(e) = write_slot(&self.slot_path, &cred) {
                    log::warn!("Failed to persist credential to {}: {}", self.slot_path, e);
                }
                log::info!("Refreshed archive credential (expires {})", cred.expires_at);
                cred
            }
            Err(e) => {
                log::warn!("Archive credential exchange failed: {}", e);
                Credential::degraded()
            }
        };

        *self.cached.write().await = Some(cred.clone());
        cred
    }

    /// Perform the client-credentials exchange
    async fn exchange(&self) -> Result<Credential, Box<dyn std::error::Error>> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or("TWITCH_CLIENT_ID not configured")?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or("TWITCH_CLIENT_SECRET not configured")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let response = client
            .post(&self.auth_url)
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("auth endpoint returned {}", response.status()).into());
        }

        let body: TokenResponse = response.json().await?;
        let expires_in = body.expires_in.unwrap_or(DEFAULT_EXPIRY_SECS);

        Ok(Credential {
            token: body.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        })
    }
}

/// Read the one-line disk slot; absence or corruption is a miss
fn read_slot(path: &str) -> Option<Credential> {
    if !Path::new(path).exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    let mut parts = content.trim().splitn(2, '|');
    let token = parts.next()?.to_string();
    let expires_at = parts
        .next()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
        .with_timezone(&Utc);
    if token.is_empty() {
        return None;
    }
    Some(Credential { token, expires_at })
}

/// Overwrite the disk slot with a freshly exchanged credential
fn write_slot(path: &str, cred: &Credential) -> Result<(), Box<dyn std::error::Error>> {
    fs::write(path, format!("{}|{}", cred.token, cred.expires_at.to_rfc3339()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_slot(path: &str) -> TokenCache {
        let config = Config {
            token_cache_path: path.to_string(),
            ..Config::default()
        };
        TokenCache::new(&config)
    }

    #[test]
    fn test_slot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        let path = path.to_str().unwrap();

        let cred = Credential {
            token: "abc123".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        write_slot(path, &cred).unwrap();

        let loaded = read_slot(path).unwrap();
        assert_eq!(loaded.token, "abc123");
        assert!(loaded.is_valid(Utc::now()));
    }

    #[test]
    fn test_corrupt_slot_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        fs::write(&path, "garbage-no-separator").unwrap();
        assert!(read_slot(path.to_str().unwrap()).is_none());

        fs::write(&path, "token|not-a-timestamp").unwrap();
        assert!(read_slot(path.to_str().unwrap()).is_none());
    }

    #[test]
    fn test_missing_slot_is_a_miss() {
        assert!(read_slot("/nonexistent/token.txt").is_none());
    }

    #[test]
    fn test_degraded_credential_never_valid() {
        let cred = Credential::degraded();
        assert!(cred.is_degraded());
        assert!(!cred.is_valid(Utc::now()));
    }

    #[tokio::test]
    async fn test_acquire_without_credentials_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        let cache = cache_with_slot(path.to_str().unwrap());

        let cred = cache.acquire().await;
        assert!(cred.is_degraded());
    }

    #[tokio::test]
    async fn test_acquire_reuses_disk_slot_without_exchange() {
        // No client id/secret configured, so any exchange attempt would
        // degrade; a valid disk slot must be served instead.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        let path_str = path.to_str().unwrap();

        let cred = Credential {
            token: "persisted".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        write_slot(path_str, &cred).unwrap();

        let cache = cache_with_slot(path_str);
        let first = cache.acquire().await;
        let second = cache.acquire().await;
        assert_eq!(first.token, "persisted");
        assert_eq!(second.token, "persisted");
    }

    #[tokio::test]
    async fn test_expired_slot_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        let path_str = path.to_str().unwrap();

        let cred = Credential {
            token: "stale".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
        };
        write_slot(path_str, &cred).unwrap();

        let cache = cache_with_slot(path_str);
        let got = cache.acquire().await;
        assert!(got.is_degraded());
    }

    #[tokio::test]
    async fn test_concurrent_acquire_observes_same_credential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        let path_str = path.to_str().unwrap();

        let cred = Credential {
            token: "shared".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        write_slot(path_str, &cred).unwrap();

        let cache = std::sync::Arc::new(cache_with_slot(path_str));
        let a = cache.clone();
        let b = cache.clone();
        let (ra, rb) = tokio::join!(a.acquire(), b.acquire());
        assert_eq!(ra.token, "shared");
        assert_eq!(ra, rb);
    }
}
