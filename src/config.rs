use std::env;

/// Configuration loaded from environment variables
///
/// Every provider credential is optional. A missing credential degrades
/// the corresponding source to its next fallback tier; it never fails
/// startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Archive-provider application client id (optional)
    pub archive_client_id: Option<String>,
    /// Archive-provider application client secret (optional)
    pub archive_client_secret: Option<String>,
    /// Stats-provider API key; the provider accepts "free" for unkeyed use
    pub stats_api_key: String,
    pub rust_log: Option<String>,

    /// Number of recent archives fetched per correlation call
    pub archive_fetch_count: u32,
    /// Seconds to back the playback offset up before the kill
    pub lead_seconds: i64,
    /// Pause between successive correlation calls (rate-limit contract)
    pub correlation_delay_ms: u64,
    /// On-disk slot for the cached archive-provider credential
    pub token_cache_path: String,
    /// Size of the guaranteed synthetic kill batch
    pub synthetic_batch_size: usize,
    /// Maximum kill events fetched per query
    pub kill_fetch_limit: usize,

    /// Archive-provider OAuth endpoint
    pub auth_url: String,
    /// Archive-provider videos endpoint
    pub archive_api_url: String,
    /// Tracker site base URL (scrape tier)
    pub tracker_base_url: String,
    /// Stats API base URL (live tier)
    pub stats_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Recognized variables: TWITCH_CLIENT_ID, TWITCH_CLIENT_SECRET,
    /// GAMETOOLS_API_KEY, RUST_LOG. All optional.
    pub fn from_env() -> Self {
        let archive_client_id = env::var("TWITCH_CLIENT_ID").ok().filter(|s| !s.is_empty());
        let archive_client_secret = env::var("TWITCH_CLIENT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());
        let stats_api_key = env::var("GAMETOOLS_API_KEY").unwrap_or_else(|_| "free".to_string());
        let rust_log = env::var("RUST_LOG").ok();

        Self {
            archive_client_id,
            archive_client_secret,
            stats_api_key,
            rust_log,
            ..Self::default()
        }
    }

    /// True when the archive-provider credential exchange can be attempted
    pub fn has_archive_credentials(&self) -> bool {
        self.archive_client_id.is_some() && self.archive_client_secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_client_id: None,
            archive_client_secret: None,
            stats_api_key: "free".to_string(),
            rust_log: None,
            archive_fetch_count: 5,
            lead_seconds: 10,
            correlation_delay_ms: 1000,
            token_cache_path: "twitch_token.txt".to_string(),
            synthetic_batch_size: 3,
            kill_fetch_limit: 20,
            auth_url: "https://id.twitch.tv/oauth2/token".to_string(),
            archive_api_url: "https://api.twitch.tv/helix/videos".to_string(),
            tracker_base_url: "https://battlefieldtracker.com".to_string(),
            stats_base_url: "https://api.gametools.network".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.archive_fetch_count, 5);
        assert_eq!(config.lead_seconds, 10);
        assert_eq!(config.correlation_delay_ms, 1000);
        assert_eq!(config.synthetic_batch_size, 3);
        assert_eq!(config.stats_api_key, "free");
        assert!(!config.has_archive_credentials());
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let config = Config {
            archive_client_id: Some("id".to_string()),
            ..Config::default()
        };
        assert!(!config.has_archive_credentials());

        let config = Config {
            archive_client_id: Some("id".to_string()),
            archive_client_secret: Some("secret".to_string()),
            ..Config::default()
        };
        assert!(config.has_archive_credentials());
    }
}
