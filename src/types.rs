//! Core data types for the kill-to-VOD correlation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Game platform a player account lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "pc")]
    Pc,
    #[serde(rename = "psn")]
    Psn,
    #[serde(rename = "xbl")]
    Xbl,
}

impl Platform {
    /// Slug used by the tracker site for this platform
    pub fn tracker_slug(&self) -> &'static str {
        match self {
            Platform::Pc => "origin",
            Platform::Psn => "psn",
            Platform::Xbl => "xbox",
        }
    }

    /// Slug used by the stats API for this platform
    pub fn stats_slug(&self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::Psn => "psn",
            Platform::Xbl => "xbl",
        }
    }

    /// Parse from the caller-facing form value ("pc", "psn", "xbl")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pc" => Some(Platform::Pc),
            "psn" => Some(Platform::Psn),
            "xbl" => Some(Platform::Xbl),
            _ => None,
        }
    }
}

/// Which fallback tier produced a piece of data
///
/// Live comes from a real provider observation, Approximated carries a
/// best-effort timestamp or derived count, Synthetic is manufactured
/// placeholder data. A real archive match never upgrades the tier; a
/// synthetic archive match always downgrades it to Synthetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultTier {
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "approximated")]
    Approximated,
    #[serde(rename = "synthetic")]
    Synthetic,
}

/// A single kill observed (or approximated) for the queried player
///
/// Immutable once produced. The list an adapter returns is in production
/// order; `occurred_at` is not guaranteed sorted across the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KillEvent {
    pub victim_name: String,
    pub occurred_at: DateTime<Utc>,
    pub match_id: String,
    pub weapon: String,
    pub mode: String,
}

/// Broadcaster channel login, as the archive provider knows it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BroadcasterId(pub String);

impl BroadcasterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BroadcasterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recorded broadcast session fetched from the archive provider
///
/// `duration_seconds == 0` is the provider's "unknown length" sentinel,
/// not a true zero-length archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub title: String,
    pub thumbnail_template: String,
    pub canonical_url: String,
}

impl ArchiveEntry {
    /// Expand the provider's thumbnail template to a concrete size
    ///
    /// Templates carry `%{width}x%{height}` placeholders; unknown
    /// templates are returned unchanged.
    pub fn thumbnail_url(&self, width: u32, height: u32) -> String {
        self.thumbnail_template
            .replace("%{width}", &width.to_string())
            .replace("%{height}", &height.to_string())
    }
}

/// Placeholder match used when no genuine archive window contains the kill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticMatch {
    pub title: String,
    pub thumbnail_url: String,
    pub canonical_url: String,
}

impl SyntheticMatch {
    /// Build the demonstrative placeholder for a broadcaster
    ///
    /// The title suffix marks the result as non-authoritative so callers
    /// can never mistake it for a real archive hit.
    pub fn for_broadcaster(broadcaster: &BroadcasterId) -> Self {
        Self {
            title: format!("{} stream — no exact match", broadcaster),
            thumbnail_url: format!(
                "https://static-cdn.jtvnw.net/previews-ttv/live_user_{}-320x180.jpg",
                broadcaster
            ),
            canonical_url: "https://www.twitch.tv/videos/123456789".to_string(),
        }
    }
}

/// Either a genuine archive entry or the synthetic placeholder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArchiveMatch {
    Archive(ArchiveEntry),
    Synthetic(SyntheticMatch),
}

impl ArchiveMatch {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ArchiveMatch::Synthetic(_))
    }

    pub fn title(&self) -> &str {
        match self {
            ArchiveMatch::Archive(e) => &e.title,
            ArchiveMatch::Synthetic(s) => &s.title,
        }
    }
}

/// One correlated kill: the event, who was killed on stream, and where
/// in their archive to watch it
///
/// Constructed once by the correlation engine, immutable downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedResult {
    pub kill_event: KillEvent,
    pub broadcaster: BroadcasterId,
    pub archive_match: ArchiveMatch,
    pub playback_offset_seconds: u32,
    pub tier: ResultTier,
}

impl CorrelatedResult {
    /// Clickable playback URL, offset into the archive
    pub fn watch_url(&self) -> String {
        match &self.archive_match {
            ArchiveMatch::Archive(e) => {
                format!("{}?t={}s", e.canonical_url, self.playback_offset_seconds)
            }
            ArchiveMatch::Synthetic(s) => format!("{}?t=0s", s.canonical_url),
        }
    }
}

/// Parse a provider duration string ("1h23m45s", "59m", "212s") to seconds
///
/// Malformed or empty input yields 0, the unknown-length sentinel.
pub fn parse_duration_seconds(s: &str) -> u32 {
    let mut total: u32 = 0;
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: u32 = match digits.parse() {
            Ok(v) => v,
            Err(_) => return 0,
        };
        digits.clear();
        match ch {
            'h' => total = total.saturating_add(value.saturating_mul(3600)),
            'm' => total = total.saturating_add(value.saturating_mul(60)),
            's' => total = total.saturating_add(value),
            _ => return 0,
        }
    }
    // Trailing digits without a unit mean the string was malformed
    if !digits.is_empty() {
        return 0;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_duration_full() {
        assert_eq!(parse_duration_seconds("1h23m45s"), 5025);
        assert_eq!(parse_duration_seconds("3h2m1s"), 10921);
    }

    #[test]
    fn test_parse_duration_partial_units() {
        assert_eq!(parse_duration_seconds("59m"), 3540);
        assert_eq!(parse_duration_seconds("212s"), 212);
        assert_eq!(parse_duration_seconds("2h"), 7200);
    }

    #[test]
    fn test_parse_duration_malformed_is_sentinel() {
        assert_eq!(parse_duration_seconds(""), 0);
        assert_eq!(parse_duration_seconds("1:23:45"), 0);
        assert_eq!(parse_duration_seconds("abc"), 0);
        assert_eq!(parse_duration_seconds("90"), 0);
    }

    #[test]
    fn test_thumbnail_template_expansion() {
        let entry = ArchiveEntry {
            id: "123".to_string(),
            started_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            duration_seconds: 3600,
            title: "test".to_string(),
            thumbnail_template: "https://cdn.example/thumb-%{width}x%{height}.jpg".to_string(),
            canonical_url: "https://www.twitch.tv/videos/123".to_string(),
        };
        assert_eq!(
            entry.thumbnail_url(480, 272),
            "https://cdn.example/thumb-480x272.jpg"
        );
    }

    #[test]
    fn test_platform_slugs() {
        assert_eq!(Platform::Pc.tracker_slug(), "origin");
        assert_eq!(Platform::Xbl.tracker_slug(), "xbox");
        assert_eq!(Platform::Psn.stats_slug(), "psn");
        assert_eq!(Platform::parse("XBL"), Some(Platform::Xbl));
        assert_eq!(Platform::parse("switch"), None);
    }

    #[test]
    fn test_synthetic_match_is_marked_non_authoritative() {
        let m = SyntheticMatch::for_broadcaster(&BroadcasterId("shroud".to_string()));
        assert!(m.title.contains("no exact match"));
    }

    #[test]
    fn test_result_serializes_with_tier_tags() {
        let result = CorrelatedResult {
            kill_event: KillEvent {
                victim_name: "xQc".to_string(),
                occurred_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                match_id: "m1".to_string(),
                weapon: "M5A3".to_string(),
                mode: "RedSec".to_string(),
            },
            broadcaster: BroadcasterId("xqc".to_string()),
            archive_match: ArchiveMatch::Synthetic(SyntheticMatch::for_broadcaster(
                &BroadcasterId("xqc".to_string()),
            )),
            playback_offset_seconds: 0,
            tier: ResultTier::Synthetic,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"tier\":\"synthetic\""));
        assert!(json.contains("\"victim_name\":\"xQc\""));

        let back: CorrelatedResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tier, ResultTier::Synthetic);
        assert!(back.archive_match.is_synthetic());
    }

    #[test]
    fn test_watch_url_carries_offset() {
        let entry = ArchiveEntry {
            id: "v1".to_string(),
            started_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            duration_seconds: 3600,
            title: "stream".to_string(),
            thumbnail_template: String::new(),
            canonical_url: "https://www.twitch.tv/videos/v1".to_string(),
        };
        let result = CorrelatedResult {
            kill_event: KillEvent {
                victim_name: "Shroud".to_string(),
                occurred_at: Utc.timestamp_opt(1_700_000_110, 0).unwrap(),
                match_id: "m1".to_string(),
                weapon: "NTW-50".to_string(),
                mode: "RedSec".to_string(),
            },
            broadcaster: BroadcasterId("shroud".to_string()),
            archive_match: ArchiveMatch::Archive(entry),
            playback_offset_seconds: 100,
            tier: ResultTier::Live,
        };
        assert_eq!(result.watch_url(), "https://www.twitch.tv/videos/v1?t=100s");
    }
}
