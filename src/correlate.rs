//! Archive correlation engine
//!
//! Matches a kill timestamp against the broadcaster's recent archive
//! windows and computes the playback offset into the containing
//! recording. Provider order decides ties (first containing window wins,
//! not closest timestamp). When no window contains the kill, or the
//! archive fetch fails for any reason, the engine falls back to a
//! synthetic match, so once a broadcaster identity exists correlation
//! always produces a displayable result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenCache;
use crate::config::Config;
use crate::types::{
    parse_duration_seconds, ArchiveEntry, ArchiveMatch, BroadcasterId, CorrelatedResult,
    KillEvent, ResultTier, SyntheticMatch,
};

/// Window length substituted when the provider reports unknown duration
const UNKNOWN_DURATION_WINDOW_SECS: u32 = 3600;

/// Fetches a broadcaster's recent archive entries, most recent first
#[async_trait]
pub trait ArchiveProvider: Send + Sync {
    async fn recent_archives(
        &self,
        broadcaster: &BroadcasterId,
        count: u32,
    ) -> Result<Vec<ArchiveEntry>, Box<dyn std::error::Error>>;
}

#[derive(Debug, Deserialize)]
struct VideoPayload {
    data: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    id: String,
    created_at: DateTime<Utc>,
    duration: String,
    title: String,
    thumbnail_url: String,
    url: String,
}

/// Helix-style archive provider backed by the credential cache
pub struct HelixArchiveProvider {
    api_url: String,
    client_id: Option<String>,
    tokens: Arc<TokenCache>,
}

impl HelixArchiveProvider {
    pub fn new(config: &Config, tokens: Arc<TokenCache>) -> Self {
        Self {
            api_url: config.archive_api_url.clone(),
            client_id: config.archive_client_id.clone(),
            tokens,
        }
    }
}

#[async_trait]
impl ArchiveProvider for HelixArchiveProvider {
    async fn recent_archives(
        &self,
        broadcaster: &BroadcasterId,
        count: u32,
    ) -> Result<Vec<ArchiveEntry>, Box<dyn std::error::Error>> {
        let credential = self.tokens.acquire().await;
        if credential.is_degraded() {
            return Err("archive credential unavailable".into());
        }

        let url = format!(
            "{}?user_login={}&type=archive&first={}",
            self.api_url, broadcaster, count
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let mut request = client
            .get(&url)
            .header("Authorization", format!("Bearer {}", credential.token));
        if let Some(client_id) = &self.client_id {
            request = request.header("Client-ID", client_id);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(format!("archive API returned {}", response.status()).into());
        }

        let payload: VideoPayload = response.json().await?;
        Ok(payload
            .data
            .into_iter()
            .map(|video| ArchiveEntry {
                id: video.id,
                started_at: video.created_at,
                duration_seconds: parse_duration_seconds(&video.duration),
                title: video.title,
                thumbnail_template: video.thumbnail_url,
                canonical_url: video.url,
            })
            .collect())
    }
}

pub struct CorrelationEngine {
    provider: Arc<dyn ArchiveProvider>,
    fetch_count: u32,
    lead_seconds: i64,
}

impl CorrelationEngine {
    pub fn new(provider: Arc<dyn ArchiveProvider>, config: &Config) -> Self {
        Self {
            provider,
            fetch_count: config.archive_fetch_count,
            lead_seconds: config.lead_seconds,
        }
    }

    /// Correlate one kill against the broadcaster's recent archives
    ///
    /// `source_tier` is the tier of the kill source that produced the
    /// event; it is downgraded to Synthetic when the match itself is
    /// synthetic.
    pub async fn correlate(
        &self,
        broadcaster: &BroadcasterId,
        kill: KillEvent,
        source_tier: ResultTier,
    ) -> CorrelatedResult {
        match self
            .provider
            .recent_archives(broadcaster, self.fetch_count)
            .await
        {
            Ok(entries) => {
                for entry in entries {
                    if window_contains(&entry, kill.occurred_at) {
                        let offset = self.playback_offset(&entry, kill.occurred_at);
                        return CorrelatedResult {
                            kill_event: kill,
                            broadcaster: broadcaster.clone(),
                            archive_match: ArchiveMatch::Archive(entry),
                            playback_offset_seconds: offset,
                            tier: source_tier,
                        };
                    }
                }
                log::debug!(
                    "No archive window of {} contains {}",
                    broadcaster,
                    kill.occurred_at
                );
            }
            Err(e) => {
                log::warn!("Archive fetch for {} failed: {}", broadcaster, e);
            }
        }

        CorrelatedResult {
            archive_match: ArchiveMatch::Synthetic(SyntheticMatch::for_broadcaster(broadcaster)),
            kill_event: kill,
            broadcaster: broadcaster.clone(),
            playback_offset_seconds: 0,
            tier: ResultTier::Synthetic,
        }
    }

    /// Offset into the archive, backed up by the lead and clamped to
    /// `[0, duration]` (lower bound only when duration is unknown)
    fn playback_offset(&self, entry: &ArchiveEntry, occurred_at: DateTime<Utc>) -> u32 {
        let raw = (occurred_at - entry.started_at).num_seconds() - self.lead_seconds;
        let clamped_low = raw.max(0) as u32;
        if entry.duration_seconds > 0 {
            clamped_low.min(entry.duration_seconds)
        } else {
            clamped_low
        }
    }
}

/// Window test: `[started_at, started_at + duration]`, with a
/// conservative default length when the duration is the unknown sentinel
fn window_contains(entry: &ArchiveEntry, at: DateTime<Utc>) -> bool {
    let window_secs = if entry.duration_seconds == 0 {
        UNKNOWN_DURATION_WINDOW_SECS
    } else {
        entry.duration_seconds
    };
    let end = entry.started_at + chrono::Duration::seconds(window_secs as i64);
    entry.started_at <= at && at <= end
}
