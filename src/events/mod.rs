//! Kill Event Source Adapter - Tiered Fallback Composite
//!
//! Upstream data sources for recent kills are unreliable in practice, so
//! the adapter layers them: an ordered list of sources is tried in
//! priority order and the first non-empty batch wins. Every source error
//! is absorbed here (logged, never propagated), and the last tier is a
//! synthetic generator that cannot fail, so a query always has something
//! to correlate.
//!
//! # Architecture
//!
//! ```text
//! TieredKillSource
//!     ├── TrackerScrapeSource   (match page rows, approximated stamps)
//!     ├── LiveStatsSource       (stats API, derived kill batch)
//!     └── SyntheticKillSource   (seedable generator, never empty)
//! ```
//!
//! Downstream components only ever see a uniform `Vec<KillEvent>` plus
//! the tier tag of whichever source supplied it.

pub mod live;
pub mod scrape;
pub mod synthetic;

pub use live::LiveStatsSource;
pub use scrape::TrackerScrapeSource;
pub use synthetic::SyntheticKillSource;

use async_trait::async_trait;

use crate::config::Config;
use crate::types::{KillEvent, Platform, ResultTier};

/// A single kill-event source tier
#[async_trait]
pub trait KillSource: Send + Sync {
    /// Fetch up to `limit` recent kills for a player
    ///
    /// Errors are legal here; the composite absorbs them. An empty batch
    /// means "nothing found", which also advances to the next tier.
    async fn fetch_kills(
        &self,
        player: &str,
        platform: Platform,
        limit: usize,
    ) -> Result<Vec<KillEvent>, Box<dyn std::error::Error>>;

    /// Tier tag applied to results this source produces
    fn tier(&self) -> ResultTier;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Ordered fallback composite over kill sources
///
/// First non-empty result wins. Never fails upward; with the synthetic
/// tier installed (the default construction) it never returns empty
/// either.
pub struct TieredKillSource {
    sources: Vec<Box<dyn KillSource>>,
}

impl TieredKillSource {
    pub fn new(sources: Vec<Box<dyn KillSource>>) -> Self {
        Self { sources }
    }

    /// Default tier order: tracker scrape, then stats API, then synthetic
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Box::new(TrackerScrapeSource::new(config)),
            Box::new(LiveStatsSource::new(config)),
            Box::new(SyntheticKillSource::new(config.synthetic_batch_size)),
        ])
    }

    /// Fetch kills for a player, walking tiers until one produces data
    ///
    /// Returns the batch (truncated to `limit`) and the tier tag of the
    /// source that produced it.
    pub async fn fetch_kills(
        &self,
        player: &str,
        platform: Platform,
        limit: usize,
    ) -> (Vec<KillEvent>, ResultTier) {
        for source in &self.sources {
            match source.fetch_kills(player, platform, limit).await {
                Ok(mut kills) if !kills.is_empty() => {
                    kills.truncate(limit);
                    log::info!(
                        "{} kill(s) for {} from source '{}'",
                        kills.len(),
                        player,
                        source.name()
                    );
                    return (kills, source.tier());
                }
                Ok(_) => {
                    log::debug!("Source '{}' returned no kills for {}", source.name(), player);
                }
                Err(e) => {
                    log::warn!("Source '{}' failed for {}: {}", source.name(), player, e);
                }
            }
        }
        (Vec::new(), ResultTier::Synthetic)
    }
}
