//! Pipeline orchestrator
//!
//! Sequences the per-query flow: fetch kills, resolve each victim to a
//! broadcaster, correlate resolved kills against the broadcaster's
//! archives. Correlation calls are deliberately serialized with a fixed
//! inter-call pause to respect third-party rate limits; there is no
//! retry logic anywhere in the pipeline. Output order matches the order
//! kill events were produced by the adapter.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::auth::TokenCache;
use crate::config::Config;
use crate::correlate::{ArchiveProvider, CorrelationEngine, HelixArchiveProvider};
use crate::events::TieredKillSource;
use crate::resolver::IdentityResolver;
use crate::types::{CorrelatedResult, Platform};

/// Query output plus how many kills were scanned to produce it
///
/// `scanned_count` counts every kill the adapter produced; results only
/// contain the subset whose victims resolved to broadcasters.
#[derive(Debug)]
pub struct QueryReport {
    pub results: Vec<CorrelatedResult>,
    pub scanned_count: usize,
}

pub struct Orchestrator {
    kill_source: TieredKillSource,
    resolver: IdentityResolver,
    engine: CorrelationEngine,
    kill_fetch_limit: usize,
    correlation_delay: Duration,
}

impl Orchestrator {
    /// Production wiring: tiered kill sources, built-in streamer table,
    /// Helix archive provider behind the shared credential cache
    pub fn new(config: &Config, tokens: Arc<TokenCache>) -> Self {
        let provider: Arc<dyn ArchiveProvider> =
            Arc::new(HelixArchiveProvider::new(config, tokens));
        Self::with_parts(
            config,
            TieredKillSource::from_config(config),
            IdentityResolver::with_known_streamers(),
            CorrelationEngine::new(provider, config),
        )
    }

    /// Explicit wiring, used by tests and alternative deployments
    pub fn with_parts(
        config: &Config,
        kill_source: TieredKillSource,
        resolver: IdentityResolver,
        engine: CorrelationEngine,
    ) -> Self {
        Self {
            kill_source,
            resolver,
            engine,
            kill_fetch_limit: config.kill_fetch_limit,
            correlation_delay: Duration::from_millis(config.correlation_delay_ms),
        }
    }

    /// Run a query and return the ordered correlated results
    pub async fn query(&self, player: &str, platform: Platform) -> Vec<CorrelatedResult> {
        self.query_report(player, platform).await.results
    }

    /// Run a query, also reporting the total kills scanned
    pub async fn query_report(&self, player: &str, platform: Platform) -> QueryReport {
        let (kills, tier) = self
            .kill_source
            .fetch_kills(player, platform, self.kill_fetch_limit)
            .await;
        let scanned_count = kills.len();

        let mut results = Vec::new();
        for kill in kills {
            let broadcaster = match self.resolver.resolve(&kill.victim_name) {
                Some(b) => b,
                None => {
                    // Not an error: the victim just isn't a known streamer
                    log::debug!("No broadcaster mapping for victim '{}'", kill.victim_name);
                    continue;
                }
            };

            // Pause between successive correlation calls, not before the
            // first one
            if !results.is_empty() {
                sleep(self.correlation_delay).await;
            }

            let result = self.engine.correlate(&broadcaster, kill, tier).await;
            results.push(result);
        }

        log::info!(
            "Query for {} on {:?}: {} result(s) from {} scanned kill(s)",
            player,
            platform,
            results.len(),
            scanned_count
        );
        QueryReport {
            results,
            scanned_count,
        }
    }
}
