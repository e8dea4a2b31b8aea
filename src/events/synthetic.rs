//! Synthetic kill generator - the guaranteed last-resort tier
//!
//! Manufactures a small fixed-size batch of plausible kills from a pool
//! of well-known display names, each timestamped uniformly at random in
//! the past 48 hours. Never fails, never returns empty, so the pipeline
//! always has something to correlate. The RNG is injected and seedable
//! so tests are deterministic.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::KillSource;
use crate::types::{KillEvent, Platform, ResultTier};

/// Display names known to map to broadcaster channels
pub const DEMO_VICTIMS: [&str; 3] = ["xQc", "Valkyrae", "Swagg"];

/// Weapon labels paired positionally with generated kills
pub const DEMO_WEAPONS: [&str; 3] = ["NTW-50 Sniper", "M5A3 Vector", "GOL Magnum"];

const BACKDATE_WINDOW_SECS: i64 = 48 * 3600;

pub struct SyntheticKillSource {
    batch_size: usize,
    rng: Mutex<StdRng>,
}

impl SyntheticKillSource {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests
    pub fn with_seed(batch_size: usize, seed: u64) -> Self {
        Self {
            batch_size,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self) -> Vec<KillEvent> {
        let now = Utc::now();
        let mut rng = self.rng.lock().unwrap();
        (0..self.batch_size)
            .map(|i| {
                let backdate = rng.gen_range(0..BACKDATE_WINDOW_SECS);
                KillEvent {
                    victim_name: DEMO_VICTIMS[rng.gen_range(0..DEMO_VICTIMS.len())].to_string(),
                    occurred_at: now - Duration::seconds(backdate),
                    match_id: format!("DEMO-MATCH-{}", i + 1),
                    weapon: DEMO_WEAPONS[i % DEMO_WEAPONS.len()].to_string(),
                    mode: "RedSec".to_string(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl KillSource for SyntheticKillSource {
    async fn fetch_kills(
        &self,
        _player: &str,
        _platform: Platform,
        _limit: usize,
    ) -> Result<Vec<KillEvent>, Box<dyn std::error::Error>> {
        Ok(self.generate())
    }

    fn tier(&self) -> ResultTier {
        ResultTier::Synthetic
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}
