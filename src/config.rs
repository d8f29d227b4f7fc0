//! Engine tunables.
//!
//! Defaults reproduce the interactive behaviour (exact enumeration up to
//! 200k boards, 40k Monte-Carlo samples otherwise, 18 equity buckets). A JSON
//! file can override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PokerError, PokerResult};

pub const DEFAULT_ENUMERATION_LIMIT: u64 = 200_000;
pub const DEFAULT_MONTE_CARLO_SAMPLES: usize = 40_000;
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_ITERATIONS: u32 = 20_000;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 200_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest board count enumerated exhaustively before switching to sampling.
    pub enumeration_limit: u64,
    /// Samples drawn on the Monte-Carlo path.
    pub monte_carlo_samples: usize,
    /// Maximum number of memoised showdowns.
    pub cache_capacity: usize,
    /// Runouts sampled per villain combo when annotating hero equity.
    pub combo_equity_samples: usize,
    /// Per-combo runout count below which hero equity is enumerated exactly.
    pub combo_enumeration_limit: u64,
    pub min_buckets: usize,
    pub max_buckets: usize,
    /// How many per-combo call details a solve reports.
    pub detail_limit: usize,
    /// CFR+ stops early once its exploitability estimate falls below this.
    pub exploitability_threshold: f64,
    pub default_iterations: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            enumeration_limit: DEFAULT_ENUMERATION_LIMIT,
            monte_carlo_samples: DEFAULT_MONTE_CARLO_SAMPLES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            combo_equity_samples: 400,
            combo_enumeration_limit: 2_000,
            min_buckets: 4,
            max_buckets: 18,
            detail_limit: 200,
            exploitability_threshold: 0.001,
            default_iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> PokerResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> PokerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> PokerResult<()> {
        if self.monte_carlo_samples == 0 {
            return Err(PokerError::InvalidValue(
                "monte_carlo_samples must be positive".to_string(),
            ));
        }
        if self.combo_equity_samples == 0 {
            return Err(PokerError::InvalidValue(
                "combo_equity_samples must be positive".to_string(),
            ));
        }
        if self.min_buckets == 0 || self.min_buckets > self.max_buckets {
            return Err(PokerError::InvalidValue(format!(
                "bucket bounds must satisfy 0 < min ({}) <= max ({})",
                self.min_buckets, self.max_buckets
            )));
        }
        if !(self.exploitability_threshold >= 0.0) {
            return Err(PokerError::InvalidValue(
                "exploitability_threshold must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Iteration budget clamped to the supported range.
    pub fn clamp_iterations(iterations: u32) -> u32 {
        iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS)
    }
}
