//! Single-street CFR solvers.
//!
//! Every variant plays the same [`game::CfrGame`] against the villain range
//! and reports a [`SolveSummary`] over equity buckets. They differ in how
//! regrets accumulate, how the range is traversed and which bet sizes exist.

pub mod buckets;
pub mod cfr_plus;
pub mod game;
pub mod monte_carlo;
pub mod multi_size;
pub mod parallel;
pub mod per_combo;
pub mod regrets;
pub mod vanilla;

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::cancel::{is_cancelled, Ticket};
use crate::cards::Card;
use crate::config::EngineConfig;
use crate::range::VillainRange;

use buckets::{membership, Bucket};
use game::{AverageProfile, CfrGame, Sample, HERO_CALL, ROOT};
use regrets::RegretTable;

/// Call probabilities strictly inside this margin of 0 and 1 count as mixed.
const MIXED_MARGIN: f64 = 1e-3;

/// Everything a solver needs for one spot. Shared read-only by all variants.
#[derive(Debug, Clone, Copy)]
pub struct SolverContext<'a> {
    /// Villain range with hero equity annotated on every combo.
    pub range: &'a VillainRange,
    pub hero_equity: f64,
    pub pot: f64,
    pub bet: f64,
    pub stack: f64,
    pub iterations: u32,
    /// Seed for variants that sample.
    pub seed: u64,
    pub config: &'a EngineConfig,
    pub ticket: Option<&'a Ticket>,
}

impl SolverContext<'_> {
    /// The bet hero can actually make: `min(bet, stack)`.
    pub fn effective_bet(&self) -> f64 {
        self.bet.min(self.stack).max(0.0)
    }

    /// Rejects spots no variant can solve and returns the usable bet.
    pub fn validate(&self) -> Result<f64, SolveFailure> {
        if self.range.is_empty() {
            return Err(SolveFailure::EmptyRange);
        }
        if !(self.range.total_weight() > 0.0) {
            return Err(SolveFailure::ZeroRangeWeight);
        }
        let bet = self.effective_bet();
        if !(bet > 0.0) {
            return Err(SolveFailure::NoBetAction);
        }
        if !(self.pot.is_finite() && bet.is_finite()) {
            return Err(SolveFailure::Numerical(format!(
                "pot {} and bet {} must be finite",
                self.pot, bet
            )));
        }
        Ok(bet)
    }

    pub fn check_cancelled(&self) -> Result<(), SolveFailure> {
        if is_cancelled(self.ticket) {
            return Err(SolveFailure::Cancelled);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SolveFailure {
    #[error("villain range is empty")]
    EmptyRange,
    #[error("villain range has no positive weight")]
    ZeroRangeWeight,
    #[error("no bet can be made with this pot and stack")]
    NoBetAction,
    #[error("range could not be bucketed")]
    NoBuckets,
    #[error("superseded by a newer request")]
    Cancelled,
    #[error("numerical failure: {0}")]
    Numerical(String),
    #[error("solver panicked: {0}")]
    Panicked(String),
}

/// A solver variant. Closures with the right signature implement it too.
pub trait Solver: Send + Sync {
    fn solve(&self, ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure>;
}

impl<F> Solver for F
where
    F: Fn(&SolverContext<'_>) -> Result<SolveSummary, SolveFailure> + Send + Sync,
{
    fn solve(&self, ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
        self(ctx)
    }
}

// ---------------------------------------------------------------------------
// Summary types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeroStrategy {
    pub bet: f64,
    pub check: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CallStrategy {
    pub fold: f64,
    pub call: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboDetail {
    pub cards: [Card; 2],
    pub label: String,
    /// Combo weight over total range weight.
    pub weight_share: f64,
    pub hero_equity: f64,
    pub call_probability: f64,
    pub bet_after_check: f64,
    pub bucket: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub equity: f64,
    pub probability: f64,
    pub combos: usize,
    pub call_probability: f64,
    pub bet_after_check: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetSizeLine {
    pub size: f64,
    /// How often hero picks this size at the root.
    pub frequency: f64,
    pub villain_call_frequency: f64,
    pub ev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonkSizeLine {
    pub size: f64,
    /// How often the villain leads this size after a check.
    pub frequency: f64,
    pub hero_call_frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergencePoint {
    pub iteration: u32,
    pub exploitability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Convergence {
    pub iterations: u32,
    /// Positive cumulative regret at hero's decision nodes per iteration.
    pub average_regret: f64,
    pub exploitability: f64,
    pub history: Vec<ConvergencePoint>,
    pub stopped_early: bool,
}

impl Convergence {
    pub(crate) fn measure(
        game: &CfrGame,
        table: &RegretTable,
        profile: &AverageProfile,
        samples: &[Sample],
        iterations: u32,
        history: Vec<ConvergencePoint>,
        stopped_early: bool,
    ) -> Self {
        let regret = table.positive_regret(ROOT, 0) + (0..game.villain_sizes.len())
            .map(|m| table.positive_regret(HERO_CALL, m))
            .sum::<f64>();
        Convergence {
            iterations,
            average_regret: regret / iterations.max(1) as f64,
            exploitability: game.exploitability(profile, samples),
            history,
            stopped_early,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveSummary {
    pub hero_strategy: HeroStrategy,
    pub hero_call_strategy: CallStrategy,
    pub villain_call_frequency: f64,
    pub villain_fold_frequency: f64,
    pub villain_bet_after_check_frequency: f64,
    pub ev_bet: f64,
    pub ev_check: f64,
    /// Hero's value under the averaged strategies.
    pub hero_utility: f64,
    /// Hero equity around which the villain starts calling.
    pub call_threshold: f64,
    pub call_weight: f64,
    pub bluff_weight: f64,
    pub bet_sizes: Vec<BetSizeLine>,
    pub donk_sizes: Vec<DonkSizeLine>,
    pub buckets: Vec<BucketSummary>,
    pub details: Vec<ComboDetail>,
    pub convergence: Convergence,
}

impl SolveSummary {
    pub fn recommended_action(&self) -> &'static str {
        if self.hero_strategy.bet >= self.hero_strategy.check {
            "BET"
        } else {
            "CHECK"
        }
    }
}

/// One traversal sample per bucket, weighted by bucket probability.
pub(crate) fn bucket_samples(buckets: &[Bucket]) -> Vec<Sample> {
    buckets
        .iter()
        .enumerate()
        .map(|(infoset, b)| Sample {
            infoset,
            equity: b.equity,
            probability: b.probability,
        })
        .collect()
}

/// Turns a finished run into the reported summary. `buckets` are the
/// villain info sets the game was solved over.
pub(crate) fn summarize(
    ctx: &SolverContext<'_>,
    game: &CfrGame,
    buckets: &[Bucket],
    profile: &AverageProfile,
    convergence: Convergence,
) -> SolveSummary {
    let samples = bucket_samples(buckets);
    let value = game.evaluate(profile, &samples);
    let nh = game.hero_sizes.len();
    let nv = game.villain_sizes.len();

    let call_by_bucket: Vec<f64> = (0..buckets.len()).map(|i| game.infoset_call(profile, i)).collect();
    let donk_by_bucket: Vec<f64> = (0..buckets.len())
        .map(|i| game.infoset_bet_after_check(profile, i))
        .collect();

    let combos = ctx.range.combos();
    let total = ctx.range.total_weight();
    let bucket_of = membership(buckets, combos.len());
    let mut details: Vec<ComboDetail> = combos
        .iter()
        .zip(&bucket_of)
        .filter(|&(_, &b)| b != usize::MAX)
        .map(|(combo, &b)| ComboDetail {
            cards: combo.cards,
            label: combo.label(),
            weight_share: combo.weight / total,
            hero_equity: combo.hero_equity,
            call_probability: call_by_bucket[b],
            bet_after_check: donk_by_bucket[b],
            bucket: b,
        })
        .collect();

    let call_weight: f64 = details.iter().map(|d| d.weight_share * d.call_probability).sum();
    let bluff_weight: f64 = details.iter().map(|d| d.weight_share * (1.0 - d.call_probability)).sum();
    let call_threshold = call_threshold(&details, buckets, &call_by_bucket);

    details.sort_by(|a, b| {
        b.call_probability
            .partial_cmp(&a.call_probability)
            .unwrap_or(Ordering::Equal)
            .then(b.hero_equity.partial_cmp(&a.hero_equity).unwrap_or(Ordering::Equal))
    });
    details.truncate(ctx.config.detail_limit);

    let bucket_summaries = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| BucketSummary {
            equity: b.equity,
            probability: b.probability,
            combos: b.members.len(),
            call_probability: call_by_bucket[i],
            bet_after_check: donk_by_bucket[i],
        })
        .collect();

    let bet_sizes = game
        .hero_sizes
        .iter()
        .enumerate()
        .map(|(j, &size)| BetSizeLine {
            size,
            frequency: profile.hero_root[j],
            villain_call_frequency: samples
                .iter()
                .map(|s| s.probability * profile.villain_call[j * buckets.len() + s.infoset])
                .sum(),
            ev: value.ev_bet_by_size[j],
        })
        .collect();

    let donk_sizes: Vec<DonkSizeLine> = game
        .villain_sizes
        .iter()
        .enumerate()
        .map(|(m, &size)| DonkSizeLine {
            size,
            frequency: samples
                .iter()
                .map(|s| s.probability * profile.villain_after_check[(nv + 1) * s.infoset + m + 1])
                .sum(),
            hero_call_frequency: profile.hero_call[m],
        })
        .collect();

    let donk_total: f64 = donk_sizes.iter().map(|d| d.frequency).sum();
    let hero_call = if donk_total > 1e-12 {
        donk_sizes.iter().map(|d| d.frequency * d.hero_call_frequency).sum::<f64>() / donk_total
    } else {
        profile.hero_call.iter().sum::<f64>() / nv as f64
    };

    let bet: f64 = profile.hero_root[..nh].iter().sum();
    SolveSummary {
        hero_strategy: HeroStrategy { bet, check: 1.0 - bet },
        hero_call_strategy: CallStrategy {
            fold: 1.0 - hero_call,
            call: hero_call,
        },
        villain_call_frequency: value.villain_call,
        villain_fold_frequency: 1.0 - value.villain_call,
        villain_bet_after_check_frequency: value.villain_bet_after_check,
        ev_bet: value.ev_bet,
        ev_check: value.ev_check,
        hero_utility: value.hero_utility,
        call_threshold,
        call_weight,
        bluff_weight,
        bet_sizes,
        donk_sizes,
        buckets: bucket_summaries,
        details,
        convergence,
    }
}

/// Weighted hero equity of the combos the villain mixes with. Without mixed
/// combos, the call-weighted average bucket equity.
fn call_threshold(details: &[ComboDetail], buckets: &[Bucket], call_by_bucket: &[f64]) -> f64 {
    let mixed = details
        .iter()
        .filter(|d| d.call_probability > MIXED_MARGIN && d.call_probability < 1.0 - MIXED_MARGIN);
    let (weighted, weight) = mixed.fold((0.0, 0.0), |(eq, w), d| {
        (eq + d.hero_equity * d.weight_share, w + d.weight_share)
    });
    if weight > 0.0 {
        return weighted / weight;
    }

    let (weighted, weight) = buckets
        .iter()
        .zip(call_by_bucket)
        .fold((0.0, 0.0), |(eq, w), (b, &c)| {
            (eq + c * b.equity * b.probability, w + c * b.probability)
        });
    if weight > 0.0 {
        weighted / weight
    } else {
        weighted
    }
}
