//! CFR with one villain info set per combo.
//!
//! No bucketing during the solve: every combo keeps its own equity and its
//! own strategy. The villain leads three-quarters of the pot after a check.
//! For reporting, the per-combo strategies are averaged back into equity
//! buckets by combo weight.

use crate::cfr::buckets::{equity_buckets, Bucket};
use crate::cfr::game::{AverageProfile, CfrGame, Sample};
use crate::cfr::regrets::RegretRule;
use crate::cfr::{summarize, Convergence, SolveFailure, SolveSummary, SolverContext};
use crate::range::WeightedCombo;

pub const ID: &str = "pycfr";
pub const LABEL: &str = "Per-combo CFR";
pub const PRIORITY: i32 = 20;
pub const MIN_ITERATIONS: u32 = 400;
pub const MAX_ITERATIONS: u32 = 8_000;

/// Villain lead size as a fraction of the pot.
pub const DONK_FRACTION: f64 = 0.75;
/// Ranges up to this many combos get the full iteration budget.
const FULL_BUDGET_COMBOS: usize = 120;
const SUMMARY_BUCKETS: usize = 10;

/// Clamped budget, shrunk by `sqrt(combos / 120)` for wide ranges.
pub fn iteration_budget(requested: u32, combos: usize) -> u32 {
    let capped = requested.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
    if combos <= FULL_BUDGET_COMBOS {
        return capped;
    }
    let scale = (combos as f64 / FULL_BUDGET_COMBOS as f64).sqrt();
    ((capped as f64 / scale) as u32).max(1)
}

/// Three-quarter pot capped at the stack; hero's bet when the pot is empty.
pub fn donk_size(pot: f64, bet: f64, stack: f64) -> f64 {
    let lead = DONK_FRACTION * pot;
    let lead = if lead > 0.0 { lead } else { bet };
    lead.min(stack)
}

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let donk = donk_size(ctx.pot, bet, ctx.stack);
    if !(donk > 0.0) {
        return Err(SolveFailure::NoBetAction);
    }
    let combos = ctx.range.combos();
    let total = ctx.range.total_weight();
    let samples: Vec<Sample> = combos
        .iter()
        .enumerate()
        .filter(|(_, c)| c.weight > 0.0)
        .map(|(infoset, c)| Sample {
            infoset,
            equity: c.hero_equity,
            probability: c.weight / total,
        })
        .collect();

    let game = CfrGame {
        pot: ctx.pot,
        hero_sizes: vec![bet],
        villain_sizes: vec![donk],
        infosets: combos.len(),
    };
    let iterations = iteration_budget(ctx.iterations, combos.len());
    log::debug!("{} over {} combos for {} iterations", ID, combos.len(), iterations);

    let mut table = game.table(RegretRule::Signed);
    let mut scratch = game.scratch();
    for _ in 0..iterations {
        ctx.check_cancelled()?;
        game.iterate(&mut table, &samples, 1.0, &mut scratch);
    }

    let profile = game.average_profile(&table);
    let convergence = Convergence::measure(&game, &table, &profile, &samples, iterations, Vec::new(), false);

    let max_buckets = SUMMARY_BUCKETS.min(ctx.config.max_buckets);
    let buckets = equity_buckets(ctx.range, ctx.config.min_buckets.min(max_buckets), max_buckets);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    let bucketed = CfrGame {
        infosets: buckets.len(),
        ..game.clone()
    };
    let quantized = quantize(&game, &profile, &buckets, combos);
    Ok(summarize(ctx, &bucketed, &buckets, &quantized, convergence))
}

/// Weighted average of the member combos' villain strategies per bucket.
fn quantize(game: &CfrGame, profile: &AverageProfile, buckets: &[Bucket], combos: &[WeightedCombo]) -> AverageProfile {
    let nh = game.hero_sizes.len();
    let stride = game.villain_sizes.len() + 1;
    let (nc, nb) = (game.infosets, buckets.len());
    let mut villain_call = vec![0.0; nh * nb];
    let mut villain_after_check = vec![0.0; stride * nb];

    for (b, bucket) in buckets.iter().enumerate() {
        if !(bucket.weight > 0.0) {
            continue;
        }
        for &i in &bucket.members {
            let share = combos[i].weight / bucket.weight;
            for j in 0..nh {
                villain_call[j * nb + b] += share * profile.villain_call[j * nc + i];
            }
            for a in 0..stride {
                villain_after_check[stride * b + a] += share * profile.villain_after_check[stride * i + a];
            }
        }
    }

    AverageProfile {
        hero_root: profile.hero_root.clone(),
        hero_call: profile.hero_call.clone(),
        villain_call,
        villain_after_check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_shrinks_for_wide_ranges() {
        assert_eq!(iteration_budget(3_000, 100), 3_000);
        assert_eq!(iteration_budget(20_000, 100), MAX_ITERATIONS);
        assert_eq!(iteration_budget(10, 100), MIN_ITERATIONS);
        assert_eq!(iteration_budget(3_000, 480), 1_500);
    }

    #[test]
    fn donk_is_three_quarter_pot_within_stack() {
        assert_eq!(donk_size(20.0, 5.0, 100.0), 15.0);
        assert_eq!(donk_size(100.0, 50.0, 40.0), 40.0);
        assert_eq!(donk_size(0.0, 5.0, 100.0), 5.0);
    }
}
