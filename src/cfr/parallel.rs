//! Chance-sampled CFR split across rayon workers.
//!
//! The iteration budget is divided between [`WORKERS`] independent runs over
//! the same equity buckets. Each run draws its buckets with its own seeded
//! generator; the finished regret tables are merged in worker order, so the
//! result does not depend on scheduling.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::cfr::buckets::{equity_buckets, Bucket};
use crate::cfr::game::{CfrGame, Sample};
use crate::cfr::regrets::{RegretRule, RegretTable};
use crate::cfr::{bucket_samples, summarize, Convergence, SolveFailure, SolveSummary, SolverContext};

pub const ID: &str = "webWorkerSolver";
pub const LABEL: &str = "Parallel CFR";
pub const PRIORITY: i32 = 40;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 150_000;
pub const WORKERS: u32 = 4;
const MAX_BUCKETS: usize = 12;

/// Iterations run by each worker; together they cover the clamped budget.
pub fn per_worker(requested: u32) -> u32 {
    requested.clamp(MIN_ITERATIONS, MAX_ITERATIONS).div_ceil(WORKERS)
}

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let max_buckets = MAX_BUCKETS.min(ctx.config.max_buckets);
    let buckets = equity_buckets(ctx.range, ctx.config.min_buckets.min(max_buckets), max_buckets);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    let game = CfrGame::single(ctx.pot, bet, buckets.len());
    let iterations = per_worker(ctx.iterations);

    let tables = (0..WORKERS)
        .into_par_iter()
        .map(|worker| run_worker(ctx, &game, &buckets, iterations, worker))
        .collect::<Result<Vec<_>, _>>()?;
    let mut tables = tables.into_iter();
    let mut merged = tables
        .next()
        .ok_or_else(|| SolveFailure::Numerical("no worker finished".to_string()))?;
    for table in tables {
        merged.merge(&table);
    }
    let total = iterations * WORKERS;
    log::debug!("{} merged {} workers, {} iterations", ID, WORKERS, total);

    let samples = bucket_samples(&buckets);
    let profile = game.average_profile(&merged);
    let convergence = Convergence::measure(&game, &merged, &profile, &samples, total, Vec::new(), false);
    Ok(summarize(ctx, &game, &buckets, &profile, convergence))
}

/// One worker's run: each iteration draws as many buckets as there are,
/// weighted by bucket probability.
fn run_worker(
    ctx: &SolverContext<'_>,
    game: &CfrGame,
    buckets: &[Bucket],
    iterations: u32,
    worker: u32,
) -> Result<RegretTable, SolveFailure> {
    let chooser = WeightedIndex::new(buckets.iter().map(|b| b.probability))
        .map_err(|e| SolveFailure::Numerical(format!("bucket weights: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(ctx.seed.wrapping_add(worker as u64));
    let probability = 1.0 / buckets.len() as f64;
    let mut table = game.table(RegretRule::Signed);
    let mut scratch = game.scratch();
    let mut drawn = Vec::with_capacity(buckets.len());

    for _ in 0..iterations {
        ctx.check_cancelled()?;
        drawn.clear();
        drawn.extend((0..buckets.len()).map(|_| {
            let infoset = chooser.sample(&mut rng);
            Sample {
                infoset,
                equity: buckets[infoset].equity,
                probability,
            }
        }));
        game.iterate(&mut table, &drawn, 1.0, &mut scratch);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_split_between_workers() {
        assert_eq!(per_worker(10), 250);
        assert_eq!(per_worker(10_001), 2_501);
        assert_eq!(per_worker(1_000_000), 37_500);
    }
}
