//! Chance-sampled CFR.
//!
//! Each iteration draws a weighted sample of villain combos instead of
//! sweeping every bucket. Villain info sets are the ten hero-equity deciles,
//! and each sampled combo contributes its own equity.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cfr::buckets::{decile, equity_deciles};
use crate::cfr::game::{CfrGame, Sample};
use crate::cfr::regrets::RegretRule;
use crate::cfr::{bucket_samples, summarize, Convergence, SolveFailure, SolveSummary, SolverContext};

pub const ID: &str = "monteCarloCfr";
pub const LABEL: &str = "Monte-Carlo CFR";
pub const PRIORITY: i32 = 30;
pub const MIN_ITERATIONS: u32 = 5_000;
pub const MAX_ITERATIONS: u32 = 200_000;

/// Combos drawn per iteration: 30% of the range, kept within 50..=200.
pub fn sample_size(combos: usize) -> usize {
    ((combos as f64 * 0.3) as usize).clamp(50, 200)
}

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let (buckets, lookup) = equity_deciles(ctx.range);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    let game = CfrGame::single(ctx.pot, bet, buckets.len());
    let iterations = ctx.iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
    let per_iteration = sample_size(ctx.range.len());
    let probability = 1.0 / per_iteration as f64;
    let combos = ctx.range.combos();

    let mut rng = StdRng::seed_from_u64(ctx.seed);
    let mut table = game.table(RegretRule::Signed);
    let mut scratch = game.scratch();
    let mut drawn = Vec::with_capacity(per_iteration);

    for _ in 0..iterations {
        ctx.check_cancelled()?;
        drawn.clear();
        for _ in 0..per_iteration {
            let idx = ctx.range.sample_index(&mut rng).ok_or(SolveFailure::ZeroRangeWeight)?;
            let equity = combos[idx].hero_equity;
            let infoset = lookup[decile(equity)].ok_or_else(|| {
                SolveFailure::Numerical(format!("combo {} fell outside every decile", idx))
            })?;
            drawn.push(Sample {
                infoset,
                equity,
                probability,
            });
        }
        game.iterate(&mut table, &drawn, 1.0, &mut scratch);
    }

    // Profile quality is judged against the full decile distribution
    let samples = bucket_samples(&buckets);
    let profile = game.average_profile(&table);
    let convergence = Convergence::measure(&game, &table, &profile, &samples, iterations, Vec::new(), false);
    Ok(summarize(ctx, &game, &buckets, &profile, convergence))
}
