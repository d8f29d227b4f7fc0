//! Vanilla CFR over equity buckets: signed regrets, uniform averaging.

use crate::cfr::buckets::equity_buckets;
use crate::cfr::game::CfrGame;
use crate::cfr::regrets::RegretRule;
use crate::cfr::{bucket_samples, summarize, Convergence, SolveFailure, SolveSummary, SolverContext};

pub const ID: &str = "singleStreetCfr";
pub const LABEL: &str = "Single-street CFR";
pub const PRIORITY: i32 = 10;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 200_000;

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let buckets = equity_buckets(ctx.range, ctx.config.min_buckets, ctx.config.max_buckets);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    let samples = bucket_samples(&buckets);
    let game = CfrGame::single(ctx.pot, bet, buckets.len());
    let iterations = ctx.iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);

    let mut table = game.table(RegretRule::Signed);
    let mut scratch = game.scratch();
    for _ in 0..iterations {
        ctx.check_cancelled()?;
        game.iterate(&mut table, &samples, 1.0, &mut scratch);
    }

    let profile = game.average_profile(&table);
    let convergence = Convergence::measure(&game, &table, &profile, &samples, iterations, Vec::new(), false);
    Ok(summarize(ctx, &game, &buckets, &profile, convergence))
}
