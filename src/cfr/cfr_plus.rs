//! CFR+ over equity buckets.
//!
//! Regrets are floored at zero and iteration `t` enters the average with
//! weight `t`. Every [`CHECKPOINT`] iterations the average profile's
//! exploitability is measured; the run stops once it drops below the
//! configured fraction of the pot.

use crate::cfr::buckets::equity_buckets;
use crate::cfr::game::CfrGame;
use crate::cfr::regrets::RegretRule;
use crate::cfr::{
    bucket_samples, summarize, Convergence, ConvergencePoint, SolveFailure, SolveSummary, SolverContext,
};

pub const ID: &str = "enhancedCfrPlus";
pub const LABEL: &str = "CFR+ with early stopping";
pub const PRIORITY: i32 = 35;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 100_000;
pub const CHECKPOINT: u32 = 1_000;

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let buckets = equity_buckets(ctx.range, ctx.config.min_buckets, ctx.config.max_buckets);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    let samples = bucket_samples(&buckets);
    let game = CfrGame::single(ctx.pot, bet, buckets.len());
    let budget = ctx.iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
    let target = ctx.config.exploitability_threshold * ctx.pot;

    let mut table = game.table(RegretRule::Floored);
    let mut scratch = game.scratch();
    let mut history = Vec::new();
    let mut run = 0;
    let mut stopped_early = false;

    while run < budget {
        ctx.check_cancelled()?;
        run += 1;
        game.iterate(&mut table, &samples, run as f64, &mut scratch);

        if run % CHECKPOINT == 0 && run < budget {
            let exploitability = game.exploitability(&game.average_profile(&table), &samples);
            history.push(ConvergencePoint {
                iteration: run,
                exploitability,
            });
            if exploitability < target {
                log::debug!(
                    "{} converged after {} iterations (exploitability {:.5})",
                    ID,
                    run,
                    exploitability
                );
                stopped_early = true;
                break;
            }
        }
    }

    let profile = game.average_profile(&table);
    let convergence = Convergence::measure(&game, &table, &profile, &samples, run, history, stopped_early);
    Ok(summarize(ctx, &game, &buckets, &profile, convergence))
}
