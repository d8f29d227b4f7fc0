//! CFR with several bet sizes for both players.
//!
//! Hero picks between a small and a large bet (derived from fractions of the
//! pot plus the requested size); the villain gets the same choice when
//! leading into a check. Hero's response to each lead size is one info set.

use crate::cfr::buckets::equity_buckets;
use crate::cfr::game::CfrGame;
use crate::cfr::regrets::RegretRule;
use crate::cfr::{bucket_samples, summarize, Convergence, SolveFailure, SolveSummary, SolverContext};

pub const ID: &str = "texasCfr";
pub const LABEL: &str = "Multi-size CFR";
pub const PRIORITY: i32 = 25;
pub const MIN_ITERATIONS: u32 = 1_000;
pub const MAX_ITERATIONS: u32 = 50_000;

const HERO_FRACTIONS: [f64; 3] = [0.5, 0.75, 1.0];
const VILLAIN_FRACTIONS: [f64; 2] = [0.5, 0.75];

/// Caps every candidate at `stack`, drops non-positive and duplicate sizes,
/// and keeps the smallest and largest.
fn reduce_sizes(candidates: impl IntoIterator<Item = f64>, stack: f64) -> Vec<f64> {
    let mut sizes: Vec<f64> = candidates
        .into_iter()
        .map(|s| s.min(stack))
        .filter(|&s| s > 0.0 && s.is_finite())
        .collect();
    sizes.sort_by(f64::total_cmp);
    sizes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    match sizes.as_slice() {
        [] => Vec::new(),
        [only] => vec![*only],
        [first, .., last] => vec![*first, *last],
    }
}

/// Hero sizes: half, three-quarter and full pot plus the requested bet.
pub fn hero_sizes(pot: f64, bet: f64, stack: f64) -> Vec<f64> {
    reduce_sizes(HERO_FRACTIONS.iter().map(|f| f * pot).chain([bet]), stack)
}

/// Villain lead sizes: half and three-quarter pot plus hero's largest size.
pub fn villain_sizes(pot: f64, hero_sizes: &[f64], stack: f64) -> Vec<f64> {
    let largest = hero_sizes.last().copied().unwrap_or(0.0);
    reduce_sizes(VILLAIN_FRACTIONS.iter().map(|f| f * pot).chain([largest]), stack)
}

pub fn solve(ctx: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    let bet = ctx.validate()?;
    let hero = hero_sizes(ctx.pot, bet, ctx.stack);
    let villain = villain_sizes(ctx.pot, &hero, ctx.stack);
    if hero.is_empty() || villain.is_empty() {
        return Err(SolveFailure::NoBetAction);
    }
    let buckets = equity_buckets(ctx.range, ctx.config.min_buckets, ctx.config.max_buckets);
    if buckets.is_empty() {
        return Err(SolveFailure::NoBuckets);
    }
    log::debug!("{} sizes: hero {:?}, villain {:?}", ID, hero, villain);

    let samples = bucket_samples(&buckets);
    let game = CfrGame {
        pot: ctx.pot,
        hero_sizes: hero,
        villain_sizes: villain,
        infosets: buckets.len(),
    };
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_keep_extremes() {
        assert_eq!(hero_sizes(100.0, 60.0, 1_000.0), vec![50.0, 100.0]);
        assert_eq!(hero_sizes(100.0, 150.0, 1_000.0), vec![50.0, 150.0]);
        assert_eq!(villain_sizes(100.0, &[50.0, 150.0], 1_000.0), vec![50.0, 150.0]);
    }

    #[test]
    fn stack_caps_and_merges_sizes() {
        assert_eq!(hero_sizes(100.0, 75.0, 40.0), vec![40.0]);
        assert_eq!(villain_sizes(100.0, &[40.0], 40.0), vec![40.0]);
        assert!(hero_sizes(100.0, 75.0, 0.0).is_empty());
    }
}
