use alpha_poker::cards::*;
use alpha_poker::cfr::{
    cfr_plus, monte_carlo, multi_size, parallel, per_combo, vanilla, SolveFailure, SolveSummary, SolverContext,
};
use alpha_poker::config::EngineConfig;
use alpha_poker::range::{build_range, Profile, VillainRange};
use approx::assert_abs_diff_eq;

/// Balanced range on a river where hero holds top pair, top kicker.
fn river_spot() -> VillainRange {
    let hero = [parse_card("As").unwrap(), parse_card("Kd").unwrap()];
    let board = parse_board("Ah9c5d2sJh").unwrap();
    let mut dead = hero.to_vec();
    dead.extend_from_slice(&board);
    let live = remaining_cards(&dead);
    let mut range = build_range(&live, Profile::Balanced);
    range
        .annotate_hero_equity(hero, &board, &live, &EngineConfig::default(), 0, None)
        .unwrap();
    range
}

fn context<'a>(range: &'a VillainRange, config: &'a EngineConfig, iterations: u32) -> SolverContext<'a> {
    SolverContext {
        range,
        hero_equity: range.hero_equity(),
        pot: 10.0,
        bet: 7.5,
        stack: 100.0,
        iterations,
        seed: 17,
        config,
        ticket: None,
    }
}

fn assert_well_formed(summary: &SolveSummary) {
    assert_abs_diff_eq!(summary.hero_strategy.bet + summary.hero_strategy.check, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.hero_call_strategy.fold + summary.hero_call_strategy.call, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.villain_call_frequency + summary.villain_fold_frequency, 1.0, epsilon = 1e-9);
    for freq in [
        summary.hero_strategy.bet,
        summary.villain_call_frequency,
        summary.villain_bet_after_check_frequency,
        summary.hero_call_strategy.call,
    ] {
        assert!((-1e-9..=1.0 + 1e-9).contains(&freq), "frequency {} out of range", freq);
    }
    let size_total: f64 = summary.bet_sizes.iter().map(|s| s.frequency).sum();
    assert_abs_diff_eq!(size_total, summary.hero_strategy.bet, epsilon = 1e-9);
    let bucket_mass: f64 = summary.buckets.iter().map(|b| b.probability).sum();
    assert_abs_diff_eq!(bucket_mass, 1.0, epsilon = 1e-6);
    assert!(summary.convergence.exploitability >= 0.0);
    assert!(matches!(summary.recommended_action(), "BET" | "CHECK"));
}

#[test]
fn test_every_variant_is_well_formed() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 2_000);
    for summary in [
        vanilla::solve(&ctx).unwrap(),
        cfr_plus::solve(&ctx).unwrap(),
        monte_carlo::solve(&ctx).unwrap(),
        multi_size::solve(&ctx).unwrap(),
        per_combo::solve(&ctx).unwrap(),
        parallel::solve(&ctx).unwrap(),
    ] {
        assert_well_formed(&summary);
    }
}

#[test]
fn test_vanilla_is_deterministic() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 1_000);
    assert_eq!(vanilla::solve(&ctx).unwrap(), vanilla::solve(&ctx).unwrap());
}

#[test]
fn test_monte_carlo_follows_seed() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 5_000);
    let a = monte_carlo::solve(&ctx).unwrap();
    let b = monte_carlo::solve(&ctx).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.convergence.iterations, monte_carlo::MIN_ITERATIONS);
    // Deciles as info sets
    assert!(a.buckets.len() <= 10);
}

#[test]
fn test_iterations_are_clamped_per_variant() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 10);
    assert_eq!(vanilla::solve(&ctx).unwrap().convergence.iterations, vanilla::MIN_ITERATIONS);
    assert_eq!(multi_size::solve(&ctx).unwrap().convergence.iterations, multi_size::MIN_ITERATIONS);
}

#[test]
fn test_cfr_plus_records_checkpoints() {
    let range = river_spot();
    let config = EngineConfig {
        exploitability_threshold: 0.0,
        ..EngineConfig::default()
    };
    let ctx = context(&range, &config, 4_000);
    let summary = cfr_plus::solve(&ctx).unwrap();
    assert!(!summary.convergence.stopped_early);
    assert_eq!(summary.convergence.iterations, 4_000);
    let checkpoints: Vec<u32> = summary.convergence.history.iter().map(|p| p.iteration).collect();
    assert_eq!(checkpoints, vec![1_000, 2_000, 3_000]);
}

#[test]
fn test_cfr_plus_stops_early_with_loose_target() {
    let range = river_spot();
    let config = EngineConfig {
        exploitability_threshold: 10.0,
        ..EngineConfig::default()
    };
    let ctx = context(&range, &config, 50_000);
    let summary = cfr_plus::solve(&ctx).unwrap();
    assert!(summary.convergence.stopped_early);
    assert_eq!(summary.convergence.iterations, cfr_plus::CHECKPOINT);
}

#[test]
fn test_cfr_plus_converges() {
    let range = river_spot();
    let config = EngineConfig {
        exploitability_threshold: 0.0,
        ..EngineConfig::default()
    };
    let ctx = context(&range, &config, 10_000);
    let summary = cfr_plus::solve(&ctx).unwrap();
    // Within 10% of the pot
    assert!(summary.convergence.exploitability < 1.0, "{}", summary.convergence.exploitability);
}

#[test]
fn test_multi_size_reports_both_sizes() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 1_000);
    let summary = multi_size::solve(&ctx).unwrap();
    let sizes: Vec<f64> = summary.bet_sizes.iter().map(|s| s.size).collect();
    assert_eq!(sizes, vec![5.0, 10.0]);
    let donks: Vec<f64> = summary.donk_sizes.iter().map(|s| s.size).collect();
    assert_eq!(donks, vec![5.0, 10.0]);
}

#[test]
fn test_per_combo_leads_three_quarter_pot() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = SolverContext {
        pot: 20.0,
        bet: 5.0,
        ..context(&range, &config, 2_000)
    };
    let summary = per_combo::solve(&ctx).unwrap();
    let donks: Vec<f64> = summary.donk_sizes.iter().map(|s| s.size).collect();
    assert_eq!(donks, vec![15.0]);
    assert_eq!(summary.bet_sizes[0].size, 5.0);
    assert_eq!(summary.convergence.iterations, per_combo::iteration_budget(2_000, range.len()));
    // Quantized into at most ten buckets for reporting
    assert!(summary.buckets.len() <= 10);
    let members: usize = summary.buckets.iter().map(|b| b.combos).sum();
    assert_eq!(members, range.len());
}

#[test]
fn test_parallel_is_reproducible_per_seed() {
    let range = river_spot();
    let config = EngineConfig::default();
    let ctx = context(&range, &config, 4_000);
    let a = parallel::solve(&ctx).unwrap();
    let b = parallel::solve(&ctx).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.convergence.iterations, 4_000);
    assert!(a.buckets.len() <= 12);
}

#[test]
fn test_details_are_sorted_and_truncated() {
    let range = river_spot();
    let config = EngineConfig {
        detail_limit: 25,
        ..EngineConfig::default()
    };
    let ctx = context(&range, &config, 1_000);
    let summary = vanilla::solve(&ctx).unwrap();
    assert_eq!(summary.details.len(), 25);
    for pair in summary.details.windows(2) {
        assert!(pair[0].call_probability >= pair[1].call_probability);
        if pair[0].call_probability == pair[1].call_probability {
            assert!(pair[0].hero_equity >= pair[1].hero_equity);
        }
    }
}

#[test]
fn test_unsolvable_contexts() {
    let range = river_spot();
    let config = EngineConfig::default();
    let no_stack = SolverContext {
        stack: 0.0,
        ..context(&range, &config, 1_000)
    };
    assert_eq!(vanilla::solve(&no_stack), Err(SolveFailure::NoBetAction));

    assert_eq!(per_combo::solve(&no_stack), Err(SolveFailure::NoBetAction));

    let empty = range.restrict("AsKd").unwrap();
    let ctx = context(&empty, &config, 1_000);
    assert_eq!(cfr_plus::solve(&ctx), Err(SolveFailure::EmptyRange));
    assert_eq!(parallel::solve(&ctx), Err(SolveFailure::EmptyRange));
}
