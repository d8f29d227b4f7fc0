use alpha_poker::cards::*;
use alpha_poker::cfr::{parallel, vanilla, SolveFailure, SolveSummary, SolverContext};
use alpha_poker::config::EngineConfig;
use alpha_poker::range::{build_range, Profile, VillainRange};
use alpha_poker::registry::SolverRegistry;

fn river_range() -> VillainRange {
    let hero = [parse_card("Qs").unwrap(), parse_card("Qd").unwrap()];
    let board = parse_board("Th8c4d3s2h").unwrap();
    let mut dead = hero.to_vec();
    dead.extend_from_slice(&board);
    let live = remaining_cards(&dead);
    let mut range = build_range(&live, Profile::Tight);
    range
        .annotate_hero_equity(hero, &board, &live, &EngineConfig::default(), 0, None)
        .unwrap();
    range
}

fn context<'a>(range: &'a VillainRange, config: &'a EngineConfig) -> SolverContext<'a> {
    SolverContext {
        range,
        hero_equity: range.hero_equity(),
        pot: 20.0,
        bet: 15.0,
        stack: 200.0,
        iterations: 1_000,
        seed: 3,
        config,
        ticket: None,
    }
}

fn always_fails(_: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    Err(SolveFailure::Numerical("diverged".to_string()))
}

fn always_panics(_: &SolverContext<'_>) -> Result<SolveSummary, SolveFailure> {
    panic!("boom")
}

#[test]
fn test_defaults_registered_in_order() {
    let registry = SolverRegistry::with_defaults();
    assert_eq!(
        registry.ids(),
        vec![
            "webWorkerSolver",
            "enhancedCfrPlus",
            "monteCarloCfr",
            "texasCfr",
            "pycfr",
            "singleStreetCfr"
        ]
    );
}

#[test]
fn test_highest_priority_success_is_primary() {
    let range = river_range();
    let config = EngineConfig::default();
    let outcome = SolverRegistry::with_defaults().solve_all(&context(&range, &config));
    assert_eq!(outcome.results.len(), 6);
    assert!(outcome.results.iter().all(|r| r.is_ok()));
    assert_eq!(outcome.primary().unwrap().id, parallel::ID);
}

#[test]
fn test_failures_and_panics_are_isolated() {
    let range = river_range();
    let config = EngineConfig::default();
    let mut registry = SolverRegistry::new();
    registry.register("broken", "Broken", 100, always_fails);
    registry.register("explodes", "Explodes", 90, always_panics);
    registry.register(vanilla::ID, vanilla::LABEL, vanilla::PRIORITY, vanilla::solve);

    let outcome = registry.solve_all(&context(&range, &config));
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(
        outcome.results[0].error,
        Some(SolveFailure::Numerical("diverged".to_string()))
    );
    assert_eq!(outcome.results[1].error, Some(SolveFailure::Panicked("boom".to_string())));
    assert!(outcome.results[1].summary.is_none());
    assert_eq!(outcome.primary().unwrap().id, vanilla::ID);
}

#[test]
fn test_no_success_means_no_primary() {
    let range = river_range();
    let config = EngineConfig::default();
    let mut registry = SolverRegistry::new();
    registry.register("broken", "Broken", 1, always_fails);
    let outcome = registry.solve_all(&context(&range, &config));
    assert!(outcome.primary().is_none());
    assert!(!outcome.results[0].is_ok());
}

#[test]
fn test_register_replaces_by_id() {
    let range = river_range();
    let config = EngineConfig::default();
    let mut registry = SolverRegistry::with_defaults();
    registry.register(vanilla::ID, "Replaced", 1_000, always_fails);
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.ids()[5], vanilla::ID);

    let outcome = registry.solve_all(&context(&range, &config));
    assert_eq!(outcome.results[5].label, "Replaced");
    assert!(!outcome.results[5].is_ok());
    assert_eq!(outcome.primary().unwrap().id, parallel::ID);
}

#[test]
fn test_priority_ties_keep_first_registration() {
    let range = river_range();
    let config = EngineConfig::default();
    let mut registry = SolverRegistry::new();
    registry.register("first", "First", 5, vanilla::solve);
    registry.register("second", "Second", 5, vanilla::solve);
    let outcome = registry.solve_all(&context(&range, &config));
    assert_eq!(outcome.primary().unwrap().id, "first");
}
