use alpha_poker::cancel::Generation;
use alpha_poker::cards::*;
use alpha_poker::config::EngineConfig;
use alpha_poker::equity::*;
use alpha_poker::error::PokerError;
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn hand(notation: &str) -> Vec<Card> {
    parse_cards(notation).unwrap()
}

fn engine() -> EquityEngine {
    EquityEngine::new(&EngineConfig::default())
}

fn report(players: &[Vec<Card>], board: &str, seed: u64) -> EquityReport {
    let board = parse_board(board).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    engine().evaluate_equity(players, &board, &mut rng, None).unwrap()
}

#[test]
fn test_aa_vs_kk_preflop() {
    let result = report(&[hand("AsAh"), hand("KsKh")], "", 7);
    assert!(result.computable);
    assert_eq!(result.method, EquityMethod::MonteCarlo);
    assert_eq!(result.simulations, 40_000);
    let aa = result.per_player[0].equity;
    assert!(aa > 0.79 && aa < 0.84, "AA equity {}", aa);
}

#[test]
fn test_flop_is_enumerated_exactly() {
    let result = report(&[hand("AsAh"), hand("KsKh")], "2s5d8c", 0);
    assert_eq!(result.method, EquityMethod::Enumeration);
    // 45 choose 2 turn and river pairs
    assert_eq!(result.simulations, 990);
    assert!(result.per_player[0].equity > 0.85);
}

#[test]
fn test_shares_sum_to_one_multiway() {
    let players = [hand("AsAh"), hand("KsKh"), hand("7c8c"), hand("2d2h")];
    let result = report(&players, "9c6cTd", 3);
    let total: f64 = result.per_player.iter().map(|p| p.equity).sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    for p in &result.per_player {
        assert!(p.win_ratio + p.tie_ratio <= 1.0 + 1e-12);
    }
}

#[test]
fn test_seat_order_does_not_change_equity() {
    let forward = report(&[hand("AhKh"), hand("QsQd"), hand("7c6c")], "Qh8h2c", 0);
    let reversed = report(&[hand("7c6c"), hand("QsQd"), hand("AhKh")], "Qh8h2c", 0);
    assert_abs_diff_eq!(forward.per_player[0].equity, reversed.per_player[2].equity, epsilon = 1e-12);
    assert_abs_diff_eq!(forward.per_player[1].equity, reversed.per_player[1].equity, epsilon = 1e-12);
    assert_abs_diff_eq!(forward.per_player[2].equity, reversed.per_player[0].equity, epsilon = 1e-12);
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let players = [hand("AsKs"), hand("QhQd")];
    let a = report(&players, "", 42);
    let b = report(&players, "", 42);
    assert_eq!(a, b);
}

#[test]
fn test_complete_board_is_a_single_showdown() {
    let result = report(&[hand("AsKd"), hand("QhQc")], "Ah7c2d9sTh", 0);
    assert_eq!(result.method, EquityMethod::Showdown);
    assert_eq!(result.simulations, 1);
    assert_eq!(result.per_player[0].win_ratio, 1.0);
    let showdown = result.showdown.expect("complete board resolves a showdown");
    assert_eq!(showdown.winners, vec![0]);
    assert_eq!(showdown.seats[0].description, "Pair of Aces");
}

#[test]
fn test_unknown_player_cards_are_sampled() {
    let result = report(&[hand("AsAh"), hand("-")], "", 11);
    assert_eq!(result.method, EquityMethod::MonteCarlo);
    let aa = result.per_player[0].equity;
    // AA against a random hand
    assert!(aa > 0.82 && aa < 0.88, "AA vs random {}", aa);
    assert!(result.showdown.is_none());
}

#[test]
fn test_half_known_hand() {
    let result = report(&[hand("KsKh"), hand("Ad")], "", 5);
    assert!(result.computable);
    assert_eq!(result.method, EquityMethod::MonteCarlo);
    assert!(result.per_player[1].equity > 0.25);
}

#[test]
fn test_rejected_inputs_are_reported_not_raised() {
    let dup = report(&[hand("AsAh"), hand("AsKd")], "", 0);
    assert!(!dup.computable);
    assert!(dup.reason.is_some());

    let bad_board = report(&[hand("AsAh"), hand("KsKd")], "2c3c", 0);
    assert!(!bad_board.computable);
    assert_eq!(bad_board.method, EquityMethod::NotComputed);

    let players: Vec<Vec<Card>> = Vec::new();
    let empty = report(&players, "", 0);
    assert!(!empty.computable);
}

#[test]
fn test_too_many_players_rejected() {
    let players: Vec<Vec<Card>> = (0..10).map(|_| Vec::new()).collect();
    assert!(matches!(
        validate_table(&players, &[]),
        Err(PokerError::InvalidPlayerCount { max: 9, got: 10, .. })
    ));
}

#[test]
fn test_compute_equity_without_enough_cards() {
    let mut engine = engine();
    let players = [hand("AsAh"), hand("KsKh")];
    let mut rng = StdRng::seed_from_u64(0);
    let outcome = engine
        .compute_equity(&players, &[], &hand("2c3c4c"), &mut rng, None)
        .unwrap();
    assert!(!outcome.is_computed());
    assert_eq!(outcome.method, EquityMethod::NotComputed);
    assert!(outcome.equities().is_none());
}

#[test]
fn test_stale_ticket_cancels_enumeration() {
    let generation = Generation::new();
    let ticket = generation.issue();
    let _newer = generation.issue();
    let board = hand("2s5d8c");
    let players = [hand("AsAh"), hand("KsKh")];
    let mut rng = StdRng::seed_from_u64(0);
    let result = engine().evaluate_equity(&players, &board, &mut rng, Some(&ticket));
    assert!(matches!(result, Err(PokerError::Cancelled)));
}

#[test]
fn test_hand_vs_hand_matches_engine() {
    let board = hand("Ts9s2h");
    let mut rng = StdRng::seed_from_u64(0);
    let (equity, sims) = hand_vs_hand_equity(
        [parse_card("As").unwrap(), parse_card("Ks").unwrap()],
        [parse_card("Th").unwrap(), parse_card("Td").unwrap()],
        &board,
        &remaining_cards(&[]),
        10_000,
        1_000,
        &mut rng,
    )
    .unwrap();
    assert_eq!(sims, 990);
    let full = report(&[hand("AsKs"), hand("ThTd")], "Ts9s2h", 0);
    assert_abs_diff_eq!(equity, full.per_player[0].equity, epsilon = 1e-12);
}

#[test]
fn test_hand_vs_hand_draws_only_live_cards() {
    let mut rng = StdRng::seed_from_u64(0);
    let (equity, sims) = hand_vs_hand_equity(
        [parse_card("As").unwrap(), parse_card("Ah").unwrap()],
        [parse_card("2c").unwrap(), parse_card("3c").unwrap()],
        &hand("KdQc7s"),
        &hand("2c3c4c5c"),
        10_000,
        1_000,
        &mut rng,
    )
    .unwrap();
    // 4c5c is the only runout left
    assert_eq!(sims, 1);
    assert_eq!(equity, 0.0);
}

#[test]
fn test_resolve_showdown_split_pot() {
    let board = parse_board("AhKhQhJhTh").unwrap();
    let result = resolve_showdown(&[hand("2s3d"), hand("4c5d")], &board).unwrap();
    assert_eq!(result.winners, vec![0, 1]);
    assert!(resolve_showdown(&[hand("2s3d")], &board[..4]).is_err());
}
