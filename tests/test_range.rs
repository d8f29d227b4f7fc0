use alpha_poker::cards::*;
use alpha_poker::config::EngineConfig;
use alpha_poker::range::*;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn c(notation: &str) -> Card {
    parse_card(notation).unwrap()
}

fn live_cards(hero: [Card; 2], board: &[Card]) -> Vec<Card> {
    let mut dead = hero.to_vec();
    dead.extend_from_slice(board);
    remaining_cards(&dead)
}

fn river_range(profile: Profile) -> (VillainRange, [Card; 2], Vec<Card>) {
    let hero = [c("As"), c("Kd")];
    let board = parse_board("Ah9c5d2sJh").unwrap();
    (build_range(&live_cards(hero, &board), profile), hero, board)
}

#[test]
fn test_range_excludes_dead_cards() {
    let (range, hero, board) = river_range(Profile::Balanced);
    // 45 live cards
    assert_eq!(range.len(), 990);
    let dead = mask_of(&hero) | mask_of(&board);
    assert!(range.combos().iter().all(|combo| combo.mask() & dead == 0));
}

#[test]
fn test_cumulative_weights_are_monotonic() {
    let range = build_range(&remaining_cards(&[]), Profile::Loose);
    let mut previous = 0.0;
    for combo in range.combos() {
        assert!(combo.weight > 0.0);
        assert!(combo.cumulative > previous);
        previous = combo.cumulative;
    }
    assert_relative_eq!(previous, range.total_weight());
}

#[test]
fn test_profiles_shape_weights() {
    for profile in Profile::ALL {
        let aces = profile.weight(c("As"), c("Ah"));
        let trash = profile.weight(c("7s"), c("2h"));
        assert!(aces > trash, "{} should weight AA above 72o", profile);
    }
    let tight = Profile::Tight;
    assert!(tight.weight(c("As"), c("Kh")) > tight.weight(c("6s"), c("5h")));
    let aggressive = Profile::Aggressive;
    assert!(aggressive.weight(c("8s"), c("7s")) > aggressive.weight(c("Ks"), c("4d")));
}

#[test]
fn test_profile_serde_names() {
    assert_eq!(serde_json::to_string(&Profile::Aggressive).unwrap(), "\"aggressive\"");
    let parsed: Profile = serde_json::from_str("\"tight\"").unwrap();
    assert_eq!(parsed, Profile::Tight);
}

#[test]
fn test_weighted_sampling_is_seeded() {
    let range = build_range(&remaining_cards(&[]), Profile::Tight);
    let mut a = StdRng::seed_from_u64(9);
    let mut b = StdRng::seed_from_u64(9);
    for _ in 0..100 {
        assert_eq!(range.sample_index(&mut a), range.sample_index(&mut b));
    }
}

#[test]
fn test_restrict_by_notation() {
    let (range, _, _) = river_range(Profile::Balanced);
    let narrowed = range.restrict("QQ+,AKs").unwrap();
    // QQ 6, KK 3 (Kd dead), AA 1 (As Ah dead), AKs 1 (only clubs live)
    assert_eq!(narrowed.len(), 11);
    assert!(narrowed.total_weight() < range.total_weight());
    assert!(range.restrict("").is_err());
    assert!(range.restrict("XYz").is_err());
}

#[test]
fn test_parse_range_expansion() {
    assert_eq!(parse_range("JJ+"), vec!["JJ", "QQ", "KK", "AA"]);
    assert_eq!(parse_range("ATs+"), vec!["ATs", "AJs", "AQs", "AKs"]);
    assert_eq!(parse_range("66-88"), vec!["66", "77", "88"]);
    assert_eq!(parse_range("KTo-KQo"), vec!["KTo", "KJo", "KQo"]);
    assert_eq!(parse_range("AKs, AKs,72o"), vec!["AKs", "72o"]);
}

#[test]
fn test_annotation_is_deterministic_on_the_river() {
    let config = EngineConfig::default();
    let (mut a, hero, board) = river_range(Profile::Balanced);
    let (mut b, _, _) = river_range(Profile::Balanced);
    let live = live_cards(hero, &board);
    let sims_a = a.annotate_hero_equity(hero, &board, &live, &config, 1, None).unwrap();
    let sims_b = b.annotate_hero_equity(hero, &board, &live, &config, 2, None).unwrap();
    // One showdown per combo on a complete board
    assert_eq!(sims_a, 990);
    assert_eq!(sims_b, 990);
    assert_relative_eq!(a.hero_equity(), b.hero_equity());

    let set_of_nines = a
        .combos()
        .iter()
        .find(|combo| combo.cards == [c("9s"), c("9h")] || combo.cards == [c("9h"), c("9s")])
        .unwrap();
    assert_eq!(set_of_nines.hero_equity, 0.0);
    assert!(a.hero_equity() > 0.7);
}

#[test]
fn test_combo_labels() {
    let range = build_range(&[c("As"), c("Ks"), c("Kd")], Profile::Balanced);
    let labels: Vec<String> = range.combos().iter().map(WeightedCombo::label).collect();
    assert_eq!(labels, vec!["AKs", "AKo", "KK"]);
}

#[test]
fn test_annotation_respects_the_live_pool() {
    let hero = [c("As"), c("Ah")];
    let board = parse_board("KdQc7s").unwrap();
    let live = parse_cards("2c3c4c5c").unwrap();
    let mut range = build_range(&live, Profile::Balanced);
    let sims = range
        .annotate_hero_equity(hero, &board, &live, &EngineConfig::default(), 0, None)
        .unwrap();
    assert_eq!(range.len(), 6);
    assert_eq!(sims, 6);
    assert!(range.combos().iter().all(|combo| combo.hero_equity == 0.0));
}
