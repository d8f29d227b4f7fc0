use std::cmp::Ordering;

use alpha_poker::cards::*;
use alpha_poker::hand_evaluator::*;

fn score(hole: &str, board: &str) -> HandScore {
    evaluate_hand(&parse_cards(hole).unwrap(), &parse_board(board).unwrap()).unwrap()
}

#[test]
fn test_royal_flush() {
    let result = score("AsKs", "QsTsJs2h3d");
    assert_eq!(result.category, HandCategory::StraightFlush);
    assert!(result.is_royal());
    assert_eq!(describe(&result), "Royal Flush");
}

#[test]
fn test_category_ladder() {
    let cases = [
        ("9h8h", "7h6h5hAcKd", HandCategory::StraightFlush),
        ("KsKh", "KdKc5s2h3d", HandCategory::FourOfAKind),
        ("KsKh", "Kd5c5s2h3d", HandCategory::FullHouse),
        ("2h9h", "Ah5hKh3c4d", HandCategory::Flush),
        ("Ts9d", "8c7h6s2d2c", HandCategory::Straight),
        ("7s7h", "7d2c9sJhQd", HandCategory::ThreeOfAKind),
        ("AsKd", "AhKc5s2h3d", HandCategory::TwoPair),
        ("AsQd", "Ah8c5s2h3d", HandCategory::OnePair),
        ("AsQd", "Jh8c5s2h3d", HandCategory::HighCard),
    ];
    for (hole, board, category) in cases {
        assert_eq!(score(hole, board).category, category, "{} on {}", hole, board);
    }
}

#[test]
fn test_wheel_is_lowest_straight() {
    let wheel = score("As2d", "3c4h5sKdQd");
    let six_high = score("6s2d", "3c4h5sKdQd");
    assert_eq!(wheel.category, HandCategory::Straight);
    assert_eq!(six_high.category, HandCategory::Straight);
    assert!(wheel < six_high);
    assert_eq!(describe(&wheel), "Straight, Five high");
}

#[test]
fn test_kicker_breaks_tie() {
    let result = score("AsKd", "AhTc7s4d2c").cmp(&score("AdQh", "AhTc7s4d2c"));
    assert_eq!(result, Ordering::Greater);
}

#[test]
fn test_board_plays_for_both() {
    let result = score("2s3d", "AhKhQhJhTh").cmp(&score("4c5d", "AhKhQhJhTh"));
    assert_eq!(result, Ordering::Equal);
}

#[test]
fn test_best_of_dominates_every_subset() {
    let cards = parse_cards("AsKsQdJc9s8s2s").unwrap();
    let (best, five) = best_of(&cards).unwrap();
    assert_eq!(best.category, HandCategory::Flush);
    assert_eq!(score5(&five), best);
    for skip_a in 0..7 {
        for skip_b in skip_a + 1..7 {
            let subset: Vec<Card> = cards
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip_a && *i != skip_b)
                .map(|(_, c)| *c)
                .collect();
            let subset: [Card; 5] = subset.try_into().unwrap();
            assert!(score5(&subset) <= best);
        }
    }
}

#[test]
fn test_best_of_rejects_bad_lengths() {
    assert!(best_of(&parse_cards("AsKsQd").unwrap()).is_err());
    assert!(best_of(&parse_cards("AsKsQdJc9s8s2s3h").unwrap()).is_err());
}

#[test]
fn test_packed_order_matches_score_order() {
    let hands = [
        score("AsQd", "Jh8c5s2h3d"),
        score("AsQd", "Ah8c5s2h3d"),
        score("AsKd", "AhKc5s2h3d"),
        score("KsKh", "Kd5c5s2h3d"),
    ];
    for pair in hands.windows(2) {
        assert!(pair[0] < pair[1]);
        assert!(pair[0].packed() < pair[1].packed());
    }
}

#[test]
fn test_descriptions() {
    assert_eq!(describe(&score("KsKh", "Kd5c5s2h3d")), "Full House, Kings full of Fives");
    assert_eq!(describe(&score("6s6h", "Kd5c9s2h3d")), "Pair of Sixes");
}
