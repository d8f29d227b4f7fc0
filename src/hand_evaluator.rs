use std::fmt;

use serde::Serialize;

use crate::cards::{Card, Rank};
use crate::error::{PokerError, PokerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
        }
    }
}

/// Strength of a five-card hand.
///
/// Ordering is lexicographic: category first, then the tiebreak ranks
/// (0-indexed, unused slots are zero). Two scores are equal exactly when the
/// hands tie at showdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct HandScore {
    pub category: HandCategory,
    pub tiebreaks: [u8; 5],
}

impl HandScore {
    fn new(category: HandCategory, ranks: &[u8]) -> Self {
        let mut tiebreaks = [0u8; 5];
        tiebreaks[..ranks.len()].copy_from_slice(ranks);
        HandScore {
            category,
            tiebreaks,
        }
    }

    /// Packs category and tiebreaks into 4-bit fields. Integer order of the
    /// packed value matches the order of the scores.
    pub fn packed(&self) -> u32 {
        self.tiebreaks
            .iter()
            .fold(self.category as u32, |acc, &t| (acc << 4) | t as u32)
    }

    pub fn is_royal(&self) -> bool {
        self.category == HandCategory::StraightFlush && self.tiebreaks[0] == Rank::Ace.index()
    }
}

impl fmt::Display for HandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", describe(self))
    }
}

fn rank_name(index: u8) -> &'static str {
    Rank::from_index(index).map_or("?", Rank::name)
}

fn plural(index: u8) -> String {
    match Rank::from_index(index) {
        Some(Rank::Six) => "Sixes".to_string(),
        Some(r) => format!("{}s", r.name()),
        None => "?".to_string(),
    }
}

/// Human-readable description, e.g. "Full House, Aces full of Kings".
pub fn describe(score: &HandScore) -> String {
    let t = score.tiebreaks;
    match score.category {
        HandCategory::StraightFlush if score.is_royal() => "Royal Flush".to_string(),
        HandCategory::StraightFlush => format!("Straight Flush, {} high", rank_name(t[0])),
        HandCategory::FourOfAKind => format!("Four of a Kind, {}", plural(t[0])),
        HandCategory::FullHouse => format!("Full House, {} full of {}", plural(t[0]), plural(t[1])),
        HandCategory::Flush => format!("Flush, {} high", rank_name(t[0])),
        HandCategory::Straight => format!("Straight, {} high", rank_name(t[0])),
        HandCategory::ThreeOfAKind => format!("Three of a Kind, {}", plural(t[0])),
        HandCategory::TwoPair => format!("Two Pair, {} and {}", plural(t[0]), plural(t[1])),
        HandCategory::OnePair => format!("Pair of {}", plural(t[0])),
        HandCategory::HighCard => format!("High Card, {}", rank_name(t[0])),
    }
}

/// Highest rank of a straight in `sorted` (five ranks, descending), or None.
/// The wheel A-5-4-3-2 reports the Five (index 3) as its high card.
fn straight_high(sorted: &[u8; 5]) -> Option<u8> {
    let mut consecutive = 1;
    for i in 1..5 {
        if sorted[i] + 1 == sorted[i - 1] {
            consecutive += 1;
        } else {
            break;
        }
    }
    if consecutive == 5 {
        return Some(sorted[0]);
    }

    // Wheel: A-2-3-4-5
    if *sorted == [12, 3, 2, 1, 0] {
        return Some(3);
    }

    None
}

/// Scores exactly five cards.
pub fn score5(cards: &[Card; 5]) -> HandScore {
    let mut rank_counts = [0u8; 13];
    let mut suit_counts = [0u8; 4];
    let mut ranks = [0u8; 5];
    for (i, card) in cards.iter().enumerate() {
        let r = card.rank.index();
        rank_counts[r as usize] += 1;
        suit_counts[card.suit.index() as usize] += 1;
        ranks[i] = r;
    }
    ranks.sort_unstable_by(|a, b| b.cmp(a));

    let flush = suit_counts.iter().any(|&n| n == 5);
    let straight = straight_high(&ranks);

    if flush {
        if let Some(high) = straight {
            return HandScore::new(HandCategory::StraightFlush, &[high]);
        }
    }

    // Rank groups scanned high to low
    let mut quad = None;
    let mut trips = None;
    let mut pairs = [0u8; 2];
    let mut pair_count = 0;
    for r in (0..13u8).rev() {
        match rank_counts[r as usize] {
            4 => quad = Some(r),
            3 => trips = Some(r),
            2 => {
                pairs[pair_count] = r;
                pair_count += 1;
            }
            _ => {}
        }
    }

    // Kickers are whatever ranks appear exactly once, already descending
    let mut kickers = [0u8; 5];
    let mut kicker_count = 0;
    for &r in &ranks {
        if rank_counts[r as usize] == 1 {
            kickers[kicker_count] = r;
            kicker_count += 1;
        }
    }
    let kickers = &kickers[..kicker_count];

    if let Some(q) = quad {
        return HandScore::new(HandCategory::FourOfAKind, &[q, kickers[0]]);
    }

    if let Some(t) = trips {
        if pair_count == 1 {
            return HandScore::new(HandCategory::FullHouse, &[t, pairs[0]]);
        }
    }

    if flush {
        return HandScore::new(HandCategory::Flush, &ranks);
    }

    if let Some(high) = straight {
        return HandScore::new(HandCategory::Straight, &[high]);
    }

    if let Some(t) = trips {
        return HandScore::new(HandCategory::ThreeOfAKind, &[t, kickers[0], kickers[1]]);
    }

    match pair_count {
        2 => HandScore::new(HandCategory::TwoPair, &[pairs[0], pairs[1], kickers[0]]),
        1 => HandScore::new(
            HandCategory::OnePair,
            &[pairs[0], kickers[0], kickers[1], kickers[2]],
        ),
        _ => HandScore::new(HandCategory::HighCard, &ranks),
    }
}

/// Best five-card hand among 5 to 7 cards.
///
/// Every 5-card subset is scored; on equal scores the first subset found is
/// kept.
pub fn best_of(cards: &[Card]) -> PokerResult<(HandScore, [Card; 5])> {
    let n = cards.len();
    if n < 5 {
        return Err(PokerError::NotEnoughCards { need: 5, got: n });
    }
    if n > 7 {
        return Err(PokerError::TooManyCards { max: 7, got: n });
    }
    Ok(best_of_unchecked(cards))
}

/// `best_of` without the length check; callers guarantee 5..=7 cards.
pub(crate) fn best_of_unchecked(cards: &[Card]) -> (HandScore, [Card; 5]) {
    let n = cards.len();
    let mut best_hand = [cards[0], cards[1], cards[2], cards[3], cards[4]];
    let mut best = score5(&best_hand);
    if n == 5 {
        return (best, best_hand);
    }

    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let score = score5(&five);
                        if score > best {
                            best = score;
                            best_hand = five;
                        }
                    }
                }
            }
        }
    }

    (best, best_hand)
}

/// Score of the best hand formed from hole cards plus board.
pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> PokerResult<HandScore> {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);
    best_of(&all_cards).map(|(score, _)| score)
}
