use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{PokerError, PokerResult};

pub const RANKS_STR: &str = "23456789TJQKA";

/// Card ranks, 0-indexed from Two so that rank values double as array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

impl Rank {
    pub fn from_char(c: char) -> PokerResult<Rank> {
        match c {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(PokerError::InvalidRank(c)),
        }
    }

    pub fn from_index(index: u8) -> Option<Rank> {
        ALL_RANKS.get(index as usize).copied()
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Diamonds = 2,
    Clubs = 3,
}

impl Suit {
    pub fn from_char(c: char) -> PokerResult<Suit> {
        match c.to_ascii_lowercase() {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(PokerError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

/// An immutable playing card. Equality, hashing and ordering all follow the
/// card id (`rank * 4 + suit`), so two cards are the same card iff they share
/// rank and suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// Canonical id in 0..52.
    #[inline]
    pub fn id(&self) -> u8 {
        self.rank.index() * 4 + self.suit.index()
    }

    pub fn from_id(id: u8) -> Option<Card> {
        DECK.get(id as usize).copied()
    }

    #[inline]
    pub fn mask(&self) -> u64 {
        1u64 << self.id()
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl serde::Serialize for Card {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The 52-card deck, ordered by card id. Built once per process.
pub static DECK: Lazy<[Card; 52]> = Lazy::new(|| {
    let mut cards = [Card::new(Rank::Two, Suit::Spades); 52];
    for &r in &ALL_RANKS {
        for &s in &ALL_SUITS {
            let card = Card::new(r, s);
            cards[card.id() as usize] = card;
        }
    }
    cards
});

/// Bitmask with one bit per card id.
pub fn mask_of(cards: &[Card]) -> u64 {
    cards.iter().fold(0u64, |m, c| m | c.mask())
}

/// Every deck card not present in `dead`, in id order.
pub fn remaining_cards(dead: &[Card]) -> Vec<Card> {
    let dead_mask = mask_of(dead);
    DECK.iter()
        .copied()
        .filter(|c| dead_mask & c.mask() == 0)
        .collect()
}

/// Returns the first card that appears more than once across all groups.
pub fn find_duplicate<'a, I>(groups: I) -> Option<Card>
where
    I: IntoIterator<Item = &'a [Card]>,
{
    let mut seen = 0u64;
    for group in groups {
        for card in group {
            if seen & card.mask() != 0 {
                return Some(*card);
            }
            seen |= card.mask();
        }
    }
    None
}

pub fn parse_card(notation: &str) -> PokerResult<Card> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();
    let (rank_char, suit_char) = match chars.as_slice() {
        [r, s] => (r.to_ascii_uppercase(), *s),
        ['1', '0', s] => ('T', *s),
        _ => return Err(PokerError::InvalidCardNotation(notation.to_string())),
    };
    let rank = Rank::from_char(rank_char)?;
    let suit = Suit::from_char(suit_char)?;
    Ok(Card::new(rank, suit))
}

/// Parses a run of concatenated cards such as `"AsKd5c"` or `"As Kd, 5c"`.
/// `"-"` and the empty string parse to no cards.
pub fn parse_cards(notation: &str) -> PokerResult<Vec<Card>> {
    let notation = notation.trim().replace([' ', ','], "").replace("10", "T");
    if notation.is_empty() || notation == "-" {
        return Ok(Vec::new());
    }
    if notation.len() % 2 != 0 {
        return Err(PokerError::InvalidBoardNotation(notation));
    }
    let chars: Vec<char> = notation.chars().collect();
    chars
        .chunks(2)
        .map(|pair| parse_card(&pair.iter().collect::<String>()))
        .collect()
}

pub fn parse_board(notation: &str) -> PokerResult<Vec<Card>> {
    let cards = parse_cards(notation)?;
    if cards.len() > 5 {
        return Err(PokerError::InvalidBoardNotation(notation.to_string()));
    }
    Ok(cards)
}

pub fn format_cards(cards: &[Card]) -> String {
    if cards.is_empty() {
        return "-".to_string();
    }
    cards.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("")
}

pub fn simplify_hand(cards: &[Card]) -> PokerResult<String> {
    if cards.len() != 2 {
        return Err(PokerError::InvalidHandNotation(format_cards(cards)));
    }
    let (c1, c2) = (cards[0], cards[1]);
    let (r1, r2) = if c1.rank >= c2.rank {
        (c1.rank, c2.rank)
    } else {
        (c2.rank, c1.rank)
    };

    if r1 == r2 {
        return Ok(format!("{}{}", r1.to_char(), r2.to_char()));
    }

    let suffix = if c1.suit == c2.suit { "s" } else { "o" };
    Ok(format!("{}{}{}", r1.to_char(), r2.to_char(), suffix))
}

pub fn hand_combos(notation: &str) -> PokerResult<Vec<(Card, Card)>> {
    let notation = notation.trim();
    let chars: Vec<char> = notation.chars().collect();

    // Pair notation: "AA"
    if chars.len() == 2 && chars[0] == chars[1] {
        let rank = Rank::from_char(chars[0])?;
        let mut combos = Vec::new();
        for i in 0..ALL_SUITS.len() {
            for j in (i + 1)..ALL_SUITS.len() {
                combos.push((Card::new(rank, ALL_SUITS[i]), Card::new(rank, ALL_SUITS[j])));
            }
        }
        return Ok(combos);
    }

    // Suited/offsuit notation: "AKs" or "AKo"
    if chars.len() == 3 {
        let r1 = Rank::from_char(chars[0])?;
        let r2 = Rank::from_char(chars[1])?;
        match chars[2] {
            's' => {
                return Ok(ALL_SUITS
                    .iter()
                    .map(|&s| (Card::new(r1, s), Card::new(r2, s)))
                    .collect())
            }
            'o' => {
                let mut combos = Vec::new();
                for &s1 in &ALL_SUITS {
                    for &s2 in &ALL_SUITS {
                        if s1 != s2 {
                            combos.push((Card::new(r1, s1), Card::new(r2, s2)));
                        }
                    }
                }
                return Ok(combos);
            }
            _ => {}
        }
    }

    // Specific cards: "AsKh"
    if chars.len() == 4 {
        let c1 = parse_card(&notation[..2])?;
        let c2 = parse_card(&notation[2..])?;
        return Ok(vec![(c1, c2)]);
    }

    Err(PokerError::InvalidHandNotation(notation.to_string()))
}
