use thiserror::Error;

use crate::cards::Card;

#[derive(Error, Debug)]
pub enum PokerError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("Card {0} is assigned more than once")]
    DuplicateCard(Card),

    #[error("Board must have 0, 3, 4 or 5 cards, got {0}")]
    InvalidBoardLength(usize),

    #[error("A player can hold at most 2 hole cards, got {0}")]
    TooManyHoleCards(usize),

    #[error("Need between {min} and {max} players, got {got}")]
    InvalidPlayerCount { min: usize, max: usize, got: usize },

    #[error("Need at least {need} cards, got {got}")]
    NotEnoughCards { need: usize, got: usize },

    #[error("At most {max} cards can be evaluated, got {got}")]
    TooManyCards { max: usize, got: usize },

    #[error("Cannot deal {requested} cards, only {available} remaining")]
    NotEnoughDeck { requested: usize, available: usize },

    #[error("Computation was superseded by a newer request")]
    Cancelled,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type PokerResult<T> = Result<T, PokerError>;
