use std::cmp::Ordering;
use std::fmt;
use std::ops::ControlFlow;

use rand::Rng;
use serde::Serialize;

use crate::cancel::{is_cancelled, Ticket};
use crate::cards::{find_duplicate, mask_of, remaining_cards, Card, DECK};
use crate::combinatorics::{combination_count, draw_without_replacement, for_each_combination};
use crate::config::EngineConfig;
use crate::error::{PokerError, PokerResult};
use crate::hand_evaluator::{best_of_unchecked, HandScore};
use crate::showdown_cache::{ShowdownCache, ShowdownKey, WinnerMask, MAX_PLAYERS};

pub const MIN_PLAYERS: usize = 1;

/// Win/tie tallies for one seat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerEquity {
    /// Boards this seat won outright.
    pub wins: u64,
    /// Boards this seat split with at least one other seat.
    pub ties: u64,
    /// `wins + Σ 1/k` over split boards, where `k` is the size of the split.
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityMethod {
    /// The board was complete; one showdown was evaluated.
    Showdown,
    /// Every completion of the board was evaluated.
    Enumeration,
    /// Completions (and any missing hole cards) were sampled.
    MonteCarlo,
    /// Not enough undealt cards to complete the hand.
    NotComputed,
}

impl fmt::Display for EquityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquityMethod::Showdown => write!(f, "showdown"),
            EquityMethod::Enumeration => write!(f, "exact enumeration"),
            EquityMethod::MonteCarlo => write!(f, "Monte Carlo"),
            EquityMethod::NotComputed => write!(f, "not computed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityOutcome {
    pub per_player: Vec<PlayerEquity>,
    pub simulations: u64,
    pub method: EquityMethod,
}

impl EquityOutcome {
    fn not_computed(players: usize) -> Self {
        EquityOutcome {
            per_player: vec![PlayerEquity::default(); players],
            simulations: 0,
            method: EquityMethod::NotComputed,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.simulations > 0
    }

    /// Pot share per seat as a fraction of all simulations. None when nothing
    /// was simulated, which is different from a computed zero.
    pub fn equities(&self) -> Option<Vec<f64>> {
        if self.simulations == 0 {
            return None;
        }
        let total = self.simulations as f64;
        Some(self.per_player.iter().map(|p| p.share / total).collect())
    }

    fn record(&mut self, winners: WinnerMask) {
        let split = winners.count_ones();
        if split == 0 {
            return;
        }
        let share = 1.0 / split as f64;
        for (seat, tally) in self.per_player.iter_mut().enumerate() {
            if winners & (1 << seat) == 0 {
                continue;
            }
            if split == 1 {
                tally.wins += 1;
            } else {
                tally.ties += 1;
            }
            tally.share += share;
        }
        self.simulations += 1;
    }
}

/// Seats holding the best hand on a complete board.
fn showdown_winners(holes: &[[Card; 2]], board: &[Card; 5]) -> WinnerMask {
    let mut seven = [board[0]; 7];
    seven[2..].copy_from_slice(board);
    let mut best: Option<HandScore> = None;
    let mut winners: WinnerMask = 0;
    for (seat, hole) in holes.iter().enumerate() {
        seven[0] = hole[0];
        seven[1] = hole[1];
        let (score, _) = best_of_unchecked(&seven);
        match best.map(|b| score.cmp(&b)) {
            None | Some(Ordering::Greater) => {
                best = Some(score);
                winners = 1 << seat;
            }
            Some(Ordering::Equal) => winners |= 1 << seat,
            Some(Ordering::Less) => {}
        }
    }
    winners
}

/// Equity calculator with its own showdown memo.
///
/// The engine is cheap to build; keeping one around between calls lets
/// repeated requests for the same seats reuse cached showdowns.
#[derive(Debug)]
pub struct EquityEngine {
    enumeration_limit: u64,
    monte_carlo_samples: usize,
    cache: ShowdownCache,
}

impl EquityEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_limits(
            config.enumeration_limit,
            config.monte_carlo_samples,
            config.cache_capacity,
        )
    }

    pub fn with_limits(enumeration_limit: u64, monte_carlo_samples: usize, cache_capacity: usize) -> Self {
        EquityEngine {
            enumeration_limit,
            monte_carlo_samples: monte_carlo_samples.max(1),
            cache: ShowdownCache::new(cache_capacity),
        }
    }

    pub fn cache(&self) -> &ShowdownCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn winners(&mut self, holes: &[[Card; 2]], board: &[Card; 5]) -> WinnerMask {
        let mut masks = [0u64; MAX_PLAYERS];
        for (mask, hole) in masks.iter_mut().zip(holes) {
            *mask = mask_of(hole);
        }
        let key = ShowdownKey::new(&masks[..holes.len()], mask_of(board));
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }
        let winners = showdown_winners(holes, board);
        self.cache.insert(key, winners);
        winners
    }

    /// Win/tie tallies for every seat over all completions of `board`.
    ///
    /// `remaining` is the undealt pool the missing board and hole cards are
    /// drawn from. Seats with fewer than two cards get their missing cards
    /// sampled alongside the board, which always takes the Monte-Carlo path.
    /// With complete hands the engine enumerates every board when the count
    /// is within `enumeration_limit`, otherwise it samples.
    pub fn compute_equity<P, R>(
        &mut self,
        players: &[P],
        board: &[Card],
        remaining: &[Card],
        rng: &mut R,
        ticket: Option<&Ticket>,
    ) -> PokerResult<EquityOutcome>
    where
        P: AsRef<[Card]>,
        R: Rng + ?Sized,
    {
        let seats = players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats) {
            return Err(PokerError::InvalidPlayerCount {
                min: MIN_PLAYERS,
                max: MAX_PLAYERS,
                got: seats,
            });
        }
        if let Some(p) = players.iter().find(|p| p.as_ref().len() > 2) {
            return Err(PokerError::TooManyHoleCards(p.as_ref().len()));
        }
        if board.len() > 5 {
            return Ok(EquityOutcome::not_computed(seats));
        }

        let board_draws = 5 - board.len();
        let missing: usize = players.iter().map(|p| 2 - p.as_ref().len()).sum();
        let total_draws = board_draws + missing;
        if remaining.len() < total_draws {
            log::debug!(
                "cannot draw {} cards from {} remaining",
                total_draws,
                remaining.len()
            );
            return Ok(EquityOutcome::not_computed(seats));
        }

        let mut holes: Vec<[Card; 2]> = vec![[DECK[0]; 2]; seats];
        let mut board_buf = [DECK[0]; 5];
        board_buf[..board.len()].copy_from_slice(board);

        if missing > 0 {
            return self.sample(players, &mut holes, &mut board_buf, board.len(), remaining, rng, ticket);
        }

        for (hole, player) in holes.iter_mut().zip(players) {
            let cards = player.as_ref();
            *hole = [cards[0], cards[1]];
        }

        let mut outcome = EquityOutcome::not_computed(seats);
        if board_draws == 0 {
            let winners = self.winners(&holes, &board_buf);
            outcome.record(winners);
            outcome.method = EquityMethod::Showdown;
            return Ok(outcome);
        }

        let boards = combination_count(remaining.len(), board_draws);
        if boards <= self.enumeration_limit {
            log::debug!("enumerating {} boards for {} players", boards, seats);
            let mut cancelled = false;
            for_each_combination(remaining, board_draws, |drawn| {
                if is_cancelled(ticket) {
                    cancelled = true;
                    return ControlFlow::Break(());
                }
                board_buf[board.len()..].copy_from_slice(drawn);
                let winners = self.winners(&holes, &board_buf);
                outcome.record(winners);
                ControlFlow::Continue(())
            });
            if cancelled {
                return Err(PokerError::Cancelled);
            }
            outcome.method = EquityMethod::Enumeration;
            return Ok(outcome);
        }

        log::debug!(
            "{} boards exceed the enumeration limit, sampling {}",
            boards,
            self.monte_carlo_samples
        );
        self.sample(players, &mut holes, &mut board_buf, board.len(), remaining, rng, ticket)
    }

    #[allow(clippy::too_many_arguments)]
    fn sample<P, R>(
        &mut self,
        players: &[P],
        holes: &mut [[Card; 2]],
        board_buf: &mut [Card; 5],
        known_board: usize,
        remaining: &[Card],
        rng: &mut R,
        ticket: Option<&Ticket>,
    ) -> PokerResult<EquityOutcome>
    where
        P: AsRef<[Card]>,
        R: Rng + ?Sized,
    {
        let missing: usize = players.iter().map(|p| 2 - p.as_ref().len()).sum();
        let draws = missing + 5 - known_board;
        let mut scratch = remaining.to_vec();
        let mut outcome = EquityOutcome::not_computed(players.len());

        for _ in 0..self.monte_carlo_samples {
            if is_cancelled(ticket) {
                return Err(PokerError::Cancelled);
            }
            let drawn = draw_without_replacement(&mut scratch, draws, rng);
            let mut next = drawn.iter();
            for (hole, player) in holes.iter_mut().zip(players) {
                let known = player.as_ref();
                for (slot, card) in hole.iter_mut().enumerate() {
                    *card = match known.get(slot) {
                        Some(&c) => c,
                        None => *next.next().ok_or(PokerError::NotEnoughDeck {
                            requested: draws,
                            available: remaining.len(),
                        })?,
                    };
                }
            }
            for card in board_buf[known_board..].iter_mut() {
                *card = *next.next().ok_or(PokerError::NotEnoughDeck {
                    requested: draws,
                    available: remaining.len(),
                })?;
            }
            let winners = self.winners(holes, board_buf);
            outcome.record(winners);
        }

        outcome.method = EquityMethod::MonteCarlo;
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Showdown on a complete board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatShowdown {
    pub score: HandScore,
    pub best_five: [Card; 5],
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowdownResult {
    pub seats: Vec<SeatShowdown>,
    /// Seat indices holding the best hand; more than one means a split pot.
    pub winners: Vec<usize>,
}

/// Best hand of every seat and the winning seats. Requires a 5-card board and
/// two hole cards per seat.
pub fn resolve_showdown<P: AsRef<[Card]>>(players: &[P], board: &[Card]) -> PokerResult<ShowdownResult> {
    if board.len() != 5 {
        return Err(PokerError::InvalidBoardLength(board.len()));
    }
    let mut seats = Vec::with_capacity(players.len());
    for player in players {
        let hole = player.as_ref();
        if hole.len() != 2 {
            return Err(PokerError::NotEnoughCards {
                need: 2,
                got: hole.len(),
            });
        }
        let seven = [hole[0], hole[1], board[0], board[1], board[2], board[3], board[4]];
        let (score, best_five) = best_of_unchecked(&seven);
        seats.push(SeatShowdown {
            score,
            best_five,
            description: score.to_string(),
        });
    }
    let best = seats.iter().map(|s| s.score).max();
    let winners = seats
        .iter()
        .enumerate()
        .filter(|(_, s)| Some(s.score) == best)
        .map(|(i, _)| i)
        .collect();
    Ok(ShowdownResult { seats, winners })
}

// ---------------------------------------------------------------------------
// Caller-facing equity report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerReport {
    pub win_ratio: f64,
    pub tie_ratio: f64,
    pub equity: f64,
}

impl fmt::Display for PlayerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.1}% | Tie {:.1}% (equity: {:.1}%)",
            self.win_ratio * 100.0,
            self.tie_ratio * 100.0,
            self.equity * 100.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityReport {
    pub per_player: Vec<PlayerReport>,
    pub computable: bool,
    pub simulations: u64,
    pub method: EquityMethod,
    /// Why the input could not be computed, when `computable` is false.
    pub reason: Option<String>,
    /// Final hands and winners when the board is complete.
    pub showdown: Option<ShowdownResult>,
}

impl EquityReport {
    fn rejected(reason: PokerError) -> Self {
        EquityReport {
            per_player: Vec::new(),
            computable: false,
            simulations: 0,
            method: EquityMethod::NotComputed,
            reason: Some(reason.to_string()),
            showdown: None,
        }
    }
}

/// Rejects tables the engine cannot compute: bad board length, too many hole
/// cards, seat count outside 1..=9, duplicate cards.
pub fn validate_table<P: AsRef<[Card]>>(players: &[P], board: &[Card]) -> PokerResult<()> {
    if !matches!(board.len(), 0 | 3 | 4 | 5) {
        return Err(PokerError::InvalidBoardLength(board.len()));
    }
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players.len()) {
        return Err(PokerError::InvalidPlayerCount {
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
            got: players.len(),
        });
    }
    if let Some(p) = players.iter().find(|p| p.as_ref().len() > 2) {
        return Err(PokerError::TooManyHoleCards(p.as_ref().len()));
    }
    let groups = players.iter().map(|p| p.as_ref()).chain(std::iter::once(board));
    if let Some(card) = find_duplicate(groups) {
        return Err(PokerError::DuplicateCard(card));
    }
    Ok(())
}

impl EquityEngine {
    /// Validates the table, computes equities and, on a complete board with
    /// every hand known, resolves the showdown.
    pub fn evaluate_equity<P, R>(
        &mut self,
        players: &[P],
        board: &[Card],
        rng: &mut R,
        ticket: Option<&Ticket>,
    ) -> PokerResult<EquityReport>
    where
        P: AsRef<[Card]>,
        R: Rng + ?Sized,
    {
        if let Err(reason) = validate_table(players, board) {
            log::debug!("equity request rejected: {}", reason);
            return Ok(EquityReport::rejected(reason));
        }

        let dead: Vec<Card> = players
            .iter()
            .flat_map(|p| p.as_ref().iter().copied())
            .chain(board.iter().copied())
            .collect();
        let remaining = remaining_cards(&dead);
        let outcome = self.compute_equity(players, board, &remaining, rng, ticket)?;

        let total = outcome.simulations.max(1) as f64;
        let per_player = outcome
            .per_player
            .iter()
            .map(|p| PlayerReport {
                win_ratio: p.wins as f64 / total,
                tie_ratio: p.ties as f64 / total,
                equity: p.share / total,
            })
            .collect();

        let complete = board.len() == 5 && players.iter().all(|p| p.as_ref().len() == 2);
        let showdown = if complete {
            Some(resolve_showdown(players, board)?)
        } else {
            None
        };

        Ok(EquityReport {
            per_player,
            computable: true,
            simulations: outcome.simulations,
            method: outcome.method,
            reason: None,
            showdown,
        })
    }
}

/// One-shot `evaluate_equity` with default settings and thread-local randomness.
pub fn evaluate_equity<P: AsRef<[Card]>>(players: &[P], board: &[Card]) -> PokerResult<EquityReport> {
    let mut engine = EquityEngine::new(&EngineConfig::default());
    engine.evaluate_equity(players, board, &mut rand::thread_rng(), None)
}

/// Hero's pot share against one known villain hand, with the number of
/// boards it was computed over.
///
/// Runouts are drawn from `live` only, so cards known to be out of the deck
/// never reach the board. The hands and the board are dropped from `live`
/// if present. Exhaustive when the number of completions is within
/// `enumeration_limit`, otherwise `samples` random completions. No showdown
/// memo is kept.
pub fn hand_vs_hand_equity<R: Rng + ?Sized>(
    hero: [Card; 2],
    villain: [Card; 2],
    board: &[Card],
    live: &[Card],
    enumeration_limit: u64,
    samples: usize,
    rng: &mut R,
) -> PokerResult<(f64, u64)> {
    let taken = mask_of(&hero) | mask_of(&villain) | mask_of(board);
    let remaining: Vec<Card> = live.iter().copied().filter(|c| taken & c.mask() == 0).collect();
    let mut engine = EquityEngine::with_limits(enumeration_limit, samples, 0);
    let outcome = engine.compute_equity(&[hero, villain], board, &remaining, rng, None)?;
    match outcome.equities() {
        Some(equities) => Ok((equities[0], outcome.simulations)),
        None => Err(PokerError::NotEnoughDeck {
            requested: 5usize.saturating_sub(board.len()),
            available: remaining.len(),
        }),
    }
}
