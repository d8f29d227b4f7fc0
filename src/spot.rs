//! Solving one betting spot end to end.
//!
//! Hero cards and board go in; the villain range is built from the undealt
//! cards, every combo gets hero's equity, and the registry runs each solver
//! variant over the same context. The highest-priority success is reported.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cancel::{is_cancelled, Ticket};
use crate::cards::{find_duplicate, mask_of, Card, DECK};
use crate::cfr::{SolveSummary, SolverContext};
use crate::config::{EngineConfig, DEFAULT_ITERATIONS};
use crate::error::{PokerError, PokerResult};
use crate::math_engine::{bet_amount, mdf, pot_odds};
use crate::range::{build_range, Profile};
use crate::registry::{SolverRegistry, SolverResult};

pub const MIN_BET_PERCENT: f64 = 1.0;
pub const MAX_BET_PERCENT: f64 = 400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub pot_size: f64,
    pub effective_stack: f64,
    /// Hero's bet as a percentage of the pot.
    pub bet_size_percent: f64,
    pub opponent_profile: Profile,
    pub iterations: u32,
    /// Optional range notation narrowing the villain's holdings.
    pub range: Option<String>,
    /// Fixed seed for the sampling steps; random when absent.
    pub seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            pot_size: 10.0,
            effective_stack: 100.0,
            bet_size_percent: 75.0,
            opponent_profile: Profile::Balanced,
            iterations: DEFAULT_ITERATIONS,
            range: None,
            seed: None,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl SolverSettings {
    /// Settings with every field pulled into its supported range.
    pub fn clamped(&self) -> Self {
        let bet_size_percent = if self.bet_size_percent.is_nan() {
            MIN_BET_PERCENT
        } else {
            self.bet_size_percent.clamp(MIN_BET_PERCENT, MAX_BET_PERCENT)
        };
        SolverSettings {
            pot_size: non_negative(self.pot_size),
            effective_stack: non_negative(self.effective_stack),
            bet_size_percent,
            iterations: EngineConfig::clamp_iterations(self.iterations),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnavailableReason {
    HeroCardsMissing,
    BoardTooLong,
    InsufficientDeck,
    RangeUnavailable,
    SimulationFailed,
    BetParametersMissing,
}

impl UnavailableReason {
    pub fn as_str(self) -> &'static str {
        match self {
            UnavailableReason::HeroCardsMissing => "hero-cards-missing",
            UnavailableReason::BoardTooLong => "board-too-long",
            UnavailableReason::InsufficientDeck => "insufficient-deck",
            UnavailableReason::RangeUnavailable => "range-unavailable",
            UnavailableReason::SimulationFailed => "simulation-failed",
            UnavailableReason::BetParametersMissing => "bet-parameters-missing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            UnavailableReason::HeroCardsMissing => "Hero needs exactly two hole cards",
            UnavailableReason::BoardTooLong => "The board holds at most five cards",
            UnavailableReason::InsufficientDeck => "Not enough undealt cards for a villain hand and the runout",
            UnavailableReason::RangeUnavailable => "No villain combos with positive weight",
            UnavailableReason::SimulationFailed => "No solver produced a result",
            UnavailableReason::BetParametersMissing => "Pot, bet size and stack must allow a positive bet",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverReport {
    pub hero: [Card; 2],
    pub board: Vec<Card>,
    pub profile: Profile,
    pub pot_size: f64,
    pub effective_stack: f64,
    pub bet_size_percent: f64,
    /// Bet actually used: percentage of the pot, capped at the stack.
    pub bet_size: f64,
    pub iterations: u32,
    pub pot_odds: f64,
    pub mdf: f64,
    /// Hero equity against the whole weighted range.
    pub hero_equity: f64,
    pub range_combos: usize,
    pub range_weight: f64,
    pub equity_simulations: u64,
    pub primary_id: String,
    pub primary_label: String,
    pub primary: SolveSummary,
    pub results: Vec<SolverResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpotOutcome {
    Solved(Box<SolverReport>),
    Unavailable { reason: UnavailableReason },
}

impl SpotOutcome {
    fn unavailable(reason: UnavailableReason) -> Self {
        log::debug!("spot unavailable: {}", reason);
        SpotOutcome::Unavailable { reason }
    }

    pub fn report(&self) -> Option<&SolverReport> {
        match self {
            SpotOutcome::Solved(report) => Some(report),
            SpotOutcome::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            SpotOutcome::Solved(_) => None,
            SpotOutcome::Unavailable { reason } => Some(*reason),
        }
    }
}

pub struct SpotSolver {
    config: EngineConfig,
    registry: SolverRegistry,
}

impl SpotSolver {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, SolverRegistry::with_defaults())
    }

    pub fn with_registry(config: EngineConfig, registry: SolverRegistry) -> Self {
        SpotSolver { config, registry }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SolverRegistry {
        &self.registry
    }

    /// Solves hero's bet-or-check decision.
    ///
    /// Situations the engine cannot solve come back as
    /// [`SpotOutcome::Unavailable`]. Duplicate cards, bad range notation and a
    /// superseded ticket are errors.
    pub fn solve_spot(
        &self,
        hero: &[Card],
        board: &[Card],
        used: &[Card],
        settings: &SolverSettings,
        ticket: Option<&Ticket>,
    ) -> PokerResult<SpotOutcome> {
        let settings = settings.clamped();

        let hero: [Card; 2] = match hero {
            [a, b] => [*a, *b],
            _ => return Ok(SpotOutcome::unavailable(UnavailableReason::HeroCardsMissing)),
        };
        if board.len() > 5 {
            return Ok(SpotOutcome::unavailable(UnavailableReason::BoardTooLong));
        }
        if let Some(card) = find_duplicate([&hero[..], board]) {
            return Err(PokerError::DuplicateCard(card));
        }

        let dead = mask_of(&hero) | mask_of(board) | mask_of(used);
        let available: Vec<Card> = DECK.iter().copied().filter(|c| dead & c.mask() == 0).collect();
        if available.len() < 2 || available.len() - 2 < 5 - board.len() {
            return Ok(SpotOutcome::unavailable(UnavailableReason::InsufficientDeck));
        }

        let bet = bet_amount(settings.pot_size, settings.bet_size_percent, settings.effective_stack);
        if !(bet > 0.0) || !(settings.pot_size > 0.0) {
            return Ok(SpotOutcome::unavailable(UnavailableReason::BetParametersMissing));
        }

        let mut range = build_range(&available, settings.opponent_profile);
        if let Some(notation) = settings.range.as_deref().filter(|n| !n.trim().is_empty()) {
            range = range.restrict(notation)?;
        }
        if !range.is_usable() {
            return Ok(SpotOutcome::unavailable(UnavailableReason::RangeUnavailable));
        }

        let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let annotated = range.annotate_hero_equity(hero, board, &available, &self.config, seed, ticket);
        let simulations = match annotated {
            Ok(sims) => sims,
            Err(PokerError::Cancelled) => return Err(PokerError::Cancelled),
            Err(err) => {
                log::warn!("hero equity annotation failed: {}", err);
                return Ok(SpotOutcome::unavailable(UnavailableReason::SimulationFailed));
            }
        };
        if simulations == 0 {
            return Ok(SpotOutcome::unavailable(UnavailableReason::SimulationFailed));
        }
        let hero_equity = range.hero_equity();
        log::debug!(
            "{} villain combos, hero equity {:.3} over {} simulations",
            range.len(),
            hero_equity,
            simulations
        );

        let ctx = SolverContext {
            range: &range,
            hero_equity,
            pot: settings.pot_size,
            bet,
            stack: settings.effective_stack,
            iterations: settings.iterations,
            seed,
            config: &self.config,
            ticket,
        };
        let outcome = self.registry.solve_all(&ctx);
        if is_cancelled(ticket) {
            return Err(PokerError::Cancelled);
        }
        let Some(primary) = outcome.primary().cloned() else {
            return Ok(SpotOutcome::unavailable(UnavailableReason::SimulationFailed));
        };
        let Some(summary) = primary.summary else {
            return Ok(SpotOutcome::unavailable(UnavailableReason::SimulationFailed));
        };

        Ok(SpotOutcome::Solved(Box::new(SolverReport {
            hero,
            board: board.to_vec(),
            profile: settings.opponent_profile,
            pot_size: settings.pot_size,
            effective_stack: settings.effective_stack,
            bet_size_percent: settings.bet_size_percent,
            bet_size: bet,
            iterations: settings.iterations,
            pot_odds: pot_odds(settings.pot_size, bet)?,
            mdf: mdf(bet, settings.pot_size)?,
            hero_equity,
            range_combos: range.len(),
            range_weight: range.total_weight(),
            equity_simulations: simulations,
            primary_id: primary.id,
            primary_label: primary.label,
            primary: summary,
            results: outcome.results,
        })))
    }
}

/// [`SpotSolver::solve_spot`] with the default configuration and solvers.
pub fn solve_spot(
    hero: &[Card],
    board: &[Card],
    used: &[Card],
    settings: &SolverSettings,
) -> PokerResult<SpotOutcome> {
    SpotSolver::new(EngineConfig::default()).solve_spot(hero, board, used, settings, None)
}
