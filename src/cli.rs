use std::path::PathBuf;

use std::ffi::OsString;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cards::{find_duplicate, format_cards, parse_board, parse_cards, remaining_cards, Card};
use crate::config::EngineConfig;
use crate::display::{
    board_display, equity_table, odds_table, print_error, range_table, showdown_table, solver_report,
};
use crate::equity::{resolve_showdown, EquityEngine};
use crate::error::{PokerError, PokerResult};
use crate::math_engine::{bet_amount, mdf, pot_odds};
use crate::range::{build_range, Profile};
use crate::spot::{SolverSettings, SpotOutcome, SpotSolver};

#[derive(Parser)]
#[command(
    name = "alpha",
    version = "1.1.0",
    about = "Hold'em equity calculator and single-street CFR advisor."
)]
struct Cli {
    /// JSON file overriding engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Win/tie probabilities for up to nine hands
    Equity {
        /// Hole cards per player (e.g., AhAs KsKd). Use "-" or a single card for unknown cards
        #[arg(required = true, num_args = 1..=9)]
        players: Vec<String>,
        /// Board cards (e.g., AsKd5c)
        #[arg(short, long)]
        board: Option<String>,
        /// Seed for the Monte-Carlo path
        #[arg(long)]
        seed: Option<u64>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Best hands and winners on a complete board
    Showdown {
        /// Hole cards per player (e.g., AhAs KsKd)
        #[arg(required = true, num_args = 1..=9)]
        players: Vec<String>,
        /// Five board cards
        #[arg(short, long)]
        board: String,
        #[arg(long)]
        json: bool,
    },
    /// Bet-or-check advice against an estimated villain range
    Solve {
        /// Your hole cards (e.g., AhKs)
        hero: String,
        /// Board cards (e.g., Ks9d4c)
        #[arg(short, long)]
        board: Option<String>,
        /// Other cards known to be out of the deck
        #[arg(long)]
        used: Option<String>,
        /// Current pot size
        #[arg(long, default_value = "10")]
        pot: f64,
        /// Effective stack behind
        #[arg(long, default_value = "100")]
        stack: f64,
        /// Bet size as a percentage of the pot (1-400)
        #[arg(long = "bet-pct", default_value = "75")]
        bet_pct: f64,
        /// Villain range shape
        #[arg(short, long, default_value = "balanced")]
        profile: Profile,
        /// CFR iterations (1000-200000)
        #[arg(short = 'n', long)]
        iterations: Option<u32>,
        /// Narrow the villain range (e.g., "TT+,AKs,KQo")
        #[arg(short, long)]
        range: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of villain combos to list
        #[arg(long, default_value = "12")]
        top: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show the weighted villain range for a profile
    Range {
        /// Villain range shape
        #[arg(short, long, default_value = "balanced")]
        profile: Profile,
        /// Your hole cards; adds your equity against each combo
        #[arg(long)]
        hero: Option<String>,
        #[arg(short, long)]
        board: Option<String>,
        /// Other cards known to be out of the deck
        #[arg(long)]
        used: Option<String>,
        /// Narrow the range (e.g., "TT+,AKs,KQo")
        #[arg(short, long)]
        filter: Option<String>,
        /// Number of combos to list
        #[arg(long, default_value = "20")]
        top: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Pot odds and minimum defense frequency for a bet
    Odds {
        /// Current pot size
        pot: f64,
        /// Bet size as a percentage of the pot
        #[arg(long = "bet-pct", default_value = "75")]
        bet_pct: f64,
        /// Effective stack behind
        #[arg(long, default_value = "1000000")]
        stack: f64,
    },
}

pub fn run() {
    if let Err(e) = run_with_args(std::env::args_os()) {
        print_error(&e.to_string());
    }
}

/// Parses `args` (program name first) and runs the command. Invalid
/// arguments exit through clap; command failures are returned.
pub fn run_with_args<I, T>(args: I) -> PokerResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    dispatch(Cli::parse_from(args))
}

fn dispatch(cli: Cli) -> PokerResult<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Equity {
            players,
            board,
            seed,
            json,
        } => cmd_equity(&config, players, board, seed, json),
        Commands::Showdown { players, board, json } => cmd_showdown(players, board, json),
        Commands::Solve {
            hero,
            board,
            used,
            pot,
            stack,
            bet_pct,
            profile,
            iterations,
            range,
            seed,
            top,
            json,
        } => {
            let settings = SolverSettings {
                pot_size: pot,
                effective_stack: stack,
                bet_size_percent: bet_pct,
                opponent_profile: profile,
                iterations: iterations.unwrap_or(config.default_iterations),
                range,
                seed,
            };
            cmd_solve(&config, hero, board, used, settings, top, json)
        }
        Commands::Range {
            profile,
            hero,
            board,
            used,
            filter,
            top,
            seed,
        } => {
            let spot = RangeSpot { hero, board, used };
            cmd_range(&config, profile, spot, filter, top, seed)
        }
        Commands::Odds { pot, bet_pct, stack } => cmd_odds(pot, bet_pct, stack),
    }
}

fn load_config(path: Option<&PathBuf>) -> PokerResult<EngineConfig> {
    match path {
        Some(p) => EngineConfig::from_json_file(p),
        None => Ok(EngineConfig::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> PokerResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_optional_board(board: Option<&str>) -> PokerResult<Vec<Card>> {
    board.map_or(Ok(Vec::new()), parse_board)
}

fn parse_hand(notation: &str) -> PokerResult<Vec<Card>> {
    let cards = parse_cards(notation)?;
    if cards.len() > 2 {
        return Err(PokerError::TooManyHoleCards(cards.len()));
    }
    Ok(cards)
}

fn hand_label(cards: &[Card]) -> String {
    match cards.len() {
        0 => "??".to_string(),
        1 => format!("{}?", format_cards(cards)),
        _ => format_cards(cards),
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn cmd_equity(
    config: &EngineConfig,
    players: Vec<String>,
    board: Option<String>,
    seed: Option<u64>,
    json: bool,
) -> PokerResult<()> {
    let hands = players
        .iter()
        .map(|p| parse_hand(p))
        .collect::<PokerResult<Vec<_>>>()?;
    let board_cards = parse_optional_board(board.as_deref())?;

    let mut engine = EquityEngine::new(config);
    let report = engine.evaluate_equity(&hands, &board_cards, &mut rng_from(seed), None)?;
    if json {
        return print_json(&report);
    }

    println!();
    let labels: Vec<String> = hands.iter().map(|h| hand_label(h)).collect();
    if board_cards.is_empty() {
        println!("  {}", labels.join(" vs ").bold());
    } else {
        println!("  {} on {}", labels.join(" vs ").bold(), board_display(&board_cards));
    }
    if !report.computable {
        print_error(report.reason.as_deref().unwrap_or("Cannot compute equity for this input"));
        return Ok(());
    }
    println!(
        "  {} boards ({})\n",
        format!("{}", report.simulations).bold(),
        report.method
    );
    println!("{}", equity_table(&labels, &report));
    if let Some(showdown) = &report.showdown {
        println!("{}", showdown_table(&labels, showdown));
    }
    println!();
    Ok(())
}

fn cmd_showdown(players: Vec<String>, board: String, json: bool) -> PokerResult<()> {
    let hands = players
        .iter()
        .map(|p| parse_hand(p))
        .collect::<PokerResult<Vec<_>>>()?;
    let board_cards = parse_board(&board)?;
    let groups = hands.iter().map(|h| h.as_slice()).chain(std::iter::once(board_cards.as_slice()));
    if let Some(card) = find_duplicate(groups) {
        return Err(PokerError::DuplicateCard(card));
    }

    let result = resolve_showdown(&hands, &board_cards)?;
    if json {
        return print_json(&result);
    }
    let labels: Vec<String> = hands.iter().map(|h| format_cards(h)).collect();
    println!();
    println!("  Board: {}", board_display(&board_cards));
    println!();
    println!("{}", showdown_table(&labels, &result));
    println!();
    Ok(())
}

fn cmd_solve(
    config: &EngineConfig,
    hero: String,
    board: Option<String>,
    used: Option<String>,
    settings: SolverSettings,
    top: usize,
    json: bool,
) -> PokerResult<()> {
    let hero_cards = parse_cards(&hero)?;
    let board_cards = parse_cards(board.as_deref().unwrap_or(""))?;
    let used_cards = parse_cards(used.as_deref().unwrap_or(""))?;

    if !json {
        println!();
        println!(
            "  Solving {} on {} vs {} range, pot={}, stack={}, bet={}% ...",
            format_cards(&hero_cards).bold(),
            if board_cards.is_empty() {
                "preflop".to_string()
            } else {
                board_display(&board_cards)
            },
            settings.opponent_profile,
            settings.pot_size,
            settings.effective_stack,
            settings.bet_size_percent,
        );
    }

    let solver = SpotSolver::new(config.clone());
    let outcome = solver.solve_spot(&hero_cards, &board_cards, &used_cards, &settings, None)?;
    if json {
        return print_json(&outcome);
    }

    match outcome {
        SpotOutcome::Solved(report) => println!("{}", solver_report(&report, top)),
        SpotOutcome::Unavailable { reason } => {
            println!();
            print_error(&format!("Solver unavailable ({}): {}", reason, reason.message()));
        }
    }
    println!();
    Ok(())
}

/// Card arguments of the `range` command.
struct RangeSpot {
    hero: Option<String>,
    board: Option<String>,
    used: Option<String>,
}

fn cmd_range(
    config: &EngineConfig,
    profile: Profile,
    spot: RangeSpot,
    filter: Option<String>,
    top: usize,
    seed: Option<u64>,
) -> PokerResult<()> {
    let hero_cards = parse_cards(spot.hero.as_deref().unwrap_or(""))?;
    let board_cards = parse_optional_board(spot.board.as_deref())?;
    let used_cards = parse_cards(spot.used.as_deref().unwrap_or(""))?;
    let groups = [hero_cards.as_slice(), board_cards.as_slice(), used_cards.as_slice()];
    if let Some(card) = find_duplicate(groups) {
        return Err(PokerError::DuplicateCard(card));
    }

    let live = remaining_cards(&groups.concat());
    let mut range = build_range(&live, profile);
    if let Some(notation) = filter.as_deref() {
        range = range.restrict(notation)?;
    }

    let with_equity = match hero_cards.as_slice() {
        [a, b] => {
            let seed = seed.unwrap_or(0);
            range.annotate_hero_equity([*a, *b], &board_cards, &live, config, seed, None)?;
            true
        }
        [] => false,
        _ => return Err(PokerError::InvalidHandNotation(format_cards(&hero_cards))),
    };

    println!();
    println!(
        "  {} range: {} combos, total weight {:.1}",
        profile.to_string().bold(),
        range.len(),
        range.total_weight()
    );
    if with_equity {
        println!(
            "  {} equity vs range: {:.1}%",
            format_cards(&hero_cards).bold(),
            range.hero_equity() * 100.0
        );
    }
    println!();
    println!("{}", range_table(&range, top, with_equity));
    println!();
    Ok(())
}

fn cmd_odds(pot: f64, bet_pct: f64, stack: f64) -> PokerResult<()> {
    let bet = bet_amount(pot, bet_pct, stack);
    let odds = pot_odds(pot, bet)?;
    let defense = mdf(bet, pot)?;
    println!();
    println!("{}", odds_table(pot, bet, odds, defense));
    println!(
        "  Defend at least {:.1}% of your range to stop any-two-cards bluffs.",
        defense * 100.0
    );
    println!();
    Ok(())
}
