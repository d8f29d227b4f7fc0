use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use itertools::Itertools;

use crate::cards::{Card, Suit};
use crate::equity::{EquityReport, ShowdownResult};
use crate::range::VillainRange;
use crate::spot::SolverReport;

pub fn equity_bar(equity: f64, width: usize) -> String {
    let filled = ((equity.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", equity * 100.0);

    if equity >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if equity >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

pub fn card_display(card: &Card) -> String {
    let text = card.pretty();
    match card.suit {
        Suit::Spades => text.white().to_string(),
        Suit::Hearts => text.red().to_string(),
        Suit::Diamonds => text.blue().to_string(),
        Suit::Clubs => text.green().to_string(),
    }
}

pub fn board_display(cards: &[Card]) -> String {
    cards.iter().map(card_display).join(" ")
}

fn label_cell(text: &str) -> Cell {
    Cell::new(text.bold().to_string())
}

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn signed(value: f64) -> String {
    let text = format!("{:+.2}", value);
    if value >= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

pub fn equity_table(labels: &[String], report: &EquityReport) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Player", "Hand", "Win", "Tie", "Equity"]);

    for (seat, (label, player)) in labels.iter().zip(&report.per_player).enumerate() {
        table.add_row(vec![
            label_cell(&format!("P{}", seat + 1)),
            Cell::new(label),
            Cell::new(pct(player.win_ratio)).set_alignment(CellAlignment::Right),
            Cell::new(pct(player.tie_ratio)).set_alignment(CellAlignment::Right),
            Cell::new(equity_bar(player.equity, 20)),
        ]);
    }
    table.to_string()
}

pub fn showdown_table(labels: &[String], showdown: &ShowdownResult) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Player", "Hand", "Best Five", "Made Hand", ""]);

    for (seat, (label, result)) in labels.iter().zip(&showdown.seats).enumerate() {
        let won = showdown.winners.contains(&seat);
        let marker = match (won, showdown.winners.len()) {
            (true, 1) => "WIN".green().bold().to_string(),
            (true, _) => "SPLIT".yellow().bold().to_string(),
            _ => String::new(),
        };
        table.add_row(vec![
            label_cell(&format!("P{}", seat + 1)),
            Cell::new(label),
            Cell::new(board_display(&result.best_five)),
            Cell::new(&result.description),
            Cell::new(marker),
        ]);
    }
    table.to_string()
}

/// Heaviest combos first, optionally with hero's equity against each.
pub fn range_table(range: &VillainRange, top: usize, with_equity: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["Combo", "Class", "Weight", "Share"];
    if with_equity {
        header.push("Hero Equity");
    }
    table.set_header(header);

    let total = range.total_weight();
    let heaviest = range
        .combos()
        .iter()
        .sorted_by(|a, b| b.weight.total_cmp(&a.weight).then(a.cards.cmp(&b.cards)))
        .take(top);
    for combo in heaviest {
        let share = if total > 0.0 { combo.weight / total } else { 0.0 };
        let mut row = vec![
            Cell::new(board_display(&combo.cards)),
            label_cell(&combo.label()),
            Cell::new(format!("{:.2}", combo.weight)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", share * 100.0)).set_alignment(CellAlignment::Right),
        ];
        if with_equity {
            row.push(Cell::new(equity_bar(combo.hero_equity, 16)));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn odds_table(pot: f64, bet: f64, pot_odds: f64, mdf: f64) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Metric").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);

    table.add_row(vec![label_cell("Pot"), Cell::new(format!("{:.2}", pot))]);
    table.add_row(vec![label_cell("Bet"), Cell::new(format!("{:.2}", bet))]);
    table.add_row(vec![label_cell("Total Pot"), Cell::new(format!("{:.2}", pot + bet + bet))]);
    table.add_row(vec![label_cell("Pot Odds"), Cell::new(pct(pot_odds))]);
    table.add_row(vec![label_cell("MDF"), Cell::new(pct(mdf))]);

    table.to_string()
}

pub fn styled_action(action: &str) -> String {
    match action.to_uppercase().as_str() {
        "BET" => action.red().bold().to_string(),
        "CALL" => action.green().bold().to_string(),
        "FOLD" => action.dimmed().bold().to_string(),
        "CHECK" => action.yellow().bold().to_string(),
        _ => action.bold().to_string(),
    }
}

/// Full text rendering of a solved spot.
pub fn solver_report(report: &SolverReport, top: usize) -> String {
    let summary = &report.primary;
    let mut out = String::new();

    out.push_str(&format!(
        "\n  {}  {} via {}\n",
        styled_action(summary.recommended_action()),
        format!(
            "(bet {} / check {})",
            pct(summary.hero_strategy.bet),
            pct(summary.hero_strategy.check)
        )
        .dimmed(),
        report.primary_label.cyan()
    ));
    out.push_str(&format!(
        "  Equity vs {} range: {}\n",
        report.profile,
        equity_bar(report.hero_equity, 20)
    ));

    let mut spot = Table::new();
    spot.set_content_arrangement(ContentArrangement::Dynamic);
    spot.set_header(vec!["Spot", "Value"]);
    spot.add_row(vec![label_cell("Pot"), Cell::new(format!("{:.2}", report.pot_size))]);
    spot.add_row(vec![label_cell("Bet"), Cell::new(format!("{:.2} ({:.0}%)", report.bet_size, report.bet_size_percent))]);
    spot.add_row(vec![label_cell("Stack"), Cell::new(format!("{:.2}", report.effective_stack))]);
    spot.add_row(vec![label_cell("Pot Odds"), Cell::new(pct(report.pot_odds))]);
    spot.add_row(vec![label_cell("MDF"), Cell::new(pct(report.mdf))]);
    spot.add_row(vec![
        label_cell("Villain Range"),
        Cell::new(format!("{} combos ({} equity sims)", report.range_combos, report.equity_simulations)),
    ]);
    out.push_str(&format!("\n{}\n", spot));

    let mut strategy = Table::new();
    strategy.set_content_arrangement(ContentArrangement::Dynamic);
    strategy.set_header(vec!["Line", "Value"]);
    strategy.add_row(vec![label_cell("EV Bet"), Cell::new(signed(summary.ev_bet))]);
    strategy.add_row(vec![label_cell("EV Check"), Cell::new(signed(summary.ev_check))]);
    strategy.add_row(vec![label_cell("Villain Calls"), Cell::new(pct(summary.villain_call_frequency))]);
    strategy.add_row(vec![label_cell("Villain Folds"), Cell::new(pct(summary.villain_fold_frequency))]);
    strategy.add_row(vec![
        label_cell("Villain Bets After Check"),
        Cell::new(pct(summary.villain_bet_after_check_frequency)),
    ]);
    strategy.add_row(vec![
        label_cell("Hero Calls Donk Bet"),
        Cell::new(pct(summary.hero_call_strategy.call)),
    ]);
    strategy.add_row(vec![label_cell("Call Threshold"), Cell::new(pct(summary.call_threshold))]);
    strategy.add_row(vec![
        label_cell("Exploitability"),
        Cell::new(format!(
            "{:.4} after {} iterations{}",
            summary.convergence.exploitability,
            summary.convergence.iterations,
            if summary.convergence.stopped_early { " (early stop)" } else { "" }
        )),
    ]);
    out.push_str(&format!("{}\n", strategy));

    if summary.bet_sizes.len() > 1 {
        let mut sizes = Table::new();
        sizes.set_content_arrangement(ContentArrangement::Dynamic);
        sizes.set_header(vec!["Bet Size", "Frequency", "Villain Calls", "EV"]);
        for line in &summary.bet_sizes {
            sizes.add_row(vec![
                label_cell(&format!("{:.2}", line.size)),
                Cell::new(pct(line.frequency)),
                Cell::new(pct(line.villain_call_frequency)),
                Cell::new(signed(line.ev)),
            ]);
        }
        out.push_str(&format!("{}\n", sizes));
    }

    if !summary.details.is_empty() && top > 0 {
        let mut combos = Table::new();
        combos.set_content_arrangement(ContentArrangement::Dynamic);
        combos.set_header(vec!["Villain", "Class", "Share", "Hero Equity", "Calls", "Bets If Checked"]);
        for detail in summary.details.iter().take(top) {
            combos.add_row(vec![
                Cell::new(board_display(&detail.cards)),
                label_cell(&detail.label),
                Cell::new(format!("{:.2}%", detail.weight_share * 100.0)),
                Cell::new(pct(detail.hero_equity)),
                Cell::new(pct(detail.call_probability)),
                Cell::new(pct(detail.bet_after_check)),
            ]);
        }
        out.push_str(&format!("{}\n", combos));
    }

    let others = report
        .results
        .iter()
        .filter(|r| r.id != report.primary_id)
        .map(|r| match (&r.summary, &r.error) {
            (Some(s), _) => format!("{} {} ({}ms)", r.label, styled_action(s.recommended_action()), r.elapsed_ms),
            (None, Some(e)) => format!("{} {} ({})", r.label, "failed".red(), e),
            (None, None) => r.label.clone(),
        })
        .join(" | ");
    if !others.is_empty() {
        out.push_str(&format!("  {} {}", "Other solvers:".dimmed(), others));
    }
    out
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}
