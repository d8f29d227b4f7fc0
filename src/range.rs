//! Weighted villain ranges built from the undealt cards.
//!
//! Every two-card combo that survives the dead cards gets a heuristic weight
//! from the opponent profile. The weights are a prior over plausible holdings,
//! not solved frequencies.

use std::collections::HashSet;
use std::fmt;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::{is_cancelled, Ticket};
use crate::cards::{hand_combos, simplify_hand, Card, RANKS_STR};
use crate::config::EngineConfig;
use crate::equity::hand_vs_hand_equity;
use crate::error::{PokerError, PokerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Balanced,
    Tight,
    Loose,
    Aggressive,
}

impl Profile {
    pub const ALL: [Profile; 4] = [Profile::Balanced, Profile::Tight, Profile::Loose, Profile::Aggressive];

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Balanced => "balanced",
            Profile::Tight => "tight",
            Profile::Loose => "loose",
            Profile::Aggressive => "aggressive",
        }
    }

    /// Prior weight of a two-card combo.
    pub fn weight(self, a: Card, b: Card) -> f64 {
        let (hi, lo) = if a.rank >= b.rank { (a.rank, b.rank) } else { (b.rank, a.rank) };
        let high = hi.index() as f64;
        let low = lo.index() as f64;
        let gap = high - low;
        let pair = if hi == lo { 1.0 } else { 0.0 };
        let suited = if a.suit == b.suit { 1.0 } else { 0.0 };

        match self {
            Profile::Balanced => 1.0 + 0.6 * pair + 0.25 * suited + (high - 7.0).max(0.0) / 12.0,
            Profile::Tight => 0.3 + (high + low) / 20.0 + 1.1 * pair + 0.2 * suited,
            Profile::Loose => 0.8 + (14.0 - gap.max(0.0)) / 18.0 + 0.5 * suited + 0.7 * pair,
            Profile::Aggressive => {
                let connected = if gap == 1.0 { 1.0 } else { 0.0 };
                let close = if gap <= 2.0 { 1.0 } else { 0.0 };
                0.9 + 0.7 * connected + 0.5 * suited + 0.9 * pair + 0.3 * close
            }
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedCombo {
    pub cards: [Card; 2],
    pub weight: f64,
    /// Running total of weights up to and including this combo.
    pub cumulative: f64,
    /// Hero's pot share against this combo, once annotated.
    pub hero_equity: f64,
}

impl WeightedCombo {
    pub fn mask(&self) -> u64 {
        self.cards[0].mask() | self.cards[1].mask()
    }

    /// Short class label such as "AKs" or "99".
    pub fn label(&self) -> String {
        simplify_hand(&self.cards).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VillainRange {
    profile: Profile,
    combos: Vec<WeightedCombo>,
    total_weight: f64,
}

/// Weights every unordered pair of `available` under `profile`.
pub fn build_range(available: &[Card], profile: Profile) -> VillainRange {
    let mut combos = Vec::with_capacity(available.len() * available.len().saturating_sub(1) / 2);
    for (i, &a) in available.iter().enumerate() {
        for &b in &available[i + 1..] {
            let weight = profile.weight(a, b);
            if weight > 0.0 {
                combos.push(WeightedCombo {
                    cards: [a, b],
                    weight,
                    cumulative: 0.0,
                    hero_equity: 0.0,
                });
            }
        }
    }
    VillainRange::from_combos(profile, combos)
}

impl VillainRange {
    fn from_combos(profile: Profile, mut combos: Vec<WeightedCombo>) -> Self {
        let mut running = 0.0;
        for combo in combos.iter_mut() {
            running += combo.weight;
            combo.cumulative = running;
        }
        VillainRange {
            profile,
            combos,
            total_weight: running,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn combos(&self) -> &[WeightedCombo] {
        &self.combos
    }

    pub fn len(&self) -> usize {
        self.combos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combos.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// A range can be solved against only when it carries positive weight.
    pub fn is_usable(&self) -> bool {
        !self.combos.is_empty() && self.total_weight > 0.0
    }

    /// Index of a combo drawn with probability proportional to its weight.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if !self.is_usable() {
            return None;
        }
        let target = rng.gen::<f64>() * self.total_weight;
        let idx = self.combos.partition_point(|c| c.cumulative <= target);
        Some(idx.min(self.combos.len() - 1))
    }

    /// Weighted average of the annotated hero equities.
    pub fn hero_equity(&self) -> f64 {
        if !self.is_usable() {
            return 0.0;
        }
        self.combos.iter().map(|c| c.weight * c.hero_equity).sum::<f64>() / self.total_weight
    }

    /// Sets every combo's hero equity from an external source.
    pub fn assign_hero_equity<F: FnMut(&WeightedCombo) -> f64>(&mut self, mut equity_of: F) {
        for combo in self.combos.iter_mut() {
            combo.hero_equity = equity_of(combo);
        }
    }

    /// Keeps only the combos matched by range notation like `"TT+,AKs,KQo"`.
    pub fn restrict(&self, notation: &str) -> PokerResult<VillainRange> {
        let mut allowed = HashSet::new();
        for hand in parse_range(notation) {
            for (a, b) in hand_combos(&hand)? {
                allowed.insert(a.mask() | b.mask());
            }
        }
        if allowed.is_empty() {
            return Err(PokerError::InvalidHandNotation(notation.to_string()));
        }
        let kept = self
            .combos
            .iter()
            .filter(|c| allowed.contains(&c.mask()))
            .cloned()
            .collect();
        Ok(VillainRange::from_combos(self.profile, kept))
    }

    /// Fills in `hero_equity` for every combo.
    ///
    /// `live` is the undealt deck the range was built from. Runouts for a
    /// combo come from `live` minus that combo.
    ///
    /// Combos run in parallel, each on its own generator seeded from `seed`
    /// and the combo index, so the result does not depend on scheduling.
    /// Returns the total number of simulated boards.
    pub fn annotate_hero_equity(
        &mut self,
        hero: [Card; 2],
        board: &[Card],
        live: &[Card],
        config: &EngineConfig,
        seed: u64,
        ticket: Option<&Ticket>,
    ) -> PokerResult<u64> {
        let enumeration_limit = config.combo_enumeration_limit;
        let samples = config.combo_equity_samples;
        self.combos
            .par_iter_mut()
            .enumerate()
            .map(|(idx, combo)| -> PokerResult<u64> {
                if is_cancelled(ticket) {
                    return Err(PokerError::Cancelled);
                }
                let mut rng = StdRng::seed_from_u64(seed ^ idx as u64);
                let (equity, sims) = hand_vs_hand_equity(
                    hero,
                    combo.cards,
                    board,
                    live,
                    enumeration_limit,
                    samples,
                    &mut rng,
                )?;
                combo.hero_equity = equity;
                Ok(sims)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }
}

// ---------------------------------------------------------------------------
// Range notation
// ---------------------------------------------------------------------------

/// Expands comma-separated range notation into hand classes.
///
/// Supports plus ranges (`"TT+"`, `"ATs+"`), dash ranges (`"77-TT"`,
/// `"KTs-KQs"`), single classes and specific combos (`"AsKh"`).
pub fn parse_range(range_str: &str) -> Vec<String> {
    let mut hands = Vec::new();
    let mut seen = HashSet::new();
    for part in range_str.replace(' ', "").split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let expanded = if let Some(base) = part.strip_suffix('+') {
            expand_plus(base)
        } else if part.contains('-') && part.len() > 3 {
            expand_dash(part)
        } else {
            vec![part.to_string()]
        };
        for hand in expanded {
            if seen.insert(hand.clone()) {
                hands.push(hand);
            }
        }
    }
    hands
}

fn expand_plus(base: &str) -> Vec<String> {
    let chars: Vec<char> = base.chars().collect();
    let ranks: Vec<char> = RANKS_STR.chars().collect();

    // Pair: "TT+"
    if chars.len() == 2 && chars[0] == chars[1] {
        if let Some(idx) = RANKS_STR.find(chars[0]) {
            return (idx..ranks.len()).map(|i| format!("{}{}", ranks[i], ranks[i])).collect();
        }
    }

    // Suited/offsuit: "ATs+"
    if chars.len() == 3 {
        let (high, low, kind) = (chars[0], chars[1], chars[2]);
        if let (Some(lo), Some(hi)) = (RANKS_STR.find(low), RANKS_STR.find(high)) {
            return (lo..hi).map(|i| format!("{}{}{}", high, ranks[i], kind)).collect();
        }
    }

    vec![base.to_string()]
}

fn expand_dash(range_str: &str) -> Vec<String> {
    let Some((start, end)) = range_str.split_once('-') else {
        return vec![range_str.to_string()];
    };
    let s: Vec<char> = start.chars().collect();
    let e: Vec<char> = end.chars().collect();
    let ranks: Vec<char> = RANKS_STR.chars().collect();

    // Pair range: "77-TT"
    if s.len() == 2 && e.len() == 2 && s[0] == s[1] && e[0] == e[1] {
        if let (Some(si), Some(ei)) = (RANKS_STR.find(s[0]), RANKS_STR.find(e[0])) {
            return (si.min(ei)..=si.max(ei))
                .map(|i| format!("{}{}", ranks[i], ranks[i]))
                .collect();
        }
    }

    // Suited/offsuit range: "KTs-KQs"
    if s.len() == 3 && e.len() == 3 && s[0] == e[0] && s[2] == e[2] {
        if let (Some(si), Some(ei)) = (RANKS_STR.find(s[1]), RANKS_STR.find(e[1])) {
            return (si.min(ei)..=si.max(ei))
                .map(|i| format!("{}{}{}", s[0], ranks[i], s[2]))
                .collect();
        }
    }

    vec![range_str.to_string()]
}
