//! Flat-array regret storage shared by every CFR variant.
//!
//! Data is organized by *node*, where each node has a fixed number of actions
//! and info sets. For node `n`, info set `h`, action `a`:
//!
//!   index = offsets[n] + h * num_actions[n] + a
//!
//! All info sets at one tree position stay contiguous, so a full sweep over
//! the buckets of a node walks memory linearly.

use serde::Serialize;

/// How accumulated regret is stored between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegretRule {
    /// Plain signed accumulation (vanilla CFR).
    Signed,
    /// Regrets floored at zero after every update (CFR+).
    Floored,
}

#[derive(Debug, Clone)]
pub struct RegretTable {
    rule: RegretRule,
    regrets: Vec<f64>,
    cum_strategy: Vec<f64>,
    /// Reach weight accumulated alongside the strategy sum, one per info set.
    visits: Vec<f64>,
    num_actions: Vec<u8>,
    offsets: Vec<usize>,
    visit_offsets: Vec<usize>,
}

impl RegretTable {
    /// Builds a table from a list of `(num_actions, num_infosets)` per node.
    pub fn new(nodes: &[(u8, usize)], rule: RegretRule) -> Self {
        let mut offsets = Vec::with_capacity(nodes.len());
        let mut visit_offsets = Vec::with_capacity(nodes.len());
        let mut num_actions = Vec::with_capacity(nodes.len());
        let mut offset = 0;
        let mut visit_offset = 0;

        for &(actions, infosets) in nodes {
            offsets.push(offset);
            visit_offsets.push(visit_offset);
            num_actions.push(actions);
            offset += actions as usize * infosets;
            visit_offset += infosets;
        }

        RegretTable {
            rule,
            regrets: vec![0.0; offset],
            cum_strategy: vec![0.0; offset],
            visits: vec![0.0; visit_offset],
            num_actions,
            offsets,
            visit_offsets,
        }
    }

    pub fn rule(&self) -> RegretRule {
        self.rule
    }

    #[inline]
    pub fn num_actions(&self, node: usize) -> usize {
        self.num_actions[node] as usize
    }

    #[inline]
    fn base(&self, node: usize, infoset: usize) -> usize {
        self.offsets[node] + infoset * self.num_actions[node] as usize
    }

    pub fn regrets(&self, node: usize, infoset: usize) -> &[f64] {
        let base = self.base(node, infoset);
        &self.regrets[base..base + self.num_actions(node)]
    }

    /// Regret matching: proportional to positive regret, uniform when none is
    /// positive. `out` must hold at least `num_actions(node)` entries.
    #[inline]
    pub fn current_strategy(&self, node: usize, infoset: usize, out: &mut [f64]) {
        let na = self.num_actions(node);
        let regrets = self.regrets(node, infoset);
        let positive_sum: f64 = regrets.iter().map(|r| r.max(0.0)).sum();

        if positive_sum > 0.0 {
            for (o, &r) in out[..na].iter_mut().zip(regrets) {
                *o = r.max(0.0) / positive_sum;
            }
        } else {
            out[..na].fill(1.0 / na as f64);
        }
    }

    /// Normalized strategy sum, or `fallback` when nothing was accumulated.
    pub fn average_strategy(&self, node: usize, infoset: usize, fallback: &[f64], out: &mut [f64]) {
        let na = self.num_actions(node);
        let base = self.base(node, infoset);
        let cum = &self.cum_strategy[base..base + na];
        let total: f64 = cum.iter().sum();

        if total > 1e-12 {
            for (o, &s) in out[..na].iter_mut().zip(cum) {
                *o = s / total;
            }
        } else {
            out[..na].copy_from_slice(&fallback[..na]);
        }
    }

    /// Adds `weight * (value[a] - node_value)` to each action's regret.
    ///
    /// `weight` is the reach of everyone but the acting player, chance
    /// included.
    #[inline]
    pub fn accumulate_regret(
        &mut self,
        node: usize,
        infoset: usize,
        action_values: &[f64],
        node_value: f64,
        weight: f64,
    ) {
        let na = self.num_actions(node);
        let base = self.base(node, infoset);
        let floored = self.rule == RegretRule::Floored;
        for (r, &v) in self.regrets[base..base + na].iter_mut().zip(action_values) {
            *r += weight * (v - node_value);
            if floored && *r < 0.0 {
                *r = 0.0;
            }
        }
    }

    /// Adds `weight * strategy` to the strategy sum and `weight` to the visit
    /// count of the info set.
    #[inline]
    pub fn accumulate_strategy(&mut self, node: usize, infoset: usize, strategy: &[f64], weight: f64) {
        let na = self.num_actions(node);
        let base = self.base(node, infoset);
        for (s, &p) in self.cum_strategy[base..base + na].iter_mut().zip(strategy) {
            *s += weight * p;
        }
        self.visits[self.visit_offsets[node] + infoset] += weight;
    }

    pub fn visit_weight(&self, node: usize, infoset: usize) -> f64 {
        self.visits[self.visit_offsets[node] + infoset]
    }

    /// Sum of positive regret at an info set.
    pub fn positive_regret(&self, node: usize, infoset: usize) -> f64 {
        self.regrets(node, infoset).iter().map(|r| r.max(0.0)).sum()
    }

    /// Adds another run's regrets, strategy sums and visits into this table.
    /// Both tables must share one layout.
    pub fn merge(&mut self, other: &RegretTable) {
        debug_assert_eq!(self.offsets, other.offsets);
        debug_assert_eq!(self.num_actions, other.num_actions);
        for (a, b) in self.regrets.iter_mut().zip(&other.regrets) {
            *a += b;
        }
        for (a, b) in self.cum_strategy.iter_mut().zip(&other.cum_strategy) {
            *a += b;
        }
        for (a, b) in self.visits.iter_mut().zip(&other.visits) {
            *a += b;
        }
    }
}
