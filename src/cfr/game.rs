//! The single-street betting game every variant solves.
//!
//! Hero acts first: bet one of `hero_sizes` or check. Facing a bet the villain
//! folds or calls. After a check the villain checks behind or bets one of
//! `villain_sizes`, and hero then folds or calls. Utilities are from hero's
//! side; the villain receives the negation.
//!
//! Node layout in the [`RegretTable`]:
//!
//! | node | actions | info sets |
//! |---|---|---|
//! | `ROOT` | bet sizes then check | 1 |
//! | `HERO_CALL` | fold, call | one per villain size |
//! | `VS_BET` | fold, call | hero size × villain info set |
//! | `VS_CHECK` | check then bet sizes | villain info set |

use crate::cfr::regrets::{RegretRule, RegretTable};

pub const ROOT: usize = 0;
pub const HERO_CALL: usize = 1;
pub const VS_BET: usize = 2;
pub const VS_CHECK: usize = 3;

/// Hero's expected result when a bet of `bet` into `pot` is called.
pub fn call_utility(equity: f64, pot: f64, bet: f64) -> f64 {
    let eq = equity.clamp(0.0, 1.0);
    if bet <= 0.0 {
        return eq * pot;
    }
    eq * (pot + 2.0 * bet) - bet
}

pub fn showdown_utility(equity: f64, pot: f64) -> f64 {
    equity.clamp(0.0, 1.0) * pot
}

/// One villain holding (or bucket of holdings) as the traversal sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Villain info set the holding belongs to.
    pub infoset: usize,
    pub equity: f64,
    /// Chance weight; a full sweep's weights sum to 1.
    pub probability: f64,
}

/// Time-averaged strategies of both players.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageProfile {
    /// Bet frequency per hero size, then check.
    pub hero_root: Vec<f64>,
    /// Hero call frequency facing each villain size.
    pub hero_call: Vec<f64>,
    /// Villain call frequency, indexed `size * infosets + infoset`.
    pub villain_call: Vec<f64>,
    /// Villain action after a check, indexed `infoset * (sizes + 1) + action`.
    pub villain_after_check: Vec<f64>,
}

/// Expected values of a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileValue {
    pub ev_bet_by_size: Vec<f64>,
    pub ev_bet: f64,
    pub ev_check: f64,
    pub hero_utility: f64,
    pub villain_call: f64,
    pub villain_bet_after_check: f64,
}

#[derive(Debug, Default)]
pub struct Scratch {
    root: Vec<f64>,
    hero_call: Vec<f64>,
    vs_bet: Vec<f64>,
    vs_check: Vec<f64>,
    root_values: Vec<f64>,
    check_values: Vec<f64>,
    call_values: Vec<f64>,
    call_reach: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CfrGame {
    pub pot: f64,
    pub hero_sizes: Vec<f64>,
    pub villain_sizes: Vec<f64>,
    pub infosets: usize,
}

impl CfrGame {
    /// One bet size for both players.
    pub fn single(pot: f64, bet: f64, infosets: usize) -> Self {
        CfrGame {
            pot,
            hero_sizes: vec![bet],
            villain_sizes: vec![bet],
            infosets,
        }
    }

    fn check_action(&self) -> usize {
        self.hero_sizes.len()
    }

    pub fn table(&self, rule: RegretRule) -> RegretTable {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        RegretTable::new(
            &[
                ((nh + 1) as u8, 1),
                (2, nv),
                (2, nh * self.infosets),
                ((nv + 1) as u8, self.infosets),
            ],
            rule,
        )
    }

    pub fn scratch(&self) -> Scratch {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        Scratch {
            root: vec![0.0; nh + 1],
            hero_call: vec![0.0; 2 * nv],
            vs_bet: vec![0.0; 2 * nh * self.infosets],
            vs_check: vec![0.0; (nv + 1) * self.infosets],
            root_values: vec![0.0; nh + 1],
            check_values: vec![0.0; nv + 1],
            call_values: vec![0.0; nv],
            call_reach: vec![0.0; nv],
        }
    }

    /// One regret-matching iteration over `samples`.
    ///
    /// Strategies are read once at the start, so every info set is updated
    /// against the same opponent strategy. `average_weight` scales what this
    /// iteration adds to the strategy sums.
    pub fn iterate(&self, table: &mut RegretTable, samples: &[Sample], average_weight: f64, scratch: &mut Scratch) {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        let n = self.infosets;
        let check = self.check_action();
        let Scratch {
            root,
            hero_call,
            vs_bet,
            vs_check,
            root_values,
            check_values,
            call_values,
            call_reach,
        } = scratch;

        table.current_strategy(ROOT, 0, root);
        for m in 0..nv {
            table.current_strategy(HERO_CALL, m, &mut hero_call[2 * m..]);
        }
        for h in 0..nh * n {
            table.current_strategy(VS_BET, h, &mut vs_bet[2 * h..]);
        }
        for i in 0..n {
            table.current_strategy(VS_CHECK, i, &mut vs_check[(nv + 1) * i..]);
        }
        root_values.fill(0.0);
        call_values.fill(0.0);
        call_reach.fill(0.0);

        for sample in samples {
            let (i, eq, p) = (sample.infoset, sample.equity, sample.probability);

            for (j, &size) in self.hero_sizes.iter().enumerate() {
                let cu = call_utility(eq, self.pot, size);
                let h = j * n + i;
                let st = &vs_bet[2 * h..2 * h + 2];
                let hero_value = st[0] * self.pot + st[1] * cu;
                root_values[j] += p * hero_value;

                let reach = root[j] * p;
                table.accumulate_regret(VS_BET, h, &[-self.pot, -cu], -hero_value, reach);
                table.accumulate_strategy(VS_BET, h, st, reach * average_weight);
            }

            let sd = showdown_utility(eq, self.pot);
            let st = &vs_check[(nv + 1) * i..(nv + 1) * (i + 1)];
            check_values[0] = -sd;
            let mut hero_value = st[0] * sd;
            for (m, &size) in self.villain_sizes.iter().enumerate() {
                let cu = call_utility(eq, self.pot, size);
                let called = hero_call[2 * m + 1] * cu;
                check_values[m + 1] = -called;
                hero_value += st[m + 1] * called;
                call_values[m] += p * st[m + 1] * cu;
                call_reach[m] += p * st[m + 1];
            }
            root_values[check] += p * hero_value;

            let reach = root[check] * p;
            table.accumulate_regret(VS_CHECK, i, check_values, -hero_value, reach);
            table.accumulate_strategy(VS_CHECK, i, st, reach * average_weight);
        }

        // Hero facing a donk bet; chance and villain reach are already folded
        // into the accumulated values.
        for m in 0..nv {
            let st = &hero_call[2 * m..2 * m + 2];
            let node = st[1] * call_values[m];
            table.accumulate_regret(HERO_CALL, m, &[0.0, call_values[m]], node, 1.0);
            table.accumulate_strategy(HERO_CALL, m, st, root[check] * call_reach[m] * average_weight);
        }

        let node: f64 = root.iter().zip(root_values.iter()).map(|(s, v)| s * v).sum();
        table.accumulate_regret(ROOT, 0, root_values, node, 1.0);
        table.accumulate_strategy(ROOT, 0, root, average_weight);
    }

    pub fn average_profile(&self, table: &RegretTable) -> AverageProfile {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        let n = self.infosets;

        let mut hero_root = vec![0.0; nh + 1];
        let uniform_root = vec![1.0 / (nh + 1) as f64; nh + 1];
        table.average_strategy(ROOT, 0, &uniform_root, &mut hero_root);

        let mut pair = [0.0; 2];
        let hero_call = (0..nv)
            .map(|m| {
                table.average_strategy(HERO_CALL, m, &[0.0, 1.0], &mut pair);
                pair[1]
            })
            .collect();

        let villain_call = (0..nh * n)
            .map(|h| {
                let mut current = [0.0; 2];
                table.current_strategy(VS_BET, h, &mut current);
                table.average_strategy(VS_BET, h, &current, &mut pair);
                pair[1]
            })
            .collect();

        let mut villain_after_check = vec![0.0; (nv + 1) * n];
        let mut current = vec![0.0; nv + 1];
        for i in 0..n {
            table.current_strategy(VS_CHECK, i, &mut current);
            table.average_strategy(VS_CHECK, i, &current, &mut villain_after_check[(nv + 1) * i..]);
        }

        AverageProfile {
            hero_root,
            hero_call,
            villain_call,
            villain_after_check,
        }
    }

    /// Hero's bet frequencies normalized over the bet actions only, or uniform
    /// when hero never bets.
    fn bet_mix(&self, profile: &AverageProfile) -> Vec<f64> {
        let nh = self.hero_sizes.len();
        let total: f64 = profile.hero_root[..nh].iter().sum();
        if total > 1e-12 {
            profile.hero_root[..nh].iter().map(|f| f / total).collect()
        } else {
            vec![1.0 / nh as f64; nh]
        }
    }

    /// Villain call frequency of one info set against hero's bet mix.
    pub fn infoset_call(&self, profile: &AverageProfile, infoset: usize) -> f64 {
        self.bet_mix(profile)
            .iter()
            .enumerate()
            .map(|(j, w)| w * profile.villain_call[j * self.infosets + infoset])
            .sum()
    }

    /// Villain probability of betting after a check, any size.
    pub fn infoset_bet_after_check(&self, profile: &AverageProfile, infoset: usize) -> f64 {
        let stride = self.villain_sizes.len() + 1;
        1.0 - profile.villain_after_check[stride * infoset]
    }

    pub fn evaluate(&self, profile: &AverageProfile, buckets: &[Sample]) -> ProfileValue {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        let n = self.infosets;

        let mut ev_bet_by_size = vec![0.0; nh];
        let mut ev_check = 0.0;
        let mut villain_call = 0.0;
        let mut villain_bet_after_check = 0.0;

        for s in buckets {
            let (i, eq, p) = (s.infoset, s.equity, s.probability);
            for (j, &size) in self.hero_sizes.iter().enumerate() {
                let c = profile.villain_call[j * n + i];
                ev_bet_by_size[j] += p * ((1.0 - c) * self.pot + c * call_utility(eq, self.pot, size));
            }
            let d = &profile.villain_after_check[(nv + 1) * i..(nv + 1) * (i + 1)];
            let mut check_value = d[0] * showdown_utility(eq, self.pot);
            for (m, &size) in self.villain_sizes.iter().enumerate() {
                check_value += d[m + 1] * profile.hero_call[m] * call_utility(eq, self.pot, size);
            }
            ev_check += p * check_value;
            villain_call += p * self.infoset_call(profile, i);
            villain_bet_after_check += p * (1.0 - d[0]);
        }

        let mix = self.bet_mix(profile);
        let ev_bet = mix.iter().zip(&ev_bet_by_size).map(|(w, v)| w * v).sum();
        let hero_utility = profile.hero_root[..nh]
            .iter()
            .zip(&ev_bet_by_size)
            .map(|(f, v)| f * v)
            .sum::<f64>()
            + profile.hero_root[self.check_action()] * ev_check;

        ProfileValue {
            ev_bet_by_size,
            ev_bet,
            ev_check,
            hero_utility,
            villain_call,
            villain_bet_after_check,
        }
    }

    /// Half the gap between hero's best response to the villain's average
    /// strategy and the value the villain holds hero to with a best response
    /// of their own. Zero at equilibrium.
    pub fn exploitability(&self, profile: &AverageProfile, buckets: &[Sample]) -> f64 {
        let nh = self.hero_sizes.len();
        let nv = self.villain_sizes.len();
        let n = self.infosets;
        let pot = self.pot;

        // Hero best response
        let mut bet_values = vec![0.0; nh];
        let mut check_showdown = 0.0;
        let mut donk_call_values = vec![0.0; nv];
        for s in buckets {
            let (i, eq, p) = (s.infoset, s.equity, s.probability);
            for (j, &size) in self.hero_sizes.iter().enumerate() {
                let c = profile.villain_call[j * n + i];
                bet_values[j] += p * ((1.0 - c) * pot + c * call_utility(eq, pot, size));
            }
            let d = &profile.villain_after_check[(nv + 1) * i..(nv + 1) * (i + 1)];
            check_showdown += p * d[0] * showdown_utility(eq, pot);
            for (m, &size) in self.villain_sizes.iter().enumerate() {
                donk_call_values[m] += p * d[m + 1] * call_utility(eq, pot, size);
            }
        }
        let best_bet = bet_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let best_check = check_showdown + donk_call_values.iter().map(|v| v.max(0.0)).sum::<f64>();
        let hero_best = best_bet.max(best_check);

        // Villain best response
        let check = self.check_action();
        let mut villain_best = 0.0;
        for s in buckets {
            let (i, eq, p) = (s.infoset, s.equity, s.probability);
            let mut value = 0.0;
            for (j, &size) in self.hero_sizes.iter().enumerate() {
                value += profile.hero_root[j] * pot.min(call_utility(eq, pot, size));
            }
            let mut after_check = showdown_utility(eq, pot);
            for (m, &size) in self.villain_sizes.iter().enumerate() {
                after_check = after_check.min(profile.hero_call[m] * call_utility(eq, pot, size));
            }
            value += profile.hero_root[check] * after_check;
            villain_best += p * value;
        }

        ((hero_best - villain_best) / 2.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_buckets() -> Vec<Sample> {
        vec![
            Sample { infoset: 0, equity: 0.2, probability: 0.5 },
            Sample { infoset: 1, equity: 0.9, probability: 0.5 },
        ]
    }

    #[test]
    fn call_utility_matches_pot_math() {
        assert_relative_eq!(call_utility(0.5, 100.0, 50.0), 50.0);
        assert_relative_eq!(call_utility(0.25, 100.0, 100.0), -25.0);
        assert_relative_eq!(call_utility(0.4, 100.0, 0.0), 40.0);
    }

    #[test]
    fn strategies_stay_normalized() {
        let game = CfrGame::single(100.0, 75.0, 2);
        let mut table = game.table(RegretRule::Signed);
        let mut scratch = game.scratch();
        let buckets = two_buckets();
        for _ in 0..2_000 {
            game.iterate(&mut table, &buckets, 1.0, &mut scratch);
        }
        let profile = game.average_profile(&table);
        assert_relative_eq!(profile.hero_root.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        for &c in profile.villain_call.iter().chain(&profile.hero_call) {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn villain_folds_drawing_dead() {
        // Hero always wins: villain should never call a bet
        let game = CfrGame::single(100.0, 100.0, 1);
        let buckets = [Sample { infoset: 0, equity: 1.0, probability: 1.0 }];
        let mut table = game.table(RegretRule::Signed);
        let mut scratch = game.scratch();
        for _ in 0..5_000 {
            game.iterate(&mut table, &buckets, 1.0, &mut scratch);
        }
        let profile = game.average_profile(&table);
        assert!(profile.villain_call[0] < 0.05);
        assert!(game.exploitability(&profile, &buckets) < 2.0);
    }

    #[test]
    fn exploitability_shrinks_with_iterations() {
        let game = CfrGame::single(100.0, 75.0, 2);
        let buckets = two_buckets();
        let mut table = game.table(RegretRule::Floored);
        let mut scratch = game.scratch();
        for t in 1..=200 {
            game.iterate(&mut table, &buckets, t as f64, &mut scratch);
        }
        let early = game.exploitability(&game.average_profile(&table), &buckets);
        for t in 201..=5_000 {
            game.iterate(&mut table, &buckets, t as f64, &mut scratch);
        }
        let late = game.exploitability(&game.average_profile(&table), &buckets);
        assert!(late < 1.0, "exploitability {} after 5000 iterations", late);
        assert!(early.is_finite());
    }
}
