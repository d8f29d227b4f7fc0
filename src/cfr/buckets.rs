//! Equity bucketing of a villain range.
//!
//! Buckets are contiguous runs of the range sorted by hero equity, each
//! holding roughly the same share of range weight. Every combo in a bucket
//! shares the bucket's villain strategy.

use serde::Serialize;

use crate::range::VillainRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    /// Weighted average hero equity of the members.
    pub equity: f64,
    pub weight: f64,
    /// Share of total range weight; sums to 1 over all buckets.
    pub probability: f64,
    /// Indices into the range's combo list.
    #[serde(skip)]
    pub members: Vec<usize>,
}

/// `max(min, min(max, ceil(sqrt(n))))`, never more than `n`.
pub fn target_bucket_count(combos: usize, min_buckets: usize, max_buckets: usize) -> usize {
    let root = (combos as f64).sqrt().ceil() as usize;
    root.min(max_buckets).max(min_buckets).min(combos)
}

/// Splits the range into equity-sorted buckets of roughly equal weight.
pub fn equity_buckets(range: &VillainRange, min_buckets: usize, max_buckets: usize) -> Vec<Bucket> {
    let combos = range.combos();
    let mut order: Vec<usize> = (0..combos.len()).filter(|&i| combos[i].weight > 0.0).collect();
    let total: f64 = order.iter().map(|&i| combos[i].weight).sum();
    if order.is_empty() || total <= 0.0 {
        return Vec::new();
    }
    order.sort_by(|&a, &b| combos[a].hero_equity.total_cmp(&combos[b].hero_equity));

    let target = target_bucket_count(order.len(), min_buckets, max_buckets).max(1);
    let target_weight = total / target as f64;

    let mut buckets = Vec::with_capacity(target);
    let mut members = Vec::new();
    let mut weight = 0.0;
    for (pos, &idx) in order.iter().enumerate() {
        members.push(idx);
        weight += combos[idx].weight;
        let last = pos + 1 == order.len();
        if last || (weight >= target_weight && buckets.len() + 1 < target) {
            buckets.push(close_bucket(range, std::mem::take(&mut members), weight, total));
            weight = 0.0;
        }
    }
    log::debug!("{} combos grouped into {} buckets", order.len(), buckets.len());
    buckets
}

/// Ten fixed info sets by hero-equity decile; empty deciles are dropped.
/// The second value maps each decile to its bucket index, if any.
pub fn equity_deciles(range: &VillainRange) -> (Vec<Bucket>, [Option<usize>; 10]) {
    let combos = range.combos();
    let total = range.total_weight();
    let mut groups: [Vec<usize>; 10] = Default::default();
    for (idx, combo) in combos.iter().enumerate() {
        if combo.weight > 0.0 {
            groups[decile(combo.hero_equity)].push(idx);
        }
    }

    let mut buckets = Vec::new();
    let mut lookup = [None; 10];
    for (d, members) in groups.into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let weight = members.iter().map(|&i| combos[i].weight).sum();
        lookup[d] = Some(buckets.len());
        buckets.push(close_bucket(range, members, weight, total));
    }
    (buckets, lookup)
}

pub fn decile(equity: f64) -> usize {
    ((equity.clamp(0.0, 1.0) * 10.0) as usize).min(9)
}

/// Bucket index of every combo in the range, `usize::MAX` when unbucketed.
pub fn membership(buckets: &[Bucket], combos: usize) -> Vec<usize> {
    let mut of = vec![usize::MAX; combos];
    for (b, bucket) in buckets.iter().enumerate() {
        for &idx in &bucket.members {
            of[idx] = b;
        }
    }
    of
}

fn close_bucket(range: &VillainRange, members: Vec<usize>, weight: f64, total: f64) -> Bucket {
    let combos = range.combos();
    let equity = if weight > 0.0 {
        members
            .iter()
            .map(|&i| combos[i].weight * combos[i].hero_equity)
            .sum::<f64>()
            / weight
    } else {
        0.0
    };
    Bucket {
        equity,
        weight,
        probability: weight / total,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::remaining_cards;
    use crate::range::{build_range, Profile};

    fn annotated_range() -> VillainRange {
        let mut range = build_range(&remaining_cards(&[])[..20], Profile::Balanced);
        let n = range.len() as f64;
        let mut i = 0.0;
        range.assign_hero_equity(|_| {
            i += 1.0;
            i / n
        });
        range
    }

    #[test]
    fn bucket_count_follows_sqrt_rule() {
        assert_eq!(target_bucket_count(1326, 4, 18), 18);
        assert_eq!(target_bucket_count(100, 4, 18), 10);
        assert_eq!(target_bucket_count(5, 4, 18), 4);
        assert_eq!(target_bucket_count(2, 4, 18), 2);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let range = annotated_range();
        let buckets = equity_buckets(&range, 4, 18);
        let target = target_bucket_count(range.len(), 4, 18);
        assert!(buckets.len() <= target && buckets.len() + 2 >= target);
        assert!(buckets.windows(2).all(|w| w[0].equity <= w[1].equity));
        let total: f64 = buckets.iter().map(|b| b.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        let members: usize = buckets.iter().map(|b| b.members.len()).sum();
        assert_eq!(members, range.len());
    }

    #[test]
    fn deciles_cover_the_range() {
        let range = annotated_range();
        let (buckets, lookup) = equity_deciles(&range);
        assert_eq!(buckets.len(), 10);
        assert!(lookup.iter().all(Option::is_some));
        let total: f64 = buckets.iter().map(|b| b.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(decile(1.0), 9);
        assert_eq!(decile(0.55), 5);
    }
}
