//! Counting and enumerating k-card draws from a card pool.
//!
//! Enumeration walks index vectors in lexicographic order, so each k-subset
//! of the pool is produced exactly once and in a reproducible order. Sampling
//! draws without replacement through a partial Fisher-Yates shuffle of a
//! caller-owned scratch buffer.

use std::ops::ControlFlow;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::Card;

/// Number of ways to choose `k` of `n`, saturating at `u64::MAX`.
pub fn combination_count(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    let n = n as u64;
    let mut result: u64 = 1;
    for i in 1..=k {
        // result * (n - k + i) is always divisible by i at this point
        result = match result.checked_mul(n - k + i) {
            Some(v) => v / i,
            None => return u64::MAX,
        };
    }
    result
}

/// Calls `visit` once for every `k`-subset of `pool`.
///
/// The slice handed to `visit` is a reused buffer; copy it if it must
/// outlive the call. Returning `ControlFlow::Break` stops the walk early.
/// Returns the number of subsets visited.
pub fn for_each_combination<F>(pool: &[Card], k: usize, mut visit: F) -> u64
where
    F: FnMut(&[Card]) -> ControlFlow<()>,
{
    let n = pool.len();
    if k > n {
        return 0;
    }
    if k == 0 {
        let _ = visit(&[]);
        return 1;
    }

    let mut indices: Vec<usize> = (0..k).collect();
    let mut combo: Vec<Card> = pool[..k].to_vec();
    let mut visited = 1;
    if visit(&combo).is_break() {
        return visited;
    }

    loop {
        // Rightmost index that can still move right
        let mut i = k;
        while i > 0 && indices[i - 1] == n - k + i - 1 {
            i -= 1;
        }
        if i == 0 {
            return visited;
        }
        let i = i - 1;

        indices[i] += 1;
        combo[i] = pool[indices[i]];
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
            combo[j] = pool[indices[j]];
        }

        visited += 1;
        if visit(&combo).is_break() {
            return visited;
        }
    }
}

/// Draws `k` distinct cards uniformly from `scratch`, which is left permuted.
///
/// The drawn cards are the returned slice; cards not drawn stay in `scratch`
/// so the buffer can be reused for the next iteration without refilling.
pub fn draw_without_replacement<'a, R: Rng + ?Sized>(
    scratch: &'a mut [Card],
    k: usize,
    rng: &mut R,
) -> &'a [Card] {
    let k = k.min(scratch.len());
    let (drawn, _) = scratch.partial_shuffle(rng, k);
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::DECK;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn counts_match_known_values() {
        assert_eq!(combination_count(48, 5), 1_712_304);
        assert_eq!(combination_count(45, 2), 990);
        assert_eq!(combination_count(44, 1), 44);
        assert_eq!(combination_count(5, 0), 1);
        assert_eq!(combination_count(3, 4), 0);
    }

    #[test]
    fn enumeration_is_exhaustive_and_unique() {
        let pool = &DECK[..10];
        let mut seen = std::collections::HashSet::new();
        let visited = for_each_combination(pool, 3, |combo| {
            let mask: u64 = combo.iter().fold(0, |m, c| m | c.mask());
            assert_eq!(mask.count_ones(), 3);
            assert!(seen.insert(mask));
            ControlFlow::Continue(())
        });
        assert_eq!(visited, combination_count(10, 3));
        assert_eq!(seen.len() as u64, visited);
    }

    #[test]
    fn enumeration_can_stop_early() {
        let visited = for_each_combination(&DECK[..8], 2, |_| ControlFlow::Break(()));
        assert_eq!(visited, 1);
    }

    #[test]
    fn draws_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scratch = DECK[..20].to_vec();
        for _ in 0..200 {
            let drawn = draw_without_replacement(&mut scratch, 5, &mut rng);
            let mask: u64 = drawn.iter().fold(0, |m, c| m | c.mask());
            assert_eq!(mask.count_ones(), 5);
        }
        assert_eq!(scratch.len(), 20);
    }
}
