//! Bounded memo of showdown winners.
//!
//! Keys hold the exact hole-card mask of every seat plus the board mask, so a
//! hit always describes the identical showdown. The cache is pure scratch:
//! once full it stops admitting entries, and clearing it only costs time.

use std::collections::HashMap;

pub const MAX_PLAYERS: usize = 9;

/// Bit `i` set means seat `i` holds (a share of) the best hand.
pub type WinnerMask = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShowdownKey {
    hands: [u64; MAX_PLAYERS],
    board: u64,
}

impl ShowdownKey {
    pub fn new(hand_masks: &[u64], board_mask: u64) -> Self {
        let mut hands = [0u64; MAX_PLAYERS];
        hands[..hand_masks.len()].copy_from_slice(hand_masks);
        ShowdownKey {
            hands,
            board: board_mask,
        }
    }
}

#[derive(Debug)]
pub struct ShowdownCache {
    entries: HashMap<ShowdownKey, WinnerMask>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ShowdownCache {
    pub fn new(capacity: usize) -> Self {
        ShowdownCache {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &ShowdownKey) -> Option<WinnerMask> {
        let found = self.entries.get(key).copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Stores a result unless the cache is already at capacity.
    pub fn insert(&mut self, key: ShowdownKey, winners: WinnerMask) {
        if self.entries.len() < self.capacity {
            self.entries.insert(key, winners);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
