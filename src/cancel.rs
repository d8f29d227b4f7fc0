//! Supersession of in-flight computations.
//!
//! Interactive callers re-trigger equity or solver runs on every card change.
//! Each run takes a [`Ticket`] from a shared [`Generation`]; issuing a newer
//! ticket makes every older one stale, and long-running loops poll
//! [`Ticket::is_stale`] once per outer iteration and bail out with nothing
//! published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, invalidating every ticket issued before it.
    pub fn issue(&self) -> Ticket {
        let issued = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            current: Arc::clone(&self.current),
            issued,
        }
    }

    /// Invalidates every outstanding ticket without starting a new request.
    pub fn cancel_all(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    current: Arc<AtomicU64>,
    issued: u64,
}

impl Ticket {
    #[inline]
    pub fn is_stale(&self) -> bool {
        self.current.load(Ordering::Acquire) != self.issued
    }
}

/// True when an optional ticket exists and has been superseded.
#[inline]
pub fn is_cancelled(ticket: Option<&Ticket>) -> bool {
    ticket.is_some_and(Ticket::is_stale)
}
