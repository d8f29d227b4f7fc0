//! Ordered collection of solver variants.
//!
//! Every registered solver sees the same context. Entries run in parallel and
//! fail independently: an error or a panic in one variant is recorded on its
//! own result and never stops the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::cfr::{cfr_plus, monte_carlo, multi_size, parallel, per_combo, vanilla};
use crate::cfr::{SolveFailure, SolveSummary, Solver, SolverContext};

struct Entry {
    id: String,
    label: String,
    priority: i32,
    solver: Box<dyn Solver>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    pub id: String,
    pub label: String,
    pub priority: i32,
    pub elapsed_ms: u64,
    pub summary: Option<SolveSummary>,
    pub error: Option<SolveFailure>,
}

impl SolverResult {
    pub fn is_ok(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryOutcome {
    /// Index into `results` of the highest-priority success.
    pub primary: Option<usize>,
    /// One result per entry, in registration order.
    pub results: Vec<SolverResult>,
}

impl RegistryOutcome {
    pub fn primary(&self) -> Option<&SolverResult> {
        self.primary.map(|i| &self.results[i])
    }
}

#[derive(Default)]
pub struct SolverRegistry {
    entries: Vec<Entry>,
}

impl SolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six built-in variants.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(parallel::ID, parallel::LABEL, parallel::PRIORITY, parallel::solve);
        registry.register(cfr_plus::ID, cfr_plus::LABEL, cfr_plus::PRIORITY, cfr_plus::solve);
        registry.register(monte_carlo::ID, monte_carlo::LABEL, monte_carlo::PRIORITY, monte_carlo::solve);
        registry.register(multi_size::ID, multi_size::LABEL, multi_size::PRIORITY, multi_size::solve);
        registry.register(per_combo::ID, per_combo::LABEL, per_combo::PRIORITY, per_combo::solve);
        registry.register(vanilla::ID, vanilla::LABEL, vanilla::PRIORITY, vanilla::solve);
        registry
    }

    /// Adds a solver. Registering an existing id replaces that entry in place.
    pub fn register<S>(&mut self, id: &str, label: &str, priority: i32, solver: S)
    where
        S: Solver + 'static,
    {
        let entry = Entry {
            id: id.to_string(),
            label: label.to_string(),
            priority,
            solver: Box::new(solver),
        };
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn solve_all(&self, ctx: &SolverContext<'_>) -> RegistryOutcome {
        let results: Vec<SolverResult> = self.entries.par_iter().map(|entry| run_entry(entry, ctx)).collect();

        // Strictly greater keeps the earliest registration on ties
        let mut primary: Option<usize> = None;
        for (idx, result) in results.iter().enumerate() {
            if !result.is_ok() {
                continue;
            }
            if primary.map_or(true, |p| result.priority > results[p].priority) {
                primary = Some(idx);
            }
        }

        match primary {
            Some(idx) => log::info!("primary solver: {}", results[idx].id),
            None => log::warn!("no solver produced a result"),
        }
        RegistryOutcome { primary, results }
    }
}

fn run_entry(entry: &Entry, ctx: &SolverContext<'_>) -> SolverResult {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| entry.solver.solve(ctx)))
        .unwrap_or_else(|payload| Err(SolveFailure::Panicked(panic_message(payload.as_ref()))));
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let (summary, error) = match outcome {
        Ok(summary) => (Some(summary), None),
        Err(failure) => {
            log::warn!("solver {} failed: {}", entry.id, failure);
            (None, Some(failure))
        }
    };
    SolverResult {
        id: entry.id.clone(),
        label: entry.label.clone(),
        priority: entry.priority,
        elapsed_ms,
        summary,
        error,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
