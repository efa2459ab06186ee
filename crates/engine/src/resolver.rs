//! Cascade resolver - serializes top-level batches and runs each to a
//! stable grid.
//!
//! Submissions get increasing [`RunId`]s. A run may only start once every
//! earlier run has finished (`finished_runs == id`), so at most one cascade
//! is ever in flight. Resolving a run is synchronous:
//!
//! 1. merge clears, apply the batch to the grid, hand it to `dispatch`
//! 2. evaluate the grid; a non-empty result is the next batch
//! 3. when evaluation is empty, apply and dispatch `[SequenceFinished]`
//!
//! An empty submission skips step 1 but still evaluates, so a grid with
//! pending matches or falls is resolved.
//!
//! The returned [`Resolution`] lists every applied batch, so pacing
//! (animation, network hand-off) happens outside the engine.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tower_cascade_core::{detector, merge_clears, Grid};
use tower_cascade_types::GridAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything one top-level run applied, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub run_id: RunId,
    /// Applied batches; the last one is always `[SequenceFinished]`.
    pub batches: Vec<Vec<GridAction>>,
    /// Batches that contained a clear.
    pub clear_passes: u32,
    /// A placement in this run dropped content above the top row.
    pub placed_above_top: bool,
}

impl Resolution {
    pub fn actions(&self) -> impl Iterator<Item = &GridAction> + '_ {
        self.batches.iter().flatten()
    }

    /// Distinct cells cleared across the run.
    pub fn cleared_cells(&self) -> usize {
        self.actions()
            .map(|action| match action {
                GridAction::ClearMatched { coords, .. } => coords.len(),
                _ => 0,
            })
            .sum()
    }
}

#[derive(Debug, Clone)]
struct PendingRun {
    id: RunId,
    batch: Vec<GridAction>,
}

#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    next_run_id: u64,
    finished_runs: u64,
    queue: VecDeque<PendingRun>,
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a top-level batch.
    pub fn submit(&mut self, batch: Vec<GridAction>) -> RunId {
        let id = RunId(self.next_run_id);
        self.next_run_id += 1;
        self.queue.push_back(PendingRun { id, batch });
        id
    }

    /// Whether `id` is the run allowed to start next.
    pub fn is_ready(&self, id: RunId) -> bool {
        self.finished_runs == id.0
    }

    pub fn is_finished(&self, id: RunId) -> bool {
        id.0 < self.finished_runs
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn finished_runs(&self) -> u64 {
        self.finished_runs
    }

    /// Resolve the next queued run to completion, if there is one.
    ///
    /// `dispatch` receives every applied batch right after the grid, in
    /// order; it feeds the other consumers.
    pub fn tick(&mut self, grid: &mut Grid, mut dispatch: impl FnMut(&[GridAction])) -> Option<Resolution> {
        let front = self.queue.front()?;
        if !self.is_ready(front.id) {
            return None;
        }
        let PendingRun { id, batch } = self.queue.pop_front()?;

        let mut batches = Vec::new();
        let mut clear_passes = 0u32;
        let mut placed_above_top = false;
        let mut batch = batch;

        loop {
            if !batch.is_empty() {
                let merged = merge_clears(&batch).into_owned();
                if merged.iter().any(GridAction::is_clear) {
                    clear_passes += 1;
                }
                let places = merged
                    .iter()
                    .any(|action| matches!(action, GridAction::Place { .. }));
                grid.apply_actions(&merged);
                if places && grid.placed_above_top() {
                    placed_above_top = true;
                }
                dispatch(&merged);
                batches.push(merged);
            }
            batch = detector::evaluate(grid);
            if batch.is_empty() {
                break;
            }
        }

        let marker = vec![GridAction::SequenceFinished];
        grid.apply_actions(&marker);
        dispatch(&marker);
        batches.push(marker);
        self.finished_runs += 1;

        Some(Resolution {
            run_id: id,
            batches,
            clear_passes,
            placed_above_top,
        })
    }
}
