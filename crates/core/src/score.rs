//! Score accumulator - cascade scoring driven by the action stream
//!
//! The accumulator never looks at the grid. It sees the same batches as
//! every other consumer and keeps integer totals only:
//!
//! | Event | Effect |
//! |-------|--------|
//! | `ClearMatched` | `total_matched += distinct cells`, effective count added to the open pass |
//! | end of a batch with a clear | pass closes: `score += pass_cleared * (cascade_count + 1)`, `cascade_count += 1` |
//! | `SequenceFinished` | open pass closes, [`CascadeBonus`] recorded, `cascade_count = 0` |
//!
//! A k-pass cascade therefore scores `Σ cleared_i * i`.

use serde::{Deserialize, Serialize};

use crate::pipeline::{merge_clears, ActionConsumer};
use crate::types::{GridAction, GridRules, MatchAxis, MatchedRun};

/// Effective cleared count for one run.
///
/// A rule-triggered run of `n >= L` cells counts as the `n - L + 1`
/// overlapping `L`-matches it contains, `L * (n - L + 1)`. Special clears and
/// runs on disabled axes count their cells.
///
/// ```
/// use tower_cascade_core::score::effective_cleared;
/// use tower_cascade_core::types::{GridRules, MatchAxis, MatchedRun};
///
/// let rules = GridRules::default();
/// let run = |axis, length| MatchedRun { axis, length };
/// assert_eq!(effective_cleared(&run(MatchAxis::Horizontal, 3), &rules), 3);
/// assert_eq!(effective_cleared(&run(MatchAxis::Horizontal, 5), &rules), 9);
/// assert_eq!(effective_cleared(&run(MatchAxis::Special, 5), &rules), 5);
/// ```
pub fn effective_cleared(run: &MatchedRun, rules: &GridRules) -> u64 {
    let length = run.length as u64;
    let min = rules.min_length(run.axis) as u64;
    if run.axis == MatchAxis::Special || min == 0 || length < min {
        return length;
    }
    min.saturating_mul(length - min + 1)
}

/// Bonus for one closed pass.
pub fn cascade_bonus(sequence_cleared: u64, cascade_count: u32) -> u64 {
    sequence_cleared.saturating_mul(cascade_count as u64 + 1)
}

/// Summary of one finished top-level resolution that cleared something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CascadeBonus {
    pub passes: u32,
    pub cleared: u64,
    pub bonus: u64,
}

/// Plain-data running totals; what a save file would hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub total_matched: u64,
    pub total_cleared: u64,
    /// Effective count of the pass still open.
    pub sequence_cleared: u64,
    /// Passes closed so far in the current resolution.
    pub cascade_count: u32,
    pub last_bonus: Option<CascadeBonus>,
    #[serde(default)]
    pub resolution_cleared: u64,
    #[serde(default)]
    pub resolution_bonus: u64,
}

#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    rules: GridRules,
    state: ScoreState,
    sequence_open: bool,
}

impl ScoreAccumulator {
    pub fn new(rules: GridRules) -> Self {
        Self {
            rules,
            state: ScoreState::default(),
            sequence_open: false,
        }
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn cascade_count(&self) -> u32 {
        self.state.cascade_count
    }

    pub fn last_bonus(&self) -> Option<CascadeBonus> {
        self.state.last_bonus
    }

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    /// Replace the totals, e.g. when resuming a saved level.
    pub fn restore(&mut self, state: ScoreState) {
        self.sequence_open = state.sequence_cleared > 0;
        self.state = state;
    }

    fn record_clear(&mut self, distinct: usize, runs: &[MatchedRun]) {
        let effective = runs
            .iter()
            .map(|run| effective_cleared(run, &self.rules))
            .fold(0u64, u64::saturating_add);
        let s = &mut self.state;
        s.total_matched = s.total_matched.saturating_add(distinct as u64);
        s.total_cleared = s.total_cleared.saturating_add(effective);
        s.sequence_cleared = s.sequence_cleared.saturating_add(effective);
        self.sequence_open = true;
    }

    fn close_sequence(&mut self) {
        if !self.sequence_open {
            return;
        }
        let s = &mut self.state;
        let bonus = cascade_bonus(s.sequence_cleared, s.cascade_count);
        s.score = s.score.saturating_add(bonus);
        s.resolution_cleared = s.resolution_cleared.saturating_add(s.sequence_cleared);
        s.resolution_bonus = s.resolution_bonus.saturating_add(bonus);
        s.cascade_count = s.cascade_count.saturating_add(1);
        s.sequence_cleared = 0;
        self.sequence_open = false;
    }

    fn finish_resolution(&mut self) {
        self.close_sequence();
        let s = &mut self.state;
        if s.cascade_count > 0 {
            s.last_bonus = Some(CascadeBonus {
                passes: s.cascade_count,
                cleared: s.resolution_cleared,
                bonus: s.resolution_bonus,
            });
        }
        s.cascade_count = 0;
        s.resolution_cleared = 0;
        s.resolution_bonus = 0;
    }
}

impl ActionConsumer for ScoreAccumulator {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        for action in merge_clears(batch).iter() {
            match action {
                GridAction::ClearMatched { coords, runs } => self.record_clear(coords.len(), runs),
                GridAction::SequenceFinished => self.finish_resolution(),
                _ => {}
            }
        }
        self.close_sequence();
    }
}
