//! Action pipeline plumbing: the consumer trait and the clear-merge rule.
//!
//! Every consumer of the action stream (grid, score, presentation
//! listeners) receives each batch through [`ActionConsumer::apply_actions`],
//! in the same order.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::types::{GridAction, GridCoords};

/// A listener on the applied action stream.
pub trait ActionConsumer {
    /// Consume one applied batch to completion.
    fn apply_actions(&mut self, batch: &[GridAction]);
}

impl ActionConsumer for Grid {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        Grid::apply_actions(self, batch);
    }
}

impl<C: ActionConsumer + ?Sized> ActionConsumer for Box<C> {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        (**self).apply_actions(batch);
    }
}

fn has_duplicates(coords: &[GridCoords]) -> bool {
    let mut seen = BTreeSet::new();
    !coords.iter().all(|at| seen.insert(*at))
}

/// Merge every `ClearMatched` in `batch` into one clear of distinct
/// coordinates, placed where the first clear was. Runs are concatenated in
/// batch order; other actions keep their order.
///
/// Borrows the input when there is nothing to merge, so applying the rule
/// twice is free.
///
/// ```
/// use tower_cascade_core::merge_clears;
/// use tower_cascade_core::types::{GridAction, GridCoords, MatchAxis};
///
/// let a = GridCoords::new(0, 0);
/// let b = GridCoords::new(1, 0);
/// let batch = vec![
///     GridAction::clear_run(MatchAxis::Horizontal, vec![a, b]),
///     GridAction::clear_run(MatchAxis::Vertical, vec![b]),
/// ];
/// let merged = merge_clears(&batch);
/// assert_eq!(merged.len(), 1);
/// match &merged[0] {
///     GridAction::ClearMatched { coords, runs } => {
///         assert_eq!(coords, &vec![a, b]);
///         assert_eq!(runs.len(), 2);
///     }
///     _ => unreachable!(),
/// }
/// ```
pub fn merge_clears(batch: &[GridAction]) -> Cow<'_, [GridAction]> {
    let needs_merge = match batch.iter().filter(|a| a.is_clear()).count() {
        0 => false,
        1 => batch.iter().any(|action| match action {
            GridAction::ClearMatched { coords, .. } => has_duplicates(coords),
            _ => false,
        }),
        _ => true,
    };
    if !needs_merge {
        return Cow::Borrowed(batch);
    }

    let mut seen = BTreeSet::new();
    let mut coords = Vec::new();
    let mut runs = Vec::new();
    for action in batch {
        if let GridAction::ClearMatched {
            coords: targets,
            runs: from,
        } = action
        {
            coords.extend(targets.iter().copied().filter(|at| seen.insert(*at)));
            runs.extend_from_slice(from);
        }
    }

    let mut merged = Some(GridAction::ClearMatched { coords, runs });
    let mut out = Vec::with_capacity(batch.len());
    for action in batch {
        if action.is_clear() {
            if let Some(clear) = merged.take() {
                out.push(clear);
            }
        } else {
            out.push(action.clone());
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellMove, MatchAxis, MatchedRun};

    fn at(row: i32, column: i32) -> GridCoords {
        GridCoords::new(row, column)
    }

    #[test]
    fn test_batch_without_clears_is_borrowed() {
        let batch = vec![GridAction::SequenceFinished];
        assert!(matches!(merge_clears(&batch), Cow::Borrowed(_)));
    }

    #[test]
    fn test_single_distinct_clear_is_borrowed() {
        let batch = vec![GridAction::special_clear(vec![at(0, 0), at(0, 1)])];
        assert!(matches!(merge_clears(&batch), Cow::Borrowed(_)));
    }

    #[test]
    fn test_single_clear_with_repeats_is_deduplicated() {
        let batch = vec![GridAction::special_clear(vec![at(0, 0), at(0, 0)])];
        let merged = merge_clears(&batch);
        assert_eq!(
            merged[0],
            GridAction::ClearMatched {
                coords: vec![at(0, 0)],
                runs: vec![MatchedRun {
                    axis: MatchAxis::Special,
                    length: 2
                }],
            }
        );
    }

    #[test]
    fn test_merged_clear_takes_first_clear_position() {
        let fall = GridAction::MoveCells {
            moves: vec![CellMove {
                from: at(3, 2),
                to: at(2, 2),
            }],
        };
        let batch = vec![
            fall.clone(),
            GridAction::clear_run(MatchAxis::Horizontal, vec![at(0, 0), at(0, 1), at(0, 2)]),
            GridAction::SequenceFinished,
            GridAction::clear_run(MatchAxis::Vertical, vec![at(0, 2), at(1, 2), at(2, 2)]),
        ];
        let merged = merge_clears(&batch);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], fall);
        assert!(merged[1].is_clear());
        assert_eq!(merged[2], GridAction::SequenceFinished);
        if let GridAction::ClearMatched { coords, runs } = &merged[1] {
            assert_eq!(coords.len(), 5);
            assert_eq!(runs.len(), 2);
        }

        // Idempotent.
        let again = merge_clears(&merged);
        assert!(matches!(again, Cow::Borrowed(_)));
    }
}
