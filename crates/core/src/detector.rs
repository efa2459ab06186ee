//! Match detector - finds line matches, or gravity falls when there are none
//!
//! # Runs
//!
//! Each line (row, column or diagonal) is cut into maximal runs:
//!
//! - empty and static cells close the current run
//! - a wild cell extends the current run whatever its type
//! - a concrete cell extends the run if it has no type yet or the same type;
//!   a different type closes it and opens a new run that starts with the
//!   closed run's trailing wilds
//!
//! A run clears when it has a concrete anchor and reaches the axis minimum.
//!
//! # Output order
//!
//! | Pass | Order |
//! |------|-------|
//! | horizontal | rows bottom-up, left to right |
//! | vertical | columns left to right, bottom-up |
//! | diagonal `(1, 1)` | starts along column 0 top-down, then row 0 left to right |
//! | diagonal `(1, -1)` | starts along row 0 left to right, then the last column bottom-up |
//! | gravity | one `MoveCells`, column by column, bottom-up |
//!
//! Gravity is only computed when no run clears.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{BlockType, CellMove, GridAction, GridCoords, MatchAxis};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Run {
    anchor: Option<BlockType>,
    coords: Vec<GridCoords>,
    /// Wild cells at the end of `coords`.
    trailing_wild: usize,
}

impl Run {
    fn qualifies(&self, min: u8) -> bool {
        min > 0 && self.anchor.is_some() && self.coords.len() >= min as usize
    }

    fn leading_wild(&self, grid: &Grid) -> usize {
        self.coords
            .iter()
            .take_while(|at| grid.get(**at).is_some_and(BlockType::is_wild))
            .count()
    }

    fn trailing(&self) -> &[GridCoords] {
        &self.coords[self.coords.len() - self.trailing_wild..]
    }
}

/// Cut one line into maximal runs. Runs of only wild cells are kept so the
/// wrap pass can fold them into a neighbour.
fn scan_line(grid: &Grid, line: &[GridCoords]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current = Run::default();

    for &at in line {
        let block = grid.get(at).unwrap_or(BlockType::NONE);
        if !block.is_matchable() {
            if !current.coords.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if block.is_wild() {
            current.coords.push(at);
            current.trailing_wild += 1;
            continue;
        }
        match current.anchor {
            Some(anchor) if anchor != block => {
                let shared = current.trailing().to_vec();
                runs.push(std::mem::take(&mut current));
                current.coords = shared;
            }
            _ => {}
        }
        current.anchor = Some(block);
        current.coords.push(at);
        current.trailing_wild = 0;
    }
    if !current.coords.is_empty() {
        runs.push(current);
    }
    runs
}

/// Fold the run touching the last column into the run starting at column 0.
///
/// Compatible anchors become one run (emitted in the first run's slot).
/// Otherwise each side only borrows the other's wild cells at the seam.
fn wrap_row(grid: &Grid, row: i32, mut runs: Vec<Run>) -> Vec<Run> {
    let last_column = grid.columns() as i32 - 1;
    if runs.len() < 2 {
        return runs;
    }
    let starts_at_zero = runs[0].coords.first().map(|at| at.column) == Some(0);
    let ends_at_last = runs[runs.len() - 1].coords.last().map(|at| at.column) == Some(last_column);
    if !starts_at_zero || !ends_at_last {
        return runs;
    }
    debug_assert!(runs.iter().all(|r| r.coords.iter().all(|at| at.row == row)));

    let tail = runs.pop().unwrap_or_default();
    let head = &mut runs[0];
    let compatible = match (tail.anchor, head.anchor) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };

    if compatible {
        let mut coords = tail.coords;
        for at in head.coords.drain(..) {
            if !coords.contains(&at) {
                coords.push(at);
            }
        }
        head.anchor = tail.anchor.or(head.anchor);
        head.coords = coords;
        return runs;
    }

    let lead = head.leading_wild(grid);
    let mut head_coords = tail.trailing().to_vec();
    head_coords.extend_from_slice(&head.coords);
    let mut tail_coords = tail.coords.clone();
    tail_coords.extend_from_slice(&head.coords[..lead]);

    head.coords = head_coords;
    runs.push(Run {
        anchor: tail.anchor,
        coords: tail_coords,
        trailing_wild: tail.trailing_wild,
    });
    runs
}

fn emit(axis: MatchAxis, min: u8, runs: Vec<Run>, out: &mut Vec<GridAction>) {
    for run in runs {
        if run.qualifies(min) {
            out.push(GridAction::clear_run(axis, run.coords));
        }
    }
}

fn diagonal(grid: &Grid, start: GridCoords, step_column: i32) -> Vec<GridCoords> {
    let mut line = Vec::new();
    let mut at = start;
    while grid.get(at).is_some() {
        line.push(at);
        at = GridCoords::new(at.row + 1, at.column + step_column);
    }
    line
}

fn diagonal_starts(grid: &Grid, step_column: i32) -> Vec<GridCoords> {
    let rows = grid.rows() as i32;
    let columns = grid.columns() as i32;
    if step_column > 0 {
        (1..rows)
            .rev()
            .map(|row| GridCoords::new(row, 0))
            .chain((0..columns).map(|column| GridCoords::new(0, column)))
            .collect()
    } else {
        (0..columns)
            .map(|column| GridCoords::new(0, column))
            .chain((1..rows).map(|row| GridCoords::new(row, columns - 1)))
            .collect()
    }
}

/// Every qualifying run on the enabled axes, as one `ClearMatched` each.
pub fn find_matches(grid: &Grid) -> Vec<GridAction> {
    let rules = *grid.rules();
    let rows = grid.rows() as i32;
    let columns = grid.columns() as i32;
    let mut out = Vec::new();

    let mut axes: ArrayVec<MatchAxis, 3> = ArrayVec::new();
    for axis in [MatchAxis::Horizontal, MatchAxis::Vertical, MatchAxis::Diagonal] {
        if rules.min_length(axis) > 0 {
            axes.push(axis);
        }
    }

    for axis in axes {
        let min = rules.min_length(axis);
        match axis {
            MatchAxis::Horizontal => {
                for row in 0..rows {
                    let line: Vec<_> = (0..columns).map(|c| GridCoords::new(row, c)).collect();
                    let mut runs = scan_line(grid, &line);
                    if rules.wrap_sides_on_match {
                        runs = wrap_row(grid, row, runs);
                    }
                    emit(axis, min, runs, &mut out);
                }
            }
            MatchAxis::Vertical => {
                if rows < min as i32 {
                    continue;
                }
                for column in 0..columns {
                    let line: Vec<_> = (0..rows).map(|r| GridCoords::new(r, column)).collect();
                    emit(axis, min, scan_line(grid, &line), &mut out);
                }
            }
            MatchAxis::Diagonal => {
                for step in [1, -1] {
                    for start in diagonal_starts(grid, step) {
                        let line = diagonal(grid, start, step);
                        if line.len() < min as usize {
                            continue;
                        }
                        emit(axis, min, scan_line(grid, &line), &mut out);
                    }
                }
            }
            MatchAxis::Special => {}
        }
    }
    out
}

/// Falls for every occupied, non-static cell with empty cells below it,
/// counting down to the nearest static cell. `None` when nothing falls.
pub fn compute_gravity(grid: &Grid) -> Option<GridAction> {
    let mut moves = Vec::new();
    for column in 0..grid.columns() {
        let mut empties = 0usize;
        for row in 0..grid.rows() {
            let block = grid.block(row, column);
            if block.is_none() {
                empties += 1;
            } else if block.is_static() {
                empties = 0;
            } else if empties > 0 {
                moves.push(CellMove {
                    from: GridCoords::new(row as i32, column as i32),
                    to: GridCoords::new((row - empties) as i32, column as i32),
                });
            }
        }
    }
    if moves.is_empty() {
        None
    } else {
        Some(GridAction::MoveCells { moves })
    }
}

/// One detector pass: clears if any run qualifies, otherwise falls,
/// otherwise nothing.
pub fn evaluate(grid: &Grid) -> Vec<GridAction> {
    let matches = find_matches(grid);
    if !matches.is_empty() {
        return matches;
    }
    compute_gravity(grid).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridRules;

    fn rules(h: u8, v: u8, d: u8, wrap: bool) -> GridRules {
        GridRules {
            match_horizontal: h,
            match_vertical: v,
            match_diagonal: d,
            wrap_sides_on_match: wrap,
            wrap_sides_on_move: false,
        }
    }

    fn cleared(actions: &[GridAction]) -> Vec<Vec<GridCoords>> {
        actions
            .iter()
            .filter_map(|a| match a {
                GridAction::ClearMatched { coords, .. } => Some(coords.clone()),
                _ => None,
            })
            .collect()
    }

    fn row0(columns: &[i32]) -> Vec<GridCoords> {
        columns.iter().map(|c| GridCoords::new(0, *c)).collect()
    }

    #[test]
    fn test_trailing_wild_is_shared() {
        let grid = Grid::from_text(rules(3, 0, 0, false), &["11*22"], &[]).unwrap();
        let found = cleared(&find_matches(&grid));
        assert_eq!(found, vec![row0(&[0, 1, 2]), row0(&[2, 3, 4])]);
    }

    #[test]
    fn test_leading_wilds_join_first_anchor() {
        let grid = Grid::from_text(rules(3, 0, 0, false), &["**1_"], &[]).unwrap();
        assert_eq!(cleared(&find_matches(&grid)), vec![row0(&[0, 1, 2])]);
    }

    #[test]
    fn test_wrap_merges_compatible_ends() {
        let grid = Grid::from_text(rules(3, 0, 0, true), &["1_21"], &[]).unwrap();
        assert!(find_matches(&grid).is_empty());

        let grid = Grid::from_text(rules(3, 0, 0, true), &["1_11"], &[]).unwrap();
        assert_eq!(cleared(&find_matches(&grid)), vec![row0(&[2, 3, 0])]);
    }

    #[test]
    fn test_wrap_shares_wilds_across_seam() {
        // Cyclically the 1 in the last column continues into the wild at column 0.
        let grid = Grid::from_text(rules(3, 0, 0, true), &["*22_1"], &[]).unwrap();
        let found = cleared(&find_matches(&grid));
        assert_eq!(found, vec![row0(&[0, 1, 2])]);

        let grid = Grid::from_text(rules(3, 0, 0, true), &["*2_11"], &[]).unwrap();
        let found = cleared(&find_matches(&grid));
        assert_eq!(found, vec![row0(&[3, 4, 0])]);
    }

    #[test]
    fn test_vertical_and_diagonal_runs() {
        let grid = Grid::from_text(
            rules(0, 3, 3, false),
            &["2_3", "21_", "2_1"],
            &[],
        )
        .unwrap();
        let found = find_matches(&grid);
        assert_eq!(found.len(), 1, "{:?}", found);
        assert_eq!(
            cleared(&found)[0],
            vec![GridCoords::new(0, 0), GridCoords::new(1, 0), GridCoords::new(2, 0)]
        );

        let grid = Grid::from_text(
            rules(0, 0, 3, false),
            &["3_1", "_3_", "1_3"],
            &[],
        )
        .unwrap();
        let found = find_matches(&grid);
        assert_eq!(
            cleared(&found),
            vec![vec![GridCoords::new(0, 2), GridCoords::new(1, 1), GridCoords::new(2, 0)]]
        );
        assert!(matches!(
            &found[0],
            GridAction::ClearMatched { runs, .. } if runs[0].axis == MatchAxis::Diagonal
        ));
    }

    #[test]
    fn test_gravity_stops_at_static_floor() {
        let grid = Grid::from_text(rules(0, 0, 0, false), &["1", "_", "#", "_", "2"], &[])
            .unwrap();
        let moves = match compute_gravity(&grid) {
            Some(GridAction::MoveCells { moves }) => moves,
            other => panic!("expected moves, got {:?}", other),
        };
        assert_eq!(
            moves,
            vec![CellMove {
                from: GridCoords::new(4, 0),
                to: GridCoords::new(3, 0)
            }]
        );
    }

    #[test]
    fn test_matches_take_priority_over_falls() {
        let grid = Grid::from_text(rules(3, 0, 0, false), &["__1", "111"], &[]).unwrap();
        let actions = evaluate(&grid);
        assert_eq!(actions.len(), 1);
        assert!(actions[0].is_clear());
    }
}
