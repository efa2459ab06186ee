//! Bonus push-up generation.
//!
//! Picks one block per non-full column for a `PushUpCells` action, trying
//! spawn types in a seeded shuffled order and keeping the first that would
//! not complete a run on its own. Columns are decided left to right, so each
//! choice sees the ones before it. This is a heuristic: a push can still
//! line up shifted rows against full columns, and that is accepted.

use crate::grid::Grid;
use crate::rng::SimpleRng;
use crate::types::{BlockType, ColumnPush, GridAction, MatchAxis, SpawnRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusActionGenerator {
    spawn: SpawnRange,
}

/// The grid as it would look after the push, with undecided row-0 cells
/// treated as run breakers.
struct Projection<'a> {
    grid: &'a Grid,
    shifted: Vec<bool>,
    decided: Vec<Option<BlockType>>,
}

impl Projection<'_> {
    fn block(&self, row: i32, column: i32) -> Option<BlockType> {
        if row < 0 || column < 0 || row >= self.grid.rows() as i32 {
            return None;
        }
        let c = column as usize;
        if c >= self.grid.columns() {
            return None;
        }
        let r = row as usize;
        if !self.shifted[c] {
            return Some(self.grid.block(r, c));
        }
        if r == 0 {
            return self.decided[c];
        }
        Some(self.grid.block(r - 1, c))
    }

    /// Cells matching `t` from `(0, column)` stepping by `(dr, dc)`,
    /// excluding the start, capped at `limit`.
    fn extend(&self, t: BlockType, column: i32, (dr, dc): (i32, i32), wrap: bool, limit: usize) -> usize {
        let columns = self.grid.columns() as i32;
        let mut count = 0;
        let (mut r, mut c) = (0, column);
        while count < limit {
            r += dr;
            c += dc;
            if wrap {
                c = c.rem_euclid(columns);
            }
            match self.block(r, c) {
                Some(b) if b == t || b.is_wild() => count += 1,
                _ => break,
            }
        }
        count
    }

    fn completes_run(&self, t: BlockType, column: usize) -> bool {
        let grid = self.grid;
        let rules = grid.rules();
        let c = column as i32;
        let unbounded = grid.rows().max(grid.columns());

        let v = rules.min_length(MatchAxis::Vertical) as usize;
        if v > 0 && 1 + self.extend(t, c, (1, 0), false, unbounded) >= v {
            return true;
        }

        let d = rules.min_length(MatchAxis::Diagonal) as usize;
        if d > 0 {
            for dc in [1, -1] {
                if 1 + self.extend(t, c, (1, dc), false, unbounded) >= d {
                    return true;
                }
            }
        }

        let h = rules.min_length(MatchAxis::Horizontal) as usize;
        if h > 0 {
            let wrap = rules.wrap_sides_on_match;
            let others = grid.columns() - 1;
            let left = self.extend(t, c, (0, -1), wrap, others);
            let right = self.extend(t, c, (0, 1), wrap, others - left);
            if 1 + left + right >= h {
                return true;
            }
        }
        false
    }
}

impl BonusActionGenerator {
    pub fn new(spawn: SpawnRange) -> Self {
        Self { spawn }
    }

    pub fn spawn(&self) -> SpawnRange {
        self.spawn
    }

    /// One push per non-full column, or `None` when every column is full.
    pub fn generate(&self, grid: &Grid, rng: &mut SimpleRng) -> Option<GridAction> {
        let columns = grid.columns();
        let shifted: Vec<bool> = (0..columns).map(|c| !grid.is_column_full(c)).collect();
        if !shifted.iter().any(|s| *s) {
            return None;
        }
        let mut projection = Projection {
            grid,
            shifted,
            decided: vec![None; columns],
        };

        let mut pushes = Vec::new();
        let mut candidates: Vec<BlockType> = self.spawn.types().collect();
        for column in 0..columns {
            if !projection.shifted[column] {
                continue;
            }
            rng.shuffle(&mut candidates);
            let block = candidates
                .iter()
                .copied()
                .find(|t| !projection.completes_run(*t, column))
                .unwrap_or_else(|| self.spawn.future_type());
            projection.decided[column] = Some(block);
            pushes.push(ColumnPush {
                column: column as i32,
                block,
            });
        }
        Some(GridAction::PushUpCells { pushes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::find_matches;
    use crate::types::GridRules;

    fn pushes(action: Option<GridAction>) -> Vec<ColumnPush> {
        match action {
            Some(GridAction::PushUpCells { pushes }) => pushes,
            other => panic!("expected push-up, got {:?}", other),
        }
    }

    #[test]
    fn test_skips_full_columns() {
        let grid = Grid::from_text(GridRules::default(), &["1__", "2__"], &[]).unwrap();
        let gen = BonusActionGenerator::new(SpawnRange::default());
        let got = pushes(gen.generate(&grid, &mut SimpleRng::new(5)));
        let cols: Vec<_> = got.iter().map(|p| p.column).collect();
        assert_eq!(cols, vec![1, 2]);
        assert!(got.iter().all(|p| SpawnRange::default().contains(p.block)));
    }

    #[test]
    fn test_all_full_yields_nothing() {
        let grid = Grid::from_text(GridRules::default(), &["12"], &[]).unwrap();
        let gen = BonusActionGenerator::new(SpawnRange::default());
        assert!(gen.generate(&grid, &mut SimpleRng::new(5)).is_none());
    }

    #[test]
    fn test_avoids_completing_vertical_run() {
        // Single spawn type 1 would stack onto two 1s; only the future type is safe.
        let spawn = SpawnRange::new(1, 1).unwrap();
        let grid = Grid::from_text(GridRules::default(), &["_", "1", "1"], &[]).unwrap();
        let got = pushes(BonusActionGenerator::new(spawn).generate(&grid, &mut SimpleRng::new(1)));
        assert_eq!(got[0].block, spawn.future_type());
    }

    #[test]
    fn test_avoids_horizontal_run_with_decided_neighbours() {
        let spawn = SpawnRange::new(1, 2).unwrap();
        let grid = Grid::new(3, 4, GridRules::default());
        for seed in 1..20 {
            let action = BonusActionGenerator::new(spawn)
                .generate(&grid, &mut SimpleRng::new(seed))
                .unwrap();
            let mut next = grid.clone();
            next.apply_actions(&[action]);
            assert!(find_matches(&next).is_empty(), "seed {}: {}", seed, next.render());
        }
    }

    #[test]
    fn test_wrap_neighbour_counts_on_row_zero() {
        let spawn = SpawnRange::new(1, 1).unwrap();
        let rules = GridRules {
            match_horizontal: 3,
            match_vertical: 0,
            wrap_sides_on_match: true,
            ..GridRules::DISABLED
        };
        // Columns 1 and 2 are full; 2 holds a 1 at row 0 that wraps next to column 0.
        let grid = Grid::from_text(rules, &["_21", "_31"], &[]).unwrap();
        let got = pushes(BonusActionGenerator::new(spawn).generate(&grid, &mut SimpleRng::new(3)));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].column, 0);
        // Joins column 2 across the seam, but two cells do not clear.
        assert_eq!(got[0].block, BlockType(1));
    }
}
