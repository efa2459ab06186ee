use serde::{Deserialize, Serialize};

use crate::grid::{Grid, LayoutError};
use crate::types::{BlockType, GridCoords, GridRules};

/// Plain-data copy of a grid: extents, row-major block ids (row 0 first),
/// pinned coordinates and rules. Diagnostics and the above-top flag are
/// transient and not included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub columns: u16,
    pub rows: u16,
    pub cells: Vec<u8>,
    pub pinned: Vec<GridCoords>,
    pub rules: GridRules,
}

impl GridSnapshot {
    pub fn get(&self, at: GridCoords) -> Option<BlockType> {
        if at.row < 0 || at.column < 0 || at.column >= self.columns as i32 {
            return None;
        }
        let idx = at.row as usize * self.columns as usize + at.column as usize;
        self.cells.get(idx).copied().map(BlockType)
    }
}

impl From<&Grid> for GridSnapshot {
    fn from(grid: &Grid) -> Self {
        Self {
            columns: grid.columns() as u16,
            rows: grid.rows() as u16,
            cells: grid.cells().iter().map(|b| b.id()).collect(),
            pinned: grid.pinned().collect(),
            rules: *grid.rules(),
        }
    }
}

impl Grid {
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot::from(self)
    }

    /// Rebuild a grid. Fails on zero extents, a cell count that does not
    /// match, or pins outside the occupied cells.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Grid, LayoutError> {
        let cells = snapshot.cells.iter().copied().map(BlockType).collect();
        Grid::from_parts(
            snapshot.columns as usize,
            snapshot.rows as usize,
            snapshot.rules,
            cells,
            &snapshot.pinned,
        )
    }
}
