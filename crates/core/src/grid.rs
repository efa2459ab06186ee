//! Grid module - the authoritative cell store
//!
//! The grid is `columns` wide and `rows` tall, stored as a flat row-major
//! array with row 0 at the bottom. Coordinates are `(row, column)`.
//!
//! After level setup the grid changes only through [`Grid::apply_actions`],
//! so a recorded action stream replays to the identical state. Actions that
//! would break an invariant are skipped cell by cell and reported as
//! [`GridDiagnostic`]s instead of failing.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::diagnostic::{DiagnosticLog, GridDiagnostic};
use crate::pipeline::merge_clears;
use crate::types::{BlockType, CellMove, ColumnPush, GridAction, GridCoords, GridRules, Shape};

/// Why a grid could not be built from a layout or snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    ZeroSize,
    CellCountMismatch { expected: usize, actual: usize },
    OutOfRange { at: GridCoords },
    PinnedEmptyCell { at: GridCoords },
    UnknownGlyph { glyph: char },
}

impl LayoutError {
    pub fn code(self) -> &'static str {
        match self {
            LayoutError::ZeroSize => "zero_size",
            LayoutError::CellCountMismatch { .. } => "cell_count_mismatch",
            LayoutError::OutOfRange { .. } => "out_of_range",
            LayoutError::PinnedEmptyCell { .. } => "pinned_empty_cell",
            LayoutError::UnknownGlyph { .. } => "unknown_glyph",
        }
    }
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            LayoutError::ZeroSize => write!(f, "grid must have at least one row and column"),
            LayoutError::CellCountMismatch { expected, actual } => {
                write!(f, "expected {} cells, got {}", expected, actual)
            }
            LayoutError::OutOfRange { at } => write!(f, "layout cell {} is out of range", at),
            LayoutError::PinnedEmptyCell { at } => write!(f, "pinned cell {} is empty", at),
            LayoutError::UnknownGlyph { glyph } => write!(f, "unknown layout glyph {:?}", glyph),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Map a layout glyph to a block: `_`/`.` empty, `#` static, `*` wild,
/// `0-9`/`a-z` (case-insensitive) base-36 ids.
pub fn block_from_glyph(glyph: char) -> Option<BlockType> {
    match glyph {
        '_' | '.' => Some(BlockType::NONE),
        '#' => Some(BlockType::STATIC),
        '*' => Some(BlockType::WILD),
        _ => glyph
            .to_digit(36)
            .filter(|id| *id > 0)
            .map(|id| BlockType(id as u8)),
    }
}

/// Inverse of [`block_from_glyph`] (lowercase); `?` for ids above 35.
pub fn glyph_for_block(block: BlockType) -> char {
    match block {
        BlockType::NONE => '_',
        BlockType::STATIC => '#',
        BlockType::WILD => '*',
        BlockType(id) => std::char::from_digit(id as u32, 36).unwrap_or('?'),
    }
}

/// The game grid: flat row-major cell storage plus pinned coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    rules: GridRules,
    /// Row-major, `row * columns + column`, row 0 at the bottom.
    cells: Vec<BlockType>,
    pinned: BTreeSet<GridCoords>,
    /// Set when the most recent `Place` dropped content above the top.
    placed_above_top: bool,
    diagnostics: DiagnosticLog,
}

impl Grid {
    /// Create an empty grid. Zero extents are raised to 1.
    pub fn new(columns: u16, rows: u16, rules: GridRules) -> Self {
        let columns = columns.max(1) as usize;
        let rows = rows.max(1) as usize;
        Self {
            columns,
            rows,
            rules,
            cells: vec![BlockType::NONE; columns * rows],
            pinned: BTreeSet::new(),
            placed_above_top: false,
            diagnostics: DiagnosticLog::new(),
        }
    }

    /// Level setup: build a grid holding `layout` with `pinned` coordinates.
    pub fn from_layout(
        columns: u16,
        rows: u16,
        rules: GridRules,
        layout: &Shape,
        pinned: &[GridCoords],
    ) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::ZeroSize);
        }
        let mut grid = Grid::new(columns, rows, rules);
        for (at, block) in layout.iter() {
            let idx = grid.index(at).ok_or(LayoutError::OutOfRange { at })?;
            grid.cells[idx] = *block;
        }
        grid.pin_all(pinned)?;
        Ok(grid)
    }

    /// Level setup from text rows, **top row first**. See [`block_from_glyph`].
    ///
    /// ```
    /// use tower_cascade_core::Grid;
    /// use tower_cascade_types::{BlockType, GridCoords, GridRules};
    ///
    /// let grid = Grid::from_text(GridRules::default(), &["_1_", "12*"], &[]).unwrap();
    /// assert_eq!(grid.rows(), 2);
    /// assert_eq!(grid.get(GridCoords::new(1, 1)), Some(BlockType(1)));
    /// assert_eq!(grid.get(GridCoords::new(0, 2)), Some(BlockType::WILD));
    /// ```
    pub fn from_text(
        rules: GridRules,
        rows_top_first: &[&str],
        pinned: &[GridCoords],
    ) -> Result<Self, LayoutError> {
        let rows = rows_top_first.len();
        let columns = rows_top_first.first().map_or(0, |r| r.chars().count());
        if rows == 0 || columns == 0 {
            return Err(LayoutError::ZeroSize);
        }
        let mut grid = Grid::new(columns as u16, rows as u16, rules);
        for (i, line) in rows_top_first.iter().enumerate() {
            let row = rows - 1 - i;
            let glyphs: Vec<char> = line.chars().collect();
            if glyphs.len() != columns {
                return Err(LayoutError::CellCountMismatch {
                    expected: columns,
                    actual: glyphs.len(),
                });
            }
            for (column, glyph) in glyphs.into_iter().enumerate() {
                let block = block_from_glyph(glyph).ok_or(LayoutError::UnknownGlyph { glyph })?;
                grid.cells[row * columns + column] = block;
            }
        }
        grid.pin_all(pinned)?;
        Ok(grid)
    }

    pub(crate) fn from_parts(
        columns: usize,
        rows: usize,
        rules: GridRules,
        cells: Vec<BlockType>,
        pinned: &[GridCoords],
    ) -> Result<Self, LayoutError> {
        if columns == 0 || rows == 0 {
            return Err(LayoutError::ZeroSize);
        }
        if cells.len() != columns * rows {
            return Err(LayoutError::CellCountMismatch {
                expected: columns * rows,
                actual: cells.len(),
            });
        }
        let mut grid = Self {
            columns,
            rows,
            rules,
            cells,
            pinned: BTreeSet::new(),
            placed_above_top: false,
            diagnostics: DiagnosticLog::new(),
        };
        grid.pin_all(pinned)?;
        Ok(grid)
    }

    fn pin_all(&mut self, pinned: &[GridCoords]) -> Result<(), LayoutError> {
        for &at in pinned {
            match self.get(at) {
                None => return Err(LayoutError::OutOfRange { at }),
                Some(block) if block.is_none() => return Err(LayoutError::PinnedEmptyCell { at }),
                Some(_) => {
                    self.pinned.insert(at);
                }
            }
        }
        Ok(())
    }

    #[inline(always)]
    fn index(&self, at: GridCoords) -> Option<usize> {
        if at.row < 0 || at.column < 0 {
            return None;
        }
        let (row, column) = (at.row as usize, at.column as usize);
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(row * self.columns + column)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn rules(&self) -> &GridRules {
        &self.rules
    }

    /// Block at `at`, or `None` when out of range.
    pub fn get(&self, at: GridCoords) -> Option<BlockType> {
        self.index(at).map(|idx| self.cells[idx])
    }

    /// In-range lookup by unsigned position; callers guarantee the bounds.
    #[inline(always)]
    pub(crate) fn block(&self, row: usize, column: usize) -> BlockType {
        self.cells[row * self.columns + column]
    }

    pub fn is_occupied(&self, at: GridCoords) -> bool {
        matches!(self.get(at), Some(block) if block.is_occupied())
    }

    /// In range and empty.
    pub fn is_vacant(&self, at: GridCoords) -> bool {
        matches!(self.get(at), Some(block) if block.is_none())
    }

    pub fn is_pinned(&self, at: GridCoords) -> bool {
        self.pinned.contains(&at)
    }

    /// Pinned coordinates in row-major order.
    pub fn pinned(&self) -> impl Iterator<Item = GridCoords> + '_ {
        self.pinned.iter().copied()
    }

    pub fn cells(&self) -> &[BlockType] {
        &self.cells
    }

    pub fn row(&self, row: usize) -> Option<&[BlockType]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        Some(&self.cells[start..start + self.columns])
    }

    /// One past the highest occupied row of `column` (0 for an empty column).
    pub fn column_height(&self, column: usize) -> usize {
        if column >= self.columns {
            return 0;
        }
        (0..self.rows)
            .rev()
            .find(|&row| self.block(row, column).is_occupied())
            .map_or(0, |row| row + 1)
    }

    /// A column is full when its top cell is occupied.
    pub fn is_column_full(&self, column: usize) -> bool {
        column < self.columns && self.block(self.rows - 1, column).is_occupied()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|b| b.is_occupied()).count()
    }

    /// Whether the most recent `Place` dropped content above the top row. Interpreting this (e.g. as a loss) is up to the caller.
    pub fn placed_above_top(&self) -> bool {
        self.placed_above_top
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<GridDiagnostic> {
        self.diagnostics.drain()
    }

    /// Apply one batch. `ClearMatched` entries are merged first (see
    /// [`merge_clears`]); everything else is applied in order.
    pub fn apply_actions(&mut self, batch: &[GridAction]) {
        let merged: Cow<'_, [GridAction]> = merge_clears(batch);
        for action in merged.iter() {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: &GridAction) {
        match action {
            GridAction::Place { coords, shape } => self.place(*coords, shape),
            GridAction::ClearMatched { coords, .. } => self.clear(coords),
            GridAction::MoveCells { moves } => self.move_cells(moves),
            GridAction::PushUpCells { pushes } => self.push_up(pushes),
            GridAction::SequenceFinished => {}
        }
    }

    fn place(&mut self, anchor: GridCoords, shape: &Shape) {
        self.placed_above_top = false;
        for (offset, block) in shape.iter() {
            if block.is_none() {
                continue;
            }
            let Some(mut at) = anchor.checked_add(offset) else {
                self.diagnostics.report(GridDiagnostic::OutOfRange { at: anchor });
                continue;
            };
            if at.column < 0 || at.column >= self.columns as i32 {
                if self.rules.wrap_sides_on_move {
                    at = at.wrap_columns(self.columns as i32);
                } else {
                    self.diagnostics.report(GridDiagnostic::OutOfRange { at });
                    continue;
                }
            }
            if at.row >= self.rows as i32 {
                self.placed_above_top = true;
                self.diagnostics.report(GridDiagnostic::PlacedAboveTop { at });
                continue;
            }
            let Some(idx) = self.index(at) else {
                self.diagnostics.report(GridDiagnostic::OutOfRange { at });
                continue;
            };
            if self.cells[idx].is_occupied() {
                self.diagnostics
                    .report(GridDiagnostic::PlaceOntoOccupied { at });
                continue;
            }
            self.cells[idx] = *block;
        }
    }

    fn clear(&mut self, coords: &[GridCoords]) {
        for &at in coords {
            let Some(idx) = self.index(at) else {
                self.diagnostics.report(GridDiagnostic::OutOfRange { at });
                continue;
            };
            if self.cells[idx].is_none() {
                self.diagnostics.report(GridDiagnostic::ClearEmptyCell { at });
                continue;
            }
            self.cells[idx] = BlockType::NONE;
            self.pinned.remove(&at);
        }
    }

    fn move_cells(&mut self, moves: &[CellMove]) {
        for &CellMove { from, to } in moves {
            if from.column != to.column {
                self.diagnostics
                    .report(GridDiagnostic::MoveNotVertical { from, to });
                continue;
            }
            let (Some(src), Some(dst)) = (self.index(from), self.index(to)) else {
                let at = if self.index(from).is_none() { from } else { to };
                self.diagnostics.report(GridDiagnostic::OutOfRange { at });
                continue;
            };
            if self.cells[src].is_none() {
                self.diagnostics.report(GridDiagnostic::MoveFromEmpty { from });
                continue;
            }
            if self.cells[dst].is_occupied() {
                self.diagnostics
                    .report(GridDiagnostic::MoveIntoOccupied { to });
                continue;
            }
            self.cells[dst] = self.cells[src];
            self.cells[src] = BlockType::NONE;
            // Pins are dropped, not carried to `to`: a pinned coordinate loses its
            // pin once its content is displaced. The other reading (the pin
            // travels with the falling block) is recorded in DESIGN.md.
            self.pinned.remove(&from);
        }
    }

    fn push_up(&mut self, pushes: &[ColumnPush]) {
        for &ColumnPush { column, block } in pushes {
            if column < 0 || column >= self.columns as i32 {
                self.diagnostics
                    .report(GridDiagnostic::ColumnOutOfRange { column });
                continue;
            }
            let c = column as usize;
            if self.is_column_full(c) {
                self.diagnostics.report(GridDiagnostic::ColumnFull { column });
                continue;
            }
            for row in (1..self.rows).rev() {
                self.cells[row * self.columns + c] = self.cells[(row - 1) * self.columns + c];
            }
            self.cells[c] = block;

            // Pinned blocks ride up with their column.
            let lifted: Vec<GridCoords> = self
                .pinned
                .iter()
                .filter(|at| at.column == column)
                .copied()
                .collect();
            for at in &lifted {
                self.pinned.remove(at);
            }
            self.pinned.extend(lifted.into_iter().map(GridCoords::above));
        }
    }

    /// Text rendering, top row first, using the layout glyphs.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.columns + 1) * self.rows);
        for row in (0..self.rows).rev() {
            for column in 0..self.columns {
                out.push(glyph_for_block(self.block(row, column)));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchAxis, SpawnRange};

    fn red() -> BlockType {
        BlockType::concrete(1)
    }

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::new(4, 3, GridRules::default());
        assert_eq!(grid.index(GridCoords::new(0, 0)), Some(0));
        assert_eq!(grid.index(GridCoords::new(0, 3)), Some(3));
        assert_eq!(grid.index(GridCoords::new(1, 0)), Some(4));
        assert_eq!(grid.index(GridCoords::new(2, 3)), Some(11));
        assert_eq!(grid.index(GridCoords::new(-1, 0)), None);
        assert_eq!(grid.index(GridCoords::new(0, 4)), None);
        assert_eq!(grid.index(GridCoords::new(3, 0)), None);
    }

    #[test]
    fn test_zero_extents_are_raised() {
        let grid = Grid::new(0, 0, GridRules::default());
        assert_eq!(grid.columns(), 1);
        assert_eq!(grid.rows(), 1);
    }

    #[test]
    fn test_text_layout_roundtrips_through_render() {
        let rows = ["__1_", "#*21"];
        let grid = Grid::from_text(GridRules::default(), &rows, &[]).unwrap();
        assert_eq!(grid.render(), "__1_\n#*21\n");
    }

    #[test]
    fn test_text_layout_rejects_ragged_rows() {
        let err = Grid::from_text(GridRules::default(), &["111", "11"], &[]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::CellCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_pinning_an_empty_cell_is_rejected() {
        let err = Grid::from_text(GridRules::default(), &["_1"], &[GridCoords::new(0, 0)])
            .unwrap_err();
        assert_eq!(err.code(), "pinned_empty_cell");
    }

    #[test]
    fn test_place_wraps_columns_when_enabled() {
        let rules = GridRules {
            wrap_sides_on_move: true,
            ..GridRules::default()
        };
        let mut grid = Grid::new(4, 4, rules);
        grid.apply_actions(&[GridAction::Place {
            coords: GridCoords::new(0, 3),
            shape: Shape::horizontal_bar(&[red(), red()]),
        }]);
        assert_eq!(grid.get(GridCoords::new(0, 3)), Some(red()));
        assert_eq!(grid.get(GridCoords::new(0, 0)), Some(red()));
        assert!(grid.diagnostics().is_empty());
    }

    #[test]
    fn test_place_drops_columns_without_wrap() {
        let mut grid = Grid::new(4, 4, GridRules::default());
        grid.apply_actions(&[GridAction::Place {
            coords: GridCoords::new(0, 3),
            shape: Shape::horizontal_bar(&[red(), red()]),
        }]);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.diagnostics().error_count(), 1);
    }

    #[test]
    fn test_place_with_overflowing_offset_is_dropped() {
        let mut grid = Grid::new(3, 2, GridRules::default());
        grid.apply_actions(&[GridAction::Place {
            coords: GridCoords::new(i32::MAX, 0),
            shape: Shape::vertical_bar(&[red(), red()]),
        }]);
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.diagnostics().error_count(), 1);
        assert!(grid.diagnostics().iter().any(|d| d.code() == "out_of_range"));
    }

    #[test]
    fn test_place_above_top_is_a_warning() {
        let mut grid = Grid::new(3, 2, GridRules::default());
        grid.apply_actions(&[GridAction::Place {
            coords: GridCoords::new(1, 1),
            shape: Shape::vertical_bar(&[red(), red(), red()]),
        }]);
        assert!(grid.placed_above_top());
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.diagnostics().error_count(), 0);

        // Other actions leave the flag alone; the next placement resets it.
        grid.apply_actions(&[GridAction::SequenceFinished]);
        assert!(grid.placed_above_top());
        grid.apply_actions(&[GridAction::Place {
            coords: GridCoords::new(0, 0),
            shape: Shape::vertical_bar(&[red()]),
        }]);
        assert!(!grid.placed_above_top());
    }

    #[test]
    fn test_clear_removes_pin() {
        let at = GridCoords::new(0, 0);
        let mut grid = Grid::from_text(GridRules::default(), &["1"], &[at]).unwrap();
        assert!(grid.is_pinned(at));
        grid.apply_actions(&[GridAction::special_clear(vec![at])]);
        assert!(grid.is_vacant(at));
        assert!(!grid.is_pinned(at));
    }

    #[test]
    fn test_push_up_lifts_pinned_blocks() {
        let at = GridCoords::new(0, 1);
        let mut grid = Grid::from_text(GridRules::default(), &["___", "_2_"], &[at]).unwrap();
        grid.apply_actions(&[GridAction::PushUpCells {
            pushes: vec![ColumnPush {
                column: 1,
                block: SpawnRange::default().first(),
            }],
        }]);
        assert_eq!(grid.render(), "_2_\n_1_\n");
        assert!(grid.is_pinned(at.above()));
        assert!(!grid.is_pinned(at));
    }

    #[test]
    fn test_move_must_be_vertical() {
        let mut grid = Grid::from_text(GridRules::default(), &["1_", "__"], &[]).unwrap();
        let before = grid.cells().to_vec();
        grid.apply_actions(&[GridAction::MoveCells {
            moves: vec![CellMove {
                from: GridCoords::new(1, 0),
                to: GridCoords::new(0, 1),
            }],
        }]);
        assert_eq!(grid.cells(), &before[..]);
        let diags = grid.take_diagnostics();
        assert!(matches!(diags[0], GridDiagnostic::MoveNotVertical { .. }));
    }

    #[test]
    fn test_duplicate_clears_in_one_batch_clear_once() {
        let mut grid = Grid::from_text(GridRules::default(), &["111"], &[]).unwrap();
        let row: Vec<_> = (0..3).map(|c| GridCoords::new(0, c)).collect();
        grid.apply_actions(&[
            GridAction::clear_run(MatchAxis::Horizontal, row.clone()),
            GridAction::clear_run(MatchAxis::Horizontal, row),
        ]);
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.diagnostics().is_empty());
    }

    #[test]
    fn test_column_height_and_fullness() {
        let grid = Grid::from_text(GridRules::default(), &["1__", "1_2", "1__"], &[]).unwrap();
        assert_eq!(grid.column_height(0), 3);
        assert_eq!(grid.column_height(1), 0);
        assert_eq!(grid.column_height(2), 2);
        assert!(grid.is_column_full(0));
        assert!(!grid.is_column_full(2));
        assert!(!grid.is_column_full(7));
    }
}
