//! Presentation-side grid mirror.
//!
//! A view layer keyed by grid position, rebuilt from the action stream
//! alone. It follows the grid's rules for the actions a healthy stream
//! contains and skips the same invalid ones, so after any stream the mirror
//! and the authoritative grid hold the same blocks.

use tower_cascade_core::{ActionConsumer, Grid};
use tower_cascade_types::{BlockType, CellMove, ColumnPush, CoordMap, GridAction, GridCoords, GridRules, Shape};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockMirror {
    columns: i32,
    rows: i32,
    wrap_sides_on_move: bool,
    blocks: CoordMap<BlockType>,
}

impl BlockMirror {
    pub fn new(columns: u16, rows: u16, rules: GridRules) -> Self {
        Self {
            columns: columns.max(1) as i32,
            rows: rows.max(1) as i32,
            wrap_sides_on_move: rules.wrap_sides_on_move,
            blocks: CoordMap::new(),
        }
    }

    /// Start from a level layout.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut mirror = Self::new(grid.columns() as u16, grid.rows() as u16, *grid.rules());
        for row in 0..mirror.rows {
            for column in 0..mirror.columns {
                let at = GridCoords::new(row, column);
                if let Some(block) = grid.get(at).filter(|b| b.is_occupied()) {
                    mirror.blocks.insert(at, block);
                }
            }
        }
        mirror
    }

    fn in_range(&self, at: GridCoords) -> bool {
        at.row >= 0 && at.row < self.rows && at.column >= 0 && at.column < self.columns
    }

    pub fn get(&self, at: GridCoords) -> Option<BlockType> {
        self.blocks.get(at).copied()
    }

    pub fn blocks(&self) -> &CoordMap<BlockType> {
        &self.blocks
    }

    /// Dense row-major cells, comparable with [`Grid::cells`].
    pub fn to_cells(&self) -> Vec<BlockType> {
        let mut cells = vec![BlockType::NONE; (self.columns * self.rows) as usize];
        for (at, block) in self.blocks.iter() {
            cells[(at.row * self.columns + at.column) as usize] = *block;
        }
        cells
    }

    fn place(&mut self, anchor: GridCoords, shape: &Shape) {
        for (offset, block) in shape.iter() {
            if block.is_none() {
                continue;
            }
            let Some(mut at) = anchor.checked_add(offset) else {
                continue;
            };
            if self.wrap_sides_on_move {
                at = at.wrap_columns(self.columns);
            }
            if self.in_range(at) && !self.blocks.contains(at) {
                self.blocks.insert(at, *block);
            }
        }
    }

    fn push_up(&mut self, ColumnPush { column, block }: ColumnPush) {
        if column < 0 || column >= self.columns {
            return;
        }
        if self.blocks.contains(GridCoords::new(self.rows - 1, column)) {
            return;
        }
        let lifted: Vec<(GridCoords, BlockType)> = self
            .blocks
            .iter()
            .filter(|(at, _)| at.column == column)
            .map(|(at, b)| (at, *b))
            .collect();
        self.blocks.retain(|at, _| at.column != column);
        for (at, b) in lifted {
            self.blocks.insert(at.above(), b);
        }
        if block.is_occupied() {
            self.blocks.insert(GridCoords::new(0, column), block);
        }
    }
}

impl ActionConsumer for BlockMirror {
    fn apply_actions(&mut self, batch: &[GridAction]) {
        for action in batch {
            match action {
                GridAction::Place { coords, shape } => self.place(*coords, shape),
                GridAction::ClearMatched { coords, .. } => {
                    for at in coords {
                        self.blocks.remove(*at);
                    }
                }
                GridAction::MoveCells { moves } => {
                    for &CellMove { from, to } in moves {
                        if from.column != to.column || !self.in_range(to) || self.blocks.contains(to) {
                            continue;
                        }
                        if let Some(block) = self.blocks.remove(from) {
                            self.blocks.insert(to, block);
                        }
                    }
                }
                GridAction::PushUpCells { pushes } => {
                    for push in pushes {
                        self.push_up(*push);
                    }
                }
                GridAction::SequenceFinished => {}
            }
        }
    }
}
