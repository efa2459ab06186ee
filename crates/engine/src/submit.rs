//! Placement checks run before a placement is queued.
//!
//! Gameplay never fails once a batch is queued, so anything that cannot be
//! a meaningful placement is turned away here with a [`SubmitError`].

use tower_cascade_core::Grid;
use tower_cascade_types::{GridCoords, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    EmptyShape,
    NoConcreteBlock,
    AnchorOutOfRange,
}

impl SubmitError {
    pub fn code(self) -> &'static str {
        match self {
            SubmitError::EmptyShape | SubmitError::NoConcreteBlock => "invalid_shape",
            SubmitError::AnchorOutOfRange => "invalid_anchor",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SubmitError::EmptyShape => "placement shape has no blocks",
            SubmitError::NoConcreteBlock => "placement shape has no concrete block",
            SubmitError::AnchorOutOfRange => "placement anchor is outside the grid",
        }
    }
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for SubmitError {}

/// Reject placements that cannot be meaningful before they are queued.
///
/// Anchor rows up to and including `rows` are accepted: dropping content at
/// or above the top is how a placement reports an overflow. Higher anchors
/// are rejected. Columns outside the grid are only accepted when the rules
/// wrap placements.
pub fn validate_placement(grid: &Grid, coords: GridCoords, shape: &Shape) -> Result<(), SubmitError> {
    if shape.occupied_len() == 0 {
        return Err(SubmitError::EmptyShape);
    }
    if !shape.iter().any(|(_, block)| block.is_concrete()) {
        return Err(SubmitError::NoConcreteBlock);
    }
    let column_ok = grid.rules().wrap_sides_on_move
        || (coords.column >= 0 && (coords.column as usize) < grid.columns());
    if coords.row < 0 || coords.row as usize > grid.rows() || !column_ok {
        return Err(SubmitError::AnchorOutOfRange);
    }
    Ok(())
}
