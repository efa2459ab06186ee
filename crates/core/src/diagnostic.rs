//! Structured diagnostics for grid invariant and capacity violations.
//!
//! The grid never fails an action. Anything it cannot apply cleanly is turned
//! into a [`GridDiagnostic`], echoed to stderr when it is an error, and kept
//! in a bounded log the caller can inspect or drain.

use std::collections::VecDeque;

use crate::types::GridCoords;

/// Number of diagnostics retained before the oldest are dropped.
pub const DIAGNOSTIC_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Expected edge case (e.g. content placed above the tower).
    Warning,
    /// Logic inconsistency; the offending part of the action was skipped.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridDiagnostic {
    ClearEmptyCell { at: GridCoords },
    MoveFromEmpty { from: GridCoords },
    MoveIntoOccupied { to: GridCoords },
    MoveNotVertical { from: GridCoords, to: GridCoords },
    OutOfRange { at: GridCoords },
    PlacedAboveTop { at: GridCoords },
    PlaceOntoOccupied { at: GridCoords },
    ColumnFull { column: i32 },
    ColumnOutOfRange { column: i32 },
}

impl GridDiagnostic {
    pub fn code(self) -> &'static str {
        match self {
            GridDiagnostic::ClearEmptyCell { .. } => "clear_empty_cell",
            GridDiagnostic::MoveFromEmpty { .. } => "move_from_empty",
            GridDiagnostic::MoveIntoOccupied { .. } => "move_into_occupied",
            GridDiagnostic::MoveNotVertical { .. } => "move_not_vertical",
            GridDiagnostic::OutOfRange { .. } => "out_of_range",
            GridDiagnostic::PlacedAboveTop { .. } => "placed_above_top",
            GridDiagnostic::PlaceOntoOccupied { .. } => "place_onto_occupied",
            GridDiagnostic::ColumnFull { .. } => "column_full",
            GridDiagnostic::ColumnOutOfRange { .. } => "column_out_of_range",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            GridDiagnostic::PlacedAboveTop { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn message(self) -> String {
        match self {
            GridDiagnostic::ClearEmptyCell { at } => format!("clear targets empty cell {}", at),
            GridDiagnostic::MoveFromEmpty { from } => format!("move source {} is empty", from),
            GridDiagnostic::MoveIntoOccupied { to } => {
                format!("move destination {} is occupied", to)
            }
            GridDiagnostic::MoveNotVertical { from, to } => {
                format!("move {} -> {} is not vertical", from, to)
            }
            GridDiagnostic::OutOfRange { at } => format!("coordinates {} are out of range", at),
            GridDiagnostic::PlacedAboveTop { at } => {
                format!("placement cell {} is above the top row; dropped", at)
            }
            GridDiagnostic::PlaceOntoOccupied { at } => {
                format!("placement cell {} is already occupied; kept existing block", at)
            }
            GridDiagnostic::ColumnFull { column } => {
                format!("push-up into full column {} ignored", column)
            }
            GridDiagnostic::ColumnOutOfRange { column } => {
                format!("push-up column {} is out of range", column)
            }
        }
    }
}

impl std::fmt::Display for GridDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Bounded diagnostic log owned by a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticLog {
    entries: VecDeque<GridDiagnostic>,
    error_count: u64,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `diagnostic`; errors are also printed to stderr.
    pub fn report(&mut self, diagnostic: GridDiagnostic) {
        if diagnostic.severity() == Severity::Error {
            self.error_count += 1;
            eprintln!("[Grid] error {}", diagnostic);
        }
        if self.entries.len() == DIAGNOSTIC_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridDiagnostic> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Errors reported over the log's lifetime, including dropped ones.
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn drain(&mut self) -> Vec<GridDiagnostic> {
        self.entries.drain(..).collect()
    }
}
