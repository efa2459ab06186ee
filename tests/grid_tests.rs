//! Grid tests - action application, pins and diagnostics

use tower_cascade::core::{Grid, GridDiagnostic, LayoutError, Severity};
use tower_cascade::types::{
    BlockType, CellMove, ColumnPush, CoordMap, GridAction, GridCoords, GridRules, MatchAxis, Shape,
};

fn at(row: i32, column: i32) -> GridCoords {
    GridCoords::new(row, column)
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new(6, 10, GridRules::default());
    assert_eq!(grid.columns(), 6);
    assert_eq!(grid.rows(), 10);
    assert_eq!(grid.occupied_count(), 0);
    assert_eq!(grid.get(at(9, 5)), Some(BlockType::NONE));
    assert_eq!(grid.get(at(10, 0)), None);
    assert_eq!(grid.get(at(0, -1)), None);
}

#[test]
fn test_from_layout() {
    let layout: CoordMap<BlockType> = [
        (at(0, 0), BlockType::STATIC),
        (at(0, 1), BlockType::concrete(2)),
        (at(1, 1), BlockType::WILD),
    ]
    .into_iter()
    .collect();
    let grid = Grid::from_layout(3, 3, GridRules::default(), &layout, &[at(0, 1)]).unwrap();
    assert_eq!(grid.render(), "___\n_*_\n#2_\n");
    assert!(grid.is_pinned(at(0, 1)));
    assert!(!grid.is_pinned(at(1, 1)));
}

#[test]
fn test_from_layout_errors() {
    let layout: CoordMap<BlockType> = [(at(3, 0), BlockType::concrete(1))].into_iter().collect();
    let err = Grid::from_layout(2, 3, GridRules::default(), &layout, &[]).unwrap_err();
    assert_eq!(err, LayoutError::OutOfRange { at: at(3, 0) });
    assert_eq!(
        Grid::from_layout(0, 3, GridRules::default(), &CoordMap::new(), &[]).unwrap_err(),
        LayoutError::ZeroSize
    );
    assert!(Grid::from_text(GridRules::default(), &["1?"], &[]).is_err());
}

#[test]
fn test_place_onto_occupied_keeps_existing() {
    let mut grid = Grid::from_text(GridRules::default(), &["__", "3_"], &[]).unwrap();
    grid.apply_actions(&[GridAction::Place {
        coords: at(0, 0),
        shape: Shape::vertical_bar(&[BlockType::concrete(1), BlockType::concrete(2)]),
    }]);
    assert_eq!(grid.render(), "2_\n3_\n");
    let diags = grid.take_diagnostics();
    assert_eq!(diags, vec![GridDiagnostic::PlaceOntoOccupied { at: at(0, 0) }]);
    assert!(grid.diagnostics().is_empty());
}

#[test]
fn test_place_skips_empty_shape_cells() {
    let mut grid = Grid::from_text(GridRules::default(), &["__", "3_"], &[]).unwrap();
    grid.apply_actions(&[GridAction::Place {
        coords: at(0, 0),
        shape: Shape::horizontal_bar(&[BlockType::NONE, BlockType::concrete(1)]),
    }]);
    assert_eq!(grid.render(), "__\n31\n");
    assert!(grid.diagnostics().is_empty());
}

#[test]
fn test_clear_empty_cell_is_logged() {
    let mut grid = Grid::from_text(GridRules::default(), &["1_"], &[]).unwrap();
    grid.apply_actions(&[GridAction::special_clear(vec![at(0, 0), at(0, 1)])]);
    assert_eq!(grid.occupied_count(), 0);
    let diag = grid.diagnostics().iter().next().copied().unwrap();
    assert_eq!(diag, GridDiagnostic::ClearEmptyCell { at: at(0, 1) });
    assert_eq!(diag.severity(), Severity::Error);
    assert_eq!(diag.code(), "clear_empty_cell");
}

#[test]
fn test_move_rules() {
    let mut grid = Grid::from_text(GridRules::DISABLED, &["1", "_", "2"], &[]).unwrap();
    grid.apply_actions(&[GridAction::MoveCells {
        moves: vec![
            // Into occupied: skipped.
            CellMove {
                from: at(2, 0),
                to: at(0, 0),
            },
            CellMove {
                from: at(2, 0),
                to: at(1, 0),
            },
            // Source now empty: skipped.
            CellMove {
                from: at(2, 0),
                to: at(1, 0),
            },
        ],
    }]);
    assert_eq!(grid.render(), "_\n1\n2\n");
    let codes: Vec<_> = grid.diagnostics().iter().map(|d| d.code()).collect();
    assert_eq!(codes, vec!["move_into_occupied", "move_from_empty"]);
}

#[test]
fn test_falling_pinned_block_loses_pin() {
    let pin = at(2, 0);
    let mut grid = Grid::from_text(GridRules::DISABLED, &["1", "_", "_"], &[pin]).unwrap();
    grid.apply_actions(&[GridAction::MoveCells {
        moves: vec![CellMove { from: pin, to: at(0, 0) }],
    }]);
    assert_eq!(grid.get(at(0, 0)), Some(BlockType::concrete(1)));
    assert!(!grid.is_pinned(pin));
    assert!(!grid.is_pinned(at(0, 0)));
}

#[test]
fn test_push_up_full_column_is_noop() {
    let mut grid = Grid::from_text(GridRules::default(), &["1_", "2_", "3_"], &[at(1, 0)]).unwrap();
    let before = grid.clone();
    grid.apply_actions(&[GridAction::PushUpCells {
        pushes: vec![ColumnPush {
            column: 0,
            block: BlockType::concrete(4),
        }],
    }]);
    assert_eq!(grid.cells(), before.cells());
    assert_eq!(grid.pinned().collect::<Vec<_>>(), vec![at(1, 0)]);
    assert_eq!(
        grid.take_diagnostics(),
        vec![GridDiagnostic::ColumnFull { column: 0 }]
    );
}

#[test]
fn test_push_up_out_of_range_column() {
    let mut grid = Grid::new(2, 2, GridRules::default());
    grid.apply_actions(&[GridAction::PushUpCells {
        pushes: vec![ColumnPush {
            column: 2,
            block: BlockType::concrete(1),
        }],
    }]);
    assert_eq!(grid.occupied_count(), 0);
    assert_eq!(grid.diagnostics().error_count(), 1);
}

#[test]
fn test_merged_clear_reports_each_cell_once() {
    let mut grid = Grid::from_text(GridRules::default(), &["1__", "1__", "111"], &[]).unwrap();
    let row: Vec<_> = (0..3).map(|c| at(0, c)).collect();
    let column: Vec<_> = (0..3).map(|r| at(r, 0)).collect();
    grid.apply_actions(&[
        GridAction::clear_run(MatchAxis::Horizontal, row),
        GridAction::clear_run(MatchAxis::Vertical, column),
    ]);
    assert_eq!(grid.occupied_count(), 0);
    assert!(grid.diagnostics().is_empty());
}
