//! Snapshot tests - grid and session state through serde_json

use tower_cascade::core::{Grid, GridSnapshot, LayoutError, ScoreState};
use tower_cascade::engine::{Session, SessionConfig, SessionState};
use tower_cascade::types::{BlockType, GridCoords, GridRules, Shape};

#[test]
fn test_grid_snapshot_fields() {
    let pin = GridCoords::new(1, 0);
    let grid = Grid::from_text(GridRules::default(), &["*__", "#2_", "13_"], &[pin]).unwrap();
    let snap = grid.snapshot();

    assert_eq!(snap.columns, 3);
    assert_eq!(snap.rows, 3);
    assert_eq!(snap.cells, vec![1, 3, 0, 254, 2, 0, 255, 0, 0]);
    assert_eq!(snap.pinned, vec![pin]);
    assert_eq!(snap.get(GridCoords::new(1, 1)), Some(BlockType(2)));
    assert_eq!(snap.get(GridCoords::new(3, 0)), None);

    let value = serde_json::to_value(&snap).unwrap();
    assert_eq!(value["cells"][3], 254);
    assert_eq!(value["pinned"][0]["row"], 1);
    assert_eq!(value["rules"]["match_horizontal"], 3);
}

#[test]
fn test_grid_snapshot_restores() {
    let grid = Grid::from_text(GridRules::default(), &["_1", "21"], &[GridCoords::new(1, 1)]).unwrap();
    let json = serde_json::to_string(&grid.snapshot()).unwrap();
    let snap: GridSnapshot = serde_json::from_str(&json).unwrap();
    let restored = Grid::from_snapshot(&snap).unwrap();
    assert_eq!(restored.cells(), grid.cells());
    assert!(restored.is_pinned(GridCoords::new(1, 1)));
    assert_eq!(restored.rules(), grid.rules());
}

#[test]
fn test_bad_snapshot_is_rejected() {
    let mut snap = Grid::new(2, 2, GridRules::default()).snapshot();
    snap.cells.pop();
    assert_eq!(
        Grid::from_snapshot(&snap).unwrap_err(),
        LayoutError::CellCountMismatch {
            expected: 4,
            actual: 3
        }
    );

    let mut snap = Grid::new(2, 2, GridRules::default()).snapshot();
    snap.pinned.push(GridCoords::new(0, 0));
    let err = Grid::from_snapshot(&snap).unwrap_err();
    assert_eq!(err.code(), "pinned_empty_cell");
}

#[test]
fn test_score_state_defaults_missing_totals() {
    let json = r#"{
        "score": 12,
        "total_matched": 6,
        "total_cleared": 6,
        "sequence_cleared": 0,
        "cascade_count": 0,
        "last_bonus": null
    }"#;
    let state: ScoreState = serde_json::from_str(json).unwrap();
    assert_eq!(state.score, 12);
    assert_eq!(state.resolution_cleared, 0);
    assert_eq!(state.resolution_bonus, 0);
}

#[test]
fn test_session_state_round_trip_continues_identically() {
    let config = SessionConfig {
        columns: 5,
        rows: 8,
        seed: 31,
        ..SessionConfig::default()
    };
    let mut session = Session::new(&config);
    let red = BlockType::concrete(1);
    let blue = BlockType::concrete(2);
    session
        .submit_placement(GridCoords::new(0, 0), Shape::vertical_bar(&[red, blue]))
        .unwrap();
    session
        .submit_placement(GridCoords::new(0, 1), Shape::vertical_bar(&[red, red]))
        .unwrap();
    session.run_until_idle();
    session.submit_bonus_push();
    session.run_until_idle();

    let json = serde_json::to_string(&session.save()).unwrap();
    let state: SessionState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, session.save());

    let mut resumed = Session::restore(&config, &state).unwrap();
    assert_eq!(resumed.grid().cells(), session.grid().cells());
    assert_eq!(resumed.score().state(), session.score().state());

    // Both continue with the same bonus choice.
    let a = session.submit_bonus_push().map(|_| session.run_until_idle());
    let b = resumed.submit_bonus_push().map(|_| resumed.run_until_idle());
    assert_eq!(a.is_some(), b.is_some());
    assert_eq!(resumed.grid().cells(), session.grid().cells());
    assert_eq!(resumed.score().score(), session.score().score());
}
