//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental values that flow through the cascade
//! engine. Everything here is plain data: it can be copied into a replay log,
//! compared for equality, and serialized by an external layer without the
//! engine being involved.
//!
//! # Block Identity
//!
//! A [`BlockType`] is a one-byte stable id:
//!
//! | Id | Meaning |
//! |----|---------|
//! | `0` | [`BlockType::NONE`]: empty cell |
//! | `1..=253` | concrete block types |
//! | `254` | [`BlockType::STATIC`]: never matches, never falls |
//! | `255` | [`BlockType::WILD`]: extends a run of any concrete type |
//!
//! # Coordinates
//!
//! [`GridCoords`] are `(row, column)` with row 0 at the bottom of the tower.
//!
//! # Actions
//!
//! Every grid mutation is a [`GridAction`]. Batches of actions are applied,
//! in the same order, to every consumer of the stream (the grid itself, the
//! score accumulator, presentation listeners).
//!
//! # Examples
//!
//! ```
//! use tower_cascade_types::{BlockType, GridRules, MatchAxis, Shape, GridCoords};
//!
//! let red = BlockType::concrete(1);
//! assert!(red.matches(BlockType::WILD));
//! assert!(!red.matches(BlockType::STATIC));
//!
//! let rules = GridRules::default();
//! assert_eq!(rules.min_length(MatchAxis::Horizontal), 3);
//!
//! let bar = Shape::vertical_bar(&[red, red, BlockType::concrete(2)]);
//! assert_eq!(bar.get(GridCoords::new(2, 0)), Some(&BlockType::concrete(2)));
//! ```

mod coords;

use serde::{Deserialize, Serialize};

pub use coords::{CoordMap, GridCoords};

/// Default number of grid columns.
pub const DEFAULT_COLUMNS: u16 = 8;

/// Default number of grid rows.
pub const DEFAULT_ROWS: u16 = 14;

/// Default minimum run length on every enabled axis.
pub const DEFAULT_MATCH_LENGTH: u8 = 3;

/// Default number of concrete block types in play.
pub const DEFAULT_SPAWN_TYPES: u8 = 4;

/// Highest id usable by a concrete block type.
pub const MAX_CONCRETE_ID: u8 = 253;

/// One-byte block identity. See the module docs for the id layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockType(pub u8);

impl BlockType {
    pub const NONE: BlockType = BlockType(0);
    pub const STATIC: BlockType = BlockType(254);
    pub const WILD: BlockType = BlockType(255);

    /// A concrete block type. Ids outside `1..=253` are clamped into range.
    pub const fn concrete(id: u8) -> Self {
        if id == 0 {
            BlockType(1)
        } else if id > MAX_CONCRETE_ID {
            BlockType(MAX_CONCRETE_ID)
        } else {
            BlockType(id)
        }
    }

    pub const fn id(self) -> u8 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(self) -> bool {
        self.0 != 0
    }

    pub const fn is_wild(self) -> bool {
        self.0 == Self::WILD.0
    }

    pub const fn is_static(self) -> bool {
        self.0 == Self::STATIC.0
    }

    pub const fn is_concrete(self) -> bool {
        self.0 >= 1 && self.0 <= MAX_CONCRETE_ID
    }

    /// Whether this block can take part in a run (concrete or wild).
    pub const fn is_matchable(self) -> bool {
        self.is_concrete() || self.is_wild()
    }

    /// Whether `self` can sit in the same run as `other`.
    ///
    /// Wild matches any concrete type and other wilds; empty and static cells
    /// match nothing.
    pub fn matches(self, other: BlockType) -> bool {
        if !self.is_matchable() || !other.is_matchable() {
            return false;
        }
        self == other || self.is_wild() || other.is_wild()
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            BlockType::NONE => write!(f, "_"),
            BlockType::STATIC => write!(f, "#"),
            BlockType::WILD => write!(f, "*"),
            BlockType(id) => write!(f, "{}", id),
        }
    }
}

/// Placement shape: offsets from the placement anchor to block types.
pub type Shape = CoordMap<BlockType>;

impl CoordMap<BlockType> {
    /// A single-column bar, `blocks[0]` at the anchor and the rest stacked
    /// upward.
    pub fn vertical_bar(blocks: &[BlockType]) -> Self {
        blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (GridCoords::new(i as i32, 0), *block))
            .collect()
    }

    /// A single-row bar, `blocks[0]` at the anchor and the rest to the right.
    pub fn horizontal_bar(blocks: &[BlockType]) -> Self {
        blocks
            .iter()
            .enumerate()
            .map(|(i, block)| (GridCoords::new(0, i as i32), *block))
            .collect()
    }

    /// Number of non-empty cells.
    pub fn occupied_len(&self) -> usize {
        self.iter().filter(|(_, block)| block.is_occupied()).count()
    }
}

/// Match axis of a cleared run.
///
/// `Special` marks clears that were not triggered by the line rules (forced
/// or power-up clears).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAxis {
    Horizontal,
    Vertical,
    Diagonal,
    Special,
}

impl MatchAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAxis::Horizontal => "horizontal",
            MatchAxis::Vertical => "vertical",
            MatchAxis::Diagonal => "diagonal",
            MatchAxis::Special => "special",
        }
    }
}

/// Line-matching rules for one level. Immutable once the grid is built.
///
/// A `match_*` value of 0 disables that axis; any other value is the minimum
/// run length that clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRules {
    pub match_horizontal: u8,
    pub match_vertical: u8,
    pub match_diagonal: u8,
    pub wrap_sides_on_match: bool,
    pub wrap_sides_on_move: bool,
}

impl GridRules {
    /// Every axis disabled, no wrapping.
    pub const DISABLED: GridRules = GridRules {
        match_horizontal: 0,
        match_vertical: 0,
        match_diagonal: 0,
        wrap_sides_on_match: false,
        wrap_sides_on_move: false,
    };

    /// Minimum run length for `axis`, 0 when disabled (always 0 for
    /// [`MatchAxis::Special`]).
    pub fn min_length(&self, axis: MatchAxis) -> u8 {
        match axis {
            MatchAxis::Horizontal => self.match_horizontal,
            MatchAxis::Vertical => self.match_vertical,
            MatchAxis::Diagonal => self.match_diagonal,
            MatchAxis::Special => 0,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.match_horizontal > 0 || self.match_vertical > 0 || self.match_diagonal > 0
    }
}

impl Default for GridRules {
    fn default() -> Self {
        Self {
            match_horizontal: DEFAULT_MATCH_LENGTH,
            match_vertical: DEFAULT_MATCH_LENGTH,
            match_diagonal: 0,
            wrap_sides_on_match: false,
            wrap_sides_on_move: false,
        }
    }
}

/// One run that contributed to a clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchedRun {
    pub axis: MatchAxis,
    pub length: u32,
}

/// A single vertical move from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellMove {
    pub from: GridCoords,
    pub to: GridCoords,
}

/// Push `block` into the bottom of `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnPush {
    pub column: i32,
    pub block: BlockType,
}

/// A grid mutation command.
///
/// Produced by input (placements), by the match detector (clears and falls),
/// by the bonus generator (push-ups), and by the cascade resolver
/// (`SequenceFinished`). Every consumer sees the same actions in the same
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridAction {
    /// Write `shape` with its origin at `coords`.
    Place { coords: GridCoords, shape: Shape },
    /// Empty `coords`. `runs` lists the runs that produced the clear.
    ClearMatched {
        coords: Vec<GridCoords>,
        runs: Vec<MatchedRun>,
    },
    /// Vertical moves, applied in order.
    MoveCells { moves: Vec<CellMove> },
    /// Shift each listed column up by one row and insert a block at row 0.
    PushUpCells { pushes: Vec<ColumnPush> },
    /// Closes one top-level cascade resolution.
    SequenceFinished,
}

impl GridAction {
    /// A clear produced by a single rule-based run.
    pub fn clear_run(axis: MatchAxis, coords: Vec<GridCoords>) -> Self {
        let length = coords.len() as u32;
        GridAction::ClearMatched {
            coords,
            runs: vec![MatchedRun { axis, length }],
        }
    }

    /// A forced clear that does not come from the line rules.
    pub fn special_clear(coords: Vec<GridCoords>) -> Self {
        Self::clear_run(MatchAxis::Special, coords)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, GridAction::ClearMatched { .. })
    }

    /// Snake-case kind name, matching the serialized `kind` tag.
    pub fn kind_str(&self) -> &'static str {
        match self {
            GridAction::Place { .. } => "place",
            GridAction::ClearMatched { .. } => "clear_matched",
            GridAction::MoveCells { .. } => "move_cells",
            GridAction::PushUpCells { .. } => "push_up_cells",
            GridAction::SequenceFinished => "sequence_finished",
        }
    }
}

/// The concrete block types currently being spawned: ids
/// `first..first + count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnRange {
    first: u8,
    count: u8,
}

impl SpawnRange {
    /// Returns `None` when the range is empty or leaves no room for the
    /// reserved future type.
    ///
    /// ```
    /// use tower_cascade_types::{BlockType, SpawnRange};
    ///
    /// let range = SpawnRange::new(1, 4).unwrap();
    /// assert_eq!(range.future_type(), BlockType::concrete(5));
    /// assert!(SpawnRange::new(1, 0).is_none());
    /// assert!(SpawnRange::new(250, 4).is_none());
    /// ```
    pub fn new(first: u8, count: u8) -> Option<Self> {
        if first == 0 || count == 0 {
            return None;
        }
        let future = first as u16 + count as u16;
        if future > MAX_CONCRETE_ID as u16 {
            return None;
        }
        Some(Self { first, count })
    }

    pub fn first(&self) -> BlockType {
        BlockType(self.first)
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn types(&self) -> impl Iterator<Item = BlockType> {
        (self.first..self.first + self.count).map(BlockType)
    }

    pub fn contains(&self, block: BlockType) -> bool {
        block.0 >= self.first && block.0 < self.first + self.count
    }

    /// The type just past the active range, used when no active type is safe.
    pub fn future_type(&self) -> BlockType {
        BlockType(self.first + self.count)
    }
}

impl Default for SpawnRange {
    fn default() -> Self {
        Self {
            first: 1,
            count: DEFAULT_SPAWN_TYPES,
        }
    }
}
