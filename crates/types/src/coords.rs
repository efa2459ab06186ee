//! Grid coordinates and the sparse coordinate map shared by shapes and mirrors.

use std::ops::{Add, Sub};

use serde::{Deserialize, Deserializer, Serialize};

/// A `(row, column)` position. Row 0 is the bottom of the tower.
///
/// Ordering is row-major (row first, then column), which is also the order the
/// match detector scans in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCoords {
    pub row: i32,
    pub column: i32,
}

impl GridCoords {
    pub const ORIGIN: GridCoords = GridCoords { row: 0, column: 0 };

    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Wrap the column into `0..columns`.
    ///
    /// ```
    /// use tower_cascade_types::GridCoords;
    ///
    /// assert_eq!(GridCoords::new(2, -1).wrap_columns(6), GridCoords::new(2, 5));
    /// assert_eq!(GridCoords::new(2, 7).wrap_columns(6), GridCoords::new(2, 1));
    /// ```
    pub fn wrap_columns(self, columns: i32) -> Self {
        if columns <= 0 {
            return self;
        }
        Self {
            row: self.row,
            column: self.column.rem_euclid(columns),
        }
    }

    /// Wrap the row into `0..rows`.
    pub fn wrap_rows(self, rows: i32) -> Self {
        if rows <= 0 {
            return self;
        }
        Self {
            row: self.row.rem_euclid(rows),
            column: self.column,
        }
    }

    /// Component-wise sum, `None` on `i32` overflow.
    ///
    /// ```
    /// use tower_cascade_types::GridCoords;
    ///
    /// assert_eq!(GridCoords::new(1, 2).checked_add(GridCoords::new(1, -1)), Some(GridCoords::new(2, 1)));
    /// assert_eq!(GridCoords::new(i32::MAX, 0).checked_add(GridCoords::new(1, 0)), None);
    /// ```
    pub fn checked_add(self, rhs: GridCoords) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add(rhs.row)?,
            column: self.column.checked_add(rhs.column)?,
        })
    }

    pub fn above(self) -> Self {
        Self::new(self.row + 1, self.column)
    }

    pub fn below(self) -> Self {
        Self::new(self.row - 1, self.column)
    }
}

impl Add for GridCoords {
    type Output = GridCoords;

    fn add(self, rhs: GridCoords) -> GridCoords {
        GridCoords::new(self.row + rhs.row, self.column + rhs.column)
    }
}

impl Sub for GridCoords {
    type Output = GridCoords;

    fn sub(self, rhs: GridCoords) -> GridCoords {
        GridCoords::new(self.row - rhs.row, self.column - rhs.column)
    }
}

impl std::fmt::Display for GridCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Sparse coordinate -> value map.
///
/// Entries are kept sorted by coordinates, so iteration is deterministic
/// regardless of insertion order. Used for placement shapes
/// (`CoordMap<BlockType>`) and for presentation-side mirrors keyed by grid
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CoordMap<T> {
    entries: Vec<(GridCoords, T)>,
}

impl<T> CoordMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, coords: GridCoords) -> Result<usize, usize> {
        self.entries.binary_search_by(|(at, _)| at.cmp(&coords))
    }

    /// Insert or replace; returns the previous value at `coords`.
    pub fn insert(&mut self, coords: GridCoords, value: T) -> Option<T> {
        match self.position(coords) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (coords, value));
                None
            }
        }
    }

    pub fn get(&self, coords: GridCoords) -> Option<&T> {
        self.position(coords).ok().map(|idx| &self.entries[idx].1)
    }

    pub fn remove(&mut self, coords: GridCoords) -> Option<T> {
        self.position(coords)
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    pub fn contains(&self, coords: GridCoords) -> bool {
        self.position(coords).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoords, &T)> + '_ {
        self.entries.iter().map(|(at, value)| (*at, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = GridCoords> + '_ {
        self.entries.iter().map(|(at, _)| *at)
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(GridCoords, &T) -> bool) {
        self.entries.retain(|(at, value)| keep(*at, value));
    }
}

impl<T: Clone> CoordMap<T> {
    /// Copy of this map with every key shifted by `offset`.
    pub fn translated(&self, offset: GridCoords) -> Self {
        self.iter()
            .map(|(at, value)| (at + offset, value.clone()))
            .collect()
    }
}

impl<T> Default for CoordMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Serialized as a plain list of pairs; re-sorted on the way in.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for CoordMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<(GridCoords, T)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl<T> FromIterator<(GridCoords, T)> for CoordMap<T> {
    fn from_iter<I: IntoIterator<Item = (GridCoords, T)>>(iter: I) -> Self {
        let mut map = CoordMap::new();
        for (at, value) in iter {
            map.insert(at, value);
        }
        map
    }
}
