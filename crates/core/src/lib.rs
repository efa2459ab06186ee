//! Core cascade logic - pure, deterministic, and testable
//!
//! This crate holds the grid and everything that reads or scores it. It has
//! no I/O beyond stderr diagnostics, no clock and no global state:
//!
//! - **Deterministic**: same layout, rules, seed and inputs produce the same
//!   action trace, bit for bit
//! - **Action-driven**: after level setup the grid changes only through
//!   [`GridAction`](types::GridAction) batches
//! - **Non-fatal**: invariant and capacity violations are logged as
//!   [`GridDiagnostic`]s and skipped, never raised
//!
//! # Module Structure
//!
//! - [`grid`]: cell storage, pins, action application
//! - [`pipeline`]: the [`ActionConsumer`] trait and the clear-merge rule
//! - [`detector`]: line matches and gravity
//! - [`score`]: cascade scoring from the action stream
//! - [`bonus`]: push-up generation
//! - [`rng`]: seeded LCG and spawn bag
//! - [`snapshot`]: plain-data grid state
//! - [`diagnostic`]: structured logging
//!
//! # Example
//!
//! ```
//! use tower_cascade_core::{detector, ActionConsumer, Grid, ScoreAccumulator};
//! use tower_cascade_core::types::GridRules;
//!
//! let rules = GridRules::default();
//! let mut grid = Grid::from_text(rules, &["12_", "___", "2_2"], &[]).unwrap();
//! let mut score = ScoreAccumulator::new(rules);
//!
//! // Resolve to a stable grid.
//! let mut batch = detector::evaluate(&grid);
//! while !batch.is_empty() {
//!     grid.apply_actions(&batch);
//!     score.apply_actions(&batch);
//!     batch = detector::evaluate(&grid);
//! }
//! assert_eq!(grid.render(), "___\n___\n1__\n");
//! assert_eq!(score.score(), 3);
//! ```

pub mod bonus;
pub mod detector;
pub mod diagnostic;
pub mod grid;
pub mod pipeline;
pub mod rng;
pub mod score;
pub mod snapshot;

pub use tower_cascade_types as types;

pub use bonus::BonusActionGenerator;
pub use diagnostic::{DiagnosticLog, GridDiagnostic, Severity};
pub use grid::{Grid, LayoutError};
pub use pipeline::{merge_clears, ActionConsumer};
pub use rng::{BlockBag, SimpleRng};
pub use score::{CascadeBonus, ScoreAccumulator, ScoreState};
pub use snapshot::GridSnapshot;
