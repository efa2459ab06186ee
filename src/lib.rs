//! Tower Cascade (workspace facade crate).
//!
//! Re-exports the member crates as `tower_cascade::{types, core, engine, adapter}`
//! while the implementation lives in dedicated crates under `crates/`.

pub use tower_cascade_adapter as adapter;
pub use tower_cascade_core as core;
pub use tower_cascade_engine as engine;
pub use tower_cascade_types as types;
