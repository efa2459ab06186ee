//! Adapter module - presentation and replay listeners
//!
//! The engine publishes every applied batch to its listeners synchronously.
//! This crate provides the listeners that carry the stream out of the
//! engine:
//!
//! - [`BatchPublisher`]: tokio unbounded channel to an async presentation
//!   task ([`run_presenter`] drives a [`BlockMirror`] from it)
//! - [`TraceRecorder`]: one JSON line per batch, read back with
//!   [`read_trace`] and re-applied with [`replay`]
//! - [`BlockMirror`]: a sparse presentation grid built from actions only
//!
//! # Trace format
//!
//! ```text
//! {"seq":1,"actions":[{"kind":"place","coords":{"row":0,"column":2},"shape":[[{"row":0,"column":0},1]]}]}
//! {"seq":2,"actions":[{"kind":"sequence_finished"}]}
//! ```
//!
//! Block types are written as their stable one-byte ids.

pub mod mirror;
pub mod publisher;
pub mod trace;

pub use mirror::BlockMirror;
pub use publisher::{run_presenter, BatchMessage, BatchPublisher};
pub use trace::{read_trace, replay, TraceRecorder};
