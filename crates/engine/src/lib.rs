//! Level driver for the cascade core.
//!
//! [`Session`] owns the grid, the score accumulator and the listener list
//! for one level and feeds submissions through the [`CascadeResolver`].
//! Nothing here blocks or sleeps; callers drive it with [`Session::tick`] or
//! [`Session::run_until_idle`] and pace the returned [`Resolution`]s
//! themselves.
//!
//! ```
//! use tower_cascade_engine::{Session, SessionConfig};
//! use tower_cascade_engine::types::{BlockType, GridCoords, Shape};
//!
//! let mut session = Session::new(&SessionConfig::default());
//! let red = BlockType::concrete(1);
//! session
//!     .submit_placement(GridCoords::new(0, 0), Shape::vertical_bar(&[red, red, red]))
//!     .unwrap();
//! let done = session.run_until_idle();
//! assert_eq!(done[0].clear_passes, 1);
//! assert_eq!(session.score().score(), 3);
//! ```

pub mod config;
pub mod resolver;
pub mod session;
pub mod submit;

pub use tower_cascade_types as types;

pub use config::{ConfigError, SessionConfig};
pub use resolver::{CascadeResolver, Resolution, RunId};
pub use session::{Session, SessionState};
pub use submit::{validate_placement, SubmitError};
