//! Session - one level's grid, score and listeners behind a single
//! submission API.
//!
//! Placements, bonus push-ups and forced clears are queued as top-level runs
//! and resolved by [`Session::tick`]. [`SessionState`] is the plain-data save.

use serde::{Deserialize, Serialize};
use tower_cascade_core::{
    ActionConsumer, BonusActionGenerator, Grid, GridSnapshot, LayoutError, ScoreAccumulator,
    ScoreState, SimpleRng,
};
use tower_cascade_types::{GridAction, GridCoords, Shape};

use crate::config::SessionConfig;
use crate::resolver::{CascadeResolver, Resolution, RunId};
use crate::submit::{validate_placement, SubmitError};

/// Saved level state: grid, score totals and RNG position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub grid: GridSnapshot,
    pub score: ScoreState,
    pub rng_state: u32,
}

/// One level: the grid, its score, the resolver gate and the listeners.
///
/// The grid is applied first, then the score, then listeners in the order
/// they were added.
pub struct Session {
    config: SessionConfig,
    grid: Grid,
    score: ScoreAccumulator,
    resolver: CascadeResolver,
    bonus: BonusActionGenerator,
    rng: SimpleRng,
    listeners: Vec<Box<dyn ActionConsumer>>,
}

impl Session {
    /// Start a level on an empty grid.
    pub fn new(config: &SessionConfig) -> Self {
        let grid = Grid::new(config.columns, config.rows, config.rules);
        Self::with_grid(config, grid)
    }

    /// Start a level on a prepared grid. The grid's rules win over
    /// `config.rules`.
    pub fn with_grid(config: &SessionConfig, grid: Grid) -> Self {
        Self {
            config: *config,
            score: ScoreAccumulator::new(*grid.rules()),
            grid,
            resolver: CascadeResolver::new(),
            bonus: BonusActionGenerator::new(config.spawn),
            rng: SimpleRng::new(config.seed),
            listeners: Vec::new(),
        }
    }

    /// Resume a saved level. Pending runs are not part of the saved state.
    pub fn restore(config: &SessionConfig, state: &SessionState) -> Result<Self, LayoutError> {
        let grid = Grid::from_snapshot(&state.grid)?;
        let mut session = Self::with_grid(config, grid);
        session.score.restore(state.score.clone());
        session.rng = SimpleRng::new(state.rng_state);
        Ok(session)
    }

    pub fn save(&self) -> SessionState {
        SessionState {
            grid: self.grid.snapshot(),
            score: self.score.state().clone(),
            rng_state: self.rng.state(),
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn ActionConsumer>) {
        self.listeners.push(listener);
    }

    /// Queue a placement as a new top-level run.
    pub fn submit_placement(&mut self, coords: GridCoords, shape: Shape) -> Result<RunId, SubmitError> {
        validate_placement(&self.grid, coords, &shape)?;
        Ok(self.resolver.submit(vec![GridAction::Place { coords, shape }]))
    }

    /// Queue a bonus push-up chosen against the grid as it is now.
    /// `None` when every column is full.
    pub fn submit_bonus_push(&mut self) -> Option<RunId> {
        let action = self.bonus.generate(&self.grid, &mut self.rng)?;
        Some(self.resolver.submit(vec![action]))
    }

    /// Queue a forced clear of `coords`.
    pub fn submit_special_clear(&mut self, coords: Vec<GridCoords>) -> RunId {
        self.resolver.submit(vec![GridAction::special_clear(coords)])
    }

    /// Queue an arbitrary batch, e.g. from a replay.
    pub fn submit_batch(&mut self, batch: Vec<GridAction>) -> RunId {
        self.resolver.submit(batch)
    }

    /// Resolve the next queued run, if any.
    pub fn tick(&mut self) -> Option<Resolution> {
        let Session {
            grid,
            score,
            resolver,
            listeners,
            ..
        } = self;
        let resolution = resolver.tick(grid, |batch| {
            score.apply_actions(batch);
            for listener in listeners.iter_mut() {
                listener.apply_actions(batch);
            }
        })?;
        if resolution.placed_above_top {
            eprintln!("[Session] run {} placed blocks above the top row", resolution.run_id);
        }
        Some(resolution)
    }

    /// Resolve every queued run.
    pub fn run_until_idle(&mut self) -> Vec<Resolution> {
        let mut out = Vec::new();
        while let Some(resolution) = self.tick() {
            out.push(resolution);
        }
        out
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable grid access for draining diagnostics.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn score(&self) -> &ScoreAccumulator {
        &self.score
    }

    pub fn resolver(&self) -> &CascadeResolver {
        &self.resolver
    }

    pub fn is_idle(&self) -> bool {
        self.resolver.is_idle()
    }

    /// The session RNG, for callers that pick drops from the same seed.
    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }
}
