//! Headless cascade runner (default binary).
//!
//! Drops random three-block vertical bars into random columns of a seeded
//! session, pushes a bonus row every `TOWER_BONUS_EVERY` drops, and writes
//! every applied batch to stdout as JSON lines. Stops after the requested
//! number of drops or when a drop overflows the top of the tower.
//!
//! ```text
//! tower-cascade [DROPS]
//! ```
//!
//! Configuration comes from the `TOWER_*` environment variables (see
//! `tower_cascade::engine::config`); a summary goes to stderr.

use std::io::{self, BufWriter};

use anyhow::{anyhow, Context, Result};

use tower_cascade::adapter::TraceRecorder;
use tower_cascade::core::{ActionConsumer, BlockBag};
use tower_cascade::engine::{Resolution, Session, SessionConfig};
use tower_cascade::types::{BlockType, GridCoords, Shape};

const DEFAULT_DROPS: u32 = 200;
const BAR_LENGTH: usize = 3;

fn main() -> Result<()> {
    let config = SessionConfig::from_env().context("read TOWER_* configuration")?;
    let drops = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .map_err(|_| anyhow!("drop count must be a number, got {:?}", arg))?,
        None => DEFAULT_DROPS,
    };

    let stdout = io::stdout();
    let mut trace = TraceRecorder::new(BufWriter::new(stdout.lock()));
    let summary = run(&config, drops, &mut trace)?;
    trace.finish()?;

    eprintln!(
        "[Demo] {} drops, score {}, matched {}, cleared {}, grid errors {}{}",
        summary.drops,
        summary.score,
        summary.total_matched,
        summary.total_cleared,
        summary.grid_errors,
        if summary.overflowed { ", tower overflowed" } else { "" }
    );
    eprint!("{}", summary.final_grid);
    Ok(())
}

struct Summary {
    drops: u32,
    score: u64,
    total_matched: u64,
    total_cleared: u64,
    grid_errors: u64,
    overflowed: bool,
    final_grid: String,
}

/// Write each resolution's batches to the trace; true when it overflowed.
fn record(resolutions: Vec<Resolution>, trace: &mut impl ActionConsumer) -> bool {
    let mut overflowed = false;
    for resolution in resolutions {
        for batch in &resolution.batches {
            trace.apply_actions(batch);
        }
        overflowed |= resolution.placed_above_top;
    }
    overflowed
}

fn run(config: &SessionConfig, drops: u32, trace: &mut impl ActionConsumer) -> Result<Summary> {
    let mut session = Session::new(config);
    let mut bag = BlockBag::new(config.spawn);
    let columns = session.grid().columns() as u32;

    let mut done = 0;
    let mut overflowed = false;
    while done < drops && !overflowed {
        if config.bonus_every > 0 && done > 0 && done % config.bonus_every == 0 {
            session.submit_bonus_push();
            record(session.run_until_idle(), trace);
        }

        let column = session.rng_mut().next_range(columns) as usize;
        let blocks: Vec<BlockType> = (0..BAR_LENGTH)
            .map(|_| bag.draw(session.rng_mut()))
            .collect();
        let row = session.grid().column_height(column) as i32;
        session
            .submit_placement(GridCoords::new(row, column as i32), Shape::vertical_bar(&blocks))
            .map_err(|e| anyhow!("drop {}: {}", done + 1, e))?;
        overflowed = record(session.run_until_idle(), trace);
        done += 1;
    }

    let state = session.score().state();
    Ok(Summary {
        drops: done,
        score: state.score,
        total_matched: state.total_matched,
        total_cleared: state.total_cleared,
        grid_errors: session.grid().diagnostics().error_count(),
        overflowed,
        final_grid: session.grid().render(),
    })
}
