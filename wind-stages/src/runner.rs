//! Drives a stream of tiles through a chain and writes the results.

use std::io::{self, Write};

use stagechain::{Chain, ExecutionTrace, StageError, TraceMismatch};
use thiserror::Error;

use crate::io::{InputError, write_tile};
use crate::tile::Tile;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("stage {index} failed: {error}")]
    Stage { index: usize, error: StageError },

    #[error(transparent)]
    Trace(#[from] TraceMismatch),
}

/// Run every tile through `chain`, writing the terminal tiles to `out`.
///
/// A tile's outputs are written only once its execution has finished
/// without error. On the first failing tile the run stops with
/// [`RunError::Stage`], unless `keep_going` is set, in which case the tile
/// and everything it produced are skipped. Returns the summed trace.
pub fn run_tiles<I, W>(
    chain: &Chain<Tile>,
    tiles: I,
    mut out: W,
    keep_going: bool,
) -> Result<ExecutionTrace, RunError>
where
    I: IntoIterator<Item = Result<Tile, InputError>>,
    W: Write,
{
    let mut totals = ExecutionTrace::default();
    for tile in tiles {
        let (outputs, trace) = chain.execute_traced(tile?);
        match trace.failures.first() {
            None => {
                for tile in &outputs {
                    write_tile(&mut out, tile)?;
                }
            }
            Some(failure) if !keep_going => {
                out.flush()?;
                return Err(RunError::Stage {
                    index: failure.stage_index,
                    error: failure.error.clone(),
                });
            }
            Some(failure) => {
                tracing::warn!(
                    stage = failure.stage_index,
                    error = %failure.error,
                    discarded = outputs.len(),
                    "skipping tile"
                );
            }
        }
        totals.absorb(trace)?;
    }
    out.flush()?;
    Ok(totals)
}
