//! Poster generation - cutting pages into printable tiles
//!
//! This module orchestrates a generation run:
//! 1. Validate options and open the source document
//! 2. Partition every page and composite one output page per tile
//! 3. Save the result atomically under a collision-free name
//!
//! A run moves through [`PosterState`]s, which callers can observe through
//! [`RunControl::on_state_change`].

mod assemble;
mod io;
mod naming;
mod state;

pub use assemble::tile_source;
pub use io::save_pdf;
pub use naming::{base_file_name, numbered_file_name};
pub use state::{CancelToken, PosterState, RunControl, StateListener};

use crate::options::TiledPosterOptions;
use crate::render::PdfSource;
use crate::types::*;
use assemble::assemble;
use io::save_poster;
use state::Run;

/// Generate a tiled poster and return the written file
pub async fn generate_poster(options: &TiledPosterOptions) -> Result<GeneratedFile> {
    generate_poster_with(options, RunControl::default()).await
}

/// Generate a tiled poster with cancellation and state notifications.
///
/// Page compositing and saving each run on a blocking worker, so the
/// calling runtime is never blocked.
pub async fn generate_poster_with(
    options: &TiledPosterOptions,
    control: RunControl,
) -> Result<GeneratedFile> {
    options.validate()?;
    let shape = options.grid_shape()?;
    let options = options.clone();

    log::info!(
        "Generating {}x{} poster from {}",
        shape.rows(),
        shape.cols(),
        options.source_file.display()
    );

    let mut run = Run::new(control);
    run.transition(PosterState::Loading);

    let source = match PdfSource::load(&options.source_file).await {
        Ok(source) => source,
        Err(e) => return Err(run.fail(e)),
    };

    let control = run.control().clone();
    let joined = tokio::task::spawn_blocking(move || {
        let assembled = assemble(&source, shape, &mut run);
        (run, source, assembled)
    })
    .await;
    let (mut run, source, assembled) = match joined {
        Ok(parts) => parts,
        // The run went down with the task; report from the last state we know of
        Err(e) => return Err(Run::resume(control, PosterState::Loading).fail(e.into())),
    };

    let output = match assembled.and_then(|output| {
        run.check_cancelled()?;
        Ok(output)
    }) {
        Ok(output) => output,
        Err(e) => return Err(run.fail(e)),
    };

    run.transition(PosterState::Saving);
    let saved = tokio::task::spawn_blocking(move || {
        let saved = save_poster(output.finish(), &options);
        drop(source);
        saved
    })
    .await
    .unwrap_or_else(|e| Err(e.into()));

    finish_run(run, saved)
}

/// Blocking variant of [`generate_poster_with`] for callers without a runtime
pub fn generate_poster_blocking(
    options: &TiledPosterOptions,
    control: RunControl,
) -> Result<GeneratedFile> {
    options.validate()?;
    let shape = options.grid_shape()?;

    let mut run = Run::new(control);
    let saved = (|| {
        run.transition(PosterState::Loading);
        let source = PdfSource::open(&options.source_file)?;
        let output = assemble(&source, shape, &mut run)?;
        run.check_cancelled()?;

        run.transition(PosterState::Saving);
        let saved = save_poster(output.finish(), options);
        drop(source);
        saved
    })();

    finish_run(run, saved)
}

fn finish_run(mut run: Run, saved: Result<GeneratedFile>) -> Result<GeneratedFile> {
    match saved {
        Ok(file) => {
            log::info!("Poster written to {}", file.path.display());
            run.transition(PosterState::Done(file.clone()));
            Ok(file)
        }
        Err(e) => Err(run.fail(e)),
    }
}
