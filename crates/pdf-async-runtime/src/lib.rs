//! Message types and background worker for driving poster generation from
//! an interactive front end
//!
//! A front end sends [`PosterCommand`]s and receives [`PosterUpdate`]s, both
//! over tokio unbounded channels. [`WorkerHandle`] wires the two channels to a
//! spawned [`worker_task`].

mod handle;
mod worker;

use std::path::PathBuf;

// Re-export types from library crates
pub use pdf_poster::{
    CancelToken, GeneratedFile, PosterState, PosterStatistics, TiledPosterOptions,
};

pub use handle::{RuntimeError, WorkerHandle};
pub use worker::worker_task;

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PosterCommand {
    /// Start a generation run. Refused while another run is in flight.
    Generate { options: TiledPosterOptions },
    /// Report what a run with `options` would produce
    CalculateStats { options: TiledPosterOptions },
    /// List the posters already written to `folder`
    ListGenerated { folder: PathBuf },
    /// Ask the active run to stop at its next checkpoint
    Cancel,
}

/// Updates sent from worker to UI
#[derive(Debug, Clone, PartialEq)]
pub enum PosterUpdate {
    StateChanged { state: PosterState },
    /// Source page `current` of `total` is being tiled
    Progress { current: usize, total: usize },
    Generated { file: GeneratedFile },
    StatsCalculated { stats: PosterStatistics },
    GeneratedListed { files: Vec<GeneratedFile> },
    Cancelled,
    Error { message: String },
}
