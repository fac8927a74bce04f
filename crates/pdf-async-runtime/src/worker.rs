use crate::{PosterCommand, PosterUpdate};
use pdf_poster::{
    CancelToken, PdfSource, PosterError, PosterState, RunControl, TiledPosterOptions,
    calculate_statistics, generate_poster_with, list_generated_files,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The generation currently in flight
struct ActiveRun {
    cancel: CancelToken,
    busy: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ActiveRun {
    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Async worker task that processes poster commands and sends updates.
///
/// Runs until the command channel closes. Every command but `Cancel` is
/// handled on its own task, so `Cancel` is never queued behind slow work.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PosterCommand>,
    update_tx: mpsc::UnboundedSender<PosterUpdate>,
) {
    let mut active: Option<ActiveRun> = None;

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            PosterCommand::Generate { options } => {
                if active.as_ref().is_some_and(ActiveRun::is_busy) {
                    let _ = update_tx.send(PosterUpdate::Error {
                        message: "A poster generation is already running".to_string(),
                    });
                    continue;
                }
                active = Some(start_generation(options, &update_tx));
            }
            PosterCommand::CalculateStats { options } => {
                tokio::spawn(handle_calculate_stats(options, update_tx.clone()));
            }
            PosterCommand::ListGenerated { folder } => {
                tokio::spawn(handle_list_generated(folder, update_tx.clone()));
            }
            PosterCommand::Cancel => match &active {
                Some(run) if run.is_busy() => {
                    log::debug!("Cancelling poster generation");
                    run.cancel.cancel();
                }
                _ => log::debug!("Cancel requested with no generation running"),
            },
        }
    }

    if let Some(run) = active {
        run.cancel.cancel();
        if let Err(e) = run.task.await {
            log::warn!("Poster generation task failed: {}", e);
        }
    }
}

fn start_generation(
    options: TiledPosterOptions,
    update_tx: &mpsc::UnboundedSender<PosterUpdate>,
) -> ActiveRun {
    let cancel = CancelToken::new();
    let busy = Arc::new(AtomicBool::new(true));

    let listener_tx = update_tx.clone();
    let control = RunControl::new()
        .with_cancel(cancel.clone())
        .on_state_change(move |state| {
            if let PosterState::Generating { page, total_pages } = state {
                let _ = listener_tx.send(PosterUpdate::Progress {
                    current: *page,
                    total: *total_pages,
                });
            }
            let _ = listener_tx.send(PosterUpdate::StateChanged {
                state: state.clone(),
            });
        });

    let update_tx = update_tx.clone();
    let run_busy = busy.clone();
    let task = tokio::spawn(async move {
        let result = generate_poster_with(&options, control).await;
        // Cleared before the final update so a follow-up Generate is accepted
        run_busy.store(false, Ordering::SeqCst);

        let update = match result {
            Ok(file) => PosterUpdate::Generated { file },
            Err(PosterError::Cancelled) => PosterUpdate::Cancelled,
            Err(e) => PosterUpdate::Error {
                message: format!("Failed to generate poster: {}", e),
            },
        };
        let _ = update_tx.send(update);
    });

    ActiveRun { cancel, busy, task }
}

async fn handle_calculate_stats(
    options: TiledPosterOptions,
    update_tx: mpsc::UnboundedSender<PosterUpdate>,
) {
    let result = match PdfSource::load(&options.source_file).await {
        Ok(source) => calculate_statistics(&source, &options),
        Err(e) => Err(e),
    };

    let update = match result {
        Ok(stats) => PosterUpdate::StatsCalculated { stats },
        Err(e) => PosterUpdate::Error {
            message: format!("Failed to calculate statistics: {}", e),
        },
    };
    let _ = update_tx.send(update);
}

async fn handle_list_generated(folder: PathBuf, update_tx: mpsc::UnboundedSender<PosterUpdate>) {
    let result = tokio::task::spawn_blocking(move || list_generated_files(folder)).await;

    let update = match result {
        Ok(Ok(files)) => PosterUpdate::GeneratedListed { files },
        Ok(Err(e)) => PosterUpdate::Error {
            message: format!("Failed to list generated files: {}", e),
        },
        Err(e) => PosterUpdate::Error {
            message: format!("Failed to list generated files: {}", e),
        },
    };
    let _ = update_tx.send(update);
}
