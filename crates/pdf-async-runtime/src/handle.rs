use crate::{PosterCommand, PosterUpdate, worker_task};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Worker has stopped")]
    WorkerStopped,

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Owning handle to a running worker task
pub struct WorkerHandle {
    command_tx: mpsc::UnboundedSender<PosterCommand>,
    update_rx: mpsc::UnboundedReceiver<PosterUpdate>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn a worker on the current tokio runtime
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(worker_task(command_rx, update_tx));

        Self {
            command_tx,
            update_rx,
            task,
        }
    }

    pub fn send(&self, command: PosterCommand) -> Result<(), RuntimeError> {
        self.command_tx
            .send(command)
            .map_err(|_| RuntimeError::WorkerStopped)
    }

    /// Wait for the next update; `None` once the worker has exited
    pub async fn next_update(&mut self) -> Option<PosterUpdate> {
        self.update_rx.recv().await
    }

    /// Close the command channel and wait for the worker to exit.
    ///
    /// An active run is cancelled first.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        drop(self.command_tx);
        self.task.await?;
        Ok(())
    }
}
