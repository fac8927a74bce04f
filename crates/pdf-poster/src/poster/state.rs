//! Run state tracking and cancellation

use crate::types::{GeneratedFile, PosterError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stage of a poster generation run
#[derive(Debug, Clone, PartialEq)]
pub enum PosterState {
    Idle,
    Loading,
    /// Compositing the tiles of source page `page` (1-based) of `total_pages`
    Generating { page: usize, total_pages: usize },
    Saving,
    Done(GeneratedFile),
    /// The run stopped; carries the error message
    Failed(String),
}

impl PosterState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PosterState::Done(_) | PosterState::Failed(_))
    }

    /// Whether a run may move from this state to `next`
    pub fn can_transition_to(&self, next: &PosterState) -> bool {
        use PosterState::*;
        match (self, next) {
            (Idle, Loading) => true,
            (Loading, Generating { .. }) => true,
            (Generating { .. }, Generating { .. }) => true,
            (Generating { .. }, Saving) => true,
            (Saving, Done(_)) => true,
            (Idle, Failed(_)) => false,
            (current, Failed(_)) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Shared flag asking a running generation to stop.
///
/// Checked between source pages and before saving.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Callback invoked on every state change of a run
pub type StateListener = Arc<dyn Fn(&PosterState) + Send + Sync>;

/// Caller-side controls for one generation run
#[derive(Clone, Default)]
pub struct RunControl {
    cancel: CancelToken,
    listener: Option<StateListener>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` to cancel the run
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Call `listener` on every state change
    pub fn on_state_change(mut self, listener: impl Fn(&PosterState) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }
}

/// State machine of one run
pub(crate) struct Run {
    state: PosterState,
    control: RunControl,
}

impl Run {
    pub(crate) fn new(control: RunControl) -> Self {
        Self {
            state: PosterState::Idle,
            control,
        }
    }

    /// Pick a run back up at `state` after the task holding it was lost
    pub(crate) fn resume(control: RunControl, state: PosterState) -> Self {
        Self { state, control }
    }

    pub(crate) fn control(&self) -> &RunControl {
        &self.control
    }

    /// A run nobody observes or cancels
    pub(crate) fn detached() -> Self {
        Self::new(RunControl::default())
    }

    pub(crate) fn transition(&mut self, next: PosterState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid poster state transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("Poster state: {:?} -> {:?}", self.state, next);
        self.state = next;
        if let Some(listener) = &self.control.listener {
            listener(&self.state);
        }
    }

    /// Move to `Failed` and hand the error back
    pub(crate) fn fail(&mut self, error: PosterError) -> PosterError {
        if !matches!(self.state, PosterState::Idle) && !self.state.is_terminal() {
            log::debug!("Poster generation failed: {}", error);
            self.transition(PosterState::Failed(error.to_string()));
        }
        error
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.control.cancel.is_cancelled() {
            return Err(PosterError::Cancelled);
        }
        Ok(())
    }
}
