//! Progress reporting hooks.

use crate::error::AttemptFailure;
use crate::pipeline::Stage;

/// Observer for pipeline progress. Every hook defaults to a no-op.
pub trait Progress {
    /// A stage is about to run.
    fn stage_started(&mut self, _stage: Stage) {}

    /// A stage finished and its output was verified.
    fn stage_finished(&mut self, _stage: Stage) {}

    /// An exchange converter is about to be tried.
    fn attempt_started(&mut self, _method: &str) {}

    /// An exchange converter produced a verified output.
    fn attempt_succeeded(&mut self, _method: &str) {}

    /// An exchange converter failed; the chain moves on.
    fn attempt_failed(&mut self, _failure: &AttemptFailure) {}
}

/// Ignores all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {}
