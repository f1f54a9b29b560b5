//! Cooperative cancellation of a job run
//!
//! An [`InterruptionSignal`] is raised by a step (or by the engine on behalf of
//! an operator) to ask for the run to end early. It is not a failure: an
//! executor that observes it must stop scheduling further steps of the job and
//! give the run the signal's target status, never [`BatchStatus::Failed`]
//! unless that is the explicit target.
//!
//! The signal is observed between step boundaries. Nothing here preempts a
//! step that is already running.

use crate::status::BatchStatus;
use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Request to stop a job run with a given final status
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InterruptionSignal {
    message: String,

    #[source]
    cause: Option<Cause>,

    target_status: BatchStatus,
}

impl InterruptionSignal {
    /// Create a signal that ends the run as [`BatchStatus::Stopped`]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_status(message, BatchStatus::Stopped)
    }

    /// Create a signal that ends the run with an explicit status
    pub fn with_status(message: impl Into<String>, target_status: BatchStatus) -> Self {
        Self {
            message: message.into(),
            cause: None,
            target_status,
        }
    }

    /// Attach the error that triggered the interruption
    #[must_use]
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<Cause>,
    {
        self.cause = Some(cause.into());
        self
    }

    /// Human readable reason for the interruption
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status the interrupted run must end with
    pub fn target_status(&self) -> BatchStatus {
        self.target_status
    }

    /// Error that triggered the interruption, if any
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Final status of a run that was `current` when this signal was observed.
    ///
    /// A run that already reached a terminal status keeps it; any other run
    /// takes the target status.
    pub fn final_status(&self, current: BatchStatus) -> BatchStatus {
        if current.is_terminal() {
            current
        } else {
            self.target_status
        }
    }
}
