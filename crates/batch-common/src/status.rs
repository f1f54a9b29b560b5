//! Batch run lifecycle status
//!
//! [`BatchStatus`] is totally ordered by an explicit rank table. The order is
//! chosen so that taking the maximum over the statuses reported by steps
//! running concurrently yields the most final outcome of the whole run:
//!
//! ```text
//! UNKNOWN < STARTING < STARTED < STOPPING < STOPPED < FAILED < COMPLETED
//! ```
//!
//! `STOPPED` is the default outcome of an interrupted run, `COMPLETED` the only
//! success outcome.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Lifecycle status of a job or step run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// Status could not be determined
    #[default]
    Unknown,
    /// Run is being prepared
    Starting,
    /// Run is in progress
    Started,
    /// A stop was requested and the run is winding down
    Stopping,
    /// Run was interrupted before it finished
    Stopped,
    /// Run ended with an unexpected error
    Failed,
    /// Run finished successfully
    Completed,
}

impl BatchStatus {
    /// Every status, in rank order
    pub const ALL: [BatchStatus; 7] = [
        BatchStatus::Unknown,
        BatchStatus::Starting,
        BatchStatus::Started,
        BatchStatus::Stopping,
        BatchStatus::Stopped,
        BatchStatus::Failed,
        BatchStatus::Completed,
    ];

    /// Position in the total order. Higher ranks are more final.
    pub const fn rank(self) -> u8 {
        match self {
            BatchStatus::Unknown => 0,
            BatchStatus::Starting => 1,
            BatchStatus::Started => 2,
            BatchStatus::Stopping => 3,
            BatchStatus::Stopped => 4,
            BatchStatus::Failed => 5,
            BatchStatus::Completed => 6,
        }
    }

    /// All statuses in rank order
    pub fn all() -> &'static [BatchStatus] {
        &Self::ALL
    }

    /// Combine two reported statuses, keeping the more final one.
    ///
    /// Commutative, associative and idempotent, so the statuses of
    /// independent steps can be folded in any order.
    #[must_use]
    pub fn upgrade_to(self, other: BatchStatus) -> BatchStatus {
        std::cmp::max(self, other)
    }

    /// Aggregate an arbitrary set of reported statuses.
    ///
    /// An empty set aggregates to [`BatchStatus::Unknown`].
    pub fn aggregate<I>(statuses: I) -> BatchStatus
    where
        I: IntoIterator<Item = BatchStatus>,
    {
        statuses
            .into_iter()
            .fold(BatchStatus::Unknown, BatchStatus::upgrade_to)
    }

    /// Whether no further transition is expected
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BatchStatus::Stopped | BatchStatus::Failed | BatchStatus::Completed
        )
    }

    /// Whether the run is starting or in progress
    pub fn is_running(self) -> bool {
        matches!(self, BatchStatus::Starting | BatchStatus::Started)
    }

    /// Whether the run ended without success
    pub fn is_unsuccessful(self) -> bool {
        matches!(self, BatchStatus::Stopped | BatchStatus::Failed)
    }

    /// Textual token used by logging and monitoring consumers
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Unknown => "UNKNOWN",
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Stopping => "STOPPING",
            BatchStatus::Stopped => "STOPPED",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Completed => "COMPLETED",
        }
    }
}

impl Ord for BatchStatus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for BatchStatus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BatchStatus {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNKNOWN" => Ok(BatchStatus::Unknown),
            "STARTING" => Ok(BatchStatus::Starting),
            "STARTED" => Ok(BatchStatus::Started),
            "STOPPING" => Ok(BatchStatus::Stopping),
            "STOPPED" => Ok(BatchStatus::Stopped),
            "FAILED" => Ok(BatchStatus::Failed),
            "COMPLETED" => Ok(BatchStatus::Completed),
            _ => Err(CommonError::invalid_status(s)),
        }
    }
}
