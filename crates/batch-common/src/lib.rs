//! Batch Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Value types and utilities shared by the job registry and the execution
//! layers that consume it.
//!
//! # Overview
//!
//! - **Status**: [`BatchStatus`], the ordered lifecycle value of a job or step run
//! - **Interruption**: [`InterruptionSignal`], a cooperative cancellation carrying
//!   the status a run must end with
//! - **Logging**: centralized `tracing` setup for every binary in the workspace
//! - **Error Handling**: shared error and result types
//!
//! # Example
//!
//! ```
//! use batch_common::{BatchStatus, InterruptionSignal};
//!
//! let reported = [BatchStatus::Started, BatchStatus::Stopped, BatchStatus::Stopping];
//! let aggregate = reported.iter().copied().fold(BatchStatus::Unknown, BatchStatus::upgrade_to);
//! assert_eq!(aggregate, BatchStatus::Stopped);
//!
//! let signal = InterruptionSignal::new("operator requested stop");
//! assert_eq!(signal.target_status(), BatchStatus::Stopped);
//! ```

pub mod error;
pub mod interruption;
pub mod logging;
pub mod status;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use interruption::InterruptionSignal;
pub use status::BatchStatus;
