//! # ghmir-mirror
//!
//! Mirroring orchestration: remote reconciliation, mirror push, batch
//! aggregation, notification, and the per-entity run coordinator.
//!
//! Call [`coordinator::run`] with an explicit [`CommandRunner`] and optional
//! [`Notifier`], or [`coordinator::run_with_system`] to use the real `ghorg`,
//! `git` and webhook.

pub mod batch;
pub mod clone;
pub mod command;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod notify;
pub mod remote;

#[cfg(test)]
mod test_utils;

pub use batch::{BatchProcessor, BatchResult};
pub use command::{CommandOutcome, CommandRunner, ExternalCommand, SystemRunner};
pub use coordinator::{EntityReport, RunConfig, RunReport};
pub use error::{MirrorError, NotifyError};
pub use executor::{Outcome, RepositoryResult};
pub use notify::{Notifier, WebhookNotifier};
