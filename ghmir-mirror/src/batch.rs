//! Batch processor: mirror every repository cloned for one entity.
//!
//! # Layout
//!
//! ```text
//! <backup_root>/
//!   <entity>_backup/
//!     <repository>/     (one clone per directory, written by ghorg)
//! ```
//!
//! The directory listing is the only record of which repositories belong to
//! an entity.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use ghmir_core::{EntityName, ValidatedEntity};

use crate::command::CommandRunner;
use crate::error::{io_err, MirrorError};
use crate::executor::{self, MirrorContext, Outcome, RepositoryResult};
use crate::notify::Notifier;

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// `<backup_root>/<entity>_backup`: pure, no I/O.
pub fn backup_dir_for(backup_root: &Path, entity: &EntityName) -> PathBuf {
    backup_root.join(format!("{entity}_backup"))
}

/// Immediate subdirectories of `dir`, sorted by name. Files are ignored.
pub fn discover_repositories(dir: &Path) -> Result<Vec<PathBuf>, MirrorError> {
    if !dir.is_dir() {
        return Err(MirrorError::BackupDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut repos = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let is_dir = entry
            .file_type()
            .map_err(|e| io_err(entry.path(), e))?
            .is_dir();
        if is_dir {
            repos.push(entry.path());
        }
    }
    repos.sort();
    Ok(repos)
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Aggregate outcome for one entity's batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub entity: EntityName,
    /// Repository directories discovered.
    pub total: usize,
    /// Failed repositories in processing order.
    pub failed_names: Vec<String>,
}

impl BatchResult {
    pub fn new(entity: EntityName) -> Self {
        Self {
            entity,
            total: 0,
            failed_names: Vec::new(),
        }
    }

    pub fn record(&mut self, result: RepositoryResult) {
        self.total += 1;
        if let Outcome::Failure(_) = result.outcome {
            self.failed_names.push(result.name);
        }
    }

    pub fn failures(&self) -> usize {
        self.failed_names.len()
    }

    /// Operator-facing summary, also the notification body.
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "[{}] {} repositories mirrored, {} error(s) occurred.",
            self.entity,
            self.total,
            self.failures()
        );
        if !self.failed_names.is_empty() {
            summary.push_str("\nFailed repos: ");
            summary.push_str(&self.failed_names.join(", "));
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct BatchProcessor<'a> {
    pub runner: &'a dyn CommandRunner,
    pub git: &'a str,
    pub notifier: Option<&'a dyn Notifier>,
    /// Worker pool size; `1` processes repositories one at a time.
    pub jobs: usize,
}

impl BatchProcessor<'_> {
    /// Mirror every repository under the entity's backup directory, then
    /// notify. Only a missing or unreadable backup directory is an error.
    pub fn process(
        &self,
        entity: &ValidatedEntity,
        backup_root: &Path,
    ) -> Result<BatchResult, MirrorError> {
        let dir = backup_dir_for(backup_root, &entity.name);
        tracing::info!(entity = %entity.name, directory = %dir.display(), "processing repositories");

        let repos = discover_repositories(&dir)?;
        let ctx = MirrorContext {
            runner: self.runner,
            git: self.git,
            destination: &entity.destination,
        };

        let mirror_one = |path: &PathBuf| {
            let result = executor::mirror_repository(&ctx, path);
            if let Outcome::Failure(reason) = &result.outcome {
                tracing::error!(
                    entity = %entity.name,
                    repository = %result.name,
                    reason = %reason,
                    "error mirroring repository"
                );
            }
            result
        };

        let results: Vec<RepositoryResult> = if self.jobs <= 1 {
            repos.iter().map(mirror_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .map_err(|e| MirrorError::WorkerPool(e.to_string()))?;
            pool.install(|| repos.par_iter().map(mirror_one).collect())
        };

        let mut batch = BatchResult::new(entity.name.clone());
        for result in results {
            batch.record(result);
        }

        let summary = batch.summary();
        tracing::info!(entity = %entity.name, total = batch.total, failed = batch.failures(), "batch complete");
        if let Some(notifier) = self.notifier {
            if let Err(err) = notifier.notify(&summary) {
                tracing::warn!(entity = %entity.name, error = %err, "failed to send notification");
            }
        }
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
