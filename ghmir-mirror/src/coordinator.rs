//! Run coordinator: validate, then clone and (optionally) mirror each
//! requested entity in order.
//!
//! Only configuration/validation failures and backup-root creation are
//! fatal. A failed clone skips that entity; a missing backup directory ends
//! that entity's batch. Neither affects the entities after it.

use std::path::PathBuf;

use serde::Serialize;

use ghmir_core::{config, Config, EntityName};

use crate::batch::{BatchProcessor, BatchResult};
use crate::clone;
use crate::command::{CommandRunner, SystemRunner};
use crate::error::{io_err, MirrorError};
use crate::notify::{Notifier, WebhookNotifier};

pub const DEFAULT_CLONE_PROGRAM: &str = "ghorg";
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Process-wide settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub backup_root: PathBuf,
    pub entities: Vec<EntityName>,
    pub notify_endpoint: Option<String>,
    pub push: bool,
    pub jobs: usize,
    pub clone_program: String,
    pub git_program: String,
}

impl RunConfig {
    pub fn new(backup_root: PathBuf, entities: Vec<EntityName>) -> Self {
        Self {
            backup_root,
            entities,
            notify_endpoint: None,
            push: false,
            jobs: 1,
            clone_program: DEFAULT_CLONE_PROGRAM.to_string(),
            git_program: DEFAULT_GIT_PROGRAM.to_string(),
        }
    }
}

/// What happened to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity: EntityName,
    pub cloned: bool,
    /// Present when mirroring ran to completion for the entity.
    pub batch: Option<BatchResult>,
    /// Entity-level problem (clone failure, unreadable backup directory).
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunReport {
    pub entities: Vec<EntityReport>,
}

/// Run with the real `ghorg`, `git`, and the configured webhook.
pub fn run_with_system(run_config: &RunConfig, config: &Config) -> Result<RunReport, MirrorError> {
    let webhook = run_config
        .notify_endpoint
        .as_deref()
        .and_then(WebhookNotifier::new);
    run(
        run_config,
        config,
        &SystemRunner,
        webhook.as_ref().map(|w| w as &dyn Notifier),
    )
}

/// Validate every requested entity, create the backup root, then process
/// each entity sequentially.
///
/// An empty backup root is rejected up front; it would otherwise resolve
/// against the process working directory.
pub fn run(
    run_config: &RunConfig,
    config: &Config,
    runner: &dyn CommandRunner,
    notifier: Option<&dyn Notifier>,
) -> Result<RunReport, MirrorError> {
    if run_config.backup_root.as_os_str().is_empty() {
        return Err(MirrorError::EmptyBackupRoot);
    }
    let entities = config::validate_entities(config, &run_config.entities)?;

    let root = &run_config.backup_root;
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let processor = BatchProcessor {
        runner,
        git: &run_config.git_program,
        notifier,
        jobs: run_config.jobs.max(1),
    };

    let mut report = RunReport::default();
    for entity in &entities {
        let mut entry = EntityReport {
            entity: entity.name.clone(),
            cloned: false,
            batch: None,
            error: None,
        };

        if let Err(reason) = clone::clone_entity(runner, &run_config.clone_program, entity, root) {
            tracing::warn!(entity = %entity.name, reason = %reason, "failed to clone repositories, skipping");
            entry.error = Some(reason);
            report.entities.push(entry);
            continue;
        }
        entry.cloned = true;

        if run_config.push {
            match processor.process(entity, root) {
                Ok(batch) => entry.batch = Some(batch),
                Err(err) => {
                    tracing::error!(entity = %entity.name, error = %err, "error processing repositories");
                    entry.error = Some(err.to_string());
                }
            }
        }
        report.entities.push(entry);
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
