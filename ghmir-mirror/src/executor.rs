//! Mirror executor: reconcile one repository, then `git push --mirror`.
//!
//! Never returns an error; every failure becomes [`Outcome::Failure`] with
//! the failing operation in its reason.

use std::path::Path;

use ghmir_core::DestinationConfig;

use crate::command::CommandRunner;
use crate::remote::{self, GitContext, GitStep};

/// Result of mirroring a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    /// Local directory base name, also used as the destination project name.
    pub name: String,
    pub outcome: Outcome,
}

impl RepositoryResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Everything the executor needs besides the repository path.
#[derive(Clone, Copy)]
pub struct MirrorContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub git: &'a str,
    pub destination: &'a DestinationConfig,
}

/// Mirror the clone at `repo_path` to the destination group.
///
/// The destination project name is the directory's base name; the cloning
/// tool's on-disk naming is assumed to match the destination host's.
pub fn mirror_repository(ctx: &MirrorContext<'_>, repo_path: &Path) -> RepositoryResult {
    let lossy_name = repo_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo_path.display().to_string());

    let failure = |reason: String| RepositoryResult {
        name: lossy_name.clone(),
        outcome: Outcome::Failure(reason),
    };

    let Some(repo_name) = repo_path.file_name().and_then(|n| n.to_str()) else {
        return failure("repository directory name is not valid UTF-8".to_string());
    };

    tracing::info!(
        repository = repo_name,
        group = %ctx.destination.group_name,
        "mirroring repository"
    );

    let url = match remote::destination_url(ctx.destination, repo_name) {
        Ok(url) => url,
        Err(err) => return failure(err.to_string()),
    };
    let git = GitContext {
        runner: ctx.runner,
        git: ctx.git,
        repo: repo_path,
        url: &url,
        token: &ctx.destination.token,
    };

    if let Err(step) = remote::reconcile(&git) {
        return failure(step.to_string());
    }
    if let Err(step) = git.run(&GitStep::PushMirror) {
        return failure(format!("failed to push to gitlab: {step}"));
    }

    tracing::info!(repository = repo_name, "mirrored repository");
    RepositoryResult {
        name: repo_name.to_string(),
        outcome: Outcome::Success,
    }
}
