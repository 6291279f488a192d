//! Remote reconciler.
//!
//! Brings one local clone's `gitlab` remote into a mirror-ready state. Safe to
//! repeat against the same repository:
//!
//! 1. Build the destination URL from the entity's destination credentials.
//! 2. `git remote add gitlab <url>`; if the remote already exists the add
//!    fails and `git remote set-url gitlab <url>` runs instead.
//! 3. Replace the first fetch/push refspec, then add the tag and change-ref
//!    entries. The replace collapses whatever a previous run left behind.
//!
//! The first failing step aborts; nothing is rolled back.

use std::fmt;
use std::path::Path;

use url::Url;

use ghmir_core::{DestinationConfig, Secret};

use crate::command::{CommandOutcome, CommandRunner, ExternalCommand};
use crate::error::MirrorError;

pub const SOURCE_REMOTE: &str = "origin";
pub const DESTINATION_REMOTE: &str = "gitlab";

/// Branches, tags, and the change-ref namespace, in configuration order.
pub const MIRROR_REFSPECS: [&str; 3] = [
    "+refs/heads/*:refs/heads/*",
    "+refs/tags/*:refs/tags/*",
    "+refs/change/*:refs/change/*",
];

// ---------------------------------------------------------------------------
// Destination URL
// ---------------------------------------------------------------------------

/// `https://<token_name>:<token>@<host>/<group...>/<repo>.git`, built with
/// structured setters so URL-special characters in any component are
/// percent-encoded instead of reshaping the URL.
///
/// Group names containing `/` address subgroups.
pub fn destination_url(dest: &DestinationConfig, repo_name: &str) -> Result<Secret, MirrorError> {
    let mut url = Url::parse(&format!("https://{}/", dest.host()))
        .map_err(|e| MirrorError::RemoteUrl(format!("invalid host '{}': {e}", dest.host())))?;

    url.set_username(&dest.token_name)
        .map_err(|_| MirrorError::RemoteUrl("cannot set username".into()))?;
    url.set_password(Some(dest.token.expose()))
        .map_err(|_| MirrorError::RemoteUrl("cannot set password".into()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| MirrorError::RemoteUrl("URL cannot carry a path".into()))?;
        segments.clear();
        let mut groups = dest.group_segments().peekable();
        if groups.peek().is_none() {
            return Err(MirrorError::RemoteUrl("group_name has no path segment".into()));
        }
        segments.extend(groups);
        segments.push(&format!("{repo_name}.git"));
    }

    Ok(Secret::new(String::from(url)))
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One named git operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStep {
    AddRemote,
    SetRemoteUrl,
    ReplaceConfig { key: String, value: String },
    AddConfig { key: String, value: String },
    PushMirror,
}

impl GitStep {
    /// The reconciliation config steps, in order.
    pub fn refspec_steps() -> Vec<GitStep> {
        let mut steps = Vec::with_capacity(MIRROR_REFSPECS.len() * 2);
        for key in [
            format!("remote.{SOURCE_REMOTE}.fetch"),
            format!("remote.{DESTINATION_REMOTE}.push"),
        ] {
            for (i, spec) in MIRROR_REFSPECS.iter().enumerate() {
                let value = spec.to_string();
                let key = key.clone();
                steps.push(if i == 0 {
                    GitStep::ReplaceConfig { key, value }
                } else {
                    GitStep::AddConfig { key, value }
                });
            }
        }
        steps
    }

    /// Build the command. `url` is only read by the remote steps.
    pub fn command(&self, git: &str, repo: &Path, url: &Secret) -> ExternalCommand {
        let cmd = ExternalCommand::git(git, repo);
        match self {
            GitStep::AddRemote => cmd
                .args(["remote", "add", DESTINATION_REMOTE])
                .sensitive_arg("", url.clone()),
            GitStep::SetRemoteUrl => cmd
                .args(["remote", "set-url", DESTINATION_REMOTE])
                .sensitive_arg("", url.clone()),
            GitStep::ReplaceConfig { key, value } => cmd.args([
                "config",
                "--local",
                "--replace-all",
                key.as_str(),
                value.as_str(),
            ]),
            GitStep::AddConfig { key, value } => {
                cmd.args(["config", "--local", "--add", key.as_str(), value.as_str()])
            }
            GitStep::PushMirror => cmd.args(["push", "--mirror", DESTINATION_REMOTE]),
        }
    }
}

impl fmt::Display for GitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitStep::AddRemote => write!(f, "git remote add {DESTINATION_REMOTE}"),
            GitStep::SetRemoteUrl => write!(f, "git remote set-url {DESTINATION_REMOTE}"),
            GitStep::ReplaceConfig { key, value } => {
                write!(f, "git config --replace-all {key} {value}")
            }
            GitStep::AddConfig { key, value } => write!(f, "git config --add {key} {value}"),
            GitStep::PushMirror => write!(f, "git push --mirror {DESTINATION_REMOTE}"),
        }
    }
}

/// A failed step: what was attempted and how it ended. Never contains the
/// destination URL or any token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub action: String,
    pub detail: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.action, self.detail)
    }
}

/// Per-repository context shared by every step.
pub struct GitContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub git: &'a str,
    pub repo: &'a Path,
    pub url: &'a Secret,
    /// Scrubbed from stderr before it reaches a failure reason.
    pub token: &'a Secret,
}

impl GitContext<'_> {
    pub fn run(&self, step: &GitStep) -> Result<(), StepFailure> {
        let cmd = step.command(self.git, self.repo, self.url);
        tracing::debug!(repository = %self.repo.display(), command = %cmd, "running git step");
        match self.runner.run(&cmd) {
            Ok(outcome) if outcome.is_success() => Ok(()),
            Ok(outcome) => Err(StepFailure {
                action: step.to_string(),
                detail: self.describe(&outcome),
            }),
            Err(err) => Err(StepFailure {
                action: step.to_string(),
                detail: err.to_string(),
            }),
        }
    }

    fn describe(&self, outcome: &CommandOutcome) -> String {
        let first_line = outcome.stderr.lines().next().unwrap_or("").trim();
        if first_line.is_empty() {
            return format!("exited with {}", outcome.status_label());
        }
        // git may echo a partial URL, so the token is also masked in the
        // percent-encoded form it takes inside the userinfo.
        let encoded_token = Url::parse(self.url.expose())
            .ok()
            .and_then(|u| u.password().map(Secret::new))
            .unwrap_or_default();
        let scrubbed = scrub(first_line, &[self.url, &encoded_token, self.token]);
        format!("exited with {} ({scrubbed})", outcome.status_label())
    }
}

fn scrub(line: &str, secrets: &[&Secret]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(line.to_string(), |acc, s| acc.replace(s.expose(), "***"))
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Run reconciliation steps 2 and 3 for one repository.
pub fn reconcile(ctx: &GitContext<'_>) -> Result<(), StepFailure> {
    if let Err(add) = ctx.run(&GitStep::AddRemote) {
        tracing::debug!(repository = %ctx.repo.display(), reason = %add, "remote add failed, updating url");
        ctx.run(&GitStep::SetRemoteUrl).map_err(|set| StepFailure {
            action: "failed to set remote".to_string(),
            detail: set.to_string(),
        })?;
    }

    for step in GitStep::refspec_steps() {
        ctx.run(&step).map_err(|failure| StepFailure {
            action: "failed to configure git".to_string(),
            detail: failure.to_string(),
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
