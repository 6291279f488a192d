//! Test doubles: an in-memory git that tracks remote/config state per
//! repository path, and a recording notifier.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ghmir_core::{DestinationConfig, EntityName, EntityType, Secret, ValidatedEntity};

use crate::command::{CommandOutcome, CommandRunner, ExternalCommand};
use crate::error::{MirrorError, NotifyError};
use crate::notify::Notifier;

pub fn destination(token_name: &str, token: &str, group: &str) -> DestinationConfig {
    DestinationConfig {
        token_name: token_name.into(),
        token: Secret::from(token),
        group_name: group.into(),
        host: None,
    }
}

pub fn entity(name: &str, entity_type: EntityType) -> ValidatedEntity {
    ValidatedEntity {
        name: EntityName::from(name),
        entity_type,
        source_token: Secret::from("ghp_source"),
        destination: destination("mirror-bot", "glpat-dest", &format!("{name}-mirror")),
    }
}

/// Remote and config state of one simulated repository.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepoState {
    pub remotes: BTreeMap<String, String>,
    pub config: BTreeMap<String, Vec<String>>,
}

impl RepoState {
    pub fn config_values(&self, key: &str) -> Vec<&str> {
        self.config
            .get(key)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl RecordedCall {
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

struct FailureRule {
    repo_dir: Option<String>,
    prefix: Vec<String>,
    stderr: String,
}

#[derive(Default)]
struct FakeState {
    repos: HashMap<PathBuf, RepoState>,
    calls: Vec<RecordedCall>,
    rules: Vec<FailureRule>,
}

/// Simulates the subset of `git` the mirror uses; any other program
/// (e.g. `ghorg`) succeeds unless a failure rule matches it.
#[derive(Default)]
pub struct FakeGit {
    state: Mutex<FakeState>,
}

impl FakeGit {
    pub fn fail_when(&self, prefix: &[&str]) {
        self.fail_with_stderr(prefix, "error: simulated failure");
    }

    pub fn fail_with_stderr(&self, prefix: &[&str], stderr: &str) {
        self.push_rule(None, prefix, stderr);
    }

    /// Fail commands matching `prefix` whose working directory is named `repo_dir`.
    pub fn fail_in_repo(&self, repo_dir: &str, prefix: &[&str]) {
        self.push_rule(Some(repo_dir.to_string()), prefix, "error: simulated failure");
    }

    fn push_rule(&self, repo_dir: Option<String>, prefix: &[&str], stderr: &str) {
        self.state.lock().unwrap().rules.push(FailureRule {
            repo_dir,
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            stderr: stderr.to_string(),
        });
    }

    pub fn seed_config(&self, repo: &Path, key: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .repos
            .entry(repo.to_path_buf())
            .or_default()
            .config
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn repo_state(&self, repo: &Path) -> RepoState {
        self.state
            .lock()
            .unwrap()
            .repos
            .get(repo)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_matching(&self, repo: &Path, prefix: &[&str]) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.cwd.as_deref() == Some(repo) && c.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for FakeGit {
    fn run(&self, command: &ExternalCommand) -> Result<CommandOutcome, MirrorError> {
        let args = command.arg_values();
        let call = RecordedCall {
            program: command.program.clone(),
            args: args.clone(),
            cwd: command.cwd.clone(),
        };

        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());

        let dir_name = command
            .cwd
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned());
        let forced = state.rules.iter().find(|rule| {
            let prefix: Vec<&str> = rule.prefix.iter().map(String::as_str).collect();
            let repo_ok = match &rule.repo_dir {
                Some(dir) => dir_name.as_deref() == Some(dir.as_str()),
                None => true,
            };
            repo_ok && call.starts_with(&prefix)
        });
        if let Some(rule) = forced {
            return Ok(CommandOutcome::failure(1, rule.stderr.clone()));
        }

        if command.program != "git" {
            return Ok(CommandOutcome::success());
        }
        let Some(cwd) = command.cwd.clone() else {
            return Ok(CommandOutcome::failure(128, "fatal: not a git repository"));
        };
        let repo = state.repos.entry(cwd).or_default();
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();

        let outcome = match argv.as_slice() {
            ["remote", "add", name, url] => {
                if repo.remotes.contains_key(*name) {
                    CommandOutcome::failure(3, format!("error: remote {name} already exists."))
                } else {
                    repo.remotes.insert(name.to_string(), url.to_string());
                    CommandOutcome::success()
                }
            }
            ["remote", "set-url", name, url] => match repo.remotes.get_mut(*name) {
                Some(existing) => {
                    *existing = url.to_string();
                    CommandOutcome::success()
                }
                None => CommandOutcome::failure(2, format!("error: No such remote '{name}'")),
            },
            ["config", "--local", "--replace-all", key, value] => {
                repo.config.insert(key.to_string(), vec![value.to_string()]);
                CommandOutcome::success()
            }
            ["config", "--local", "--add", key, value] => {
                repo.config
                    .entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
                CommandOutcome::success()
            }
            ["push", "--mirror", name] => {
                if repo.remotes.contains_key(*name) {
                    CommandOutcome::success()
                } else {
                    CommandOutcome::failure(128, format!("fatal: '{name}' does not appear to be a git repository"))
                }
            }
            _ => CommandOutcome::failure(129, "usage: unsupported by fake"),
        };
        Ok(outcome)
    }
}

/// Records every message; optionally fails delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            Err(NotifyError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}
