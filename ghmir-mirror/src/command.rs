//! External command seam.
//!
//! Every invocation of `ghorg` or `git` is described by an
//! [`ExternalCommand`] and executed through a [`CommandRunner`]. Commands
//! carry their own working directory; the process working directory is
//! never changed. Credential-bearing arguments are held as [`Secret`]s and
//! masked whenever a command is displayed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use ghmir_core::Secret;

use crate::error::MirrorError;

// ---------------------------------------------------------------------------
// Command description
// ---------------------------------------------------------------------------

/// One command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    Plain(String),
    /// `prefix` is shown, `secret` is masked.
    Sensitive { prefix: String, secret: Secret },
}

impl CommandArg {
    /// The value actually passed to the program.
    pub fn value(&self) -> String {
        match self {
            CommandArg::Plain(s) => s.clone(),
            CommandArg::Sensitive { prefix, secret } => format!("{prefix}{}", secret.expose()),
        }
    }
}

impl fmt::Display for CommandArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandArg::Plain(s) => f.write_str(s),
            CommandArg::Sensitive { prefix, secret } => write!(f, "{prefix}{secret}"),
        }
    }
}

/// How the child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Captured; stderr is returned in [`CommandOutcome`].
    #[default]
    Capture,
    /// Streamed to the operator's terminal.
    Inherit,
}

/// A fully described external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<CommandArg>,
    pub cwd: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
    pub output: OutputMode,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
            output: OutputMode::Capture,
        }
    }

    /// A `git` command that never prompts for credentials.
    pub fn git(program: impl Into<String>, repo: &Path) -> Self {
        Self::new(program)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(CommandArg::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| CommandArg::Plain(a.into())));
        self
    }

    pub fn sensitive_arg(mut self, prefix: impl Into<String>, secret: Secret) -> Self {
        self.args.push(CommandArg::Sensitive {
            prefix: prefix.into(),
            secret,
        });
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }

    /// Argument values as passed to the program (secrets included).
    pub fn arg_values(&self) -> Vec<String> {
        self.args.iter().map(CommandArg::value).collect()
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Exit information for a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured stderr (empty in [`OutputMode::Inherit`]).
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// `"status 128"` or `"signal"`, for failure reasons.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("status {code}"),
            None => "signal".to_string(),
        }
    }
}

/// Runs external commands. Implementations must be shareable across the
/// repository worker pool.
pub trait CommandRunner: Send + Sync {
    /// Run to completion. `Err` only when the program could not be started.
    fn run(&self, command: &ExternalCommand) -> Result<CommandOutcome, MirrorError>;
}

/// Runs commands with [`std::process::Command`]. Blocking, no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<CommandOutcome, MirrorError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(command.arg_values());
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.envs {
            cmd.env(key, value);
        }

        let spawn_err = |source| MirrorError::Spawn {
            program: command.program.clone(),
            source,
        };

        match command.output {
            OutputMode::Capture => {
                let output = cmd.stdin(Stdio::null()).output().map_err(spawn_err)?;
                Ok(CommandOutcome {
                    code: output.status.code(),
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
            OutputMode::Inherit => {
                let status = cmd.status().map_err(spawn_err)?;
                Ok(CommandOutcome {
                    code: status.code(),
                    stderr: String::new(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
