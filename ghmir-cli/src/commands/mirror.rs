//! `ghmir --path <dir> --entities <csv> [--push]`: clone, then mirror.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use ghmir_core::config;
use ghmir_mirror::coordinator::{self, DEFAULT_CLONE_PROGRAM, DEFAULT_GIT_PROGRAM};
use ghmir_mirror::{RunConfig, RunReport};

/// Arguments for a mirror run.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// File containing configurations and secrets
    /// [default: $HOME/.config/ghmir/config.yaml]. Environment variables are expanded.
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Backup directory path; created if absent. Environment variables are expanded.
    #[arg(long, value_name = "DIR")]
    pub path: String,

    /// Comma-separated list of entities to mirror.
    #[arg(long, value_name = "NAMES")]
    pub entities: String,

    /// Push to GitLab after cloning.
    #[arg(long)]
    pub push: bool,

    /// Repositories mirrored concurrently per entity.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,

    /// Cloning tool executable.
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_CLONE_PROGRAM)]
    pub ghorg_bin: String,

    /// git executable.
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_GIT_PROGRAM)]
    pub git_bin: String,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl MirrorArgs {
    pub fn run(self) -> Result<()> {
        let entities = config::parse_entity_list(&self.entities).context("invalid --entities")?;
        let backup_root = PathBuf::from(config::expand_env(&self.path));
        if backup_root.as_os_str().is_empty() {
            bail!("--path must not be empty (got '{}')", self.path);
        }

        let config_path = match self.config.as_deref() {
            Some(raw) => PathBuf::from(config::expand_env(raw)),
            None => config::default_config_path().context("cannot locate default config")?,
        };
        let cfg = config::load_config_at(&config_path).context("failed to load config")?;
        if let Some(configured) = cfg.backup_dir.as_ref() {
            if configured != &backup_root {
                tracing::debug!(
                    configured = %configured.display(),
                    path = %backup_root.display(),
                    "--path overrides backup_dir from config"
                );
            }
        }

        let run_config = RunConfig {
            backup_root,
            entities,
            notify_endpoint: cfg.webhook().map(str::to_string),
            push: self.push,
            jobs: usize::from(self.jobs),
            clone_program: self.ghorg_bin,
            git_program: self.git_bin,
        };

        let report = coordinator::run_with_system(&run_config, &cfg).context("mirror run failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render run report JSON")?
            );
        } else {
            print_table(&report, run_config.push);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "entity")]
    entity: String,
    #[tabled(rename = "clone")]
    clone: String,
    #[tabled(rename = "repositories")]
    total: String,
    #[tabled(rename = "failed")]
    failed: String,
    #[tabled(rename = "detail")]
    detail: String,
}

fn print_table(report: &RunReport, push: bool) {
    let rows: Vec<ReportRow> = report
        .entities
        .iter()
        .map(|e| {
            let clone = if e.cloned {
                "ok".green().bold().to_string()
            } else {
                "failed".red().bold().to_string()
            };
            let (total, failed, detail) = match (&e.batch, &e.error) {
                (Some(batch), _) => (
                    batch.total.to_string(),
                    if batch.failures() == 0 {
                        "0".green().to_string()
                    } else {
                        batch.failures().to_string().red().to_string()
                    },
                    batch.failed_names.join(", "),
                ),
                (None, Some(err)) => ("-".into(), "-".into(), err.clone()),
                (None, None) if !push => ("-".into(), "-".into(), "push disabled".into()),
                (None, None) => ("-".into(), "-".into(), String::new()),
            };
            ReportRow {
                entity: e.entity.to_string(),
                clone,
                total,
                failed,
                detail,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
