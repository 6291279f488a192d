//! ghmir: mirror GitHub users' and organizations' repositories to GitLab.
//!
//! # Usage
//!
//! ```text
//! ghmir --path <dir> --entities <a,b,...> [--config <file>] [--push] [--jobs <n>] [--json]
//! ```
//!
//! Without `--push` only the clone step runs.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::mirror::MirrorArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ghmir",
    version,
    about = "Mirror GitHub repositories to GitLab",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    mirror: MirrorArgs,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    cli.mirror.run()
}

/// `RUST_LOG` overrides the default `info` level. Logs go to stderr so that
/// `--json` output on stdout stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
