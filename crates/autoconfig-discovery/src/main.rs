//! `autoconfig-scan`: the discovery pass as a build-pipeline command.
//!
//! Scans the given source roots for marker attributes and writes the merged
//! registration artifact, or with `--check` verifies that the committed
//! artifact is still byte-identical to a fresh scan.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autoconfig_discovery::scan;

#[derive(Debug, Parser)]
#[command(name = "autoconfig-scan", version, about)]
struct Cli {
    /// Source roots (files or directories) to scan.
    #[arg(default_value = ".")]
    roots: Vec<PathBuf>,

    /// Path of the registration artifact.
    #[arg(short, long, default_value = "autoconfig.json")]
    output: PathBuf,

    /// Verify the existing artifact matches a fresh scan instead of writing.
    #[arg(long)]
    check: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autoconfig_discovery=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let artifact = scan(&cli.roots)?;
    let bytes = artifact.to_bytes()?;

    if cli.check {
        let existing = std::fs::read(&cli.output).with_context(|| {
            format!(
                "cannot read {} for --check; run without --check first",
                cli.output.display()
            )
        })?;
        if existing != bytes {
            bail!(
                "{} is stale: a fresh scan produced different contents",
                cli.output.display()
            );
        }
        info!(path = %cli.output.display(), "artifact is up to date");
    } else {
        std::fs::write(&cli.output, &bytes)
            .with_context(|| format!("cannot write {}", cli.output.display()))?;
        info!(
            path = %cli.output.display(),
            entries = artifact.entries.len(),
            "wrote registration artifact"
        );
    }

    Ok(())
}
