//! unasync CLI: regenerate or check the blocking Tideline mirror.
//!
//! Logging: set `RUST_LOG=unasync=debug` (or `warn`) to adjust stderr output.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use unasync_emit::{DEFAULT_SOURCE_ROOT, EmitConfig, Emitter};
use unasync_rewrite::RenameTable;

#[derive(Parser)]
#[command(name = "unasync")]
#[command(about = "Regenerate the blocking mirror package from its async sources.")]
struct Cli {
    /// Async package directory.
    #[arg(default_value = DEFAULT_SOURCE_ROOT)]
    source_root: PathBuf,

    /// Compare the mirror with its sources instead of writing it.
    #[arg(long)]
    check: bool,

    /// Log per-file rule counts.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "unasync=debug"
        } else {
            "unasync=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if !cli.source_root.is_dir() {
        bail!("source root {} is not a directory", cli.source_root.display());
    }
    let table = RenameTable::builtin().context("built-in rename tables are invalid")?;
    let config = EmitConfig::load(&cli.source_root);
    let emitter = Emitter::new(config, table);

    if cli.check {
        let report = emitter
            .check()
            .with_context(|| format!("checking {}", cli.source_root.display()))?;
        for diff in &report.diffs {
            print!("{diff}");
        }
        for extra in &report.extra {
            println!("extra file in mirror: {}", extra.display());
        }
        if !report.is_current() {
            bail!(
                "mirror is stale: {} changed, {} missing, {} extra",
                report.stale.len(),
                report.missing.len(),
                report.extra.len()
            );
        }
        return Ok(());
    }

    let report = emitter
        .emit()
        .with_context(|| format!("regenerating {}", cli.source_root.display()))?;
    println!(
        "converted {} files ({} written) into {}",
        report.converted,
        report.written,
        report.mirror.display()
    );
    Ok(())
}
