use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use voices::{run_batch, write_run_stats, Manifest, PipelineOptions};

#[derive(Parser, Debug)]
#[command(name = "voices")]
#[command(about = "Speaker-tagged sentence tables from prose and script manuscripts")]
#[command(version)]
struct Args {
    /// TOML manifest listing the manuscripts to process
    manifest: PathBuf,

    /// Abort on first failed manuscript
    #[arg(long)]
    fail_fast: bool,

    /// Reject character map ids that do not exist in the sentence table
    #[arg(long)]
    strict_merge: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting voices");
    info!(?args, "Parsed CLI arguments");

    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;

    let options = PipelineOptions {
        fail_fast: args.fail_fast,
        strict_merge: args.strict_merge,
        show_progress: !args.no_progress,
    };

    let run_stats = run_batch(&manifest, &options).await?;
    write_run_stats(&args.stats_out, &run_stats).await?;

    println!("voices v{} - batch complete", env!("CARGO_PKG_VERSION"));
    println!("  Processed: {} manuscripts", run_stats.manuscripts_processed);
    if run_stats.manuscripts_skipped > 0 {
        println!("  Skipped (missing or unreadable input): {}", run_stats.manuscripts_skipped);
    }
    if run_stats.manuscripts_failed > 0 {
        println!("  Failed: {}", run_stats.manuscripts_failed);
    }
    if run_stats.manuscripts_needing_review > 0 {
        println!(
            "  Needing review (odd quote count): {}",
            run_stats.manuscripts_needing_review
        );
    }
    for stats in &run_stats.manuscripts {
        println!("  {} [{}]: {} sentences", stats.name, stats.status, stats.sentences);
        for (speaker, count) in stats.speaker_summary() {
            println!("    {speaker}: {count}");
        }
    }
    println!("  Stats written to {}", args.stats_out.display());

    info!("Run complete in {}ms", run_stats.total_processing_time_ms);
    Ok(())
}
