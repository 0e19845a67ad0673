//! Collection Merge CLI
//!
//! Applies external edits to an API-collection document without discarding
//! the internal bookkeeping (database IDs, parent links, creation timestamps)
//! that only the original copy holds authoritatively.

use anyhow::Result;
use clap::Parser;
use collection_merge::cli::merge::MergeArgs;
use collection_merge::cli::{Cli, Command};
use collection_merge::collection::Collection;
use std::fs::OpenOptions;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Command::Merge(args) => run_merge(args),
    }
}

/// Run the merge command
fn run_merge(args: MergeArgs) -> Result<()> {
    let original = Collection::from_file(&args.original)?;
    let modified = Collection::from_file(&args.modified)?;

    info!(
        "Merging {} ({} folders, {} requests) with edits from {} ({} folders, {} requests)",
        args.original.display(),
        original.folder_count(),
        original.request_count(),
        args.modified.display(),
        modified.folder_count(),
        modified.request_count()
    );

    let mut merged = original.merged_with(&modified);

    if args.prune {
        merged = merged.pruned_against(&modified);
        info!("Pruned items no longer present in the modified document");
    }

    info!(
        "Merged result: {} folders, {} requests",
        merged.folder_count(),
        merged.request_count()
    );

    match args.output {
        Some(ref path) => {
            merged.write_to_file(path, args.should_compress())?;
            eprintln!("Merged collection written to {}", path.display());
        }
        None => {
            print!("{}", merged.to_json_pretty()?);
        }
    }

    Ok(())
}
