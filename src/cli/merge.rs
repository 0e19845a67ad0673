//! Merge subcommand for the collection-merge CLI
//!
//! Reconciles an edited collection document against the original copy and
//! writes the merged result.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the merge subcommand
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Original collection file, authoritative for IDs and ownership links
    #[arg(value_name = "ORIGINAL")]
    pub original: PathBuf,

    /// Modified collection file, authoritative for edited request content
    #[arg(value_name = "MODIFIED")]
    pub modified: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also remove items that no longer exist in the modified document
    #[arg(long)]
    pub prune: bool,

    /// Force gzip compression (auto-detected from .gz extension otherwise)
    #[arg(long)]
    pub gzip: bool,
}

impl MergeArgs {
    /// Determine if output should be compressed based on args and filename
    pub fn should_compress(&self) -> bool {
        // Explicit --gzip flag always wins
        if self.gzip {
            return true;
        }

        // Check if output filename ends with .gz
        self.output
            .as_ref()
            .is_some_and(|path| path.extension().is_some_and(|ext| ext == "gz"))
    }
}
