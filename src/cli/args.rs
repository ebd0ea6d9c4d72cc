use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snap_caption")]
#[command(about = "Generate social media captions for a batch of photos")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Caption image files and directories in one batch
    Caption {
        /// Image files or directories (searched recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the final collection as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write `<id>.<ext>` and `<id>.txt` for every captioned photo
        #[arg(short, long)]
        export_dir: Option<PathBuf>,

        /// Gemini model name (overrides SNAP_CAPTION_MODEL)
        #[arg(short, long)]
        model: Option<String>,

        /// API base URL (overrides SNAP_CAPTION_BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds, 0 disables it (overrides SNAP_CAPTION_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
}
