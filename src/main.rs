use anyhow::Result;
use clap::Parser;
use snap_caption::cli::{execute_caption, CaptionConfig, Cli, Commands};
use snap_caption::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Caption {
            paths,
            json,
            export_dir,
            model,
            base_url,
            timeout_secs,
            quiet,
        } => {
            execute_caption(CaptionConfig {
                paths,
                json,
                export_dir,
                model,
                base_url,
                timeout_secs,
                quiet,
            })
            .await
        }
    }
}
