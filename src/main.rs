//! `yt-resolver` binary
//!
//! Resolves YouTube links from the command line and prints the result as JSON
//! on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! yt-resolver details https://youtu.be/dQw4w9WgXcQ
//! yt-resolver playlist PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI --video-id --limit 10
//! yt-resolver download dQw4w9WgXcQ --video-id --kind video
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

use yt_resolver::{
    YouTubeResolver,
    cli::{self, Command},
    config::ConfigLoader,
    utils::VERSION,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "yt-resolver")]
#[command(disable_version_flag = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Show version information
    #[arg(long)]
    version: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Handle version flag early
    if cli.version {
        println!("{}", VERSION);
        return Ok(());
    }

    let Some(command) = cli.command else {
        eprintln!("No command given. Run `yt-resolver --help` for usage.");
        std::process::exit(2);
    };

    let mut settings = ConfigLoader::new().load(cli.config.as_deref())?;
    if cli.verbose {
        settings.logging.verbose = true;
    }
    cli::init_logging(&settings.logging);

    debug!("Running {:?}", command);

    let resolver = YouTubeResolver::new(settings)?;

    match cli::run_command(&resolver, command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string(&output.json)?);
            if !output.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
