//! Command-line front end
//!
//! Contains the subcommands of the `yt-resolver` binary and its logging setup.

pub mod commands;

pub use commands::{Command, CommandOutput, run_command};

use crate::config::settings::LoggingSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `debug` when verbose, else the configured level.
pub fn init_logging(settings: &LoggingSettings) {
    let default_filter = if settings.verbose {
        "debug"
    } else {
        settings.level.as_str()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
