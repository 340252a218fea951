//! Cubby - encrypted per-environment configuration for small projects.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cubby::cli::output;
use cubby::cli::{execute, Cli};
use cubby::error::Error;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("CUBBY_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cubby=debug")
        } else {
            EnvFilter::new("cubby=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::KeyFileNotFound(_) | Error::NoSecretKey | Error::SecretsFileNotFound(_) => {
                Some("run: cubby init")
            }
            Error::KeyFileExists(_) => Some("run: cubby init --force"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
