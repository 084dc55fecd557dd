//! Moss - Store and retrieve encrypted secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use moss::cli::output;
use moss::cli::{execute, Cli};
use moss::core::constants::env;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(env::LOG).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("moss=debug")
        } else {
            EnvFilter::new("moss=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    // Nothing moss creates should be readable by group or others.
    #[cfg(unix)]
    unsafe {
        libc::umask(0o077);
    }

    if let Err(e) = execute(cli) {
        output::error(&e);
        std::process::exit(1);
    }
}
