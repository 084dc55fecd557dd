//! Command-line interface.
//!
//! clap handles the global options; everything from the command word on is
//! handed to the [`dispatch::Dispatcher`] and bound against the command
//! table in [`commands`].

pub mod binder;
pub mod commands;
pub mod dispatch;
pub mod editor;
pub mod output;
pub mod registry;
pub mod session;

use std::path::PathBuf;

use clap::Parser;

use crate::core::config::Config;
use crate::error::Result;

use self::dispatch::Dispatcher;
use self::session::Session;

/// Moss - Store and retrieve encrypted secrets.
#[derive(Parser, Debug)]
#[command(
    name = "moss",
    about = "Store and retrieve encrypted secrets",
    version,
    after_help = "Run `moss help` for the list of commands."
)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Instance directory holding the identity and the store
    #[arg(long, env = "MOSS_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Command and its parameters
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub args: Vec<String>,
}

/// Resolve configuration and run the command line.
pub fn execute(cli: Cli) -> Result<()> {
    let home = cli.home.filter(|h| !h.as_os_str().is_empty());
    let config = Config::from_env(home)?;
    let mut session = Session::new(config);
    Dispatcher::new(commands::registry()).dispatch(&mut session, &cli.args)
}
