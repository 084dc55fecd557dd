//! Terminal messages.
//!
//! Everything here goes to stderr; stdout carries only secret material and
//! command output. Styling comes from `console`, which honours `NO_COLOR`
//! and drops colour when stderr is not a terminal.

use console::style;

use crate::error::Error;

/// `✓ msg` in green.
pub fn success(msg: &str) {
    eprintln!("{} {}", style("✓").green().for_stderr(), msg);
}

/// Report an error on a single line.
///
/// Usage errors already read as complete sentences and are printed as is;
/// everything else gets a `moss:` prefix.
pub fn error(err: &Error) {
    eprintln!("{}", style(format_error(err)).red().for_stderr());
}

pub fn format_error(err: &Error) -> String {
    let message = match err {
        Error::Usage(message) => message.clone(),
        other => format!("moss: {}", other),
    };
    message.replace('\n', " ")
}
