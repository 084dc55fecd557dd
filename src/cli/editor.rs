//! External editor on a scoped temporary file.

use std::fs;
use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::FALLBACK_EDITOR;
use crate::error::{Error, Result};

/// Temp file prefix for secret `name`: its word characters only.
pub fn temp_prefix(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Write `plaintext` to a temporary file, open it in `editor` and return
/// the file's contents once the editor exits cleanly.
///
/// `editor` is split on whitespace, so `code --wait` works. The temporary
/// file is overwritten with zeros and removed on every path out.
///
/// # Errors
///
/// Returns `Error::Editor` if the editor cannot be launched or exits
/// non-zero.
pub fn edit(editor: &str, name: &str, plaintext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or(FALLBACK_EDITOR);
    let args: Vec<&str> = words.collect();

    let mut file = tempfile::Builder::new()
        .prefix(&temp_prefix(name))
        .tempfile()?;
    file.write_all(plaintext)?;
    file.flush()?;

    debug!(editor = program, path = %file.path().display(), "launching editor");
    let status = Command::new(program)
        .args(&args)
        .arg(file.path())
        .status()
        .map_err(|e| Error::Editor(format!("failed to launch '{}': {}", program, e)));

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            wipe(file);
            return Err(e);
        }
    };

    if !status.success() {
        wipe(file);
        return Err(Error::Editor(match status.code() {
            Some(code) => format!("{} exited with status {}", program, code),
            None => format!("{} terminated by signal", program),
        }));
    }

    let edited = fs::read(file.path())
        .map(Zeroizing::new)
        .map_err(|e| Error::Editor(format!("failed to read edited file: {}", e)));
    wipe(file);
    edited
}

/// Overwrite the file with zeros before it is removed. Best-effort.
fn wipe(file: NamedTempFile) {
    if let Ok(metadata) = fs::metadata(file.path()) {
        let zeros = vec![0u8; metadata.len() as usize];
        let _ = fs::write(file.path(), zeros);
    }
    let _ = file.close();
}
