//! Secret paths and recipient resolution.
//!
//! A secret named `a/b/c` lives at `<store>/a/b/c.age`. Its recipients come
//! from the nearest `.recipients` file found by walking from `<store>/a/b`
//! up to, and including, the store root.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::core::constants::{CIPHERTEXT_EXT, RECIPIENTS_FILE};

/// Path of the ciphertext file for a logical secret name.
///
/// Pure join; callers validate the name first.
pub fn ciphertext_path(store: &Path, name: &str) -> PathBuf {
    store.join(format!("{}.{}", name, CIPHERTEXT_EXT))
}

/// Find the `.recipients` file governing `start`.
///
/// Checks `start` and then each ancestor while the current directory is
/// strictly inside `store`; the store root itself is the last directory
/// checked. Nearest wins. Returns `None` when no readable file is found, or
/// when `start` is not inside the store at all.
pub fn find_recipients(store: &Path, start: &Path) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        if !dir.starts_with(store) {
            return None;
        }

        let candidate = dir.join(RECIPIENTS_FILE);
        trace!(path = %candidate.display(), "checking for recipients");
        if is_readable_file(&candidate) {
            return Some(candidate);
        }

        if dir == store {
            return None;
        }
        dir = dir.parent()?;
    }
}

/// Find the `.recipients` file governing the secret `name`.
pub fn recipients_for_secret(store: &Path, name: &str) -> Option<PathBuf> {
    let path = ciphertext_path(store, name);
    let parent = path.parent()?;
    find_recipients(store, parent)
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}
