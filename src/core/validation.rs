//! Input validation for store operations.
//!
//! Secret names are joined onto the store root to form file paths, so they
//! are restricted to a subset that can never leave the store or collide with
//! the store's own metadata files.

use crate::error::{Result, ValidationError};

/// Validate a logical secret name.
///
/// A valid name:
/// - is not empty
/// - has no leading or trailing `/` and no empty segments
/// - has no segment starting with `.` (rules out `.`, `..`, `.git`, `.recipients`)
/// - contains no backslash or NUL
///
/// # Errors
///
/// Returns `ValidationError` describing the first violated rule.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    let invalid = |reason: &str| -> crate::error::Error {
        ValidationError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    if name.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }
    if name.contains('\\') {
        return Err(invalid("backslashes are not allowed"));
    }
    if name.starts_with('/') {
        return Err(invalid("must be relative to the store"));
    }
    if name.ends_with('/') {
        return Err(invalid("cannot end with '/'"));
    }

    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(invalid("contains an empty path segment"));
        }
        if segment.starts_with('.') {
            return Err(invalid(&format!(
                "segment '{}' starts with '.'",
                segment
            )));
        }
    }

    Ok(())
}
