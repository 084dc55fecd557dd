//! Encryption collaborator.
//!
//! moss never implements cryptography itself. A [`Cipher`] turns plaintext
//! into ciphertext for the recipients listed in a `.recipients` file, and
//! ciphertext back into plaintext using an identity file.
//!
//! ## Backends
//!
//! - **age**: Default. In-process via the `age` crate.
//! - **age-cli**: Runs the external `age` and `age-keygen` binaries, each
//!   invoked with an argument vector and judged by exit status alone.

use std::path::Path;

use zeroize::Zeroizing;

use crate::core::constants::{AGE_ARMOR_HEADER, AGE_MAGIC};
use crate::core::types::{Ciphertext, PublicKey};
use crate::error::Result;

mod age;
mod backend;
mod tool;

pub use age::{parse_identities, parse_recipient, read_recipients, Age};
pub use backend::from_config;
pub use tool::AgeCli;

/// Encryption collaborator contract.
pub trait Cipher {
    /// Encrypt `plaintext` for every recipient in `recipients_file`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if the recipients cannot be used or encryption fails.
    fn encrypt(&self, plaintext: &[u8], recipients_file: &Path) -> Result<Ciphertext>;

    /// Decrypt `ciphertext` with the identities in `identity_file`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if no identity matches or the
    /// ciphertext is corrupt.
    fn decrypt(&self, ciphertext: &[u8], identity_file: &Path) -> Result<Zeroizing<Vec<u8>>>;

    /// Derive the public key(s) of `identity_file`, one per line.
    ///
    /// Handles both plaintext and passphrase-encrypted identity files.
    fn public_key(&self, identity_file: &Path) -> Result<PublicKey>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Whether `bytes` is an age file (binary or armored), i.e. a
/// passphrase-encrypted identity rather than a plain key list.
pub fn is_age_encrypted(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let bytes = &bytes[start..];
    bytes.starts_with(AGE_MAGIC.as_bytes()) || bytes.starts_with(AGE_ARMOR_HEADER.as_bytes())
}
