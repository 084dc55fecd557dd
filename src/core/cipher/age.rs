//! In-process age backend.
//!
//! Ciphertext is ASCII-armored, identities are x25519 (`AGE-SECRET-KEY-1...`)
//! and recipients are x25519 public keys (`age1...`).

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use ::age::secrecy::SecretString;
use ::age::x25519;
use dialoguer::Password;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{is_age_encrypted, Cipher};
use crate::core::types::{Ciphertext, PublicKey};
use crate::error::{CipherError, Result};

/// age via the `age` crate.
#[derive(Default)]
pub struct Age {
    passphrase: Option<Zeroizing<String>>,
}

impl Age {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `passphrase` for encrypted identity files instead of prompting.
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Some(Zeroizing::new(passphrase.into())),
        }
    }

    fn passphrase_for(&self, identity_file: &Path) -> Result<Zeroizing<String>> {
        if let Some(passphrase) = &self.passphrase {
            return Ok(passphrase.clone());
        }
        let entered = Password::new()
            .with_prompt(format!("Passphrase for {}", identity_file.display()))
            .interact()
            .map_err(|e| CipherError::InvalidIdentity(format!("passphrase prompt failed: {}", e)))?;
        Ok(Zeroizing::new(entered))
    }

    /// Plaintext contents of an identity file, unlocking it if encrypted.
    fn identity_text(&self, identity_file: &Path) -> Result<Zeroizing<String>> {
        let raw = Zeroizing::new(fs::read(identity_file).map_err(|e| {
            CipherError::InvalidIdentity(format!("{}: {}", identity_file.display(), e))
        })?);

        let bytes = if is_age_encrypted(&raw) {
            debug!(path = %identity_file.display(), "identity is passphrase-encrypted");
            let passphrase = self.passphrase_for(identity_file)?;
            unlock(&raw, &passphrase)?
        } else {
            raw
        };

        let text = std::str::from_utf8(&bytes).map_err(|_| {
            CipherError::InvalidIdentity(format!("{} is not valid UTF-8", identity_file.display()))
        })?;
        Ok(Zeroizing::new(text.to_string()))
    }

    fn load_identities(&self, identity_file: &Path) -> Result<Vec<x25519::Identity>> {
        let text = self.identity_text(identity_file)?;
        parse_identities(&text).map_err(|e| match e {
            crate::error::Error::Cipher(CipherError::InvalidIdentity(reason)) => {
                CipherError::InvalidIdentity(format!("{}: {}", identity_file.display(), reason))
                    .into()
            }
            other => other,
        })
    }
}

impl Cipher for Age {
    fn name(&self) -> &'static str {
        "age"
    }

    fn encrypt(&self, plaintext: &[u8], recipients_file: &Path) -> Result<Ciphertext> {
        let recipients = read_recipients(recipients_file)?;
        trace!(
            recipients = recipients.len(),
            plaintext_len = plaintext.len(),
            "encrypting"
        );

        let encryptor =
            ::age::Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn ::age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(::age::armor::ArmoredWriter::wrap_output(
                &mut encrypted,
                ::age::armor::Format::AsciiArmor,
            )?)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        writer.write_all(plaintext)?;
        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");
        Ok(encrypted)
    }

    fn decrypt(&self, ciphertext: &[u8], identity_file: &Path) -> Result<Zeroizing<Vec<u8>>> {
        // An unusable identity means the secret cannot be decrypted, the same
        // outcome the external tool reports.
        let identities = self.load_identities(identity_file).map_err(|e| match e {
            crate::error::Error::Cipher(CipherError::InvalidIdentity(reason)) => {
                CipherError::DecryptionFailed(reason).into()
            }
            other => other,
        })?;
        trace!(
            ciphertext_len = ciphertext.len(),
            identities = identities.len(),
            "decrypting"
        );

        let decryptor = ::age::Decryptor::new(::age::armor::ArmoredReader::new(ciphertext))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;
        let mut reader = decryptor
            .decrypt(identities.iter().map(|i| i as &dyn ::age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut plaintext = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        trace!(plaintext_len = plaintext.len(), "decrypted");
        Ok(plaintext)
    }

    fn public_key(&self, identity_file: &Path) -> Result<PublicKey> {
        let identities = self.load_identities(identity_file)?;
        Ok(identities
            .iter()
            .map(|i| i.to_public().to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Decrypt a passphrase-encrypted identity file.
fn unlock(encrypted: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let decryptor = ::age::Decryptor::new(::age::armor::ArmoredReader::new(encrypted))
        .map_err(|e| CipherError::InvalidIdentity(e.to_string()))?;
    if !decryptor.is_scrypt() {
        return Err(CipherError::InvalidIdentity(
            "identity file is encrypted to a recipient, not a passphrase".to_string(),
        )
        .into());
    }

    let identity = ::age::scrypt::Identity::new(SecretString::from(passphrase.to_string()));
    let mut reader = decryptor
        .decrypt(std::iter::once(&identity as &dyn ::age::Identity))
        .map_err(|e| CipherError::InvalidIdentity(format!("wrong passphrase? {}", e)))?;

    let mut plaintext = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut plaintext)
        .map_err(|e| CipherError::InvalidIdentity(e.to_string()))?;
    Ok(plaintext)
}

/// Parse the `AGE-SECRET-KEY-1...` lines of an identity file.
///
/// Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns `CipherError::InvalidIdentity` for an unparseable line or a file
/// without any key.
pub fn parse_identities(text: &str) -> Result<Vec<x25519::Identity>> {
    let mut identities = Vec::new();
    for (number, line) in significant_lines(text) {
        let identity = line.parse::<x25519::Identity>().map_err(|_| {
            CipherError::InvalidIdentity(format!("line {} is not an age identity", number))
        })?;
        identities.push(identity);
    }
    if identities.is_empty() {
        return Err(CipherError::InvalidIdentity("no identities found".to_string()).into());
    }
    Ok(identities)
}

/// Parse a public key string into an age recipient.
///
/// # Errors
///
/// Returns `CipherError::InvalidRecipient` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.trim()
        .parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidRecipient(key.to_string()).into())
}

/// Read every recipient in a `.recipients` file.
///
/// # Errors
///
/// Returns `CipherError::InvalidRecipient` for a malformed entry and
/// `CipherError::NoRecipients` if the file lists nobody.
pub fn read_recipients(path: &Path) -> Result<Vec<x25519::Recipient>> {
    let text = fs::read_to_string(path)?;
    let recipients = significant_lines(&text)
        .map(|(_, line)| parse_recipient(line))
        .collect::<Result<Vec<_>>>()?;
    if recipients.is_empty() {
        return Err(CipherError::NoRecipients(path.to_path_buf()).into());
    }
    Ok(recipients)
}

fn significant_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}
