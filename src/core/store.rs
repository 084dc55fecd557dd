//! The secret store.
//!
//! The primary interface for all moss operations. Owns the store root and
//! drives the path resolver and the encryption and version-control
//! collaborators.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;
use zeroize::Zeroizing;

use crate::core::cipher::{self, Cipher};
use crate::core::config::Config;
use crate::core::constants::{self, CIPHERTEXT_EXT, RECIPIENTS_FILE};
use crate::core::git::Git;
use crate::core::paths;
use crate::core::types::SecretName;
use crate::core::validation::validate_name;
use crate::error::{Result, StoreError};

/// Snapshot printed by `moss config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub store: String,
    pub identity_file: String,
    pub git: bool,
}

/// A directory tree of age-encrypted secrets.
pub struct Store {
    root: PathBuf,
    identity_file: PathBuf,
    cipher: Box<dyn Cipher>,
    git: Git,
    commit_message: String,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("identity_file", &self.identity_file)
            .field("cipher", &self.cipher.name())
            .field("git", &self.git)
            .finish()
    }
}

impl Store {
    // --- Construction ---

    pub fn new(
        root: impl Into<PathBuf>,
        identity_file: impl Into<PathBuf>,
        cipher: Box<dyn Cipher>,
        git: Git,
    ) -> Self {
        Self {
            root: root.into(),
            identity_file: identity_file.into(),
            cipher,
            git,
            commit_message: constants::DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }

    /// Store described by a resolved configuration.
    pub fn open(config: &Config) -> Self {
        let git = Git::new(&config.settings.tools.git, &config.store);
        Self::new(
            &config.store,
            &config.identity_file,
            cipher::from_config(config),
            git,
        )
        .with_commit_message(&config.settings.commit_message)
    }

    /// Message used when committing written secrets.
    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether writes are committed to git.
    pub fn is_git_managed(&self) -> bool {
        self.git.is_managed()
    }

    /// Bootstrap a new store from an existing identity file.
    ///
    /// Derives the identity's public key, creates the store directory, copies
    /// the identity next to it (mode 0600) and writes the public key as the
    /// root `.recipients`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Creation` if the key file is unreadable or no
    /// public key can be derived from it, and `StoreError::AlreadyInitialized`
    /// if the store already has a root `.recipients`.
    pub fn create(&self, keyfile: &Path) -> Result<()> {
        if !keyfile.is_file() {
            return Err(StoreError::Creation(format!(
                "Cannot read identity at {}",
                keyfile.display()
            ))
            .into());
        }

        let root_recipients = self.root.join(RECIPIENTS_FILE);
        if root_recipients.exists() {
            return Err(StoreError::AlreadyInitialized(self.root.clone()).into());
        }

        let recipient = self.cipher.public_key(keyfile).map_err(|e| {
            StoreError::Creation(format!(
                "can't get public key from identity {}: {}",
                keyfile.display(),
                e
            ))
        })?;

        fs::create_dir_all(&self.root)?;
        self.install_identity(keyfile)?;
        fs::write(&root_recipients, format!("{}\n", recipient))?;

        info!(store = %self.root.display(), "store created");
        Ok(())
    }

    fn install_identity(&self, keyfile: &Path) -> Result<()> {
        let same_file = match (keyfile.canonicalize(), self.identity_file.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same_file {
            debug!(path = %keyfile.display(), "identity already in place");
            return Ok(());
        }

        if let Some(parent) = self.identity_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(keyfile, &self.identity_file)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.identity_file, fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.identity_file.display(), "identity installed");
        Ok(())
    }

    // --- Secrets ---

    /// Encrypt `plaintext` as secret `name`.
    ///
    /// The ciphertext is written to a temporary file beside the target and
    /// renamed into place. In a git-managed store the file is then committed;
    /// a failed commit is logged and does not fail the write.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the secret exists and
    /// `overwrite` is false, `StoreError::RecipientsNotFound` if no
    /// `.recipients` governs the name, or a `CipherError` from encryption.
    pub fn write_secret(&self, name: &str, plaintext: &[u8], overwrite: bool) -> Result<PathBuf> {
        validate_name(name)?;
        let path = paths::ciphertext_path(&self.root, name);

        if path.exists() && !overwrite {
            return Err(StoreError::AlreadyExists(path).into());
        }

        let recipients = paths::recipients_for_secret(&self.root, name)
            .ok_or_else(|| StoreError::RecipientsNotFound(name.to_string()))?;
        debug!(name, recipients = %recipients.display(), "resolved recipients");

        let ciphertext = self.cipher.encrypt(plaintext, &recipients)?;
        write_atomic(&path, &ciphertext)?;
        info!(name, path = %path.display(), "secret written");

        if self.is_git_managed() {
            self.git
                .commit_best_effort(std::slice::from_ref(&path), &self.commit_message);
        }

        Ok(path)
    }

    /// Decrypt secret `name`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no such secret, or
    /// `CipherError::DecryptionFailed` if the identity cannot open it.
    pub fn read_secret(&self, name: &str) -> Result<Zeroizing<Vec<u8>>> {
        validate_name(name)?;
        let path = paths::ciphertext_path(&self.root, name);
        if !path.is_file() {
            return Err(StoreError::NotFound(path).into());
        }

        let ciphertext = fs::read(&path)?;
        debug!(name, "reading secret");
        self.cipher.decrypt(&ciphertext, &self.identity_file)
    }

    /// Delete secret `name`. `.recipients` files are never touched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no such secret.
    pub fn remove_secret(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let path = paths::ciphertext_path(&self.root, name);
        if !path.is_file() {
            return Err(StoreError::NotFound(path).into());
        }

        fs::remove_file(&path)?;
        info!(name, "secret removed");

        if self.is_git_managed() {
            self.git
                .commit_best_effort(&[path], constants::REMOVE_COMMIT_MESSAGE);
        }
        Ok(())
    }

    /// Logical names of all secrets, sorted, optionally filtered by an
    /// unanchored regex search.
    ///
    /// Hidden files and directories (including `.git`) are skipped. A store
    /// directory that does not exist yet lists as empty.
    pub fn list_secrets(&self, pattern: Option<&Regex>) -> Result<Vec<SecretName>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != CIPHERTEXT_EXT) {
                continue;
            }
            if let Some(name) = self.logical_name(path) {
                names.push(name);
            }
        }

        if let Some(pattern) = pattern {
            names.retain(|name| pattern.is_match(name));
        }
        names.sort();
        Ok(names)
    }

    /// `<root>/a/b.age` -> `a/b`.
    fn logical_name(&self, path: &Path) -> Option<SecretName> {
        let relative = path.strip_prefix(&self.root).ok()?.with_extension("");
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }

    // --- Metadata ---

    pub fn config(&self) -> Summary {
        Summary {
            store: self.root.display().to_string(),
            identity_file: self.identity_file.display().to_string(),
            git: self.is_git_managed(),
        }
    }

    /// Run git in the store root.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotAGitRepo` unless the store is git-managed or
    /// the first argument is `init`.
    pub fn git_operation(&self, args: &[String]) -> Result<()> {
        let initializing = args.first().map(String::as_str) == Some("init");
        if !self.is_git_managed() && !initializing {
            return Err(StoreError::NotAGitRepo.into());
        }
        if initializing {
            fs::create_dir_all(&self.root)?;
        }
        self.git.run(args)
    }

    // --- Recipients ---

    /// Grant `key` access to the secrets under `dir` (the store root when
    /// `None`).
    ///
    /// The key is appended to `<dir>/.recipients`. If that file does not
    /// exist it is created, seeded with the keys of the file that governed
    /// `dir` until now. Every secret governed by the updated file is then
    /// decrypted and re-encrypted for the new recipient list.
    ///
    /// Returns the names of the re-encrypted secrets.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidRecipient` for a malformed key and any
    /// decryption error from a governed secret; nothing is rewritten if a
    /// governed secret cannot be decrypted.
    pub fn add_recipient(&self, key: &str, dir: Option<&str>) -> Result<Vec<SecretName>> {
        let key = key.trim();
        cipher::parse_recipient(key)?;

        let target = match dir {
            Some(dir) => {
                validate_name(dir)?;
                self.root.join(dir)
            }
            None => self.root.clone(),
        };
        let file = target.join(RECIPIENTS_FILE);

        let current = if file.is_file() {
            fs::read_to_string(&file)?
        } else {
            match paths::find_recipients(&self.root, &target) {
                Some(governing) => fs::read_to_string(governing)?,
                None => String::new(),
            }
        };

        if current.lines().any(|line| line.trim() == key) {
            info!(recipients = %file.display(), "recipient already present");
            return Ok(Vec::new());
        }

        let governed: Vec<SecretName> = self
            .list_secrets(None)?
            .into_iter()
            .filter(|name| {
                let secret_dir = paths::ciphertext_path(&self.root, name);
                secret_dir.starts_with(&target)
                    && paths::recipients_for_secret(&self.root, name)
                        .map_or(true, |governing| {
                            governing == file || !governing.starts_with(&target)
                        })
            })
            .collect();

        let plaintexts = governed
            .iter()
            .map(|name| Ok((name.clone(), self.read_secret(name)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut updated = current;
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(key);
        updated.push('\n');
        fs::create_dir_all(&target)?;

        // The new list only replaces the old one once every governed secret
        // has been rewritten for it.
        let mut pending = tempfile::Builder::new()
            .prefix(".moss-")
            .suffix(".tmp")
            .tempfile_in(&target)?;
        pending.write_all(updated.as_bytes())?;
        pending.as_file().sync_all()?;

        let mut changed = Vec::with_capacity(plaintexts.len() + 1);
        for (name, plaintext) in &plaintexts {
            let path = paths::ciphertext_path(&self.root, name);
            let ciphertext = self.cipher.encrypt(plaintext, pending.path())?;
            write_atomic(&path, &ciphertext)?;
            debug!(name = %name, "re-encrypted");
            changed.push(path);
        }

        pending.persist(&file).map_err(|e| e.error)?;
        info!(recipients = %file.display(), "recipient added");
        changed.push(file);

        if self.is_git_managed() {
            self.git
                .commit_best_effort(&changed, constants::SHARE_COMMIT_MESSAGE);
        }

        Ok(governed)
    }
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so readers see either the old file or the complete new one.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".moss-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
