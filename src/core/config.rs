//! Configuration resolution.
//!
//! Paths come from the environment; tool choices come from an optional
//! `config.toml` in the instance root:
//!
//! ```toml
//! cipher = "age-cli"          # or "age" (default, in-process)
//! commit_message = "new secret"
//!
//! [tools]
//! age = "/usr/local/bin/age"
//! age_keygen = "age-keygen"
//! git = "git"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::{self, env};
use crate::error::{ConfigError, Result};

/// Which encryption collaborator performs age operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherKind {
    /// In-process, using the `age` crate.
    #[default]
    Age,
    /// External `age` and `age-keygen` binaries.
    AgeCli,
}

/// External binaries used by the subprocess collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub age: String,
    pub age_keygen: String,
    pub git: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            age: "age".to_string(),
            age_keygen: "age-keygen".to_string(),
            git: "git".to_string(),
        }
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cipher: CipherKind,
    pub commit_message: String,
    pub tools: Tools,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cipher: CipherKind::default(),
            commit_message: constants::DEFAULT_COMMIT_MESSAGE.to_string(),
            tools: Tools::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "loading settings");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(settings)
    }
}

/// Resolved configuration for one invocation.
pub struct Config {
    /// Instance root: holds the identity file and the store.
    pub home: PathBuf,
    /// Store root: holds ciphertexts and `.recipients` files.
    pub store: PathBuf,
    /// Private key used for decryption.
    pub identity_file: PathBuf,
    /// Editor command line for `moss edit`.
    pub editor: String,
    /// Passphrase for an encrypted identity file, if supplied non-interactively.
    pub passphrase: Option<Zeroizing<String>>,
    pub settings: Settings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("home", &self.home)
            .field("store", &self.store)
            .field("identity_file", &self.identity_file)
            .field("editor", &self.editor)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("settings", &self.settings)
            .finish()
    }
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// `home` is the `--home`/`MOSS_HOME` value already parsed by the CLI.
    pub fn from_env(home: Option<PathBuf>) -> Result<Self> {
        Self::resolve(home, |key| std::env::var(key).ok())
    }

    /// Resolve configuration using `lookup` for environment variables.
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHome` if no instance root can be derived, or a
    /// settings error if `config.toml` is malformed.
    pub fn resolve<F>(home: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let home = match home.or_else(|| var(env::HOME).map(PathBuf::from)) {
            Some(home) => home,
            None => default_home(&var)?,
        };

        let store = var(env::STORE)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(constants::STORE_DIR));
        let identity_file = var(env::IDENTITY_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(constants::IDENTITY_FILE));
        let editor = var(env::EDITOR)
            .or_else(|| var(env::VISUAL))
            .unwrap_or_else(|| constants::FALLBACK_EDITOR.to_string());
        let passphrase = var(env::PASSPHRASE).map(Zeroizing::new);

        let settings = Settings::load(&home.join(constants::SETTINGS_FILE))?;

        debug!(
            home = %home.display(),
            store = %store.display(),
            identity = %identity_file.display(),
            cipher = ?settings.cipher,
            "configuration resolved"
        );

        Ok(Self {
            home,
            store,
            identity_file,
            editor,
            passphrase,
            settings,
        })
    }
}

/// `$XDG_DATA_HOME/moss`, else `$HOME/.local/share/moss`.
fn default_home<F>(var: &F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(data) = var(env::XDG_DATA_HOME) {
        return Ok(PathBuf::from(data).join(constants::APP_DIR));
    }
    let user_home = var("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoHome)?;
    Ok(user_home
        .join(".local")
        .join("share")
        .join(constants::APP_DIR))
}
