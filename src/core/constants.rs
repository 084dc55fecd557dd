//! Constants used throughout moss.
//!
//! Centralizes file names, environment variables and defaults.

/// Extension of every ciphertext file.
pub const CIPHERTEXT_EXT: &str = "age";

/// Recipient list file name, looked up from a secret's directory upward.
pub const RECIPIENTS_FILE: &str = ".recipients";

/// Store directory name under the instance root.
pub const STORE_DIR: &str = "store";

/// Identity file name under the instance root.
pub const IDENTITY_FILE: &str = "identity";

/// Optional settings file under the instance root.
pub const SETTINGS_FILE: &str = "config.toml";

/// Directory name under `$XDG_DATA_HOME` used when no root is configured.
pub const APP_DIR: &str = "moss";

/// Commit message for secrets written to a git-managed store.
pub const DEFAULT_COMMIT_MESSAGE: &str = "new secret";

/// Commit message for secrets removed from a git-managed store.
pub const REMOVE_COMMIT_MESSAGE: &str = "remove secret";

/// Commit message after re-encrypting for an added recipient.
pub const SHARE_COMMIT_MESSAGE: &str = "add recipient";

/// Editor used when neither `EDITOR` nor `VISUAL` is set.
pub const FALLBACK_EDITOR: &str = "vi";

/// Leading bytes of a binary age file.
pub const AGE_MAGIC: &str = "age-encryption.org/v1";

/// First line of an ASCII-armored age file.
pub const AGE_ARMOR_HEADER: &str = "-----BEGIN AGE ENCRYPTED FILE-----";

/// Environment variables.
pub mod env {
    pub const HOME: &str = "MOSS_HOME";
    pub const STORE: &str = "MOSS_STORE";
    pub const IDENTITY_FILE: &str = "MOSS_IDENTITY_FILE";
    pub const PASSPHRASE: &str = "MOSS_PASSPHRASE";
    pub const LOG: &str = "MOSS_LOG";
    pub const XDG_DATA_HOME: &str = "XDG_DATA_HOME";
    pub const EDITOR: &str = "EDITOR";
    pub const VISUAL: &str = "VISUAL";
}
