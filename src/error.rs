//! Error types for moss.
//!
//! Every error reaching the process boundary is printed as a single line on
//! stderr and mapped to exit code 1.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad command-line invocation (unknown command, wrong arity).
    #[error("{0}")]
    Usage(String),

    /// A handler was invoked with parameters its signature does not accept.
    ///
    /// Raised by binding checks and argument accessors; the dispatcher turns it
    /// into [`Error::Usage`] carrying the command's usage string.
    #[error("wrong arguments: {0}")]
    Arity(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("editor failed: {0}")]
    Editor(String),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Store-level failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("can't open non-existent file {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} exists, use --force to overwrite", .0.display())]
    AlreadyExists(PathBuf),

    #[error("can't find .recipients for {0}")]
    RecipientsNotFound(String),

    #[error("{0}")]
    Creation(String),

    #[error("store already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("not a git repo")]
    NotAGitRepo,
}

/// Encryption collaborator failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("no recipients in {}", .0.display())]
    NoRecipients(PathBuf),

    #[error("{0} not found in PATH")]
    ToolMissing(String),
}

/// Version-control collaborator failures.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("git {command} exited with status {code}")]
    Failed { command: String, code: i32 },
}

/// Configuration resolution failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHome,

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Input validation failures.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret name cannot be empty")]
    EmptyName,

    #[error("invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
