//! Moss - an encrypted secret store built on age.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── registry      # Declarative command table
//! │   ├── binder        # argv -> bound parameters
//! │   ├── dispatch      # bind, check arity, invoke, help text
//! │   ├── commands      # Command handlers
//! │   ├── session       # Per-invocation handler context
//! │   ├── editor        # $EDITOR on a scoped temp file
//! │   └── output        # Terminal messages
//! └── core/             # Store model
//!     ├── cipher/       # Encryption collaborator
//!     │   ├── age       # In-process age backend
//!     │   └── tool      # External age/age-keygen backend
//!     ├── config        # Paths and settings
//!     ├── git           # Version-control collaborator
//!     ├── paths         # Ciphertext paths, recipient search
//!     ├── random        # Generated secrets
//!     ├── store         # Secret read/write/list/remove
//!     └── validation    # Secret name rules
//! ```
//!
//! Each secret lives at `<store>/<name>.age` and is encrypted for the
//! recipients in the nearest `.recipients` file found walking up from the
//! secret toward the store root.

pub mod cli;
pub mod core;
pub mod error;
