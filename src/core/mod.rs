//! Core library components.
//!
//! The store model: name validation, path resolution, recipient search,
//! and the collaborators that do the actual encryption and version control.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod git;
pub mod paths;
pub mod random;
pub mod store;
pub mod types;
pub mod validation;

pub use store::Store;
