//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A slash-separated logical secret name (e.g., `db/prod`).
pub type SecretName = String;

/// An age public key string (starts with "age1...").
pub type PublicKey = String;

/// Ciphertext bytes as written to a `.age` file (ASCII-armored).
pub type Ciphertext = Vec<u8>;
