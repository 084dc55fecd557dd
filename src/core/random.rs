//! Random secret generation.

use rand::distributions::{Alphanumeric, DistString};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Generate `length` random characters from `[A-Za-z0-9]` using the OS RNG.
pub fn alphanumeric(length: usize) -> Zeroizing<String> {
    Zeroizing::new(Alphanumeric.sample_string(&mut OsRng, length))
}
