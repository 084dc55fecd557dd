//! Cipher backend selection.

use tracing::debug;

use super::{Age, AgeCli, Cipher};
use crate::core::config::{CipherKind, Config};

/// Build the cipher backend named by the configuration.
pub fn from_config(config: &Config) -> Box<dyn Cipher> {
    match config.settings.cipher {
        CipherKind::Age => {
            debug!("creating age cipher backend");
            let age = match &config.passphrase {
                Some(passphrase) => Age::with_passphrase(passphrase.as_str()),
                None => Age::new(),
            };
            Box::new(age)
        }
        CipherKind::AgeCli => {
            debug!(
                age = %config.settings.tools.age,
                keygen = %config.settings.tools.age_keygen,
                "creating age-cli cipher backend"
            );
            Box::new(AgeCli::from_tools(&config.settings.tools))
        }
    }
}
