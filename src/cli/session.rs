//! Per-invocation context handed to command handlers.

use std::io::{self, Read, Write};

use zeroize::Zeroizing;

use crate::core::config::Config;
use crate::core::Store;
use crate::error::Result;

/// Configuration, the store and the standard streams of one run.
pub struct Session {
    config: Config,
    store: Option<Store>,
    input: Box<dyn Read>,
    out: Box<dyn Write>,
}

impl Session {
    /// Session on the process's stdin and stdout.
    pub fn new(config: Config) -> Self {
        Self::with_io(config, Box::new(io::stdin()), Box::new(io::stdout()))
    }

    pub fn with_io(config: Config, input: Box<dyn Read>, out: Box<dyn Write>) -> Self {
        Self {
            config,
            store: None,
            input,
            out,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The store, opened on first use.
    pub fn store(&mut self) -> &Store {
        let config = &self.config;
        self.store.get_or_insert_with(|| Store::open(config))
    }

    /// Secret output stream.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Read all of standard input.
    pub fn read_input(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut buf = Zeroizing::new(Vec::new());
        self.input.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
