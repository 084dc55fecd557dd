//! Argument binding.
//!
//! Turns the tokens after the command word into a [`Payload`] by walking
//! the command's [`Signature`]. Binding never fails on arity; missing or
//! surplus arguments are left for the dispatcher to reject.

use std::collections::BTreeMap;

use tracing::trace;

use crate::cli::registry::{CommandSpec, ParamKind, Registry, Signature};
use crate::error::{Error, Result};

/// A `--name` or `--name=value` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Present,
    Value(String),
}

impl FlagValue {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            FlagValue::Present => None,
            FlagValue::Value(v) => Some(v),
        }
    }
}

/// Bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Every token after the command word, in order, flags included.
    Sequence(Vec<String>),
    /// Named values, plus positional tokens no parameter claimed.
    Mapping {
        values: BTreeMap<String, FlagValue>,
        unclaimed: Vec<String>,
    },
}

/// A resolved command line.
pub struct Binding<'r, C> {
    /// The name the user typed (may be an alias).
    pub invoked: String,
    pub spec: &'r CommandSpec<C>,
    pub payload: Payload,
}

/// Parse a flag token.
///
/// The key is the run of word characters after `--`; a value is present
/// only when that run is followed by `=` and at least one character.
/// Anything else after the key is ignored, so `--dry-run` reads as `dry`.
pub fn parse_flag(token: &str) -> Option<(String, FlagValue)> {
    let body = token.strip_prefix("--")?;
    let key_len = body
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map_or(body.len(), |(i, _)| i);
    if key_len == 0 {
        return None;
    }

    let (key, tail) = body.split_at(key_len);
    let value = tail
        .strip_prefix('=')
        .map(|v| v.split('\n').next().unwrap_or_default())
        .filter(|v| !v.is_empty());

    let flag = match value {
        Some(v) => FlagValue::Value(v.to_string()),
        None => FlagValue::Present,
    };
    Some((key.to_string(), flag))
}

/// Resolve the command word and bind the remaining tokens.
///
/// # Errors
///
/// Returns `Error::Usage` when there is no command word or it names no
/// registered command.
pub fn bind<'r, C>(argv: &[String], registry: &'r Registry<C>) -> Result<Binding<'r, C>> {
    let (invoked, tokens) = argv.split_first().ok_or_else(|| {
        Error::Usage("usage: moss [command] [parameters]... (see \"moss help\")".to_string())
    })?;

    let spec = registry.lookup(invoked).ok_or_else(|| {
        Error::Usage("moss: unrecognised command. See \"moss help\"".to_string())
    })?;

    let payload = bind_tokens(tokens, spec.signature());
    trace!(command = %invoked, payload = ?payload, "bound arguments");

    Ok(Binding {
        invoked: invoked.clone(),
        spec,
        payload,
    })
}

/// Bind `tokens` against `signature`.
pub fn bind_tokens(tokens: &[String], signature: &Signature) -> Payload {
    if signature.binds_sequence() {
        return Payload::Sequence(tokens.to_vec());
    }

    let mut values = BTreeMap::new();
    let mut pool = Vec::new();
    for token in tokens {
        match parse_flag(token) {
            Some((key, flag)) => {
                values.insert(key, flag);
            }
            None => pool.push(token.clone()),
        }
    }

    let mut pool = pool.into_iter();
    for param in signature.params() {
        match param.kind {
            ParamKind::Positional => {
                values.remove(param.name);
                if let Some(token) = pool.next() {
                    values.insert(param.name.to_string(), FlagValue::Value(token));
                }
            }
            ParamKind::RequiredKeyword => {
                if let Some(token) = pool.next() {
                    values.insert(param.name.to_string(), FlagValue::Value(token));
                }
            }
            ParamKind::Optional { .. } | ParamKind::Rest => {}
        }
    }

    Payload::Mapping {
        values,
        unclaimed: pool.collect(),
    }
}

/// Checked arguments handed to a command handler.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: BTreeMap<String, FlagValue>,
    defaults: BTreeMap<&'static str, &'static str>,
    rest: Vec<String>,
}

impl Arguments {
    pub(crate) fn new(
        values: BTreeMap<String, FlagValue>,
        defaults: BTreeMap<&'static str, &'static str>,
        rest: Vec<String>,
    ) -> Self {
        Self {
            values,
            defaults,
            rest,
        }
    }

    /// Value of a required parameter.
    ///
    /// # Errors
    ///
    /// Returns `Error::Arity` if the parameter was not bound to a value.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.values
            .get(name)
            .and_then(FlagValue::as_value)
            .ok_or_else(|| Error::Arity(format!("missing parameter `{}`", name)))
    }

    /// Whether an optional flag was given, with or without a value.
    pub fn flag(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Value of an optional keyword, falling back to its declared default.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(FlagValue::as_value)
            .or_else(|| self.defaults.get(name).copied())
    }

    /// Tokens bound to the rest parameter.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }
}
