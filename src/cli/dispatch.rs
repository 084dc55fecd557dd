//! Dispatcher: bind, check arity, invoke.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cli::binder::{self, Arguments, FlagValue, Payload};
use crate::cli::registry::{ParamKind, Registry, Signature};
use crate::error::{Error, Result};

/// Runs one command line against a registry.
pub struct Dispatcher<'r, C> {
    registry: &'r Registry<C>,
}

impl<'r, C> Dispatcher<'r, C> {
    pub fn new(registry: &'r Registry<C>) -> Self {
        Self { registry }
    }

    /// Dispatch `argv` (command word first) with `context`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Usage` for an unknown command or arguments that do
    /// not fit the command's signature, otherwise whatever the handler
    /// returns.
    pub fn dispatch(&self, context: &mut C, argv: &[String]) -> Result<()> {
        let binding = binder::bind(argv, self.registry)?;
        let usage = || Error::Usage(format!("usage: moss {}", binding.spec.usage(&binding.invoked)));

        let arguments = match check(binding.spec.signature(), binding.payload.clone()) {
            Ok(arguments) => arguments,
            Err(reason) => {
                debug!(command = %binding.invoked, %reason, "arity mismatch");
                return Err(usage());
            }
        };

        debug!(command = %binding.invoked, "invoking");
        match (binding.spec.handler())(context, &arguments) {
            Err(Error::Arity(reason)) => {
                debug!(command = %binding.invoked, %reason, "arity mismatch in handler");
                Err(usage())
            }
            other => other,
        }
    }
}

/// Validate a payload against `signature` and build handler arguments.
///
/// Returns a short description of the mismatch on failure.
fn check(signature: &Signature, payload: Payload) -> std::result::Result<Arguments, String> {
    let defaults: BTreeMap<&'static str, &'static str> = signature
        .params()
        .iter()
        .filter_map(|p| match p.kind {
            ParamKind::Optional { default: Some(d) } => Some((p.name, d)),
            _ => None,
        })
        .collect();

    match payload {
        Payload::Sequence(tokens) => {
            let mut tokens = tokens.into_iter();
            let mut values = BTreeMap::new();
            for param in signature.params() {
                if param.kind == ParamKind::Positional {
                    let token = tokens
                        .next()
                        .ok_or_else(|| format!("missing parameter `{}`", param.name))?;
                    values.insert(param.name.to_string(), FlagValue::Value(token));
                }
            }
            let rest: Vec<String> = tokens.collect();
            if signature.rest().is_none() && !rest.is_empty() {
                return Err(format!("unexpected arguments {:?}", rest));
            }
            Ok(Arguments::new(values, defaults, rest))
        }
        Payload::Mapping { values, unclaimed } => {
            if !unclaimed.is_empty() {
                return Err(format!("unexpected arguments {:?}", unclaimed));
            }
            for param in signature.params() {
                if param.kind.is_required()
                    && values.get(param.name).and_then(FlagValue::as_value).is_none()
                {
                    return Err(format!("missing parameter `{}`", param.name));
                }
            }
            if let Some(unknown) = values.keys().find(|k| signature.get(k).is_none()) {
                return Err(format!("unknown flag `--{}`", unknown));
            }
            Ok(Arguments::new(values, defaults, Vec::new()))
        }
    }
}
