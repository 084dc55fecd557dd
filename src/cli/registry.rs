//! Command table.
//!
//! Each command declares its parameter signature once, through the
//! [`CommandSpec`] builder. The signature drives argument binding, arity
//! checking and the usage strings shown by `moss help`.

use crate::cli::binder::Arguments;
use crate::error::Result;

/// A command implementation. `C` is the per-invocation context.
pub type Handler<C> = fn(&mut C, &Arguments) -> Result<()>;

/// How a parameter is bound from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Takes the next free token.
    Positional,
    /// Takes every remaining token.
    Rest,
    /// Takes the next free token, or `--name=value`.
    RequiredKeyword,
    /// `--name` or `--name=value`; may be absent.
    Optional { default: Option<&'static str> },
}

impl ParamKind {
    pub fn is_required(self) -> bool {
        matches!(self, ParamKind::Positional | ParamKind::RequiredKeyword)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
}

/// Ordered parameter list of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn rest(&self) -> Option<&Param> {
        self.params.iter().find(|p| p.kind == ParamKind::Rest)
    }

    /// Whether arguments bind to an ordered sequence rather than a mapping.
    pub fn binds_sequence(&self) -> bool {
        self.is_empty() || self.rest().is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameter part of the usage string: `<a> <b...> [--c]`.
    pub fn usage(&self) -> String {
        self.params
            .iter()
            .map(|p| match p.kind {
                ParamKind::Positional | ParamKind::RequiredKeyword => format!("<{}>", p.name),
                ParamKind::Rest => format!("<{}...>", p.name),
                ParamKind::Optional { .. } => format!("[--{}]", p.name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn push(&mut self, command: &str, param: Param) {
        assert!(
            self.get(param.name).is_none(),
            "command `{}` declares parameter `{}` twice",
            command,
            param.name
        );
        let has_keyword = |kind: ParamKind| {
            matches!(
                kind,
                ParamKind::RequiredKeyword | ParamKind::Optional { .. }
            )
        };
        match param.kind {
            ParamKind::Rest => {
                assert!(
                    self.rest().is_none(),
                    "command `{}` declares two rest parameters",
                    command
                );
                assert!(
                    !self.params.iter().any(|p| has_keyword(p.kind)),
                    "command `{}` mixes a rest parameter with keywords",
                    command
                );
            }
            kind if has_keyword(kind) => {
                assert!(
                    self.rest().is_none(),
                    "command `{}` mixes a rest parameter with keywords",
                    command
                );
            }
            _ => {
                assert!(
                    self.rest().is_none(),
                    "command `{}` declares `{}` after its rest parameter",
                    command,
                    param.name
                );
            }
        }
        self.params.push(param);
    }
}

/// One registered command.
pub struct CommandSpec<C> {
    name: &'static str,
    doc: &'static str,
    signature: Signature,
    handler: Handler<C>,
}

impl<C> CommandSpec<C> {
    pub fn new(name: &'static str, doc: &'static str, handler: Handler<C>) -> Self {
        Self {
            name,
            doc,
            signature: Signature::default(),
            handler,
        }
    }

    pub fn positional(mut self, name: &'static str) -> Self {
        self.add(name, ParamKind::Positional);
        self
    }

    pub fn rest(mut self, name: &'static str) -> Self {
        self.add(name, ParamKind::Rest);
        self
    }

    pub fn keyword(mut self, name: &'static str) -> Self {
        self.add(name, ParamKind::RequiredKeyword);
        self
    }

    pub fn optional(mut self, name: &'static str) -> Self {
        self.add(name, ParamKind::Optional { default: None });
        self
    }

    pub fn optional_with_default(mut self, name: &'static str, default: &'static str) -> Self {
        self.add(
            name,
            ParamKind::Optional {
                default: Some(default),
            },
        );
        self
    }

    fn add(&mut self, name: &'static str, kind: ParamKind) {
        self.signature.push(self.name, Param { name, kind });
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn handler(&self) -> Handler<C> {
        self.handler
    }

    /// `<invoked> <params>`, without trailing space for empty signatures.
    pub fn usage(&self, invoked: &str) -> String {
        let params = self.signature.usage();
        if params.is_empty() {
            invoked.to_string()
        } else {
            format!("{} {}", invoked, params)
        }
    }
}

/// Registered commands and aliases, in registration order.
pub struct Registry<C> {
    commands: Vec<CommandSpec<C>>,
    aliases: Vec<(&'static str, usize)>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            aliases: Vec::new(),
        }
    }
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken by a command or alias.
    pub fn command(mut self, spec: CommandSpec<C>) -> Self {
        assert!(
            self.lookup(spec.name).is_none(),
            "command `{}` registered twice",
            spec.name
        );
        self.commands.push(spec);
        self
    }

    /// Register `alias` as another name for `target`.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not registered or `alias` is already taken.
    pub fn alias(mut self, alias: &'static str, target: &str) -> Self {
        assert!(
            self.lookup(alias).is_none(),
            "alias `{}` shadows an existing command",
            alias
        );
        let index = self
            .commands
            .iter()
            .position(|c| c.name == target)
            .unwrap_or_else(|| panic!("alias `{}` targets unknown command `{}`", alias, target));
        self.aliases.push((alias, index));
        self
    }

    /// Resolve a command or alias name.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec<C>> {
        self.commands.iter().find(|c| c.name == name).or_else(|| {
            self.aliases
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|(_, index)| &self.commands[*index])
        })
    }

    /// Documented commands in registration order. Aliases are not listed.
    pub fn documented(&self) -> impl Iterator<Item = &CommandSpec<C>> {
        self.commands.iter().filter(|c| !c.doc.is_empty())
    }

    /// Text printed by `moss help`.
    pub fn help(&self) -> String {
        let mut text = String::from(
            "Store and retrieve encrypted secrets\n\nUsage: moss [command] [parameters]...\n\n",
        );
        for spec in self.documented() {
            text.push_str(&format!("  {:<40} - {}\n", spec.usage(spec.name), spec.doc));
        }
        text
    }
}
