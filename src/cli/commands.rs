//! Command handlers and the process-wide command table.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::cli::binder::Arguments;
use crate::cli::editor;
use crate::cli::output;
use crate::cli::registry::{CommandSpec, Registry};
use crate::cli::session::Session;
use crate::core::random;
use crate::error::{Error, Result};

static REGISTRY: OnceLock<Registry<Session>> = OnceLock::new();

/// The command table, built on first use.
pub fn registry() -> &'static Registry<Session> {
    REGISTRY.get_or_init(build)
}

fn build() -> Registry<Session> {
    Registry::new()
        .command(
            CommandSpec::new("generate", "generate a random secret", generate)
                .keyword("filename")
                .keyword("length")
                .optional("force"),
        )
        .command(
            CommandSpec::new(
                "add",
                "add a secret to the store (reads from standard input)",
                add,
            )
            .keyword("filename")
            .optional("force"),
        )
        .alias("insert", "add")
        .command(CommandSpec::new("show", "display a secret", show).keyword("file"))
        .alias("cat", "show")
        .command(
            CommandSpec::new("search", "search secrets with names matching term", search)
                .rest("term"),
        )
        .alias("list", "search")
        .command(CommandSpec::new("edit", "edit a secret", edit).keyword("file"))
        .command(CommandSpec::new("config", "show configuration", config))
        .command(CommandSpec::new("init", "create new moss repository", init).keyword("keyfile"))
        .command(CommandSpec::new("rm", "remove a secret", rm).keyword("secret"))
        .command(
            CommandSpec::new(
                "share",
                "grant a public key access to the store or a directory",
                share,
            )
            .keyword("recipient")
            .optional("dir"),
        )
        .command(
            CommandSpec::new("git", "perform git operation in store", git).rest("git_command"),
        )
        .command(CommandSpec::new("help", "display this help text", help))
}

fn generate(session: &mut Session, args: &Arguments) -> Result<()> {
    let name = args.get("filename")?;
    let length = args.get("length")?;
    let length = length
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            Error::Usage(format!(
                "moss: length must be a positive integer, got '{}'",
                length
            ))
        })?;

    let secret = random::alphanumeric(length);
    session
        .store()
        .write_secret(name, secret.as_bytes(), args.flag("force"))?;

    let out = session.out();
    out.write_all(secret.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn add(session: &mut Session, args: &Arguments) -> Result<()> {
    let name = args.get("filename")?;
    let secret = session.read_input()?;
    session
        .store()
        .write_secret(name, &secret, args.flag("force"))?;
    Ok(())
}

fn show(session: &mut Session, args: &Arguments) -> Result<()> {
    let secret = session.store().read_secret(args.get("file")?)?;
    let out = session.out();
    out.write_all(&secret)?;
    out.flush()?;
    Ok(())
}

fn search(session: &mut Session, args: &Arguments) -> Result<()> {
    let pattern = Regex::new(&args.rest().join(" "))?;
    let names = session.store().list_secrets(Some(&pattern))?;
    let out = session.out();
    for name in names {
        writeln!(out, "{}", name)?;
    }
    out.flush()?;
    Ok(())
}

fn edit(session: &mut Session, args: &Arguments) -> Result<()> {
    let name = args.get("file")?;
    let current = session.store().read_secret(name)?;
    let edited = editor::edit(&session.config().editor, name, &current)?;
    session.store().write_secret(name, &edited, true)?;
    Ok(())
}

fn config(session: &mut Session, _args: &Arguments) -> Result<()> {
    let summary = serde_json::to_string(&session.store().config())?;
    writeln!(session.out(), "{}", summary)?;
    Ok(())
}

fn init(session: &mut Session, args: &Arguments) -> Result<()> {
    let keyfile = Path::new(args.get("keyfile")?);
    let store = session.store();
    store.create(keyfile)?;
    output::success(&format!("created store at {}", store.root().display()));
    Ok(())
}

fn rm(session: &mut Session, args: &Arguments) -> Result<()> {
    session.store().remove_secret(args.get("secret")?)
}

fn share(session: &mut Session, args: &Arguments) -> Result<()> {
    let recipient = args.get("recipient")?;
    let changed = session.store().add_recipient(recipient, args.value("dir"))?;
    info!(count = changed.len(), "re-encrypted secrets");
    output::success(&format!(
        "recipient added, {} secret{} re-encrypted",
        changed.len(),
        if changed.len() == 1 { "" } else { "s" }
    ));
    Ok(())
}

fn git(session: &mut Session, args: &Arguments) -> Result<()> {
    session.store().git_operation(args.rest())
}

fn help(session: &mut Session, _args: &Arguments) -> Result<()> {
    let out = session.out();
    out.write_all(registry().help().as_bytes())?;
    out.flush()?;
    Ok(())
}
