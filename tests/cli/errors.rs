//! Tests for error reporting and global flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("frobnicate").output().unwrap();
    assert_failure(&output);
    assert_eq!(
        stderr(&output).trim(),
        "moss: unrecognised command. See \"moss help\""
    );
}

#[test]
fn test_unknown_command_writes_nothing_to_stdout() {
    let t = Test::new();

    t.cmd()
        .args(["frobnicate", "--force"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unrecognised command"));
}

#[test]
fn test_no_command_points_to_help() {
    let t = Test::new();

    let output = t.cmd().output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "moss help");
}

#[test]
fn test_arity_errors_show_usage() {
    let t = Test::init();

    let cases: &[(&[&str], &str)] = &[
        (&["show"], "usage: moss show <file>"),
        (&["cat"], "usage: moss cat <file>"),
        (&["rm", "a", "b"], "usage: moss rm <secret>"),
        (&["generate", "x"], "usage: moss generate <filename> <length> [--force]"),
        (&["add", "x", "--loud"], "usage: moss add <filename> [--force]"),
        (&["config", "extra"], "usage: moss config"),
    ];

    for (args, expected) in cases {
        let output = t.cmd().args(*args).output().unwrap();
        assert_failure(&output);
        assert_eq!(stderr(&output).trim(), *expected, "args {:?}", args);
    }
}

#[test]
fn test_errors_are_one_line() {
    let t = Test::init();

    let output = t.show("ghost");
    assert_failure(&output);
    assert_eq!(stderr(&output).trim_end().lines().count(), 1);
}

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.starts_with("Store and retrieve encrypted secrets\n\nUsage: moss [command] [parameters]...\n\n"));
    for usage in [
        "generate <filename> <length> [--force]",
        "add <filename> [--force]",
        "show <file>",
        "search <term...>",
        "edit <file>",
        "config",
        "init <keyfile>",
        "rm <secret>",
        "share <recipient> [--dir]",
        "git <git_command...>",
        "help",
    ] {
        assert!(out.contains(&format!("  {:<40} - ", usage)), "missing {}", usage);
    }
    assert!(!out.contains("insert"));
}

#[test]
fn test_clap_help_and_version() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "Store and retrieve encrypted secrets");

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "moss");
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::init();

    let output = t.cmd().args(["--verbose", "list"]).output().unwrap();
    assert_success(&output);
}
