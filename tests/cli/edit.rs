//! Tests for `moss edit`.

#![cfg(unix)]

use crate::support::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Write an executable editor script into the scratch directory.
fn editor(t: &Test, name: &str, body: &str) -> PathBuf {
    let path = t.dir.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_edit_reencrypts_changes() {
    let t = Test::with_secrets(&[("db/prod", "old-password")]);
    let script = editor(&t, "replace", "printf 'new-password' > \"$1\"");

    let output = t.edit("db/prod", &script);
    assert_success(&output);
    assert_eq!(stdout(&t.show("db/prod")), "new-password");
}

#[test]
fn test_edit_sees_current_plaintext() {
    let t = Test::with_secrets(&[("note", "hello")]);
    let script = editor(&t, "append", "printf ' world' >> \"$1\"");

    assert_success(&t.edit("note", &script));
    assert_eq!(stdout(&t.show("note")), "hello world");
}

#[test]
fn test_edit_temp_file_named_after_secret() {
    let t = Test::with_secrets(&[("db/prod-eu", "x")]);
    let seen = t.dir.path().join("seen");
    let script = editor(
        &t,
        "record",
        &format!("basename \"$1\" > '{}'", seen.display()),
    );

    assert_success(&t.edit("db/prod-eu", &script));
    let name = fs::read_to_string(&seen).unwrap();
    assert!(name.starts_with("dbprodeu"), "temp file was {}", name);
}

#[test]
fn test_edit_failing_editor_keeps_secret() {
    let t = Test::with_secrets(&[("note", "keep me")]);
    let script = editor(&t, "fail", "printf 'clobbered' > \"$1\"\nexit 3");

    let output = t.edit("note", &script);
    assert_failure(&output);
    assert_stderr_contains(&output, "exited with status 3");
    assert_eq!(stdout(&t.show("note")), "keep me");
}

#[test]
fn test_edit_missing_secret() {
    let t = Test::init();
    let script = editor(&t, "noop", "true");

    let output = t.edit("ghost", &script);
    assert_failure(&output);
    assert_stderr_contains(&output, "can't open non-existent file");
}
