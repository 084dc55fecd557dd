//! Tests for git integration.

use crate::support::*;
use crate::skip_without_git;
use std::process::Command;

fn git_init(t: &Test) {
    assert_success(&t.git(&["init", "-q"]));
    assert_success(&t.git(&["config", "user.name", "moss"]));
    assert_success(&t.git(&["config", "user.email", "moss@example.com"]));
}

fn log(t: &Test) -> String {
    let output = Command::new("git")
        .args(["log", "--format=%s", "--name-only"])
        .current_dir(t.store())
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_git_requires_repo() {
    let t = Test::init();

    let output = t.git(&["status"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not a git repo");
}

#[test]
fn test_git_init_then_writes_are_committed() {
    skip_without_git!();
    let t = Test::init();
    git_init(&t);

    assert_success(&t.add("db/prod", "secret"));
    let history = log(&t);
    assert!(history.contains("new secret"), "log: {}", history);
    assert!(history.contains("db/prod.age"), "log: {}", history);

    assert_success(&t.rm("db/prod"));
    assert!(log(&t).contains("remove secret"));
}

#[test]
fn test_git_passes_flags_through() {
    skip_without_git!();
    let t = Test::init();
    git_init(&t);
    assert_success(&t.add("a", "x"));

    let output = t.git(&["log", "--oneline", "-n", "1"]);
    assert_success(&output);
}

#[test]
fn test_failed_commit_does_not_fail_write() {
    skip_without_git!();
    let t = Test::init();
    // A bare `.git` directory is enough to turn commits on, but git itself
    // rejects it.
    std::fs::create_dir(t.store().join(".git")).unwrap();

    let output = t.add("a", "x");
    assert_success(&output);
    assert_stderr_contains(&output, "git commit failed");
    assert_eq!(stdout(&t.show("a")), "x");
}

#[test]
fn test_git_failure_exit_code() {
    skip_without_git!();
    let t = Test::init();
    git_init(&t);

    let output = t.git(&["no-such-subcommand"]);
    assert_failure(&output);
}
