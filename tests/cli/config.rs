//! Tests for `moss config`.

use crate::support::*;

#[test]
fn test_config_prints_compact_json() {
    let t = Test::init();

    let output = t.config();
    assert_success(&output);
    let out = stdout(&output);
    assert_eq!(out.lines().count(), 1);

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["store"], t.store().display().to_string());
    assert_eq!(value["identity_file"], t.identity().display().to_string());
    assert_eq!(value["git"], false);
}

#[test]
fn test_config_reports_git() {
    let t = Test::init();
    std::fs::create_dir(t.store().join(".git")).unwrap();

    let value: serde_json::Value = serde_json::from_str(&stdout(&t.config())).unwrap();
    assert_eq!(value["git"], true);
}

#[test]
fn test_env_overrides() {
    let t = Test::init();
    let elsewhere = t.dir.path().join("elsewhere");

    let output = t
        .cmd()
        .env("MOSS_STORE", &elsewhere)
        .env("MOSS_IDENTITY_FILE", "/keys/me.key")
        .arg("config")
        .output()
        .unwrap();
    assert_success(&output);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["store"], elsewhere.display().to_string());
    assert_eq!(value["identity_file"], "/keys/me.key");
}

#[test]
fn test_home_flag_overrides_env() {
    let t = Test::new();
    let other = t.dir.path().join("other");

    let output = t
        .cmd()
        .arg("--home")
        .arg(&other)
        .arg("config")
        .output()
        .unwrap();
    assert_success(&output);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["store"], other.join("store").display().to_string());
}

#[test]
fn test_settings_file_selects_commit_message() {
    let t = Test::init();
    std::fs::write(
        t.home.path().join("config.toml"),
        "commit_message = \"rotate\"\n",
    )
    .unwrap();
    assert_success(&t.config());

    std::fs::write(t.home.path().join("config.toml"), "cipher = [").unwrap();
    let output = t.config();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse");
}
