//! Tests for hierarchical recipient resolution and `moss share`.

use crate::support::*;
use std::fs;

#[test]
fn test_root_recipients_govern_deep_secret() {
    let t = Test::init();
    let me = Keypair::generate(&t.identity());

    // Re-key the root file with the installed identity so we can decrypt
    // independently of the binary.
    fs::write(t.store().join(".recipients"), format!("{}\n", me.public)).unwrap();

    assert_success(&t.add("a/b/c/secret", "deep"));
    let plaintext = me.decrypt(&t.store().join("a/b/c/secret.age")).unwrap();
    assert_eq!(plaintext, b"deep");
}

#[test]
fn test_nearest_recipients_win() {
    let t = Test::init();
    let outer = t.keypair("outer");
    let inner = t.keypair("inner");

    fs::write(t.store().join(".recipients"), format!("{}\n", outer.public)).unwrap();
    fs::create_dir_all(t.store().join("team/db")).unwrap();
    fs::write(
        t.store().join("team/.recipients"),
        format!("{}\n", inner.public),
    )
    .unwrap();

    assert_success(&t.add("team/db/prod", "nested"));
    let ciphertext = t.store().join("team/db/prod.age");
    assert_eq!(inner.decrypt(&ciphertext).unwrap(), b"nested");
    assert!(outer.decrypt(&ciphertext).is_none());

    assert_success(&t.add("top", "root"));
    let ciphertext = t.store().join("top.age");
    assert_eq!(outer.decrypt(&ciphertext).unwrap(), b"root");
    assert!(inner.decrypt(&ciphertext).is_none());
}

#[test]
fn test_multiple_recipients_each_decrypt() {
    let t = Test::init();
    let alice = t.keypair("alice");
    let bob = t.keypair("bob");

    fs::write(
        t.store().join(".recipients"),
        format!("# team\n{}\n\n{}\n", alice.public, bob.public),
    )
    .unwrap();

    assert_success(&t.add("shared", "both"));
    let ciphertext = t.store().join("shared.age");
    assert_eq!(alice.decrypt(&ciphertext).unwrap(), b"both");
    assert_eq!(bob.decrypt(&ciphertext).unwrap(), b"both");
}

#[test]
fn test_share_directory() {
    let t = Test::with_secrets(&[("team/db", "shared"), ("private", "mine")]);
    let bob = t.keypair("bob");

    let output = t.share(&bob.public, Some("team"));
    assert_success(&output);
    assert_stderr_contains(&output, "1 secret re-encrypted");

    let recipients = fs::read_to_string(t.store().join("team/.recipients")).unwrap();
    assert!(recipients.contains(&bob.public));

    assert_eq!(bob.decrypt(&t.store().join("team/db.age")).unwrap(), b"shared");
    assert!(bob.decrypt(&t.store().join("private.age")).is_none());

    // The owner still reads everything.
    assert_eq!(stdout(&t.show("team/db")), "shared");
    assert_eq!(stdout(&t.show("private")), "mine");
}

#[test]
fn test_share_whole_store() {
    let t = Test::with_secrets(&[("a", "1"), ("b/c", "2")]);
    let bob = t.keypair("bob");

    assert_success(&t.share(&bob.public, None));
    assert_eq!(bob.decrypt(&t.store().join("a.age")).unwrap(), b"1");
    assert_eq!(bob.decrypt(&t.store().join("b/c.age")).unwrap(), b"2");
}

#[test]
fn test_share_rejects_invalid_key() {
    let t = Test::init();

    let output = t.share(INVALID_PUBLIC_KEY, None);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid recipient");

    let recipients = fs::read_to_string(t.store().join(".recipients")).unwrap();
    assert!(!recipients.contains(INVALID_PUBLIC_KEY));
}

#[test]
fn test_share_with_known_public_key() {
    let t = Test::with_secrets(&[("x", "1")]);

    assert_success(&t.share(BOB_PUBLIC_KEY, None));
    let recipients = fs::read_to_string(t.store().join(".recipients")).unwrap();
    assert!(recipients.ends_with(&format!("{}\n", BOB_PUBLIC_KEY)));
    assert_eq!(stdout(&t.show("x")), "1");
}
