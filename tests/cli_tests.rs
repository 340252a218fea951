//! End-to-end integration tests for the cubby CLI.
//!
//! Each test runs the compiled binary in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a cubby command running in an isolated temp directory.
#[allow(deprecated)]
fn cubby_cmd(tempdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cubby").unwrap();
    cmd.current_dir(tempdir.path());
    // Keep the host environment from leaking into the tests
    cmd.env_remove("CUBBY_MASTER_KEY");
    cmd.env_remove("EDITOR");
    cmd.env_remove("VISUAL");
    cmd
}

/// Write a plaintext env.toml; plaintext values decrypt as themselves.
fn write_plaintext_secrets(tempdir: &TempDir, contents: &str) {
    fs::write(tempdir.path().join("env.toml"), contents).unwrap();
}

/// Run `cubby edit` with a no-op editor, which encrypts every plaintext value.
fn encrypt_via_noop_edit(tempdir: &TempDir) {
    cubby_cmd(tempdir)
        .arg("edit")
        .env("EDITOR", "true")
        .assert()
        .success();
}

#[test]
fn test_init_creates_key_and_secrets_file() {
    let temp = TempDir::new().unwrap();

    cubby_cmd(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created master.key"))
        .stdout(predicate::str::contains("created env.toml"));

    let key = fs::read_to_string(temp.path().join("master.key")).unwrap();
    assert!(key.contains("AGE-SECRET-KEY-"));
    assert!(key.contains("# public key: age1"));

    let secrets = fs::read_to_string(temp.path().join("env.toml")).unwrap();
    assert!(secrets.contains("[development]"));
    assert!(secrets.contains("[production]"));
}

#[test]
fn test_init_twice_fails_without_force() {
    let temp = TempDir::new().unwrap();

    cubby_cmd(&temp).arg("init").assert().success();

    cubby_cmd(&temp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cubby_cmd(&temp).arg("init").arg("--force").assert().success();
}

#[test]
fn test_init_updates_existing_gitignore() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".gitignore"), "target/\n").unwrap();

    cubby_cmd(&temp).arg("init").assert().success();

    let gitignore = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
    assert!(gitignore.lines().any(|l| l == "/master.key"));

    // a second run must not duplicate the entry
    cubby_cmd(&temp).arg("init").arg("--force").assert().success();
    let gitignore = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
    assert_eq!(
        gitignore.lines().filter(|l| *l == "/master.key").count(),
        1
    );
}

#[test]
fn test_public_and_private_print_keypair() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();

    cubby_cmd(&temp)
        .arg("public")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("age1"));

    cubby_cmd(&temp)
        .arg("private")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("AGE-SECRET-KEY-"));
}

#[test]
fn test_show_without_init_fails() {
    let temp = TempDir::new().unwrap();

    cubby_cmd(&temp)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("master.key not found"));
}

#[test]
fn test_show_prints_decrypted_values() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(
        &temp,
        "[development]\nAPI_KEY = \"dev-key\"\n\n[production]\nAPI_KEY = \"prod-key\"\n",
    );
    encrypt_via_noop_edit(&temp);

    // the file on disk is ciphertext now
    let on_disk = fs::read_to_string(temp.path().join("env.toml")).unwrap();
    assert!(on_disk.contains("ENC["));
    assert!(!on_disk.contains("dev-key"));

    cubby_cmd(&temp)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("dev-key"))
        .stdout(predicate::str::contains("prod-key"));
}

#[test]
fn test_edit_preserves_values_across_edits() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(&temp, "[development]\nA = \"1\"\nB = \"2\"\n");

    encrypt_via_noop_edit(&temp);
    let first = cubby_cmd(&temp).arg("show").assert().success();
    let first = String::from_utf8(first.get_output().stdout.clone()).unwrap();

    encrypt_via_noop_edit(&temp);
    let second = cubby_cmd(&temp).arg("show").assert().success();
    let second = String::from_utf8(second.get_output().stdout.clone()).unwrap();

    // ciphertext may differ between edits, the plaintext never does
    assert_eq!(first, second);
    assert!(first.contains("A = \"1\""));
    assert!(first.contains("B = \"2\""));

    let on_disk = fs::read_to_string(temp.path().join("env.toml")).unwrap();
    assert!(on_disk.contains("ENC["));
}

#[test]
fn test_load_prints_export_statements() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(
        &temp,
        "[production]\nAPI_KEY = \"prod-key\"\nQUOTED = \"it's\"\n\n[development]\n",
    );

    cubby_cmd(&temp)
        .arg("load")
        .arg("production")
        .assert()
        .success()
        .stdout(predicate::str::contains("export API_KEY='prod-key'"))
        .stdout(predicate::str::contains(r#"export QUOTED='it'"'"'s'"#));
}

#[test]
fn test_load_unknown_environment_fails() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();

    cubby_cmd(&temp)
        .arg("load")
        .arg("staging")
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_run_injects_decrypted_environment() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(
        &temp,
        "[development]\nGREETING = \"hello from cubby\"\n\n[production]\nGREETING = \"prod\"\n",
    );
    encrypt_via_noop_edit(&temp);

    cubby_cmd(&temp)
        .args(["run", "--", "sh", "-c", "echo \"$GREETING\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from cubby"));

    cubby_cmd(&temp)
        .args(["run", "-e", "production", "--", "sh", "-c", "echo \"$GREETING\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"));
}

#[test]
fn test_run_forwards_exit_code() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();

    cubby_cmd(&temp)
        .args(["run", "--", "sh", "-c", "exit 3"])
        .assert()
        .code(3);
}

#[test]
fn test_run_unknown_command_fails() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();

    cubby_cmd(&temp)
        .args(["run", "--", "definitely-not-a-command"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("command not found"));
}

#[test]
fn test_analyze_reports_missing_equal_and_unique() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(
        &temp,
        "[development]\nA = \"x\"\nB = \"1\"\nC = \"only here\"\n\n[production]\nA = \"x\"\nB = \"2\"\n",
    );

    cubby_cmd(&temp)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("C is not set in: production"))
        .stdout(predicate::str::contains(
            "A is equal in: development, production",
        ))
        .stdout(predicate::str::contains("Unique values:\n  B"));
}

#[test]
fn test_analyze_json_output() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(
        &temp,
        "[development]\nA = \"x\"\n\n[production]\nA = \"x\"\n",
    );

    let output = cubby_cmd(&temp)
        .arg("analyze")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["equal"][0]["key"], "A");
    assert_eq!(report["equal"][0]["environments"][0], "development");
    assert!(report["missing"].as_array().unwrap().is_empty());
}

#[test]
fn test_analyze_needs_two_environments() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(&temp, "[development]\nA = \"1\"\n");

    cubby_cmd(&temp)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("need at least 2 environments"));
}

#[test]
fn test_master_key_env_var_override() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(&temp, "[development]\nTOKEN = \"sekrit\"\n\n[production]\n");
    encrypt_via_noop_edit(&temp);

    let key_file = fs::read_to_string(temp.path().join("master.key")).unwrap();
    let secret_line = key_file
        .lines()
        .find(|l| l.starts_with("AGE-SECRET-KEY-"))
        .unwrap()
        .to_string();

    // no key file on disk, key injected through the environment
    fs::remove_file(temp.path().join("master.key")).unwrap();

    cubby_cmd(&temp)
        .arg("show")
        .env("CUBBY_MASTER_KEY", &secret_line)
        .assert()
        .success()
        .stdout(predicate::str::contains("sekrit"));

    // the full key-file text works too
    cubby_cmd(&temp)
        .arg("show")
        .env("CUBBY_MASTER_KEY", &key_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("sekrit"));
}

#[test]
fn test_show_with_wrong_key_fails() {
    let temp = TempDir::new().unwrap();
    cubby_cmd(&temp).arg("init").assert().success();
    write_plaintext_secrets(&temp, "[development]\nTOKEN = \"sekrit\"\n\n[production]\n");
    encrypt_via_noop_edit(&temp);

    // swap in a keypair from another project
    let other = TempDir::new().unwrap();
    cubby_cmd(&other).arg("init").assert().success();
    fs::copy(
        other.path().join("master.key"),
        temp.path().join("master.key"),
    )
    .unwrap();

    cubby_cmd(&temp)
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("decryption failed"))
        .stderr(predicate::str::contains("TOKEN"));
}
