//! Shared test helpers for integration tests

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get an eqc command
///
/// The user config directory points at a path that never exists, so a
/// developer's own `eqc/config.yaml` cannot leak into the tests.
pub fn eqc() -> Command {
    let home = Path::new(env!("CARGO_TARGET_TMPDIR")).join("eqc-no-home");
    let mut cmd = Command::new(cargo::cargo_bin!("eqc"));
    cmd.env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("EQC_CONFIG");
    cmd
}

/// eqc command running in an empty directory, with HOME and the user config
/// directory inside it
pub fn eqc_isolated() -> (Command, TempDir) {
    let tmp = TempDir::new().unwrap();
    let mut cmd = eqc();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", user_config_root(&tmp));
    (cmd, tmp)
}

/// `XDG_CONFIG_HOME` used by [`eqc_isolated`]; the user file lives at
/// `<root>/eqc/config.yaml`
pub fn user_config_root(tmp: &TempDir) -> PathBuf {
    tmp.path().join(".config")
}

/// Run a command and return stdout, asserting success
pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Run a command and parse stdout as JSON
pub fn json_of(cmd: &mut Command) -> serde_json::Value {
    serde_json::from_str(&stdout_of(cmd)).unwrap()
}
