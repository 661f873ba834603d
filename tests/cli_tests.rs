// SPDX-License-Identifier: GPL-3.0-only

//! Exit status and diagnostics of the command-line binary

use std::process::{Command, Output};

fn cvfx(args: &[&str]) -> Output {
    let config_home = std::env::temp_dir().join(format!("cvfx-cli-tests-{}", std::process::id()));
    Command::new(env!("CARGO_BIN_EXE_cvfx"))
        .args(args)
        .env("XDG_CONFIG_HOME", &config_home)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run cvfx")
}

#[test]
fn test_unknown_app_fails_with_diagnostic() {
    let output = cvfx(&["snapshot", "nosuchapp", "--synthetic"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cvfx: "), "stderr: {}", stderr);
    assert!(stderr.contains("no application named 'nosuchapp'"), "stderr: {}", stderr);
}

#[test]
fn test_apps_listing_succeeds() {
    let output = cvfx(&["apps"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("threshold"));
}
