//! Tests for the binary: argument parsing, config errors and full sessions.

mod common;

use common::temp_config;
use std::process::{Command, Output};

fn voice_memos_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_voice-memos"));
    cmd.env_remove("RUST_LOG").env_remove("VOICE_MEMOS_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute command")
}

/// A config whose session finishes in well under a second.
fn fast_config(dir: &std::path::Path) -> String {
    format!(
        r#"
[logging]
level = "warn"

[recording]
temporary_directory = "{}"
timer_interval_ms = 50

[playback]
timer_interval_ms = 50

[simulation]
playback_speed = 10.0
"#,
        dir.display()
    )
}

#[test]
fn test_help_lists_flags() {
    let output = run(voice_memos_cmd().arg("--help"));
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--deny-permission", "--record-seconds", "--json"] {
        assert!(stdout.contains(flag), "help is missing {flag}: {stdout}");
    }
}

#[test]
fn test_missing_config_file_exits_with_error() {
    let output = run(voice_memos_cmd()
        .arg("--config")
        .arg("/nonexistent/voice-memos/config.toml"));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: Failed to read config file"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn test_invalid_config_exits_with_error() {
    let (_dir, path) = temp_config("[playback]\ntimer_interval_ms = 0\n");
    let output = run(voice_memos_cmd().arg("--config").arg(&path));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("playback.timer_interval_ms must be greater than zero"));
}

#[test]
fn test_zero_record_seconds_fails_validation() {
    let (_dir, path) = temp_config("");
    let output = run(voice_memos_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--record-seconds", "0"]));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.recording_seconds must be positive"));
}

#[test]
fn test_non_numeric_record_seconds_is_rejected() {
    let output = run(voice_memos_cmd().args(["--record-seconds", "soon"]));
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--record-seconds"));
}

#[test]
fn test_denied_permission_ends_with_alert() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let (_config_dir, path) = temp_config(&fast_config(dir.path()));
    let output = run(voice_memos_cmd()
        .arg("--config")
        .arg(&path)
        .arg("--deny-permission"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().next().is_some_and(|line| line == "permission=Undetermined"));
    assert!(stdout.contains("permission=Denied | alert: Permission is required to record voice memos."));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Session ended with alert"));
}

#[test]
fn test_json_session_records_and_plays() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let (_config_dir, path) = temp_config(&fast_config(dir.path()));
    let output = run(voice_memos_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--record-seconds", "0.3", "--json"]));

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let states: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("every line is a JSON state"))
        .collect();

    assert_eq!(states.first().map(|s| s["permission"].clone()), Some("undetermined".into()));
    assert!(states.iter().any(|s| s["current_recording"]["mode"] == "encoding"));
    assert!(states.iter().any(|s| s["voice_memos"][0]["mode"]["playing"].is_object()));

    let last = states.last().expect("at least one state");
    let memo = &last["voice_memos"][0];
    assert_eq!(memo["title"], "Demo memo");
    assert_eq!(memo["mode"], "not_playing");
    assert!(memo["duration"].as_f64().is_some_and(|d| d > 0.0));
    assert!(memo["url"]
        .as_str()
        .is_some_and(|url| url.starts_with(&dir.path().display().to_string()) && url.ends_with(".m4a")));
    assert!(last["current_recording"].is_null());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Recorded and played \"Demo memo\""));
}
