use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use chrono::{TimeZone, Utc};
use strongpass::{analyze, JsonFileStore, Ledger, Password};

fn strongpass(history: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_strongpass"))
        .args(args)
        .env("STRONGPASS_HISTORY", history)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run strongpass")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

#[test]
fn json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(
        &dir.path().join("history.json"),
        &["--json", "--count", "2", "--length", "10"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["count"], 2);
    let passwords = value["passwords"].as_array().unwrap();
    assert_eq!(passwords.len(), 2);
    for entry in passwords {
        assert_eq!(entry["password"].as_str().unwrap().chars().count(), 10);
        assert_eq!(entry["analysis"]["length"], 10);
    }
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn plain_output_without_confusing_characters() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(
        &dir.path().join("history.json"),
        &["--plain", "-c", "20", "-l", "64", "-e"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    let lines = out.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 20);
    for line in lines {
        assert_eq!(line.chars().count(), 64);
        assert!(!line.chars().any(|c| "0O1lI|".contains(c)));
    }
}

#[test]
fn class_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(
        &dir.path().join("history.json"),
        &["--plain", "--no-uppercase", "--no-special", "-c", "10"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    for line in stdout(&output).lines() {
        assert!(line.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(line.chars().any(|c| c.is_ascii_digit()));
    }
}

#[test]
fn default_batch_output_shows_cards() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(&dir.path().join("history.json"), &["--batch", "-c", "2"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("  [1] "));
    assert!(out.contains("  [2] "));
    assert!(out.contains("entropy"));
}

#[test]
fn output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("passwords.json");
    let output = strongpass(
        &dir.path().join("history.json"),
        &["--json", "-c", "3", "-o", target.to_str().unwrap()],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(value["passwords"].as_array().unwrap().len(), 3);
}

#[test]
fn out_of_range_length_and_count() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.json");

    for args in [
        &["--plain", "-l", "7"][..],
        &["--plain", "-l", "129"][..],
        &["--plain", "-c", "0"][..],
        &["--plain", "-c", "101"][..],
    ] {
        let output = strongpass(&history, args);
        assert!(!output.status.success());
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains("must be between"));
    }
}

#[test]
fn all_classes_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(
        &dir.path().join("history.json"),
        &[
            "--plain",
            "--no-uppercase",
            "--no-lowercase",
            "--no-digits",
            "--no-special",
        ],
    );
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("no character classes"));
}

#[test]
fn json_and_plain_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let output = strongpass(&dir.path().join("history.json"), &["--json", "--plain"]);
    assert!(!output.status.success());
}

#[test]
fn history_view() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.json");

    let output = strongpass(&history, &["--history"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No history yet."));

    let ledger = Ledger::new(JsonFileStore::new(history.clone()));
    for (i, password) in ["Ab3!Ab3!Ab3!", "Zz9?Zz9?Zz9?Zz9?"].iter().enumerate() {
        let password = Password::from(password.to_string());
        let at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
        assert!(ledger.record_at(&password, &analyze(password.as_str()), at));
    }

    let output = strongpass(&history, &["--history"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("2 records in total"));
    assert!(out.contains("Strength"));
    assert!(!out.contains("Ab3!Ab3!Ab3!"));
    let first_row = out.lines().find(|line| line.starts_with("1 ")).unwrap();
    let second_row = out.lines().find(|line| line.starts_with("2 ")).unwrap();
    assert!(first_row.contains(" 16 "), "newest record first: {first_row}");
    assert!(second_row.contains(" 12 "));
}
