//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tagdrill() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("tagdrill").unwrap()
}

/// A workspace with a config file pointing at `data/` and `store/` inside it.
fn workspace(tables: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    for (name, content) in tables {
        std::fs::write(data.join(name), content).unwrap();
    }
    let config = format!(
        "store_dir = '{}'\npause_ms = 0\n\n[source]\ntype = \"directory\"\npath = '{}'\n",
        dir.path().join("store").display(),
        data.display()
    );
    std::fs::write(dir.path().join("tagdrill.toml"), config).unwrap();
    dir
}

fn config_arg(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("tagdrill.toml")
}

fn read_store(dir: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.join("store/web-proficiency.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn help_lists_commands() {
    tagdrill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quiz"))
        .stdout(predicate::str::contains("wrongbook"));
}

#[test]
fn version_flag() {
    tagdrill()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tagdrill"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    tagdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tagdrill.toml"));

    assert!(dir.path().join("tagdrill.toml").exists());
    for table in ["equipment.csv", "valves.csv", "performance.csv", "standard.csv"] {
        assert!(dir.path().join("data").join(table).exists(), "{table} missing");
    }
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    tagdrill().current_dir(dir.path()).arg("init").assert().success();

    tagdrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_sample_data() {
    let dir = TempDir::new().unwrap();
    tagdrill().current_dir(dir.path()).arg("init").assert().success();

    tagdrill()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--data-dir")
        .arg("data")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "equipment.csv: 5 rows, 4 records (0 dropped, 1 merged)",
        ))
        .stdout(predicate::str::contains("duplicate key P101"))
        .stdout(predicate::str::contains("standard.csv: 3 rows, 3 records"));
}

#[test]
fn validate_reports_missing_tables() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,Pump A\n")]);

    tagdrill()
        .arg("validate")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("valves.csv: MISSING"))
        .stdout(predicate::str::contains("standard.csv: not present (optional)"))
        .stdout(predicate::str::contains("2 warning(s) found"));
}

#[test]
fn validate_nonexistent_dir() {
    tagdrill()
        .arg("validate")
        .arg("--data-dir")
        .arg("no/such/dir")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn quiz_grades_piped_answer_and_persists() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,Pump A\n")]);

    tagdrill()
        .arg("quiz")
        .arg("--category")
        .arg("equipment")
        .arg("--config")
        .arg(config_arg(&dir))
        .write_stdin("pump a\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ correct"))
        .stdout(predicate::str::contains("Score: 1/1 correct"));

    let store = read_store(dir.path());
    assert_eq!(store["设备|P101"]["correct"], 1);
    assert_eq!(store["设备|P101"]["level"], 1);
}

#[test]
fn quiz_shortcut_skips_remaining_fields() {
    let dir = workspace(&[("valves.csv", "tag,name,floor\nXV101,进料阀,3F\n")]);

    tagdrill()
        .arg("quiz")
        .arg("--category")
        .arg("阀门")
        .arg("--config")
        .arg(config_arg(&dir))
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("marked as not known"))
        .stdout(predicate::str::contains("3F"))
        .stdout(predicate::str::contains("Score: 0/1 correct"));

    let store = read_store(dir.path());
    assert_eq!(store["阀门|XV101"]["wrong"], 1);
}

#[test]
fn quiz_ends_on_eof_and_writes_summary() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,泵\nP102,风机\n")]);
    let summary = dir.path().join("last.json");

    tagdrill()
        .arg("quiz")
        .arg("--category")
        .arg("mixed")
        .arg("--seed")
        .arg("3")
        .arg("--config")
        .arg(config_arg(&dir))
        .arg("--summary")
        .arg(&summary)
        .write_stdin(":skip\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0/2 correct (0 answered"));

    let raw = std::fs::read_to_string(&summary).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["outcomes"][0]["result"], "skipped");
}

#[test]
fn quiz_unknown_category_fails() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,泵\n")]);

    tagdrill()
        .arg("quiz")
        .arg("--category")
        .arg("pipes")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn quiz_without_tables_fails() {
    let dir = workspace(&[]);

    tagdrill()
        .arg("quiz")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no quiz items"));
}

#[test]
fn stats_and_wrongbook_after_quiz() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,Pump A\n")]);

    tagdrill()
        .arg("quiz")
        .arg("--category")
        .arg("equipment")
        .arg("--config")
        .arg(config_arg(&dir))
        .write_stdin("fan\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("✗ wrong"));

    tagdrill()
        .arg("stats")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("Accuracy"))
        .stdout(predicate::str::contains("0%"));

    let output = tagdrill()
        .arg("stats")
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(config_arg(&dir))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["entries"], 1);
    assert_eq!(json["total_wrong"], 1);

    tagdrill()
        .arg("wrongbook")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("P101"))
        .stdout(predicate::str::contains("Pump A"))
        .stdout(predicate::str::contains("1 item(s) to review"));
}

#[test]
fn stats_html_report() {
    let dir = workspace(&[("equipment.csv", "tag,name\nP101,Pump A\n")]);
    let report = dir.path().join("out/report.html");

    tagdrill()
        .arg("stats")
        .arg("--format")
        .arg("html")
        .arg("--output")
        .arg(&report)
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .success();

    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.contains("<html"));
}

#[test]
fn stats_unknown_format_fails() {
    let dir = workspace(&[]);

    tagdrill()
        .arg("stats")
        .arg("--format")
        .arg("xml")
        .arg("--config")
        .arg(config_arg(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}
