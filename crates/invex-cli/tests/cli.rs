use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../invex-core/tests/fixtures/fletcher_pages.json")
}

/// Temp dir with an empty config file, so runs never read the user's config.
fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").unwrap();
    (dir, config)
}

fn invex(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invex").unwrap();
    cmd.arg("-c").arg(config);
    cmd
}

#[test]
fn test_extract_json() {
    let (_dir, config) = workspace();

    invex(&config)
        .arg("extract")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""invoiceNo": 1075379"#))
        .stdout(predicate::str::contains(r#""soldTo": "MEEKAJAY INC""#))
        .stdout(predicate::str::contains(r#""invoiceDateTime": "2021-09-01T00:00:00Z""#))
        .stdout(predicate::str::contains("rawText").not());
}

#[test]
fn test_extract_text_source_to_csv() {
    let (dir, config) = workspace();
    let pages: Vec<Vec<String>> =
        serde_json::from_str(&fs::read_to_string(fixture()).unwrap()).unwrap();
    let text = pages
        .iter()
        .map(|p| p.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\x0c");
    let input = dir.path().join("pages.txt");
    fs::write(&input, text).unwrap();

    invex(&config)
        .args(["extract", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1,1075379,2021-09-01,2021-09-01,MEEKAJAY INC,12290185,176068592,FLETCHER OIL CO,3,25399.25",
        ))
        .stdout(predicate::str::contains("3,1075371,2021-09-02"));
}

#[test]
fn test_extract_raw_text_to_file() {
    let (dir, config) = workspace();
    let output = dir.path().join("out.json");

    invex(&config)
        .args(["extract", "--raw-text", "-o"])
        .arg(&output)
        .arg(fixture())
        .assert()
        .success();

    let records: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 3);
    assert!(records[0]["rawText"].as_str().unwrap().contains("B/L Number--  176068592"));
}

#[test]
fn test_extract_strict_fails_on_malformed_page() {
    let (dir, config) = workspace();
    let input = dir.path().join("pages.json");
    fs::write(
        &input,
        r#"[["Invoice No:    1075379"], ["10% ETHANOL SUPER   1,085.0"]]"#,
    )
    .unwrap();

    invex(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Page 2"));

    invex(&config)
        .args(["extract", "--strict"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 pages failed"));
}

#[test]
fn test_extract_missing_input() {
    let (dir, config) = workspace();

    invex(&config)
        .arg("extract")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_with_summary() {
    let (dir, config) = workspace();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir(&inputs).unwrap();
    fs::copy(fixture(), inputs.join("fletcher.json")).unwrap();
    fs::write(inputs.join("broken.json"), "not json").unwrap();

    let pattern = inputs.join("*.json");
    invex(&config)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&outputs)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("broken.json"));

    assert!(outputs.join("fletcher.json").exists());
    assert!(!outputs.join("broken.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 5);
    assert!(summary.contains("fletcher.json,1,success,1075379,2021-09-01,MEEKAJAY INC,25399.25"));
    assert!(summary.contains("broken.json,,error"));
}

#[test]
fn test_batch_no_matches() {
    let (dir, config) = workspace();
    let pattern = dir.path().join("*.txt");

    invex(&config)
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_rules_init_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("rules").join("config.json");

    invex(&config).args(["rules", "init"]).assert().success();
    assert!(config.exists());

    invex(&config)
        .args(["rules", "get", "rules.products.0.name"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""REGULAR""#));

    invex(&config)
        .args(["rules", "set", "output.attach_raw_text", "true"])
        .assert()
        .success();

    invex(&config)
        .args(["rules", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    invex(&config)
        .arg("extract")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("rawText"));
}

#[test]
fn test_rules_set_rejects_bad_pattern() {
    let (_dir, config) = workspace();

    invex(&config)
        .args(["rules", "set", "rules.custom_fields.1.pattern", "B/L Number--"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("capture group"));
}
