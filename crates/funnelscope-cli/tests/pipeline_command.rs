use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn funnelscope_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("funnelscope")
}

/// A command rooted in `dir` with every path flag pointing inside it
fn funnelscope(dir: &Path) -> Command {
    let mut cmd = Command::new(funnelscope_bin());
    cmd.env_remove("FUNNELSCOPE_SEED")
        .arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--db")
        .arg(dir.join("db").join("ecommerce.db"))
        .arg("--reports-dir")
        .arg(dir.join("reports"));
    cmd
}

fn generate(dir: &Path, count: usize) {
    funnelscope(dir)
        .args(["generate", "-n", &count.to_string(), "--seed", "7", "--format", "json"])
        .assert()
        .success();
}

#[test]
fn test_generate_writes_dataset_and_csv() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .args(["generate", "-n", "300", "--seed", "42", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sessions\": 300"))
        .stdout(predicate::str::contains("\"seed\": 42"));

    let data = temp.path().join("data");
    assert!(data.join("dataset.json").exists());
    assert!(data.join("sessions_data.csv").exists());
    assert!(data.join("events_data.csv").exists());

    let sessions_csv = std::fs::read_to_string(data.join("sessions_data.csv")).unwrap();
    assert_eq!(sessions_csv.lines().count(), 301);
}

#[test]
fn test_generate_seed_from_env() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .env("FUNNELSCOPE_SEED", "99")
        .args(["generate", "-n", "10", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seed,99"));
}

#[test]
fn test_generate_rejects_zero_count() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .args(["generate", "-n", "0", "--seed", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn test_funnel_without_dataset_fails() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .arg("funnel")
        .assert()
        .failure()
        .stderr(predicate::str::contains("funnelscope generate"));
}

#[test]
fn test_metrics_without_database_fails() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .arg("metrics")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_load_then_metrics() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 400);

    funnelscope(temp.path())
        .args(["load", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sessions,400"));

    let output = funnelscope(temp.path())
        .args(["metrics", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["overall"]["total_sessions"], 400);
    assert!(json["revenue"]["total_orders"].as_i64().unwrap() >= 0);
}

#[test]
fn test_funnel_table_output() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 500);

    funnelscope(temp.path())
        .args(["funnel", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Stage,Count,Percent of Total,Drop-off"))
        .stdout(predicate::str::contains("Landing Page,500,100.00,0.00"))
        .stdout(predicate::str::contains("Purchase Complete,"));
}

#[test]
fn test_funnel_json_has_bottlenecks() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 500);

    let output = funnelscope(temp.path())
        .args(["funnel", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metrics"]["total_sessions"], 500);
    assert_eq!(json["stages"].as_array().unwrap().len(), 5);
    assert!(json["bottlenecks"].is_array());
}

#[test]
fn test_segments_by_device() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 300);

    funnelscope(temp.path())
        .args(["segments", "--by", "device", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("device,Sessions"))
        .stdout(predicate::str::contains("Mobile,"));
}

#[test]
fn test_segments_rejects_unknown_dimension() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .args(["segments", "--by", "color"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_trends_weekly() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 300);

    funnelscope(temp.path())
        .args(["trends", "--period", "weekly", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Week,Sessions"))
        .stdout(predicate::str::contains("-W"));
}

#[test]
fn test_report_writes_three_files() {
    let temp = TempDir::new().unwrap();
    generate(temp.path(), 600);

    funnelscope(temp.path())
        .args(["load", "--format", "json"])
        .assert()
        .success();

    funnelscope(temp.path())
        .args(["report", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("insights,"));

    let reports = temp.path().join("reports");
    let insights = std::fs::read_to_string(reports.join("business_insights.md")).unwrap();
    assert!(insights.contains("## Key Performance Indicators"));
    assert!(insights.contains("| **Total Sessions** | 600 |"));

    let sql = std::fs::read_to_string(reports.join("analytical_queries.sql")).unwrap();
    assert!(sql.contains("-- Query 1:"));

    let csv = std::fs::read_to_string(reports.join("recommendations.csv")).unwrap();
    assert!(csv.starts_with("Priority,Category,Issue,Current Rate,Recommendation,Expected Impact"));
    assert!(csv.contains("Cart Recovery"));
}

#[test]
fn test_run_complete_pipeline() {
    let temp = TempDir::new().unwrap();

    funnelscope(temp.path())
        .args(["run", "-n", "800", "--seed", "3", "--format", "table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sessions,800"))
        .stdout(predicate::str::contains("Seed,3"));

    assert!(temp.path().join("data").join("dataset.json").exists());
    assert!(temp.path().join("db").join("ecommerce.db").exists());
    assert!(temp.path().join("reports").join("business_insights.md").exists());
}

#[test]
fn test_tables_prints_json() {
    let output = Command::new(funnelscope_bin()).arg("tables").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["traffic_sources"].as_array().unwrap().len() >= 5);
}

#[test]
fn test_generate_with_custom_tables() {
    let temp = TempDir::new().unwrap();

    let tables = Command::new(funnelscope_bin()).arg("tables").output().unwrap();
    let tables_path = temp.path().join("tables.json");
    std::fs::write(&tables_path, &tables.stdout).unwrap();

    funnelscope(temp.path())
        .args(["generate", "-n", "50", "--seed", "5", "--format", "json", "--tables"])
        .arg(&tables_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"sessions\": 50"));
}
