use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn funnelscope_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("funnelscope")
}

fn completion_script(shell: &str) -> String {
    let output = Command::new(funnelscope_bin())
        .args(["completion", "--shell", shell])
        .output()
        .unwrap();
    assert!(output.status.success(), "completion for {} failed", shell);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_bash_script_covers_analysis_commands() {
    let script = completion_script("bash");

    for subcommand in ["generate", "segments", "trends", "report", "run", "tables"] {
        assert!(script.contains(subcommand), "missing subcommand {}", subcommand);
    }
    for flag in ["--by", "--period", "--seed", "--data-dir", "--reports-dir"] {
        assert!(script.contains(flag), "missing flag {}", flag);
    }
}

#[test]
fn test_scripts_offer_segment_and_period_values() {
    for shell in ["bash", "zsh", "fish"] {
        let script = completion_script(shell);
        for value in ["traffic_source", "customer_type", "day_of_week", "daily", "weekly"] {
            assert!(
                script.contains(value),
                "{} completion is missing value {}",
                shell,
                value
            );
        }
    }
}

#[test]
fn test_format_values_offered() {
    let script = completion_script("fish");
    assert!(script.contains("pretty"));
    assert!(script.contains("json"));
    assert!(script.contains("table"));
}

#[test]
fn test_completion_help_lists_install_paths() {
    Command::new(funnelscope_bin())
        .args(["completion", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("_funnelscope"))
        .stdout(predicate::str::contains("funnelscope.fish"));
}

#[test]
fn test_completion_rejects_unknown_shell() {
    Command::new(funnelscope_bin())
        .args(["completion", "--shell", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_trend_period_alias_accepted() {
    // `week` is an alias of `weekly`; parsing happens before the dataset is read
    Command::new(funnelscope_bin())
        .args(["--data-dir", "/nonexistent/funnelscope", "trends", "--period", "week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("funnelscope generate"));
}
