use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, content).expect("write temp file");
    path
}

fn records(name: &str) -> PathBuf {
    let lines: Vec<String> = (1..=9)
        .map(|day| {
            let rested = day % 2 == 1;
            format!(
                r#"{{"date": "2026-03-{day:02}", "sleep_hours": {sleep}, "nervous_system_state": "{ns}", "focus_hours_actual": 4, "what_shipped": "notes", "actions": ["{action}"]}}"#,
                sleep = if rested { 8 } else { 4 },
                ns = if rested { "regulated" } else { "spiked" },
                action = if rested { "ship" } else { "regulate" },
            )
        })
        .collect();
    temp_file(name, &(lines.join("\n\n") + "\n"))
}

fn tagwerk() -> Command {
    let mut cmd = Command::cargo_bin("tagwerk").expect("binary exists");
    cmd.env_remove("TAGWERK_CONFIG");
    cmd
}

#[test]
fn report_runs_the_pipeline() {
    let records = records("tagwerk_cli_report.jsonl");
    let rules = temp_file(
        "tagwerk_cli_rules.json",
        r#"[{"id": "ship", "name": "Ship when rested", "action": "ship",
             "conditions": [{"component": "ge", "operator": ">", "threshold": 0.5}]}]"#,
    );

    let output = tagwerk()
        .args(["report", "--today", "2026-03-09", "--records"])
        .arg(&records)
        .arg("--rules")
        .arg(&rules)
        .output()
        .expect("run tagwerk");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON report");
    assert_eq!(report["records_read"], 9);
    assert_eq!(report["transitions"].as_array().map(Vec::len), Some(9));
    assert_eq!(report["values"]["status"], "ready");
    assert_eq!(report["clusters"]["status"], "ready");
    assert_eq!(report["rules"][0]["match_count"], 5);
    assert_eq!(report["rules"][0]["followed_count"], 5);
    assert_eq!(report["rules"][0]["is_active"], true);
    assert_eq!(report["transitions"][8]["td_error"], serde_json::Value::Null);

    let _ = std::fs::remove_file(records);
    let _ = std::fs::remove_file(rules);
}

#[test]
fn short_history_is_reported_not_failed() {
    let records = temp_file(
        "tagwerk_cli_single.jsonl",
        "{\"date\": \"2026-03-01\", \"sleep_hours\": 7}\n",
    );
    tagwerk()
        .args(["report", "--today", "2026-03-01", "--records"])
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("insufficient_history"));
    let _ = std::fs::remove_file(records);
}

#[test]
fn malformed_line_fails_with_line_number() {
    let records = temp_file(
        "tagwerk_cli_broken.jsonl",
        "{\"date\": \"2026-03-01\"}\n\nnot json\n",
    );
    tagwerk()
        .args(["report", "--today", "2026-03-01", "--records"])
        .arg(&records)
        .assert()
        .failure()
        .stderr(predicate::str::contains(":3:"));
    let _ = std::fs::remove_file(records);
}

#[test]
fn invalid_operator_aborts() {
    let records = records("tagwerk_cli_operator.jsonl");
    let rules = temp_file(
        "tagwerk_cli_bad_rules.json",
        r#"[{"id": "x", "name": "x", "action": "ship",
             "conditions": [{"component": "ge", "operator": "~", "threshold": 0.5}]}]"#,
    );
    tagwerk()
        .args(["report", "--today", "2026-03-09", "--records"])
        .arg(&records)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read rules"));
    let _ = std::fs::remove_file(records);
    let _ = std::fs::remove_file(rules);
}

#[test]
fn audit_covers_one_week() {
    let records = records("tagwerk_cli_audit.jsonl");
    let output = tagwerk()
        .args(["audit", "--week-start", "2026-03-02", "--records"])
        .arg(&records)
        .output()
        .expect("run tagwerk");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let audit: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON audit");
    assert_eq!(audit["week_end"], "2026-03-08");
    assert_eq!(audit["transition_count"], 7);
    assert_eq!(audit["policy"]["rules_evaluated"], 0);
    let _ = std::fs::remove_file(records);
}

#[test]
fn regimes_prints_the_configured_table() {
    tagwerk()
        .arg("regimes")
        .assert()
        .success()
        .stdout(predicate::str::contains("peak_performance"))
        .stdout(predicate::str::contains("cold_start"));

    let config = temp_file(
        "tagwerk_cli_config.json",
        r#"{"regimes": [{"label": "only", "prototype": {"ge": 0.5, "gi": 0.5, "gvc": 0.5,
            "kappa": 0.5, "optionality": 0.5, "gd": 0.5, "gn": 0.5, "j": 0.5,
            "fragmentation": 0.5, "theta": 0.5}}]}"#,
    );
    tagwerk()
        .env("TAGWERK_CONFIG", &config)
        .arg("regimes")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"only\""))
        .stdout(predicate::str::contains("peak_performance").not());
    let _ = std::fs::remove_file(config);
}

#[test]
fn rejects_malformed_dates() {
    tagwerk()
        .args(["report", "--today", "03/09/2026", "--records", "unused.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}
