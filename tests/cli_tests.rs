//! CLI and basic command tests

mod common;

use common::{eqc, eqc_isolated, json_of, stdout_of, user_config_root};
use predicates::prelude::*;
use std::fs;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    eqc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Equipment quality-control dashboard"))
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_version_displays() {
    eqc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("eqc"));
}

#[test]
fn test_unknown_command_fails() {
    eqc()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_demo_conflicts_with_generator_flags() {
    eqc()
        .args(["generate", "--demo", "--rows", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_completions() {
    eqc()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eqc"));
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_generate_demo_tsv() {
    let out = stdout_of(eqc().args(["generate", "--demo"]));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(
        lines[0],
        "row\tequipment_id\tlot_id\twafer_id\ttimestamp\tmeasurement\tresult"
    );
    assert_eq!(
        lines[3],
        "2\tB\tLOT-DEMO\tW01\t2024-05-03 00:00:00\t11.300\tFAIL"
    );
    // 11.0 sits on the upper limit and passes
    assert!(lines[8].ends_with("11.000\tPASS"));
}

#[test]
fn test_generate_demo_failures_only() {
    eqc()
        .args(["generate", "--demo", "--failures-only", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_generate_demo_json() {
    let json = json_of(eqc().args(["generate", "--demo", "-o", "json"]));
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[2]["equipment_id"], "B");
    assert_eq!(rows[2]["pass_fail"], true);
    assert_eq!(rows[0]["pass_fail"], false);
    assert_eq!(rows[0]["timestamp"], "2024-05-01T00:00:00");
}

#[test]
fn test_generate_csv() {
    let out = stdout_of(eqc().args(["generate", "--demo", "-o", "csv", "--limit", "1"]));
    assert_eq!(
        out,
        "row,equipment_id,lot_id,wafer_id,timestamp,measurement,result\n\
         0,A,LOT-DEMO,W01,2024-05-01 00:00:00,10.200,PASS\n"
    );
}

#[test]
fn test_generate_is_deterministic_per_seed() {
    let (mut first, _tmp1) = eqc_isolated();
    let (mut second, _tmp2) = eqc_isolated();
    let (mut other, _tmp3) = eqc_isolated();

    let a = stdout_of(first.args(["generate", "--rows", "50", "--seed", "7"]));
    let b = stdout_of(second.args(["generate", "--rows", "50", "--seed", "7"]));
    let c = stdout_of(other.args(["generate", "--rows", "50", "--seed", "8"]));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.lines().count(), 51);
}

#[test]
fn test_generate_default_size() {
    let (mut cmd, _tmp) = eqc_isolated();
    cmd.args(["generate", "--count"])
        .assert()
        .success()
        .stdout("500\n");
}

// ============================================================================
// Stats Command Tests
// ============================================================================

#[test]
fn test_stats_demo() {
    let out = stdout_of(eqc().args(["stats", "--demo"]));
    insta::assert_snapshot!(
        out.trim_end(),
        @"equipment_id\tcount\tmean\tmin\tmax\tfailures\tfailure_rate\nA\t3\t10.467\t10.200\t10.700\t0\t0.0%\nB\t3\t11.033\t10.800\t11.300\t1\t33.3%\nC\t3\t10.933\t10.800\t11.100\t1\t33.3%"
    );
}

#[test]
fn test_stats_equipment_filter() {
    let out = stdout_of(eqc().args(["stats", "--demo", "--equipment", "A,C"]));
    let groups: Vec<&str> = out
        .lines()
        .skip(1)
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(groups, vec!["A", "C"]);
}

#[test]
fn test_stats_empty_equipment_selection() {
    let out = stdout_of(eqc().args(["stats", "--demo", "--equipment", ""]));
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn test_stats_unknown_equipment_warns() {
    eqc()
        .args(["stats", "--demo", "--equipment", "A,Z"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown equipment 'Z'"));
}

#[test]
fn test_stats_selection_restricts_groups() {
    let json = json_of(eqc().args(["stats", "--demo", "--select", "0,1", "-o", "json"]));
    let groups = json.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["equipment_id"], "A");
    assert_eq!(groups[0]["count"], 2);
}

#[test]
fn test_stats_brush_window() {
    let json = json_of(eqc().args([
        "stats",
        "--demo",
        "--brush-from",
        "2024-05-03",
        "--brush-min",
        "10.85",
        "-o",
        "json",
    ]));
    let counts: Vec<(String, u64)> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|g| {
            (
                g["equipment_id"].as_str().unwrap().to_string(),
                g["count"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        counts,
        vec![("B".to_string(), 2), ("C".to_string(), 2)]
    );
}

#[test]
fn test_stats_out_of_range_selection_is_ignored() {
    let output = eqc()
        .args(["stats", "--demo", "--select", "3,42"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Selection ignored"));
    // no selection: all three groups
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 4);
}

// ============================================================================
// Dashboard Command Tests
// ============================================================================

#[test]
fn test_dashboard_terminal() {
    eqc()
        .args(["dashboard", "--demo", "--layout", "stacked", "--width", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Equipment quality statistics"))
        .stdout(predicate::str::contains("Per-equipment boxplot"))
        .stdout(predicate::str::contains("Per-equipment mean"))
        .stdout(predicate::str::contains("Per-equipment failure rate"))
        .stdout(predicate::str::contains("Per-equipment time series"))
        .stdout(predicate::str::contains("33.3%"));
}

#[test]
fn test_dashboard_terminal_json() {
    let json = json_of(eqc().args(["dashboard", "--demo", "-o", "json", "--select", "2"]));
    assert_eq!(json["rows_in_view"], 9);
    assert_eq!(json["rows_selected"], 1);
    assert_eq!(json["charts"].as_array().unwrap().len(), 4);
    assert_eq!(json["charts"][0]["kind"], "distribution");
}

#[test]
fn test_dashboard_plotly_json() {
    let json = json_of(eqc().args(["dashboard", "--demo", "--backend", "plotly"]));
    assert_eq!(json["backend"], "plotly");
    let figures = json["figures"].as_array().unwrap();
    assert_eq!(figures.len(), 4);
    assert_eq!(figures[0]["id"], "distribution");
    assert_eq!(figures[0]["figure"]["data"][0]["type"], "box");
    assert_eq!(figures[3]["figure"]["data"][0]["mode"], "lines+markers");
}

#[test]
fn test_dashboard_vega_with_selection() {
    let json = json_of(eqc().args([
        "dashboard",
        "--demo",
        "--backend",
        "vega",
        "--equipment",
        "B,C",
        "--select",
        "0",
        "--time-style",
        "scatter",
    ]));
    assert_eq!(json["backend"], "vega");
    assert_eq!(json["equipment"], serde_json::json!(["B", "C"]));
    assert_eq!(json["rows_selected"], 1);
    let series = &json["figures"][3]["figure"];
    assert_eq!(series["mark"]["type"], "point");
    assert!(series["encoding"]["size"].is_object());
    // mean view only shows the selected row's equipment
    let means = json["figures"][1]["figure"]["data"]["values"].as_array().unwrap();
    assert_eq!(means.len(), 1);
    assert_eq!(means[0]["equipment_id"], "B");
}

#[test]
fn test_dashboard_html_export() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("out/dashboard.html");

    eqc()
        .args(["dashboard", "--demo", "--backend", "plotly", "--out"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote plotly dashboard"));

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("Per-equipment failure rate"));
    assert!(html.contains("panels grid"));
}

#[test]
fn test_dashboard_html_needs_chart_backend() {
    let tmp = tempfile::TempDir::new().unwrap();
    eqc()
        .args(["dashboard", "--demo", "--backend", "terminal", "--out"])
        .arg(tmp.path().join("x.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTML export needs a chart backend"));
    assert!(!tmp.path().join("x.html").exists());
}

#[test]
fn test_dashboard_interactive_needs_terminal() {
    eqc()
        .args(["dashboard", "--demo", "--interactive"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a terminal"));
}

#[test]
fn test_dashboard_width_lower_bound() {
    eqc()
        .args(["dashboard", "--demo", "--width", "10"])
        .assert()
        .failure();
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_project_config_is_applied() {
    let (mut cmd, tmp) = eqc_isolated();
    fs::write(tmp.path().join("eqc.yaml"), "generator:\n  rows: 30\n").unwrap();

    cmd.args(["generate", "--count"])
        .assert()
        .success()
        .stdout("30\n");
}

#[cfg(target_os = "linux")]
#[test]
fn test_user_config_comes_from_isolated_home() {
    let (mut cmd, tmp) = eqc_isolated();
    let user_dir = user_config_root(&tmp).join("eqc");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(user_dir.join("config.yaml"), "generator:\n  rows: 7\n").unwrap();

    cmd.args(["generate", "--count"])
        .assert()
        .success()
        .stdout("7\n");
}

#[cfg(target_os = "linux")]
#[test]
fn test_project_config_overrides_user_config() {
    let (mut cmd, tmp) = eqc_isolated();
    let user_dir = user_config_root(&tmp).join("eqc");
    fs::create_dir_all(&user_dir).unwrap();
    fs::write(
        user_dir.join("config.yaml"),
        "generator:\n  rows: 7\n  seed: 3\n",
    )
    .unwrap();
    fs::write(tmp.path().join("eqc.yaml"), "generator:\n  rows: 9\n").unwrap();

    cmd.args(["generate", "--count"])
        .assert()
        .success()
        .stdout("9\n");
}

#[test]
fn test_explicit_config_overrides_project_config() {
    let (mut cmd, tmp) = eqc_isolated();
    fs::write(tmp.path().join("eqc.yaml"), "generator:\n  rows: 30\n").unwrap();
    let explicit = tmp.path().join("override.yaml");
    fs::write(&explicit, "generator:\n  rows: 12\n").unwrap();

    cmd.args(["generate", "--count", "--config"])
        .arg(&explicit)
        .assert()
        .success()
        .stdout("12\n");
}

#[test]
fn test_invalid_config_is_rejected() {
    let (mut cmd, tmp) = eqc_isolated();
    fs::write(tmp.path().join("eqc.yaml"), "generator:\n  rows: 0\n").unwrap();

    cmd.args(["generate", "--count"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration schema"));
}

#[test]
fn test_config_limits_drive_classification() {
    let (mut cmd, tmp) = eqc_isolated();
    // nothing can pass inside an interval far from the target
    fs::write(
        tmp.path().join("eqc.yaml"),
        "limits:\n  lsl: 100.0\n  usl: 101.0\ngenerator:\n  rows: 20\n",
    )
    .unwrap();

    cmd.args(["generate", "--failures-only", "--count"])
        .assert()
        .success()
        .stdout("20\n");
}
