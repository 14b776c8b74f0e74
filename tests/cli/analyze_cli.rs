use serde_json::json;

use crate::helpers::{run_tubestats, sample_videos, stdout_json, videos_file};

#[test]
fn analyze_prints_report_json() {
    let input = videos_file(&sample_videos());

    let output = run_tubestats(&["analyze", "--input", input.path().to_str().unwrap()], &[]);
    let report = stdout_json(&output);

    assert_eq!(report["all_videos"].as_array().unwrap().len(), 4);
    assert_eq!(report["monthly_summary"].as_array().unwrap().len(), 2);
    assert_eq!(report["view_brackets"].as_array().unwrap().len(), 10);
    assert_eq!(report["top_videos"][0]["id"], "d");
}

#[test]
fn analyze_honours_report_options() {
    let input = videos_file(&sample_videos());

    let output = run_tubestats(
        &[
            "analyze",
            "--input",
            input.path().to_str().unwrap(),
            "--short-threshold",
            "600",
            "--brackets",
            "0,10000",
            "--top-n",
            "1",
            "--dense-months",
        ],
        &[],
    );
    let report = stdout_json(&output);

    let shorts = report["all_videos"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["category"] == "Short")
        .count();
    assert_eq!(shorts, 3, "600 seconds is still a Short");
    assert_eq!(report["view_brackets"].as_array().unwrap().len(), 2);
    assert_eq!(report["top_videos"].as_array().unwrap().len(), 1);
    assert_eq!(report["monthly_summary"].as_array().unwrap().len(), 3);
}

#[test]
fn analyze_writes_output_file() {
    let input = videos_file(&sample_videos());
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out_path = dir.path().join("report.json");

    let output = run_tubestats(
        &[
            "analyze",
            "--input",
            input.path().to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
        ],
        &[],
    );

    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty(), "report goes to the file only");
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written["top_n"], 20);
}

#[test]
fn analyze_empty_input_requires_videos_flag_to_fail() {
    let input = videos_file(&json!([]));
    let path = input.path().to_str().unwrap();

    let report = stdout_json(&run_tubestats(&["analyze", "--input", path], &[]));
    assert!(report["view_brackets"].as_array().unwrap().is_empty());

    let output = run_tubestats(&["analyze", "--input", path, "--require-videos"], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no videos to report on"));
}

#[test]
fn analyze_rejects_unsorted_brackets() {
    let input = videos_file(&sample_videos());

    let output = run_tubestats(
        &[
            "analyze",
            "--input",
            input.path().to_str().unwrap(),
            "--brackets",
            "0,5000,1000",
        ],
        &[],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid view bracket boundaries"));
}

#[test]
fn analyze_rejects_negative_threshold() {
    let input = videos_file(&sample_videos());

    let output = run_tubestats(
        &[
            "analyze",
            "--input",
            input.path().to_str().unwrap(),
            "--short-threshold",
            "-1",
        ],
        &[],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid short/long threshold"));
}

#[test]
fn analyze_rejects_non_numeric_threshold() {
    let input = videos_file(&sample_videos());

    let output = run_tubestats(
        &[
            "analyze",
            "--input",
            input.path().to_str().unwrap(),
            "--short-threshold",
            "abc",
        ],
        &[],
    );

    assert_eq!(output.status.code(), Some(2), "rejected by argument parsing");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid short/long threshold"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn analyze_reports_malformed_input() {
    let input = videos_file(&json!({ "not": "an array" }));

    let output = run_tubestats(&["analyze", "--input", input.path().to_str().unwrap()], &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a JSON array of videos"));
}
