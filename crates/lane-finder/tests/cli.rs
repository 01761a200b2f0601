#![cfg(feature = "cli")]

use assert_cmd::Command;
use lane_finder::detect::mask_to_image;
use lane_finder::detector::{LaneDetectConfig, LaneDetectReport};
use lane_finder::BinaryMask;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn write_mask(dir: &Path, name: &str, stripes: &[(usize, usize)]) -> PathBuf {
    let mut mask = BinaryMask::new(1280, 720).expect("mask");
    for &(x0, x1) in stripes {
        mask.fill_rect(x0, 0, x1, 720);
    }
    let path = dir.join(name);
    mask_to_image(&mask).save(&path).expect("save png");
    path
}

fn lane_finder() -> Command {
    Command::cargo_bin("lane-finder").expect("binary")
}

#[test]
fn detect_writes_report_for_straight_lanes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mask = write_mask(dir.path(), "lanes.png", &[(295, 306), (975, 986)]);
    let out = dir.path().join("report.json");

    lane_finder()
        .args(["detect", "--mask"])
        .arg(&mask)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("left radius:  straight"))
        .stdout(predicate::str::contains("lane width:   3.594 m"));

    let report = LaneDetectReport::load_json(&out).expect("report");
    assert_eq!(report.width, 1280);
    assert_eq!(report.height, 720);
    assert_eq!(report.num_on_pixels, 2 * 11 * 720);
    assert!(report.error.is_none());
    let det = report.detection.expect("detection");
    assert!(det.search.is_none());
    assert!(det.left.cluster.is_empty());
    assert!((det.left.fit.c - 300.0).abs() < 1e-6);
    assert!((det.right.fit.c - 980.0).abs() < 1e-6);
}

#[test]
fn empty_mask_fails_but_still_writes_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mask = write_mask(dir.path(), "empty.png", &[]);
    let out = dir.path().join("report.json");

    lane_finder()
        .args(["detect", "--mask"])
        .arg(&mask)
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no lane evidence on the left side"));

    let report = LaneDetectReport::load_json(&out).expect("report");
    assert!(report.detection.is_none());
    let err = report.error.expect("error");
    assert!(err.starts_with("incomplete lane fit"), "{err}");
}

#[test]
fn flags_override_config_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mask = write_mask(dir.path(), "lanes.png", &[(295, 306), (975, 986)]);
    let out = dir.path().join("from_config.json");
    let cfg_path = dir.path().join("cfg.json");
    LaneDetectConfig {
        mask_path: mask.to_string_lossy().into_owned(),
        output_path: Some(out.to_string_lossy().into_owned()),
        prior_margin: Some(40),
        ..LaneDetectConfig::default()
    }
    .write_json(&cfg_path)
    .expect("write config");

    lane_finder()
        .args(["detect", "--config"])
        .arg(&cfg_path)
        .args(["--windows", "12", "--margin", "60", "--include-pixels"])
        .assert()
        .success();

    let report = LaneDetectReport::load_json(&out).expect("report");
    assert_eq!(report.params.search.n_windows, 12);
    assert_eq!(report.params.search.margin, 60);
    assert_eq!(report.params.search.min_pixels, 50);
    assert_eq!(report.params.prior_margin, 40);
    assert!(report.config_path.is_some());
    let det = report.detection.expect("detection");
    assert_eq!(det.left.cluster.len(), 11 * 720);
    let search = det.search.expect("trace");
    assert_eq!(search.left_trace.windows.len(), 12);
}

#[test]
fn missing_mask_is_an_error() {
    lane_finder()
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no mask given"));
}

#[test]
fn unreadable_mask_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    lane_finder()
        .args(["detect", "--mask"])
        .arg(dir.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load mask"));
}

#[test]
fn default_config_prints_parsable_json() {
    let output = lane_finder()
        .arg("default-config")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let cfg: LaneDetectConfig = serde_json::from_slice(&output).expect("json");
    assert_eq!(cfg.threshold, 1);
    let params = cfg.build_params();
    assert_eq!(params.search.n_windows, 9);
    assert_eq!(params.search.margin, 100);
}
