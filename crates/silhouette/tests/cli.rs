#![cfg(feature = "cli")]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn write_square(path: &Path, size: u32, side: u32) {
    let lo = (size - side) / 2;
    let img = image::GrayImage::from_fn(size, size, |x, y| {
        let inside = (lo..lo + side).contains(&x) && (lo..lo + side).contains(&y);
        image::Luma([if inside { 255 } else { 0 }])
    });
    img.save(path).expect("write png");
}

fn silhouette() -> Command {
    Command::cargo_bin("silhouette").expect("binary built")
}

#[test]
fn analyze_prints_summary_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("square.png");
    write_square(&img, 120, 80);

    let out = silhouette()
        .args(["--log-level", "off", "analyze"])
        .arg(&img)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(json["area"], 6400.0);
    assert_eq!(json["selection"], "valid");
    assert_eq!(json["descriptors"]["corner_count"], 4.0);
    assert_eq!(json["distances"]["entries"].as_array().map(Vec::len), Some(4));
}

#[test]
fn analyze_honours_config_and_dump_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = dir.path().join("tight.png");
    write_square(&img, 100, 80);
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{ "features": { "binarize": { "polarity_rule": "border_mean" } } }"#,
    )
    .expect("config");
    let output = dir.path().join("summary.json");
    let dump = dir.path().join("dump");

    silhouette()
        .args(["--log-level", "off", "analyze"])
        .arg(&img)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .arg("--dump-dir")
        .arg(&dump)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).expect("summary")).expect("json");
    assert_eq!(json["area"], 6400.0);
    for name in ["mask_filled.png", "rotate_45.png", "scale_50.png"] {
        assert!(dump.join(name).is_file(), "missing {name}");
    }
}

#[test]
fn batch_reports_failures_without_aborting() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_square(&dir.path().join("trainimage1_1.png"), 120, 80);
    write_square(&dir.path().join("trainimage1_2.png"), 120, 60);
    write_square(&dir.path().join("trainimage2_1.png"), 64, 0);
    std::fs::write(dir.path().join("broken.png"), b"not a png").expect("junk");

    let out = silhouette()
        .args(["--log-level", "off", "batch"])
        .arg(dir.path())
        .arg("--exclude-fallback")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(json["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["failures"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["robustness"]["images"], 2);
    assert_eq!(json["discrimination"]["classes"][0]["label"], "class_1");
}

#[test]
fn missing_image_fails_with_message() {
    silhouette()
        .args(["analyze", "/no/such/image.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
