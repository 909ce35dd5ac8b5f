//! Integration tests for the pixdiff CLI.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// Run the pixdiff binary with `args`.
fn pixdiff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pixdiff"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run pixdiff")
}

/// Write a solid-color RGBA PNG.
fn create_solid_png(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(path)
        .expect("Failed to write PNG");
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_identical_images() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");

    create_solid_png(&img1, 16, 16, [128, 128, 128, 255]);
    create_solid_png(&img2, 16, 16, [128, 128, 128, 255]);

    let output = pixdiff(&[path_str(&img1), path_str(&img2)]);

    assert!(output.status.success(), "Exit code should be 0");
    let out = stdout(&output);
    assert!(out.contains("Similarity score:"), "Should output score");
    assert!(out.contains("100.00%"), "Identical images score 100, got {out}");
}

#[test]
fn test_white_vs_black_quiet() {
    let dir = TempDir::new().unwrap();
    let white = dir.path().join("white.png");
    let black = dir.path().join("black.png");

    create_solid_png(&white, 1, 1, [255, 255, 255, 255]);
    create_solid_png(&black, 1, 1, [0, 0, 0, 255]);

    let output = pixdiff(&["--quiet", path_str(&white), path_str(&black)]);
    assert!(output.status.success());

    let score: f64 = stdout(&output)
        .trim()
        .parse()
        .expect("Should output just a number");
    assert!((score - 9.0909).abs() < 1e-3, "got {score}");
}

#[test]
fn test_size_mismatch_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let big = dir.path().join("big.png");
    let small = dir.path().join("small.png");

    create_solid_png(&big, 20, 10, [10, 20, 30, 255]);
    create_solid_png(&small, 10, 10, [10, 20, 30, 255]);

    let output = pixdiff(&["--json", path_str(&big), path_str(&small)]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["diff_size"], serde_json::json!([20, 10]));
    assert_eq!(json["visible_pixels"], 100);
}

#[test]
fn test_min_score_pass() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");

    create_solid_png(&img1, 8, 8, [128, 128, 128, 255]);
    create_solid_png(&img2, 8, 8, [128, 128, 128, 255]);

    let output = pixdiff(&["--min-score", "95", path_str(&img1), path_str(&img2)]);
    assert!(output.status.success(), "Should pass when score >= min-score");
}

#[test]
fn test_min_score_fail() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("black.png");
    let img2 = dir.path().join("white.png");

    create_solid_png(&img1, 8, 8, [0, 0, 0, 255]);
    create_solid_png(&img2, 8, 8, [255, 255, 255, 255]);

    let output = pixdiff(&["--min-score", "50", path_str(&img1), path_str(&img2)]);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Should exit with code 1 when score < min-score"
    );
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");

    create_solid_png(&img1, 8, 8, [128, 128, 128, 255]);
    create_solid_png(&img2, 8, 8, [128, 128, 128, 255]);

    let output = pixdiff(&["--json", path_str(&img1), path_str(&img2)]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["score"], 100.0);
    assert_eq!(json["tier"], "high");
    assert_eq!(json["candidate_size"], serde_json::json!([8, 8]));
    assert_eq!(json["params"]["noise_floor"], 0.005);
    assert_eq!(json["params"]["weights"]["g"], 0.587);
    assert!(json.get("threshold_failed").is_none());
}

#[test]
fn test_tier_format() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");

    create_solid_png(&img1, 8, 8, [0, 0, 0, 255]);
    create_solid_png(&img2, 8, 8, [255, 255, 255, 255]);

    let output = pixdiff(&["--tier", "--color=never", path_str(&img1), path_str(&img2)]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("(low)"), "Should show tier, got {out}");
    assert!(out.contains("Visible differences: 64 of 64 pixels"));
}

#[test]
fn test_diff_output() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");
    let diff = dir.path().join("diff.png");

    let mut a = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let b = a.clone();
    a.put_pixel(2, 1, Rgba([0, 0, 0, 255]));
    a.save(&img1).unwrap();
    b.save(&img2).unwrap();

    let output = pixdiff(&["--diff", path_str(&diff), path_str(&img1), path_str(&img2)]);
    assert!(output.status.success());

    let overlay = image::open(&diff).expect("diff written").to_rgba8();
    assert_eq!(overlay.dimensions(), (4, 4));
    assert_eq!(overlay.get_pixel(0, 0).0[3], 0, "unchanged pixel is transparent");
    let changed = overlay.get_pixel(2, 1).0;
    assert_eq!(changed[3], 255, "changed pixel is opaque");
    assert_eq!(changed[0], 255, "large difference is red-dominant");
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let img1 = dir.path().join("img1.png");
    let img2 = dir.path().join("img2.png");
    let config = dir.path().join("pixdiff.toml");

    // Differ only in alpha.
    create_solid_png(&img1, 4, 4, [50, 50, 50, 255]);
    create_solid_png(&img2, 4, 4, [50, 50, 50, 0]);

    fs::write(&config, "min_score = 99.0\n\n[params.weights]\na = 0.0\n").unwrap();

    // With alpha ignored the images are identical.
    let output = pixdiff(&["-c", path_str(&config), "-s", path_str(&img1), path_str(&img2)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "100.0000");

    // Without the config the alpha gap costs points.
    let output = pixdiff(&["-s", path_str(&img1), path_str(&img2)]);
    let score: f64 = stdout(&output).trim().parse().unwrap();
    assert!(score < 100.0);

    // Flags win over the config file.
    let output = pixdiff(&[
        "-c",
        path_str(&config),
        "--weights",
        "0.299,0.587,0.114,0.1",
        "-s",
        path_str(&img1),
        path_str(&img2),
    ]);
    assert_eq!(output.status.code(), Some(1), "config min_score applies");
}

#[test]
fn test_invalid_params() {
    let dir = TempDir::new().unwrap();
    let img = dir.path().join("img.png");
    create_solid_png(&img, 2, 2, [0, 0, 0, 255]);

    let output = pixdiff(&["--noise-floor", "2", path_str(&img), path_str(&img)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("noise_floor"), "got {stderr}");
}

#[test]
fn test_missing_file() {
    let output = pixdiff(&["nonexistent1.png", "nonexistent2.png"]);

    assert_eq!(
        output.status.code(),
        Some(2),
        "Should exit with code 2 on error"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should print error message");
    assert!(stderr.contains("nonexistent1.png"), "Should name the file");
}

#[test]
fn test_batch_mode() {
    let dir = TempDir::new().unwrap();
    let cands = dir.path().join("candidates");
    let targets = dir.path().join("targets");
    let diffs = dir.path().join("diffs");
    fs::create_dir_all(&cands).unwrap();
    fs::create_dir_all(&targets).unwrap();

    create_solid_png(&cands.join("a.png"), 8, 8, [100, 100, 100, 255]);
    create_solid_png(&targets.join("a.png"), 8, 8, [100, 100, 100, 255]);
    create_solid_png(&cands.join("b.png"), 8, 8, [50, 50, 50, 255]);
    create_solid_png(&targets.join("b.png"), 8, 8, [60, 60, 60, 255]);
    // No partner, skipped.
    create_solid_png(&cands.join("c.png"), 8, 8, [0, 0, 0, 255]);

    let output = pixdiff(&[
        "--batch",
        "--color=never",
        "--diff",
        path_str(&diffs),
        path_str(&cands),
        path_str(&targets),
    ]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("a.png"), "Should list a.png");
    assert!(out.contains("b.png"), "Should list b.png");
    assert!(!out.contains("c.png"), "Should skip unmatched c.png");
    assert!(out.contains("Summary"), "Should show summary");
    assert!(out.contains("Total: 2"));

    assert!(diffs.join("a.diff.png").exists());
    assert!(diffs.join("b.diff.png").exists());
}

#[test]
fn test_batch_json() {
    let dir = TempDir::new().unwrap();
    let cands = dir.path().join("c");
    let targets = dir.path().join("t");
    fs::create_dir_all(&cands).unwrap();
    fs::create_dir_all(&targets).unwrap();

    create_solid_png(&cands.join("x.png"), 4, 4, [0, 0, 0, 255]);
    create_solid_png(&targets.join("x.png"), 4, 4, [255, 255, 255, 255]);

    let output = pixdiff(&["--json", "--min-score", "80", path_str(&cands), path_str(&targets)]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["summary"]["total"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["results"][0]["threshold_failed"], true);
}

#[test]
fn test_version() {
    let output = pixdiff(&["--version"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("pixdiff"), "Should show name");
    assert!(out.contains("0."), "Should show version");
}

#[test]
fn test_help() {
    let output = pixdiff(&["--help"]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("CANDIDATE"), "Should show CANDIDATE arg");
    assert!(out.contains("TARGET"), "Should show TARGET arg");
    assert!(out.contains("--min-score"), "Should show --min-score");
    assert!(out.contains("--batch"), "Should show --batch");
}
