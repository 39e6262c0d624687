#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::Command;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/taxel-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn write_layout(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("layout.json");
    std::fs::write(&path, json).expect("layout file should be writable");
    path
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_taxel"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_reports_layout_geometry() {
    let dir = unique_temp_dir("info");
    let layout = write_layout(
        &dir,
        r#"{
            "row_array": [0, 1, 2],
            "column_array": [3, 2, 1, 0],
            "bytes_per_point": 2,
            "buffer_length": 8
        }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_taxel"))
        .arg("--format")
        .arg("json")
        .arg("info")
        .arg("--layout")
        .arg(&layout)
        .output()
        .expect("info should run");

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("info should emit json");
    assert_eq!(payload["rows"], 3);
    assert_eq!(payload["cols"], 4);
    assert_eq!(payload["sample_width_bytes"], 2);
    // header (6) + 4 cols * 2 bytes + crc (2)
    assert_eq!(payload["packet_len"], 16);
    assert_eq!(payload["column_order"], serde_json::json!([3, 2, 1, 0]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_layout_exits_data_invalid() {
    let dir = unique_temp_dir("badlayout");
    let layout = write_layout(
        &dir,
        r#"{"row_array": [0], "column_array": [0], "bytes_per_point": 4}"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_taxel"))
        .arg("info")
        .arg("--layout")
        .arg(&layout)
        .output()
        .expect("info should run");

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported sample width"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_capture_exits_failure() {
    let dir = unique_temp_dir("missing");
    let layout = write_layout(&dir, r#"{"row_array": [0], "column_array": [0]}"#);

    let output = Command::new(env!("CARGO_BIN_EXE_taxel"))
        .arg("decode")
        .arg(dir.join("no-such.capture"))
        .arg("--layout")
        .arg(&layout)
        .output()
        .expect("decode should run");

    assert_eq!(output.status.code(), Some(1));

    let _ = std::fs::remove_dir_all(&dir);
}
