use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(parts: &[&str]) -> PathBuf {
    let path = parts
        .iter()
        .fold(repo_root().join("fixtures"), |p, part| p.join(part));
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

#[test]
fn cli_renders_png_with_configured_size() {
    let root = repo_root();
    let config = fixture(&["category", "config.xml"]);
    let data = fixture(&["category", "sales.xml"]);

    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.png");

    let exe = assert_cmd::cargo_bin!("xmlchart-cli");
    Command::new(exe)
        .current_dir(&root)
        .args([
            "render",
            "--type",
            "BarChart",
            "--config",
            config.to_string_lossy().as_ref(),
            "--out",
            out.to_string_lossy().as_ref(),
            data.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let decoder = png::Decoder::new(fs::File::open(&out).expect("open png"));
    let reader = decoder.read_info().expect("decode png header");
    let info = reader.info();
    assert_eq!((info.width, info.height), (480, 320));
}

#[test]
fn cli_writes_next_to_the_data_file_with_the_format_extension() {
    let root = repo_root();
    let config = fixture(&["pie", "config.xml"]);
    let data = fixture(&["pie", "languages.xml"]);

    let tmp = tempfile::tempdir().expect("tempdir");
    let tmp_data = tmp.path().join("languages.xml");
    fs::copy(&data, &tmp_data).expect("copy fixture");

    let exe = assert_cmd::cargo_bin!("xmlchart-cli");
    Command::new(exe)
        .current_dir(&root)
        .args([
            "--type",
            "PieChart",
            "--config",
            config.to_string_lossy().as_ref(),
            tmp_data.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(tmp_data.with_extension("svgz")).expect("read svgz");
    assert!(bytes.starts_with(&[0x1f, 0x8b]), "output is not gzip");
}

#[test]
fn cli_stream_prints_headers_then_body() {
    let root = repo_root();
    let config = fixture(&["xy", "config.xml"]);
    let data = fixture(&["xy", "temperature.xml"]);

    let exe = assert_cmd::cargo_bin!("xmlchart-cli");
    let output = Command::new(exe)
        .current_dir(&root)
        .args([
            "stream",
            "--type",
            "XYLineChart",
            "--config",
            config.to_string_lossy().as_ref(),
            data.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).expect("utf-8 svg stream");
    let (head, body) = text.split_once("\r\n\r\n").expect("header block");
    assert_eq!(head, "Content-Type: image/svg+xml");
    assert!(body.starts_with("<svg "));
}

#[test]
fn cli_rejects_unknown_chart_types() {
    let root = repo_root();
    let data = fixture(&["category", "sales.xml"]);

    let exe = assert_cmd::cargo_bin!("xmlchart-cli");
    let output = Command::new(exe)
        .current_dir(&root)
        .args([
            "inspect",
            "--type",
            "Histogram",
            data.to_string_lossy().as_ref(),
        ])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Illegal chart type \"Histogram\""), "{stderr}");
}

#[test]
fn cli_usage_errors_exit_with_two() {
    let exe = assert_cmd::cargo_bin!("xmlchart-cli");
    Command::new(exe).args(["render"]).assert().code(2);
}
