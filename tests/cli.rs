//! 命令行集成测试

use std::fs;
use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

const PAGE: &str = "<html><body><div><!--trans:greet--><p>Hello</p><!--trans_end:greet--></div></body></html>";

const ENV_VARS: &[&str] = &[
    "BILINGUAL_LOG_LEVEL",
    "BILINGUAL_STORAGE_PATH",
    "BILINGUAL_STORAGE_KEY",
    "BILINGUAL_DEFAULT_VIEW",
    "BILINGUAL_SINGLE_ELEMENT_MODE",
    "BILINGUAL_INJECT_ASSETS",
    "BILINGUAL_PROCESS_COMMON",
];

fn bilingual(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bilingual").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1");
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    bilingual(dir).args(args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_render_with_translation_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "page.html", PAGE);
    write(dir.path(), "t.json", r#"{"/docs/index.html": {"greet": "你好"}}"#);

    let output = run(
        dir.path(),
        &["render", "page.html", "--translations", "t.json", "--route", "/docs/", "--no-assets"],
    );

    assert!(output.status.success());
    let html = stdout(&output);
    assert!(html.contains(r#"<div class="bilingual-translation"><p>你好</p></div>"#));
    assert!(html.contains(r#"<div class="bilingual-original"><p>Hello</p></div>"#));
    assert!(!html.contains("data-bilingual-assets"));
}

#[test]
fn test_render_stdin_to_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "t.json", r#"{"/": {"greet": "你好"}}"#);

    bilingual(dir.path())
        .args(["render", "-", "-t", "t.json", "-o", "out.html", "--default-view", "original"])
        .write_stdin(PAGE)
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("out.html")).unwrap();
    assert!(html.contains(r#"class="bilingual-container show-original""#));
    assert!(html.contains(r#"<script data-bilingual-assets="script">"#));
}

#[test]
fn test_render_with_common_translations() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "page.html", "<html><body><nav><a href=\"/\">Home</a></nav></body></html>");
    write(dir.path(), "t.json", "{}");
    write(dir.path(), "common.json", r#"{"Home": "首页"}"#);

    let output = run(
        dir.path(),
        &["render", "page.html", "-t", "t.json", "--common", "common.json"],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains(r#"<a href="/" data-bilingual-common="">首页</a>"#));
}

#[test]
fn test_snapshot_commands() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "data.json",
        r#"{"/docs/index.html": {"greet": "你好"}, "/blog": {"a": "甲"}}"#,
    );

    let output = run(dir.path(), &["--storage", "db.redb", "import", "data.json"]);
    assert!(output.status.success());

    let output = run(dir.path(), &["--storage", "db.redb", "routes"]);
    assert_eq!(stdout(&output), "/docs/\n/blog\n");

    let output = run(dir.path(), &["--storage", "db.redb", "export"]);
    let exported: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        exported,
        serde_json::json!({"/docs/": {"greet": "你好"}, "/blog": {"a": "甲"}})
    );

    // 以页面 URL 选择磁盘快照中的路由
    write(dir.path(), "page.html", PAGE);
    let output = run(
        dir.path(),
        &[
            "--storage",
            "db.redb",
            "render",
            "page.html",
            "--url",
            "https://example.com/docs/index.html",
        ],
    );
    assert!(output.status.success());
    assert!(stdout(&output).contains("<p>你好</p>"));

    let output = run(dir.path(), &["--storage", "db.redb", "remove", "/docs/index.html"]);
    assert!(output.status.success());
    let output = run(dir.path(), &["--storage", "db.redb", "routes"]);
    assert_eq!(stdout(&output), "/blog\n");

    let output = run(dir.path(), &["--storage", "db.redb", "clear"]);
    assert!(output.status.success());
    let output = run(dir.path(), &["--storage", "db.redb", "routes"]);
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_default_storage_path_from_config_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bilingual.toml", "storage_path = \"store/data.redb\"\n");
    write(dir.path(), "data.json", r#"{"/": {"k": "v"}}"#);

    let output = run(dir.path(), &["import", "data.json"]);
    assert!(output.status.success());
    assert!(dir.path().join("store/data.redb").exists());
}

#[test]
fn test_invalid_import_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "data.json", "not json");

    let output = run(dir.path(), &["--storage", "db.redb", "import", "data.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "t.json", "{}");

    let output = run(dir.path(), &["render", "missing.html", "-t", "t.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.html"));
}

#[test]
fn test_route_conflicts_with_url() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "page.html", PAGE);

    bilingual(dir.path())
        .args(["render", "page.html", "--route", "/", "--url", "https://example.com/"])
        .assert()
        .failure();
}
