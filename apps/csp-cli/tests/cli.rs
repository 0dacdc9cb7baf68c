// cli.rs — Drive the `csp` binary end to end.

use std::fs;
use std::process::{Command, Output};

use tempfile::tempdir;

fn csp(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csp"))
        .args(args)
        .output()
        .expect("failed to run csp")
}

fn csp_with_log(rust_log: Option<&str>, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_csp"));
    match rust_log {
        Some(filter) => command.env("RUST_LOG", filter),
        None => command.env_remove("RUST_LOG"),
    };
    command.args(args).output().expect("failed to run csp")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn parse_lists_normalized_directives() {
    let output = csp(&["parse", "img-src b.com a.com b.com; upgrade-insecure-requests"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "img-src a.com b.com\nupgrade-insecure-requests\n"
    );
}

#[test]
fn parse_json_prints_directive_map() {
    let output = csp(&["parse", "--json", "default-src 'none' *"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["default-src"], serde_json::json!(["'none'"]));
}

#[test]
fn strict_parse_rejects_semicolon_tokens() {
    let output = csp(&["parse", "--strict", "img-src a.com;b.com"]);
    assert!(!output.status.success());
}

#[test]
fn merge_prints_canonical_union() {
    let output = csp(&[
        "merge",
        "default-src x.com; report-to a",
        "default-src y.com; report-to b",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "default-src x.com y.com; report-to b\n");
}

#[test]
fn normalize_rewrites_parsed_policy() {
    let output = csp(&["normalize", "script-src b.com a.com; default-src 'self'"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "default-src 'self'; script-src a.com b.com\n");
}

#[test]
fn sources_falls_back_to_default() {
    let output = csp(&["sources", "default-src b.com a.com", "font"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a.com\nb.com\n");

    let output = csp(&["sources", "default-src a.com", "font-src"]);
    assert!(!output.status.success());
}

#[test]
fn check_exit_status_reflects_decision() {
    let allowed = csp(&[
        "check",
        "default-src 'self'",
        "img",
        "https://example.com/a.png",
        "--self-origin",
        "https://example.com",
    ]);
    assert!(allowed.status.success());
    assert_eq!(stdout(&allowed), "allow\n");

    let denied = csp(&["check", "default-src 'none'", "img", "https://example.com/a.png"]);
    assert!(!denied.status.success());
    assert!(stdout(&denied).starts_with("deny: "));
}

#[test]
fn config_show_and_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("csp.toml");
    fs::write(
        &path,
        r#"
self-origin = "https://example.com"

[[policy]]
source = "default-src 'self'"

[[policy]]
script-src = ["https://cdn.example.com"]
"#,
    )
    .unwrap();
    let path = path.to_str().unwrap();

    let output = csp(&["config", path, "show"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "default-src 'self'; script-src https://cdn.example.com\n"
    );

    let output = csp(&["config", path, "check", "img", "https://example.com/logo.png"]);
    assert!(output.status.success());

    let output = csp(&["config", path, "check", "script", "http://cdn.example.com/app.js"]);
    assert!(!output.status.success());
}

#[test]
fn rust_log_controls_library_level() {
    let args = ["parse", "default-src 'self'"];

    let quiet = csp_with_log(None, &args);
    assert!(quiet.status.success());
    assert!(!stderr(&quiet).contains("parsed policy"));

    let debug = csp_with_log(Some("csp_policy=debug"), &args);
    assert!(debug.status.success());
    assert!(stderr(&debug).contains("parsed policy"), "{}", stderr(&debug));
    assert_eq!(stdout(&debug), "default-src 'self'\n");

    let verbose = csp_with_log(None, &["--verbose", "parse", "default-src 'self'"]);
    assert!(stderr(&verbose).contains("parsed policy"));
}
