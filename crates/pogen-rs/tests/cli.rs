//! End-to-end tests running the binary on real template files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pogen-rs"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("binary runs")
}

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_generate_rewrites_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "views/a.soy", "<html><body>{$content}</body></html>");
    write(dir.path(), "views/b.ejs", "<ul><li><%= item %></li></ul>");
    write(dir.path(), "views/notes.txt", "<p>{$ignored}</p>");

    let output = run(dir.path(), &["generate", "--prefix", "_", "views"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(
        read(dir.path(), "views/a.soy"),
        "<html><body id=\"_0\">{$content}</body></html>"
    );
    assert_eq!(read(dir.path(), "views/b.ejs"), "<ul><li id=\"_1\"><%= item %></li></ul>");
    assert_eq!(read(dir.path(), "views/notes.txt"), "<p>{$ignored}</p>");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 template(s) checked, 2 updated"), "{stdout}");
}

#[test]
fn test_generate_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "page.soy", "<div><p>{$a}</p><p>{$b}</p></div>");

    assert!(run(dir.path(), &["generate", "page.soy"]).status.success());
    let once = read(dir.path(), "page.soy");
    assert_eq!(
        once,
        "<div><p id=\"__pogen_0\">{$a}</p><p id=\"__pogen_1\">{$b}</p></div>"
    );

    let output = run(dir.path(), &["generate", "page.soy"]);
    assert!(output.status.success());
    assert_eq!(read(dir.path(), "page.soy"), once);
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 updated"));
}

#[test]
fn test_dry_run_leaves_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = "<p>{$x}</p>";
    write(dir.path(), "t.soy", source);

    let output = run(dir.path(), &["generate", "--dry-run", "t.soy"]);
    assert!(output.status.success());
    assert_eq!(read(dir.path(), "t.soy"), source);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("would update t.soy (1 new)"), "{stdout}");
}

#[test]
fn test_parse_failure_reported_and_others_processed() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.soy", "<p>\n  {foreach $x in $xs}{$x}</p>");
    write(dir.path(), "good.soy", "<p>{$y}</p>");

    let output = run(dir.path(), &["generate", "--prefix", "_", "."]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.soy:2:3: error: unbalanced loop markers"), "{stderr}");
    assert_eq!(read(dir.path(), "good.soy"), "<p id=\"_0\">{$y}</p>");
}

#[test]
fn test_class_attribute_from_config() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pogen.json", r#"{ "attribute": "class", "prefix": "_" }"#);
    write(dir.path(), "t.soy", "<p class='lead'>{$x}</p>");

    assert!(run(dir.path(), &["generate", "t.soy"]).status.success());
    assert_eq!(
        read(dir.path(), "t.soy"),
        "<!--POGEN,_0,x,{$x}--><p class='_0 lead'>{$x}</p>"
    );
}

#[test]
fn test_config_dialect_override_and_ignore() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "conf/pogen.json",
        r#"{ "prefix": "_", "ignore": ["vendor/**"], "dialects": { ".tpl": "ejs" } }"#,
    );
    write(dir.path(), "src/a.tpl", "<b><%= who %></b>");
    write(dir.path(), "src/vendor/c.soy", "<i>{$v}</i>");

    let output = run(
        dir.path(),
        &["--config", "conf/pogen.json", "generate", "src"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read(dir.path(), "src/a.tpl"), "<b id=\"_0\"><%= who %></b>");
    assert_eq!(read(dir.path(), "src/vendor/c.soy"), "<i>{$v}</i>");
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "pogen.json", r#"{ "dialects": { ".tpl": "jinja" } }"#);
    write(dir.path(), "t.soy", "<p>{$x}</p>");

    let output = run(dir.path(), &["generate", "t.soy"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("jinja"));
}

#[test]
fn test_empty_prefix_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = "<p class='lead'>{$x}</p>";
    write(dir.path(), "t.soy", source);

    let output = run(
        dir.path(),
        &["generate", "--attribute", "class", "--prefix", "", "t.soy"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prefix"), "{stderr}");
    assert_eq!(read(dir.path(), "t.soy"), source);
}

#[test]
fn test_list_human_and_json() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "t.soy",
        "<h1 id='head'>{$title}</h1>{foreach $u in $us}<li>{$u.name}</li>{/foreach}",
    );

    let output = run(dir.path(), &["list", "t.soy"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "t.soy, head, title\nt.soy, , u_dot_name\n"
    );

    let output = run(dir.path(), &["list", "--output", "json", "t.soy"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let repeated: Vec<bool> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["repeated"].as_bool().unwrap())
        .collect();
    assert_eq!(repeated, vec![false, true]);
    assert_eq!(json[1]["variables"][0], "u_dot_name");
}

#[test]
fn test_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["generate", "nope.soy"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.soy"));
}
