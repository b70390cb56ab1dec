//! Integration tests for the `jai` CLI.
//!
//! Each test points `jai` at a temp data directory and config file, runs it
//! as a subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `jai` binary.
fn jai_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("jai");
    path
}

fn data_dir(root: &Path) -> PathBuf {
    root.join("data")
}

fn config_file(root: &Path) -> PathBuf {
    root.join("config.toml")
}

/// Run `jai` against the temp environment rooted at `root`.
fn run_jai(root: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(jai_bin())
        .arg("--data-dir")
        .arg(data_dir(root))
        .arg("--config")
        .arg(config_file(root))
        .args(args)
        .current_dir(root)
        .env("HOME", root)
        .env_remove("JAI_CONFIG")
        .env_remove("JAI_LOG")
        .env_remove("JAI_JIRA_TOKEN")
        .env_remove("JAI_AI_TOKEN")
        .output()
        .expect("failed to run jai");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `jai` expecting success, return stdout.
fn run_jai_ok(root: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_jai(root, args);
    if !success {
        panic!(
            "jai {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn tickets_dir(root: &Path) -> PathBuf {
    data_dir(root).join("tickets")
}

/// Seed an epic document with one task.
fn create_epic_document(root: &Path) {
    fs::create_dir_all(tickets_dir(root)).unwrap();
    fs::write(
        tickets_dir(root).join("OBS-1.md"),
        "\
# epic: Observability Refactor [OBS-1]
Improve tracing coverage.

## task: Add Jaeger exporter [OBS-2]
Wire up the exporter.

---
*Metadata:*
- Key: OBS-2
- ParentKey: OBS-1
",
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_layout() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_jai_ok(tmp.path(), &["init"]);
    assert!(out.contains("Wrote config"));

    assert!(config_file(tmp.path()).exists());
    assert!(tickets_dir(tmp.path()).join("inbox.md").exists());
    assert!(data_dir(tmp.path()).join("templates/draft.md").exists());
    assert!(data_dir(tmp.path()).join("templates/enrich_prompt.md").exists());

    // A second init keeps the config
    fs::write(config_file(tmp.path()), "[jira]\nproject = \"OBS\"\n").unwrap();
    let out = run_jai_ok(tmp.path(), &["init"]);
    assert!(out.contains("already exists"));
    assert!(fs::read_to_string(config_file(tmp.path())).unwrap().contains("OBS"));
}

#[test]
fn test_config_set_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_jai_ok(tmp.path(), &["init"]);
    run_jai_ok(tmp.path(), &["config", "set", "jira.project", "OBS"]);
    run_jai_ok(tmp.path(), &["config", "set", "ai.max_tokens", "800"]);

    let out = run_jai_ok(tmp.path(), &["--json", "config"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["jira"]["project"], "OBS");
    assert_eq!(json["ai"]["max_tokens"], 800);

    let text = fs::read_to_string(config_file(tmp.path())).unwrap();
    assert!(text.contains("# Secrets are read from the environment"));

    let (_, stderr, ok) = run_jai(tmp.path(), &["config", "set", "ai.max_tokens", "many"]);
    assert!(!ok);
    assert!(stderr.contains("error: invalid value for ai.max_tokens"));
}

#[test]
fn test_config_path() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_jai_ok(tmp.path(), &["config", "path"]);
    assert_eq!(out.trim(), config_file(tmp.path()).display().to_string());
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[test]
fn test_focus_by_key_and_title() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());

    let out = run_jai_ok(tmp.path(), &["focus", "OBS-2"]);
    assert!(out.contains("Epic: OBS-1 → Task: OBS-2"));

    let out = run_jai_ok(tmp.path(), &["focus", "observability"]);
    assert!(out.contains("Epic: OBS-1"));
    assert!(!out.contains("Task:"));

    let saved = fs::read_to_string(data_dir(tmp.path()).join("current.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["epic_key"], "OBS-1");
    assert!(json.get("task_key").is_none());
}

#[test]
fn test_focus_json_and_unfocus() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());

    let out = run_jai_ok(tmp.path(), &["--json", "focus", "jaeger", "exporter"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["state"], "EpicAndTask");
    assert_eq!(json["task"], "OBS-2");

    run_jai_ok(tmp.path(), &["unfocus"]);
    let out = run_jai_ok(tmp.path(), &["focus"]);
    assert_eq!(out.trim(), "No context set");
}

#[test]
fn test_focus_no_match_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());
    let (_, stderr, ok) = run_jai(tmp.path(), &["focus", "nothing like this"]);
    assert!(!ok);
    assert!(stderr.contains("error: no ticket matches"));
}

#[test]
fn test_corrupt_focus_file_is_fatal() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::create_dir_all(data_dir(tmp.path())).unwrap();
    fs::write(data_dir(tmp.path()).join("current.json"), "{ broken").unwrap();
    let (_, stderr, ok) = run_jai(tmp.path(), &["status"]);
    assert!(!ok);
    assert!(stderr.contains("corrupt"));
}

#[test]
fn test_status_shows_focus_tree() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());
    run_jai_ok(tmp.path(), &["focus", "OBS-1"]);

    let out = run_jai_ok(tmp.path(), &["status"]);
    assert!(out.contains("Focus: Epic: OBS-1"));
    assert!(out.contains("Observability Refactor"));
    assert!(out.contains("Add Jaeger exporter"));
}

#[test]
fn test_status_with_config_alongside_global_config_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_jai_ok(tmp.path(), &["init"]);
    create_epic_document(tmp.path());
    run_jai_ok(tmp.path(), &["focus", "OBS-2"]);

    let out = run_jai_ok(tmp.path(), &["status", "--show-config"]);
    assert!(out.contains("Focus: Epic: OBS-1 → Task: OBS-2"));
    assert!(out.contains("[jira]"));
    assert!(out.contains(&config_file(tmp.path()).display().to_string()));
}

#[test]
fn test_open_prints_browse_url() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_jai_ok(tmp.path(), &["init"]);
    run_jai_ok(
        tmp.path(),
        &["config", "set", "jira.url", "https://example.atlassian.net/"],
    );
    create_epic_document(tmp.path());
    run_jai_ok(tmp.path(), &["focus", "OBS-2"]);

    let out = run_jai_ok(tmp.path(), &["open", "--print"]);
    assert_eq!(out.trim(), "https://example.atlassian.net/browse/OBS-2");

    let out = run_jai_ok(tmp.path(), &["--json", "open", "epic"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["type"], "epic");
    assert_eq!(json["key"], "OBS-1");
    assert_eq!(json["url"], "https://example.atlassian.net/browse/OBS-1");

    let (_, stderr, ok) = run_jai(tmp.path(), &["open", "subtask", "--print"]);
    assert!(!ok);
    assert!(stderr.contains("no subtask in the current focus"));
}

#[test]
fn test_open_requires_focus_and_url() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());

    let (_, stderr, ok) = run_jai(tmp.path(), &["open", "--print"]);
    assert!(!ok);
    assert!(stderr.contains("error: no focus set"));

    run_jai_ok(tmp.path(), &["focus", "OBS-1"]);
    let (_, stderr, ok) = run_jai(tmp.path(), &["open", "--print"]);
    assert!(!ok);
    assert!(stderr.contains("jira.url is not configured"));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_list_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());

    let out = run_jai_ok(tmp.path(), &["list"]);
    assert!(out.contains("OBS-1"));
    assert!(out.contains("OBS-2"));

    let out = run_jai_ok(tmp.path(), &["--json", "list", "task"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["key"], "OBS-2");
    assert_eq!(json[0]["epic_key"], "OBS-1");

    let out = run_jai_ok(tmp.path(), &["show", "OBS-2"]);
    assert!(out.contains("OBS-2 Task: Add Jaeger exporter"));
    assert!(out.contains("Wire up the exporter."));

    let (_, stderr, ok) = run_jai(tmp.path(), &["show", "OBS-99"]);
    assert!(!ok);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_list_empty_data_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_jai_ok(tmp.path(), &["list"]);
    assert_eq!(out.trim(), "No tickets");

    let out = run_jai_ok(tmp.path(), &["list", "orphan"]);
    assert_eq!(out.trim(), "No orphan tickets");
}

// ---------------------------------------------------------------------------
// Drafting and key assignment
// ---------------------------------------------------------------------------

#[test]
fn test_task_draft_lands_in_epic_document() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());
    run_jai_ok(tmp.path(), &["focus", "OBS-1"]);

    let out = run_jai_ok(tmp.path(), &["task", "Add", "OTLP", "exporter"]);
    assert!(out.contains("Drafted task \"Add OTLP exporter\""));

    let doc = fs::read_to_string(tickets_dir(tmp.path()).join("OBS-1.md")).unwrap();
    assert!(doc.contains("## task: Add OTLP exporter\n"));
    assert!(doc.contains("- ParentKey: OBS-1"));
}

#[test]
fn test_subtask_requires_focused_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_epic_document(tmp.path());
    run_jai_ok(tmp.path(), &["focus", "OBS-1"]);

    let (_, stderr, ok) = run_jai(tmp.path(), &["subtask", "Leaf"]);
    assert!(!ok);
    assert!(stderr.contains("focus a task first"));

    run_jai_ok(tmp.path(), &["focus", "OBS-2"]);
    let out = run_jai_ok(tmp.path(), &["new", "Write", "config", "flag"]);
    assert!(out.contains("Drafted subtask"));
    let doc = fs::read_to_string(tickets_dir(tmp.path()).join("OBS-1.md")).unwrap();
    assert!(doc.contains("- TaskKey: OBS-2"));
}

#[test]
fn test_epic_draft_assign_promotes() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_jai_ok(tmp.path(), &["epic", "Reduce pager noise"]);

    let inbox = tickets_dir(tmp.path()).join("inbox.md");
    assert!(fs::read_to_string(&inbox).unwrap().contains("# epic: Reduce pager noise\n"));

    let out = run_jai_ok(tmp.path(), &["assign", "pager", "SRE-10"]);
    assert!(out.contains("SRE-10"));

    let promoted = fs::read_to_string(tickets_dir(tmp.path()).join("SRE-10.md")).unwrap();
    assert!(promoted.starts_with("# epic: Reduce pager noise [SRE-10]\n"));
    assert!(!fs::read_to_string(&inbox).unwrap().contains("pager"));

    // The promoted epic can now be focused
    let out = run_jai_ok(tmp.path(), &["focus", "SRE-10"]);
    assert!(out.contains("Epic: SRE-10"));
}

#[test]
fn test_assign_rejects_bad_key() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_jai_ok(tmp.path(), &["epic", "Draft"]);
    let (_, stderr, ok) = run_jai(tmp.path(), &["assign", "Draft", "not-a-key"]);
    assert!(!ok);
    assert!(stderr.contains("is not a ticket key"));
}
