use std::fs;
use std::path::Path;

use file_context::WalkFilter;
use serde_json::json;
use tool_gateway::{
    AutoApprove, ConfirmationGate, ErrorKind, ToolGateway, ToolLimits, ToolOutcome,
};

struct Deny {
    prompts: Vec<String>,
}

impl Deny {
    fn new() -> Self {
        Self { prompts: Vec::new() }
    }
}

impl ConfirmationGate for Deny {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        false
    }
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/lib.rs"),
        "pub fn answer() -> u32 {\n    41\n}\n",
    )
    .unwrap();
    dir
}

fn gateway(root: &Path) -> ToolGateway<AutoApprove> {
    let filter = WalkFilter::new(vec![".git", "node_modules"], vec!["png"]);
    ToolGateway::new(root, filter, ToolLimits::default(), AutoApprove).unwrap()
}

#[test]
fn read_file_returns_content() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch("read_file", &json!({"file_path": "src/lib.rs"}));
    assert!(outcome.success);
    assert!(outcome.output.contains("pub fn answer"));
}

#[test]
fn read_outside_root_is_rejected() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch("read_file", &json!({"file_path": "../../etc/hostname"}));
    assert!(!outcome.success);
    // Either the traversal escapes (PathRejected) or the path fails to
    // resolve at all (Io); both refuse the read.
    assert!(matches!(
        outcome.error_kind,
        Some(ErrorKind::PathRejected | ErrorKind::Io)
    ));
}

#[test]
fn excluded_paths_are_rejected() {
    let dir = workspace();
    fs::create_dir_all(dir.path().join("node_modules")).unwrap();
    fs::write(dir.path().join("node_modules/index.js"), "x").unwrap();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch(
        "read_file",
        &json!({"file_path": "node_modules/index.js"}),
    );
    assert_eq!(outcome.error_kind, Some(ErrorKind::PathRejected));
}

#[test]
fn create_file_writes_through_new_directories() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch(
        "create_file",
        &json!({"file_path": "docs/notes/plan.md", "content": "# plan\n"}),
    );
    assert!(outcome.success, "{}", outcome.output);
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/notes/plan.md")).unwrap(),
        "# plan\n"
    );
    // No temp file residue from the atomic write.
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("docs/notes"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn create_file_cannot_traverse_out_through_missing_directories() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    // The `..` segments hide behind a directory that does not exist yet, so
    // nothing on disk can resolve them before the write.
    let outcome = gateway.dispatch(
        "create_file",
        &json!({"file_path": "ghost/../../escaped.txt", "content": "out\n"}),
    );
    assert_eq!(outcome.error_kind, Some(ErrorKind::PathRejected));
    assert!(!dir.path().join("ghost").exists());
    assert!(!dir.path().parent().unwrap().join("escaped.txt").exists());
}

#[test]
fn oversized_create_is_refused() {
    let dir = workspace();
    let filter = WalkFilter::default();
    let limits = ToolLimits {
        create_max_bytes: 8,
        ..ToolLimits::default()
    };
    let mut gateway = ToolGateway::new(dir.path(), filter, limits, AutoApprove).unwrap();

    let outcome = gateway.dispatch(
        "create_file",
        &json!({"file_path": "big.txt", "content": "far too large"}),
    );
    assert_eq!(outcome.error_kind, Some(ErrorKind::FileTooLarge));
    assert!(!dir.path().join("big.txt").exists());
}

#[test]
fn edit_file_replaces_exact_anchor() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch(
        "edit_file",
        &json!({
            "file_path": "src/lib.rs",
            "original_snippet": "    41",
            "new_snippet": "    42",
        }),
    );
    assert!(outcome.success, "{}", outcome.output);
    assert!(fs::read_to_string(dir.path().join("src/lib.rs"))
        .unwrap()
        .contains("42"));
}

#[test]
fn ambiguous_edit_leaves_the_file_untouched() {
    let dir = workspace();
    let path = dir.path().join("dup.txt");
    fs::write(&path, "value = 1\nother\nvalue = 1\n").unwrap();
    let before = fs::read(&path).unwrap();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch(
        "edit_file",
        &json!({
            "file_path": "dup.txt",
            "original_snippet": "value = 1",
            "new_snippet": "value = 2",
        }),
    );
    assert_eq!(outcome.error_kind, Some(ErrorKind::AmbiguousEdit));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn no_edit_match_reports_the_best_score() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch(
        "edit_file",
        &json!({
            "file_path": "src/lib.rs",
            "original_snippet": "completely unrelated text",
            "new_snippet": "x",
        }),
    );
    assert_eq!(outcome.error_kind, Some(ErrorKind::NoEditMatch));
}

#[test]
fn shell_runs_and_captures_output() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch("run_shell", &json!({"command": "echo hello"}));
    assert!(outcome.success);
    assert!(outcome.output.contains("stdout:\nhello"));
    assert!(outcome.output.contains("Exit code: 0"));
}

#[test]
fn shell_nonzero_exit_is_a_failed_result() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch("run_shell", &json!({"command": "exit 3"}));
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::NonZeroExit));
    assert!(outcome.output.contains("Exit code: 3"));
}

#[test]
fn shell_output_larger_than_the_pipe_buffer_is_captured() {
    let dir = workspace();
    let filter = WalkFilter::default();
    let limits = ToolLimits {
        shell_timeout_secs: 2,
        ..ToolLimits::default()
    };
    let mut gateway = ToolGateway::new(dir.path(), filter, limits, AutoApprove).unwrap();

    // 90 KiB exceeds the OS pipe buffer; the command must not be mistaken
    // for a timeout while blocked on a full pipe.
    let outcome = gateway.dispatch(
        "run_shell",
        &json!({"command": "head -c 92160 /dev/zero | tr '\\0' 'x'"}),
    );
    assert!(outcome.success, "{}", outcome.output);
    assert!(outcome.output.len() > 64 * 1024);
    assert!(outcome.output.contains("Exit code: 0"));
}

#[test]
fn shell_timeout_kills_the_command() {
    let dir = workspace();
    let filter = WalkFilter::default();
    let limits = ToolLimits {
        shell_timeout_secs: 1,
        ..ToolLimits::default()
    };
    let mut gateway = ToolGateway::new(dir.path(), filter, limits, AutoApprove).unwrap();

    let outcome = gateway.dispatch("run_shell", &json!({"command": "sleep 10"}));
    assert_eq!(outcome.error_kind, Some(ErrorKind::ShellTimeout));
}

#[test]
fn denied_shell_spawns_nothing() {
    let dir = workspace();
    let marker = dir.path().join("marker.txt");
    let filter = WalkFilter::default();
    let mut gateway =
        ToolGateway::new(dir.path(), filter, ToolLimits::default(), Deny::new()).unwrap();

    let outcome = gateway.dispatch(
        "run_shell",
        &json!({"command": format!("touch {}", marker.display())}),
    );

    assert_eq!(outcome.error_kind, Some(ErrorKind::Denied));
    assert!(!marker.exists());
}

#[test]
fn invalid_envelope_is_classified() {
    let dir = workspace();
    let mut gateway = gateway(dir.path());

    let outcome = gateway.dispatch("warp_core", &json!({}));
    assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidToolCall));

    let outcome: ToolOutcome = gateway.dispatch("read_file", &json!({"path": "wrong key"}));
    assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidToolCall));
}
