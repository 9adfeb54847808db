//! End-to-end merge sessions.
//!
//! Each test drives a full `MergeSession` with a scripted command source and
//! a screen writing into memory, so every conflict prompt, sticky default
//! and re-detection runs exactly as it would at a terminal.

use std::path::Path;

use tempfile::TempDir;

use trimerge_core::conflict::{MergeInputs, MergeOutcome, MergeSession, Resolution, SessionState};
use trimerge_core::errors::{InputError, SessionError};
use trimerge_core::lines::split_lines;
use trimerge_core::render::{ConflictRenderer, Screen};
use trimerge_core::source::ScriptedSource;

// ===========================================================================
// Helpers
// ===========================================================================

struct Run {
    outcome: MergeOutcome,
    screen: String,
    unused_commands: usize,
}

fn inputs(base: &str, local: &str, other: &str) -> MergeInputs {
    MergeInputs::new(split_lines(base), split_lines(local), split_lines(other))
}

fn merge_with(
    state: SessionState,
    base: &str,
    local: &str,
    other: &str,
    commands: &[&str],
) -> Result<Run, SessionError> {
    let screen = Screen::new(Vec::new(), ConflictRenderer::plain());
    let source = ScriptedSource::new(commands.iter().copied());
    let mut session = MergeSession::new(state, source, screen);
    let outcome = session.run(&inputs(base, local, other))?;
    let (_, source, screen) = session.into_parts();
    Ok(Run {
        outcome,
        screen: String::from_utf8(screen.into_inner()).expect("screen output is utf-8"),
        unused_commands: source.remaining(),
    })
}

fn merge(base: &str, local: &str, other: &str, commands: &[&str]) -> Run {
    merge_with(SessionState::default(), base, local, other, commands).expect("merge failed")
}

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

// ===========================================================================
// Clean merges
// ===========================================================================

#[test]
fn test_identical_inputs_merge_to_base() {
    let text = "fn main() {\n    run();\n}\n";
    let run = merge(text, text, text, &[]);
    assert_eq!(run.outcome.text(), text);
    assert_eq!(run.outcome.conflicts, 0);
    assert!(!run.outcome.needs_attention);
}

#[test]
fn test_one_sided_change_is_taken() {
    let run = merge("a\nb\nc\n", "a\nB\nc\n", "a\nb\nc\n", &[]);
    assert_eq!(run.outcome.lines, vec!["a\n", "B\n", "c\n"]);
    assert_eq!(run.outcome.conflicts, 0);

    let run = merge("a\nb\nc\n", "a\nb\nc\n", "a\nB\nc\n", &[]);
    assert_eq!(run.outcome.lines, vec!["a\n", "B\n", "c\n"]);
}

#[test]
fn test_one_sided_change_ignores_appetite() {
    for appetite in [1, 5, 50] {
        let state = SessionState {
            appetite,
            ..SessionState::default()
        };
        let run = merge_with(state, "a\nb\nc\nd\n", "a\nb\nC\nd\n", "a\nb\nc\nd\n", &[]).unwrap();
        assert_eq!(run.outcome.text(), "a\nb\nC\nd\n", "appetite {appetite}");
    }
}

#[test]
fn test_edits_on_both_sides_far_apart_merge() {
    let run = merge("a\nb\nc\nd\n", "A\nb\nc\nd\n", "a\nb\nc\nD\n", &[]);
    assert_eq!(run.outcome.text(), "A\nb\nc\nD\n");
    assert_eq!(run.outcome.conflicts, 0);
}

#[test]
fn test_trailing_insert_survives() {
    let run = merge("a\n", "a\nb\n", "a\n", &[]);
    assert_eq!(run.outcome.lines, vec!["a\n", "b\n"]);

    let run = merge("a\n", "a\n", "a\nb\nc\n", &[]);
    assert_eq!(run.outcome.lines, vec!["a\n", "b\n", "c\n"]);
}

#[test]
fn test_insert_in_the_middle() {
    let run = merge("a\nc\n", "a\nb\nc\n", "a\nc\n", &[]);
    assert_eq!(run.outcome.text(), "a\nb\nc\n");
}

#[test]
fn test_one_sided_deletions_survive() {
    let run = merge("a\nb\nc\n", "a\nc\n", "a\nb\nc\n", &[]);
    assert_eq!(run.outcome.text(), "a\nc\n");

    let run = merge("a\nb\nc\n", "a\nb\nc\n", "a\nc\n", &[]);
    assert_eq!(run.outcome.text(), "a\nc\n");

    let run = merge("a\nb\n", "a\n", "a\nb\n", &[]);
    assert_eq!(run.outcome.text(), "a\n");
}

#[test]
fn test_deletion_and_change_elsewhere() {
    let run = merge("a\nb\nc\nd\n", "a\nc\nd\n", "a\nb\nc\nD\n", &[]);
    assert_eq!(run.outcome.text(), "a\nc\nD\n");
    assert_eq!(run.outcome.conflicts, 0);
}

// ===========================================================================
// Conflicts
// ===========================================================================

#[test]
fn test_take_local() {
    let run = merge("a\n", "x\n", "y\n", &["a"]);
    assert_eq!(run.outcome.lines, vec!["x\n"]);
    assert_eq!(run.outcome.conflicts, 1);
    assert!(!run.outcome.needs_attention);
    assert!(run.screen.contains("[-x-]{+y+}"));
}

#[test]
fn test_take_other_and_both() {
    let run = merge("a\n", "x\n", "y\n", &["g"]);
    assert_eq!(run.outcome.lines, vec!["y\n"]);

    let run = merge("a\n", "x\n", "y\n", &["ub"]);
    assert_eq!(run.outcome.lines, vec!["y\n", "x\n"]);
}

#[test]
fn test_mark_sets_needs_attention() {
    let run = merge("a\n", "x\n", "y\n", &["m"]);
    assert_eq!(
        run.outcome.text(),
        "<<<<<<< LOCAL\nx\n=======\ny\n>>>>>>> OTHER\n"
    );
    assert!(run.outcome.needs_attention);
    assert_eq!(run.outcome.marked, 1);
}

#[test]
fn test_conflict_between_agreed_lines() {
    let run = merge("k\na\nz\n", "k\nx\nz\n", "k\ny\nz\n", &["b"]);
    assert_eq!(run.outcome.text(), "k\ny\nz\n");
    // The agreed section before the conflict is shown once.
    assert!(run.screen.starts_with("k\n"));
}

#[test]
fn test_edit_against_delete_conflicts() {
    let run = merge("a\nb\nc\n", "a\nB\nc\n", "a\nc\n", &["b"]);
    assert_eq!(run.outcome.text(), "a\nc\n");
    assert_eq!(run.outcome.conflicts, 1);

    let run = merge("a\nb\nc\n", "a\nB\nc\n", "a\nc\n", &["a"]);
    assert_eq!(run.outcome.text(), "a\nB\nc\n");
}

#[test]
fn test_sticky_resolution_skips_prompts() {
    let base = "a\n1\n2\n3\n4\n5\n6\n7\nb\n";
    let local = "A\n1\n2\n3\n4\n5\n6\n7\nB\n";
    let other = "X\n1\n2\n3\n4\n5\n6\n7\nY\n";

    let run = merge(base, local, other, &["a!"]);
    assert_eq!(run.outcome.text(), local);
    assert_eq!(run.outcome.conflicts, 2);
    assert!(run.screen.contains("applying local"));
}

#[test]
fn test_preset_resolution_never_prompts() {
    let state = SessionState {
        sticky: Some(Resolution::Mark),
        ..SessionState::default()
    };
    let run = merge_with(state, "a\n", "x\n", "y\n", &[]).unwrap();
    assert!(run.outcome.needs_attention);
    assert!(!run.screen.contains("% "));
}

#[test]
fn test_appetite_redetects_from_start() {
    let base = "a\n1\n2\nb\n3\n";
    let local = "A\n1\n2\nB\n3\n";
    let other = "X\n1\n2\nY\n3\n";

    // One wide conflict with the default appetite.
    let run = merge(base, local, other, &["a"]);
    assert_eq!(run.outcome.text(), local);
    assert_eq!(run.outcome.conflicts, 1);

    // Narrowed to one line, the same edits become two conflicts.
    let run = merge(base, local, other, &["h1", "a", "b"]);
    assert_eq!(run.outcome.text(), "A\n1\n2\nY\n3\n");
    assert_eq!(run.outcome.conflicts, 2);
    assert!(run.screen.contains("appetite 1"));
    assert_eq!(run.unused_commands, 0);
}

#[test]
fn test_appetite_decrement_below_zero_still_terminates() {
    let run = merge("a\n1\nb\n", "A\n1\nB\n", "X\n1\nY\n", &["h1", "f", "f", "a", "a"]);
    assert_eq!(run.outcome.text(), "A\n1\nB\n");
    assert!(run.screen.contains("appetite -1"));
}

#[test]
fn test_asymmetric_chunk_boundaries() {
    // With appetite 3 the local chunk reaches B but the other chunk stops
    // after X, because other has no second edit to bridge to.
    let base = "a\n1\n2\nb\n";
    let local = "A\n1\n2\nB\n";
    let other = "X\n1\n2\nb\n";
    let state = SessionState {
        appetite: 3,
        ..SessionState::default()
    };

    let run = merge_with(state.clone(), base, local, other, &["b"]).unwrap();
    assert!(run.screen.contains("local 4 lines / other 1 line"));
    assert_eq!(run.outcome.text(), "X\n1\n2\nb\n");

    let run = merge_with(state, base, local, other, &["a"]).unwrap();
    assert_eq!(run.outcome.text(), "A\n1\n2\nB\n");
    assert_eq!(run.outcome.conflicts, 1);
}

#[test]
fn test_non_terminal_commands_loop() {
    let run = merge(
        "k\na\n",
        "k\nx\n",
        "k\ny\n",
        &["?", "zz", "p", "oa", "cm", "a"],
    );
    assert_eq!(run.outcome.text(), "k\nx\n");
    assert_eq!(run.outcome.conflicts, 1);
    assert!(run.screen.contains("Interactive Command List"));
    // Shown once when flushed, once more for the reprint.
    assert!(run.screen.matches("k\n").count() >= 2);
    assert_eq!(run.screen.matches("% ").count(), 6);
}

#[test]
fn test_closed_source_is_fatal() {
    let result = merge_with(SessionState::default(), "a\n", "x\n", "y\n", &["?"]);
    assert!(matches!(result, Err(SessionError::CommandSourceClosed)));
}

// ===========================================================================
// Files
// ===========================================================================

#[test]
fn test_load_merge_and_write() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.txt", "a\nb\n");
    let local = write(dir.path(), "local.txt", "a\nb\nc\n");
    let other = write(dir.path(), "other.txt", "A\nb\n");

    let inputs = MergeInputs::load(&base, &local, &other).unwrap();
    let mut session = MergeSession::new(
        SessionState::default(),
        ScriptedSource::default(),
        Screen::new(Vec::new(), ConflictRenderer::plain()),
    );
    let outcome = session.run(&inputs).unwrap();

    let out = dir.path().join("merged.txt");
    outcome.write_to(&out).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "A\nb\nc\n");
}

#[test]
fn test_missing_input_is_reported_with_path() {
    let dir = TempDir::new().unwrap();
    let base = write(dir.path(), "base.txt", "a\n");
    let local = write(dir.path(), "local.txt", "a\n");
    let missing = dir.path().join("other.txt");

    let err = MergeInputs::load(&base, &local, &missing).unwrap_err();
    match err {
        InputError::NotFound { path } => assert!(path.ends_with("other.txt")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn test_unterminated_last_line_is_preserved() {
    let run = merge("a\nb", "a\nB", "a\nb", &[]);
    assert_eq!(run.outcome.text(), "a\nB");
}
