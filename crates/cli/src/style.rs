//! Shared styling utilities for the CLI.

use console::Style;

use trimerge_core::MergeOutcome;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// One-line report of a finished merge.
pub fn summary(outcome: &MergeOutcome) -> String {
    let resolved = outcome.conflicts - outcome.marked;
    let msg = format!(
        "{} lines merged, {} conflicts: {} resolved, {} marked",
        outcome.lines.len(),
        outcome.conflicts,
        resolved,
        outcome.marked
    );
    if outcome.needs_attention {
        warn(&msg)
    } else {
        success(&msg)
    }
}
