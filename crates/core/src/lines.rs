//! Loading text files as line sequences.
//!
//! Every line keeps its own terminator so that concatenating a sequence
//! reproduces the original bytes exactly.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::errors::InputError;

/// Split `text` into lines, keeping each line's terminator.
///
/// A trailing line without a newline is kept as the last element. An empty
/// string yields an empty sequence.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Read the file at `path` into a line sequence.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, InputError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => InputError::NotFound {
            path: path.display().to_string(),
        },
        _ => InputError::Unreadable {
            path: path.display().to_string(),
            source,
        },
    })?;

    let lines = split_lines(&text);
    debug!(path = %path.display(), lines = lines.len(), "loaded input");
    Ok(lines)
}
