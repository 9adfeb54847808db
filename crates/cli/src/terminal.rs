//! Command source for an interactive terminal.

use std::io;

use dialoguer::Input;

use trimerge_core::errors::SessionError;
use trimerge_core::source::CommandSource;

/// Reads commands with line editing through `dialoguer`.
pub struct TerminalSource;

impl CommandSource for TerminalSource {
    fn next_command(&mut self) -> Result<String, SessionError> {
        Input::<String>::new()
            .with_prompt("%")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| {
                SessionError::CommandSourceFailed(io::Error::new(io::ErrorKind::Other, e.to_string()))
            })
    }

    fn shows_prompt(&self) -> bool {
        true
    }
}
