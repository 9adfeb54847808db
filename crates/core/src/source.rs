//! Sources of operator commands.
//!
//! Reading a command is the only point where a merge session blocks. A
//! closed or failing source is fatal for the whole run.

use std::collections::VecDeque;
use std::io::BufRead;

use tracing::trace;

use crate::errors::SessionError;

/// Line-oriented supplier of operator commands.
pub trait CommandSource {
    /// Block until the next command line is available.
    fn next_command(&mut self) -> Result<String, SessionError>;

    /// Whether the source draws its own prompt.
    fn shows_prompt(&self) -> bool {
        false
    }
}

impl<S: CommandSource + ?Sized> CommandSource for Box<S> {
    fn next_command(&mut self) -> Result<String, SessionError> {
        (**self).next_command()
    }

    fn shows_prompt(&self) -> bool {
        (**self).shows_prompt()
    }
}

/// Reads one command per line from any buffered reader.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> CommandSource for ReaderSource<R> {
    fn next_command(&mut self) -> Result<String, SessionError> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(SessionError::CommandSourceFailed)?;
        if read == 0 {
            return Err(SessionError::CommandSourceClosed);
        }
        trace!(command = line.trim_end(), "command read");
        Ok(line)
    }
}

/// A fixed list of commands, consumed in order.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    commands: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new<I, T>(commands: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Commands not yet consumed.
    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl CommandSource for ScriptedSource {
    fn next_command(&mut self) -> Result<String, SessionError> {
        self.commands
            .pop_front()
            .ok_or(SessionError::CommandSourceClosed)
    }
}
