//! Everything the operator sees during a merge session.
//!
//! [`ConflictRenderer`] turns chunks and merged sections into text;
//! [`Screen`] writes that text to a display sink and prompts for commands.
//! The merge result itself never passes through here.

pub mod cdiff;
pub mod highlight;

pub use highlight::Highlighter;

use std::io::{self, Write};

use console::Style;
use similar::ChangeTag;

use self::cdiff::{char_diff, cleanup, Span};
use crate::conflict::command::USAGE;
use crate::conflict::{ConflictChunks, DisplayMode, Resolution, SessionState};
use crate::errors::SessionError;
use crate::source::CommandSource;

/// Prompt printed before each command unless the source draws its own.
pub const PROMPT: &str = "% ";

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Formats conflicts and merged sections for display.
pub struct ConflictRenderer {
    highlighter: Highlighter,
    color: bool,
}

impl ConflictRenderer {
    pub fn new(highlighter: Highlighter, color: bool) -> Self {
        Self { highlighter, color }
    }

    /// No colour and no highlighting.
    pub fn plain() -> Self {
        Self::new(Highlighter::plain(), false)
    }

    /// Render one conflict the way the session's display mode asks for.
    pub fn render(&self, chunks: &ConflictChunks<'_>, state: &SessionState) -> String {
        let local = chunks.local.concat();
        let other = chunks.other.concat();

        let mut out = match state.display {
            DisplayMode::Pretty => {
                let spans = cleanup(char_diff(&local, &other), state.cleanup);
                let mut out = self.header(chunks, state.appetite);
                out.push_str(&self.pretty(&spans));
                out
            }
            DisplayMode::Local => self.highlighter.highlight(&local),
            DisplayMode::Other => self.highlighter.highlight(&other),
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    /// Render a conflict that a sticky resolution closes without prompting.
    pub fn render_sticky(&self, chunks: &ConflictChunks<'_>, resolution: Resolution) -> String {
        format!(
            "{} applying {resolution} (local {}, other {})\n",
            self.marker(),
            line_count(chunks.local.len()),
            line_count(chunks.other.len()),
        )
    }

    /// Render agreed lines, highlighted when enabled.
    pub fn render_lines(&self, lines: &[String]) -> String {
        self.highlighter.highlight(&lines.concat())
    }

    fn marker(&self) -> String {
        format!(
            "{}\u{25cf}{}",
            self.paint(&Style::new().red(), "<<<"),
            self.paint(&Style::new().green(), ">>>"),
        )
    }

    fn header(&self, chunks: &ConflictChunks<'_>, appetite: i32) -> String {
        format!(
            "{} local {} / other {} / appetite {appetite}\n",
            self.marker(),
            line_count(chunks.local.len()),
            line_count(chunks.other.len()),
        )
    }

    fn pretty(&self, spans: &[Span]) -> String {
        let deleted = Style::new().red();
        let inserted = Style::new().green();
        spans
            .iter()
            .map(|span| match (span.tag, self.color) {
                (ChangeTag::Equal, _) => span.text.clone(),
                (ChangeTag::Delete, true) => self.paint(&deleted, &span.text),
                (ChangeTag::Insert, true) => self.paint(&inserted, &span.text),
                (ChangeTag::Delete, false) => format!("[-{}-]", span.text),
                (ChangeTag::Insert, false) => format!("{{+{}+}}", span.text),
            })
            .collect()
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.color {
            style.clone().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn line_count(n: usize) -> String {
    if n == 1 {
        "1 line".to_string()
    } else {
        format!("{n} lines")
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The display sink of a session, plus the prompt.
pub struct Screen<W> {
    out: W,
    renderer: ConflictRenderer,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W, renderer: ConflictRenderer) -> Self {
        Self { out, renderer }
    }

    /// Print a merged section. Nothing is printed for an empty section.
    pub fn show_lines(&mut self, lines: &[String]) -> io::Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let text = self.renderer.render_lines(lines);
        self.out.write_all(text.as_bytes())
    }

    pub fn show_conflict(
        &mut self,
        chunks: &ConflictChunks<'_>,
        state: &SessionState,
    ) -> io::Result<()> {
        let text = self.renderer.render(chunks, state);
        self.out.write_all(text.as_bytes())
    }

    pub fn show_sticky(
        &mut self,
        chunks: &ConflictChunks<'_>,
        resolution: Resolution,
    ) -> io::Result<()> {
        let text = self.renderer.render_sticky(chunks, resolution);
        self.out.write_all(text.as_bytes())
    }

    pub fn show_help(&mut self) -> io::Result<()> {
        writeln!(self.out, "{USAGE}")
    }

    /// Prompt, then block on the source for the next command line.
    pub fn read_command<S: CommandSource>(&mut self, source: &mut S) -> Result<String, SessionError> {
        if !source.shows_prompt() {
            self.out.write_all(PROMPT.as_bytes())?;
        }
        self.out.flush()?;
        source.next_command()
    }

    pub fn renderer(&self) -> &ConflictRenderer {
        &self.renderer
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
