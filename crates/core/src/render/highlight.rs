//! Syntax highlighting for chunk display.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use tracing::{debug, warn};

/// Theme used when the configured one is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const RESET: &str = "\x1b[0m";

struct Engine {
    syntaxes: SyntaxSet,
    theme: Theme,
    syntax: String,
}

/// Highlights chunk text for a terminal. A plain highlighter passes text
/// through untouched.
pub struct Highlighter {
    engine: Option<Engine>,
}

impl Highlighter {
    /// A highlighter that never adds escapes.
    pub fn plain() -> Self {
        Self { engine: None }
    }

    /// Pick a syntax for the file being merged.
    ///
    /// Tries the explicit language token, then the file extension, then the
    /// first line of `sample` (shebangs, modelines), falling back to plain
    /// text.
    pub fn new(sample: &str, lang: Option<&str>, extension: Option<&str>, theme: &str) -> Self {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut themes = ThemeSet::load_defaults();

        let theme = match themes.themes.remove(theme) {
            Some(found) => found,
            None => {
                warn!(theme, fallback = DEFAULT_THEME, "unknown highlight theme");
                match themes.themes.remove(DEFAULT_THEME) {
                    Some(found) => found,
                    None => return Self::plain(),
                }
            }
        };

        let syntax = lang
            .and_then(|token| syntaxes.find_syntax_by_token(token))
            .or_else(|| extension.and_then(|ext| syntaxes.find_syntax_by_extension(ext)))
            .or_else(|| {
                sample
                    .lines()
                    .next()
                    .and_then(|first| syntaxes.find_syntax_by_first_line(first))
            })
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
            .name
            .clone();
        debug!(syntax = %syntax, "syntax selected");

        Self {
            engine: Some(Engine {
                syntaxes,
                theme,
                syntax,
            }),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.engine.is_none()
    }

    /// Highlight `text`, returning it unchanged if highlighting fails.
    pub fn highlight(&self, text: &str) -> String {
        let Some(engine) = &self.engine else {
            return text.to_string();
        };
        let Some(syntax) = engine.syntaxes.find_syntax_by_name(&engine.syntax) else {
            return text.to_string();
        };

        let mut lines = HighlightLines::new(syntax, &engine.theme);
        let mut out = String::with_capacity(text.len() * 2);
        for line in LinesWithEndings::from(text) {
            match lines.highlight_line(line, &engine.syntaxes) {
                Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
                Err(e) => {
                    debug!(error = %e, "highlighting failed, showing plain text");
                    return text.to_string();
                }
            }
        }
        out.push_str(RESET);
        out
    }
}
