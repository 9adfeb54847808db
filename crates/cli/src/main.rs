//! trimerge command-line tool.
//!
//! Merges two edited versions of a file against their common base, stopping
//! at each conflict to ask the operator how to resolve it.
//!
//! Exit status: 0 when everything merged, 1 when a conflict was left marked
//! for attention (the output is still written), 2 on any hard failure.

mod style;
mod terminal;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trimerge_core::conflict::{CleanupMode, DisplayMode, MergeInputs, MergeOutcome, MergeSession};
use trimerge_core::config::MergeConfig;
use trimerge_core::render::{ConflictRenderer, Highlighter, Screen};
use trimerge_core::source::{CommandSource, ReaderSource};
use trimerge_core::Resolution;

use terminal::TerminalSource;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// trimerge command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "trimerge",
    version,
    about = "Interactively merge two edits of a file against their common base"
)]
struct Cli {
    /// The common ancestor.
    #[arg(long)]
    base: PathBuf,

    /// The local edit.
    #[arg(long)]
    local: PathBuf,

    /// The other edit.
    #[arg(long)]
    other: PathBuf,

    /// Write the merged result here instead of printing it.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to the TOML configuration file.
    /// Defaults to ~/.config/trimerge/config.toml when that exists.
    #[arg(short, long)]
    config: Option<String>,

    /// Consecutive unchanged lines tolerated inside one conflict.
    #[arg(long)]
    appetite: Option<i32>,

    /// Character diff cleanup: efficiency, merge, semantic, semantic-lossless.
    #[arg(long)]
    cleanup: Option<CleanupMode>,

    /// Initial conflict display: pretty, local, other.
    #[arg(long)]
    display: Option<DisplayMode>,

    /// Resolve every conflict this way without prompting:
    /// local, other, both-local-first, both-other-first, mark.
    #[arg(long)]
    take: Option<Resolution>,

    /// Syntax used for highlighting (defaults to the local file's extension).
    #[arg(long)]
    lang: Option<String>,

    /// Highlighting theme.
    #[arg(long)]
    theme: Option<String>,

    /// Disable colour and highlighting.
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(outcome) if outcome.needs_attention => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<MergeOutcome> {
    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config.validate().context("invalid configuration")?;
    init_tracing(&config.log_level, cli.verbose);

    let inputs = MergeInputs::load(&cli.base, &cli.local, &cli.other)
        .context("failed to load input files")?;

    let color = config.display.color && console::colors_enabled_stderr();
    let highlighter = if color && config.display.highlight {
        let extension = cli.local.extension().and_then(|ext| ext.to_str());
        Highlighter::new(
            &inputs.local.concat(),
            cli.lang.as_deref(),
            extension,
            &config.display.theme,
        )
    } else {
        Highlighter::plain()
    };
    let screen = Screen::new(io::stderr(), ConflictRenderer::new(highlighter, color));

    let source: Box<dyn CommandSource> = if io::stdin().is_terminal() {
        Box::new(TerminalSource)
    } else {
        Box::new(ReaderSource::new(io::stdin().lock()))
    };

    let mut session = MergeSession::new(config.session_state(), source, screen);
    let outcome = session.run(&inputs).context("merge session failed")?;
    let (_, _, screen) = session.into_parts();

    match &cli.output {
        Some(path) => {
            outcome
                .write_to(path)
                .context("failed to write merged output")?;
            info!(path = %path.display(), "merged output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            let text = if stdout.is_terminal() {
                screen.renderer().render_lines(&outcome.lines)
            } else {
                outcome.text()
            };
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to print merged output")?;
        }
    }

    eprintln!("{}", style::summary(&outcome));
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&str>) -> Result<MergeConfig> {
    if let Some(path) = path {
        let resolved = expand_tilde(path);
        return MergeConfig::load_from_file(&resolved)
            .with_context(|| format!("failed to load configuration file {resolved}"));
    }

    match dirs::config_dir().map(|dir| dir.join("trimerge").join("config.toml")) {
        Some(default) if default.exists() => MergeConfig::load_from_file(&default)
            .with_context(|| format!("failed to load configuration file {}", default.display())),
        _ => Ok(MergeConfig::default()),
    }
}

/// Command-line flags win over the configuration file.
fn apply_overrides(config: &mut MergeConfig, cli: &Cli) {
    if let Some(appetite) = cli.appetite {
        config.merge.appetite = appetite;
    }
    if let Some(take) = cli.take {
        config.merge.default_resolution = Some(take);
    }
    if let Some(cleanup) = cli.cleanup {
        config.display.cleanup_mode = cleanup;
    }
    if let Some(display) = cli.display {
        config.display.mode = display;
    }
    if let Some(theme) = &cli.theme {
        config.display.theme = theme.clone();
    }
    if cli.no_color {
        config.display.color = false;
    }
}

/// Logs go to stderr so they never mix with merged output on stdout.
fn init_tracing(level: &str, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Expand `~` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
