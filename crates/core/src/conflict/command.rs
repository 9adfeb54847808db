//! Operator commands entered while a conflict is open.
//!
//! Raw input is parsed once into a tagged [`Command`]; nothing downstream
//! looks at characters again. Input that does not match the grammar exactly
//! becomes [`Command::Help`].

use super::resolver::Resolution;
use super::session::{CleanupMode, DisplayMode, Side};

/// Command list shown for `?` and for unrecognised input.
pub const USAGE: &str = "\
Interactive Command List:

Resolution (append ! to apply to every later conflict too):
  a / r      Take the local (red) side
  b / g      Take the other (green) side
  u[a|r]     Take both, local side first
  u[b|g]     Take both, other side first
  m          Mark the conflict and continue
Display:
  c[e|m|s|l] Cleanup mode: efficiency, merge, semantic, semantic-lossless
  o[p|a|b]   Show the pretty diff, the local side, or the other side
  p          Print the previous merged section
Conflicting:
  h<N>       Re-detect the conflict with line appetite N
  e          Increase line appetite by one
  f          Decrease line appetite by one
  ?          Show this list
";

/// One parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Close the conflict; `always` also makes the resolution sticky.
    Resolve { resolution: Resolution, always: bool },
    SetAppetite(i32),
    AdjustAppetite(i32),
    Cleanup(CleanupMode),
    Display(DisplayMode),
    PrintMerged,
    Help,
}

impl Command {
    /// Parse one line of operator input.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (body, always) = match input.strip_suffix('!') {
            Some(body) => (body, true),
            None => (input, false),
        };

        let mut chars = body.chars();
        let Some(head) = chars.next() else {
            return Self::Help;
        };
        let rest = chars.as_str();

        let resolve = |resolution| Self::Resolve { resolution, always };
        match (head, rest) {
            ('a' | 'r', "") => resolve(Resolution::Take(Side::Local)),
            ('b' | 'g', "") => resolve(Resolution::Take(Side::Other)),
            ('u', "" | "a" | "r") => resolve(Resolution::Both { first: Side::Local }),
            ('u', "b" | "g") => resolve(Resolution::Both { first: Side::Other }),
            ('m', "") => resolve(Resolution::Mark),
            // `!` only modifies resolutions.
            _ if always => Self::Help,
            ('h', value) => value.parse().map_or(Self::Help, Self::SetAppetite),
            ('e', "") => Self::AdjustAppetite(1),
            ('f', "") => Self::AdjustAppetite(-1),
            ('c', mode) => match mode {
                "e" => Self::Cleanup(CleanupMode::Efficiency),
                "m" => Self::Cleanup(CleanupMode::Merge),
                "s" => Self::Cleanup(CleanupMode::Semantic),
                "l" => Self::Cleanup(CleanupMode::SemanticLossless),
                _ => Self::Help,
            },
            ('o', mode) => match mode {
                "" | "p" => Self::Display(DisplayMode::Pretty),
                "a" | "r" => Self::Display(DisplayMode::Local),
                "b" | "g" => Self::Display(DisplayMode::Other),
                _ => Self::Help,
            },
            ('p', "") => Self::PrintMerged,
            _ => Self::Help,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take(side: Side, always: bool) -> Command {
        Command::Resolve {
            resolution: Resolution::Take(side),
            always,
        }
    }

    #[test]
    fn test_take_sides() {
        assert_eq!(Command::parse("a\n"), take(Side::Local, false));
        assert_eq!(Command::parse("r"), take(Side::Local, false));
        assert_eq!(Command::parse("g"), take(Side::Other, false));
        assert_eq!(Command::parse("b!\n"), take(Side::Other, true));
    }

    #[test]
    fn test_take_both_orders() {
        assert_eq!(
            Command::parse("u"),
            Command::Resolve {
                resolution: Resolution::Both { first: Side::Local },
                always: false
            }
        );
        assert_eq!(
            Command::parse("ug!"),
            Command::Resolve {
                resolution: Resolution::Both { first: Side::Other },
                always: true
            }
        );
    }

    #[test]
    fn test_mark_always() {
        assert_eq!(
            Command::parse("m!"),
            Command::Resolve {
                resolution: Resolution::Mark,
                always: true
            }
        );
    }

    #[test]
    fn test_appetite_commands() {
        assert_eq!(Command::parse("h12"), Command::SetAppetite(12));
        assert_eq!(Command::parse("h0"), Command::SetAppetite(0));
        assert_eq!(Command::parse("h"), Command::Help);
        assert_eq!(Command::parse("hx"), Command::Help);
        assert_eq!(Command::parse("e"), Command::AdjustAppetite(1));
        assert_eq!(Command::parse("f"), Command::AdjustAppetite(-1));
    }

    #[test]
    fn test_mode_letters_do_not_collide_with_sides() {
        assert_eq!(
            Command::parse("ob"),
            Command::Display(DisplayMode::Other)
        );
        assert_eq!(Command::parse("b"), take(Side::Other, false));
        assert_eq!(
            Command::parse("cl"),
            Command::Cleanup(CleanupMode::SemanticLossless)
        );
    }

    #[test]
    fn test_unrecognised_input_is_help() {
        assert_eq!(Command::parse(""), Command::Help);
        assert_eq!(Command::parse("?"), Command::Help);
        assert_eq!(Command::parse("ax"), Command::Help);
        assert_eq!(Command::parse("cz"), Command::Help);
        assert_eq!(Command::parse("p!"), Command::Help);
        assert_eq!(Command::parse("zzz"), Command::Help);
    }
}
