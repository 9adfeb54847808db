//! Character-level diff between the two sides of a conflict.
//!
//! The diff itself comes from `similar`; the cleanup passes reshape it for
//! readability in the spirit of diff-match-patch. None of this touches the
//! merge result.

use similar::{ChangeTag, TextDiff};

use crate::conflict::CleanupMode;

/// Cost of an empty edit operation, in characters, for efficiency cleanup.
const EDIT_COST: usize = 4;

/// A run of characters that is equal, only local (`Delete`), or only other
/// (`Insert`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub tag: ChangeTag,
    pub text: String,
}

impl Span {
    fn new(tag: ChangeTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Diff `local` against `other` character by character.
pub fn char_diff(local: &str, other: &str) -> Vec<Span> {
    let diff = TextDiff::from_chars(local, other);
    let mut spans = Vec::new();
    for change in diff.iter_all_changes() {
        push(&mut spans, change.tag(), change.value());
    }
    spans
}

/// Apply a cleanup pass.
pub fn cleanup(spans: Vec<Span>, mode: CleanupMode) -> Vec<Span> {
    match mode {
        CleanupMode::Efficiency => cleanup_efficiency(spans),
        CleanupMode::Merge => cleanup_merge(spans),
        CleanupMode::Semantic => cleanup_semantic(spans),
        CleanupMode::SemanticLossless => cleanup_semantic_lossless(cleanup_merge(spans)),
    }
}

/// Text of the local side.
pub fn local_text(spans: &[Span]) -> String {
    side_text(spans, ChangeTag::Delete)
}

/// Text of the other side.
pub fn other_text(spans: &[Span]) -> String {
    side_text(spans, ChangeTag::Insert)
}

fn side_text(spans: &[Span], own: ChangeTag) -> String {
    spans
        .iter()
        .filter(|span| span.tag == ChangeTag::Equal || span.tag == own)
        .map(|span| span.text.as_str())
        .collect()
}

/// Append `text`, coalescing with the last span when the tags match.
fn push(spans: &mut Vec<Span>, tag: ChangeTag, text: &str) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.tag == tag => last.text.push_str(text),
        _ => spans.push(Span::new(tag, text)),
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Coalesce each run of edits into one deletion followed by one insertion,
/// moving any common prefix or suffix out into the neighbouring equalities.
fn cleanup_merge(spans: Vec<Span>) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    for span in spans {
        match span.tag {
            ChangeTag::Delete => deleted.push_str(&span.text),
            ChangeTag::Insert => inserted.push_str(&span.text),
            ChangeTag::Equal => {
                flush_edits(&mut out, &mut deleted, &mut inserted);
                push(&mut out, ChangeTag::Equal, &span.text);
            }
        }
    }
    flush_edits(&mut out, &mut deleted, &mut inserted);
    out
}

fn flush_edits(out: &mut Vec<Span>, deleted: &mut String, inserted: &mut String) {
    let mut suffix = String::new();
    if !deleted.is_empty() && !inserted.is_empty() {
        let prefix = common_prefix(deleted, inserted);
        push(out, ChangeTag::Equal, &deleted[..prefix]);
        deleted.drain(..prefix);
        inserted.drain(..prefix);

        let tail = common_suffix(deleted, inserted);
        suffix = deleted.split_off(deleted.len() - tail);
        inserted.truncate(inserted.len() - tail);
    }
    push(out, ChangeTag::Delete, deleted);
    push(out, ChangeTag::Insert, inserted);
    push(out, ChangeTag::Equal, &suffix);
    deleted.clear();
    inserted.clear();
}

/// Byte length of the common prefix.
fn common_prefix(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((index, _), _)| index)
}

/// Byte length of the common suffix.
fn common_suffix(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x.len_utf8())
        .sum()
}

// ---------------------------------------------------------------------------
// Semantic & efficiency
// ---------------------------------------------------------------------------

/// Inserted and deleted character counts of the edit run adjacent to an
/// equality, walking away from it.
fn edit_run<'a>(spans: impl Iterator<Item = &'a Span>) -> (usize, usize) {
    spans
        .take_while(|span| span.tag != ChangeTag::Equal)
        .fold((0, 0), |(ins, del), span| match span.tag {
            ChangeTag::Insert => (ins + span.len(), del),
            _ => (ins, del + span.len()),
        })
}

/// Replace the first equality for which `eliminate` holds with an equivalent
/// deletion and insertion, re-normalising after each change.
fn eliminate_equalities<F>(mut spans: Vec<Span>, eliminate: F) -> Vec<Span>
where
    F: Fn(usize, (usize, usize), (usize, usize)) -> bool,
{
    loop {
        let target = (1..spans.len().saturating_sub(1)).find(|&i| {
            spans[i].tag == ChangeTag::Equal
                && eliminate(
                    spans[i].len(),
                    edit_run(spans[..i].iter().rev()),
                    edit_run(spans[i + 1..].iter()),
                )
        });
        let Some(i) = target else {
            return spans;
        };
        let text = std::mem::take(&mut spans[i].text);
        spans[i] = Span::new(ChangeTag::Delete, text.clone());
        spans.insert(i + 1, Span::new(ChangeTag::Insert, text));
        spans = cleanup_merge(spans);
    }
}

fn cleanup_semantic(spans: Vec<Span>) -> Vec<Span> {
    let spans = eliminate_equalities(cleanup_merge(spans), |len, before, after| {
        let before = before.0.max(before.1);
        let after = after.0.max(after.1);
        before > 0 && after > 0 && len <= before && len <= after
    });
    cleanup_semantic_lossless(spans)
}

fn cleanup_efficiency(spans: Vec<Span>) -> Vec<Span> {
    eliminate_equalities(cleanup_merge(spans), |len, before, after| {
        let sides = [before.0, before.1, after.0, after.1]
            .iter()
            .filter(|&&n| n > 0)
            .count();
        let both = (before.0 + before.1) > 0 && (after.0 + after.1) > 0;
        both && len < EDIT_COST && (sides == 4 || (len < EDIT_COST / 2 && sides == 3))
    })
}

// ---------------------------------------------------------------------------
// Semantic lossless
// ---------------------------------------------------------------------------

/// Slide every single edit that sits between two equalities to the position
/// where its edges land on the most natural boundaries.
fn cleanup_semantic_lossless(mut spans: Vec<Span>) -> Vec<Span> {
    for i in 1..spans.len().saturating_sub(1) {
        if spans[i - 1].tag != ChangeTag::Equal
            || spans[i].tag == ChangeTag::Equal
            || spans[i + 1].tag != ChangeTag::Equal
        {
            continue;
        }

        let mut left: Vec<char> = spans[i - 1].text.chars().collect();
        let mut edit: Vec<char> = spans[i].text.chars().collect();
        let mut right: Vec<char> = spans[i + 1].text.chars().collect();

        // Start from the leftmost equivalent position.
        let shift = left
            .iter()
            .rev()
            .zip(edit.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        if shift > 0 {
            let moved = edit.split_off(edit.len() - shift);
            left.truncate(left.len() - shift);
            edit.splice(0..0, moved.iter().copied());
            right.splice(0..0, moved);
        }

        let mut best = (left.clone(), edit.clone(), right.clone());
        let mut best_score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
        while !edit.is_empty() && edit.first() == right.first() {
            let c = edit.remove(0);
            left.push(c);
            edit.push(right.remove(0));
            let score = boundary_score(&left, &edit) + boundary_score(&edit, &right);
            if score >= best_score {
                best_score = score;
                best = (left.clone(), edit.clone(), right.clone());
            }
        }

        spans[i - 1].text = best.0.into_iter().collect();
        spans[i].text = best.1.into_iter().collect();
        spans[i + 1].text = best.2.into_iter().collect();
    }

    // Re-coalesce around any equality that shrank to nothing.
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        push(&mut out, span.tag, &span.text);
    }
    out
}

/// How good a place the gap between `one` and `two` is for an edit edge.
/// Higher is better: 6 at the edges, down to 0 inside a word.
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&a), Some(&b)) = (one.last(), two.first()) else {
        return 6;
    };

    let a_break = a == '\n' || a == '\r';
    let b_break = b == '\n' || b == '\r';
    let blank = one.ends_with(&['\n', '\n']) || two.starts_with(&['\n', '\n']);

    if blank {
        5
    } else if a_break || b_break {
        4
    } else if !a.is_alphanumeric() && !a.is_whitespace() && b.is_whitespace() {
        3
    } else if a.is_whitespace() || b.is_whitespace() {
        2
    } else if !a.is_alphanumeric() || !b.is_alphanumeric() {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(tag: ChangeTag, text: &str) -> Span {
        Span::new(tag, text)
    }

    #[test]
    fn test_char_diff_sides_reconstruct_inputs() {
        let spans = char_diff("let x = 1;\n", "let y = 2;\n");
        assert_eq!(local_text(&spans), "let x = 1;\n");
        assert_eq!(other_text(&spans), "let y = 2;\n");
    }

    #[test]
    fn test_cleanup_preserves_both_texts() {
        let local = "fn main() {\n    println!(\"hello\");\n}\n";
        let other = "fn main() {\n    eprintln!(\"goodbye\");\n}\n";
        for mode in [
            CleanupMode::Efficiency,
            CleanupMode::Merge,
            CleanupMode::Semantic,
            CleanupMode::SemanticLossless,
        ] {
            let spans = cleanup(char_diff(local, other), mode);
            assert_eq!(local_text(&spans), local, "{mode}");
            assert_eq!(other_text(&spans), other, "{mode}");
        }
    }

    #[test]
    fn test_merge_reorders_and_factors() {
        let spans = vec![
            span(ChangeTag::Equal, "a"),
            span(ChangeTag::Insert, "xb"),
            span(ChangeTag::Delete, "xc"),
            span(ChangeTag::Equal, "d"),
        ];
        assert_eq!(
            cleanup_merge(spans),
            vec![
                span(ChangeTag::Equal, "ax"),
                span(ChangeTag::Delete, "c"),
                span(ChangeTag::Insert, "b"),
                span(ChangeTag::Equal, "d"),
            ]
        );
    }

    #[test]
    fn test_semantic_folds_small_equality() {
        let spans = vec![
            span(ChangeTag::Delete, "abc"),
            span(ChangeTag::Insert, "xyz"),
            span(ChangeTag::Equal, "-"),
            span(ChangeTag::Delete, "def"),
            span(ChangeTag::Insert, "uvw"),
        ];
        assert_eq!(
            cleanup_semantic(spans),
            vec![
                span(ChangeTag::Delete, "abc-def"),
                span(ChangeTag::Insert, "xyz-uvw"),
            ]
        );
    }

    #[test]
    fn test_semantic_keeps_large_equality() {
        let spans = vec![
            span(ChangeTag::Delete, "a"),
            span(ChangeTag::Equal, "long shared text"),
            span(ChangeTag::Insert, "b"),
        ];
        let cleaned = cleanup_semantic(spans.clone());
        assert_eq!(cleaned, spans);
    }

    #[test]
    fn test_efficiency_folds_tiny_equality_between_full_edits() {
        let spans = vec![
            span(ChangeTag::Delete, "ab"),
            span(ChangeTag::Insert, "12"),
            span(ChangeTag::Equal, "xyz"),
            span(ChangeTag::Delete, "cd"),
            span(ChangeTag::Insert, "34"),
        ];
        assert_eq!(
            cleanup_efficiency(spans),
            vec![
                span(ChangeTag::Delete, "abxyzcd"),
                span(ChangeTag::Insert, "12xyz34"),
            ]
        );
    }

    #[test]
    fn test_lossless_aligns_to_word_boundary() {
        let spans = vec![
            span(ChangeTag::Equal, "The c"),
            span(ChangeTag::Insert, "at c"),
            span(ChangeTag::Equal, "ame."),
        ];
        assert_eq!(
            cleanup_semantic_lossless(spans),
            vec![
                span(ChangeTag::Equal, "The "),
                span(ChangeTag::Insert, "cat "),
                span(ChangeTag::Equal, "came."),
            ]
        );
    }
}
