//! Pure pattern scanner
//!
//! Matches every compiled pattern against a full document snapshot and
//! emits one span per match (or per participating capture group).
//! Stateless and deterministic: same snapshot + same set always yields
//! the same spans in the same order.

use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;

use crate::registry::CompiledPatternSet;
use crate::span::{ScanResult, Span};

/// Tracks a monotonically advancing byte position and its character
/// offset, so repeated byte→char conversions don't re-count the prefix.
struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte`, which must not precede any byte
    /// previously passed to this cursor.
    fn advance_to(&mut self, byte: usize) -> usize {
        debug_assert!(byte >= self.byte);
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Scan a document snapshot against a compiled pattern set.
pub fn scan(text: &str, set: &CompiledPatternSet) -> ScanResult {
    // A fresh, never-set flag: this can't come back None
    scan_cancellable(text, set, &AtomicBool::new(false)).unwrap_or_default()
}

/// Scan with cooperative cancellation.
///
/// The flag is checked between match attempts; returns `None` if it was
/// set before the scan finished. Cancellation is best-effort: a scan
/// that never observes the flag simply runs to completion, and the
/// caller is expected to discard its result instead.
pub fn scan_cancellable(
    text: &str,
    set: &CompiledPatternSet,
    cancel: &AtomicBool,
) -> Option<ScanResult> {
    let mut spans = Vec::new();

    for tag in set.tags() {
        for pattern in &tag.patterns {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            if !emit_matches(text, &tag.name, pattern, cancel, &mut spans) {
                return None;
            }
        }
    }

    Some(spans)
}

/// Append spans for all matches of one pattern. Returns false when the
/// cancel flag fired mid-iteration.
fn emit_matches(
    text: &str,
    tag: &str,
    pattern: &Regex,
    cancel: &AtomicBool,
    spans: &mut Vec<Span>,
) -> bool {
    // Match starts are non-decreasing, so one cursor per pattern pass
    // converts byte offsets to character offsets in a single sweep.
    let mut cursor = CharCursor::new(text);
    let group_count = pattern.captures_len();

    for caps in pattern.captures_iter(text) {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }

        let whole = caps.get(0).expect("group 0 always participates");
        let match_start_chars = cursor.advance_to(whole.start());

        if group_count > 1 {
            // One span per participating capture group; optional groups
            // that didn't take part in this match are skipped.
            for i in 1..group_count {
                if let Some(group) = caps.get(i) {
                    let lead = text[whole.start()..group.start()].chars().count();
                    let start = match_start_chars + lead;
                    let end = start + group.as_str().chars().count();
                    spans.push(Span::new(tag, start, end));
                }
            }
        } else {
            let end = match_start_chars + whole.as_str().chars().count();
            spans.push(Span::new(tag, match_start_chars, end));
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{TagDefinition, TagSet};

    fn compile(tags: &[(&str, &[&str])]) -> CompiledPatternSet {
        let set = TagSet {
            tags: tags
                .iter()
                .map(|(name, patterns)| TagDefinition {
                    name: name.to_string(),
                    patterns: patterns.iter().map(|p| p.to_string()).collect(),
                    text_color: "#ffffff".to_string(),
                    background: None,
                })
                .collect(),
        };
        CompiledPatternSet::compile(&set).unwrap()
    }

    #[test]
    fn test_offset_correctness() {
        let set = compile(&[("tag", &["foo"])]);
        let spans = scan("foo bar foo", &set);
        assert_eq!(
            spans,
            vec![Span::new("tag", 0, 3), Span::new("tag", 8, 11)]
        );
    }

    #[test]
    fn test_capturing_groups_emit_one_span_each() {
        let set = compile(&[("pair", &[r"(\w+):\s*(\w+)"])]);
        let spans = scan("key: value", &set);
        assert_eq!(
            spans,
            vec![Span::new("pair", 0, 3), Span::new("pair", 5, 10)]
        );
    }

    #[test]
    fn test_optional_group_skipped_when_absent() {
        let set = compile(&[("opt", &[r"(a)(b)?"])]);
        let spans = scan("a ab", &set);
        // First match: only group 1. Second match: groups 1 and 2.
        assert_eq!(
            spans,
            vec![
                Span::new("opt", 0, 1),
                Span::new("opt", 2, 3),
                Span::new("opt", 3, 4),
            ]
        );
    }

    #[test]
    fn test_output_order_is_tag_then_pattern_then_match() {
        let set = compile(&[("first", &["b", "a"]), ("second", &["a"])]);
        let spans = scan("ab", &set);
        assert_eq!(
            spans,
            vec![
                Span::new("first", 1, 2),  // pattern "b"
                Span::new("first", 0, 1),  // pattern "a"
                Span::new("second", 0, 1), // next tag
            ]
        );
    }

    #[test]
    fn test_multiline_anchors() {
        let set = compile(&[("comment", &["^#.*$"])]);
        let spans = scan("# one\ncode\n# two", &set);
        assert_eq!(
            spans,
            vec![Span::new("comment", 0, 5), Span::new("comment", 11, 16)]
        );
    }

    #[test]
    fn test_offsets_are_character_counts() {
        // "héllo" has 5 chars but 6 bytes
        let set = compile(&[("word", &["wörld"])]);
        let spans = scan("héllo wörld", &set);
        assert_eq!(spans, vec![Span::new("word", 6, 11)]);
    }

    #[test]
    fn test_group_offsets_with_multibyte_text() {
        let set = compile(&[("pair", &[r"(\w+)=(\w+)"])]);
        let spans = scan("ü a=b", &set);
        assert_eq!(
            spans,
            vec![Span::new("pair", 2, 3), Span::new("pair", 4, 5)]
        );
    }

    #[test]
    fn test_deterministic_across_runs() {
        let set = compile(&[("num", &[r"\d+"]), ("word", &[r"[a-z]+"])]);
        let text = "abc 123 def 456";
        let first = scan(text, &set);
        let second = scan(text, &set);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_set_and_empty_text() {
        let empty_set = compile(&[]);
        assert!(scan("some text", &empty_set).is_empty());

        let set = compile(&[("num", &[r"\d+"])]);
        assert!(scan("", &set).is_empty());
    }

    #[test]
    fn test_cancelled_scan_returns_none() {
        let set = compile(&[("num", &[r"\d+"])]);
        let cancel = AtomicBool::new(true);
        assert!(scan_cancellable("1 2 3", &set, &cancel).is_none());
    }

    #[test]
    fn test_non_overlapping_leftmost_first() {
        let set = compile(&[("aa", &["aa"])]);
        let spans = scan("aaaa", &set);
        assert_eq!(spans, vec![Span::new("aa", 0, 2), Span::new("aa", 2, 4)]);
    }
}
