//! Search within a segment variant.
//!
//! Queries run over the variant's display text and report **display offsets**. A match that
//! overlaps a code atom is discarded, so every reported range is tag-safe and covers text only.
//! Hosts feed the results to a cell as highlight ranges.

use crate::variant::SegmentVariant;
use regex::{Regex, RegexBuilder};
use std::ops::Range;
use thiserror::Error;

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words.
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match expressed as a half-open display range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Inclusive start display offset.
    pub start: usize,
    /// Exclusive end display offset.
    pub end: usize,
}

impl SearchMatch {
    /// Match as a `Range`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provided regex pattern failed to compile.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

fn compile(query: &str, options: SearchOptions) -> Result<Regex, SearchError> {
    let pattern = if options.regex {
        query.to_string()
    } else {
        regex::escape(query)
    };
    Ok(RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()?)
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Find every occurrence of `query` in `variant`'s text atoms.
///
/// Returns an empty list for an empty query.
pub fn find_all(
    variant: &SegmentVariant,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let re = compile(query, options)?;
    let text = variant.display_text();
    let chars: Vec<char> = text.chars().collect();
    let mut byte_to_char: Vec<usize> = vec![0; text.len() + 1];
    for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
        for slot in &mut byte_to_char[byte_idx..byte_idx + ch.len_utf8()] {
            *slot = char_idx;
        }
    }
    byte_to_char[text.len()] = chars.len();

    let tag_ranges: Vec<Range<usize>> = variant
        .spans()
        .into_iter()
        .filter(|s| s.atom.is_code())
        .map(|s| s.start..s.end)
        .collect();

    let mut matches = Vec::new();
    for m in re.find_iter(&text) {
        let candidate = SearchMatch {
            start: byte_to_char[m.start()],
            end: byte_to_char[m.end()],
        };
        if candidate.start >= candidate.end {
            continue;
        }
        if tag_ranges
            .iter()
            .any(|t| t.start < candidate.end && candidate.start < t.end)
        {
            continue;
        }
        if options.whole_word {
            let before = candidate
                .start
                .checked_sub(1)
                .and_then(|i| chars.get(i))
                .copied();
            let after = chars.get(candidate.end).copied();
            if before.is_some_and(is_word_char) || after.is_some_and(is_word_char) {
                continue;
            }
        }
        matches.push(candidate);
    }
    Ok(matches)
}

/// Index of the first match starting at or after `from`, wrapping to the first match.
pub fn next_match_index(matches: &[SearchMatch], from: usize) -> Option<usize> {
    if matches.is_empty() {
        return None;
    }
    Some(matches.iter().position(|m| m.start >= from).unwrap_or(0))
}
