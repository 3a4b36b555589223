//! The segment variant: one editable side (source or target) of a translation segment.
//!
//! # Offsets
//!
//! Every offset in this module is a **display offset**: a count of Unicode scalar values in
//! the text produced by [`SegmentVariant::display_text`] under the variant's current
//! [`DisplayMode`]. A code atom occupies a contiguous range of display offsets and is never
//! split: a mutation whose range starts or ends strictly inside a code atom is rejected with
//! [`EditError`] and leaves the variant unchanged.
//!
//! # Example
//!
//! ```rust
//! use segment_core::{SegmentAtom, SegmentVariant};
//!
//! let mut v = SegmentVariant::new(vec![
//!     SegmentAtom::text("Hello "),
//!     SegmentAtom::code("{1}", "<b>", "bold"),
//!     SegmentAtom::text(" world"),
//! ]);
//!
//! // The tag spans offsets 6..9.
//! assert!(v.contains_tag(6, 1));
//! assert_eq!(v.find_selection_end(7), 9);
//! assert!(!v.can_insert_at(7));
//!
//! v.modify_chars(6, 3, None).unwrap();
//! assert_eq!(v.display_text(), "Hello  world");
//! ```

use crate::atom::{CodeAtom, DisplayMode, SegmentAtom};
use crate::error::EditError;
use crate::render::{RenderOptions, StyledRun, render};
use crate::validation::{ValidationPolicy, ValidationReport};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Display range occupied by one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomSpan<'a> {
    /// Index of the atom in the variant.
    pub index: usize,
    /// Inclusive start display offset.
    pub start: usize,
    /// Exclusive end display offset.
    pub end: usize,
    /// The atom itself.
    pub atom: &'a SegmentAtom,
}

impl AtomSpan<'_> {
    /// Returns `true` if `offset` lies strictly between the span's bounds.
    pub fn strictly_contains(&self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }
}

/// An ordered sequence of atoms forming one side of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentVariant {
    atoms: Vec<SegmentAtom>,
    #[serde(default)]
    mode: DisplayMode,
    #[serde(default)]
    tags_touched: bool,
}

impl SegmentVariant {
    /// Create a variant from an atom sequence, displayed in [`DisplayMode::Glyph`].
    pub fn new(atoms: Vec<SegmentAtom>) -> Self {
        let atoms = atoms
            .into_iter()
            .filter(|atom| !matches!(atom, SegmentAtom::Text { text } if text.is_empty()))
            .collect();
        Self {
            atoms,
            mode: DisplayMode::Glyph,
            tags_touched: false,
        }
    }

    /// Create a variant holding a single text atom (or nothing, for an empty string).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![SegmentAtom::text(text)])
    }

    /// Produce a fully independent copy with identical atoms and display mode.
    ///
    /// Used for transfer payloads and for pre-edit snapshots.
    pub fn create_copy(&self) -> Self {
        self.clone()
    }

    /// The atom sequence.
    pub fn atoms(&self) -> &[SegmentAtom] {
        &self.atoms
    }

    /// Current display mode.
    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switch the display mode. Offsets are re-measured against the new projection.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Display length in characters.
    pub fn len(&self) -> usize {
        self.atoms.iter().map(|a| a.display_len(self.mode)).sum()
    }

    /// Returns `true` if the variant has no display characters and no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Display ranges of all atoms, in order.
    pub fn spans(&self) -> Vec<AtomSpan<'_>> {
        let mut pos = 0;
        self.atoms
            .iter()
            .enumerate()
            .map(|(index, atom)| {
                let start = pos;
                pos += atom.display_len(self.mode);
                AtomSpan {
                    index,
                    start,
                    end: pos,
                    atom,
                }
            })
            .collect()
    }

    fn code_spans(&self) -> impl Iterator<Item = AtomSpan<'_>> {
        self.spans().into_iter().filter(|s| s.atom.is_code())
    }

    /// Returns `true` if a character-level edit of `[offset, offset + length)` would bisect a
    /// code atom, i.e. either end of the range falls strictly inside one.
    ///
    /// A range that fully covers a tag, or touches it only at its edges, is tag-safe.
    pub fn contains_tag(&self, offset: usize, length: usize) -> bool {
        let end = offset.saturating_add(length);
        self.code_spans()
            .any(|span| span.strictly_contains(offset) || span.strictly_contains(end))
    }

    /// Round `offset` backward to the start of the code atom it falls inside, if any.
    pub fn find_selection_start(&self, offset: usize) -> usize {
        self.code_spans()
            .find(|span| span.strictly_contains(offset))
            .map_or(offset, |span| span.start)
    }

    /// Round `offset` forward to the end of the code atom it falls inside, if any.
    pub fn find_selection_end(&self, offset: usize) -> usize {
        self.code_spans()
            .find(|span| span.strictly_contains(offset))
            .map_or(offset, |span| span.end)
    }

    /// Expand `[start, end)` outward to the nearest atom boundaries.
    pub fn expand_to_tag_boundaries(&self, start: usize, end: usize) -> Range<usize> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.find_selection_start(start)..self.find_selection_end(end)
    }

    /// Returns `false` only if `offset` lies strictly inside a code atom.
    ///
    /// Offsets past the end are not a tag matter; edits there fail with
    /// [`EditError::OutOfBounds`].
    pub fn can_insert_at(&self, offset: usize) -> bool {
        !self.code_spans().any(|span| span.strictly_contains(offset))
    }

    /// Replace `remove_count` display characters at `offset` with `insert_text`.
    ///
    /// - `remove_count == 0` is a pure insertion; `offset` must satisfy [`Self::can_insert_at`].
    /// - `insert_text` of `None` or `""` with `remove_count > 0` is a pure deletion.
    /// - Code atoms wholly inside the removed range are removed whole.
    pub fn modify_chars(
        &mut self,
        offset: usize,
        remove_count: usize,
        insert_text: Option<&str>,
    ) -> Result<(), EditError> {
        let insert = match insert_text {
            Some(text) if !text.is_empty() => vec![SegmentAtom::text(text)],
            _ => Vec::new(),
        };
        self.splice(offset, offset.saturating_add(remove_count), insert)
    }

    /// Remove everything in `[start, end)`. The range must already be tag-safe.
    pub fn clear_selection(&mut self, start: usize, end: usize) -> Result<(), EditError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.splice(start, end, Vec::new())
    }

    /// Clear `[start, end)` and insert `atoms` at `start` in one all-or-nothing step.
    pub fn replace_selection(
        &mut self,
        start: usize,
        end: usize,
        atoms: impl IntoIterator<Item = SegmentAtom>,
    ) -> Result<(), EditError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.splice(start, end, atoms.into_iter().collect())
    }

    /// Atoms covering `[start, end)`, with text atoms trimmed to the range.
    ///
    /// Code atoms are included only when the range covers them whole.
    pub fn atoms_in_range(&self, start: usize, end: usize) -> Vec<SegmentAtom> {
        let mut out = Vec::new();
        for span in self.spans() {
            if span.end <= start || span.start >= end {
                continue;
            }
            match span.atom {
                SegmentAtom::Text { text } => {
                    let from = start.saturating_sub(span.start);
                    let to = end.min(span.end) - span.start;
                    let piece = char_slice(text, from, to);
                    if !piece.is_empty() {
                        out.push(SegmentAtom::text(piece));
                    }
                }
                SegmentAtom::Code(_) => {
                    if span.start >= start && span.end <= end {
                        out.push(span.atom.clone());
                    }
                }
            }
        }
        out
    }

    /// The atom covering display offset `offset`.
    pub fn atom_at(&self, offset: usize) -> Option<&SegmentAtom> {
        self.spans()
            .into_iter()
            .find(|span| span.start <= offset && offset < span.end)
            .map(|span| span.atom)
    }

    /// All code atoms in order.
    pub fn code_atoms(&self) -> impl Iterator<Item = &CodeAtom> {
        self.atoms.iter().filter_map(SegmentAtom::as_code)
    }

    /// Code atoms present in `reference` but absent here, in `reference` order.
    ///
    /// Tags are matched as a multiset: if `reference` has a tag twice and this variant once,
    /// one copy is reported missing.
    pub fn missing_tags(&self, reference: &SegmentVariant) -> Vec<CodeAtom> {
        ValidationReport::compare(self, reference).missing
    }

    /// Returns `true` if a mutation since construction inserted or removed a code atom.
    pub fn needs_validation(&self) -> bool {
        self.tags_touched
    }

    /// Validate the tag state against `reference` using [`ValidationPolicy::default`].
    pub fn validate_against(&self, reference: &SegmentVariant) -> bool {
        self.validate_with(reference, ValidationPolicy::default())
    }

    /// Validate the tag state against `reference` using `policy`.
    pub fn validate_with(&self, reference: &SegmentVariant, policy: ValidationPolicy) -> bool {
        policy.is_consistent(self, reference)
    }

    /// The ordered run list a view must render. Computed on demand, never stored.
    pub fn style_data(&self, raw: bool) -> Vec<StyledRun> {
        render(
            self,
            &RenderOptions {
                mode: DisplayMode::from_raw(raw),
                ..RenderOptions::default()
            },
        )
    }

    /// Full plain-text rendering in the current display mode.
    pub fn display_text(&self) -> String {
        self.atoms
            .iter()
            .map(|a| a.display_text(self.mode))
            .collect()
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EditError> {
        let len = self.len();
        if end > len {
            return Err(EditError::OutOfBounds {
                offset: start,
                length: end - start,
                len,
            });
        }
        if start == end {
            if !self.can_insert_at(start) {
                return Err(EditError::InsideTag { offset: start });
            }
        } else if self.contains_tag(start, end - start) {
            return Err(EditError::SplitsTag {
                offset: start,
                length: end - start,
            });
        }
        Ok(())
    }

    /// Core mutation: remove `[start, end)` and insert `insert` at `start`.
    ///
    /// The new sequence is built in a scratch vector and swapped in only after the range
    /// has been checked.
    fn splice(
        &mut self,
        start: usize,
        end: usize,
        insert: Vec<SegmentAtom>,
    ) -> Result<(), EditError> {
        self.check_range(start, end)?;

        let mut before: Vec<SegmentAtom> = Vec::new();
        let mut after: Vec<SegmentAtom> = Vec::new();
        let mut removed_code = false;
        // Set when a single text atom straddles the whole range.
        let mut split_text = false;

        for span in self.spans() {
            match span.atom {
                SegmentAtom::Code(_) => {
                    if span.end <= start {
                        before.push(span.atom.clone());
                    } else if span.start >= end {
                        after.push(span.atom.clone());
                    } else {
                        removed_code = true;
                    }
                }
                SegmentAtom::Text { text } => {
                    let len = span.end - span.start;
                    let head_len = start.saturating_sub(span.start).min(len);
                    let tail_from = end.saturating_sub(span.start).min(len);
                    if span.start < start && span.end > end {
                        split_text = true;
                    }
                    if head_len > 0 {
                        before.push(SegmentAtom::text(char_slice(text, 0, head_len)));
                    }
                    if tail_from < len {
                        after.push(SegmentAtom::text(char_slice(text, tail_from, len)));
                    }
                }
            }
        }

        let inserted_code = insert.iter().any(SegmentAtom::is_code);
        let mut middle: Vec<SegmentAtom> = insert
            .into_iter()
            .filter(|atom| !matches!(atom, SegmentAtom::Text { text } if text.is_empty()))
            .collect();

        let mut atoms = before;
        if middle.is_empty() {
            if split_text {
                join_front(&mut atoms, after);
            } else {
                atoms.extend(after);
            }
        } else {
            let first = middle.remove(0);
            push_joined(&mut atoms, first);
            atoms.extend(middle);
            join_front(&mut atoms, after);
        }

        self.atoms = atoms;
        if removed_code || inserted_code {
            self.tags_touched = true;
        }
        tracing::trace!(start, end, atoms = self.atoms.len(), "segment variant spliced");
        Ok(())
    }
}

/// Append `atom`, merging it into the last atom when both are text.
fn push_joined(atoms: &mut Vec<SegmentAtom>, atom: SegmentAtom) {
    match (atoms.last_mut(), atom) {
        (Some(SegmentAtom::Text { text: last }), SegmentAtom::Text { text }) => {
            last.push_str(&text);
        }
        (_, atom) => atoms.push(atom),
    }
}

/// Append `rest`, merging its first atom into the last atom of `atoms` when both are text.
fn join_front(atoms: &mut Vec<SegmentAtom>, rest: Vec<SegmentAtom>) {
    let mut rest = rest.into_iter();
    if let Some(first) = rest.next() {
        push_joined(atoms, first);
    }
    atoms.extend(rest);
}

/// Slice `text` by character offsets `[from, to)`.
pub(crate) fn char_slice(text: &str, from: usize, to: usize) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map_or(text.len(), |(byte, _)| byte)
    };
    if from >= to {
        return "";
    }
    &text[byte_at(from)..byte_at(to)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_tag_world() -> SegmentVariant {
        SegmentVariant::new(vec![
            SegmentAtom::text("Hello "),
            SegmentAtom::code("{1}", "<b>", "bold"),
            SegmentAtom::text(" world"),
        ])
    }

    #[test]
    fn test_spans() {
        let v = hello_tag_world();
        let spans: Vec<_> = v.spans().iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans, vec![(0, 6), (6, 9), (9, 15)]);
        assert_eq!(v.len(), 15);
    }

    #[test]
    fn test_contains_tag_edges() {
        let v = hello_tag_world();
        assert!(!v.contains_tag(5, 1));
        assert!(v.contains_tag(6, 1));
        assert!(v.contains_tag(8, 2));
        assert!(!v.contains_tag(6, 3));
        assert!(!v.contains_tag(5, 5));
        assert!(v.contains_tag(7, 0));
        assert!(!v.contains_tag(6, 0));
    }

    #[test]
    fn test_insert_merges_into_text() {
        let mut v = hello_tag_world();
        v.modify_chars(3, 0, Some("X")).unwrap();
        assert_eq!(v.atoms()[0], SegmentAtom::text("HelXlo "));
        assert_eq!(v.atoms().len(), 3);
        assert!(!v.needs_validation());
    }

    #[test]
    fn test_delete_inside_text_keeps_single_atom() {
        let mut v = hello_tag_world();
        v.modify_chars(1, 2, None).unwrap();
        assert_eq!(v.atoms()[0], SegmentAtom::text("Hlo "));
    }

    #[test]
    fn test_insert_inside_tag_rejected() {
        let mut v = hello_tag_world();
        let before = v.clone();
        assert_eq!(
            v.modify_chars(7, 0, Some("x")),
            Err(EditError::InsideTag { offset: 7 })
        );
        assert_eq!(v, before);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut v = hello_tag_world();
        assert!(matches!(
            v.modify_chars(14, 3, None),
            Err(EditError::OutOfBounds { len: 15, .. })
        ));
    }

    #[test]
    fn test_atoms_in_range_trims_text() {
        let v = hello_tag_world();
        assert_eq!(
            v.atoms_in_range(3, 11),
            vec![
                SegmentAtom::text("lo "),
                SegmentAtom::code("{1}", "<b>", "bold"),
                SegmentAtom::text(" w"),
            ]
        );
    }

    #[test]
    fn test_raw_mode_remeasures_offsets() {
        let mut v = SegmentVariant::new(vec![
            SegmentAtom::text("a"),
            SegmentAtom::code("{1}", "<bold>", "bold"),
        ]);
        v.set_display_mode(DisplayMode::Raw);
        assert_eq!(v.len(), 7);
        assert_eq!(v.find_selection_end(3), 7);
        assert_eq!(v.display_text(), "a<bold>");
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("añb👋c", 1, 4), "ñb👋");
        assert_eq!(char_slice("abc", 2, 2), "");
    }

    #[test]
    fn test_insert_past_end_is_out_of_bounds_not_a_tag_error() {
        let mut v = hello_tag_world();
        assert!(v.can_insert_at(15));
        assert!(v.can_insert_at(20));
        assert_eq!(
            v.modify_chars(20, 0, Some("x")),
            Err(EditError::OutOfBounds {
                offset: 20,
                length: 0,
                len: 15
            })
        );
        assert_eq!(v.display_text(), "Hello {1} world");
    }
}
