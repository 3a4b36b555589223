//! Styled run projection.
//!
//! The displayed content of a cell is never patched incrementally: it is regenerated from the
//! variant with [`render`] after every accepted mutation. The output is an ordered list of
//! `(text, style)` runs whose concatenated text is exactly the variant's display text.

use crate::atom::{DisplayMode, SegmentAtom};
use crate::style::StyleName;
use crate::variant::SegmentVariant;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use unicode_width::UnicodeWidthStr;

/// A contiguous piece of text drawn with one style.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyledRun {
    /// Run text.
    pub text: String,
    /// Style to draw the run with.
    pub style: StyleName,
}

impl StyledRun {
    /// Create a run.
    pub fn new(text: impl Into<String>, style: StyleName) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Run length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Options for [`render`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Render code atoms as glyphs or as raw markup.
    pub mode: DisplayMode,
    /// Display ranges to draw with [`StyleName::Highlight`]. Only text atoms are highlighted.
    pub highlights: Vec<Range<usize>>,
    /// Index into `highlights` of the match drawn with [`StyleName::CurrentHighlight`].
    pub current_highlight: Option<usize>,
}

/// Project `variant` into styled runs.
///
/// The projection uses `options.mode`, not the variant's own display mode.
pub fn render(variant: &SegmentVariant, options: &RenderOptions) -> Vec<StyledRun> {
    let mut runs: Vec<StyledRun> = Vec::with_capacity(variant.atoms().len());
    let current = options
        .current_highlight
        .and_then(|idx| options.highlights.get(idx));
    let mut pos = 0usize;

    for atom in variant.atoms() {
        match atom {
            SegmentAtom::Code(code) => {
                let text = code.display_text(options.mode);
                pos += text.chars().count();
                runs.push(StyledRun::new(text, StyleName::Tag));
            }
            SegmentAtom::Text { text } => {
                for ch in text.chars() {
                    let style = if current.is_some_and(|r| r.contains(&pos)) {
                        StyleName::CurrentHighlight
                    } else if options.highlights.iter().any(|r| r.contains(&pos)) {
                        StyleName::Highlight
                    } else {
                        StyleName::Regular
                    };
                    push_char(&mut runs, ch, style);
                    pos += 1;
                }
            }
        }
    }
    runs
}

fn push_char(runs: &mut Vec<StyledRun>, ch: char, style: StyleName) {
    match runs.last_mut() {
        // Tag runs stay separate so a host can map each one back to its atom.
        Some(last) if last.style == style && style != StyleName::Tag => last.text.push(ch),
        _ => runs.push(StyledRun::new(ch.to_string(), style)),
    }
}

/// Concatenated text of `runs`.
pub fn runs_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// Terminal column width of `runs`, counting East Asian wide characters as two columns.
pub fn display_width(runs: &[StyledRun]) -> usize {
    runs.iter().map(|r| r.text.width()).sum()
}
