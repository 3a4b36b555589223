//! The derived view of a cell.
//!
//! A [`CellView`] is what the host draws: styled runs, a selection and a text direction.
//! Bound cells rebuild it wholesale from the model after each accepted edit; the only
//! in-place patches are the pass-through edits of unbound cells and input-method removals.

use segment_core::{StyledRun, StyleName, display_width, runs_text};
use std::ops::Range;

/// A selection expressed as anchor and caret display offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellSelection {
    /// Where the selection started.
    pub anchor: usize,
    /// Where the caret is.
    pub caret: usize,
}

impl CellSelection {
    /// A collapsed selection (a caret).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            caret: offset,
        }
    }

    /// Lower bound.
    pub fn start(&self) -> usize {
        self.anchor.min(self.caret)
    }

    /// Upper bound.
    pub fn end(&self) -> usize {
        self.anchor.max(self.caret)
    }

    /// Half-open range `start..end`.
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Returns `true` for a collapsed selection.
    pub fn is_empty(&self) -> bool {
        self.anchor == self.caret
    }

    fn clamp(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            caret: self.caret.min(len),
        }
    }
}

/// Styled content, selection and direction of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellView {
    runs: Vec<StyledRun>,
    selection: CellSelection,
    right_to_left: bool,
}

impl CellView {
    /// Styled runs in display order.
    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.runs.iter().map(StyledRun::char_len).sum()
    }

    /// Returns `true` if the view shows nothing.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Current selection.
    pub fn selection(&self) -> CellSelection {
        self.selection
    }

    /// Whether the content is laid out right-to-left.
    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    /// Terminal column width of the content.
    pub fn display_width(&self) -> usize {
        display_width(&self.runs)
    }

    pub(crate) fn set_right_to_left(&mut self, rtl: bool) {
        self.right_to_left = rtl;
    }

    pub(crate) fn set_selection(&mut self, selection: CellSelection) {
        self.selection = selection.clamp(self.len());
    }

    /// Clear-then-rebuild.
    pub(crate) fn replace_runs(&mut self, runs: Vec<StyledRun>) {
        self.runs = runs;
        self.selection = self.selection.clamp(self.len());
    }

    pub(crate) fn append_runs(&mut self, runs: impl IntoIterator<Item = StyledRun>) {
        self.runs.extend(runs.into_iter().filter(|r| !r.text.is_empty()));
    }

    /// Remove `length` characters at `offset` without consulting any model.
    pub(crate) fn remove_chars(&mut self, offset: usize, length: usize) {
        self.splice_chars(offset, length, None);
    }

    /// Replace `length` characters at `offset` with regular-styled `text`.
    pub(crate) fn replace_chars(&mut self, offset: usize, length: usize, text: &str) {
        self.splice_chars(offset, length, Some(text));
    }

    fn splice_chars(&mut self, offset: usize, length: usize, text: Option<&str>) {
        let end = offset.saturating_add(length);
        let mut out: Vec<StyledRun> = Vec::with_capacity(self.runs.len() + 1);
        let mut pos = 0usize;
        let mut inserted = text.is_none_or(str::is_empty);

        for run in self.runs.drain(..) {
            let len = run.char_len();
            let (run_start, run_end) = (pos, pos + len);
            pos = run_end;

            let keep_head: String = run
                .text
                .chars()
                .take(offset.saturating_sub(run_start).min(len))
                .collect();
            let keep_tail: String = run
                .text
                .chars()
                .skip(end.saturating_sub(run_start).min(len))
                .collect();

            if !keep_head.is_empty() {
                out.push(StyledRun::new(keep_head, run.style));
            }
            if !inserted && run_end >= offset {
                if let Some(text) = text {
                    out.push(StyledRun::new(text, StyleName::Regular));
                }
                inserted = true;
            }
            if !keep_tail.is_empty() {
                out.push(StyledRun::new(keep_tail, run.style));
            }
        }
        if !inserted {
            if let Some(text) = text {
                out.push(StyledRun::new(text, StyleName::Regular));
            }
        }
        self.runs = out;
        self.selection = self.selection.clamp(self.len());
    }
}
