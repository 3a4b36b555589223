//! The editable text cell.
//!
//! A [`SegmentCell`] owns one live [`SegmentVariant`] and the [`CellView`] derived from it.
//! The host's text widget never edits the view directly: it proposes every raw edit to the
//! cell ([`SegmentCell::remove`], [`SegmentCell::replace`]), the cell validates the edit against
//! the variant's tag boundaries, mutates the model, and regenerates the view from
//! [`segment_core::render`].
//!
//! # Lifecycle
//!
//! ```text
//! unbound ──set_variant──▶ bound, in sync ──edit──▶ bound, pending validation
//!    ▲                                                      │
//!    └──────────────── take_variant (if can_stop_editing) ◀─┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use segment_cell::{CellConfig, EditOutcome, SegmentCell};
//! use segment_core::{SegmentAtom, SegmentVariant};
//! use std::sync::Arc;
//!
//! let variant = SegmentVariant::new(vec![
//!     SegmentAtom::text("Hello "),
//!     SegmentAtom::code("{1}", "<b>", "bold"),
//!     SegmentAtom::text(" world"),
//! ]);
//! let mut cell = SegmentCell::with_variant(Arc::new(CellConfig::default()), 2, variant, false, false);
//!
//! // Backspacing into the tag deletes the whole tag.
//! assert!(matches!(cell.remove(8, 1), EditOutcome::Applied { .. }));
//! assert_eq!(cell.text(), "Hello  world");
//!
//! // The tag is missing compared to the snapshot, so the cell must not be left.
//! assert!(!cell.can_stop_editing());
//! ```

use crate::config::CellConfig;
use crate::view::{CellSelection, CellView};
use segment_core::{
    DisplayMode, EditError, RenderOptions, SegmentVariant, StyleDirective, StyleName, StyledRun,
    ValidationReport, render,
};
use std::ops::Range;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Result of proposing an edit to a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The model was mutated and the view regenerated.
    Applied {
        /// Model range that was replaced, after tag expansion.
        range: Range<usize>,
        /// Number of display characters inserted at `range.start`.
        inserted: usize,
    },
    /// Only the view changed: the cell is unbound, or an input-method removal was absorbed.
    ViewOnly,
    /// The edit had no effect.
    Unchanged,
    /// The edit was refused; model and view are exactly as before.
    Rejected(EditError),
}

impl EditOutcome {
    /// Returns `true` if the model or view changed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Applied { .. } | Self::ViewOnly)
    }
}

/// Notifications emitted by a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEvent {
    /// The view was rebuilt from the model.
    ViewRegenerated {
        /// Row of the bound segment.
        row: Option<usize>,
    },
    /// A selection straddling part of a tag was widened to whole atoms.
    SelectionExpanded {
        /// Selection as requested.
        from: Range<usize>,
        /// Selection after snapping.
        to: Range<usize>,
    },
    /// A proposed edit was refused.
    EditRejected(EditError),
    /// A transfer exported from this cell finished.
    TransferCompleted {
        /// Whether the exported selection has been cleared from this cell's model.
        cleared: bool,
    },
}

/// Callback type for cell notifications.
pub type CellEventCallback = Box<dyn FnMut(&CellEvent) + Send>;

/// Tag-aware editable cell for one segment variant.
pub struct SegmentCell {
    /// `None` for sizing cells, which carry no styles.
    pub(crate) config: Option<Arc<CellConfig>>,
    pub(crate) row: Option<usize>,
    pub(crate) variant: Option<SegmentVariant>,
    pub(crate) snapshot: Option<SegmentVariant>,
    pub(crate) mode: DisplayMode,
    pub(crate) view: CellView,
    highlights: Vec<Range<usize>>,
    current_highlight: Option<usize>,
    input_method_changed: bool,
    listeners: Vec<CellEventCallback>,
}

impl std::fmt::Debug for SegmentCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCell")
            .field("row", &self.row)
            .field("variant", &self.variant)
            .field("mode", &self.mode)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl SegmentCell {
    /// Create an empty, unbound cell that renders with `config`.
    pub fn new(config: Arc<CellConfig>) -> Self {
        Self::build(Some(config))
    }

    /// Create a cell used only to measure content: no styles, no edit control.
    ///
    /// Use [`Self::set_plain_text`] and [`CellView::display_width`].
    pub fn sizing() -> Self {
        Self::build(None)
    }

    /// Create a cell already bound to `variant`.
    pub fn with_variant(
        config: Arc<CellConfig>,
        row: usize,
        variant: SegmentVariant,
        raw: bool,
        right_to_left: bool,
    ) -> Self {
        let mut cell = Self::new(config);
        cell.set_variant(row, variant, raw);
        cell.set_bidi(right_to_left);
        cell
    }

    fn build(config: Option<Arc<CellConfig>>) -> Self {
        Self {
            config,
            row: None,
            variant: None,
            snapshot: None,
            mode: DisplayMode::Glyph,
            view: CellView::default(),
            highlights: Vec::new(),
            current_highlight: None,
            input_method_changed: false,
            listeners: Vec::new(),
        }
    }

    /// Bind `variant` for row `row`, snapshot it, and regenerate the view.
    ///
    /// The variant is switched to the display mode matching `raw` so that view and model
    /// offsets agree.
    pub fn set_variant(&mut self, row: usize, mut variant: SegmentVariant, raw: bool) {
        self.mode = DisplayMode::from_raw(raw);
        variant.set_display_mode(self.mode);
        self.snapshot = Some(variant.create_copy());
        self.variant = Some(variant);
        self.row = Some(row);
        self.highlights.clear();
        self.current_highlight = None;
        self.input_method_changed = false;
        self.view.set_selection(CellSelection::default());
        tracing::debug!(row, raw, "segment cell bound");
        self.sync_model_to_view();
    }

    /// Unbind and return the edited variant, leaving the cell empty.
    ///
    /// Hosts should check [`Self::can_stop_editing`] first.
    pub fn take_variant(&mut self) -> Option<SegmentVariant> {
        let variant = self.variant.take();
        self.snapshot = None;
        self.row = None;
        self.view.replace_runs(Vec::new());
        variant
    }

    /// Mark the content as right-to-left.
    pub fn set_bidi(&mut self, right_to_left: bool) {
        self.view.set_right_to_left(right_to_left);
    }

    /// Show unstyled text in a sizing or unbound cell.
    pub fn set_plain_text(&mut self, text: &str) {
        self.view
            .replace_runs(vec![StyledRun::new(text, StyleName::Regular)]);
    }

    /// Row of the bound segment.
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// The live variant, for committing back to the document.
    pub fn variant(&self) -> Option<&SegmentVariant> {
        self.variant.as_ref()
    }

    /// The pre-edit snapshot taken when the variant was bound.
    pub fn snapshot(&self) -> Option<&SegmentVariant> {
        self.snapshot.as_ref()
    }

    /// Whether tags render as full markup.
    pub fn is_raw(&self) -> bool {
        self.mode.is_raw()
    }

    /// The derived view.
    pub fn view(&self) -> &CellView {
        &self.view
    }

    /// Styled runs of the view.
    pub fn runs(&self) -> &[StyledRun] {
        self.view.runs()
    }

    /// Text of the view.
    pub fn text(&self) -> String {
        self.view.text()
    }

    /// Current selection range.
    pub fn selection(&self) -> Range<usize> {
        self.view.selection().range()
    }

    /// Rendering directive for `style`. Sizing cells always use the host default.
    pub fn directive(&self, style: StyleName) -> StyleDirective {
        self.config
            .as_ref()
            .map(|c| c.styles.get(style))
            .unwrap_or_default()
    }

    /// Register a listener for [`CellEvent`]s.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&CellEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    pub(crate) fn notify(&mut self, event: CellEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    /// Rebuild the view from the model: clear, then render.
    pub(crate) fn sync_model_to_view(&mut self) {
        let runs = match &self.variant {
            Some(variant) => render(
                variant,
                &RenderOptions {
                    mode: self.mode,
                    highlights: self.highlights.clone(),
                    current_highlight: self.current_highlight,
                },
            ),
            None => Vec::new(),
        };
        self.view.replace_runs(runs);
        let row = self.row;
        self.notify(CellEvent::ViewRegenerated { row });
    }

    /// Signal that the next removal is part of input-method composition.
    ///
    /// The following [`Self::remove`] updates the view only. The flag is reset after any
    /// filtered operation.
    pub fn input_method_text_changed(&mut self) {
        self.input_method_changed = true;
    }

    /// Propose deleting `[offset, offset + length)`.
    ///
    /// If the range bisects a tag it is widened to whole atoms and the widened range is
    /// deleted, so removing one character of a tag removes the entire tag.
    pub fn remove(&mut self, offset: usize, length: usize) -> EditOutcome {
        let composing = std::mem::take(&mut self.input_method_changed);
        let Some(variant) = self.variant.as_mut() else {
            self.view.remove_chars(offset, length);
            return EditOutcome::ViewOnly;
        };
        if length == 0 {
            return EditOutcome::Unchanged;
        }

        let end = offset.saturating_add(length);
        if variant.contains_tag(offset, length) {
            let range = variant.expand_to_tag_boundaries(offset, end);
            let result = variant.clear_selection(range.start, range.end);
            return self.finish_edit(result, range, 0);
        }
        if composing {
            tracing::trace!(offset, length, "removal absorbed by input-method composition");
            self.view.remove_chars(offset, length);
            return EditOutcome::ViewOnly;
        }
        let result = variant.modify_chars(offset, length, None);
        self.finish_edit(result, offset..end, 0)
    }

    /// Propose replacing `[offset, offset + length)` with `text`.
    ///
    /// A non-empty range that bisects a tag is widened first. A pure insertion
    /// (`length == 0`) strictly inside a tag is refused.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) -> EditOutcome {
        self.input_method_changed = false;
        let Some(variant) = self.variant.as_mut() else {
            self.view.replace_chars(offset, length, text);
            return EditOutcome::ViewOnly;
        };
        let inserted = text.chars().count();

        if length > 0 {
            let end = offset.saturating_add(length);
            let range = if variant.contains_tag(offset, length) {
                variant.expand_to_tag_boundaries(offset, end)
            } else {
                offset..end
            };
            let result = variant.modify_chars(range.start, range.len(), Some(text));
            return self.finish_edit(result, range, inserted);
        }

        if inserted == 0 {
            return EditOutcome::Unchanged;
        }
        if !variant.can_insert_at(offset) {
            let err = EditError::InsideTag { offset };
            tracing::debug!(offset, "keystroke inside tag ignored");
            self.notify(CellEvent::EditRejected(err.clone()));
            return EditOutcome::Rejected(err);
        }
        let result = variant.modify_chars(offset, 0, Some(text));
        self.finish_edit(result, offset..offset, inserted)
    }

    /// Propose inserting `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> EditOutcome {
        self.replace(offset, 0, text)
    }

    /// Type `text` over the current selection, or at the caret.
    pub fn type_text(&mut self, text: &str) -> EditOutcome {
        let selection = self.selection();
        self.replace(selection.start, selection.len(), text)
    }

    /// Delete the selection, or the grapheme cluster before the caret.
    pub fn backspace(&mut self) -> EditOutcome {
        let selection = self.selection();
        if !selection.is_empty() {
            return self.remove(selection.start, selection.len());
        }
        let text = self.view.text();
        let Some((byte, grapheme)) = text
            .grapheme_indices(true)
            .take_while(|(byte, _)| text[..*byte].chars().count() < selection.start)
            .last()
        else {
            return EditOutcome::Unchanged;
        };
        let start = text[..byte].chars().count();
        self.remove(start, grapheme.chars().count())
    }

    /// Delete the selection, or the grapheme cluster after the caret.
    pub fn delete_forward(&mut self) -> EditOutcome {
        let selection = self.selection();
        if !selection.is_empty() {
            return self.remove(selection.start, selection.len());
        }
        let text = self.view.text();
        let Some(grapheme) = text
            .grapheme_indices(true)
            .find(|(byte, _)| text[..*byte].chars().count() == selection.start)
            .map(|(_, g)| g)
        else {
            return EditOutcome::Unchanged;
        };
        self.remove(selection.start, grapheme.chars().count())
    }

    pub(crate) fn finish_edit(
        &mut self,
        result: Result<(), EditError>,
        range: Range<usize>,
        inserted: usize,
    ) -> EditOutcome {
        match result {
            Ok(()) => {
                tracing::debug!(
                    row = ?self.row,
                    start = range.start,
                    end = range.end,
                    inserted,
                    "segment edit applied"
                );
                self.highlights.clear();
                self.current_highlight = None;
                self.sync_model_to_view();
                self.view
                    .set_selection(CellSelection::caret(range.start + inserted));
                EditOutcome::Applied { range, inserted }
            }
            Err(err) => {
                tracing::debug!(row = ?self.row, error = %err, "segment edit rejected");
                self.notify(CellEvent::EditRejected(err.clone()));
                EditOutcome::Rejected(err)
            }
        }
    }

    /// Set the selection, snapping any end that falls inside a tag outward.
    ///
    /// Snapping happens once: the widened selection is stored directly and produces a single
    /// [`CellEvent::SelectionExpanded`].
    pub fn set_selection(&mut self, anchor: usize, caret: usize) -> Range<usize> {
        let requested = CellSelection { anchor, caret };
        self.view.set_selection(requested);
        let requested = self.view.selection();
        if requested.is_empty() {
            return requested.range();
        }
        let Some(variant) = &self.variant else {
            return requested.range();
        };

        let start = variant.find_selection_start(requested.start());
        let end = variant.find_selection_end(requested.end());
        if start == requested.start() && end == requested.end() {
            return requested.range();
        }

        let expanded = if requested.anchor <= requested.caret {
            CellSelection {
                anchor: start,
                caret: end,
            }
        } else {
            CellSelection {
                anchor: end,
                caret: start,
            }
        };
        self.view.set_selection(expanded);
        tracing::trace!(from = ?requested.range(), to = ?expanded.range(), "selection snapped to tag boundaries");
        self.notify(CellEvent::SelectionExpanded {
            from: requested.range(),
            to: expanded.range(),
        });
        expanded.range()
    }

    /// Move the caret to `offset`, collapsing the selection.
    pub fn set_caret(&mut self, offset: usize) {
        self.view.set_selection(CellSelection::caret(offset));
    }

    /// Tooltip for the position under the pointer: the verbose description of a tag.
    pub fn tooltip_at(&self, offset: usize) -> Option<&str> {
        self.variant
            .as_ref()?
            .atom_at(offset)?
            .as_code()
            .map(|code| code.verbose_data.as_str())
    }

    /// Gate the host must consult before focus may leave the cell.
    ///
    /// Returns `true` if the variant needs no validation or validates against its pre-edit
    /// snapshot under the configured policy.
    pub fn can_stop_editing(&self) -> bool {
        match (&self.variant, &self.snapshot) {
            (Some(variant), Some(snapshot)) => {
                !variant.needs_validation()
                    || variant.validate_with(snapshot, self.validation_policy())
            }
            _ => true,
        }
    }

    /// Tags missing from, or unexpected in, the live variant relative to its snapshot.
    pub fn validation_report(&self) -> ValidationReport {
        match (&self.variant, &self.snapshot) {
            (Some(variant), Some(snapshot)) => ValidationReport::compare(variant, snapshot),
            _ => ValidationReport::default(),
        }
    }

    fn validation_policy(&self) -> segment_core::ValidationPolicy {
        self.config
            .as_ref()
            .map(|c| c.validation)
            .unwrap_or_default()
    }

    /// Draw `ranges` as search matches, with `current` as the focused one.
    pub fn set_highlights(&mut self, ranges: Vec<Range<usize>>, current: Option<usize>) {
        self.highlights = ranges;
        self.current_highlight = current;
        self.sync_model_to_view();
    }

    /// Remove search highlighting.
    pub fn clear_highlights(&mut self) {
        self.set_highlights(Vec::new(), None);
    }

    /// Append a precomputed diff run list to the view. The model is not touched.
    pub fn set_target_diff(&mut self, runs: Vec<StyledRun>) {
        self.view.append_runs(runs);
    }
}
