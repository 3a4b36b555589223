//! Clipboard and drag-and-drop transfer.
//!
//! Transfers carry a structured [`SegmentVariantSelection`] (row, deep copy of the variant,
//! selection bounds) so tags survive the round trip, plus a plain-text rendering for consumers
//! that cannot interpret the structured form.
//!
//! The protocol is a two-phase commit:
//!
//! 1. [`SegmentCell::begin_transfer`] snapshots the source selection into a [`Transfer`].
//! 2. The destination cell calls [`SegmentCell::import`] at most once.
//! 3. The source cell calls [`SegmentCell::complete_transfer`], which clears the original
//!    selection of a move exactly once. A move imported at or before its own source in the same
//!    row is cleared during the import instead, because inserting first would shift the source
//!    offsets; the transfer's `cleared` flag records that.
//!
//! The action in effect is the one the import used: a drop carries its own action, a paste keeps
//! the action the transfer began with. Completion honours that action, so a move dropped as a
//! copy leaves its source alone.
//!
//! Tags never cross rows: a structured payload imported into a different row falls back to its
//! plain text.

use crate::cell::{CellEvent, SegmentCell};
use segment_core::{EditError, SegmentAtom, SegmentVariant};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that cause an import or export to be refused. Nothing is mutated when one is returned.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer payload has neither a segment selection nor plain text")]
    /// The payload offers no format the cell understands.
    UnsupportedFormat,

    #[error("destination {start}..{end} would split an inline tag")]
    /// The destination range is not tag-safe.
    DestinationSplitsTag {
        /// Destination start.
        start: usize,
        /// Destination end.
        end: usize,
    },

    #[error("cannot move a selection into itself")]
    /// A same-row move targets a point or range overlapping the selection being moved.
    DropInsideSource,

    #[error("selection {start}..{end} does not fit a segment of length {len}")]
    /// A decoded selection is reversed or runs past the end of its variant.
    InvalidSelection {
        /// Decoded start.
        start: usize,
        /// Decoded end.
        end: usize,
        /// Display length of the decoded variant.
        len: usize,
    },

    #[error("transfer has already been imported")]
    /// A drag transfer is consumed by at most one import.
    AlreadyImported,

    #[error("cell has no segment bound")]
    /// The cell holds no variant.
    Unbound,

    #[error(transparent)]
    /// The model refused the edit.
    Edit(#[from] EditError),

    #[error("malformed segment selection payload: {0}")]
    /// A serialized selection could not be decoded.
    Malformed(#[from] serde_json::Error),
}

/// Whether the source keeps its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferAction {
    /// Copy: the source is untouched.
    Copy,
    /// Move: the source selection is cleared once the transfer completes.
    Move,
}

/// Where imported content goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    /// Replace the destination cell's current selection.
    Paste,
    /// Insert at a drop point.
    Drop {
        /// Display offset of the drop point.
        offset: usize,
        /// Action chosen by the user for the drop.
        action: TransferAction,
    },
}

/// How an import was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Atoms (tags included) were inserted.
    Structured,
    /// Only plain text was inserted.
    PlainText,
}

/// How the drag or clipboard operation ended, as reported to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The operation went through; a move clears its source.
    Done,
    /// The operation was abandoned; the source is left alone.
    Aborted,
}

/// A snapshot of a selection in one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SelectionFields")]
pub struct SegmentVariantSelection {
    row: usize,
    variant: SegmentVariant,
    selection_start: usize,
    selection_end: usize,
}

impl SegmentVariantSelection {
    /// Capture `[start, end)` of `variant` in `row`. `variant` should be a copy.
    pub fn new(row: usize, variant: SegmentVariant, start: usize, end: usize) -> Self {
        Self {
            row,
            variant,
            selection_start: start.min(end),
            selection_end: start.max(end),
        }
    }

    /// Source row.
    pub fn row(&self) -> usize {
        self.row
    }

    /// The copied variant.
    pub fn variant(&self) -> &SegmentVariant {
        &self.variant
    }

    /// Selection start in the copied variant.
    pub fn selection_start(&self) -> usize {
        self.selection_start
    }

    /// Selection end in the copied variant.
    pub fn selection_end(&self) -> usize {
        self.selection_end
    }

    /// Selected atoms, text trimmed to the selection.
    pub fn atoms(&self) -> Vec<SegmentAtom> {
        self.variant
            .atoms_in_range(self.selection_start, self.selection_end)
    }

    /// Plain-text rendering of the selection.
    pub fn display_text(&self) -> String {
        self.variant
            .display_text()
            .chars()
            .skip(self.selection_start)
            .take(self.selection_end.saturating_sub(self.selection_start))
            .collect()
    }

    /// Serialize for a private system-clipboard format.
    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a selection placed on the clipboard with [`Self::to_json`].
    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        serde_json::from_str(json).map_err(|err| {
            tracing::warn!(error = %err, "refused malformed segment selection payload");
            TransferError::from(err)
        })
    }
}

/// Wire form of [`SegmentVariantSelection`], checked before it becomes one.
#[derive(Deserialize)]
struct SelectionFields {
    row: usize,
    variant: SegmentVariant,
    selection_start: usize,
    selection_end: usize,
}

impl TryFrom<SelectionFields> for SegmentVariantSelection {
    type Error = TransferError;

    fn try_from(fields: SelectionFields) -> Result<Self, Self::Error> {
        let len = fields.variant.len();
        if fields.selection_start > fields.selection_end || fields.selection_end > len {
            return Err(TransferError::InvalidSelection {
                start: fields.selection_start,
                end: fields.selection_end,
                len,
            });
        }
        Ok(Self {
            row: fields.row,
            variant: fields.variant,
            selection_start: fields.selection_start,
            selection_end: fields.selection_end,
        })
    }
}

impl std::fmt::Display for SegmentVariantSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Row {} [{}, {}] of {:?}",
            self.row,
            self.selection_start,
            self.selection_end,
            self.variant.display_text()
        )
    }
}

/// The formats offered by a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferPayload {
    selection: Option<SegmentVariantSelection>,
    text: Option<String>,
}

impl TransferPayload {
    /// Offer a structured selection together with its plain-text rendering.
    pub fn from_selection(selection: SegmentVariantSelection) -> Self {
        let text = selection.display_text();
        Self {
            selection: Some(selection),
            text: Some(text),
        }
    }

    /// Offer plain text only, e.g. text copied from another application.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self {
            selection: None,
            text: Some(text.into()),
        }
    }

    /// A payload with no usable format.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The structured selection, if offered.
    pub fn selection(&self) -> Option<&SegmentVariantSelection> {
        self.selection.as_ref()
    }

    /// The plain-text rendering, if offered.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns `true` if the payload offers a format a cell can import.
    pub fn is_importable(&self) -> bool {
        self.selection.is_some() || self.text.is_some()
    }
}

/// An in-flight drag or clipboard transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    payload: TransferPayload,
    action: TransferAction,
    imported: bool,
    cleared: bool,
}

impl Transfer {
    /// Wrap a payload exported with `action`.
    pub fn new(payload: TransferPayload, action: TransferAction) -> Self {
        Self {
            payload,
            action,
            imported: false,
            cleared: false,
        }
    }

    /// The offered formats.
    pub fn payload(&self) -> &TransferPayload {
        &self.payload
    }

    /// Action in effect: the one requested at the start, replaced by the import's action once
    /// imported.
    pub fn action(&self) -> TransferAction {
        self.action
    }

    /// Whether the source selection has been cleared.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Whether a destination has imported this transfer.
    pub fn is_imported(&self) -> bool {
        self.imported
    }

    /// Consume the transfer, keeping only its payload.
    pub fn into_payload(self) -> TransferPayload {
        self.payload
    }
}

impl SegmentCell {
    /// Phase one: snapshot the current selection into a transfer.
    pub fn begin_transfer(&self, action: TransferAction) -> Result<Transfer, TransferError> {
        let (Some(row), Some(variant)) = (self.row, &self.variant) else {
            return Err(TransferError::Unbound);
        };
        let range = self.selection();
        let selection =
            SegmentVariantSelection::new(row, variant.create_copy(), range.start, range.end);
        tracing::debug!(%selection, ?action, "transfer started");
        Ok(Transfer::new(
            TransferPayload::from_selection(selection),
            action,
        ))
    }

    /// Copy the selection to a payload.
    pub fn copy(&self) -> Result<TransferPayload, TransferError> {
        Ok(self.begin_transfer(TransferAction::Copy)?.into_payload())
    }

    /// Cut the selection: export it, then clear it from the model immediately.
    pub fn cut(&mut self) -> Result<TransferPayload, TransferError> {
        let mut transfer = self.begin_transfer(TransferAction::Move)?;
        self.complete_transfer(&mut transfer, TransferOutcome::Done);
        Ok(transfer.into_payload())
    }

    /// Phase two: import a transfer into this cell.
    ///
    /// A transfer is imported at most once; see [`Self::import_payload`] for repeatable
    /// clipboard pastes.
    pub fn import(
        &mut self,
        transfer: &mut Transfer,
        target: ImportTarget,
    ) -> Result<ImportKind, TransferError> {
        if transfer.imported {
            return Err(TransferError::AlreadyImported);
        }
        let action = match target {
            ImportTarget::Paste => transfer.action,
            ImportTarget::Drop { action, .. } => action,
        };
        let (kind, cleared) = self.import_formats(&transfer.payload, target, action)?;
        transfer.imported = true;
        transfer.action = action;
        transfer.cleared |= cleared;
        Ok(kind)
    }

    /// Import a clipboard payload. Structured payloads are never moves, so the source is not
    /// touched.
    pub fn import_payload(
        &mut self,
        payload: &TransferPayload,
        target: ImportTarget,
    ) -> Result<ImportKind, TransferError> {
        self.import_formats(payload, target, TransferAction::Copy)
            .map(|(kind, _)| kind)
    }

    /// Phase three: finish a transfer exported from this cell.
    ///
    /// A completed move clears the original selection unless the import already did.
    /// Returns whether the source selection is now cleared; `false` if the clear was refused.
    pub fn complete_transfer(&mut self, transfer: &mut Transfer, outcome: TransferOutcome) -> bool {
        if transfer.action == TransferAction::Move
            && outcome == TransferOutcome::Done
            && !transfer.cleared
        {
            match self.clear_source(transfer.payload.selection()) {
                Ok(true) => transfer.cleared = true,
                Ok(false) => tracing::debug!("moved selection does not belong to this cell"),
                Err(err) => tracing::warn!(error = %err, "could not clear moved selection"),
            }
        }
        let cleared = transfer.cleared;
        tracing::debug!(?outcome, cleared, "transfer completed");
        self.notify(CellEvent::TransferCompleted { cleared });
        cleared
    }

    /// Clear a moved selection from this cell. `Ok(false)` if the selection is not ours.
    fn clear_source(
        &mut self,
        selection: Option<&SegmentVariantSelection>,
    ) -> Result<bool, EditError> {
        let Some(selection) = selection.filter(|s| self.row == Some(s.row())) else {
            return Ok(false);
        };
        let Some(variant) = self.variant.as_mut() else {
            return Ok(false);
        };
        variant.clear_selection(selection.selection_start(), selection.selection_end())?;
        self.sync_model_to_view();
        Ok(true)
    }

    fn import_formats(
        &mut self,
        payload: &TransferPayload,
        target: ImportTarget,
        action: TransferAction,
    ) -> Result<(ImportKind, bool), TransferError> {
        if let Some(selection) = payload.selection() {
            if self.row == Some(selection.row()) {
                return self.import_selection(selection, target, action);
            }
            tracing::debug!(
                from = selection.row(),
                to = ?self.row,
                "cross-row transfer degraded to plain text"
            );
        }
        match payload.text() {
            Some(text) => self
                .import_string(text, target)
                .map(|kind| (kind, false)),
            None => {
                tracing::debug!("transfer refused: no supported format");
                Err(TransferError::UnsupportedFormat)
            }
        }
    }

    fn import_selection(
        &mut self,
        selection: &SegmentVariantSelection,
        target: ImportTarget,
        action: TransferAction,
    ) -> Result<(ImportKind, bool), TransferError> {
        let range = match target {
            ImportTarget::Paste => self.selection(),
            ImportTarget::Drop { offset, .. } => offset..offset,
        };
        let variant = self.variant.as_mut().ok_or(TransferError::Unbound)?;

        if variant.contains_tag(range.start, range.len()) {
            return Err(TransferError::DestinationSplitsTag {
                start: range.start,
                end: range.end,
            });
        }

        let is_move = action == TransferAction::Move;
        let (src_start, src_end) = (selection.selection_start(), selection.selection_end());
        let overlaps_source = if range.is_empty() {
            src_start < range.start && range.start < src_end
        } else {
            range.start < src_end && src_start < range.end
        };
        if is_move && overlaps_source {
            return Err(TransferError::DropInsideSource);
        }

        let atoms = selection.atoms();
        let inserted: usize = atoms.iter().map(|a| a.display_len(self.mode)).sum();
        let clear_first = is_move && range.end <= src_start;

        let mut scratch = variant.create_copy();
        if clear_first {
            scratch.clear_selection(src_start, src_end)?;
        }
        scratch.replace_selection(range.start, range.end, atoms)?;
        *variant = scratch;

        tracing::debug!(
            row = ?self.row,
            start = range.start,
            end = range.end,
            clear_first,
            "structured selection imported"
        );
        self.sync_model_to_view();
        self.set_caret(range.start + inserted);
        Ok((ImportKind::Structured, clear_first))
    }

    fn import_string(
        &mut self,
        text: &str,
        target: ImportTarget,
    ) -> Result<ImportKind, TransferError> {
        if self.variant.is_none() {
            return Err(TransferError::Unbound);
        }
        let outcome = match target {
            ImportTarget::Paste => self.type_text(text),
            ImportTarget::Drop { offset, .. } => self.insert(offset, text),
        };
        match outcome {
            crate::EditOutcome::Rejected(err) => Err(err.into()),
            _ => Ok(ImportKind::PlainText),
        }
    }
}
