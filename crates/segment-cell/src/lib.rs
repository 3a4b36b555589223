#![warn(missing_docs)]
//! Segment Cell - tag-aware editable text cell controller
//!
//! # Overview
//!
//! `segment-cell` sits between a host rich-text widget and a
//! [`segment_core::SegmentVariant`]. The widget proposes every raw edit, selection change and
//! clipboard/drag transfer to a [`SegmentCell`]; the cell resolves it against the variant's tag
//! boundaries, mutates the model, and regenerates the [`CellView`] the widget draws.
//!
//! # Edit Interception
//!
//! | Proposed edit                     | Behavior                                              |
//! |-----------------------------------|-------------------------------------------------------|
//! | delete over part of a tag         | widened to whole atoms, the whole tag is deleted      |
//! | replace over part of a tag        | widened to whole atoms, then replaced                 |
//! | insert strictly inside a tag      | silently refused                                      |
//! | delete right after IME text change| applied to the view only, once                        |
//!
//! # Transfers
//!
//! Copy, cut and drag carry a [`SegmentVariantSelection`] so tags survive within a row;
//! across rows only the plain text is imported. See [`transfer`] for the two-phase protocol.
//!
//! # Threading
//!
//! Cells are plain owned values with no interior mutability. A cell, and the variant it holds,
//! is mutated by one thread at a time; hosts with background workers hand results back to the
//! thread that owns the cell.

mod cell;
mod config;
mod menu;
pub mod transfer;
mod view;

pub use cell::{CellEvent, CellEventCallback, EditOutcome, SegmentCell};
pub use config::CellConfig;
pub use menu::{CellCommand, MenuItem};
pub use transfer::{
    ImportKind, ImportTarget, SegmentVariantSelection, Transfer, TransferAction, TransferError,
    TransferOutcome, TransferPayload,
};
pub use view::{CellSelection, CellView};
