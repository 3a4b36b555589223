#![warn(missing_docs)]
//! Segment Core - headless model for tag-aware translation segment editing
//!
//! # Overview
//!
//! `segment-core` models one side (source or target) of a bilingual translation segment as an
//! ordered sequence of **atoms**: plain text runs and indivisible inline tags ("code atoms")
//! that stand in for markup from the source document. It does not render anything; a host view
//! draws the [`StyledRun`] list produced by [`render`].
//!
//! # Core Guarantees
//!
//! - **Tag integrity**: a code atom is present whole or removed whole. Any mutation whose range
//!   starts or ends strictly inside a tag fails with [`EditError`].
//! - **All-or-nothing edits**: a rejected mutation leaves the atom sequence untouched.
//! - **Derived projection**: styled runs are computed on demand from the atoms; they are never
//!   the source of truth.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Validation (ValidationPolicy / Report)     │  ← "may the user leave this cell?"
//! ├─────────────────────────────────────────────┤
//! │  Projection (render / StyleSheet / search)  │  ← Rendering data
//! ├─────────────────────────────────────────────┤
//! │  SegmentVariant (offsets, tag-safe edits)   │  ← Editing model
//! ├─────────────────────────────────────────────┤
//! │  SegmentAtom / CodeAtom                     │  ← Content units
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use segment_core::{SegmentAtom, SegmentVariant, StyleName};
//!
//! let mut target = SegmentVariant::new(vec![
//!     SegmentAtom::text("Hello "),
//!     SegmentAtom::code("{1}", "<b>", "bold start"),
//!     SegmentAtom::text(" world"),
//! ]);
//! let snapshot = target.create_copy();
//!
//! // Deleting the whole tag is allowed; deleting part of it is not.
//! assert!(target.modify_chars(7, 1, None).is_err());
//! target.clear_selection(6, 9).unwrap();
//!
//! assert_eq!(target.missing_tags(&snapshot).len(), 1);
//! assert!(!target.validate_against(&snapshot));
//!
//! let runs = target.style_data(false);
//! assert!(runs.iter().all(|r| r.style == StyleName::Regular));
//! ```
//!
//! # Module Description
//!
//! - [`atom`] - text and code atoms, display modes
//! - [`variant`] - the editable atom sequence and its offset queries
//! - [`render`] - styled run projection
//! - [`style`] - immutable style configuration
//! - [`validation`] - tag-state equality policies
//! - [`search`] - tag-safe search over a variant

pub mod atom;
mod error;
pub mod render;
pub mod search;
pub mod style;
pub mod validation;
pub mod variant;

pub use atom::{CodeAtom, DisplayMode, SegmentAtom};
pub use error::{ConfigError, EditError};
pub use render::{RenderOptions, StyledRun, display_width, render, runs_text};
pub use search::{SearchError, SearchMatch, SearchOptions};
pub use style::{Color, StyleDirective, StyleName, StyleSheet};
pub use validation::{ValidationPolicy, ValidationReport};
pub use variant::{AtomSpan, SegmentVariant};
