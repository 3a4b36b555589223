//! Segment atoms.
//!
//! A segment side is an ordered list of atoms. Text atoms hold freely editable characters;
//! code atoms stand in for inline markup from the source document and are indivisible.

use serde::{Deserialize, Serialize};

/// How code atoms are projected into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Code atoms render as their short glyph (e.g. `{1}`).
    #[default]
    Glyph,
    /// Code atoms render as their full underlying markup (e.g. `<b>`).
    Raw,
}

impl DisplayMode {
    /// Select a mode from the host's "raw" flag.
    pub fn from_raw(raw: bool) -> Self {
        if raw { Self::Raw } else { Self::Glyph }
    }

    /// Returns `true` for [`DisplayMode::Raw`].
    pub fn is_raw(self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// An inline tag / placeholder.
///
/// Two code atoms are the same tag when all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeAtom {
    /// Short display glyph shown in the editor (e.g. `{1}`).
    pub glyph: String,
    /// Full underlying markup (e.g. `<b>`), shown in raw mode.
    pub data: String,
    /// Human readable description used for tooltips.
    pub verbose_data: String,
}

impl CodeAtom {
    /// Create a code atom.
    pub fn new(
        glyph: impl Into<String>,
        data: impl Into<String>,
        verbose_data: impl Into<String>,
    ) -> Self {
        Self {
            glyph: glyph.into(),
            data: data.into(),
            verbose_data: verbose_data.into(),
        }
    }

    /// Text shown for this atom in `mode`.
    pub fn display_text(&self, mode: DisplayMode) -> &str {
        match mode {
            DisplayMode::Glyph => &self.glyph,
            DisplayMode::Raw => &self.data,
        }
    }

    /// Number of display characters this atom occupies in `mode`.
    pub fn display_len(&self, mode: DisplayMode) -> usize {
        self.display_text(mode).chars().count()
    }
}

/// A unit of segment content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentAtom {
    /// A run of plain characters.
    Text {
        /// The characters of the run.
        text: String,
    },
    /// An indivisible inline tag.
    Code(CodeAtom),
}

impl SegmentAtom {
    /// Create a text atom.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a code atom.
    pub fn code(
        glyph: impl Into<String>,
        data: impl Into<String>,
        verbose_data: impl Into<String>,
    ) -> Self {
        Self::Code(CodeAtom::new(glyph, data, verbose_data))
    }

    /// Returns the inner code atom, if this is one.
    pub fn as_code(&self) -> Option<&CodeAtom> {
        match self {
            Self::Code(code) => Some(code),
            Self::Text { .. } => None,
        }
    }

    /// Returns `true` for code atoms.
    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code(_))
    }

    /// Text shown for this atom in `mode`.
    pub fn display_text(&self, mode: DisplayMode) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Code(code) => code.display_text(mode),
        }
    }

    /// Number of display characters this atom occupies in `mode`.
    pub fn display_len(&self, mode: DisplayMode) -> usize {
        self.display_text(mode).chars().count()
    }
}

impl From<CodeAtom> for SegmentAtom {
    fn from(code: CodeAtom) -> Self {
        Self::Code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_atom_display_modes() {
        let code = CodeAtom::new("{1}", "<b>", "bold start");
        assert_eq!(code.display_text(DisplayMode::Glyph), "{1}");
        assert_eq!(code.display_text(DisplayMode::Raw), "<b>");
        assert_eq!(SegmentAtom::from(code).display_len(DisplayMode::Raw), 3);
    }

    #[test]
    fn test_text_atom_counts_chars_not_bytes() {
        let atom = SegmentAtom::text("héllo👋");
        assert_eq!(atom.display_len(DisplayMode::Glyph), 6);
        assert!(!atom.is_code());
    }

    #[test]
    fn test_display_mode_from_raw() {
        assert_eq!(DisplayMode::from_raw(true), DisplayMode::Raw);
        assert!(!DisplayMode::from_raw(false).is_raw());
    }
}
