use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced when a mutation would corrupt an inline tag.
///
/// A rejected edit leaves the variant untouched.
pub enum EditError {
    #[error("range {offset}..{} would split an inline tag", offset + length)]
    /// The range begins or ends strictly inside a code atom.
    SplitsTag {
        /// Range start (display offset).
        offset: usize,
        /// Range length in display characters.
        length: usize,
    },

    #[error("cannot insert at {offset}: position is inside an inline tag")]
    /// The insertion point lies strictly inside a code atom.
    InsideTag {
        /// Insertion point (display offset).
        offset: usize,
    },

    #[error("range {offset}..{} is out of bounds (length {len})", offset + length)]
    /// The range runs past the end of the variant.
    OutOfBounds {
        /// Range start (display offset).
        offset: usize,
        /// Range length in display characters.
        length: usize,
        /// Display length of the variant.
        len: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading style or validation configuration.
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown colour '{0}'")]
    /// A colour was neither `#rrggbb` nor a known name.
    UnknownColor(String),

    #[error("style inheritance cycle involving '{0}'")]
    /// A style's `parent` chain loops back on itself.
    InheritanceCycle(String),
}
