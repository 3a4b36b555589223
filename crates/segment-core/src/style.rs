//! Style configuration.
//!
//! A [`StyleSheet`] is an immutable value mapping every [`StyleName`] to a resolved
//! [`StyleDirective`]. Cells receive one at construction; nothing here is global.
//!
//! Style sheets can be loaded from YAML. Each entry may name a `parent` whose attributes it
//! inherits and then overrides:
//!
//! ```yaml
//! tag:
//!   parent: regular
//!   background: "#d3d3d3"
//! insert:
//!   parent: tag
//!   foreground: blue
//!   underline: true
//! ```
//!
//! Styles omitted from the YAML keep their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Names of the styles a cell renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleName {
    /// Plain segment text.
    Regular,
    /// Inline tags.
    Tag,
    /// Inserted text in a target diff.
    Insert,
    /// Deleted text in a target diff.
    Delete,
    /// Search match.
    Highlight,
    /// The currently focused search match.
    CurrentHighlight,
    /// Text enriched with linked metadata.
    Enriched,
}

impl StyleName {
    /// All style names, in declaration order.
    pub const ALL: [StyleName; 7] = [
        Self::Regular,
        Self::Tag,
        Self::Insert,
        Self::Delete,
        Self::Highlight,
        Self::CurrentHighlight,
        Self::Enriched,
    ];
}

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a colour from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#c0c0c0`
    pub const LIGHT_GRAY: Self = Self::rgb(0xc0, 0xc0, 0xc0);
    /// `#0000ff`
    pub const BLUE: Self = Self::rgb(0, 0, 0xff);
    /// `#ff0000`
    pub const RED: Self = Self::rgb(0xff, 0, 0);
    /// `#ffff00`
    pub const YELLOW: Self = Self::rgb(0xff, 0xff, 0);
    /// `#00ff00`
    pub const GREEN: Self = Self::rgb(0, 0xff, 0);
    /// `#ffc800`
    pub const ORANGE: Self = Self::rgb(0xff, 0xc8, 0);
    /// `#000000`
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// `#ffffff`
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(Self::rgb(r, g, b));
                }
            }
            return Err(ConfigError::UnknownColor(s.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "light_gray" | "lightgray" | "light-gray" => Ok(Self::LIGHT_GRAY),
            "blue" => Ok(Self::BLUE),
            "red" => Ok(Self::RED),
            "yellow" => Ok(Self::YELLOW),
            "green" => Ok(Self::GREEN),
            "orange" => Ok(Self::ORANGE),
            "black" => Ok(Self::BLACK),
            "white" => Ok(Self::WHITE),
            _ => Err(ConfigError::UnknownColor(s.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fully resolved rendering attributes for one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StyleDirective {
    /// Text colour, or `None` for the host default.
    pub foreground: Option<Color>,
    /// Background colour, or `None` for the host default.
    pub background: Option<Color>,
    /// Underline the run.
    pub underline: bool,
    /// Strike through the run.
    pub strike_through: bool,
}

/// One style entry as written in configuration; unset fields inherit from `parent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleRule {
    #[serde(default)]
    parent: Option<StyleName>,
    #[serde(default)]
    foreground: Option<Color>,
    #[serde(default)]
    background: Option<Color>,
    #[serde(default)]
    underline: Option<bool>,
    #[serde(default)]
    strike_through: Option<bool>,
}

impl StyleRule {
    fn child_of(parent: StyleName) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }
}

fn default_rules() -> BTreeMap<StyleName, StyleRule> {
    use StyleName::*;
    let mut rules = BTreeMap::new();
    rules.insert(Regular, StyleRule::default());
    rules.insert(
        Tag,
        StyleRule {
            background: Some(Color::LIGHT_GRAY),
            ..StyleRule::child_of(Regular)
        },
    );
    rules.insert(
        Insert,
        StyleRule {
            foreground: Some(Color::BLUE),
            underline: Some(true),
            ..StyleRule::child_of(Tag)
        },
    );
    rules.insert(
        Delete,
        StyleRule {
            foreground: Some(Color::RED),
            strike_through: Some(true),
            underline: Some(false),
            ..StyleRule::child_of(Insert)
        },
    );
    rules.insert(
        Highlight,
        StyleRule {
            background: Some(Color::YELLOW),
            ..StyleRule::child_of(Regular)
        },
    );
    rules.insert(
        CurrentHighlight,
        StyleRule {
            background: Some(Color::GREEN),
            ..StyleRule::child_of(Regular)
        },
    );
    rules.insert(
        Enriched,
        StyleRule {
            foreground: Some(Color::BLUE),
            underline: Some(true),
            ..StyleRule::child_of(Regular)
        },
    );
    rules
}

/// Immutable mapping from [`StyleName`] to [`StyleDirective`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSheet {
    directives: BTreeMap<StyleName, StyleDirective>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        // The built-in rules are acyclic.
        Self::resolve(&default_rules()).unwrap_or_else(|_| Self {
            directives: BTreeMap::new(),
        })
    }
}

impl StyleSheet {
    /// Load a style sheet from YAML, layering the entries over the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let overrides: BTreeMap<StyleName, StyleRule> = serde_yaml::from_str(yaml)?;
        Self::with_overrides(overrides)
    }

    fn with_overrides(overrides: BTreeMap<StyleName, StyleRule>) -> Result<Self, ConfigError> {
        let mut rules = default_rules();
        rules.extend(overrides);
        Self::resolve(&rules)
    }

    fn resolve(rules: &BTreeMap<StyleName, StyleRule>) -> Result<Self, ConfigError> {
        let mut directives = BTreeMap::new();
        for name in StyleName::ALL {
            let directive = resolve_one(rules, name, &mut Vec::new())?;
            directives.insert(name, directive);
        }
        Ok(Self { directives })
    }

    /// The directive for `name`.
    pub fn get(&self, name: StyleName) -> StyleDirective {
        self.directives.get(&name).copied().unwrap_or_default()
    }

    /// Iterate over all resolved styles.
    pub fn iter(&self) -> impl Iterator<Item = (StyleName, StyleDirective)> + '_ {
        self.directives.iter().map(|(name, d)| (*name, *d))
    }
}

fn resolve_one(
    rules: &BTreeMap<StyleName, StyleRule>,
    name: StyleName,
    visiting: &mut Vec<StyleName>,
) -> Result<StyleDirective, ConfigError> {
    if visiting.contains(&name) {
        return Err(ConfigError::InheritanceCycle(format!("{name:?}")));
    }
    visiting.push(name);

    let rule = rules.get(&name).cloned().unwrap_or_default();
    let mut directive = match rule.parent {
        Some(parent) => resolve_one(rules, parent, visiting)?,
        None => StyleDirective::default(),
    };
    if rule.foreground.is_some() {
        directive.foreground = rule.foreground;
    }
    if rule.background.is_some() {
        directive.background = rule.background;
    }
    if let Some(underline) = rule.underline {
        directive.underline = underline;
    }
    if let Some(strike_through) = rule.strike_through {
        directive.strike_through = strike_through;
    }

    visiting.pop();
    Ok(directive)
}

impl<'de> Deserialize<'de> for StyleSheet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = BTreeMap::<StyleName, StyleRule>::deserialize(deserializer)?;
        Self::with_overrides(overrides).map_err(serde::de::Error::custom)
    }
}
