//! Tag-state validation.
//!
//! After editing, a variant is compared with its pre-edit snapshot to decide whether the
//! user may leave the cell. What counts as "consistent" is a [`ValidationPolicy`].

use crate::atom::CodeAtom;
use crate::variant::SegmentVariant;
use serde::{Deserialize, Serialize};

/// Equality policy for code atoms between an edited variant and its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Same tags with the same multiplicity, in any order.
    #[default]
    Multiset,
    /// Same tags in the same order.
    Sequence,
    /// Same number of tags.
    Count,
    /// Every reference tag still present; extra tags are allowed.
    Presence,
}

impl ValidationPolicy {
    /// Returns `true` if `current` is consistent with `reference` under this policy.
    pub fn is_consistent(self, current: &SegmentVariant, reference: &SegmentVariant) -> bool {
        match self {
            Self::Multiset => ValidationReport::compare(current, reference).is_clean(),
            Self::Sequence => current.code_atoms().eq(reference.code_atoms()),
            Self::Count => current.code_atoms().count() == reference.code_atoms().count(),
            Self::Presence => ValidationReport::compare(current, reference)
                .missing
                .is_empty(),
        }
    }
}

/// Multiset difference between the tags of an edited variant and its reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Reference tags with no counterpart in the current variant, in reference order.
    pub missing: Vec<CodeAtom>,
    /// Current tags with no counterpart in the reference, in current order.
    pub unexpected: Vec<CodeAtom>,
}

impl ValidationReport {
    /// Compare the code atoms of `current` against `reference`.
    pub fn compare(current: &SegmentVariant, reference: &SegmentVariant) -> Self {
        let mut unmatched: Vec<Option<&CodeAtom>> = current.code_atoms().map(Some).collect();
        let mut missing = Vec::new();

        for wanted in reference.code_atoms() {
            match unmatched
                .iter_mut()
                .find(|slot| slot.is_some_and(|have| have == wanted))
            {
                Some(slot) => *slot = None,
                None => missing.push(wanted.clone()),
            }
        }

        let unexpected = unmatched.into_iter().flatten().cloned().collect();
        Self {
            missing,
            unexpected,
        }
    }

    /// Returns `true` if nothing is missing and nothing is unexpected.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentAtom;

    fn tag(n: u32) -> SegmentAtom {
        SegmentAtom::code(format!("{{{n}}}"), format!("<x{n}/>"), format!("placeholder {n}"))
    }

    fn variant(atoms: Vec<SegmentAtom>) -> SegmentVariant {
        SegmentVariant::new(atoms)
    }

    #[test]
    fn test_reordered_tags_pass_multiset_fail_sequence() {
        let reference = variant(vec![tag(1), SegmentAtom::text("a"), tag(2)]);
        let current = variant(vec![tag(2), SegmentAtom::text("a"), tag(1)]);

        assert!(ValidationPolicy::Multiset.is_consistent(&current, &reference));
        assert!(!ValidationPolicy::Sequence.is_consistent(&current, &reference));
        assert!(ValidationPolicy::Count.is_consistent(&current, &reference));
    }

    #[test]
    fn test_duplicate_tag_is_unexpected() {
        let reference = variant(vec![tag(1)]);
        let current = variant(vec![tag(1), tag(1)]);

        let report = ValidationReport::compare(&current, &reference);
        assert!(report.missing.is_empty());
        assert_eq!(report.unexpected.len(), 1);
        assert!(!ValidationPolicy::Multiset.is_consistent(&current, &reference));
        assert!(ValidationPolicy::Presence.is_consistent(&current, &reference));
    }

    #[test]
    fn test_missing_in_reference_order() {
        let reference = variant(vec![tag(3), tag(1), tag(2)]);
        let current = variant(vec![tag(1)]);

        let report = ValidationReport::compare(&current, &reference);
        let glyphs: Vec<_> = report.missing.iter().map(|c| c.glyph.as_str()).collect();
        assert_eq!(glyphs, vec!["{3}", "{2}"]);
    }

    #[test]
    fn test_count_policy_ignores_identity() {
        let reference = variant(vec![tag(1)]);
        let current = variant(vec![tag(9)]);
        assert!(ValidationPolicy::Count.is_consistent(&current, &reference));
        assert!(!ValidationPolicy::Presence.is_consistent(&current, &reference));
    }
}
