use pretty_assertions::assert_eq;
use segment_core::{CodeAtom, EditError, SegmentAtom, SegmentVariant, StyleName, StyledRun};

fn hello_tag_world() -> SegmentVariant {
    SegmentVariant::new(vec![
        SegmentAtom::text("Hello "),
        SegmentAtom::code("{1}", "<b>", "bold start"),
        SegmentAtom::text(" world"),
    ])
}

#[test]
fn test_expanded_delete_removes_whole_tag() {
    let mut v = hello_tag_world();

    // One character into the tag.
    assert!(v.contains_tag(6, 1));
    let start = v.find_selection_start(6);
    let end = v.find_selection_end(6 + 1);
    assert_eq!((start, end), (6, 9));

    v.clear_selection(start, end).unwrap();
    assert_eq!(
        v.atoms(),
        &[SegmentAtom::text("Hello "), SegmentAtom::text(" world")]
    );
    assert!(v.needs_validation());
}

#[test]
fn test_partial_tag_delete_is_rejected_without_mutation() {
    let mut v = hello_tag_world();
    let before = v.create_copy();

    assert_eq!(
        v.modify_chars(6, 1, None),
        Err(EditError::SplitsTag {
            offset: 6,
            length: 1
        })
    );
    assert_eq!(v, before);
    assert!(!v.needs_validation());
}

#[test]
fn test_insert_inside_tag_is_refused() {
    let mut v = hello_tag_world();
    assert!(!v.can_insert_at(7));
    assert!(v.can_insert_at(6));
    assert!(v.can_insert_at(9));
    assert!(v.modify_chars(7, 0, Some("x")).is_err());
    assert_eq!(v.display_text(), "Hello {1} world");
}

#[test]
fn test_replace_range_covering_tag() {
    let mut v = hello_tag_world();
    v.modify_chars(4, 7, Some("X")).unwrap();
    assert_eq!(v.display_text(), "HellXorld");
    assert_eq!(v.code_atoms().count(), 0);
    assert_eq!(v.atoms().len(), 1);
}

#[test]
fn test_copy_is_independent() {
    let original = hello_tag_world();
    let mut copy = original.create_copy();
    assert_eq!(copy.display_text(), original.display_text());

    copy.modify_chars(0, 5, Some("Goodbye")).unwrap();
    assert_eq!(original.display_text(), "Hello {1} world");
    assert_eq!(copy.display_text(), "Goodbye {1} world");
}

#[test]
fn test_restore_missing_tag_round_trip() {
    let snapshot = hello_tag_world();
    let mut v = snapshot.create_copy();
    v.clear_selection(6, 9).unwrap();

    let missing = v.missing_tags(&snapshot);
    assert_eq!(missing, vec![CodeAtom::new("{1}", "<b>", "bold start")]);
    assert!(!v.validate_against(&snapshot));

    v.replace_selection(12, 12, missing.into_iter().map(SegmentAtom::from))
        .unwrap();
    assert_eq!(v.display_text(), "Hello  world{1}");
    assert!(v.missing_tags(&snapshot).is_empty());
    assert!(v.validate_against(&snapshot));
}

#[test]
fn test_replace_selection_splits_text_atom() {
    let mut v = SegmentVariant::from_text("abcdef");
    v.replace_selection(
        2,
        4,
        vec![
            SegmentAtom::code("{2}", "<i>", "italic"),
            SegmentAtom::text("Z"),
        ],
    )
    .unwrap();
    assert_eq!(
        v.atoms(),
        &[
            SegmentAtom::text("ab"),
            SegmentAtom::code("{2}", "<i>", "italic"),
            SegmentAtom::text("Zef"),
        ]
    );
}

#[test]
fn test_atom_at_and_tooltip_source() {
    let v = hello_tag_world();
    for offset in 6..9 {
        let atom = v.atom_at(offset).and_then(SegmentAtom::as_code);
        assert_eq!(atom.map(|c| c.verbose_data.as_str()), Some("bold start"));
    }
    assert_eq!(v.atom_at(5), Some(&SegmentAtom::text("Hello ")));
    assert_eq!(v.atom_at(15), None);
}

#[test]
fn test_style_data_raw_toggle() {
    let v = hello_tag_world();
    assert_eq!(
        v.style_data(true),
        vec![
            StyledRun::new("Hello ", StyleName::Regular),
            StyledRun::new("<b>", StyleName::Tag),
            StyledRun::new(" world", StyleName::Regular),
        ]
    );
}

#[test]
fn test_serde_round_trip_preserves_atoms() {
    let v = hello_tag_world();
    let yaml = serde_yaml::to_string(&v).unwrap();
    let back: SegmentVariant = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, v);
}
