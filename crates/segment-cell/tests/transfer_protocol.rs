use pretty_assertions::assert_eq;
use segment_cell::transfer::{
    ImportKind, ImportTarget, SegmentVariantSelection, TransferAction, TransferError,
    TransferOutcome, TransferPayload,
};
use segment_cell::{CellConfig, CellEvent, SegmentCell};
use segment_core::{SegmentAtom, SegmentVariant};
use std::sync::{Arc, Mutex};

fn hello_tag_world() -> SegmentVariant {
    SegmentVariant::new(vec![
        SegmentAtom::text("Hello "),
        SegmentAtom::code("{1}", "<b>", "bold start"),
        SegmentAtom::text(" world"),
    ])
}

fn cell_in_row(row: usize, variant: SegmentVariant) -> SegmentCell {
    SegmentCell::with_variant(Arc::new(CellConfig::default()), row, variant, false, false)
}

fn model_text(cell: &SegmentCell) -> String {
    cell.variant().map(SegmentVariant::display_text).unwrap_or_default()
}

fn drop_at(offset: usize, action: TransferAction) -> ImportTarget {
    ImportTarget::Drop { offset, action }
}

#[test]
fn test_copy_drop_then_move_drop_after_source() {
    let mut cell = cell_in_row(2, hello_tag_world());

    cell.set_selection(0, 6);
    let mut copy = cell.begin_transfer(TransferAction::Copy).unwrap();
    let kind = cell.import(&mut copy, drop_at(9, TransferAction::Copy)).unwrap();
    assert_eq!(kind, ImportKind::Structured);
    assert!(!cell.complete_transfer(&mut copy, TransferOutcome::Done));
    assert_eq!(model_text(&cell), "Hello {1}Hello  world");

    // Same drop as a move: the source is cleared once the transfer completes.
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(0, 6);
    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();
    cell.import(&mut moved, drop_at(9, TransferAction::Move)).unwrap();
    assert_eq!(model_text(&cell), "Hello {1}Hello  world");
    assert!(!moved.is_cleared());

    assert!(cell.complete_transfer(&mut moved, TransferOutcome::Done));
    assert_eq!(model_text(&cell), "{1}Hello  world");
    assert_eq!(cell.text(), model_text(&cell));
}

#[test]
fn test_move_before_source_clears_exactly_once() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(10, 15);
    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();

    cell.import(&mut moved, drop_at(0, TransferAction::Move)).unwrap();
    assert!(moved.is_cleared());
    assert_eq!(model_text(&cell), "worldHello {1} ");

    assert!(cell.complete_transfer(&mut moved, TransferOutcome::Done));
    assert_eq!(model_text(&cell), "worldHello {1} ");
    assert_eq!(cell.selection(), 5..5);
}

#[test]
fn test_moving_a_tag_keeps_it_whole() {
    let mut cell = cell_in_row(0, hello_tag_world());
    cell.set_selection(6, 9);
    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();
    cell.import(&mut moved, drop_at(15, TransferAction::Move)).unwrap();
    cell.complete_transfer(&mut moved, TransferOutcome::Done);

    assert_eq!(
        cell.variant().unwrap().atoms(),
        &[
            SegmentAtom::text("Hello "),
            SegmentAtom::text(" world"),
            SegmentAtom::code("{1}", "<b>", "bold start"),
        ]
    );
    assert!(cell.can_stop_editing());
}

#[test]
fn test_aborted_move_leaves_source() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(0, 6);
    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();

    assert!(!cell.complete_transfer(&mut moved, TransferOutcome::Aborted));
    assert_eq!(model_text(&cell), "Hello {1} world");
}

#[test]
fn test_completion_event_reports_cleared_flag() {
    let mut cell = cell_in_row(2, hello_tag_world());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    cell.subscribe(move |e| {
        if let CellEvent::TransferCompleted { cleared } = e {
            sink.lock().unwrap().push(*cleared);
        }
    });

    cell.set_selection(0, 6);
    let mut copy = cell.begin_transfer(TransferAction::Copy).unwrap();
    cell.complete_transfer(&mut copy, TransferOutcome::Done);
    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();
    cell.complete_transfer(&mut moved, TransferOutcome::Done);

    assert_eq!(seen.lock().unwrap().as_slice(), &[false, true]);
}

#[test]
fn test_transfer_imported_at_most_once() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(0, 5);
    let mut copy = cell.begin_transfer(TransferAction::Copy).unwrap();

    cell.import(&mut copy, drop_at(15, TransferAction::Copy)).unwrap();
    let err = cell
        .import(&mut copy, drop_at(0, TransferAction::Copy))
        .unwrap_err();
    assert!(matches!(err, TransferError::AlreadyImported));
    assert_eq!(model_text(&cell), "Hello {1} worldHello");
}

#[test]
fn test_drop_inside_tag_or_source_is_refused() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(0, 6);

    let mut copy = cell.begin_transfer(TransferAction::Copy).unwrap();
    let err = cell
        .import(&mut copy, drop_at(7, TransferAction::Copy))
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::DestinationSplitsTag { start: 7, end: 7 }
    ));
    assert!(!copy.is_imported());

    let mut moved = cell.begin_transfer(TransferAction::Move).unwrap();
    let err = cell
        .import(&mut moved, drop_at(3, TransferAction::Move))
        .unwrap_err();
    assert!(matches!(err, TransferError::DropInsideSource));
    assert_eq!(model_text(&cell), "Hello {1} world");
}

#[test]
fn test_cross_row_import_degrades_to_plain_text() {
    let mut source = cell_in_row(2, hello_tag_world());
    source.set_selection(0, 9);
    let payload = source.copy().unwrap();
    assert_eq!(payload.text(), Some("Hello {1}"));

    let mut dest = cell_in_row(5, SegmentVariant::from_text("Bonjour"));
    dest.set_caret(7);
    let kind = dest.import_payload(&payload, ImportTarget::Paste).unwrap();
    assert_eq!(kind, ImportKind::PlainText);
    assert_eq!(model_text(&dest), "BonjourHello {1}");
    assert_eq!(dest.variant().unwrap().code_atoms().count(), 0);
}

#[test]
fn test_paste_replaces_destination_selection() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(6, 9);
    let payload = cell.copy().unwrap();

    cell.set_selection(10, 15);
    let kind = cell.import_payload(&payload, ImportTarget::Paste).unwrap();
    assert_eq!(kind, ImportKind::Structured);
    assert_eq!(model_text(&cell), "Hello {1} {1}");
    assert_eq!(cell.variant().unwrap().code_atoms().count(), 2);

    // Pasting the same clipboard payload again is allowed.
    cell.set_caret(0);
    cell.import_payload(&payload, ImportTarget::Paste).unwrap();
    assert_eq!(cell.variant().unwrap().code_atoms().count(), 3);
}

#[test]
fn test_cut_then_paste_elsewhere() {
    let mut source = cell_in_row(2, hello_tag_world());
    source.set_selection(5, 10);
    let payload = source.cut().unwrap();
    assert_eq!(model_text(&source), "Helloworld");
    assert!(!source.can_stop_editing());

    let mut dest = cell_in_row(2, SegmentVariant::from_text("abc"));
    dest.set_caret(3);
    dest.import_payload(&payload, ImportTarget::Paste).unwrap();
    assert_eq!(model_text(&dest), "abc {1} ");
}

#[test]
fn test_plain_text_and_unsupported_payloads() {
    let mut cell = cell_in_row(1, hello_tag_world());
    cell.set_caret(6);

    let kind = cell
        .import_payload(&TransferPayload::plain_text("big "), ImportTarget::Paste)
        .unwrap();
    assert_eq!(kind, ImportKind::PlainText);
    assert_eq!(model_text(&cell), "Hello big {1} world");

    let err = cell
        .import_payload(&TransferPayload::empty(), ImportTarget::Paste)
        .unwrap_err();
    assert!(matches!(err, TransferError::UnsupportedFormat));

    let unbound = SegmentCell::new(Arc::new(CellConfig::default()));
    assert!(matches!(
        unbound.begin_transfer(TransferAction::Copy),
        Err(TransferError::Unbound)
    ));
}

#[test]
fn test_selection_json_round_trip() {
    let selection = SegmentVariantSelection::new(4, hello_tag_world(), 9, 2);
    assert_eq!(selection.selection_start(), 2);
    assert_eq!(selection.display_text(), "llo {1}");
    assert_eq!(
        selection.to_string(),
        "Row 4 [2, 9] of \"Hello {1} world\""
    );

    let json = selection.to_json().unwrap();
    assert_eq!(SegmentVariantSelection::from_json(&json).unwrap(), selection);
    assert!(matches!(
        SegmentVariantSelection::from_json("{\"row\": 1}"),
        Err(TransferError::Malformed(_))
    ));
}

#[test]
fn test_move_dropped_as_copy_keeps_source() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(10, 15);
    let mut transfer = cell.begin_transfer(TransferAction::Move).unwrap();

    cell.import(&mut transfer, drop_at(0, TransferAction::Copy))
        .unwrap();
    assert_eq!(transfer.action(), TransferAction::Copy);
    assert!(!transfer.is_cleared());

    assert!(!cell.complete_transfer(&mut transfer, TransferOutcome::Done));
    assert_eq!(model_text(&cell), "worldHello {1} world");
    assert_eq!(cell.variant().unwrap().code_atoms().count(), 1);
}

#[test]
fn test_move_pasted_before_source_clears_first() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(10, 15);
    let mut transfer = cell.begin_transfer(TransferAction::Move).unwrap();

    cell.set_caret(0);
    cell.import(&mut transfer, ImportTarget::Paste).unwrap();
    assert_eq!(transfer.action(), TransferAction::Move);
    assert!(transfer.is_cleared());
    assert_eq!(model_text(&cell), "worldHello {1} ");

    assert!(cell.complete_transfer(&mut transfer, TransferOutcome::Done));
    assert_eq!(model_text(&cell), "worldHello {1} ");
    assert_eq!(cell.variant().unwrap().code_atoms().count(), 1);
}

#[test]
fn test_move_pasted_over_its_source_is_refused() {
    let mut cell = cell_in_row(2, hello_tag_world());
    cell.set_selection(10, 15);
    let mut transfer = cell.begin_transfer(TransferAction::Move).unwrap();

    cell.set_selection(12, 15);
    let err = cell.import(&mut transfer, ImportTarget::Paste).unwrap_err();
    assert!(matches!(err, TransferError::DropInsideSource));
    assert!(!transfer.is_imported());
    assert_eq!(model_text(&cell), "Hello {1} world");
}

#[test]
fn test_failed_source_clear_is_not_reported_as_cleared() {
    let mut cell = cell_in_row(2, hello_tag_world());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    cell.subscribe(move |e| {
        if let CellEvent::TransferCompleted { cleared } = e {
            sink.lock().unwrap().push(*cleared);
        }
    });

    cell.set_selection(0, 6);
    let mut transfer = cell.begin_transfer(TransferAction::Move).unwrap();
    // Shifts the tag to 5..8, so the recorded source 0..6 now ends inside it.
    cell.remove(0, 1);

    assert!(!cell.complete_transfer(&mut transfer, TransferOutcome::Done));
    assert!(!transfer.is_cleared());
    assert_eq!(model_text(&cell), "ello {1} world");
    assert_eq!(seen.lock().unwrap().as_slice(), &[false]);
}

#[test]
fn test_reversed_or_oversized_json_selection_is_refused() {
    let valid = SegmentVariantSelection::new(2, hello_tag_world(), 2, 6);
    let mut value: serde_json::Value = serde_json::from_str(&valid.to_json().unwrap()).unwrap();

    value["selection_start"] = 6.into();
    value["selection_end"] = 2.into();
    assert!(matches!(
        SegmentVariantSelection::from_json(&value.to_string()),
        Err(TransferError::Malformed(_))
    ));

    value["selection_start"] = 2.into();
    value["selection_end"] = 99.into();
    assert!(matches!(
        SegmentVariantSelection::from_json(&value.to_string()),
        Err(TransferError::Malformed(_))
    ));

    value["selection_end"] = 15.into();
    let decoded = SegmentVariantSelection::from_json(&value.to_string()).unwrap();
    assert_eq!(
        TransferPayload::from_selection(decoded).text(),
        Some("llo {1} world")
    );
}
