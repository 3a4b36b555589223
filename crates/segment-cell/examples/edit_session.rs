//! A scripted editing session against one segment, with tracing output.
//!
//! Run with `RUST_LOG=segment_cell=debug,segment_core=trace` to see every decision.

use segment_cell::transfer::{ImportTarget, TransferAction, TransferOutcome};
use segment_cell::{CellConfig, CellEvent, SegmentCell};
use segment_core::{SegmentAtom, SegmentVariant};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const STYLES: &str = r##"
styles:
  tag:
    foreground: "#3050c0"
    background: light_gray
validation: multiset
"##;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Arc::new(CellConfig::from_yaml_str(STYLES)?);
    let target = SegmentVariant::new(vec![
        SegmentAtom::text("Click "),
        SegmentAtom::code("{1}", "<a href=\"#\">", "link start"),
        SegmentAtom::text("here"),
        SegmentAtom::code("{2}", "</a>", "link end"),
        SegmentAtom::text(" to continue."),
    ]);

    let mut cell = SegmentCell::with_variant(config, 0, target, false, false);
    cell.subscribe(|event| {
        if let CellEvent::SelectionExpanded { from, to } = event {
            println!("selection widened {from:?} -> {to:?}");
        }
    });

    println!("start:    {}", cell.text());

    cell.insert(7, "x");
    println!("typed in tag (ignored): {}", cell.text());

    cell.set_selection(2, 8);
    cell.type_text("");
    cell.remove(0, 2);
    println!("after delete: {}", cell.text());
    println!("may leave cell: {}", cell.can_stop_editing());

    for item in cell.context_menu(0) {
        println!("menu: {} (enabled: {})", item.label, item.enabled);
    }
    if let Some(item) = cell.context_menu(0).into_iter().next() {
        cell.execute(&item.command);
    }
    println!("restored: {}", cell.text());

    let len = cell.view().len();
    cell.set_selection(0, 3);
    let mut transfer = cell.begin_transfer(TransferAction::Move)?;
    cell.import(
        &mut transfer,
        ImportTarget::Drop {
            offset: len,
            action: TransferAction::Move,
        },
    )?;
    cell.complete_transfer(&mut transfer, TransferOutcome::Done);
    println!("after move: {}", cell.text());
    println!("may leave cell: {}", cell.can_stop_editing());

    Ok(())
}
