//! Context-menu commands for restoring tags the user deleted.

use crate::cell::{EditOutcome, SegmentCell};
use segment_core::{CodeAtom, SegmentAtom};

/// A host-visible command a cell can execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellCommand {
    /// Insert `tags` at display offset `at`, in order.
    RestoreTags {
        /// Insertion point.
        at: usize,
        /// Tags to reinsert.
        tags: Vec<CodeAtom>,
    },
}

/// One entry of a context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Label shown to the user.
    pub label: String,
    /// Command run when the entry is chosen.
    pub command: CellCommand,
    /// Whether the entry can be chosen.
    pub enabled: bool,
}

impl SegmentCell {
    /// Build the context menu for a right-click at `insertion_point`.
    ///
    /// Each missing tag gets its own entry. "Restore All Missing Tags" is offered when the
    /// number of missing tags is not exactly one, and is disabled when none are missing.
    pub fn context_menu(&self, insertion_point: usize) -> Vec<MenuItem> {
        let missing = self.validation_report().missing;
        let mut items: Vec<MenuItem> = missing
            .iter()
            .map(|tag| MenuItem {
                label: format!("Restore Missing Tag: {}", tag.data),
                command: CellCommand::RestoreTags {
                    at: insertion_point,
                    tags: vec![tag.clone()],
                },
                enabled: true,
            })
            .collect();

        if missing.len() != 1 {
            items.push(MenuItem {
                label: "Restore All Missing Tags".to_string(),
                enabled: !missing.is_empty(),
                command: CellCommand::RestoreTags {
                    at: insertion_point,
                    tags: missing,
                },
            });
        }
        items
    }

    /// Run a command produced by [`Self::context_menu`].
    pub fn execute(&mut self, command: &CellCommand) -> EditOutcome {
        match command {
            CellCommand::RestoreTags { at, tags } => {
                if tags.is_empty() {
                    return EditOutcome::Unchanged;
                }
                let Some(variant) = self.variant.as_mut() else {
                    return EditOutcome::Unchanged;
                };
                let inserted = tags.iter().map(|t| t.display_len(self.mode)).sum();
                let result = variant
                    .replace_selection(*at, *at, tags.iter().cloned().map(SegmentAtom::from));
                self.finish_edit(result, *at..*at, inserted)
            }
        }
    }
}
