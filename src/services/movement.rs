//! Single-node move against the persisted store
//!
//! Relocates one subtree without a full draft save: the scope's forest is
//! reconstructed, the subtree re-attached at the requested position, codes
//! re-derived, and only rows whose structural fields actually changed are
//! written, all inside one transaction.

use rusqlite::Transaction;
use tracing::info;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{ItemId, NodeId};
use crate::storage::{items, lookups, Store};
use crate::tree::{assign_codes, find_tree_mut, remove_subtree};

/// Outcome of a successful move
#[derive(Debug)]
pub struct MoveSummary {
    /// Rows whose (code, level, ordinal, parent) changed
    pub changed: usize,
}

impl MoveSummary {
    /// One-line human-readable outcome
    pub fn message(&self) -> String {
        format!("Moved item: {} rows rewritten", self.changed)
    }
}

/// Service persisting single-node moves
pub struct MoveService<'a> {
    store: &'a mut Store,
}

impl<'a> MoveService<'a> {
    /// Create a new move service
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Move `item_id` (with its subtree) under `new_parent` at `new_index`
    ///
    /// `new_parent` of `None` re-roots the subtree. The index is clamped to
    /// the target sibling count. Unchanged rows are never written.
    pub fn move_node(
        &mut self,
        item_id: ItemId,
        new_parent: Option<ItemId>,
        new_index: usize,
    ) -> BudgetResult<MoveSummary> {
        let tx = self.store.connection_mut().transaction()?;
        let summary = move_node_in_tx(&tx, item_id, new_parent, new_index)?;
        tx.commit()
            .map_err(|e| BudgetError::Transaction(format!("commit failed: {e}")))?;

        info!(%item_id, changed = summary.changed, "budget item moved");
        Ok(summary)
    }
}

fn move_node_in_tx(
    tx: &Transaction<'_>,
    item_id: ItemId,
    new_parent: Option<ItemId>,
    new_index: usize,
) -> BudgetResult<MoveSummary> {
    let row = items::get(tx, item_id)?
        .ok_or_else(|| BudgetError::item_not_found(item_id.to_string()))?;
    let scope = row.scope;
    let category = lookups::category_ref(tx, scope.category_id)?.ok_or_else(|| {
        BudgetError::Validation(format!("unknown category {}", scope.category_id))
    })?;

    let rows = items::items_in_scope(tx, scope)?;
    let before = items::structural_snapshot(&rows);
    let mut forest = items::build_forest(rows)?;

    let subtree = remove_subtree(&mut forest, NodeId::Persisted(item_id))
        .ok_or_else(|| BudgetError::item_not_found(item_id.to_string()))?;

    match new_parent {
        Some(parent_id) => {
            if subtree.contains(NodeId::Persisted(parent_id)) {
                return Err(BudgetError::Validation(
                    "cannot move an item under itself or its own descendant".into(),
                ));
            }
            // Covers unknown ids and cross-scope parents alike: the parent
            // must sit in this scope's reconstructed forest.
            let parent = find_tree_mut(&mut forest, NodeId::Persisted(parent_id))
                .ok_or_else(|| {
                    BudgetError::Validation(format!(
                        "target parent {} is not in scope {}",
                        parent_id, scope
                    ))
                })?;
            let idx = new_index.min(parent.children.len());
            parent.children.insert(idx, subtree);
        }
        None => {
            let idx = new_index.min(forest.len());
            forest.insert(idx, subtree);
        }
    }

    assign_codes(&category.code, &mut forest);
    let changed = items::write_structural_changes(tx, &before, &forest)?;
    Ok(MoveSummary { changed })
}
