//! Bulk tree save
//!
//! Reconciles a client-authored draft forest against the persisted store for
//! one scope, atomically. The whole save runs in a single transaction:
//! items omitted from the draft are deleted (unless realizations still
//! reference them, which aborts everything), retained rows are rewritten to
//! the draft's canonical form, and new nodes are inserted with
//! server-generated ids.
//!
//! The scoped unique index on codes cannot be deferred, so retained rows
//! first receive collision-free placeholder codes (`'#' || id`) in one bulk
//! statement, releasing every code about to be reused by the new
//! arrangement; the canonical codes are then written per node in tree order.

use std::collections::{HashMap, HashSet};

use rusqlite::Transaction;
use tracing::{debug, info};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetNode, BudgetScope, EphemeralId, ItemId, NodeId};
use crate::storage::{items, lookups, realizations, Store};
use crate::tree::{assign_codes, for_each_node, recompute_totals, validate_forest, TreeNode};

/// Outcome of a successful bulk save
#[derive(Debug, Default)]
pub struct SaveSummary {
    pub deleted: usize,
    pub updated: usize,
    pub inserted: usize,
    /// Server-generated ids for the draft's ephemeral nodes
    pub new_ids: HashMap<EphemeralId, ItemId>,
}

impl SaveSummary {
    /// One-line human-readable outcome
    pub fn message(&self) -> String {
        format!(
            "Saved tree: {} inserted, {} updated, {} deleted",
            self.inserted, self.updated, self.deleted
        )
    }
}

/// Service persisting whole draft forests
pub struct SyncService<'a> {
    store: &'a mut Store,
}

impl<'a> SyncService<'a> {
    /// Create a new sync service
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Atomically replace the persisted tree for `scope` with `draft`
    ///
    /// Rolls back on any failure; the caller receives either a summary or a
    /// single error, never a partially applied tree.
    pub fn save_tree(
        &mut self,
        scope: BudgetScope,
        draft: Vec<TreeNode>,
    ) -> BudgetResult<SaveSummary> {
        let tx = self.store.connection_mut().transaction()?;
        let summary = save_tree_in_tx(&tx, scope, draft)?;
        tx.commit()
            .map_err(|e| BudgetError::Transaction(format!("commit failed: {e}")))?;

        info!(
            %scope,
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            "budget tree saved"
        );
        Ok(summary)
    }
}

fn save_tree_in_tx(
    tx: &Transaction<'_>,
    scope: BudgetScope,
    mut draft: Vec<TreeNode>,
) -> BudgetResult<SaveSummary> {
    if !lookups::period_exists(tx, scope.period_id)? {
        return Err(BudgetError::Validation(format!(
            "unknown period {}",
            scope.period_id
        )));
    }
    let category = lookups::category_ref(tx, scope.category_id)?.ok_or_else(|| {
        BudgetError::Validation(format!("unknown category {}", scope.category_id))
    })?;

    validate_forest(&draft)?;
    assign_codes(&category.code, &mut draft);
    recompute_totals(&mut draft);

    let existing = items::scope_ids(tx, scope)?;
    let mut active: HashSet<ItemId> = HashSet::new();
    for_each_node(&draft, &mut |node| {
        if let Some(id) = node.id.as_persisted() {
            active.insert(id);
        }
    });
    for id in &active {
        if !existing.contains(id) {
            return Err(BudgetError::Validation(format!(
                "item {} does not belong to scope {}",
                id, scope
            )));
        }
    }

    let to_delete: Vec<ItemId> = existing.difference(&active).copied().collect();
    if realizations::any_referenced(tx, &to_delete)? {
        return Err(BudgetError::ReferentialIntegrity(
            "the draft omits items that still have realization transactions".into(),
        ));
    }
    let deleted = items::delete_ids(tx, &to_delete)?;

    // Phase one: one bulk statement moves every retained row onto a
    // collision-free placeholder code derived from its id.
    let released = tx.execute(
        "UPDATE budget_items SET code = '#' || id WHERE period_id = ?1 AND category_id = ?2",
        rusqlite::params![scope.period_id.raw(), scope.category_id.raw()],
    )?;
    debug!(%scope, released, "placeholder codes assigned");

    // Phase two: canonical rows in tree order, parents before children.
    let now = chrono::Utc::now().timestamp();
    let mut summary = SaveSummary {
        deleted,
        ..SaveSummary::default()
    };
    write_forest(tx, scope, &draft, now, &mut summary)?;
    Ok(summary)
}

fn write_forest(
    tx: &Transaction<'_>,
    scope: BudgetScope,
    forest: &[TreeNode],
    now: i64,
    summary: &mut SaveSummary,
) -> BudgetResult<()> {
    for tree in forest {
        write_node(tx, scope, &tree.node, now, summary)?;
        write_forest(tx, scope, &tree.children, now, summary)?;
    }
    Ok(())
}

fn write_node(
    tx: &Transaction<'_>,
    scope: BudgetScope,
    node: &BudgetNode,
    now: i64,
    summary: &mut SaveSummary,
) -> BudgetResult<()> {
    // Children referencing an ephemeral parent are rewritten to the id the
    // parent's insert just produced; parents always precede children here.
    let parent_raw: Option<i64> = match node.parent_id {
        None => None,
        Some(NodeId::Persisted(id)) => Some(id.raw()),
        Some(NodeId::Ephemeral(e)) => Some(
            summary
                .new_ids
                .get(&e)
                .ok_or_else(|| {
                    BudgetError::Structural(format!("node {} written before its parent", node.id))
                })?
                .raw(),
        ),
    };

    match node.id {
        NodeId::Persisted(id) => {
            tx.execute(
                "UPDATE budget_items
                 SET code = ?1, name = ?2, description = ?3, level = ?4, ordinal = ?5,
                     parent_id = ?6, frequency_target = ?7, frequency_unit = ?8,
                     unit_amount = ?9, total_target = ?10, updated_at = ?11
                 WHERE id = ?12",
                rusqlite::params![
                    node.code,
                    node.name,
                    node.description,
                    node.level,
                    node.ordinal,
                    parent_raw,
                    node.frequency_target,
                    node.frequency_unit,
                    node.unit_amount.map(|m| m.cents()),
                    node.total_target.map(|m| m.cents()),
                    now,
                    id.raw(),
                ],
            )?;
            summary.updated += 1;
        }
        NodeId::Ephemeral(ephemeral) => {
            tx.execute(
                "INSERT INTO budget_items
                 (period_id, category_id, code, name, description, level, ordinal,
                  parent_id, frequency_target, frequency_unit, unit_amount, total_target,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
                rusqlite::params![
                    scope.period_id.raw(),
                    scope.category_id.raw(),
                    node.code,
                    node.name,
                    node.description,
                    node.level,
                    node.ordinal,
                    parent_raw,
                    node.frequency_target,
                    node.frequency_unit,
                    node.unit_amount.map(|m| m.cents()),
                    node.total_target.map(|m| m.cents()),
                    now,
                ],
            )?;
            summary
                .new_ids
                .insert(ephemeral, ItemId::new(tx.last_insert_rowid()));
            summary.inserted += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::storage::testutil::{add_realization, seeded_store};
    use crate::tree::TreeModel;

    fn priced_leaf(name: &str, freq: i64, cents: i64) -> TreeNode {
        let mut node = BudgetNode::new(name);
        node.frequency_target = Some(freq);
        node.unit_amount = Some(Money::from_cents(cents));
        TreeNode::leaf(node)
    }

    /// Persist a root with two priced children, then reload it
    fn saved_scope(store: &mut Store, scope: BudgetScope) -> Vec<TreeNode> {
        let draft = vec![TreeNode {
            node: BudgetNode::new("Events"),
            children: vec![priced_leaf("Spring", 2, 1000), priced_leaf("Autumn", 3, 2000)],
        }];
        let summary = SyncService::new(store).save_tree(scope, draft).unwrap();
        assert_eq!(summary.inserted, 3);

        let rows = items::items_in_scope(store.connection(), scope).unwrap();
        items::build_forest(rows).unwrap()
    }

    fn scope_codes(store: &Store, scope: BudgetScope) -> Vec<(String, u32)> {
        let rows = items::items_in_scope(store.connection(), scope).unwrap();
        rows.into_iter().map(|r| (r.code, r.ordinal)).collect()
    }

    #[test]
    fn test_save_inserts_ephemeral_draft() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let forest = saved_scope(&mut store, scope);

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.node.code, "A");
        assert!(root.node.id.is_persisted());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].node.code, "A.1");
        assert_eq!(
            root.children[0].node.parent_id,
            Some(root.node.id),
            "child rewritten to the server-generated parent id"
        );
        // Rollup landed in the store
        assert_eq!(root.node.total_target, Some(Money::from_cents(8000)));
    }

    #[test]
    fn test_omitted_item_deleted_and_siblings_renumbered() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let mut forest = saved_scope(&mut store, scope);
        let removed = forest[0].children.remove(0);
        let kept = forest[0].children[0].node.id;

        let summary = SyncService::new(&mut store).save_tree(scope, forest).unwrap();
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.updated, 2);

        let rows = items::items_in_scope(store.connection(), scope).unwrap();
        let reloaded = items::build_forest(rows).unwrap();
        assert_eq!(reloaded[0].children.len(), 1);
        assert_eq!(reloaded[0].children[0].node.id, kept);
        assert_eq!(reloaded[0].children[0].node.code, "A.1");
        assert_eq!(reloaded[0].children[0].node.ordinal, 1);
        assert!(!reloaded[0].contains(removed.node.id));
    }

    #[test]
    fn test_referenced_omission_aborts_whole_save() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let mut forest = saved_scope(&mut store, scope);
        let before = scope_codes(&store, scope);

        let omitted = forest[0].children.remove(0);
        let omitted_id = omitted.node.id.as_persisted().unwrap();
        add_realization(&store, omitted_id, 500);

        // Also rename the root so a partial apply would be visible.
        forest[0].node.name = "Renamed".into();

        let err = SyncService::new(&mut store)
            .save_tree(scope, forest)
            .unwrap_err();
        assert!(err.is_referential_integrity());

        // Nothing changed: same rows, same codes, same name.
        assert_eq!(scope_codes(&store, scope), before);
        let root_name: String = store
            .connection()
            .query_row(
                "SELECT name FROM budget_items WHERE parent_id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(root_name, "Events");
    }

    #[test]
    fn test_root_swap_survives_unique_index() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let draft = vec![priced_leaf("First", 1, 100), priced_leaf("Second", 1, 100)];
        SyncService::new(&mut store).save_tree(scope, draft).unwrap();

        // Swapping the roots reuses both codes; without the placeholder
        // phase the first UPDATE would collide with the second row.
        let rows = items::items_in_scope(store.connection(), scope).unwrap();
        let mut forest = items::build_forest(rows).unwrap();
        forest.swap(0, 1);

        SyncService::new(&mut store).save_tree(scope, forest).unwrap();

        let rows = items::items_in_scope(store.connection(), scope).unwrap();
        let reloaded = items::build_forest(rows).unwrap();
        assert_eq!(reloaded[0].node.name, "Second");
        assert_eq!(reloaded[0].node.code, "A");
        assert_eq!(reloaded[1].node.name, "First");
        assert_eq!(reloaded[1].node.code, "A.2");
    }

    #[test]
    fn test_unknown_scope_is_validation_error() {
        let (mut store, period, category) = seeded_store();

        let bad_period = BudgetScope::new(crate::models::PeriodId::new(99), category);
        let err = SyncService::new(&mut store)
            .save_tree(bad_period, vec![priced_leaf("x", 1, 1)])
            .unwrap_err();
        assert!(err.is_validation());

        let bad_category = BudgetScope::new(period, crate::models::CategoryId::new(99));
        let err = SyncService::new(&mut store)
            .save_tree(bad_category, vec![priced_leaf("x", 1, 1)])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_foreign_persisted_id_rejected() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let mut node = BudgetNode::new("Imposter");
        node.id = NodeId::Persisted(ItemId::new(4242));
        let err = SyncService::new(&mut store)
            .save_tree(scope, vec![TreeNode::leaf(node)])
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_model_draft_roundtrip() {
        let (mut store, period, category) = seeded_store();
        let scope = BudgetScope::new(period, category);

        let mut model = TreeModel::new("A");
        let root = model.add_root();
        model.add_child(root).unwrap();
        model.add_child(root).unwrap();

        let summary = SyncService::new(&mut store)
            .save_tree(scope, model.into_forest())
            .unwrap();
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.new_ids.len(), 3);

        let codes = scope_codes(&store, scope);
        assert_eq!(codes.len(), 3);
    }
}
