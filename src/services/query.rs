//! Read and delete operations over persisted trees
//!
//! `fetch_tree` returns the flat listing the editing UI starts from, with a
//! derived has-children flag and the realized aggregates attached for
//! display. `delete_node` is the guarded single-item delete.

use rusqlite::Connection;
use tracing::info;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetScope, CategoryId, ItemId, Money, PeriodId};
use crate::storage::{items, lookups, realizations, CategoryRef, Store};
use crate::tree::assign_codes;

/// One row of the flat tree listing
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub category_code: String,
    pub code: String,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub ordinal: u32,
    pub parent_id: Option<ItemId>,
    pub frequency_target: Option<i64>,
    pub frequency_unit: Option<String>,
    pub unit_amount: Option<Money>,
    pub total_target: Option<Money>,
    pub has_children: bool,
    pub realized_amount: Money,
    pub realized_count: i64,
}

/// A single node with its scope context
#[derive(Debug, Clone)]
pub struct NodeDetails {
    pub period_id: PeriodId,
    pub category: CategoryRef,
    pub item: TreeRow,
}

const TREE_ROW_SELECT: &str = "
    SELECT i.id, i.category_id, c.code, i.code, i.name, i.description,
           i.level, i.ordinal, i.parent_id, i.frequency_target, i.frequency_unit,
           i.unit_amount, i.total_target,
           EXISTS(SELECT 1 FROM budget_items ch WHERE ch.parent_id = i.id),
           COALESCE(r.total, 0), COALESCE(r.cnt, 0)
    FROM budget_items i
    JOIN categories c ON c.id = i.category_id
    LEFT JOIN (SELECT item_id, SUM(amount) AS total, COUNT(*) AS cnt
               FROM realizations GROUP BY item_id) r ON r.item_id = i.id";

fn map_tree_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TreeRow> {
    Ok(TreeRow {
        id: ItemId::new(row.get(0)?),
        category_id: CategoryId::new(row.get(1)?),
        category_code: row.get(2)?,
        code: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        level: row.get(6)?,
        ordinal: row.get(7)?,
        parent_id: row.get::<_, Option<i64>>(8)?.map(ItemId::new),
        frequency_target: row.get(9)?,
        frequency_unit: row.get(10)?,
        unit_amount: row.get::<_, Option<i64>>(11)?.map(Money::from_cents),
        total_target: row.get::<_, Option<i64>>(12)?.map(Money::from_cents),
        has_children: row.get(13)?,
        realized_amount: Money::from_cents(row.get(14)?),
        realized_count: row.get(15)?,
    })
}

/// Service for reads and guarded deletes
pub struct QueryService<'a> {
    store: &'a mut Store,
}

impl<'a> QueryService<'a> {
    /// Create a new query service
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Flat listing of a period's items, ordered by (category code, level,
    /// ordinal), optionally restricted to one category
    pub fn fetch_tree(
        &self,
        period_id: PeriodId,
        category_id: Option<CategoryId>,
    ) -> BudgetResult<Vec<TreeRow>> {
        let conn = self.store.connection();
        if !lookups::period_exists(conn, period_id)? {
            return Err(BudgetError::period_not_found(period_id.to_string()));
        }

        let rows = match category_id {
            Some(category) => {
                if lookups::category_ref(conn, category)?.is_none() {
                    return Err(BudgetError::category_not_found(category.to_string()));
                }
                let mut stmt = conn.prepare(&format!(
                    "{TREE_ROW_SELECT}
                     WHERE i.period_id = ?1 AND i.category_id = ?2
                     ORDER BY c.code, i.level, i.ordinal"
                ))?;
                let rows = stmt
                    .query_map(
                        rusqlite::params![period_id.raw(), category.raw()],
                        map_tree_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{TREE_ROW_SELECT}
                     WHERE i.period_id = ?1
                     ORDER BY c.code, i.level, i.ordinal"
                ))?;
                let rows = stmt
                    .query_map(rusqlite::params![period_id.raw()], map_tree_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// Fetch one node with its scope context
    pub fn fetch_node(&self, item_id: ItemId) -> BudgetResult<NodeDetails> {
        let conn = self.store.connection();
        let row = items::get(conn, item_id)?
            .ok_or_else(|| BudgetError::item_not_found(item_id.to_string()))?;

        let category = lookups::category_ref(conn, row.scope.category_id)?.ok_or_else(|| {
            BudgetError::category_not_found(row.scope.category_id.to_string())
        })?;

        let item = conn.query_row(
            &format!("{TREE_ROW_SELECT} WHERE i.id = ?1"),
            rusqlite::params![item_id.raw()],
            map_tree_row,
        )?;

        Ok(NodeDetails {
            period_id: row.scope.period_id,
            category,
            item,
        })
    }

    /// Delete one childless, unreferenced item and renumber its siblings
    ///
    /// Returns the number of surviving rows rewritten by the renumbering.
    pub fn delete_node(&mut self, item_id: ItemId) -> BudgetResult<usize> {
        let tx = self.store.connection_mut().transaction()?;
        let renumbered = delete_node_in_tx(&tx, item_id)?;
        tx.commit()
            .map_err(|e| BudgetError::Transaction(format!("commit failed: {e}")))?;

        info!(%item_id, renumbered, "budget item deleted");
        Ok(renumbered)
    }
}

fn delete_node_in_tx(conn: &Connection, item_id: ItemId) -> BudgetResult<usize> {
    let row = items::get(conn, item_id)?
        .ok_or_else(|| BudgetError::item_not_found(item_id.to_string()))?;

    if items::count_children(conn, item_id)? > 0 {
        return Err(BudgetError::Validation(format!(
            "item {} still has children; delete or move them first",
            item_id
        )));
    }
    if realizations::is_referenced(conn, item_id)? {
        return Err(BudgetError::ReferentialIntegrity(format!(
            "item {} has realization transactions and cannot be deleted",
            item_id
        )));
    }

    let scope: BudgetScope = row.scope;
    let category = lookups::category_ref(conn, scope.category_id)?.ok_or_else(|| {
        BudgetError::Validation(format!("unknown category {}", scope.category_id))
    })?;

    conn.execute(
        "DELETE FROM budget_items WHERE id = ?1",
        rusqlite::params![item_id.raw()],
    )?;

    // Renumber the survivors so sibling ordinals stay contiguous.
    let rows = items::items_in_scope(conn, scope)?;
    let before = items::structural_snapshot(&rows);
    let mut forest = items::build_forest(rows)?;
    assign_codes(&category.code, &mut forest);
    items::write_structural_changes(conn, &before, &forest)
}
