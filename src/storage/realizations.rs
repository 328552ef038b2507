//! Read-only queries against the realization-transaction store
//!
//! Realizations are recorded by an external collaborator; this crate only
//! checks whether items are referenced (the deletion guard) and reads the
//! per-item aggregates for display. Nothing here mutates the table.

use rusqlite::Connection;

use crate::error::BudgetResult;
use crate::models::{ItemId, Money};

/// Realized aggregates for one item
#[derive(Debug, Clone, Copy, Default)]
pub struct RealizedTotals {
    pub amount: Money,
    pub count: i64,
}

/// Whether any realization references `id`
pub fn is_referenced(conn: &Connection, id: ItemId) -> BudgetResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM realizations WHERE item_id = ?1)",
        rusqlite::params![id.raw()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Whether any realization references any of `ids`
pub fn any_referenced(conn: &Connection, ids: &[ItemId]) -> BudgetResult<bool> {
    if ids.is_empty() {
        return Ok(false);
    }

    let placeholders = std::iter::repeat("?")
        .take(ids.len())
        .collect::<Vec<_>>()
        .join(", ");
    let exists: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM realizations WHERE item_id IN ({placeholders}))"),
        rusqlite::params_from_iter(ids.iter().map(|id| id.raw())),
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Sum and count of realizations referencing `id`
pub fn totals_for(conn: &Connection, id: ItemId) -> BudgetResult<RealizedTotals> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM realizations WHERE item_id = ?1",
        rusqlite::params![id.raw()],
        |row| {
            Ok(RealizedTotals {
                amount: Money::from_cents(row.get(0)?),
                count: row.get(1)?,
            })
        },
    )?;
    Ok(totals)
}
