//! Read-only lookups against the collaborator tables
//!
//! Periods and categories are owned elsewhere; this crate only checks
//! validity and reads display fields.

use rusqlite::Connection;

use crate::error::BudgetResult;
use crate::models::{CategoryId, PeriodId};

/// Display fields of a category
#[derive(Debug, Clone)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub code: String,
    pub name: String,
}

/// Fetch a category's code and name
pub fn category_ref(conn: &Connection, id: CategoryId) -> BudgetResult<Option<CategoryRef>> {
    let result = conn.query_row(
        "SELECT id, code, name FROM categories WHERE id = ?1",
        rusqlite::params![id.raw()],
        |row| {
            Ok(CategoryRef {
                id: CategoryId::new(row.get(0)?),
                code: row.get(1)?,
                name: row.get(2)?,
            })
        },
    );
    match result {
        Ok(category) => Ok(Some(category)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List every category id in code order
pub fn category_ids(conn: &Connection) -> BudgetResult<Vec<CategoryId>> {
    let mut stmt = conn.prepare("SELECT id FROM categories ORDER BY code")?;
    let ids = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids.into_iter().map(CategoryId::new).collect())
}

/// Whether a period row exists
pub fn period_exists(conn: &Connection, id: PeriodId) -> BudgetResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM periods WHERE id = ?1)",
        rusqlite::params![id.raw()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::super::testutil::seeded_store;
    use super::*;

    #[test]
    fn test_category_ref() {
        let (store, _period, category) = seeded_store();

        let found = category_ref(store.connection(), category).unwrap().unwrap();
        assert_eq!(found.code, "A");
        assert_eq!(found.name, "Operations");

        let missing = category_ref(store.connection(), CategoryId::new(99)).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_period_exists() {
        let (store, period, _category) = seeded_store();

        assert!(period_exists(store.connection(), period).unwrap());
        assert!(!period_exists(store.connection(), PeriodId::new(99)).unwrap());
    }
}
