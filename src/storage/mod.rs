//! Storage layer for budgetree
//!
//! One SQLite database holds the persisted budget trees plus the read-only
//! collaborator tables (periods, categories, realization transactions).
//! Engines open a single transaction per invocation against the store's
//! connection; a failed transaction has zero side effects.

pub mod items;
pub mod lookups;
pub mod realizations;

pub use items::{build_forest, ItemRow};
pub use lookups::CategoryRef;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{BudgetError, BudgetResult};

/// Schema for the budget tree store
///
/// `budget_items` carries one row per node; code uniqueness is scoped to
/// (period_id, category_id). The unique index cannot be deferred in SQLite,
/// which is why the sync and move engines rewrite codes in two phases.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS periods (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    starts_on   TEXT,
    ends_on     TEXT
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS budget_items (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    period_id        INTEGER NOT NULL,
    category_id      INTEGER NOT NULL,
    code             TEXT NOT NULL,
    name             TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    level            INTEGER NOT NULL,
    ordinal          INTEGER NOT NULL,
    parent_id        INTEGER,
    frequency_target INTEGER,
    frequency_unit   TEXT,
    unit_amount      INTEGER,
    total_target     INTEGER,
    created_at       INTEGER NOT NULL,
    updated_at       INTEGER NOT NULL,
    UNIQUE (period_id, category_id, code)
);

CREATE INDEX IF NOT EXISTS idx_budget_items_scope
    ON budget_items (period_id, category_id);
CREATE INDEX IF NOT EXISTS idx_budget_items_parent
    ON budget_items (parent_id);

CREATE TABLE IF NOT EXISTS realizations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id     INTEGER NOT NULL,
    amount      INTEGER NOT NULL,
    recorded_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_realizations_item
    ON realizations (item_id);
";

/// An open budget tree store backed by a SQLite database
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) a store at `path` and ensure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> BudgetResult<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            BudgetError::Storage(format!(
                "Failed to open database {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory store (used by tests)
    pub fn open_in_memory() -> BudgetResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> BudgetResult<Self> {
        // The engines issue several round-trips per transaction; a generous
        // busy timeout lets concurrent savers serialize instead of failing.
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Returns the underlying SQLite connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the connection mutably, for opening transactions
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
