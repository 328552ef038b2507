//! budgetree - Hierarchical budget classification for financial planning
//!
//! This library maintains nested budget line items under categories, each
//! carrying a unique hierarchical code, target amounts, and realized
//! aggregates. The tree stays structurally valid while being interactively
//! edited (add/remove/reparent/drag-reorder) and is reconciled against a
//! SQLite store without violating uniqueness constraints or losing
//! realization history.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (ids, money, scopes, nodes)
//! - `tree`: In-memory editing (codes, rollups, tree model, drag reorder)
//! - `storage`: SQLite storage layer
//! - `services`: Persistence engines (bulk save, single-node move, queries)
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use budgetree::config::{paths::BudgetreePaths, settings::Settings};
//! use budgetree::storage::Store;
//!
//! let paths = BudgetreePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let store = Store::open(settings.database_file(&paths))?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod tree;

pub use error::{BudgetError, BudgetResult};
