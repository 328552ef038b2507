//! Service layer for budgetree
//!
//! The service layer provides the persistence entry points on top of the
//! storage layer. Each engine runs inside a single database transaction;
//! a failed invocation leaves the store untouched.

pub mod movement;
pub mod query;
pub mod sync;

pub use movement::{MoveService, MoveSummary};
pub use query::{NodeDetails, QueryService, TreeRow};
pub use sync::{SaveSummary, SyncService};
