//! Core data models for budgetree
//!
//! This module contains the data structures that represent the budget
//! classification domain: ids, money, scopes, and tree nodes.

pub mod ids;
pub mod money;
pub mod node;
pub mod scope;

pub use ids::{CategoryId, EphemeralId, ItemId, NodeId, PeriodId};
pub use money::Money;
pub use node::BudgetNode;
pub use scope::BudgetScope;
