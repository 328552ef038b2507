//! Budget scope: the (period, category) pair bounding a tree
//!
//! Code uniqueness and tree membership are both scoped to one period and
//! one category; every node belongs to exactly one scope.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, PeriodId};

/// A (period, category) pair bounding code uniqueness and tree membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BudgetScope {
    pub period_id: PeriodId,
    pub category_id: CategoryId,
}

impl BudgetScope {
    /// Create a new scope
    pub const fn new(period_id: PeriodId, category_id: CategoryId) -> Self {
        Self {
            period_id,
            category_id,
        }
    }
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period_id, self.category_id)
    }
}
