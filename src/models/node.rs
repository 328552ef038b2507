//! Budget line item model
//!
//! A budget node is one line item in the hierarchical classification. Leaf
//! nodes carry direct numeric target inputs (frequency × unit amount);
//! non-leaf nodes derive their total from their children. Codes, levels,
//! ordinals, and parent links are derived from tree shape and re-assigned on
//! every edit.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::NodeId;
use super::money::Money;

/// A single budget line item
///
/// The derived fields (`code`, `level`, `ordinal`, `parent_id`,
/// `total_target`) default to empty values in drafts; canonicalization fills
/// them in before anything is persisted. `realized_amount`/`realized_count`
/// are aggregates owned by the realization-transaction store and are never
/// written by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetNode {
    /// Persisted row id or client-local ephemeral token
    #[serde(default = "NodeId::fresh")]
    pub id: NodeId,

    /// Hierarchical code, unique within the scope (derived)
    #[serde(default)]
    pub code: String,

    /// Line item name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Depth in the tree, roots are level 1 (derived)
    #[serde(default)]
    pub level: u32,

    /// 1-based position among siblings, contiguous (derived)
    #[serde(default)]
    pub ordinal: u32,

    /// Parent node, if any; always within the same scope (derived)
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// How many times the item occurs per period (leaf-only)
    #[serde(default)]
    pub frequency_target: Option<i64>,

    /// Unit label for the frequency (e.g. "month", "event")
    #[serde(default)]
    pub frequency_unit: Option<String>,

    /// Amount per occurrence (leaf-only)
    #[serde(default)]
    pub unit_amount: Option<Money>,

    /// Leaf: frequency × unit amount; non-leaf: sum of children (derived)
    #[serde(default)]
    pub total_target: Option<Money>,

    /// Sum of realization transactions referencing this item (read-only)
    #[serde(default)]
    pub realized_amount: Money,

    /// Count of realization transactions referencing this item (read-only)
    #[serde(default)]
    pub realized_count: i64,
}

impl BudgetNode {
    /// Create a new leaf node with a fresh ephemeral id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            code: String::new(),
            name: name.into(),
            description: String::new(),
            level: 1,
            ordinal: 1,
            parent_id: None,
            frequency_target: None,
            frequency_unit: None,
            unit_amount: None,
            total_target: None,
            realized_amount: Money::zero(),
            realized_count: 0,
        }
    }

    /// Whether the node carries any direct numeric input
    pub fn has_direct_inputs(&self) -> bool {
        self.frequency_target.is_some() || self.unit_amount.is_some()
    }

    /// Clear the direct numeric inputs (applied when a node gains children)
    pub fn clear_direct_inputs(&mut self) {
        self.frequency_target = None;
        self.frequency_unit = None;
        self.unit_amount = None;
    }

    /// Validate the node's own fields
    pub fn validate(&self) -> Result<(), NodeValidationError> {
        if self.name.trim().is_empty() {
            return Err(NodeValidationError::EmptyName);
        }

        if self.name.len() > 120 {
            return Err(NodeValidationError::NameTooLong(self.name.len()));
        }

        if let Some(freq) = self.frequency_target {
            if freq < 0 {
                return Err(NodeValidationError::NegativeFrequency(freq));
            }
        }

        Ok(())
    }
}

impl fmt::Display for BudgetNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.name)
    }
}

/// Validation errors for budget nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeFrequency(i64),
}

impl fmt::Display for NodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Item name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Item name too long ({} chars, max 120)", len)
            }
            Self::NegativeFrequency(freq) => {
                write!(f, "Frequency target cannot be negative ({})", freq)
            }
        }
    }
}

impl std::error::Error for NodeValidationError {}
