//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time. Persisted entities carry integer row ids;
//! not-yet-persisted budget nodes carry a client-generated UUID token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers over persisted row ids
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap an existing row id
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying row id
            pub const fn raw(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Accept both the bare row id and the prefixed display form
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(PeriodId, "per-");
define_id!(CategoryId, "cat-");
define_id!(ItemId, "itm-");

/// Client-generated placeholder identifier for a not-yet-persisted node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EphemeralId(Uuid);

impl EphemeralId {
    /// Create a new random ephemeral id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EphemeralId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EphemeralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new-{}", &self.0.to_string()[..8])
    }
}

/// Identifier of a budget node: a persisted row id or an ephemeral token
///
/// The two forms stay distinguishable in JSON: persisted ids serialize as
/// integers, ephemeral ids as UUID strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Persisted(ItemId),
    Ephemeral(EphemeralId),
}

impl NodeId {
    /// Create a fresh ephemeral node id
    pub fn fresh() -> Self {
        Self::Ephemeral(EphemeralId::new())
    }

    /// Whether this id refers to a persisted row
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }

    /// Whether this id is a client-local token
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral(_))
    }

    /// The persisted row id, if any
    pub fn as_persisted(&self) -> Option<ItemId> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Ephemeral(_) => None,
        }
    }
}

impl From<ItemId> for NodeId {
    fn from(id: ItemId) -> Self {
        Self::Persisted(id)
    }
}

impl From<EphemeralId> for NodeId {
    fn from(id: EphemeralId) -> Self {
        Self::Ephemeral(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => id.fmt(f),
            Self::Ephemeral(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display_and_parse() {
        let id = ItemId::new(42);
        assert_eq!(id.to_string(), "itm-42");
        assert_eq!("itm-42".parse::<ItemId>().unwrap(), id);
        assert_eq!("42".parse::<ItemId>().unwrap(), id);
    }

    #[test]
    fn test_id_types_not_mixable() {
        // Different ID types are distinct at compile time; only the raw
        // values can be compared.
        let period = PeriodId::new(1);
        let category = CategoryId::new(1);
        assert_eq!(period.raw(), category.raw());
    }

    #[test]
    fn test_ephemeral_ids_are_unique() {
        assert_ne!(EphemeralId::new(), EphemeralId::new());
    }

    #[test]
    fn test_node_id_forms() {
        let persisted = NodeId::from(ItemId::new(7));
        assert!(persisted.is_persisted());
        assert_eq!(persisted.as_persisted(), Some(ItemId::new(7)));

        let ephemeral = NodeId::fresh();
        assert!(ephemeral.is_ephemeral());
        assert_eq!(ephemeral.as_persisted(), None);
    }

    #[test]
    fn test_node_id_serialization_forms() {
        let persisted = NodeId::from(ItemId::new(7));
        assert_eq!(serde_json::to_string(&persisted).unwrap(), "7");

        let ephemeral = NodeId::fresh();
        let json = serde_json::to_string(&ephemeral).unwrap();
        assert!(json.starts_with('"'));

        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ephemeral);

        let num: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(num, persisted);
    }
}
