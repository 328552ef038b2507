//! In-memory budget forest editing
//!
//! This module owns the client-side editing core: canonical code assignment,
//! target rollups, the editable tree model, and the drag-reorder projection.
//! Every edit re-derives codes, ordinals, levels, parent links, and totals,
//! so the forest always satisfies the structural invariants.

pub mod codes;
pub mod model;
pub mod reorder;
pub mod rollup;

pub use codes::assign_codes;
pub use model::{NodeEdit, TreeModel};
pub use reorder::DragGesture;
pub use rollup::recompute_totals;

use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetNode, NodeId};

/// A budget node together with its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: BudgetNode,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Wrap a node as a childless subtree
    pub fn leaf(node: BudgetNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Whether `id` is this node or one of its descendants
    pub fn contains(&self, id: NodeId) -> bool {
        self.node.id == id || self.children.iter().any(|c| c.contains(id))
    }

    /// Number of nodes in this subtree, including self
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Always false; a tree node contains at least itself
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Find a subtree by node id
pub fn find_tree<'a>(forest: &'a [TreeNode], id: NodeId) -> Option<&'a TreeNode> {
    for tree in forest {
        if tree.node.id == id {
            return Some(tree);
        }
        if let Some(found) = find_tree(&tree.children, id) {
            return Some(found);
        }
    }
    None
}

/// Find a subtree by node id, mutably
pub fn find_tree_mut(forest: &mut [TreeNode], id: NodeId) -> Option<&mut TreeNode> {
    for tree in forest.iter_mut() {
        if tree.node.id == id {
            return Some(tree);
        }
        if let Some(found) = find_tree_mut(&mut tree.children, id) {
            return Some(found);
        }
    }
    None
}

/// Locate the sibling list containing `id` and the position within it
pub fn locate<'a>(
    forest: &'a mut Vec<TreeNode>,
    id: NodeId,
) -> Option<(&'a mut Vec<TreeNode>, usize)> {
    if let Some(pos) = forest.iter().position(|t| t.node.id == id) {
        return Some((forest, pos));
    }
    for tree in forest.iter_mut() {
        if let Some(found) = locate(&mut tree.children, id) {
            return Some(found);
        }
    }
    None
}

/// Detach the subtree rooted at `id` from the forest
pub fn remove_subtree(forest: &mut Vec<TreeNode>, id: NodeId) -> Option<TreeNode> {
    let (siblings, pos) = locate(forest, id)?;
    Some(siblings.remove(pos))
}

/// Flatten the forest into document order, consuming it
pub fn flatten_forest(forest: Vec<TreeNode>, out: &mut Vec<BudgetNode>) {
    for tree in forest {
        out.push(tree.node);
        flatten_forest(tree.children, out);
    }
}

/// Visit every node in document order
pub fn for_each_node<'a>(forest: &'a [TreeNode], f: &mut impl FnMut(&'a BudgetNode)) {
    for tree in forest {
        f(&tree.node);
        for_each_node(&tree.children, f);
    }
}

/// Validate every node in the forest, surfacing the first failure
pub fn validate_forest(forest: &[TreeNode]) -> BudgetResult<()> {
    for tree in forest {
        tree.node
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;
        validate_forest(&tree.children)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Build a named leaf subtree for tests
    pub fn leaf(name: &str) -> TreeNode {
        TreeNode::leaf(BudgetNode::new(name))
    }

    /// Build a named subtree with the given children
    pub fn branch(name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            node: BudgetNode::new(name),
            children,
        }
    }

    /// Collect (code, level, ordinal) triples in document order
    pub fn shape(forest: &[TreeNode]) -> Vec<(String, u32, u32)> {
        let mut out = Vec::new();
        for_each_node(forest, &mut |n| {
            out.push((n.code.clone(), n.level, n.ordinal));
        });
        out
    }
}
