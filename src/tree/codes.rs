//! Canonical code assignment
//!
//! Derives hierarchical codes, ordinals, levels, and parent links from tree
//! shape alone. The assignment is deterministic and idempotent: re-running
//! it on an already-canonical forest changes nothing.
//!
//! Under category code `C`, the first root keeps the bare code `C` and every
//! later root at index i gets `C.{i+1}`. A child at index i under a parent
//! coded `P` gets `P.{i+1}`.

use super::TreeNode;
use crate::models::NodeId;

/// Assign canonical codes, ordinals, levels, and parent links to the forest
pub fn assign_codes(category_code: &str, forest: &mut [TreeNode]) {
    for (i, root) in forest.iter_mut().enumerate() {
        let code = if i == 0 {
            category_code.to_string()
        } else {
            format!("{}.{}", category_code, i + 1)
        };
        assign_node(root, code, 1, (i + 1) as u32, None);
    }
}

fn assign_node(tree: &mut TreeNode, code: String, level: u32, ordinal: u32, parent: Option<NodeId>) {
    tree.node.level = level;
    tree.node.ordinal = ordinal;
    tree.node.parent_id = parent;

    let id = tree.node.id;
    for (i, child) in tree.children.iter_mut().enumerate() {
        let child_code = format!("{}.{}", code, i + 1);
        assign_node(child, child_code, level + 1, (i + 1) as u32, Some(id));
    }

    tree.node.code = code;
}
