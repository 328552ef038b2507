//! Drag-reorder projection
//!
//! Converts a drag gesture (active node, drop target, horizontal pointer
//! offset) into a new parent/position/depth and reshapes the forest. The
//! active node's subtree moves as one unit and is hidden from the flattened
//! list while the target position is computed.
//!
//! Depth rules: the active node's projected depth is its original level plus
//! one step per indent unit of horizontal travel, clamped between 1 and the
//! previous flattened node's level + 1. Every other node is clamped to at
//! most the previous node's level + 1, in document order.

use super::{flatten_forest, TreeModel, TreeNode};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetNode, NodeId};

/// A drag gesture over the rendered tree
#[derive(Debug, Clone, Copy)]
pub struct DragGesture {
    /// The node being dragged
    pub active_id: NodeId,
    /// The node currently under the pointer
    pub over_id: NodeId,
    /// Horizontal pointer travel in pixels; negative outdents
    pub offset_px: i32,
    /// Pixels per depth level
    pub indent_px: u32,
}

impl TreeModel {
    /// Apply a drag gesture, reshaping the forest
    ///
    /// Dropping a node on itself (or on one of its own hidden descendants)
    /// is a no-op. Unknown ids surface `NotFound`.
    pub fn apply_drag(&mut self, gesture: DragGesture) -> BudgetResult<()> {
        if gesture.active_id == gesture.over_id {
            return Ok(());
        }
        if gesture.indent_px == 0 {
            return Err(BudgetError::Validation(
                "indent unit must be at least one pixel".into(),
            ));
        }

        let mut flat = Vec::new();
        flatten_forest(self.roots().to_vec(), &mut flat);

        let active_idx = flat
            .iter()
            .position(|n| n.id == gesture.active_id)
            .ok_or_else(|| BudgetError::item_not_found(gesture.active_id.to_string()))?;
        if !flat.iter().any(|n| n.id == gesture.over_id) {
            return Err(BudgetError::item_not_found(gesture.over_id.to_string()));
        }

        let original_level = flat[active_idx].level;

        // Hide the active subtree: descendants are the contiguous run of
        // deeper nodes directly after the active node in document order.
        let block_end = flat[active_idx + 1..]
            .iter()
            .position(|n| n.level <= original_level)
            .map(|p| active_idx + 1 + p)
            .unwrap_or(flat.len());
        let mut subtree: Vec<BudgetNode> = flat.drain(active_idx + 1..block_end).collect();

        // The drop target sat inside the hidden subtree; nothing to do.
        let Some(over_idx) = flat.iter().position(|n| n.id == gesture.over_id) else {
            return Ok(());
        };

        // Stable move of the active node to the drop target's position.
        let active = flat.remove(active_idx);
        flat.insert(over_idx, active);

        // Project the active node's new depth from the pointer offset.
        let steps =
            (f64::from(gesture.offset_px) / f64::from(gesture.indent_px)).round() as i64;
        let projected = i64::from(original_level) + steps;
        let max_depth = if over_idx == 0 {
            1
        } else {
            i64::from(flat[over_idx - 1].level) + 1
        };
        let candidate = projected.clamp(1, max_depth) as u32;

        let delta = i64::from(candidate) - i64::from(original_level);
        flat[over_idx].level = candidate;
        for node in &mut subtree {
            node.level = (i64::from(node.level) + delta) as u32;
        }

        // Re-insert the hidden subtree directly behind the active node.
        let mut tail = flat.split_off(over_idx + 1);
        flat.append(&mut subtree);
        flat.append(&mut tail);

        // Clamp every depth to at most the previous node's level + 1 and
        // rebuild parent/child links from the walk.
        let mut prev_level = 0;
        for (i, node) in flat.iter_mut().enumerate() {
            let max = if i == 0 { 1 } else { prev_level + 1 };
            node.level = node.level.clamp(1, max);
            prev_level = node.level;
        }

        let mut iter = flat.into_iter().peekable();
        let rebuilt = build_level(&mut iter, 1);
        self.replace_forest(rebuilt);
        Ok(())
    }
}

fn build_level(
    iter: &mut std::iter::Peekable<std::vec::IntoIter<BudgetNode>>,
    level: u32,
) -> Vec<TreeNode> {
    let mut out = Vec::new();
    while iter.peek().is_some_and(|next| next.level == level) {
        let Some(node) = iter.next() else { break };
        let children = build_level(iter, level + 1);
        out.push(TreeNode { node, children });
    }
    out
}
