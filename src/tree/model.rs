//! Editable tree model
//!
//! `TreeModel` holds one scope's forest during an editing session. Every
//! operation re-derives codes, ordinals, levels, parent links, and totals,
//! so the forest is canonical after each edit. Operations only fail when
//! the target id does not exist.

use super::{assign_codes, find_tree_mut, locate, recompute_totals, remove_subtree, TreeNode};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetNode, Money, NodeId};

/// A single-field edit applied through [`TreeModel::update_field`]
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEdit {
    Name(String),
    Description(String),
    FrequencyTarget(Option<i64>),
    FrequencyUnit(Option<String>),
    UnitAmount(Option<Money>),
}

/// One scope's forest under interactive editing
#[derive(Debug, Clone)]
pub struct TreeModel {
    category_code: String,
    roots: Vec<TreeNode>,
}

impl TreeModel {
    /// Create an empty model for a category
    pub fn new(category_code: impl Into<String>) -> Self {
        Self {
            category_code: category_code.into(),
            roots: Vec::new(),
        }
    }

    /// Create a model from an existing forest, canonicalizing it
    pub fn from_forest(category_code: impl Into<String>, roots: Vec<TreeNode>) -> Self {
        let mut model = Self {
            category_code: category_code.into(),
            roots,
        };
        model.recompute();
        model
    }

    /// The category code governing root-level codes
    pub fn category_code(&self) -> &str {
        &self.category_code
    }

    /// The current forest
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Consume the model, yielding the forest (e.g. as a save draft)
    pub fn into_forest(self) -> Vec<TreeNode> {
        self.roots
    }

    /// Append a new root-level leaf; returns its id
    pub fn add_root(&mut self) -> NodeId {
        let node = BudgetNode::new("New item");
        let id = node.id;
        self.roots.push(TreeNode::leaf(node));
        self.recompute();
        id
    }

    /// Append a new leaf as the last child of `parent_id`; returns its id
    pub fn add_child(&mut self, parent_id: NodeId) -> BudgetResult<NodeId> {
        let parent = find_tree_mut(&mut self.roots, parent_id)
            .ok_or_else(|| BudgetError::item_not_found(parent_id.to_string()))?;

        let node = BudgetNode::new("New item");
        let id = node.id;
        parent.children.push(TreeNode::leaf(node));
        self.recompute();
        Ok(id)
    }

    /// Insert a new leaf immediately after `target_id` under the same parent
    pub fn add_sibling(&mut self, target_id: NodeId) -> BudgetResult<NodeId> {
        let (siblings, pos) = locate(&mut self.roots, target_id)
            .ok_or_else(|| BudgetError::item_not_found(target_id.to_string()))?;

        let node = BudgetNode::new("New item");
        let id = node.id;
        siblings.insert(pos + 1, TreeNode::leaf(node));
        self.recompute();
        Ok(id)
    }

    /// Remove `target_id` and its entire subtree
    pub fn delete(&mut self, target_id: NodeId) -> BudgetResult<TreeNode> {
        let removed = remove_subtree(&mut self.roots, target_id)
            .ok_or_else(|| BudgetError::item_not_found(target_id.to_string()))?;
        self.recompute();
        Ok(removed)
    }

    /// Apply a single-field edit to `target_id`
    pub fn update_field(&mut self, target_id: NodeId, edit: NodeEdit) -> BudgetResult<()> {
        let tree = find_tree_mut(&mut self.roots, target_id)
            .ok_or_else(|| BudgetError::item_not_found(target_id.to_string()))?;

        match edit {
            NodeEdit::Name(name) => tree.node.name = name,
            NodeEdit::Description(description) => tree.node.description = description,
            NodeEdit::FrequencyTarget(freq) => tree.node.frequency_target = freq,
            NodeEdit::FrequencyUnit(unit) => tree.node.frequency_unit = unit,
            NodeEdit::UnitAmount(amount) => tree.node.unit_amount = amount,
        }

        self.recompute();
        Ok(())
    }

    /// Re-derive codes, ordinals, levels, parent links, and totals
    pub(crate) fn recompute(&mut self) {
        assign_codes(&self.category_code, &mut self.roots);
        recompute_totals(&mut self.roots);
    }

    /// Replace the forest wholesale and canonicalize
    pub(crate) fn replace_forest(&mut self, roots: Vec<TreeNode>) {
        self.roots = roots;
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::super::for_each_node;
    use super::*;
    use std::collections::HashSet;

    fn model_with_root() -> (TreeModel, NodeId) {
        let mut model = TreeModel::new("A");
        let root = model.add_root();
        (model, root)
    }

    fn assert_invariants(model: &TreeModel) {
        let mut codes = HashSet::new();
        let mut per_parent: Vec<(Option<NodeId>, u32)> = Vec::new();
        for_each_node(model.roots(), &mut |n| {
            assert!(codes.insert(n.code.clone()), "duplicate code {}", n.code);
            assert!(n.level >= 1);
            per_parent.push((n.parent_id, n.ordinal));
        });

        // Ordinals are 1-based and contiguous within each sibling group
        let mut groups: std::collections::HashMap<Option<NodeId>, Vec<u32>> =
            std::collections::HashMap::new();
        for (parent, ordinal) in per_parent {
            groups.entry(parent).or_default().push(ordinal);
        }
        for ordinals in groups.values() {
            let mut sorted = ordinals.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (1..=ordinals.len() as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_add_child_twice() {
        let (mut model, root) = model_with_root();
        let first = model.add_child(root).unwrap();
        let second = model.add_child(root).unwrap();

        model
            .update_field(first, NodeEdit::FrequencyTarget(Some(2)))
            .unwrap();
        model
            .update_field(first, NodeEdit::UnitAmount(Some(Money::from_cents(100))))
            .unwrap();
        model
            .update_field(second, NodeEdit::FrequencyTarget(Some(3)))
            .unwrap();
        model
            .update_field(second, NodeEdit::UnitAmount(Some(Money::from_cents(100))))
            .unwrap();

        let root_tree = &model.roots()[0];
        assert_eq!(root_tree.children[0].node.code, "A.1");
        assert_eq!(root_tree.children[1].node.code, "A.2");
        assert_eq!(root_tree.children[0].node.level, 2);
        assert_eq!(root_tree.children[0].node.ordinal, 1);
        assert_eq!(root_tree.children[1].node.ordinal, 2);

        // Parent total is the sum of both children
        assert_eq!(
            root_tree.node.total_target,
            Some(Money::from_cents(200 + 300))
        );
        assert_invariants(&model);
    }

    #[test]
    fn test_two_roots_codes() {
        let mut model = TreeModel::new("B");
        model.add_root();
        model.add_root();

        assert_eq!(model.roots()[0].node.code, "B");
        assert_eq!(model.roots()[0].node.ordinal, 1);
        assert_eq!(model.roots()[1].node.code, "B.2");
        assert_eq!(model.roots()[1].node.ordinal, 2);
        assert_invariants(&model);
    }

    #[test]
    fn test_add_sibling_inserts_after_target() {
        let (mut model, root) = model_with_root();
        let first = model.add_child(root).unwrap();
        let _last = model.add_child(root).unwrap();

        let inserted = model.add_sibling(first).unwrap();

        let children = &model.roots()[0].children;
        assert_eq!(children.len(), 3);
        assert_eq!(children[1].node.id, inserted);
        assert_eq!(children[1].node.code, "A.2");
        assert_invariants(&model);
    }

    #[test]
    fn test_delete_removes_subtree_and_renumbers() {
        let (mut model, root) = model_with_root();
        let first = model.add_child(root).unwrap();
        let second = model.add_child(root).unwrap();
        let _grandchild = model.add_child(first).unwrap();

        model.delete(first).unwrap();

        let children = &model.roots()[0].children;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].node.id, second);
        assert_eq!(children[0].node.code, "A.1");
        assert_eq!(children[0].node.ordinal, 1);
        assert_invariants(&model);
    }

    #[test]
    fn test_update_field_rolls_up_ancestor_chain() {
        let (mut model, root) = model_with_root();
        let mid = model.add_child(root).unwrap();
        let deep = model.add_child(mid).unwrap();

        model
            .update_field(deep, NodeEdit::FrequencyTarget(Some(4)))
            .unwrap();
        model
            .update_field(deep, NodeEdit::UnitAmount(Some(Money::from_cents(2500))))
            .unwrap();

        assert_eq!(
            model.roots()[0].node.total_target,
            Some(Money::from_cents(10_000))
        );
        assert_eq!(
            model.roots()[0].children[0].node.total_target,
            Some(Money::from_cents(10_000))
        );
    }

    #[test]
    fn test_unknown_target_is_not_found() {
        let (mut model, _root) = model_with_root();
        let ghost = NodeId::fresh();

        assert!(model.add_child(ghost).unwrap_err().is_not_found());
        assert!(model.add_sibling(ghost).unwrap_err().is_not_found());
        assert!(model.delete(ghost).unwrap_err().is_not_found());
        assert!(model
            .update_field(ghost, NodeEdit::Name("x".into()))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_gaining_children_clears_leaf_inputs() {
        let (mut model, root) = model_with_root();
        model
            .update_field(root, NodeEdit::FrequencyTarget(Some(2)))
            .unwrap();
        model
            .update_field(root, NodeEdit::UnitAmount(Some(Money::from_cents(100))))
            .unwrap();

        model.add_child(root).unwrap();

        assert!(!model.roots()[0].node.has_direct_inputs());
        assert_invariants(&model);
    }
}
