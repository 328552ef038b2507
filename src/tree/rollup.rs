//! Target amount rollups
//!
//! Leaf nodes derive their total from frequency × unit amount; every other
//! node derives its total from its children, computed bottom-up. Nodes that
//! have children carry no direct numeric inputs, so gaining a child clears
//! whatever inputs the node had as a leaf.

use super::TreeNode;
use crate::models::Money;

/// Recompute `total_target` for every node in the forest
pub fn recompute_totals(forest: &mut [TreeNode]) {
    for tree in forest {
        recompute_node(tree);
    }
}

fn recompute_node(tree: &mut TreeNode) -> Option<Money> {
    if tree.children.is_empty() {
        tree.node.total_target = match (tree.node.frequency_target, tree.node.unit_amount) {
            (Some(freq), Some(unit)) => Some(unit.times(freq)),
            _ => None,
        };
    } else {
        tree.node.clear_direct_inputs();
        let sum: Money = tree
            .children
            .iter_mut()
            .map(|child| recompute_node(child).unwrap_or_else(Money::zero))
            .sum();
        tree.node.total_target = Some(sum);
    }
    tree.node.total_target
}

#[cfg(test)]
mod tests {
    use super::super::testutil::{branch, leaf};
    use super::*;

    fn priced_leaf(name: &str, freq: i64, unit_cents: i64) -> TreeNode {
        let mut tree = leaf(name);
        tree.node.frequency_target = Some(freq);
        tree.node.unit_amount = Some(Money::from_cents(unit_cents));
        tree
    }

    #[test]
    fn test_leaf_total_is_frequency_times_unit() {
        let mut forest = vec![priced_leaf("x", 12, 5000)];
        recompute_totals(&mut forest);
        assert_eq!(forest[0].node.total_target, Some(Money::from_cents(60_000)));
    }

    #[test]
    fn test_leaf_total_null_when_input_missing() {
        let mut incomplete = leaf("x");
        incomplete.node.frequency_target = Some(4);
        let mut forest = vec![incomplete];

        recompute_totals(&mut forest);
        assert_eq!(forest[0].node.total_target, None);
    }

    #[test]
    fn test_parent_sums_children() {
        let mut forest = vec![branch(
            "parent",
            vec![priced_leaf("a", 2, 100), priced_leaf("b", 3, 100)],
        )];
        recompute_totals(&mut forest);

        assert_eq!(forest[0].node.total_target, Some(Money::from_cents(500)));
    }

    #[test]
    fn test_parent_sums_through_levels() {
        let mut forest = vec![branch(
            "top",
            vec![branch(
                "mid",
                vec![priced_leaf("a", 1, 250), priced_leaf("b", 1, 750)],
            )],
        )];
        recompute_totals(&mut forest);

        assert_eq!(forest[0].node.total_target, Some(Money::from_cents(1000)));
        assert_eq!(
            forest[0].children[0].node.total_target,
            Some(Money::from_cents(1000))
        );
    }

    #[test]
    fn test_null_child_counts_as_zero_in_sum() {
        let mut forest = vec![branch("parent", vec![priced_leaf("a", 2, 100), leaf("b")])];
        recompute_totals(&mut forest);

        assert_eq!(forest[0].node.total_target, Some(Money::from_cents(200)));
        assert_eq!(forest[0].children[1].node.total_target, None);
    }

    #[test]
    fn test_parent_inputs_cleared() {
        let mut parent = priced_leaf("was-a-leaf", 9, 999);
        parent.children.push(priced_leaf("child", 1, 100));
        let mut forest = vec![parent];

        recompute_totals(&mut forest);

        assert!(!forest[0].node.has_direct_inputs());
        assert!(forest[0].node.frequency_unit.is_none());
        assert_eq!(forest[0].node.total_target, Some(Money::from_cents(100)));
    }
}
