//! Budget item rows and forest reconstruction
//!
//! Maps `budget_items` rows to and from the in-memory tree, and carries the
//! structural-diff writer shared by the move engine and delete renumbering.

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;

use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetScope, CategoryId, ItemId, Money, NodeId, PeriodId};
use crate::tree::{for_each_node, TreeNode};

/// One persisted budget item row
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub id: ItemId,
    pub scope: BudgetScope,
    pub code: String,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub ordinal: u32,
    pub parent_id: Option<ItemId>,
    pub frequency_target: Option<i64>,
    pub frequency_unit: Option<String>,
    pub unit_amount: Option<Money>,
    pub total_target: Option<Money>,
}

const ITEM_COLUMNS: &str = "id, period_id, category_id, code, name, description,
    level, ordinal, parent_id, frequency_target, frequency_unit, unit_amount, total_target";

fn map_item_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: ItemId::new(row.get(0)?),
        scope: BudgetScope::new(
            PeriodId::new(row.get(1)?),
            CategoryId::new(row.get(2)?),
        ),
        code: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        level: row.get(6)?,
        ordinal: row.get(7)?,
        parent_id: row.get::<_, Option<i64>>(8)?.map(ItemId::new),
        frequency_target: row.get(9)?,
        frequency_unit: row.get(10)?,
        unit_amount: row.get::<_, Option<i64>>(11)?.map(Money::from_cents),
        total_target: row.get::<_, Option<i64>>(12)?.map(Money::from_cents),
    })
}

impl ItemRow {
    /// Convert into an in-memory node (realized aggregates start at zero)
    pub fn into_node(self) -> crate::models::BudgetNode {
        crate::models::BudgetNode {
            id: NodeId::Persisted(self.id),
            code: self.code,
            name: self.name,
            description: self.description,
            level: self.level,
            ordinal: self.ordinal,
            parent_id: self.parent_id.map(NodeId::Persisted),
            frequency_target: self.frequency_target,
            frequency_unit: self.frequency_unit,
            unit_amount: self.unit_amount,
            total_target: self.total_target,
            realized_amount: Money::zero(),
            realized_count: 0,
        }
    }
}

/// Fetch a single item row by id
pub fn get(conn: &Connection, id: ItemId) -> BudgetResult<Option<ItemRow>> {
    let result = conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM budget_items WHERE id = ?1"),
        rusqlite::params![id.raw()],
        map_item_row,
    );
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch every row in a scope, siblings ordered by their current ordinal
pub fn items_in_scope(conn: &Connection, scope: BudgetScope) -> BudgetResult<Vec<ItemRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ITEM_COLUMNS} FROM budget_items
         WHERE period_id = ?1 AND category_id = ?2
         ORDER BY level, ordinal"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![scope.period_id.raw(), scope.category_id.raw()],
            map_item_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// The persisted ids currently present in a scope
pub fn scope_ids(conn: &Connection, scope: BudgetScope) -> BudgetResult<HashSet<ItemId>> {
    let mut stmt =
        conn.prepare("SELECT id FROM budget_items WHERE period_id = ?1 AND category_id = ?2")?;
    let ids = stmt
        .query_map(
            rusqlite::params![scope.period_id.raw(), scope.category_id.raw()],
            |row| row.get::<_, i64>(0),
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids.into_iter().map(ItemId::new).collect())
}

/// Number of direct children of `id`
pub fn count_children(conn: &Connection, id: ItemId) -> BudgetResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM budget_items WHERE parent_id = ?1",
        rusqlite::params![id.raw()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Delete the given rows
pub fn delete_ids(conn: &Connection, ids: &[ItemId]) -> BudgetResult<usize> {
    let mut deleted = 0;
    let mut stmt = conn.prepare("DELETE FROM budget_items WHERE id = ?1")?;
    for id in ids {
        deleted += stmt.execute(rusqlite::params![id.raw()])?;
    }
    Ok(deleted)
}

/// Reconstruct the forest from scope rows
///
/// Attaches children by parent_id and orders siblings by their persisted
/// ordinal. Rejects cyclic or dangling parent chains: every row must be
/// reachable from a root, each id visited exactly once.
pub fn build_forest(rows: Vec<ItemRow>) -> BudgetResult<Vec<TreeNode>> {
    let total = rows.len();
    let known: HashSet<ItemId> = rows.iter().map(|r| r.id).collect();

    let mut roots: Vec<ItemRow> = Vec::new();
    let mut children: HashMap<ItemId, Vec<ItemRow>> = HashMap::new();
    for row in rows {
        match row.parent_id {
            None => roots.push(row),
            Some(parent) => {
                if !known.contains(&parent) {
                    return Err(BudgetError::Structural(format!(
                        "item {} references missing parent {}",
                        row.id, parent
                    )));
                }
                children.entry(parent).or_default().push(row);
            }
        }
    }

    roots.sort_by_key(|r| r.ordinal);
    for group in children.values_mut() {
        group.sort_by_key(|r| r.ordinal);
    }

    let mut visited: HashSet<ItemId> = HashSet::new();
    let forest = roots
        .into_iter()
        .map(|row| attach_children(row, &mut children, &mut visited))
        .collect::<BudgetResult<Vec<_>>>()?;

    // Rows never reached from a root sit on a parent cycle.
    if visited.len() != total {
        return Err(BudgetError::Structural(format!(
            "{} items unreachable from any root (cyclic parent chain)",
            total - visited.len()
        )));
    }

    Ok(forest)
}

fn attach_children(
    row: ItemRow,
    children: &mut HashMap<ItemId, Vec<ItemRow>>,
    visited: &mut HashSet<ItemId>,
) -> BudgetResult<TreeNode> {
    if !visited.insert(row.id) {
        return Err(BudgetError::Structural(format!(
            "item {} appears twice in the tree",
            row.id
        )));
    }

    let own_children = children.remove(&row.id).unwrap_or_default();
    let subtrees = own_children
        .into_iter()
        .map(|child| attach_children(child, children, visited))
        .collect::<BudgetResult<Vec<_>>>()?;

    Ok(TreeNode {
        node: row.into_node(),
        children: subtrees,
    })
}

/// Structural fields diffed by the move engine
pub type StructuralSnapshot = HashMap<ItemId, (String, u32, u32, Option<ItemId>)>;

/// Snapshot (code, level, ordinal, parent) per row
pub fn structural_snapshot(rows: &[ItemRow]) -> StructuralSnapshot {
    rows.iter()
        .map(|r| (r.id, (r.code.clone(), r.level, r.ordinal, r.parent_id)))
        .collect()
}

/// Persist the structural fields that changed relative to `before`
///
/// Only rows whose (code, level, ordinal, parent) differ are written. The
/// changed set first receives placeholder codes in one bulk statement so
/// sibling swaps never trip the scoped unique index mid-rewrite.
pub fn write_structural_changes(
    conn: &Connection,
    before: &StructuralSnapshot,
    forest: &[TreeNode],
) -> BudgetResult<usize> {
    let mut changed: Vec<(ItemId, &crate::models::BudgetNode)> = Vec::new();
    let mut walk_err = None;
    for_each_node(forest, &mut |node| {
        let Some(id) = node.id.as_persisted() else {
            walk_err = Some(BudgetError::Validation(format!(
                "item {} is not persisted; a full save is required",
                node.id
            )));
            return;
        };
        let parent = node.parent_id.and_then(|p| p.as_persisted());
        match before.get(&id) {
            Some((code, level, ordinal, old_parent)) => {
                if *code != node.code
                    || *level != node.level
                    || *ordinal != node.ordinal
                    || *old_parent != parent
                {
                    changed.push((id, node));
                }
            }
            None => changed.push((id, node)),
        }
    });
    if let Some(err) = walk_err {
        return Err(err);
    }

    if changed.is_empty() {
        return Ok(0);
    }

    // Phase one: release every code about to move, in a single statement.
    let placeholders = std::iter::repeat("?")
        .take(changed.len())
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute(
        &format!("UPDATE budget_items SET code = '#' || id WHERE id IN ({placeholders})"),
        rusqlite::params_from_iter(changed.iter().map(|(id, _)| id.raw())),
    )?;

    // Phase two: canonical values, parents before children (document order).
    let now = chrono::Utc::now().timestamp();
    let mut stmt = conn.prepare(
        "UPDATE budget_items
         SET code = ?1, level = ?2, ordinal = ?3, parent_id = ?4, updated_at = ?5
         WHERE id = ?6",
    )?;
    for (id, node) in &changed {
        stmt.execute(rusqlite::params![
            node.code,
            node.level,
            node.ordinal,
            node.parent_id.and_then(|p| p.as_persisted()).map(|p| p.raw()),
            now,
            id.raw(),
        ])?;
    }

    Ok(changed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, parent: Option<i64>, ordinal: u32, level: u32, code: &str) -> ItemRow {
        ItemRow {
            id: ItemId::new(id),
            scope: BudgetScope::new(PeriodId::new(1), CategoryId::new(1)),
            code: code.to_string(),
            name: format!("item {id}"),
            description: String::new(),
            level,
            ordinal,
            parent_id: parent.map(ItemId::new),
            frequency_target: None,
            frequency_unit: None,
            unit_amount: None,
            total_target: None,
        }
    }

    #[test]
    fn test_build_forest_orders_siblings_by_ordinal() {
        let rows = vec![
            row(3, Some(1), 2, 2, "A.2"),
            row(1, None, 1, 1, "A"),
            row(2, Some(1), 1, 2, "A.1"),
        ];
        let forest = build_forest(rows).unwrap();

        assert_eq!(forest.len(), 1);
        let children = &forest[0].children;
        assert_eq!(children[0].node.code, "A.1");
        assert_eq!(children[1].node.code, "A.2");
    }

    #[test]
    fn test_build_forest_rejects_missing_parent() {
        let rows = vec![row(1, None, 1, 1, "A"), row(2, Some(99), 1, 2, "A.1")];
        let err = build_forest(rows).unwrap_err();
        assert!(matches!(err, BudgetError::Structural(_)));
    }

    #[test]
    fn test_build_forest_rejects_cycle() {
        // 2 and 3 reference each other; neither is reachable from a root.
        let rows = vec![
            row(1, None, 1, 1, "A"),
            row(2, Some(3), 1, 2, "A.1"),
            row(3, Some(2), 1, 2, "A.2"),
        ];
        let err = build_forest(rows).unwrap_err();
        assert!(matches!(err, BudgetError::Structural(_)));
    }

    #[test]
    fn test_structural_snapshot_roundtrip() {
        let rows = vec![row(1, None, 1, 1, "A"), row(2, Some(1), 1, 2, "A.1")];
        let snapshot = structural_snapshot(&rows);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot[&ItemId::new(2)],
            ("A.1".to_string(), 2, 1, Some(ItemId::new(1)))
        );
    }
}
