//! Budget tree display formatting
//!
//! Formats the flat tree listing as a table and as an indented tree view.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Money;
use crate::services::{NodeDetails, TreeRow};

#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Freq")]
    frequency: String,
    #[tabled(rename = "Unit amount")]
    unit_amount: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Realized")]
    realized: String,
}

fn money_cell(amount: Option<Money>) -> String {
    amount.map(|m| m.to_string()).unwrap_or_else(|| "-".into())
}

/// Format the flat listing as a table
pub fn format_tree_table(rows: &[TreeRow]) -> String {
    if rows.is_empty() {
        return "No budget items found.".to_string();
    }

    let listing: Vec<ListingRow> = rows
        .iter()
        .map(|row| ListingRow {
            code: row.code.clone(),
            name: row.name.clone(),
            frequency: match (&row.frequency_target, &row.frequency_unit) {
                (Some(freq), Some(unit)) => format!("{freq}/{unit}"),
                (Some(freq), None) => freq.to_string(),
                _ => "-".into(),
            },
            unit_amount: money_cell(row.unit_amount),
            target: money_cell(row.total_target),
            realized: format!("{} ({})", row.realized_amount, row.realized_count),
        })
        .collect();

    Table::new(listing).with(Style::sharp()).to_string()
}

/// Format the listing as an indented tree
///
/// Rows arrive in (category code, level, ordinal) order, so children are
/// grouped under their parent by walking the parent links.
pub fn format_tree(rows: &[TreeRow]) -> String {
    if rows.is_empty() {
        return "No budget items found.".to_string();
    }

    let mut output = String::new();
    let roots: Vec<&TreeRow> = rows.iter().filter(|r| r.parent_id.is_none()).collect();
    for root in roots {
        render_subtree(rows, root, 0, true, &mut output);
    }
    output
}

fn render_subtree(rows: &[TreeRow], row: &TreeRow, depth: usize, is_last: bool, output: &mut String) {
    let target = money_cell(row.total_target);
    if depth == 0 {
        output.push_str(&format!("{} {} (target: {})\n", row.code, row.name, target));
    } else {
        let indent = "  ".repeat(depth - 1);
        let prefix = if is_last { "└── " } else { "├── " };
        output.push_str(&format!(
            "  {}{}{} {} (target: {})\n",
            indent, prefix, row.code, row.name, target
        ));
    }

    let mut children: Vec<&TreeRow> = rows
        .iter()
        .filter(|r| r.parent_id == Some(row.id))
        .collect();
    children.sort_by_key(|r| r.ordinal);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_subtree(rows, child, depth + 1, i + 1 == count, output);
    }
}

/// Format a single node with its scope context
pub fn format_node_details(details: &NodeDetails) -> String {
    let item = &details.item;
    let mut output = String::new();

    output.push_str(&format!("{} {}\n", item.code, item.name));
    if !item.description.is_empty() {
        output.push_str(&format!("  {}\n", item.description));
    }
    output.push_str(&format!(
        "  Scope: {} / {} ({})\n",
        details.period_id, details.category.code, details.category.name
    ));
    output.push_str(&format!(
        "  Level {} · position {}\n",
        item.level, item.ordinal
    ));

    if let (Some(freq), Some(unit_amount)) = (item.frequency_target, item.unit_amount) {
        let unit = item.frequency_unit.as_deref().unwrap_or("times");
        output.push_str(&format!("  Inputs: {freq} {unit} × {unit_amount}\n"));
    }
    output.push_str(&format!("  Target: {}\n", money_cell(item.total_target)));
    output.push_str(&format!(
        "  Realized: {} across {} transactions\n",
        item.realized_amount, item.realized_count
    ));
    if item.has_children {
        output.push_str("  Has children\n");
    }

    output
}
