//! Budget tree CLI commands
//!
//! Implements the list/show/save/move/delete commands over one store. Every
//! outcome is reported as a single message; service errors bubble up to the
//! top-level handler unchanged.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_node_details, format_tree, format_tree_table};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetScope, CategoryId, ItemId, PeriodId};
use crate::services::{MoveService, QueryService, SyncService};
use crate::storage::Store;
use crate::tree::TreeNode;

/// Budget tree subcommands
#[derive(Subcommand)]
pub enum TreeCommands {
    /// List a period's budget items
    List {
        /// Period id (falls back to the configured default period)
        #[arg(short, long, env = "BUDGETREE_PERIOD")]
        period: Option<i64>,
        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<i64>,
        /// Render as a flat table instead of an indented tree
        #[arg(long)]
        table: bool,
    },

    /// Show one budget item with its scope context
    Show {
        /// Item id (e.g. "42" or "itm-42")
        item: String,
    },

    /// Replace a scope's tree with a draft forest, atomically
    Save {
        /// Period id
        #[arg(short, long)]
        period: i64,
        /// Category id
        #[arg(short, long)]
        category: i64,
        /// Path to the draft JSON (an array of nested nodes)
        draft: PathBuf,
    },

    /// Move an item (and its subtree) to a new parent and position
    Move {
        /// Item id
        item: String,
        /// New parent item id; omit to make the item a root
        #[arg(short, long)]
        parent: Option<String>,
        /// Position among the new siblings (0-based)
        #[arg(short, long, default_value = "0")]
        index: usize,
    },

    /// Delete a childless item with no realization transactions
    Delete {
        /// Item id
        item: String,
    },
}

fn parse_item_id(s: &str) -> BudgetResult<ItemId> {
    s.parse()
        .map_err(|_| BudgetError::Validation(format!("not a valid item id: {}", s)))
}

/// Execute a budget tree command against the store
pub fn handle_tree_command(
    store: &mut Store,
    settings: &Settings,
    cmd: TreeCommands,
) -> BudgetResult<()> {
    match cmd {
        TreeCommands::List {
            period,
            category,
            table,
        } => {
            let period = period.or(settings.default_period).ok_or_else(|| {
                BudgetError::Validation(
                    "no period given; pass --period or set default_period".into(),
                )
            })?;
            let rows = QueryService::new(store)
                .fetch_tree(PeriodId::new(period), category.map(CategoryId::new))?;
            if table {
                println!("{}", format_tree_table(&rows));
            } else {
                print!("{}", format_tree(&rows));
            }
        }

        TreeCommands::Show { item } => {
            let details = QueryService::new(store).fetch_node(parse_item_id(&item)?)?;
            print!("{}", format_node_details(&details));
        }

        TreeCommands::Save {
            period,
            category,
            draft,
        } => {
            let contents = std::fs::read_to_string(&draft).map_err(|e| {
                BudgetError::Io(format!("Failed to read {}: {}", draft.display(), e))
            })?;
            let forest: Vec<TreeNode> = serde_json::from_str(&contents)?;

            let scope = BudgetScope::new(PeriodId::new(period), CategoryId::new(category));
            let summary = SyncService::new(store).save_tree(scope, forest)?;
            println!("{}", summary.message());
        }

        TreeCommands::Move {
            item,
            parent,
            index,
        } => {
            let item_id = parse_item_id(&item)?;
            let parent_id = parent.as_deref().map(parse_item_id).transpose()?;
            let summary = MoveService::new(store).move_node(item_id, parent_id, index)?;
            println!("{}", summary.message());
        }

        TreeCommands::Delete { item } => {
            let item_id = parse_item_id(&item)?;
            let renumbered = QueryService::new(store).delete_node(item_id)?;
            println!("Deleted {} ({} siblings renumbered)", item_id, renumbered);
        }
    }

    Ok(())
}
