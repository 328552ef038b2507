//! Display formatting for terminal output
//!
//! Provides utilities for formatting budget trees and nodes for terminal
//! display, including tables and tree views.

pub mod tree;

pub use tree::{format_node_details, format_tree, format_tree_table};
