//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod tree;

pub use tree::{handle_tree_command, TreeCommands};
