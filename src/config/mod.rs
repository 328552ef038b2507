//! Configuration module for budgetree
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::BudgetreePaths;
pub use settings::Settings;
