//! User settings for budgetree
//!
//! Manages user preferences: the database location and the default values
//! the CLI falls back to when a flag is omitted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::BudgetreePaths;
use crate::error::BudgetError;

fn default_schema_version() -> u32 {
    1
}

/// User settings for budgetree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Overrides the default database location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_file: Option<PathBuf>,

    /// Default period used when `--period` is omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_period: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            database_file: None,
            default_period: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, creating the file with defaults if missing
    pub fn load_or_create(paths: &BudgetreePaths) -> Result<Self, BudgetError> {
        let path = paths.settings_file();

        if !path.exists() {
            let settings = Self::default();
            settings.save(paths)?;
            return Ok(settings);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            BudgetError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            BudgetError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Save settings to disk
    pub fn save(&self, paths: &BudgetreePaths) -> Result<(), BudgetError> {
        paths.ensure_directories()?;
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            BudgetError::Config(format!("Failed to write settings: {}", e))
        })
    }

    /// The database path, honoring the settings override
    pub fn database_file(&self, paths: &BudgetreePaths) -> PathBuf {
        self.database_file
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }
}
