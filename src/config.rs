//! Application configuration.
//!
//! Settings come from an optional JSON file; command line flags override
//! individual values afterwards.

use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Rows shown by a data preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory searched for local `.csv` files.
    pub csv_directory: PathBuf,
    pub preview_rows: usize,
    pub render: RenderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_directory: PathBuf::from("Data"),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    /// Load a configuration file, falling back to defaults for absent keys.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_csv_directory(mut self, directory: Option<PathBuf>) -> Self {
        if let Some(directory) = directory {
            self.csv_directory = directory;
        }
        self
    }
}
