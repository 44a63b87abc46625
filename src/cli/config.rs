//! Configuration file
//!
//! JSON, loaded once per invocation and validated before anything else runs.
//! Only `data_dir` is required.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ingest::SheetLayout;
use crate::observability::Severity;
use crate::schema::FieldRegistry;
use crate::storage::StoreLayout;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// Field catalogue replacing the built-in one
    #[serde(default)]
    pub schema_file: Option<String>,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_data_sheet")]
    pub data_sheet: String,

    #[serde(default = "default_metadata_sheet")]
    pub metadata_sheet: String,

    /// 1-based row holding field names in workbook templates (default 3)
    #[serde(default = "default_header_row")]
    pub header_row: usize,

    /// Copy parent metadata to children during propagation (default true)
    #[serde(default = "default_propagate_metadata")]
    pub propagate_metadata: bool,

    /// Fields stored as native record attributes
    #[serde(default)]
    pub native_columns: Option<Vec<String>>,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_data_sheet() -> String {
    "Data".to_string()
}
fn default_metadata_sheet() -> String {
    "Metadata".to_string()
}
fn default_header_row() -> usize {
    3
}
fn default_propagate_metadata() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        self.log_severity()?;

        if self.header_row == 0 {
            return Err(CliError::config_error("header_row is 1-based and must be > 0"));
        }

        if self.data_sheet.trim().is_empty() || self.metadata_sheet.trim().is_empty() {
            return Err(CliError::config_error("sheet names must not be empty"));
        }

        if let Some(columns) = &self.native_columns {
            if columns.iter().any(|c| c.trim().is_empty()) {
                return Err(CliError::config_error("native_columns contains an empty name"));
            }
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn log_severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn sheet_layout(&self) -> SheetLayout {
        SheetLayout {
            data_sheet: self.data_sheet.clone(),
            metadata_sheet: self.metadata_sheet.clone(),
            header_row: self.header_row,
        }
    }

    pub fn store_layout(&self) -> StoreLayout {
        match &self.native_columns {
            Some(columns) => StoreLayout::new(columns.iter().map(String::as_str)),
            None => StoreLayout::default(),
        }
    }

    /// The configured field catalogue, or the built-in one
    pub fn registry(&self) -> CliResult<FieldRegistry> {
        let registry = match &self.schema_file {
            Some(file) => FieldRegistry::load(Path::new(file))?,
            None => FieldRegistry::builtin()?,
        };
        Ok(registry)
    }
}
