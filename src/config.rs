//! Configuration for the settings tree and the CSV input
//!
//! [`GridConfig`] carries the fixed strings the reconciliation rules rely on.
//! It is plain serde data so applications can ship it as JSON.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tree-wide constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Joins child values into a parent's composed text. Default: "; "
    pub separator: String,

    /// Value held by parameter containers. Default: "<composed>"
    pub composed_marker: String,

    /// Fit method forced on instances that have bounds. Default: "trf"
    pub bounded_method: String,

    /// Identifier excluded from parameter extraction. Default: "x"
    pub independent_variable: String,

    /// Function-selector entry that opens the function editor. Default: "[new]"
    pub new_function_choice: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            separator: "; ".to_string(),
            composed_marker: "<composed>".to_string(),
            bounded_method: "trf".to_string(),
            independent_variable: "x".to_string(),
            new_function_choice: "[new]".to_string(),
        }
    }
}

impl GridConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// How the data table is split into columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvSettings {
    pub separator: String,
    pub decimal: String,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            decimal: ".".to_string(),
        }
    }
}

const SEPARATOR_LABEL: &str = "Seperator";
const DECIMAL_LABEL: &str = "Decimal";

impl CsvSettings {
    /// Parse the label/value line format. Unknown labels are ignored and
    /// missing ones keep their defaults.
    pub fn parse(text: &str) -> Self {
        let mut settings = Self::default();
        let lines: Vec<&str> = text.lines().collect();
        for pair in lines.chunks(2) {
            let [label, value] = pair else { break };
            if value.is_empty() {
                continue;
            }
            match *label {
                SEPARATOR_LABEL => settings.separator = value.to_string(),
                DECIMAL_LABEL => settings.decimal = value.to_string(),
                _ => {}
            }
        }
        settings
    }

    pub fn render(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            SEPARATOR_LABEL, self.separator, DECIMAL_LABEL, self.decimal
        )
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}
