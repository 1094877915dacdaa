use std::collections::HashMap;

use serde::Deserialize;

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub datasets: HashMap<String, DatasetRules>,
}

// ---------------------------------------------------------------------------
// Dataset rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRules {
    /// Glob matched against file names in the raw data directory.
    pub file_pattern: String,
    #[serde(default)]
    pub required_columns: Vec<ColumnRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnRule {
    pub name: String,
    #[serde(default)]
    pub checks: Vec<Check>,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// A column check with its bound as a typed parameter. Config files spell
/// these as `min_<bound>` / `max_<bound>` tokens; anything else is rejected
/// at load time rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Check {
    Min(i64),
    Max(i64),
}

impl Check {
    /// Whether an integer value violates this check.
    pub fn flags(&self, value: i64) -> bool {
        match self {
            Self::Min(bound) => value < *bound,
            Self::Max(bound) => value > *bound,
        }
    }

    /// The reason string recorded on a violating record.
    pub fn reason(&self, column: &str) -> String {
        match self {
            Self::Min(bound) => format!("{column} < {bound}"),
            Self::Max(bound) => format!("{column} > {bound}"),
        }
    }
}

impl TryFrom<String> for Check {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        let parsed = token
            .strip_prefix("min_")
            .map(|rest| rest.parse().map(Check::Min))
            .or_else(|| token.strip_prefix("max_").map(|rest| rest.parse().map(Check::Max)));

        match parsed {
            Some(Ok(check)) => Ok(check),
            _ => Err(format!(
                "unknown check token \"{token}\" (expected min_<bound> or max_<bound>)"
            )),
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Min(bound) => write!(f, "min_{bound}"),
            Self::Max(bound) => write!(f, "max_{bound}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| PipelineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.datasets.is_empty() {
            return Err(PipelineError::ConfigValidation(
                "at least one dataset is required".into(),
            ));
        }

        for (dataset, rules) in &self.datasets {
            if rules.file_pattern.is_empty() {
                return Err(PipelineError::ConfigValidation(format!(
                    "dataset '{dataset}': file_pattern must not be empty"
                )));
            }
            for column in &rules.required_columns {
                if column.name.is_empty() {
                    return Err(PipelineError::ConfigValidation(format!(
                        "dataset '{dataset}': column name must not be empty"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
