//! Report configuration

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default seed for the outer cross-validation fold assignment
pub const DEFAULT_OUTER_CV_SEED: u64 = 42;

/// Configuration shared by the multi-model reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Dependent variable
    pub y_var: String,
    /// Independent variables, in model input order
    pub x_vars: Vec<String>,
    /// Number of outer cross-validation folds (None disables cross-validation)
    #[serde(default)]
    pub outer_cv: Option<usize>,
    /// Seed for the shuffled outer fold assignment
    #[serde(default = "default_outer_cv_seed")]
    pub outer_cv_seed: u64,
    /// Emit fitting notices
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

fn default_outer_cv_seed() -> u64 {
    DEFAULT_OUTER_CV_SEED
}

fn default_verbose() -> bool {
    true
}

impl ReportConfig {
    /// Create a new configuration for the given target and predictors
    pub fn new(y_var: impl Into<String>, x_vars: &[&str]) -> Self {
        Self {
            y_var: y_var.into(),
            x_vars: x_vars.iter().map(|s| s.to_string()).collect(),
            outer_cv: None,
            outer_cv_seed: DEFAULT_OUTER_CV_SEED,
            verbose: true,
        }
    }

    /// Enable outer k-fold cross-validation
    pub fn with_outer_cv(mut self, n_folds: usize) -> Self {
        self.outer_cv = Some(n_folds);
        self
    }

    /// Set the outer fold seed
    pub fn with_outer_cv_seed(mut self, seed: u64) -> Self {
        self.outer_cv_seed = seed;
        self
    }

    /// Toggle fitting notices
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the configuration for obvious mistakes
    pub fn validate(&self) -> Result<()> {
        if self.y_var.is_empty() {
            return Err(ReportError::ValidationError(
                "y_var must not be empty".to_string(),
            ));
        }
        if self.x_vars.is_empty() {
            return Err(ReportError::ValidationError(
                "x_vars must contain at least one variable".to_string(),
            ));
        }
        if self.x_vars.iter().any(|x| x == &self.y_var) {
            return Err(ReportError::ValidationError(format!(
                "y_var '{}' cannot also be an independent variable",
                self.y_var
            )));
        }
        if let Some(n_folds) = self.outer_cv {
            if n_folds < 2 {
                return Err(ReportError::InvalidParameter {
                    name: "outer_cv".to_string(),
                    value: n_folds.to_string(),
                    reason: "must be at least 2".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::new("y", &["a", "b"]);
        assert_eq!(config.outer_cv, None);
        assert_eq!(config.outer_cv_seed, 42);
        assert!(config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_target_in_predictors() {
        let config = ReportConfig::new("y", &["a", "y"]);
        assert!(matches!(
            config.validate(),
            Err(ReportError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_single_fold() {
        let config = ReportConfig::new("y", &["a"]).with_outer_cv(1);
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"y_var": "y", "x_vars": ["a"]}"#).unwrap();
        assert_eq!(config.outer_cv_seed, DEFAULT_OUTER_CV_SEED);
        assert!(config.verbose);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = ReportConfig::new("y", &["a", "b"])
            .with_outer_cv(5)
            .with_verbose(false);
        config.save_json(&path).unwrap();

        let loaded = ReportConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
