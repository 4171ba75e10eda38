//! Dashboard configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commands::FitOptions;
use crate::datasets::Dataset;
use crate::error::{DataError, DataResult};
use crate::resolver::ResolverOptions;

/// File names of the four datasets, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub statistics: String,
    pub relations: String,
    pub bounds: String,
    pub formations: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            statistics: Dataset::Statistics.default_file_name().into(),
            relations: Dataset::Relations.default_file_name().into(),
            bounds: Dataset::Bounds.default_file_name().into(),
            formations: Dataset::Formations.default_file_name().into(),
        }
    }
}

impl DataFiles {
    pub fn file_name(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Statistics => &self.statistics,
            Dataset::Relations => &self.relations,
            Dataset::Bounds => &self.bounds,
            Dataset::Formations => &self.formations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub files: DataFiles,
    /// Coverage target in percent, 0–100.
    pub default_threshold: f64,
    pub fit: FitOptions,
    pub resolver: ResolverOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            files: DataFiles::default(),
            default_threshold: 30.0,
            fit: FitOptions::default(),
            resolver: ResolverOptions::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> DataResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| DataError::Config(e.to_string()))?;
        if !(0.0..=100.0).contains(&config.default_threshold) {
            return Err(DataError::Config(format!(
                "default_threshold must be within 0..=100, got {}",
                config.default_threshold
            )));
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> DataResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default() {
        assert_eq!(DashboardConfig::from_json_str("{}").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = DashboardConfig::from_json_str(
            r#"{
                "default_threshold": 17,
                "fit": {"maxZoom": 9},
                "files": {"bounds": "bbox.json"},
                "resolver": {"no_match_label": "Ninguno", "number_format": {"max_fraction_digits": 1}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.default_threshold, 17.0);
        assert_eq!(config.fit.max_zoom, 9.0);
        assert_eq!(config.fit.padding, 50);
        assert_eq!(config.files.file_name(Dataset::Bounds), "bbox.json");
        assert_eq!(config.files.file_name(Dataset::Statistics), "statistics.json");
        assert_eq!(config.resolver.no_match_label, "Ninguno");
        assert_eq!(config.resolver.number_format.max_fraction_digits, 1);
        assert_eq!(config.resolver.number_format.decimal_separator, ',');
        assert_eq!(config.resolver.sentinel, "NO_MATCH");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(DashboardConfig::from_json_str("[1, 2]"), Err(DataError::Config(_))));
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"default_threshold": 140}"#),
            Err(DataError::Config(_))
        ));
        assert!(DashboardConfig::from_path(Path::new("/nonexistent/ecomap.json")).is_err());
    }
}
