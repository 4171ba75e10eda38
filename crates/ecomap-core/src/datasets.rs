//! The four static datasets and their loading.
//!
//! Datasets load independently and in any order. A failed load leaves that
//! store empty (or as it was) and never affects the others.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bounds::BoundsIndex;
use crate::config::DataFiles;
use crate::error::{DataError, DataResult};
use crate::formations::FormationLookup;
use crate::relations::RelationIndex;
use crate::stats::StatisticsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Statistics,
    Relations,
    Bounds,
    Formations,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Statistics,
        Dataset::Relations,
        Dataset::Bounds,
        Dataset::Formations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Statistics => "statistics",
            Self::Relations => "relations",
            Self::Bounds => "bounds",
            Self::Formations => "formations",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Statistics => "statistics.json",
            Self::Relations => "relations.json",
            Self::Bounds => "bounds.json",
            Self::Formations => "formations.json",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_end_matches(".json");
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(key))
            .ok_or_else(|| DataError::UnknownDataset(s.to_string()))
    }
}

/// Every store the dashboard derives from. Unloaded stores are empty.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub stats: StatisticsStore,
    pub relations: RelationIndex,
    pub bounds: BoundsIndex,
    pub formations: FormationLookup,
    loaded: [bool; 4],
}

impl Datasets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `json` into the store for `dataset`, replacing its contents.
    /// Returns the number of records. On error the store is left untouched.
    pub fn load(&mut self, dataset: Dataset, json: &str) -> DataResult<usize> {
        let parse = |source| DataError::Parse { dataset, source };
        let count = match dataset {
            Dataset::Statistics => {
                self.stats = StatisticsStore::from_json(json).map_err(parse)?;
                self.stats.len()
            }
            Dataset::Relations => {
                self.relations = RelationIndex::from_json(json).map_err(parse)?;
                self.relations.len()
            }
            Dataset::Bounds => {
                self.bounds = BoundsIndex::from_json(json).map_err(parse)?;
                self.bounds.len()
            }
            Dataset::Formations => {
                self.formations = FormationLookup::from_json(json).map_err(parse)?;
                self.formations.len()
            }
        };
        self.loaded[dataset as usize] = true;
        info!(%dataset, records = count, "dataset loaded");
        Ok(count)
    }

    pub fn is_loaded(&self, dataset: Dataset) -> bool {
        self.loaded[dataset as usize]
    }

    /// Read one dataset from `path`.
    pub fn load_file(&mut self, dataset: Dataset, path: &Path) -> DataResult<usize> {
        let json = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            dataset,
            path: path.to_path_buf(),
            source,
        })?;
        self.load(dataset, &json)
    }

    /// Load all four datasets from `dir`. Failures are collected, not fatal:
    /// the returned value holds whatever loaded.
    pub fn load_dir(dir: &Path, files: &DataFiles) -> (Self, Vec<DataError>) {
        let mut datasets = Self::new();
        let mut errors = Vec::new();
        for dataset in Dataset::ALL {
            let path = dir.join(files.file_name(dataset));
            if let Err(e) = datasets.load_file(dataset, &path) {
                warn!(%dataset, error = %e, "dataset failed to load");
                errors.push(e);
            }
        }
        (datasets, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"[
        {"id": "E1", "name": "Bosque", "total_has": 100, "protected_has": 10, "sp_net_has": 5,
         "pct_protected": 10, "pct_sp_Contribution": 5, "pct_total_potential": 15}
    ]"#;

    #[test]
    fn dataset_names_parse_loosely() {
        assert_eq!("Statistics".parse::<Dataset>().unwrap(), Dataset::Statistics);
        assert_eq!("bounds.json".parse::<Dataset>().unwrap(), Dataset::Bounds);
        assert!(matches!("res".parse::<Dataset>(), Err(DataError::UnknownDataset(_))));
    }

    #[test]
    fn loads_independently_in_any_order() {
        let mut data = Datasets::new();
        assert_eq!(data.load(Dataset::Relations, r#"{"E1": {"aps": ["A"], "sps": null}}"#).unwrap(), 1);
        assert!(!data.is_loaded(Dataset::Statistics));
        assert_eq!(data.load(Dataset::Statistics, STATS).unwrap(), 1);
        assert!(data.is_loaded(Dataset::Statistics));
        assert_eq!(data.relations.aps_for("E1"), ["A"]);
    }

    #[test]
    fn failed_load_leaves_store_untouched() {
        let mut data = Datasets::new();
        data.load(Dataset::Statistics, STATS).unwrap();
        let err = data.load(Dataset::Statistics, "{not json").unwrap_err();
        assert_eq!(err.dataset(), Some(Dataset::Statistics));
        assert_eq!(data.stats.len(), 1);
        assert!(data.formations.is_empty());
    }

    #[test]
    fn missing_directory_reports_every_dataset() {
        let (data, errors) = Datasets::load_dir(Path::new("/nonexistent/ecomap"), &DataFiles::default());
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| matches!(e, DataError::Io { .. })));
        assert!(data.stats.is_empty());
    }
}
