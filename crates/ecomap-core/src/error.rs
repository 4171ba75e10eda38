//! Error types for dataset loading.
//!
//! Only loading can fail. Every derivation over the stores degrades to an
//! empty or zero result instead of returning an error.

use std::path::PathBuf;

use thiserror::Error;

use crate::datasets::Dataset;

#[derive(Debug, Error)]
pub enum DataError {
    /// The payload was fetched but is not valid for its dataset.
    #[error("failed to parse {dataset}: {source}")]
    Parse {
        dataset: Dataset,
        #[source]
        source: serde_json::Error,
    },

    /// The file backing a dataset could not be read.
    #[error("failed to read {dataset} from {}: {source}", path.display())]
    Io {
        dataset: Dataset,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dataset name coming from the host is not one of the four known ones.
    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),

    /// The configuration file is unreadable or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DataError {
    /// Dataset the failure belongs to, when there is one.
    pub fn dataset(&self) -> Option<Dataset> {
        match self {
            Self::Parse { dataset, .. } | Self::Io { dataset, .. } => Some(*dataset),
            Self::UnknownDataset(_) | Self::Config(_) => None,
        }
    }
}

/// Result type for loading operations.
pub type DataResult<T> = Result<T, DataError>;
