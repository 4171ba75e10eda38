//! Statistics store: per-ecosystem precomputed coverage metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::de::null_as_default;

/// Coverage metrics for one ecosystem, as published in `statistics.json`.
///
/// Hectare and percentage fields tolerate `null` or absence and read as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemStat {
    /// Ecosystem code (`CODIGO` in the geometry layers).
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_has: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protected_has: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sp_net_has: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pct_protected: f64,
    #[serde(
        rename = "pct_sp_Contribution",
        default,
        deserialize_with = "null_as_default"
    )]
    pub pct_sp_contribution: f64,
    /// Should equal `pct_protected + pct_sp_Contribution`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pct_total_potential: f64,
}

impl EcosystemStat {
    /// Unprotected share, `100 - AP - SP`, clamped at 0.
    pub fn pct_gap(&self) -> f64 {
        (100.0 - (self.pct_protected + self.pct_sp_contribution)).max(0.0)
    }

    /// Whether the combined AP + SP coverage reaches `threshold`.
    pub fn meets(&self, threshold: f64) -> bool {
        self.pct_total_potential >= threshold
    }
}

/// All ecosystem records in load order, indexed by code.
#[derive(Debug, Clone, Default)]
pub struct StatisticsStore {
    records: Vec<EcosystemStat>,
    by_id: HashMap<String, usize>,
}

impl StatisticsStore {
    /// Build the store. Codes are unique: on a duplicate the first record wins.
    pub fn from_records(records: Vec<EcosystemStat>) -> Self {
        let mut kept = Vec::with_capacity(records.len());
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            if by_id.contains_key(&record.id) {
                warn!(id = %record.id, "duplicate ecosystem code in statistics, keeping first");
                continue;
            }
            by_id.insert(record.id.clone(), kept.len());
            kept.push(record);
        }
        Self { records: kept, by_id }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<EcosystemStat> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[EcosystemStat] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&EcosystemStat> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
