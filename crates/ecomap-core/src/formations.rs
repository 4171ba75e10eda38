//! Formation catalog and code → name resolution.
//!
//! Names are a presentation aid only; the code stays the identity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;
use crate::text::natural_cmp;

/// One row of `formations.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub codigo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formacion: String,
    /// Vegetation belt ("piso vegetacional").
    #[serde(default, deserialize_with = "null_as_default")]
    pub piso: String,
}

#[derive(Debug, Clone, Default)]
pub struct FormationLookup {
    names: HashMap<String, String>,
    catalog: Vec<FormationRecord>,
}

impl FormationLookup {
    /// Index the records and order the catalog by code, numeric-aware.
    pub fn from_records(mut records: Vec<FormationRecord>) -> Self {
        records.sort_by(|a, b| natural_cmp(&a.codigo, &b.codigo));
        let mut names = HashMap::with_capacity(records.len());
        for r in &records {
            if r.codigo.is_empty() {
                continue;
            }
            names.entry(r.codigo.clone()).or_insert_with(|| r.formacion.clone());
        }
        Self { names, catalog: records }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_records(serde_json::from_str(json)?))
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.names
            .get(code)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Human-readable label for `code`, falling back to the code itself.
    pub fn display_name(&self, code: &str) -> String {
        self.name_for(code).unwrap_or(code).to_string()
    }

    /// Catalog rows sorted by code ("P2" before "P10").
    pub fn catalog(&self) -> &[FormationRecord] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}
