//! Relation index: ecosystem code → intersecting protected areas and
//! priority sites, precomputed offline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

/// AP and SP codes that spatially intersect one ecosystem, in published order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub aps: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sps: Vec<String>,
}

/// A missing key and an entry with empty lists both mean "no intersecting
/// features"; the accessors below treat them the same way.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    entries: BTreeMap<String, RelationEntry>,
}

impl RelationIndex {
    pub fn from_entries(entries: BTreeMap<String, RelationEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_entries(serde_json::from_str(json)?))
    }

    pub fn get(&self, ecosystem_id: &str) -> Option<&RelationEntry> {
        self.entries.get(ecosystem_id)
    }

    /// Protected-area codes for an ecosystem; empty when none are known.
    pub fn aps_for(&self, ecosystem_id: &str) -> &[String] {
        self.get(ecosystem_id).map_or(&[], |e| e.aps.as_slice())
    }

    /// Priority-site codes for an ecosystem; empty when none are known.
    pub fn sps_for(&self, ecosystem_id: &str) -> &[String] {
        self.get(ecosystem_id).map_or(&[], |e| e.sps.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_and_empty_lists_read_the_same() {
        let index = RelationIndex::from_json(
            r#"{"E1": {"aps": [], "sps": []}, "E2": {"aps": ["A1"]}, "E3": {"aps": null, "sps": ["S9"]}}"#,
        )
        .unwrap();
        assert!(index.aps_for("E1").is_empty());
        assert!(index.aps_for("missing").is_empty());
        assert!(index.sps_for("E2").is_empty(), "absent list reads as empty");
        assert!(index.aps_for("E3").is_empty(), "null list reads as empty");
        assert_eq!(index.sps_for("E3"), ["S9".to_string()]);
    }

    #[test]
    fn preserves_published_code_order() {
        let index = RelationIndex::from_json(r#"{"E1": {"aps": ["A9", "A1", "A5"], "sps": []}}"#)
            .unwrap();
        assert_eq!(index.aps_for("E1"), ["A9", "A1", "A5"]);
    }
}
