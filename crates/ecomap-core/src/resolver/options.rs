use serde::{Deserialize, Serialize};

use crate::layers::LayerGroup;
use crate::text::NumberFormat;
use crate::NO_MATCH;

/// Field names and fallbacks for one cross-referenced layer (AP or SP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupFields {
    /// Source layer names to try, in order. The canonical name comes first;
    /// the rest cover renamed tile archives.
    pub source_layers: Vec<String>,
    /// Identifier attribute holding the code.
    pub id_field: String,
    /// Other attributes that may carry the same identifier, numerically.
    pub alternate_id_fields: Vec<String>,
}

impl LookupFields {
    pub fn for_group(group: LayerGroup) -> Self {
        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match group {
            LayerGroup::ProtectedAreas => Self {
                source_layers: strings(&["Areas_Protegidas", "areas_protegidas", "AreasProtegidas"]),
                id_field: "Codrnap".into(),
                alternate_id_fields: strings(&["COD_RNAP", "CODRNAP", "Cod_rnap", "ID", "id"]),
            },
            LayerGroup::PrioritySites => Self {
                source_layers: strings(&["sitios_prior_integrados", "sitios_prioritarios", "Sitios_Prioritarios"]),
                id_field: "Name".into(),
                alternate_id_fields: strings(&["COD_SP", "Codigo", "CODIGO", "ID", "id"]),
            },
            LayerGroup::Formations | LayerGroup::Integrated => Self {
                source_layers: vec![group.source_layer().to_string()],
                id_field: group.code_field().into(),
                alternate_id_fields: Vec::new(),
            },
        }
    }
}

impl Default for LookupFields {
    fn default() -> Self {
        Self::for_group(LayerGroup::ProtectedAreas)
    }
}

/// Settings of the feature attribute resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    pub protected_areas: LookupFields,
    pub priority_sites: LookupFields,
    /// Attributes tried in order for a feature's display name.
    pub name_fields: Vec<String>,
    /// Code meaning "no associated feature".
    pub sentinel: String,
    /// Label shown for the sentinel.
    pub no_match_label: String,
    /// String-valued fields that should still be formatted as numbers.
    pub numeric_fields: Vec<String>,
    pub number_format: NumberFormat,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            protected_areas: LookupFields::for_group(LayerGroup::ProtectedAreas),
            priority_sites: LookupFields::for_group(LayerGroup::PrioritySites),
            name_fields: ["NOMBRE", "Nombre", "Name", "name"].map(String::from).to_vec(),
            sentinel: NO_MATCH.into(),
            no_match_label: "Sin coincidencia".into(),
            numeric_fields: ["Has", "has"].map(String::from).to_vec(),
            number_format: NumberFormat::default(),
        }
    }
}

impl ResolverOptions {
    pub fn lookup_fields(&self, group: LayerGroup) -> Option<&LookupFields> {
        match group {
            LayerGroup::ProtectedAreas => Some(&self.protected_areas),
            LayerGroup::PrioritySites => Some(&self.priority_sites),
            LayerGroup::Formations | LayerGroup::Integrated => None,
        }
    }

    pub fn is_sentinel(&self, code: &str) -> bool {
        code.trim().is_empty() || code == self.sentinel
    }
}
