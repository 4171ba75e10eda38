//! Layer catalog: the four geometry groups and their style layers.
//!
//! Each group is one vector source drawn by a fill layer and an outline layer.

use serde::{Deserialize, Serialize};

use crate::commands::{MapCommand, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerGroup {
    /// Ecosystem formations (base classification).
    Formations,
    /// Ecosystems crossed with protected areas and priority sites.
    Integrated,
    ProtectedAreas,
    PrioritySites,
}

impl LayerGroup {
    pub const ALL: [LayerGroup; 4] = [
        LayerGroup::Formations,
        LayerGroup::Integrated,
        LayerGroup::ProtectedAreas,
        LayerGroup::PrioritySites,
    ];

    /// Vector source id, also the toggle key the host uses.
    pub fn source_id(self) -> &'static str {
        match self {
            Self::Formations => "ecosistemas_formaciones",
            Self::Integrated => "ecosistemas_integrados",
            Self::ProtectedAreas => "areas_protegidas",
            Self::PrioritySites => "sitios_prioritarios",
        }
    }

    /// Layer name inside the tile archive.
    pub fn source_layer(self) -> &'static str {
        match self {
            Self::Formations => "Ecosistemas",
            Self::Integrated => "EcosistemasxAPxSP",
            Self::ProtectedAreas => "Areas_Protegidas",
            Self::PrioritySites => "sitios_prior_integrados",
        }
    }

    pub fn fill_layer(self) -> &'static str {
        match self {
            Self::Formations => "ecosistemas-formaciones-fill",
            Self::Integrated => "ecosistemas-integrados-fill",
            Self::ProtectedAreas => "areas_protegidas-fill",
            Self::PrioritySites => "sitios_prioritarios-fill",
        }
    }

    pub fn line_layer(self) -> &'static str {
        match self {
            Self::Formations => "ecosistemas-formaciones-line",
            Self::Integrated => "ecosistemas-integrados-line",
            Self::ProtectedAreas => "areas_protegidas-line",
            Self::PrioritySites => "sitios_prioritarios-line",
        }
    }

    pub fn style_layers(self) -> [&'static str; 2] {
        [self.fill_layer(), self.line_layer()]
    }

    /// Attribute holding the feature's code, used by filters.
    pub fn code_field(self) -> &'static str {
        match self {
            Self::Formations | Self::Integrated => "CODIGO",
            Self::ProtectedAreas => "Codrnap",
            Self::PrioritySites => "Name",
        }
    }

    pub fn is_ecosystem(self) -> bool {
        matches!(self, Self::Formations | Self::Integrated)
    }

    /// Popup title for features of this group.
    pub fn title(self) -> &'static str {
        match self {
            Self::Formations => "Ecosistema (Formación)",
            Self::Integrated => "Ecosistema (Cruce)",
            Self::ProtectedAreas => "Área Protegida",
            Self::PrioritySites => "Sitio Prioritario",
        }
    }

    /// Group owning a style layer id.
    pub fn from_layer_id(layer_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.style_layers().iter().any(|l| *l == layer_id))
    }

    /// Group for a toggle key or source id.
    pub fn from_source_id(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.source_id() == key)
    }

    /// Layers whose features take part in hover highlighting.
    pub fn hoverable_layers() -> [&'static str; 2] {
        [Self::Integrated.fill_layer(), Self::Formations.fill_layer()]
    }

    /// Layers that open a detail popup on click, topmost first.
    pub fn clickable_layers() -> [&'static str; 4] {
        [
            Self::Integrated.fill_layer(),
            Self::Formations.fill_layer(),
            Self::ProtectedAreas.fill_layer(),
            Self::PrioritySites.fill_layer(),
        ]
    }
}

/// On/off switch per layer group. All groups start visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerToggles {
    pub formations: bool,
    pub integrated: bool,
    pub protected_areas: bool,
    pub priority_sites: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self {
            formations: true,
            integrated: true,
            protected_areas: true,
            priority_sites: true,
        }
    }
}

impl LayerToggles {
    pub fn is_visible(&self, group: LayerGroup) -> bool {
        match group {
            LayerGroup::Formations => self.formations,
            LayerGroup::Integrated => self.integrated,
            LayerGroup::ProtectedAreas => self.protected_areas,
            LayerGroup::PrioritySites => self.priority_sites,
        }
    }

    pub fn set(&mut self, group: LayerGroup, visible: bool) {
        let slot = match group {
            LayerGroup::Formations => &mut self.formations,
            LayerGroup::Integrated => &mut self.integrated,
            LayerGroup::ProtectedAreas => &mut self.protected_areas,
            LayerGroup::PrioritySites => &mut self.priority_sites,
        };
        *slot = visible;
    }

    /// Flip a group and return its new state.
    pub fn toggle(&mut self, group: LayerGroup) -> bool {
        let visible = !self.is_visible(group);
        self.set(group, visible);
        visible
    }

    /// Visibility commands for one group (fill and outline).
    pub fn commands_for(&self, group: LayerGroup) -> Vec<MapCommand> {
        let visibility = Visibility::from(self.is_visible(group));
        group
            .style_layers()
            .into_iter()
            .map(|layer_id| MapCommand::SetVisibility { layer_id: layer_id.to_string(), visibility })
            .collect()
    }

    /// Visibility commands for every group.
    pub fn commands(&self) -> Vec<MapCommand> {
        LayerGroup::ALL.into_iter().flat_map(|g| self.commands_for(g)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_layers_map_back_to_their_group() {
        for group in LayerGroup::ALL {
            for layer in group.style_layers() {
                assert_eq!(LayerGroup::from_layer_id(layer), Some(group));
            }
            assert_eq!(LayerGroup::from_source_id(group.source_id()), Some(group));
        }
        assert_eq!(LayerGroup::from_layer_id("base-map"), None);
    }

    #[test]
    fn toggle_emits_fill_and_line_visibility() {
        let mut toggles = LayerToggles::default();
        assert!(!toggles.toggle(LayerGroup::ProtectedAreas));
        let cmds = toggles.commands_for(LayerGroup::ProtectedAreas);
        assert_eq!(
            cmds,
            vec![
                MapCommand::SetVisibility {
                    layer_id: "areas_protegidas-fill".into(),
                    visibility: Visibility::None
                },
                MapCommand::SetVisibility {
                    layer_id: "areas_protegidas-line".into(),
                    visibility: Visibility::None
                },
            ]
        );
        assert_eq!(toggles.commands().len(), 8);
    }
}
