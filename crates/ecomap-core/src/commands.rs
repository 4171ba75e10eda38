//! Commands issued to the rendering surface.
//!
//! Commands are fire-and-forget: the engine never waits for the map to
//! acknowledge or finish rendering.

use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::feature::FeatureRef;
use crate::filter::FilterExpr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    None,
}

impl From<bool> for Visibility {
    fn from(visible: bool) -> Self {
        if visible { Self::Visible } else { Self::None }
    }
}

/// Padding and zoom cap used when flying to an ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitOptions {
    pub padding: u32,
    pub max_zoom: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { padding: 50, max_zoom: 12.0 }
    }
}

/// One mutation of the map viewport.
///
/// Serialized with a `command` tag so the host can dispatch on it, e.g.
/// `{"command": "setFilter", "layerId": "...", "filter": ["in", "Name", "SP1"]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MapCommand {
    /// `None` clears the layer's filter.
    SetFilter {
        layer_id: String,
        filter: Option<FilterExpr>,
    },
    SetFeatureState {
        feature: FeatureRef,
        hover: bool,
    },
    /// `setLayoutProperty(layerId, "visibility", ...)`.
    SetVisibility {
        layer_id: String,
        visibility: Visibility,
    },
    FitBounds {
        bounds: BoundingBox,
        options: FitOptions,
    },
}

/// Anything able to carry out map commands.
pub trait MapSurface {
    fn apply(&mut self, command: MapCommand);

    fn apply_all(&mut self, commands: impl IntoIterator<Item = MapCommand>)
    where
        Self: Sized,
    {
        for command in commands {
            self.apply(command);
        }
    }
}

/// Surface that only records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<MapCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter most recently set on `layer_id`: `None` if never set,
    /// `Some(None)` if cleared.
    pub fn last_filter(&self, layer_id: &str) -> Option<Option<&FilterExpr>> {
        self.commands.iter().rev().find_map(|c| match c {
            MapCommand::SetFilter { layer_id: l, filter } if l == layer_id => Some(filter.as_ref()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl MapSurface for RecordingSurface {
    fn apply(&mut self, command: MapCommand) {
        self.commands.push(command);
    }
}
