//! Hover highlighting: at most one feature carries the hover state.
//!
//! The previous feature is always cleared before a new one is set, so two
//! features are never highlighted at once.

use tracing::trace;

use crate::commands::MapCommand;
use crate::feature::{FeatureRef, MapFeature};
use crate::layers::LayerGroup;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(FeatureRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverTransition {
    Set(FeatureRef),
    Clear(FeatureRef),
}

impl HoverTransition {
    pub fn into_command(self) -> MapCommand {
        match self {
            Self::Set(feature) => MapCommand::SetFeatureState { feature, hover: true },
            Self::Clear(feature) => MapCommand::SetFeatureState { feature, hover: false },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    state: HoverState,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    pub fn current(&self) -> Option<&FeatureRef> {
        match &self.state {
            HoverState::Idle => None,
            HoverState::Hovering(r) => Some(r),
        }
    }

    /// Pointer moved. `hit` is the topmost feature under the pointer, or
    /// `None` when there is none.
    ///
    /// Only features of the ecosystem fill layers are highlighted; a hit on
    /// any other layer counts as leaving them. A feature without a promoted
    /// id cannot carry feature state: the current highlight is dropped and
    /// nothing new is set.
    pub fn pointer_move(&mut self, hit: Option<&MapFeature>) -> Vec<HoverTransition> {
        let Some(hit) = hit else {
            return self.pointer_leave();
        };
        if !LayerGroup::hoverable_layers().contains(&hit.layer_id.as_str()) {
            trace!(layer = %hit.layer_id, "pointer over a non-hoverable layer");
            return self.pointer_leave();
        }
        let Some(next) = hit.feature_ref() else {
            trace!(source = %hit.source, "hovered feature has no id, skipping");
            return self.pointer_leave();
        };
        if self.current().is_some_and(|cur| cur.same_feature(&next)) {
            return Vec::new();
        }

        let mut out = self.pointer_leave();
        trace!(id = %next.id, source = %next.source, "hover set");
        out.push(HoverTransition::Set(next.clone()));
        self.state = HoverState::Hovering(next);
        out
    }

    /// Pointer left the hoverable layers.
    pub fn pointer_leave(&mut self) -> Vec<HoverTransition> {
        match std::mem::take(&mut self.state) {
            HoverState::Idle => Vec::new(),
            HoverState::Hovering(prev) => {
                trace!(id = %prev.id, source = %prev.source, "hover cleared");
                vec![HoverTransition::Clear(prev)]
            }
        }
    }
}
