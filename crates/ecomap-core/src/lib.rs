//! Cross-filtering and attribute-resolution engine for the ecosystem
//! representativeness dashboard.
//!
//! Everything in this crate is renderer-agnostic: derivations are pure
//! functions over the loaded datasets, and interaction with the map is
//! expressed as [`commands::MapCommand`] values the host applies.

pub mod aggregate;
pub mod analysis;
pub mod bounds;
pub mod commands;
pub mod config;
mod de;
pub mod datasets;
pub mod error;
pub mod feature;
pub mod filter;
pub mod formations;
pub mod hover;
pub mod layers;
pub mod relations;
pub mod resolver;
pub mod search;
pub mod session;
pub mod stats;
pub mod text;

pub use commands::{MapCommand, MapSurface, RecordingSurface};
pub use config::DashboardConfig;
pub use datasets::{Dataset, Datasets};
pub use error::{DataError, DataResult};
pub use filter::{compute_filters, FilterExpr, FilterPlan};
pub use layers::LayerGroup;
pub use session::Dashboard;
pub use stats::{EcosystemStat, StatisticsStore};

/// Code value meaning "no associated feature" in cross-layer attributes and
/// in exclusion filters.
pub const NO_MATCH: &str = "NO_MATCH";
