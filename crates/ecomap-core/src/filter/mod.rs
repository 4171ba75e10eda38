//! Cross-filter engine: turns the active search term into filters for the
//! four geometry groups and an optional viewport fit.

mod expr;
mod plan;

pub use expr::FilterExpr;
pub use plan::{compute_filters, FilterPlan};
