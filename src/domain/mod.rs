//! Shared domain types and defaults.

mod types;

pub use types::*;

/// Pseudo-locations excluded from per-country rankings by default.
///
/// The upstream dataset interleaves aggregate rows (continents, income tiers,
/// "World") with real countries; ranking against them is meaningless.
/// Overridable via `--exclude`.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "World",
    "Africa",
    "Asia",
    "Europe",
    "European Union",
    "North America",
    "Oceania",
    "South America",
    "International",
    "High income",
    "Upper middle income",
    "Lower middle income",
    "Low income",
];
