//! Country filtering and per-country aggregation.

mod aggregate;
mod filter;

pub use aggregate::aggregate;
pub use filter::filter_country;
