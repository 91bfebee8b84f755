//! CSV ingest/export and forecast file I/O.

pub mod export;
pub mod forecast_file;
pub mod ingest;
