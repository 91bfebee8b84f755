//! Dataset acquisition: remote fetch and synthetic samples.

pub mod remote;
pub mod sample;

pub use remote::DatasetClient;
pub use sample::generate_sample_csv;
