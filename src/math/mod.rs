//! Small numeric helpers shared by the forecaster.

pub mod ols;
