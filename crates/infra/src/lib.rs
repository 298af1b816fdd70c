//! Infrastructure layer: read model storage, projection locators, workers, config.

pub mod config;
pub mod projections;
pub mod read_model;
pub mod workers;
