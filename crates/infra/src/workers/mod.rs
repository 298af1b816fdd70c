//! Background workers that feed projections from an event bus.

pub mod projection_worker;

pub use projection_worker::{ProjectionWorker, WorkerHandle, WorkerReport};
