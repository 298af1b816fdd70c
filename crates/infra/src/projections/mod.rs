//! Projection implementations (read model builders).
//!
//! Projections consume published envelopes and keep query-ready read models
//! in a store. All projections are:
//! - **Rebuildable**: can be reconstructed from the event stream
//! - **Per-aggregate**: one read model instance per aggregate id
//! - **Ordered**: gaps in an aggregate stream are surfaced, never papered over

pub mod benefit_estimates;

pub use benefit_estimates::{BenefitEstimatesProjection, EstimateProjectionError};
