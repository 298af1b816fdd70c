//! Benefits estimate domain module (event-sourced read model).
//!
//! This crate folds an employee's benefits-estimate event stream into a
//! queryable snapshot, recomputing the annual cost and per-paycheck deduction
//! after every event. Pure domain logic: no IO, no logging, no storage.

pub mod config;
pub mod discount;
pub mod estimate;
pub mod event;
pub mod person;

pub use config::{BenefitsConfig, MAX_BASE_COST};
pub use discount::{DiscountPolicy, DiscountRule};
pub use estimate::{BenefitEstimate, EstimateError, EstimateId};
pub use event::{
    AGGREGATE_TYPE, BenefitEstimateEvent, DependentAdded, DependentRemoved, EstimateCreated,
    SalarySpecified, SpouseAdded, SpouseRemoved,
};
pub use person::{MaritalStatus, Person};
