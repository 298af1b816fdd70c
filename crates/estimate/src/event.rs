use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use benefits_events::Event;

use crate::estimate::EstimateId;
use crate::person::MaritalStatus;

/// Aggregate type carried on every benefits-estimate envelope.
pub const AGGREGATE_TYPE: &str = "benefits.estimate";

/// Event: EstimateCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateCreated {
    pub estimate_id: EstimateId,
    pub first_name: String,
    pub last_name: String,
    pub marital_status: MaritalStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SalarySpecified.
///
/// `paychecks_per_year` is signed so malformed feeds surface as a payload
/// rejection rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySpecified {
    pub estimate_id: EstimateId,
    pub annual_salary: Decimal,
    pub paychecks_per_year: i32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SpouseAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseAdded {
    pub estimate_id: EstimateId,
    pub first_name: String,
    pub last_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SpouseRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseRemoved {
    pub estimate_id: EstimateId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DependentAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentAdded {
    pub estimate_id: EstimateId,
    pub first_name: String,
    pub last_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DependentRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentRemoved {
    pub estimate_id: EstimateId,
    pub first_name: String,
    pub last_name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenefitEstimateEvent {
    EstimateCreated(EstimateCreated),
    SalarySpecified(SalarySpecified),
    SpouseAdded(SpouseAdded),
    SpouseRemoved(SpouseRemoved),
    DependentAdded(DependentAdded),
    DependentRemoved(DependentRemoved),
}

impl BenefitEstimateEvent {
    /// The estimate this event belongs to.
    pub fn estimate_id(&self) -> EstimateId {
        match self {
            BenefitEstimateEvent::EstimateCreated(e) => e.estimate_id,
            BenefitEstimateEvent::SalarySpecified(e) => e.estimate_id,
            BenefitEstimateEvent::SpouseAdded(e) => e.estimate_id,
            BenefitEstimateEvent::SpouseRemoved(e) => e.estimate_id,
            BenefitEstimateEvent::DependentAdded(e) => e.estimate_id,
            BenefitEstimateEvent::DependentRemoved(e) => e.estimate_id,
        }
    }

    pub fn is_creation(&self) -> bool {
        matches!(self, BenefitEstimateEvent::EstimateCreated(_))
    }
}

impl Event for BenefitEstimateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BenefitEstimateEvent::EstimateCreated(_) => "benefits.estimate.created",
            BenefitEstimateEvent::SalarySpecified(_) => "benefits.estimate.salary_specified",
            BenefitEstimateEvent::SpouseAdded(_) => "benefits.estimate.spouse_added",
            BenefitEstimateEvent::SpouseRemoved(_) => "benefits.estimate.spouse_removed",
            BenefitEstimateEvent::DependentAdded(_) => "benefits.estimate.dependent_added",
            BenefitEstimateEvent::DependentRemoved(_) => "benefits.estimate.dependent_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BenefitEstimateEvent::EstimateCreated(e) => e.occurred_at,
            BenefitEstimateEvent::SalarySpecified(e) => e.occurred_at,
            BenefitEstimateEvent::SpouseAdded(e) => e.occurred_at,
            BenefitEstimateEvent::SpouseRemoved(e) => e.occurred_at,
            BenefitEstimateEvent::DependentAdded(e) => e.occurred_at,
            BenefitEstimateEvent::DependentRemoved(e) => e.occurred_at,
        }
    }
}
