use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use benefits_core::{AggregateId, AggregateRoot, DomainError};
use benefits_events::Event;

use crate::config::BenefitsConfig;
use crate::event::{
    BenefitEstimateEvent, DependentAdded, DependentRemoved, EstimateCreated, SalarySpecified,
    SpouseAdded,
};
use crate::person::{MaritalStatus, Person};

/// Decimal places kept on the per-paycheck deduction.
pub const DEDUCTION_SCALE: u32 = 2;

/// Midpoints round to the even neighbour (banker's rounding).
pub const DEDUCTION_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// Benefits estimate identifier (one per employee estimate stream).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstimateId(pub AggregateId);

impl EstimateId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for EstimateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why an event was not folded into an estimate.
///
/// Every variant leaves the estimate exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EstimateError {
    #[error("out-of-order event (expected sequence {expected}, found {found})")]
    OutOfOrderEvent { expected: u64, found: u64 },

    #[error("{event_type} received before the estimate was created")]
    EventBeforeCreation { event_type: &'static str },

    #[error("estimate already created")]
    AlreadyCreated,

    #[error("invalid event payload: {0}")]
    InvalidEventPayload(String),

    #[error("annual benefits cost does not fit in a decimal")]
    CostOverflow,
}

impl From<DomainError> for EstimateError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                EstimateError::InvalidEventPayload(msg)
            }
        }
    }
}

/// Read model: current benefits estimate for one employee.
///
/// `annual_benefits_cost` and `deduction_per_paycheck` are never written by
/// events directly; they are recomputed from the other fields after every
/// applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitEstimate {
    id: EstimateId,
    last_applied_sequence_number: u64,
    employee: Option<Person>,
    spouse: Option<Person>,
    include_spouse: bool,
    marital_status: MaritalStatus,
    salary: Decimal,
    paychecks_per_year: u32,
    dependents: Vec<Person>,
    annual_benefits_cost: Decimal,
    deduction_per_paycheck: Decimal,
}

impl BenefitEstimate {
    /// Create an empty, not-yet-created estimate ready to receive its stream.
    pub fn empty(id: EstimateId) -> Self {
        Self {
            id,
            last_applied_sequence_number: 0,
            employee: None,
            spouse: None,
            include_spouse: false,
            marital_status: MaritalStatus::default(),
            salary: Decimal::ZERO,
            paychecks_per_year: 0,
            dependents: Vec::new(),
            annual_benefits_cost: Decimal::ZERO,
            deduction_per_paycheck: Decimal::ZERO,
        }
    }

    /// Fold a full history into a fresh estimate.
    pub fn replay<'a, I>(id: EstimateId, events: I, config: &BenefitsConfig) -> Result<Self, EstimateError>
    where
        I: IntoIterator<Item = (u64, &'a BenefitEstimateEvent)>,
    {
        let mut estimate = Self::empty(id);
        for (sequence_number, event) in events {
            estimate.apply(sequence_number, event, config)?;
        }
        Ok(estimate)
    }

    pub fn estimate_id(&self) -> EstimateId {
        self.id
    }

    pub fn last_applied_sequence_number(&self) -> u64 {
        self.last_applied_sequence_number
    }

    pub fn is_created(&self) -> bool {
        self.employee.is_some()
    }

    pub fn employee(&self) -> Option<&Person> {
        self.employee.as_ref()
    }

    pub fn spouse(&self) -> Option<&Person> {
        self.spouse.as_ref()
    }

    /// Set once a spouse has been added; stays set after the spouse is removed.
    pub fn include_spouse(&self) -> bool {
        self.include_spouse
    }

    pub fn marital_status(&self) -> MaritalStatus {
        self.marital_status
    }

    pub fn salary(&self) -> Decimal {
        self.salary
    }

    pub fn paychecks_per_year(&self) -> u32 {
        self.paychecks_per_year
    }

    pub fn dependents(&self) -> &[Person] {
        &self.dependents
    }

    pub fn annual_benefits_cost(&self) -> Decimal {
        self.annual_benefits_cost
    }

    pub fn deduction_per_paycheck(&self) -> Decimal {
        self.deduction_per_paycheck
    }

    /// Fold one event into the estimate.
    ///
    /// Checks run in order: sequence, owning estimate, lifecycle, payload,
    /// cost recomputation. The change is staged on a copy and only committed
    /// once all of them pass.
    pub fn apply(
        &mut self,
        sequence_number: u64,
        event: &BenefitEstimateEvent,
        config: &BenefitsConfig,
    ) -> Result<(), EstimateError> {
        let expected = self.last_applied_sequence_number + 1;
        if sequence_number != expected {
            return Err(EstimateError::OutOfOrderEvent {
                expected,
                found: sequence_number,
            });
        }

        if event.estimate_id() != self.id {
            return Err(EstimateError::InvalidEventPayload(format!(
                "event for estimate {} applied to estimate {}",
                event.estimate_id(),
                self.id
            )));
        }

        match (event.is_creation(), self.is_created()) {
            (true, true) => return Err(EstimateError::AlreadyCreated),
            (false, false) => {
                return Err(EstimateError::EventBeforeCreation {
                    event_type: event.event_type(),
                });
            }
            _ => {}
        }

        let mut next = self.clone();
        match event {
            BenefitEstimateEvent::EstimateCreated(e) => next.on_created(e)?,
            BenefitEstimateEvent::SalarySpecified(e) => next.on_salary_specified(e)?,
            BenefitEstimateEvent::SpouseAdded(e) => next.on_spouse_added(e)?,
            BenefitEstimateEvent::SpouseRemoved(_) => next.spouse = None,
            BenefitEstimateEvent::DependentAdded(e) => next.on_dependent_added(e)?,
            BenefitEstimateEvent::DependentRemoved(e) => next.on_dependent_removed(e)?,
        }

        next.recompute(config)?;
        next.last_applied_sequence_number = sequence_number;
        *self = next;
        Ok(())
    }

    /// `(annual_benefits_cost, deduction_per_paycheck)` computed from scratch.
    pub fn recomputed_costs(&self, config: &BenefitsConfig) -> Result<(Decimal, Decimal), EstimateError> {
        let employee = self.employee.iter().map(|p| config.employee_cost(p));
        let household = self
            .spouse
            .iter()
            .chain(&self.dependents)
            .map(|p| config.dependent_cost(p));

        let cost = employee
            .chain(household)
            .try_fold(Decimal::ZERO, |total, person| total.checked_add(person))
            .ok_or(EstimateError::CostOverflow)?;

        let deduction = match self.paychecks_per_year {
            0 => Decimal::ZERO,
            n => cost
                .checked_div(Decimal::from(n))
                .ok_or(EstimateError::CostOverflow)?
                .round_dp_with_strategy(DEDUCTION_SCALE, DEDUCTION_ROUNDING),
        };

        Ok((cost, deduction))
    }

    fn recompute(&mut self, config: &BenefitsConfig) -> Result<(), EstimateError> {
        let (cost, deduction) = self.recomputed_costs(config)?;
        self.annual_benefits_cost = cost;
        self.deduction_per_paycheck = deduction;
        Ok(())
    }

    fn on_created(&mut self, e: &EstimateCreated) -> Result<(), EstimateError> {
        let employee = Person::try_new(&e.first_name, &e.last_name)?;

        self.employee = Some(employee);
        self.dependents.clear();
        self.marital_status = e.marital_status;
        Ok(())
    }

    fn on_salary_specified(&mut self, e: &SalarySpecified) -> Result<(), EstimateError> {
        if e.annual_salary < Decimal::ZERO {
            return Err(EstimateError::InvalidEventPayload(format!(
                "annual salary cannot be negative, got {}",
                e.annual_salary
            )));
        }
        let paychecks = u32::try_from(e.paychecks_per_year).map_err(|_| {
            EstimateError::InvalidEventPayload(format!(
                "paychecks per year cannot be negative, got {}",
                e.paychecks_per_year
            ))
        })?;

        self.salary = e.annual_salary;
        self.paychecks_per_year = paychecks;
        Ok(())
    }

    fn on_spouse_added(&mut self, e: &SpouseAdded) -> Result<(), EstimateError> {
        let spouse = Person::try_new(&e.first_name, &e.last_name)?;

        // A second SpouseAdded replaces the first.
        self.spouse = Some(spouse);
        self.include_spouse = true;
        Ok(())
    }

    fn on_dependent_added(&mut self, e: &DependentAdded) -> Result<(), EstimateError> {
        let dependent = Person::try_new(&e.first_name, &e.last_name)?;
        self.dependents.push(dependent);
        Ok(())
    }

    fn on_dependent_removed(&mut self, e: &DependentRemoved) -> Result<(), EstimateError> {
        // Validates the name pair; the value itself is only used for matching.
        Person::try_new(&e.first_name, &e.last_name)?;

        self.dependents
            .retain(|d| !d.is_named(&e.first_name, &e.last_name));
        Ok(())
    }
}

impl AggregateRoot for BenefitEstimate {
    type Id = EstimateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.last_applied_sequence_number
    }
}
