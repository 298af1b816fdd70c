//! Plan cost configuration supplied to the projection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use benefits_core::{DomainError, DomainResult};

use crate::discount::{DiscountPolicy, DiscountRule};
use crate::person::Person;

/// Base annual costs and the discount rule applied per person.
///
/// Treated as immutable for the lifetime of a projection: changing it means
/// rebuilding every estimate from its event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenefitsConfig {
    pub employee_base_cost: Decimal,
    pub dependent_base_cost: Decimal,
    pub discount: DiscountRule,
}

impl Default for BenefitsConfig {
    fn default() -> Self {
        Self {
            employee_base_cost: Decimal::from(1000),
            dependent_base_cost: Decimal::from(500),
            discount: DiscountRule::default(),
        }
    }
}

/// Upper bound accepted for either base cost.
pub const MAX_BASE_COST: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

impl BenefitsConfig {
    pub fn validate(&self) -> DomainResult<()> {
        check_base_cost("employee", self.employee_base_cost)?;
        check_base_cost("dependent", self.dependent_base_cost)?;
        self.discount.validate()
    }

    pub fn employee_cost(&self, employee: &Person) -> Decimal {
        employee.apply_discount_rate(self.employee_base_cost, self.policy())
    }

    /// Cost of a spouse or any other dependent.
    pub fn dependent_cost(&self, dependent: &Person) -> Decimal {
        dependent.apply_discount_rate(self.dependent_base_cost, self.policy())
    }

    pub fn policy(&self) -> &dyn DiscountPolicy {
        &self.discount
    }
}

fn check_base_cost(role: &str, cost: Decimal) -> DomainResult<()> {
    if cost < Decimal::ZERO {
        return Err(DomainError::validation(format!("{role} base cost cannot be negative")));
    }
    if cost > MAX_BASE_COST {
        return Err(DomainError::validation(format!(
            "{role} base cost cannot exceed {MAX_BASE_COST}, got {cost}"
        )));
    }
    Ok(())
}
