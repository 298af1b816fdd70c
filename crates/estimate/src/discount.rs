//! Discount policies: how a plan's base cost becomes a person's cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use benefits_core::{DomainError, DomainResult};

use crate::person::Person;

/// Converts a base annual cost into the cost for one person.
///
/// Implementations must be deterministic and side-effect free: the estimate's
/// derived figures are recomputed through this after every event and must
/// come out identical on replay.
pub trait DiscountPolicy: core::fmt::Debug + Send + Sync {
    fn discounted_cost(&self, person: &Person, base_cost: Decimal) -> Decimal;
}

/// Configurable discount rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountRule {
    /// Everyone pays the base cost.
    None,
    /// People whose first or last name starts with `initial` (any case) get `rate` off.
    NameInitial { initial: char, rate: Decimal },
    /// Everyone gets `rate` off.
    Flat { rate: Decimal },
}

impl DiscountRule {
    /// The rate a rule grants, if any.
    pub fn rate(&self) -> Decimal {
        match self {
            DiscountRule::None => Decimal::ZERO,
            DiscountRule::NameInitial { rate, .. } | DiscountRule::Flat { rate } => *rate,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let rate = self.rate();
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(DomainError::validation(format!(
                "discount rate must be within [0, 1], got {rate}"
            )));
        }
        if let DiscountRule::NameInitial { initial, .. } = self {
            if !initial.is_alphabetic() {
                return Err(DomainError::validation(format!(
                    "discount initial must be a letter, got {initial:?}"
                )));
            }
        }
        Ok(())
    }

    fn applies_to(&self, person: &Person) -> bool {
        match self {
            DiscountRule::None => false,
            DiscountRule::Flat { .. } => true,
            DiscountRule::NameInitial { initial, .. } => {
                starts_with_ignore_case(person.first_name(), *initial)
                    || starts_with_ignore_case(person.last_name(), *initial)
            }
        }
    }
}

impl Default for DiscountRule {
    fn default() -> Self {
        DiscountRule::NameInitial {
            initial: 'A',
            rate: Decimal::new(10, 2),
        }
    }
}

impl DiscountPolicy for DiscountRule {
    fn discounted_cost(&self, person: &Person, base_cost: Decimal) -> Decimal {
        if self.applies_to(person) {
            // Kept within [0, 1] so the result never exceeds the base cost,
            // even for a rule that skipped `validate`.
            let rate = self.rate().clamp(Decimal::ZERO, Decimal::ONE);
            base_cost * (Decimal::ONE - rate)
        } else {
            base_cost
        }
    }
}

fn starts_with_ignore_case(name: &str, initial: char) -> bool {
    name.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.to_lowercase().eq(initial.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Decimal {
        Decimal::from(1000)
    }

    #[test]
    fn default_rule_discounts_names_starting_with_a() {
        let rule = DiscountRule::default();
        assert_eq!(rule.discounted_cost(&Person::new("Ann", "Lee"), base()), Decimal::from(900));
        assert_eq!(rule.discounted_cost(&Person::new("bob", "adams"), base()), Decimal::from(900));
        assert_eq!(rule.discounted_cost(&Person::new("Bob", "Lee"), base()), base());
    }

    #[test]
    fn none_and_flat_rules() {
        let p = Person::new("Cam", "Lee");
        assert_eq!(DiscountRule::None.discounted_cost(&p, base()), base());

        let flat = DiscountRule::Flat { rate: Decimal::new(25, 2) };
        assert_eq!(flat.discounted_cost(&p, base()), Decimal::from(750));
    }

    #[test]
    fn unvalidated_rates_are_clamped() {
        let p = Person::new("Cam", "Lee");
        let negative = DiscountRule::Flat { rate: Decimal::from(-3) };
        assert_eq!(negative.discounted_cost(&p, Decimal::MAX), Decimal::MAX);

        let above_one = DiscountRule::Flat { rate: Decimal::from(2) };
        assert_eq!(above_one.discounted_cost(&p, base()), Decimal::ZERO);
    }

    #[test]
    fn person_delegates_to_policy() {
        let p = Person::new("Ann", "Lee");
        assert_eq!(p.apply_discount_rate(Decimal::from(500), &DiscountRule::default()), Decimal::from(450));
    }

    #[test]
    fn validate_rejects_out_of_range_rates_and_non_letters() {
        assert!(DiscountRule::Flat { rate: Decimal::new(-1, 1) }.validate().is_err());
        assert!(DiscountRule::Flat { rate: Decimal::new(11, 1) }.validate().is_err());
        assert!(DiscountRule::NameInitial { initial: '7', rate: Decimal::ZERO }.validate().is_err());
        assert!(DiscountRule::default().validate().is_ok());
    }

    #[test]
    fn deserializes_tagged_config() {
        let rule: DiscountRule =
            serde_json::from_str(r#"{"kind":"name_initial","initial":"Z","rate":"0.2"}"#).unwrap();
        assert_eq!(rule, DiscountRule::NameInitial { initial: 'Z', rate: Decimal::new(2, 1) });

        let none: DiscountRule = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(none, DiscountRule::None);
    }
}
