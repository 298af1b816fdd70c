use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use benefits_core::{DomainError, DomainResult, ValueObject};

use crate::discount::DiscountPolicy;

/// Marital status recorded on an estimate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

/// A named individual covered by (or requesting) benefits.
///
/// Equality ignores case on both name parts, so `("Jo", "Lee")` and
/// `("JO", "lee")` are the same person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    first_name: String,
    last_name: String,
}

impl Person {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Build a person, rejecting blank name parts.
    pub fn try_new(first_name: &str, last_name: &str) -> DomainResult<Self> {
        if first_name.trim().is_empty() {
            return Err(DomainError::validation("first name cannot be empty"));
        }
        if last_name.trim().is_empty() {
            return Err(DomainError::validation("last name cannot be empty"));
        }
        Ok(Self::new(first_name, last_name))
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Case-insensitive match against a raw name pair.
    pub fn is_named(&self, first_name: &str, last_name: &str) -> bool {
        eq_ignore_case(&self.first_name, first_name) && eq_ignore_case(&self.last_name, last_name)
    }

    /// Annual cost of covering this person, given the plan's base cost.
    pub fn apply_discount_rate<P>(&self, base_cost: Decimal, policy: &P) -> Decimal
    where
        P: DiscountPolicy + ?Sized,
    {
        policy.discounted_cost(self, base_cost)
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.is_named(&other.first_name, &other.last_name)
    }
}

impl Eq for Person {}

impl ValueObject for Person {}

impl core::fmt::Display for Person {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_case() {
        assert_eq!(Person::new("Jo", "Lee"), Person::new("JO", "lee"));
        assert_ne!(Person::new("Jo", "Lee"), Person::new("Jon", "Lee"));
    }

    #[test]
    fn equality_ignores_case_outside_ascii() {
        assert_eq!(Person::new("Émile", "Ørsted"), Person::new("émile", "øRSTED"));
    }

    #[test]
    fn try_new_rejects_blank_names() {
        assert!(matches!(Person::try_new("  ", "Lee"), Err(DomainError::Validation(_))));
        assert!(matches!(Person::try_new("Jo", ""), Err(DomainError::Validation(_))));
        assert!(Person::try_new("Jo", "Lee").is_ok());
    }

    #[test]
    fn keeps_names_as_given() {
        let p = Person::new("jo", "LEE");
        assert_eq!(p.first_name(), "jo");
        assert_eq!(p.last_name(), "LEE");
        assert_eq!(p.to_string(), "jo LEE");
    }
}
