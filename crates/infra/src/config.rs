//! Configuration loading for the benefits projection.
//!
//! Values come from the process environment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `BENEFITS_CONFIG_JSON` | full [`BenefitsConfig`] as JSON; the base the other variables override |
//! | `BENEFITS_EMPLOYEE_BASE_COST` | annual base cost for the employee |
//! | `BENEFITS_DEPENDENT_BASE_COST` | annual base cost for a spouse or dependent |
//! | `BENEFITS_DISCOUNT` | `none`, `flat` or `name_initial` |
//! | `BENEFITS_DISCOUNT_RATE` | discount rate in `[0, 1]` |
//! | `BENEFITS_DISCOUNT_INITIAL` | letter that triggers a `name_initial` discount |

use rust_decimal::Decimal;
use thiserror::Error;

use benefits_core::DomainError;
use benefits_estimate::{BenefitsConfig, DiscountRule};

pub const CONFIG_JSON: &str = "BENEFITS_CONFIG_JSON";
pub const EMPLOYEE_BASE_COST: &str = "BENEFITS_EMPLOYEE_BASE_COST";
pub const DEPENDENT_BASE_COST: &str = "BENEFITS_DEPENDENT_BASE_COST";
pub const DISCOUNT: &str = "BENEFITS_DISCOUNT";
pub const DISCOUNT_RATE: &str = "BENEFITS_DISCOUNT_RATE";
pub const DISCOUNT_INITIAL: &str = "BENEFITS_DISCOUNT_INITIAL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid decimal: {value:?}")]
    InvalidDecimal { var: &'static str, value: String },

    #[error("{var} must be a single letter, got {value:?}")]
    InvalidInitial { var: &'static str, value: String },

    #[error("unknown discount kind {0:?} (expected none, flat or name_initial)")]
    UnknownDiscount(String),

    #[error("BENEFITS_CONFIG_JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid benefits configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<BenefitsConfig, ConfigError> {
    load_from(|key| std::env::var(key).ok())
}

/// Load and validate configuration from an arbitrary variable lookup.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<BenefitsConfig, ConfigError> {
    let mut config = match lookup(CONFIG_JSON) {
        Some(raw) => serde_json::from_str::<BenefitsConfig>(&raw)?,
        None => BenefitsConfig::default(),
    };

    if let Some(cost) = decimal_var(&lookup, EMPLOYEE_BASE_COST)? {
        config.employee_base_cost = cost;
    }
    if let Some(cost) = decimal_var(&lookup, DEPENDENT_BASE_COST)? {
        config.dependent_base_cost = cost;
    }

    let kind = lookup(DISCOUNT);
    let rate = decimal_var(&lookup, DISCOUNT_RATE)?;
    let initial = initial_var(&lookup, DISCOUNT_INITIAL)?;
    if kind.is_some() || rate.is_some() || initial.is_some() {
        config.discount = merge_discount(&config.discount, kind.as_deref(), rate, initial)?;
    }

    config.validate()?;
    Ok(config)
}

fn decimal_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Decimal>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<Decimal>()
                .map_err(|_| ConfigError::InvalidDecimal { var, value })
        })
        .transpose()
}

fn initial_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<char>, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let mut chars = value.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => Ok(Some(c)),
        _ => Err(ConfigError::InvalidInitial { var, value }),
    }
}

/// Overlay discount variables on an existing rule. Unset parts keep their current values.
fn merge_discount(
    current: &DiscountRule,
    kind: Option<&str>,
    rate: Option<Decimal>,
    initial: Option<char>,
) -> Result<DiscountRule, ConfigError> {
    let kind = kind.map(str::trim).unwrap_or(match current {
        DiscountRule::None => "none",
        DiscountRule::Flat { .. } => "flat",
        DiscountRule::NameInitial { .. } => "name_initial",
    });
    let rate = rate.unwrap_or_else(|| current.rate());
    let current_initial = match current {
        DiscountRule::NameInitial { initial, .. } => *initial,
        _ => 'A',
    };

    match kind {
        "none" => Ok(DiscountRule::None),
        "flat" => Ok(DiscountRule::Flat { rate }),
        "name_initial" => Ok(DiscountRule::NameInitial {
            initial: initial.unwrap_or(current_initial),
            rate,
        }),
        other => Err(ConfigError::UnknownDiscount(other.to_string())),
    }
}
