//! Preference validation for the trip form
//!
//! Rules run in order; the first failing group wins. The destination and
//! interest rules are one group and are always both evaluated.

use crate::error::{MissingField, ValidationError};
use crate::models::{Language, TripPreferences};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

pub const MIN_BUDGET: f64 = 500.0;
pub const MIN_DURATION: u32 = 1;

/// Trip form exactly as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawTripInput {
    #[serde(default)]
    pub destination: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub budget: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub language: Language,
}

/// Accept `"6000"` as well as `6000` for numeric form fields
fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Number(serde_json::Number),
        Null(()),
    }

    Ok(match Field::deserialize(deserializer)? {
        Field::Text(s) => s,
        Field::Number(n) => n.to_string(),
        Field::Null(()) => String::new(),
    })
}

/// Trait for a single form rule
pub trait PreferenceRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, input: &RawTripInput) -> Option<ValidationError>;
}

pub struct DestinationRule;

impl PreferenceRule for DestinationRule {
    fn name(&self) -> &'static str {
        "destination_present"
    }

    fn check(&self, input: &RawTripInput) -> Option<ValidationError> {
        input.destination.trim().is_empty().then(|| {
            ValidationError::MissingRequiredFields(vec![MissingField::EmptyDestination])
        })
    }
}

pub struct InterestsRule;

impl PreferenceRule for InterestsRule {
    fn name(&self) -> &'static str {
        "interests_selected"
    }

    fn check(&self, input: &RawTripInput) -> Option<ValidationError> {
        let any_selected = input.interests.iter().any(|i| !i.trim().is_empty());
        (!any_selected).then(|| {
            ValidationError::MissingRequiredFields(vec![MissingField::NoInterestsSelected])
        })
    }
}

pub struct BudgetRule {
    pub minimum: f64,
}

impl PreferenceRule for BudgetRule {
    fn name(&self) -> &'static str {
        "budget_minimum"
    }

    fn check(&self, input: &RawTripInput) -> Option<ValidationError> {
        match parse_budget(&input.budget) {
            Some(budget) if budget >= self.minimum => None,
            _ => Some(ValidationError::BudgetTooLow {
                raw: input.budget.clone(),
                minimum: self.minimum,
            }),
        }
    }
}

/// Validator that enforces rules in registration order
pub struct PreferenceValidator {
    rules: Vec<Box<dyn PreferenceRule>>,
}

impl PreferenceValidator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn PreferenceRule>) {
        self.rules.push(rule);
    }

    pub fn validate(&self, input: &RawTripInput) -> Result<TripPreferences, ValidationError> {
        let mut missing = Vec::new();

        for rule in &self.rules {
            let Some(violation) = rule.check(input) else {
                continue;
            };

            debug!(rule = rule.name(), "Trip form rule failed");

            match violation {
                ValidationError::MissingRequiredFields(fields) => missing.extend(fields),
                other if missing.is_empty() => return Err(other),
                // a required-field failure already wins
                _ => break,
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError::MissingRequiredFields(missing));
        }

        let budget = parse_budget(&input.budget).ok_or_else(|| ValidationError::BudgetTooLow {
            raw: input.budget.clone(),
            minimum: MIN_BUDGET,
        })?;

        Ok(TripPreferences {
            destination: input.destination.trim().to_string(),
            duration: clamp_duration(&input.duration),
            budget,
            interests: dedup_interests(&input.interests),
            language: input.language,
        })
    }
}

impl Default for PreferenceValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator with the standard trip form rules
pub fn create_default_validator() -> PreferenceValidator {
    let mut validator = PreferenceValidator::new();
    validator.add_rule(Box::new(DestinationRule));
    validator.add_rule(Box::new(InterestsRule));
    validator.add_rule(Box::new(BudgetRule {
        minimum: MIN_BUDGET,
    }));
    validator
}

/// Validate with the standard rules
pub fn validate(input: &RawTripInput) -> Result<TripPreferences, ValidationError> {
    create_default_validator().validate(input)
}

fn parse_budget(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Non-numeric or non-positive durations become 1; fractions are truncated
pub fn clamp_duration(raw: &str) -> u32 {
    let raw = raw.trim();

    let days = match raw.parse::<i64>() {
        Ok(days) => days,
        Err(_) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value.trunc() as i64,
            _ => return MIN_DURATION,
        },
    };

    if days < MIN_DURATION as i64 {
        MIN_DURATION
    } else {
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

fn dedup_interests(interests: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(interests.len());
    for interest in interests {
        let interest = interest.trim();
        if !interest.is_empty() && !unique.iter().any(|u| u == interest) {
            unique.push(interest.to_string());
        }
    }
    unique
}

//
// ================= Tests =================
//
