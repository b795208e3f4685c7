use serde::{Deserialize, Serialize};

use crate::models::UserProfile;
use crate::prediction::{self, CyclePolicy, PredictionError};

pub const MIN_AGE: u32 = 10;
pub const MAX_AGE: u32 = 100;

/// Raw values from the setup or settings form, before any checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: String,
    pub cycle_length: String,
    pub last_period_date: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,
    #[error("Please enter your age")]
    MissingAge,
    #[error("Please enter cycle length")]
    MissingCycleLength,
    #[error("Please select last period date")]
    MissingLastPeriodDate,
    #[error("Enter valid numbers for age and cycle")]
    NotANumber,
    #[error("Please enter valid age ({min}-{max})")]
    AgeOutOfRange { min: u32, max: u32 },
    #[error("Cycle length should be {min}-{max} days")]
    CycleLengthOutOfRange { min: u32, max: u32 },
    #[error(transparent)]
    Date(#[from] PredictionError),
}

/// Check a submitted profile form, in the order the form reports problems.
pub fn validate_profile(
    input: &ProfileInput,
    policy: &CyclePolicy,
) -> Result<UserProfile, ValidationError> {
    let name = input.name.trim();
    let age = input.age.trim();
    let cycle_length = input.cycle_length.trim();
    let last_period_date = input
        .last_period_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    if name.is_empty() {
        return Err(ValidationError::MissingName);
    }
    if age.is_empty() {
        return Err(ValidationError::MissingAge);
    }
    if cycle_length.is_empty() {
        return Err(ValidationError::MissingCycleLength);
    }
    let last_period_date = last_period_date.ok_or(ValidationError::MissingLastPeriodDate)?;

    let (age, cycle_length) = match (age.parse::<u32>(), cycle_length.parse::<u32>()) {
        (Ok(age), Ok(cycle_length)) => (age, cycle_length),
        _ => return Err(ValidationError::NotANumber),
    };

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange {
            min: MIN_AGE,
            max: MAX_AGE,
        });
    }
    if policy.check_cycle_length(cycle_length).is_some() {
        return Err(ValidationError::CycleLengthOutOfRange {
            min: policy.min_cycle_length,
            max: policy.max_cycle_length,
        });
    }
    prediction::parse_date(last_period_date)?;

    Ok(UserProfile {
        name: name.to_string(),
        age,
        cycle_length,
        last_period_date: last_period_date.to_string(),
    })
}
