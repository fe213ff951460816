//! Validation of raw user input against the current registration step.
//!
//! Pure functions with no state; usable standalone without the engine.

use crate::profile::Gender;
use crate::registration::step::Step;

/// Why an input was rejected. Always recoverable — the same step is
/// re-prompted, with no retry limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is outside the step's domain.
    InvalidChoice,
    /// Input is empty after trimming.
    Empty,
}

/// A validated, normalized answer for one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Gender(Gender),
    Hour(u8),
    Minute(u8),
    Frequency(String),
}

/// Validate `raw` against `step`'s domain, returning the canonical value.
///
/// Deterministic and side-effect free. Total over all steps: `Idle` has
/// no domain, so everything is an invalid choice there.
pub fn validate(step: Step, raw: &str) -> Result<Answer, ValidationError> {
    match step {
        Step::AwaitingGender => Gender::from_label(raw)
            .map(Answer::Gender)
            .ok_or(ValidationError::InvalidChoice),
        Step::AwaitingHour => parse_number(raw)
            .filter(|h| *h <= 23)
            .map(Answer::Hour)
            .ok_or(ValidationError::InvalidChoice),
        Step::AwaitingMinute => parse_number(raw)
            .filter(|m| *m <= 59 && *m % 5 == 0)
            .map(Answer::Minute)
            .ok_or(ValidationError::InvalidChoice),
        Step::AwaitingFrequency => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(ValidationError::Empty)
            } else {
                Ok(Answer::Frequency(trimmed.to_string()))
            }
        }
        Step::Idle => Err(ValidationError::InvalidChoice),
    }
}

/// Parse a textual non-negative integer. Signs are rejected, so "-5" and
/// "+5" are both invalid choices rather than numbers.
fn parse_number(raw: &str) -> Option<u8> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
