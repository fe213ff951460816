//! Registration step machine — tracks which question the user is on.

use serde::{Deserialize, Serialize};

/// The steps of the registration conversation.
///
/// Progresses linearly: AwaitingGender → AwaitingHour → AwaitingMinute →
/// AwaitingFrequency → Idle. `Idle` means no registration in progress —
/// both the initial state and the state after completion or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitingGender,
    AwaitingHour,
    AwaitingMinute,
    AwaitingFrequency,
    Idle,
}

impl Step {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Steps only ever advance one at a time; going backward or skipping
    /// is never allowed (cancellation goes through state removal instead).
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (AwaitingGender, AwaitingHour)
                | (AwaitingHour, AwaitingMinute)
                | (AwaitingMinute, AwaitingFrequency)
                | (AwaitingFrequency, Idle)
        )
    }

    /// Whether no registration is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The next step in the linear progression, if any.
    pub fn next(&self) -> Option<Step> {
        use Step::*;
        match self {
            AwaitingGender => Some(AwaitingHour),
            AwaitingHour => Some(AwaitingMinute),
            AwaitingMinute => Some(AwaitingFrequency),
            AwaitingFrequency => Some(Idle),
            Idle => None,
        }
    }
}

impl Default for Step {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingGender => "awaiting_gender",
            Self::AwaitingHour => "awaiting_hour",
            Self::AwaitingMinute => "awaiting_minute",
            Self::AwaitingFrequency => "awaiting_frequency",
            Self::Idle => "idle",
        };
        write!(f, "{s}")
    }
}
