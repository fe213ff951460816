//! Prompt selection — maps a step to its question text and input choices.
//!
//! Pure and stateless; the transport layer turns a [`ChoiceSet`] into
//! whatever input affordance it supports (reply keyboards on Telegram).

use crate::profile::Gender;
use crate::registration::step::Step;

/// The set of acceptable inputs to offer for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSet {
    /// Free text, no buttons.
    None,
    /// The gender option labels.
    GenderOptions,
    /// Hours 0 through 23.
    HourOptions,
    /// Minutes 0, 5, ..., 55.
    MinuteOptions,
}

impl ChoiceSet {
    /// Button labels for this choice set, in display order.
    /// Empty for free-text prompts.
    pub fn options(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::GenderOptions => Gender::options()
                .iter()
                .map(|g| g.label().to_string())
                .collect(),
            Self::HourOptions => (0..24).map(|h| h.to_string()).collect(),
            Self::MinuteOptions => (0..60).step_by(5).map(|m| m.to_string()).collect(),
        }
    }
}

/// A prompt to render: question text plus the choices to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptDescriptor {
    pub text: &'static str,
    pub choices: ChoiceSet,
}

/// The prompt for a given step. Total over all steps; `Idle` yields an
/// empty descriptor meaning "no active prompt".
pub fn describe_step(step: Step) -> PromptDescriptor {
    match step {
        Step::AwaitingGender => PromptDescriptor {
            text: "Please choose your gender:",
            choices: ChoiceSet::GenderOptions,
        },
        Step::AwaitingHour => PromptDescriptor {
            text: "Choose the notification hour:",
            choices: ChoiceSet::HourOptions,
        },
        Step::AwaitingMinute => PromptDescriptor {
            text: "Choose the notification minutes:",
            choices: ChoiceSet::MinuteOptions,
        },
        Step::AwaitingFrequency => PromptDescriptor {
            text: "Enter the notification frequency (for example, daily or weekly):",
            choices: ChoiceSet::None,
        },
        Step::Idle => PromptDescriptor {
            text: "",
            choices: ChoiceSet::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_a_descriptor() {
        for step in [
            Step::AwaitingGender,
            Step::AwaitingHour,
            Step::AwaitingMinute,
            Step::AwaitingFrequency,
        ] {
            let prompt = describe_step(step);
            assert!(!prompt.text.is_empty(), "{step} needs prompt text");
        }
        assert_eq!(describe_step(Step::Idle).text, "");
    }

    #[test]
    fn hour_options_cover_full_day() {
        let options = ChoiceSet::HourOptions.options();
        assert_eq!(options.len(), 24);
        assert_eq!(options.first().unwrap(), "0");
        assert_eq!(options.last().unwrap(), "23");
    }

    #[test]
    fn minute_options_step_by_five() {
        let options = ChoiceSet::MinuteOptions.options();
        assert_eq!(options.len(), 12);
        assert_eq!(options.first().unwrap(), "0");
        assert_eq!(options.last().unwrap(), "55");
    }

    #[test]
    fn gender_options_match_labels() {
        assert_eq!(ChoiceSet::GenderOptions.options(), vec!["Male", "Female"]);
    }

    #[test]
    fn frequency_prompt_is_free_text() {
        let prompt = describe_step(Step::AwaitingFrequency);
        assert_eq!(prompt.choices, ChoiceSet::None);
        assert!(prompt.choices.options().is_empty());
    }

    #[test]
    fn every_offered_option_validates() {
        use crate::registration::rules::validate;
        let cases = [
            (Step::AwaitingGender, ChoiceSet::GenderOptions),
            (Step::AwaitingHour, ChoiceSet::HourOptions),
            (Step::AwaitingMinute, ChoiceSet::MinuteOptions),
        ];
        for (step, choices) in cases {
            for option in choices.options() {
                assert!(
                    validate(step, &option).is_ok(),
                    "offered option {option:?} must pass validation for {step}"
                );
            }
        }
    }
}
