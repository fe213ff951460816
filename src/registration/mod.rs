//! Conversational registration — a per-user, multi-step dialogue.
//!
//! The engine drives each user through a fixed sequence of questions
//! (gender → notification hour → notification minute → notification
//! frequency), validating free-form input at every step. A completed
//! run is persisted as a [`crate::profile::Profile`]; partial answers
//! live only in the in-memory [`StateStore`].

pub mod engine;
pub mod prompts;
pub mod rules;
pub mod state;
pub mod step;

pub use engine::{AdvanceResult, ConversationEngine};
pub use prompts::{ChoiceSet, PromptDescriptor, describe_step};
pub use rules::{Answer, ValidationError, validate};
pub use state::{ConversationState, StateStore};
pub use step::Step;
