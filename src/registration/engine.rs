//! The conversation engine — validates input, advances steps, and
//! persists completed registrations.

use std::sync::Arc;

use crate::error::RepositoryError;
use crate::profile::{NotificationTime, Profile, ProfileRepository, UserId};
use crate::registration::prompts::{PromptDescriptor, describe_step};
use crate::registration::rules::{Answer, ValidationError, validate};
use crate::registration::state::{ConversationState, StateStore};
use crate::registration::step::Step;

/// Outcome of feeding one input to the engine.
#[derive(Debug, Clone)]
pub enum AdvanceResult {
    /// No registration in progress for this identity. Not an error —
    /// the caller should route the input elsewhere.
    NoActiveConversation,
    /// Input rejected; state unchanged, same step re-prompted.
    Rejected {
        error: ValidationError,
        prompt: PromptDescriptor,
    },
    /// State advanced one step.
    Progressed(PromptDescriptor),
    /// Final step validated; the profile has been stored and the
    /// in-progress state cleared.
    Completed(Profile),
}

/// Drives the per-user registration dialogue.
///
/// Explicitly constructed and passed to the transport at startup; owns
/// the in-memory [`StateStore`] and writes completed profiles through
/// the repository.
pub struct ConversationEngine {
    store: StateStore,
    profiles: Arc<dyn ProfileRepository>,
}

impl ConversationEngine {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            store: StateStore::new(),
            profiles,
        }
    }

    /// Begin (or restart) registration for `identity`.
    ///
    /// Unconditionally resets to the first question, discarding any
    /// in-flight partial answers for this identity.
    pub async fn start(&self, identity: UserId, display_name: Option<String>) -> PromptDescriptor {
        let slot = self.store.slot(identity).await;
        let mut guard = slot.lock().await;
        if guard.is_some() {
            tracing::debug!(%identity, "Restarting registration, discarding partial answers");
        }
        *guard = Some(ConversationState::new(identity, display_name));
        describe_step(Step::AwaitingGender)
    }

    /// Abandon any in-flight registration for `identity`.
    pub async fn cancel(&self, identity: UserId) {
        self.store.remove(identity).await;
    }

    /// Feed one raw input to the identity's conversation.
    ///
    /// The whole read-validate-write runs under the identity's slot lock,
    /// so inputs for one user are processed strictly in arrival order
    /// while other users proceed concurrently. A repository error on the
    /// final step propagates and leaves the state in place, so the user
    /// can retry and the profile write stays at-least-once.
    pub async fn advance(
        &self,
        identity: UserId,
        raw_input: &str,
    ) -> Result<AdvanceResult, RepositoryError> {
        // Only look up an existing slot here: arbitrary chat text reaches
        // advance, and allocating a slot per sender would grow the map
        // without bound.
        let Some(slot) = self.store.existing_slot(identity).await else {
            return Ok(AdvanceResult::NoActiveConversation);
        };
        let mut guard = slot.lock().await;

        let Some(state) = guard.as_mut() else {
            return Ok(AdvanceResult::NoActiveConversation);
        };
        if state.step.is_idle() {
            return Ok(AdvanceResult::NoActiveConversation);
        }

        let answer = match validate(state.step, raw_input) {
            Ok(answer) => answer,
            Err(error) => {
                tracing::debug!(%identity, step = %state.step, ?error, "Input rejected");
                return Ok(AdvanceResult::Rejected {
                    error,
                    prompt: describe_step(state.step),
                });
            }
        };

        match answer {
            Answer::Gender(gender) => state.gender = Some(gender),
            Answer::Hour(hour) => state.hour = Some(hour),
            Answer::Minute(minute) => state.minute = Some(minute),
            Answer::Frequency(frequency) => {
                // Final step: persist first, clear state only on success.
                let profile = build_profile(state, frequency)?;
                self.profiles.upsert(&profile).await?;
                *guard = None;
                tracing::info!(%identity, "Registration completed");
                return Ok(AdvanceResult::Completed(profile));
            }
        }

        let next = state
            .step
            .next()
            .unwrap_or(Step::Idle);
        debug_assert!(state.step.can_transition_to(next));
        state.step = next;
        Ok(AdvanceResult::Progressed(describe_step(next)))
    }
}

/// Assemble the finished profile from accumulated answers.
///
/// The step invariant guarantees every field is present by the time the
/// frequency arrives; a hole here means the state was corrupted outside
/// the engine.
fn build_profile(
    state: &ConversationState,
    frequency: String,
) -> Result<Profile, RepositoryError> {
    let missing = |field: &str| RepositoryError::CorruptRow {
        identity: state.identity.0,
        reason: format!("conversation state missing {field} at completion"),
    };
    Ok(Profile {
        identity: state.identity,
        display_name: state.display_name.clone(),
        gender: state.gender.ok_or_else(|| missing("gender"))?,
        notification_time: NotificationTime {
            hour: state.hour.ok_or_else(|| missing("hour"))?,
            minute: state.minute.ok_or_else(|| missing("minute"))?,
        },
        notification_frequency: frequency,
    })
}
