//! Message routing — maps incoming chat events to engine calls and replies.
//!
//! Dispatch is explicit: the menu commands are plain data compared against
//! the incoming text, and everything else is fed to the conversation
//! engine. No transport types leak in; the Telegram layer converts its
//! updates into [`IncomingEvent`]s and renders [`Reply`]s back out.

use std::sync::Arc;

use crate::listing::{self, MESSAGE_LIMIT};
use crate::profile::{ProfileRepository, UserId};
use crate::registration::{AdvanceResult, ChoiceSet, ConversationEngine, PromptDescriptor};
use crate::weather::{WeatherClient, weather_symbol};

/// Menu button labels and commands, compared against incoming text.
pub const CMD_START: &str = "/start";
pub const BTN_WEATHER: &str = "Weather";
pub const BTN_REGISTER: &str = "Register";
pub const BTN_USERS: &str = "Users";

const GREETING: &str = "Hi! I'm a weather bot.";
const REGISTERED: &str = "You have been registered successfully!";
const NO_ACCESS: &str = "You do not have access to this command.";
const WEATHER_FAILED: &str = "Failed to fetch the weather.";
const STORAGE_FAILED: &str = "Something went wrong, please try again.";

/// One inbound chat event, by value. The transport supplies the identity
/// and display name; the router never reaches back into transport objects.
#[derive(Debug, Clone)]
pub struct IncomingEvent {
    pub identity: UserId,
    pub display_name: Option<String>,
    pub text: String,
}

/// Which input affordance to render alongside a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard is currently shown.
    None,
    /// The main menu; the admin button only for the administrator.
    MainMenu { is_admin: bool },
    /// Choice buttons for a registration prompt.
    Choices(ChoiceSet),
    /// Remove the keyboard (free-text prompt).
    Remove,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    /// Render a registration prompt. Free-text prompts drop the keyboard.
    fn prompt(prompt: PromptDescriptor) -> Self {
        let keyboard = match prompt.choices {
            ChoiceSet::None => Keyboard::Remove,
            choices => Keyboard::Choices(choices),
        };
        Self::new(prompt.text, keyboard)
    }
}

/// The bot application: engine, storage, weather client, admin identity.
///
/// Constructed once at startup and shared with the transport; there are
/// no process-wide singletons.
pub struct App {
    engine: ConversationEngine,
    profiles: Arc<dyn ProfileRepository>,
    weather: WeatherClient,
    admin_id: UserId,
}

impl App {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        weather: WeatherClient,
        admin_id: UserId,
    ) -> Self {
        Self {
            engine: ConversationEngine::new(Arc::clone(&profiles)),
            profiles,
            weather,
            admin_id,
        }
    }

    fn is_admin(&self, identity: UserId) -> bool {
        identity == self.admin_id
    }

    /// Handle one event, producing the replies to send in order.
    ///
    /// Menu commands take priority over an in-flight registration, so
    /// "Register" mid-registration restarts it and "Weather" answers
    /// immediately without disturbing the stored step.
    pub async fn handle(&self, event: IncomingEvent) -> Vec<Reply> {
        match event.text.trim() {
            CMD_START => vec![self.main_menu(event.identity, GREETING)],
            BTN_REGISTER => {
                let prompt = self
                    .engine
                    .start(event.identity, event.display_name.clone())
                    .await;
                vec![Reply::prompt(prompt)]
            }
            BTN_WEATHER => vec![self.weather_reply().await],
            BTN_USERS => self.users_reply(event.identity).await,
            other => self.conversation_input(&event, other).await,
        }
    }

    fn main_menu(&self, identity: UserId, text: &str) -> Reply {
        Reply::new(
            text,
            Keyboard::MainMenu {
                is_admin: self.is_admin(identity),
            },
        )
    }

    async fn weather_reply(&self) -> Reply {
        match self.weather.fetch().await {
            Ok(weather) => {
                let temp = weather.temperature_celsius;
                Reply::new(
                    format!(
                        "{} Temperature in {}: {temp}°C",
                        weather_symbol(temp),
                        self.weather.location()
                    ),
                    Keyboard::None,
                )
            }
            Err(e) => {
                tracing::warn!(error = %e, "Weather lookup failed");
                Reply::new(WEATHER_FAILED, Keyboard::None)
            }
        }
    }

    async fn users_reply(&self, identity: UserId) -> Vec<Reply> {
        if !self.is_admin(identity) {
            return vec![Reply::new(NO_ACCESS, Keyboard::None)];
        }

        match self.profiles.get_all().await {
            Ok(profiles) => listing::format_listing(&profiles, MESSAGE_LIMIT)
                .into_iter()
                .map(|chunk| Reply::new(chunk, Keyboard::None))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list profiles");
                vec![Reply::new(STORAGE_FAILED, Keyboard::None)]
            }
        }
    }

    async fn conversation_input(&self, event: &IncomingEvent, text: &str) -> Vec<Reply> {
        match self.engine.advance(event.identity, text).await {
            Ok(AdvanceResult::NoActiveConversation) => {
                // Out-of-band text with nothing in progress: show the menu.
                vec![self.main_menu(event.identity, GREETING)]
            }
            Ok(AdvanceResult::Rejected { prompt, .. }) => {
                vec![Reply::new(rejection_text(prompt.choices), match prompt.choices {
                    ChoiceSet::None => Keyboard::None,
                    choices => Keyboard::Choices(choices),
                })]
            }
            Ok(AdvanceResult::Progressed(prompt)) => vec![Reply::prompt(prompt)],
            Ok(AdvanceResult::Completed(profile)) => {
                vec![self.main_menu(profile.identity, REGISTERED)]
            }
            Err(e) => {
                tracing::error!(identity = %event.identity, error = %e, "Profile write failed");
                vec![Reply::new(STORAGE_FAILED, Keyboard::None)]
            }
        }
    }
}

/// The re-prompt shown when input for a step is rejected.
fn rejection_text(choices: ChoiceSet) -> &'static str {
    match choices {
        ChoiceSet::GenderOptions => "Please choose your gender using the buttons.",
        ChoiceSet::HourOptions => "Please choose the hour using the buttons.",
        ChoiceSet::MinuteOptions => "Please choose the minutes using the buttons.",
        ChoiceSet::None => "The frequency cannot be empty. Enter, for example, daily or weekly.",
    }
}
