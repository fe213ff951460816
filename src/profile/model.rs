//! Profile data model.

use serde::{Deserialize, Serialize};

/// Stable per-user key used for all state and profile lookups.
///
/// Supplied by the transport (the numeric Telegram user id), never
/// generated internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gender choice offered during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// The button label shown to the user for this option.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Parse an exact option label. Anything else is rejected.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }

    /// All options, in button order.
    pub fn options() -> [Gender; 2] {
        [Self::Male, Self::Female]
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Daily time of the notification, in the user's chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTime {
    /// 0..=23
    pub hour: u8,
    /// 0..=59, multiple of 5
    pub minute: u8,
}

impl std::fmt::Display for NotificationTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

/// Completed, durable registration record for one identity.
///
/// Written only by a successful final registration step; an upsert for the
/// same identity replaces the prior profile entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub identity: UserId,
    pub display_name: Option<String>,
    pub gender: Gender,
    pub notification_time: NotificationTime,
    pub notification_frequency: String,
}
