//! Weather bot — conversational registration over Telegram.

pub mod bot;
pub mod config;
pub mod error;
pub mod listing;
pub mod profile;
pub mod registration;
pub mod telegram;
pub mod weather;
