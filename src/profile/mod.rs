//! Completed registration profiles and their durable storage.

pub mod libsql_store;
pub mod migrations;
pub mod model;
pub mod repository;

pub use libsql_store::LibSqlProfileStore;
pub use model::{Gender, NotificationTime, Profile, UserId};
pub use repository::ProfileRepository;
