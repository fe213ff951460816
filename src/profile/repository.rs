//! Backend-agnostic profile storage trait.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::profile::model::{Profile, UserId};

/// Durable store of completed profiles, keyed by identity.
///
/// `upsert` has create-if-absent-else-overwrite semantics: at most one
/// profile exists per identity at any time. Concurrent upserts for
/// different identities must not corrupt each other or `get_all`.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create or fully replace the profile for `profile.identity`.
    async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError>;

    /// Fetch one profile by identity.
    async fn get(&self, identity: UserId) -> Result<Option<Profile>, RepositoryError>;

    /// All stored profiles, in stable identity order.
    async fn get_all(&self) -> Result<Vec<Profile>, RepositoryError>;
}
