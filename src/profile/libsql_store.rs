//! libSQL-backed profile store.
//!
//! Supports local file and in-memory databases. `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use; the unit of atomicity
//! is one identity's row.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::error::RepositoryError;
use crate::profile::migrations;
use crate::profile::model::{Gender, NotificationTime, Profile, UserId};
use crate::profile::repository::ProfileRepository;

/// libSQL profile repository backend.
pub struct LibSqlProfileStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlProfileStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RepositoryError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| RepositoryError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| RepositoryError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Profile database opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, RepositoryError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                RepositoryError::Open(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| RepositoryError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }
}

// ── Row mapping helpers ─────────────────────────────────────────────

fn gender_to_str(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
    }
}

fn str_to_gender(s: &str, identity: i64) -> Result<Gender, RepositoryError> {
    match s {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        other => Err(RepositoryError::CorruptRow {
            identity,
            reason: format!("unknown gender {other:?}"),
        }),
    }
}

fn row_to_profile(row: &libsql::Row) -> Result<Profile, RepositoryError> {
    let map_err = |e: libsql::Error| RepositoryError::Query(e.to_string());

    let identity: i64 = row.get(0).map_err(map_err)?;
    let display_name: Option<String> = row.get(1).map_err(map_err)?;
    let gender_str: String = row.get(2).map_err(map_err)?;
    let hour: i64 = row.get(3).map_err(map_err)?;
    let minute: i64 = row.get(4).map_err(map_err)?;
    let frequency: String = row.get(5).map_err(map_err)?;

    let to_u8 = |v: i64, field: &str| -> Result<u8, RepositoryError> {
        u8::try_from(v).map_err(|_| RepositoryError::CorruptRow {
            identity,
            reason: format!("{field} out of range: {v}"),
        })
    };

    Ok(Profile {
        identity: UserId(identity),
        display_name,
        gender: str_to_gender(&gender_str, identity)?,
        notification_time: NotificationTime {
            hour: to_u8(hour, "notification_hour")?,
            minute: to_u8(minute, "notification_minute")?,
        },
        notification_frequency: frequency,
    })
}

const PROFILE_COLUMNS: &str = "identity, display_name, gender, \
     notification_hour, notification_minute, notification_frequency";

#[async_trait]
impl ProfileRepository for LibSqlProfileStore {
    async fn upsert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO profiles (identity, display_name, gender, \
                 notification_hour, notification_minute, notification_frequency, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
                 ON CONFLICT(identity) DO UPDATE SET \
                 display_name = excluded.display_name, \
                 gender = excluded.gender, \
                 notification_hour = excluded.notification_hour, \
                 notification_minute = excluded.notification_minute, \
                 notification_frequency = excluded.notification_frequency, \
                 updated_at = excluded.updated_at",
                params![
                    profile.identity.0,
                    profile.display_name.clone(),
                    gender_to_str(profile.gender),
                    profile.notification_time.hour as i64,
                    profile.notification_time.minute as i64,
                    profile.notification_frequency.clone(),
                    now,
                ],
            )
            .await
            .map_err(|e| RepositoryError::Query(format!("upsert profile: {e}")))?;

        tracing::debug!(identity = %profile.identity, "Profile upserted");
        Ok(())
    }

    async fn get(&self, identity: UserId) -> Result<Option<Profile>, RepositoryError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE identity = ?1"),
                params![identity.0],
            )
            .await
            .map_err(|e| RepositoryError::Query(format!("get profile: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| RepositoryError::Query(format!("get profile: {e}")))?
        {
            Some(row) => Ok(Some(row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Profile>, RepositoryError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY identity"),
                (),
            )
            .await
            .map_err(|e| RepositoryError::Query(format!("list profiles: {e}")))?;

        let mut profiles = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| RepositoryError::Query(format!("list profiles: {e}")))?
        {
            profiles.push(row_to_profile(&row)?);
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, freq: &str) -> Profile {
        Profile {
            identity: UserId(id),
            display_name: Some(format!("user{id}")),
            gender: Gender::Female,
            notification_time: NotificationTime {
                hour: 14,
                minute: 30,
            },
            notification_frequency: freq.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_roundtrip() {
        let store = LibSqlProfileStore::new_memory().await.unwrap();
        let profile = sample(1, "daily");
        store.upsert(&profile).await.unwrap();

        let fetched = store.get(UserId(1)).await.unwrap().unwrap();
        assert_eq!(fetched, profile);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = LibSqlProfileStore::new_memory().await.unwrap();
        assert!(store.get(UserId(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_overwrites_not_duplicates() {
        let store = LibSqlProfileStore::new_memory().await.unwrap();
        store.upsert(&sample(1, "daily")).await.unwrap();
        store.upsert(&sample(1, "weekly")).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].notification_frequency, "weekly");
    }

    #[tokio::test]
    async fn get_all_is_identity_ordered() {
        let store = LibSqlProfileStore::new_memory().await.unwrap();
        for id in [30, 10, 20] {
            store.upsert(&sample(id, "daily")).await.unwrap();
        }

        let all = store.get_all().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|p| p.identity.0).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn null_display_name_roundtrips() {
        let store = LibSqlProfileStore::new_memory().await.unwrap();
        let mut profile = sample(7, "daily");
        profile.display_name = None;
        store.upsert(&profile).await.unwrap();

        let fetched = store.get(UserId(7)).await.unwrap().unwrap();
        assert_eq!(fetched.display_name, None);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("profiles.db");

        {
            let store = LibSqlProfileStore::new_local(&db_path).await.unwrap();
            store.upsert(&sample(5, "weekly")).await.unwrap();
        }

        let store = LibSqlProfileStore::new_local(&db_path).await.unwrap();
        let fetched = store.get(UserId(5)).await.unwrap().unwrap();
        assert_eq!(fetched.notification_frequency, "weekly");
    }

    #[tokio::test]
    async fn new_local_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested").join("dir").join("profiles.db");
        let _store = LibSqlProfileStore::new_local(&db_path).await.unwrap();
        assert!(db_path.exists());
    }
}
