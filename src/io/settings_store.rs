use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::event::UserId;
use crate::model::settings::UserSettings;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("settings backend error: {0}")]
    Backend(String),
}

/// Durable per-user settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for a user; defaults when nothing was stored
    async fn get(&self, user: &UserId) -> Result<UserSettings, SettingsError>;

    async fn put(&self, user: &UserId, settings: UserSettings) -> Result<(), SettingsError>;
}

/// Settings kept in process memory
#[derive(Default)]
pub struct MemorySettingsStore {
    inner: Mutex<BTreeMap<UserId, UserSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        MemorySettingsStore::default()
    }

    /// Copy of every user's settings, for persisting
    pub async fn snapshot(&self) -> BTreeMap<UserId, UserSettings> {
        self.inner.lock().await.clone()
    }

    /// Replace the table with previously persisted settings
    pub async fn restore(&self, settings: BTreeMap<UserId, UserSettings>) {
        *self.inner.lock().await = settings;
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, user: &UserId) -> Result<UserSettings, SettingsError> {
        Ok(self.inner.lock().await.get(user).cloned().unwrap_or_default())
    }

    async fn put(&self, user: &UserId, settings: UserSettings) -> Result<(), SettingsError> {
        self.inner.lock().await.insert(user.clone(), settings);
        Ok(())
    }
}
