//! Session and settings persistence over any [`StoragePort`].
//!
//! Values are JSON under fixed keys. Saves serialize the snapshot right away
//! and finish the write on a spawned task; a failed write is logged.

use std::rc::Rc;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use lanshan_core::ports::{SessionRepository, StoragePort};
use lanshan_types::{
    Result,
    config::ChatSettings,
    session::PersistedState,
};

pub const SESSIONS_KEY: &str = "deepseek-sessions";
pub const SETTINGS_KEY: &str = "ai-settings";

pub struct StorageRepository {
    storage: Rc<dyn StoragePort>,
}

impl StorageRepository {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn spawn_write(&self, key: &'static str, bytes: Vec<u8>) {
        let storage = self.storage.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match storage.set(key, &bytes).await {
                Ok(()) => log::debug!("saved {} ({} bytes)", key, bytes.len()),
                Err(e) => log::warn!("failed to save {}: {}", key, e),
            }
        });
    }
}

#[async_trait(?Send)]
impl SessionRepository for StorageRepository {
    async fn load_sessions(&self) -> Result<Option<PersistedState>> {
        self.read(SESSIONS_KEY).await
    }

    async fn load_settings(&self) -> Result<Option<ChatSettings>> {
        self.read(SETTINGS_KEY).await
    }

    fn save_sessions(&self, state: &PersistedState) -> Result<()> {
        self.spawn_write(SESSIONS_KEY, serde_json::to_vec(state)?);
        Ok(())
    }

    fn save_settings(&self, settings: &ChatSettings) -> Result<()> {
        self.spawn_write(SETTINGS_KEY, serde_json::to_vec(settings)?);
        Ok(())
    }
}
