use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::domain::UserSession;
use storage::SessionStore;

use crate::SessionCache;

/// Sqlite-backed implementation of the session cache, so the signed-in
/// user survives app restarts.
pub struct DurableSessionCache {
    store: SessionStore,
}

impl DurableSessionCache {
    pub async fn initialize(database_url: &str) -> Result<Arc<Self>> {
        let store = SessionStore::new(database_url)
            .await
            .with_context(|| format!("failed to initialize session cache at '{database_url}'"))?;
        Ok(Arc::new(Self { store }))
    }

    pub fn sqlite_url_for_data_dir(base_dir: &Path) -> String {
        format!(
            "sqlite://{}",
            base_dir.join("session_cache.sqlite3").display()
        )
    }
}

#[async_trait]
impl SessionCache for DurableSessionCache {
    async fn load(&self) -> Result<Option<UserSession>> {
        self.store.load_session().await
    }

    async fn save(&self, session: &UserSession) -> Result<()> {
        self.store.save_session(session).await
    }

    async fn clear(&self) -> Result<()> {
        self.store.clear_session().await
    }
}
