//! Cached list of scripts the execution service can run.

use std::sync::Arc;

use scriptdeck_client::ExecutionService;
use scriptdeck_core::types::ScriptId;
use tokio::sync::RwLock;

use crate::error::{ConsoleError, ConsoleResult};

pub struct Catalog {
    service: Arc<dyn ExecutionService>,
    scripts: RwLock<Vec<ScriptId>>,
}

impl Catalog {
    pub fn new(service: Arc<dyn ExecutionService>) -> Self {
        Self {
            service,
            scripts: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the catalog and replace the cache.
    ///
    /// On failure the previous cache is kept and the failure is only
    /// logged; callers get [`ConsoleError::CatalogUnavailable`] back.
    pub async fn refresh(&self) -> ConsoleResult<Vec<ScriptId>> {
        match self.service.list_scripts().await {
            Ok(scripts) => {
                tracing::debug!(count = scripts.len(), "Script catalog loaded");
                *self.scripts.write().await = scripts.clone();
                Ok(scripts)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load script catalog, keeping cached list");
                Err(ConsoleError::CatalogUnavailable(e))
            }
        }
    }

    pub async fn scripts(&self) -> Vec<ScriptId> {
        self.scripts.read().await.clone()
    }

    /// The entry a picker starts on: the first script in the catalog.
    pub async fn default_selection(&self) -> Option<ScriptId> {
        self.scripts.read().await.first().cloned()
    }

    pub async fn contains(&self, script_id: &str) -> bool {
        self.scripts.read().await.iter().any(|s| s == script_id)
    }

    pub async fn is_empty(&self) -> bool {
        self.scripts.read().await.is_empty()
    }
}
