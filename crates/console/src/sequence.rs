//! The sequence being composed for the next submission.
//!
//! Wraps the pure [`SequenceBuilder`] and turns its outcomes into
//! notifications.

use std::sync::Arc;

use scriptdeck_core::error::CoreError;
use scriptdeck_core::sequence::SequenceBuilder;
use scriptdeck_core::types::ScriptId;
use tokio::sync::RwLock;

use crate::error::ConsoleResult;
use crate::notifications::NotificationSink;

pub struct Sequence {
    builder: RwLock<SequenceBuilder>,
    notifications: Arc<NotificationSink>,
}

impl Sequence {
    pub fn new(notifications: Arc<NotificationSink>) -> Self {
        Self {
            builder: RwLock::new(SequenceBuilder::new()),
            notifications,
        }
    }

    /// Append a script. A duplicate leaves the sequence unchanged and
    /// raises a warning.
    pub async fn add(&self, script_id: impl Into<ScriptId>) -> ConsoleResult<()> {
        let script_id = script_id.into();
        let result = self.builder.write().await.add(script_id.clone());

        match result {
            Ok(()) => {
                tracing::debug!(script_id = %script_id, "Script added to sequence");
                self.notifications
                    .info(format!("Added {script_id} to the sequence"))
                    .await;
                Ok(())
            }
            Err(e) => {
                self.notifications.warning(e.to_string()).await;
                Err(e.into())
            }
        }
    }

    /// Remove the script at `index`. An out-of-range index is only logged.
    pub async fn remove_at(&self, index: usize) -> ConsoleResult<ScriptId> {
        let result = self.builder.write().await.remove_at(index);
        match result {
            Ok(removed) => {
                tracing::debug!(script_id = %removed, index, "Script removed from sequence");
                Ok(removed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring sequence removal");
                Err(e.into())
            }
        }
    }

    pub async fn clear(&self) {
        self.builder.write().await.clear();
    }

    /// Remove the scripts of an accepted submission. Scripts added while
    /// the request was in flight stay queued.
    pub async fn consume_submitted(&self, submitted: &[ScriptId]) {
        self.builder.write().await.remove_submitted(submitted);
    }

    /// The scripts to submit, or [`CoreError::EmptySequence`].
    pub async fn to_submission(&self) -> Result<Vec<ScriptId>, CoreError> {
        self.builder.read().await.to_submission()
    }

    pub async fn scripts(&self) -> Vec<ScriptId> {
        self.builder.read().await.scripts().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.builder.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.builder.read().await.is_empty()
    }
}
