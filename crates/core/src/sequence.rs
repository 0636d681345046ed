//! Ordered, duplicate-free list of scripts composed before submission.

use crate::error::CoreError;
use crate::types::ScriptId;

/// In-memory builder for the script sequence of the next task.
///
/// Insertion order is execution order. A script may appear at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceBuilder {
    scripts: Vec<ScriptId>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a script, rejecting duplicates without changing state.
    pub fn add(&mut self, script_id: impl Into<ScriptId>) -> Result<(), CoreError> {
        let script_id = script_id.into();
        if self.contains(&script_id) {
            return Err(CoreError::DuplicateScript(script_id));
        }
        self.scripts.push(script_id);
        Ok(())
    }

    /// Remove and return the script at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<ScriptId, CoreError> {
        if index >= self.scripts.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.scripts.len(),
            });
        }
        Ok(self.scripts.remove(index))
    }

    pub fn clear(&mut self) {
        self.scripts.clear();
    }

    /// Drop every script in `submitted`, keeping anything added since.
    pub fn remove_submitted(&mut self, submitted: &[ScriptId]) {
        self.scripts.retain(|s| !submitted.contains(s));
    }

    pub fn contains(&self, script_id: &str) -> bool {
        self.scripts.iter().any(|s| s == script_id)
    }

    pub fn scripts(&self) -> &[ScriptId] {
        &self.scripts
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Snapshot for submission; fails on an empty sequence.
    pub fn to_submission(&self) -> Result<Vec<ScriptId>, CoreError> {
        if self.scripts.is_empty() {
            return Err(CoreError::EmptySequence);
        }
        Ok(self.scripts.clone())
    }
}
