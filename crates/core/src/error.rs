use crate::types::ScriptId;

/// Domain-level failures raised before any request reaches the
/// execution service.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    /// A submission was attempted with no scripts selected.
    #[error("Cannot submit an empty sequence")]
    EmptySequence,

    /// The script is already part of the sequence being built.
    #[error("Script '{0}' is already in the sequence")]
    DuplicateScript(ScriptId),

    /// A removal targeted a position past the end of the sequence.
    #[error("Index {index} is out of range for a sequence of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Validation failed: {0}")]
    Validation(String),
}
