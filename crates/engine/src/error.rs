//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the builder engine.
///
/// Absent keys in section data are never errors — a missing field simply
/// means "not editable, not rendered." Structural violations (duplicate
/// ids, last-page removal, unmet publish preconditions) are hard errors
/// raised synchronously at the call site.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad name, slug, template id, or otherwise malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown page, section, template, or deployment id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An id collided with an existing one on create.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A page slug collided with an existing page.
    #[error("slug already in use: {0}")]
    SlugConflict(String),

    /// Attempt to remove the only remaining page.
    #[error("cannot remove the last page")]
    LastPage,

    /// A publish operation was attempted without its precondition met.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Network or backend failure. Never interpreted as success.
    #[error("transport error: {0}")]
    Transport(String),
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`] with an owned id.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
