//! Error types for matchup-core.

use crate::types::PairId;
use thiserror::Error;

/// Result type alias using ContentError.
pub type Result<T> = std::result::Result<T, ContentError>;

/// Errors that can occur while loading lesson content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid lesson JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate pair ID {id}")]
    DuplicateId { id: PairId },

    #[error("pair {id} has an empty {field}")]
    EmptyField { id: PairId, field: &'static str },

    #[error("missing question at line {line}")]
    MissingQuestion { line: usize },

    #[error("missing answer at line {line}")]
    MissingAnswer { line: usize },

    #[error("invalid ID format at line {line}: {value}")]
    InvalidId { line: usize, value: String },
}

/// A side-effect hook failed (audio denied, asset missing, ...).
#[derive(Debug, Error)]
pub enum EffectError {
    #[error("playback rejected: {0}")]
    Rejected(String),

    #[error("asset unavailable: {0}")]
    Unavailable(String),
}

/// The preference store could not persist a value.
#[derive(Debug, Error)]
#[error("preference store error: {0}")]
pub struct PreferenceError(pub String);
