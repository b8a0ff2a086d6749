// Sequence snapshots - the opaque unit the persistence layer stores
// A snapshot holds every track plus the global scalars and is loaded atomically

pub mod serialization;
pub mod types;

use crate::sequencer::SequencerError;

pub use serialization::{
    deserialize_from_json, deserialize_from_ron, restore_from_ron, serialize_to_json,
    serialize_to_ron,
};
pub use types::{SNAPSHOT_VERSION, SequenceSnapshot};

/// Snapshot conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unsupported snapshot version {found} (newest known: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sequencer(#[from] SequencerError),
}

pub type ProjectResult<T> = Result<T, ProjectError>;
