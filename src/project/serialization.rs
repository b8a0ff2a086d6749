// Serialization utilities for sequence snapshots

use crate::project::types::{SNAPSHOT_VERSION, SequenceSnapshot};
use crate::project::{ProjectError, ProjectResult};
use ron::{from_str as ron_from_str, to_string as ron_to_string};

fn check_version(snapshot: SequenceSnapshot) -> ProjectResult<SequenceSnapshot> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(ProjectError::UnsupportedVersion {
            found: snapshot.version,
            supported: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot)
}

/// Serialize a snapshot to RON format
pub fn serialize_to_ron(snapshot: &SequenceSnapshot) -> ProjectResult<String> {
    ron_to_string(snapshot).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to serialize to RON: {}", e))
    })
}

/// Deserialize a snapshot from RON format
pub fn deserialize_from_ron(ron_data: &str) -> ProjectResult<SequenceSnapshot> {
    let snapshot = ron_from_str(ron_data).map_err(|e| {
        ProjectError::SerializationError(format!("Failed to deserialize from RON: {}", e))
    })?;
    check_version(snapshot)
}

/// Deserialize from RON and validate for a sequencer with `track_count` tracks
pub fn restore_from_ron(ron_data: &str, track_count: usize) -> ProjectResult<SequenceSnapshot> {
    let mut snapshot = deserialize_from_ron(ron_data)?;
    snapshot.validate(track_count)?;
    Ok(snapshot)
}

/// Serialize a snapshot to pretty-printed JSON
pub fn serialize_to_json(snapshot: &SequenceSnapshot) -> ProjectResult<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Deserialize a snapshot from JSON
pub fn deserialize_from_json(json_data: &str) -> ProjectResult<SequenceSnapshot> {
    check_version(serde_json::from_str(json_data)?)
}
