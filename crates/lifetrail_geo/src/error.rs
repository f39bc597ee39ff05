// SPDX-License-Identifier: MIT OR Apache-2.0
//! Load errors for trajectory inputs.

use std::path::PathBuf;

/// Error raised while loading or validating the static inputs.
///
/// Any of these halts initialization: playback never starts on partial data.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Input is not valid JSON for the expected shape
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The event list contained no events
    #[error("Trajectory contains no events")]
    EmptyTrajectory,

    /// The coordinate table contained no usable entries
    #[error("Coordinate table contains no usable entries")]
    EmptyCoordinateTable,

    /// An event record failed validation
    #[error("Event {index} is malformed: {reason}")]
    InvalidEvent {
        /// Position of the record in the input list
        index: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;
