// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session errors.

/// Errors surfaced by [`crate::ReplaySession`] queries.
///
/// Invalid seeks are not errors; they are dropped and logged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No trajectory has been loaded
    #[error("No trajectory loaded")]
    NotReady,

    /// An event index outside the trajectory
    #[error("Event index {index} out of range (trajectory has {len} events)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of events
        len: usize,
    },

    /// Serializing an event record failed
    #[error("Failed to export event: {0}")]
    Export(#[from] serde_json::Error),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
