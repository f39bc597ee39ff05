// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the command line front end.

use lifetrail_geo::LoadError;
use lifetrail_playback::SessionError;
use std::path::PathBuf;

/// Anything that stops a command from completing
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input files could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The session refused an operation
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Settings file could not be read or written
    #[error("Settings file {path}: {source}")]
    SettingsIo {
        /// Settings file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid RON
    #[error("Settings file {path} is malformed: {source}")]
    SettingsParse {
        /// Settings file
        path: PathBuf,
        /// Parser error with position
        #[source]
        source: ron::error::SpannedError,
    },

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    SettingsWrite(#[from] ron::Error),

    /// Settings were written by a newer build
    #[error("Settings version {found} is newer than supported version {supported}")]
    SettingsVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Frame could not be encoded as JSON
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    /// Async runtime could not start
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Result type for front end commands
pub type Result<T> = std::result::Result<T, AppError>;
