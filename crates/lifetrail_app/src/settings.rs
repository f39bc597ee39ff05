// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings persisted between runs.
//!
//! Stored as a RON file. Files written by a newer build are refused rather
//! than partially understood; a missing file means defaults.

use crate::error::{AppError, Result};
use lifetrail_geo::ResolverConfig;
use lifetrail_playback::{AnimationConfig, CameraSpeeds, PlaySpeed};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "lifetrail.ron";

/// Everything the viewer remembers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Settings format version
    pub version: u32,
    /// Path animation timing
    pub animation: AnimationConfig,
    /// Camera duration tiers
    pub camera: CameraSpeeds,
    /// Autoplay interval tier
    pub play_speed: PlaySpeed,
    /// Place name composition
    pub resolver: ResolverConfig,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            animation: AnimationConfig::default(),
            camera: CameraSpeeds::default(),
            play_speed: PlaySpeed::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl ViewerSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: ViewerSettings =
            ron::from_str(&content).map_err(|source| AppError::SettingsParse {
                path: path.to_path_buf(),
                source,
            })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(AppError::SettingsVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;

        std::fs::write(path, content).map_err(|source| AppError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrail_playback::SpeedPreset;

    #[test]
    fn test_default_settings() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.animation.path_duration_ms, 2000);
        assert_eq!(settings.play_speed, PlaySpeed::Normal);
        assert_eq!(settings.resolver.home_country, "中国");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let mut settings = ViewerSettings::default();
        settings.animation.set_path_duration(3000);
        settings.camera.follow = SpeedPreset::Slow;
        settings.play_speed = PlaySpeed::Fast;
        settings.save(&path).unwrap();

        let loaded = ViewerSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ron");
        assert_eq!(ViewerSettings::load_or_default(&path).unwrap(), ViewerSettings::default());
        assert!(matches!(ViewerSettings::load(&path), Err(AppError::SettingsIo { .. })));
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "(version: 99)").unwrap();

        let result = ViewerSettings::load(&path);
        assert!(matches!(
            result,
            Err(AppError::SettingsVersion { found: 99, supported: SETTINGS_FORMAT_VERSION })
        ));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "(version: 1, play_speed: VeryFast)").unwrap();

        let loaded = ViewerSettings::load(&path).unwrap();
        assert_eq!(loaded.play_speed, PlaySpeed::VeryFast);
        assert_eq!(loaded.animation, AnimationConfig::default());
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "(version: ").unwrap();
        assert!(matches!(ViewerSettings::load(&path), Err(AppError::SettingsParse { .. })));
    }
}
