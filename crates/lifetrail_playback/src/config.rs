// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation timing and speed presets.

use serde::{Deserialize, Serialize};

/// Shortest selectable path animation
pub const PATH_DURATION_MIN_MS: u64 = 500;
/// Longest selectable path animation
pub const PATH_DURATION_MAX_MS: u64 = 8000;
/// Path animation slider step
pub const PATH_DURATION_STEP_MS: u64 = 200;

/// Timing configuration for transitions and overlays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Stroke reveal/retract duration
    pub path_duration_ms: u64,
    /// Delay between the connection reveal and the event reveal
    pub phase_delay_ms: u64,
    /// Delay between consecutive retractions
    pub retract_stagger_ms: u64,
    /// Extra time the in-progress flag is held past the path duration
    pub settle_margin_ms: u64,
    /// Duration used for everything while scrubbing
    pub drag_duration_ms: u64,
    /// Highlight auto-reversion timeout
    pub highlight_timeout_ms: u64,
    /// Fade-out of a highlight being replaced
    pub highlight_fade_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            path_duration_ms: 2000,
            phase_delay_ms: 500,
            retract_stagger_ms: 100,
            settle_margin_ms: 100,
            drag_duration_ms: 16,
            highlight_timeout_ms: 4000,
            highlight_fade_ms: 250,
        }
    }
}

impl AnimationConfig {
    /// Set the path duration, snapped to the nearest step and clamped to the selectable range
    pub fn set_path_duration(&mut self, duration_ms: u64) {
        let steps = duration_ms.saturating_add(PATH_DURATION_STEP_MS / 2) / PATH_DURATION_STEP_MS;
        self.path_duration_ms =
            (steps * PATH_DURATION_STEP_MS).clamp(PATH_DURATION_MIN_MS, PATH_DURATION_MAX_MS);
    }

    /// How long a transition holds the in-progress flag before the safety reset
    pub fn animation_guard_ms(&self) -> u64 {
        self.path_duration_ms + self.settle_margin_ms
    }

    /// Effective timings, collapsed while scrubbing
    pub fn timing(&self, dragging: bool) -> Timing {
        if dragging {
            Timing {
                path_ms: self.drag_duration_ms,
                phase_delay_ms: self.drag_duration_ms,
                stagger_ms: 0,
            }
        } else {
            Timing {
                path_ms: self.path_duration_ms,
                phase_delay_ms: self.phase_delay_ms,
                stagger_ms: self.retract_stagger_ms,
            }
        }
    }
}

/// Timings applied to one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Stroke duration
    pub path_ms: u64,
    /// Delay before the event segment reveal
    pub phase_delay_ms: u64,
    /// Delay between retractions
    pub stagger_ms: u64,
}

/// Named camera speed tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpeedPreset {
    /// Leisurely
    Slow,
    /// Default
    #[default]
    Normal,
    /// Brisk
    Fast,
    /// No camera animation
    Instant,
}

impl SpeedPreset {
    /// Duration of a region fit
    pub fn follow_ms(&self) -> u64 {
        match self {
            Self::Slow => 2000,
            Self::Normal => 1200,
            Self::Fast => 600,
            Self::Instant => 0,
        }
    }

    /// Duration of a point pan
    pub fn pan_ms(&self) -> u64 {
        match self {
            Self::Slow => 600,
            Self::Normal => 300,
            Self::Fast => 150,
            Self::Instant => 0,
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::Instant => "Instant",
        }
    }
}

/// Camera duration tiers, selected independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpeeds {
    /// Tier for region fits
    pub follow: SpeedPreset,
    /// Tier for point pans
    pub pan: SpeedPreset,
}

impl CameraSpeeds {
    /// Region fit duration
    pub fn follow_ms(&self) -> u64 {
        self.follow.follow_ms()
    }

    /// Point pan duration
    pub fn pan_ms(&self) -> u64 {
        self.pan.pan_ms()
    }
}

/// Autoplay interval tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaySpeed {
    /// One event every two seconds
    Slow,
    /// One event per second
    #[default]
    Normal,
    /// Two events per second
    Fast,
    /// Four events per second
    VeryFast,
}

impl PlaySpeed {
    /// Interval between autoplay steps
    pub fn interval_ms(&self) -> u64 {
        match self {
            Self::Slow => 2000,
            Self::Normal => 1000,
            Self::Fast => 500,
            Self::VeryFast => 250,
        }
    }
}
