// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback position and the animation-in-progress guard.

use crate::config::PlaySpeed;
use serde::{Deserialize, Serialize};

/// Lifecycle of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No trajectory loaded
    #[default]
    Idle,
    /// Trajectory loaded and `current_index` valid
    Ready,
}

/// Direction of the most recent transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward later events
    Forward,
    /// Toward earlier events
    Backward,
    /// Re-selection of the same event
    None,
}

impl Direction {
    /// Direction from `from` to `to`
    pub fn between(from: usize, to: usize) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Self::Forward,
            std::cmp::Ordering::Less => Self::Backward,
            std::cmp::Ordering::Equal => Self::None,
        }
    }
}

/// Position in the event sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Selected event
    pub current_index: usize,
    /// Event selected before the last accepted seek
    pub previous_index: usize,
    /// Guard against overlapping programmatic transitions
    pub is_animating: bool,
}

impl PlaybackState {
    /// Direction of the last accepted seek
    pub fn direction(&self) -> Direction {
        Direction::between(self.previous_index, self.current_index)
    }
}

/// A request to move the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekRequest {
    /// Target event index
    pub target: usize,
    /// Whether to animate the transition
    pub animated: bool,
    /// Whether the request comes directly from the viewer
    pub user_initiated: bool,
}

impl SeekRequest {
    /// Animated, user-initiated seek
    pub fn user(target: usize) -> Self {
        Self { target, animated: true, user_initiated: true }
    }

    /// Animated seek issued by the engine itself, e.g. autoplay
    pub fn programmatic(target: usize) -> Self {
        Self { target, animated: true, user_initiated: false }
    }

    /// Instant, user-initiated jump
    pub fn jump(target: usize) -> Self {
        Self { target, animated: false, user_initiated: true }
    }
}

/// Why a seek was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekRejection {
    /// Nothing loaded yet
    NotReady,
    /// Target outside `[0, len - 1]`
    OutOfRange,
    /// A programmatic seek arrived while a transition is in progress
    AnimationInProgress,
}

/// An accepted seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Index before the seek
    pub from: usize,
    /// Index after the seek
    pub to: usize,
    /// Whether the transition animates
    pub animated: bool,
}

impl Transition {
    /// Direction of travel
    pub fn direction(&self) -> Direction {
        Direction::between(self.from, self.to)
    }

    /// Whether the selection actually changed
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }

    /// Whether this is a single animated step forward
    pub fn is_single_step_forward(&self) -> bool {
        self.animated && self.to == self.from + 1
    }
}

/// Navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavKey {
    /// Previous event
    Previous,
    /// Next event
    Next,
    /// First event
    First,
    /// Last event
    Last,
}

impl NavKey {
    /// Parse a key name as delivered by a keyboard layer
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "ArrowDown" | "Left" | "Down" => Some(Self::Previous),
            "ArrowRight" | "ArrowUp" | "Right" | "Up" => Some(Self::Next),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }
}

/// Owns the playback position.
///
/// All other components read [`PlaybackState`]; only this machine changes it.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMachine {
    phase: Phase,
    state: PlaybackState,
    len: usize,
    playing: bool,
    play_speed: PlaySpeed,
}

impl PlaybackMachine {
    /// Create an idle machine
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Ready` for a trajectory of `len` events, selecting the first
    pub fn load(&mut self, len: usize) {
        self.state = PlaybackState::default();
        self.playing = false;
        self.len = len;
        self.phase = if len == 0 { Phase::Idle } else { Phase::Ready };
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Selected event
    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the last event
    pub fn last_index(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Whether a transition is in progress
    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    /// Apply a seek request.
    ///
    /// Rejections leave the state untouched. An accepted seek that changes the
    /// index raises the in-progress guard when animated and drops it when not;
    /// the owner clears a raised guard once the transition has had its time.
    pub fn seek(&mut self, request: SeekRequest) -> Result<Transition, SeekRejection> {
        if self.phase != Phase::Ready {
            return Err(SeekRejection::NotReady);
        }
        if request.target >= self.len {
            return Err(SeekRejection::OutOfRange);
        }
        if self.state.is_animating && !request.user_initiated {
            return Err(SeekRejection::AnimationInProgress);
        }

        let transition = Transition {
            from: self.state.current_index,
            to: request.target,
            animated: request.animated,
        };
        self.state.previous_index = self.state.current_index;
        self.state.current_index = request.target;
        if transition.is_change() {
            self.state.is_animating = request.animated;
        }
        Ok(transition)
    }

    /// Clear the in-progress guard
    pub fn clear_animating(&mut self) {
        self.state.is_animating = false;
    }

    /// Target of a single step forward, clamped to the last event
    pub fn step_forward_target(&self) -> usize {
        (self.state.current_index + 1).min(self.last_index())
    }

    /// Target of a single step backward, clamped to the first event
    pub fn step_backward_target(&self) -> usize {
        self.state.current_index.saturating_sub(1)
    }

    /// Target for a navigation key, or `None` when it would not move
    pub fn navigate_target(&self, key: NavKey) -> Option<usize> {
        if self.phase != Phase::Ready {
            return None;
        }
        let target = match key {
            NavKey::Previous => self.step_backward_target(),
            NavKey::Next => self.step_forward_target(),
            NavKey::First => 0,
            NavKey::Last => self.last_index(),
        };
        (target != self.state.current_index).then_some(target)
    }

    /// Start autoplay; returns whether it started
    pub fn play(&mut self) -> bool {
        if self.phase != Phase::Ready || self.state.current_index >= self.last_index() {
            return false;
        }
        self.playing = true;
        true
    }

    /// Stop autoplay
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Whether autoplay is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Autoplay interval tier
    pub fn play_speed(&self) -> PlaySpeed {
        self.play_speed
    }

    /// Set the autoplay interval tier
    pub fn set_play_speed(&mut self, speed: PlaySpeed) {
        self.play_speed = speed;
    }

    /// Whether the selection is on the final event
    pub fn at_end(&self) -> bool {
        self.state.current_index >= self.last_index()
    }
}
