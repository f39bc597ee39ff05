// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback coordination for Lifetrail.
//!
//! This crate turns a resolved [`lifetrail_geo::Trajectory`] into an animated
//! replay:
//! - A playback state machine with an animation-in-progress guard
//! - A path sequencer revealing and retracting segments in timed phases
//! - Advisory camera targets for each transition
//! - Temporary highlight overlays
//!
//! ## Architecture
//!
//! [`ReplaySession`] is the single owner of all mutable state. Delayed effects
//! are timers on a virtual clock ([`timer::Scheduler`]) that only moves when
//! the session is advanced, so a replay is fully deterministic. Every timer
//! belonging to a transition carries its [`TransitionId`]; accepting a new
//! transition cancels the old one's timers and settles its segments first.

pub mod camera;
pub mod config;
pub mod easing;
pub mod error;
pub mod frame;
pub mod highlight;
pub mod segment;
pub mod sequencer;
pub mod session;
pub mod state;
pub mod timer;

pub use camera::{CameraCommand, CameraController};
pub use config::{AnimationConfig, CameraSpeeds, PlaySpeed, SpeedPreset, Timing};
pub use easing::Easing;
pub use error::{Result, SessionError};
pub use frame::{DetailRow, EventCard, Frame, LocationDetail, MarkerDescriptor, Progress, SegmentView};
pub use highlight::{HighlightManager, HighlightOutcome, HighlightOverlay, HighlightPhase};
pub use segment::{PathSegment, SegmentId, SegmentKind, SegmentStyle, Stroke};
pub use sequencer::{PathSequencer, PlanMode, SequencePhase, TransitionPlan};
pub use session::ReplaySession;
pub use state::{
    Direction, NavKey, Phase, PlaybackMachine, PlaybackState, SeekRejection, SeekRequest,
    Transition,
};
pub use timer::{Scheduler, TimerId, TransitionId};
