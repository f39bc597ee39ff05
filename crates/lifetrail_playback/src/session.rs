// SPDX-License-Identifier: MIT OR Apache-2.0
//! The replay engine object.
//!
//! [`ReplaySession`] owns every piece of playback state: the trajectory, the
//! state machine, the active segment set, highlight overlays, the location
//! group cache and the timer queue. Callers drive it with navigation calls and
//! [`ReplaySession::advance`], and read it back through [`ReplaySession::frame`].

use crate::camera::{CameraCommand, CameraController};
use crate::config::{AnimationConfig, CameraSpeeds, PlaySpeed};
use crate::error::{Result, SessionError};
use crate::frame::{EventCard, Frame, LocationDetail, MarkerDescriptor, Progress, SegmentView};
use crate::highlight::{HighlightManager, HighlightOutcome, HighlightTask};
use crate::segment::SegmentId;
use crate::sequencer::{PathSequencer, PlanMode, SequencerTask};
use crate::state::{NavKey, Phase, PlaybackMachine, PlaybackState, SeekRejection, SeekRequest, Transition};
use crate::timer::{Scheduler, TimerId, TransitionId};
use lifetrail_geo::{
    aggregate, progress_percent, CoordinateKey, Event, LocationGroups, Trajectory, TrajectoryStats,
};

/// Work scheduled on the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Sequencer(SequencerTask),
    /// Release the in-progress guard
    ClearAnimating,
    /// Force the sequencer to settle if its own timers have not
    SettleCheck,
    Highlight(HighlightTask),
    Autoplay,
}

/// Playback engine for one trajectory
#[derive(Debug, Default)]
pub struct ReplaySession {
    config: AnimationConfig,
    trajectory: Option<Trajectory>,
    machine: PlaybackMachine,
    sequencer: PathSequencer,
    camera: CameraController,
    highlights: HighlightManager,
    scheduler: Scheduler<Task>,
    groups: LocationGroups,
    transition: Option<TransitionId>,
    last_camera: Option<CameraCommand>,
    dragging: bool,
    autoplay_timer: Option<TimerId>,
}

impl ReplaySession {
    /// Create an idle session
    pub fn new(config: AnimationConfig, speeds: CameraSpeeds) -> Self {
        Self {
            config,
            camera: CameraController::new(speeds),
            ..Default::default()
        }
    }

    /// Load a trajectory and display its first event.
    ///
    /// Replaces any previous trajectory and drops all pending work.
    pub fn load(&mut self, trajectory: Trajectory) {
        self.scheduler.clear();
        self.transition = None;
        self.highlights.clear();
        self.autoplay_timer = None;
        self.dragging = false;
        self.last_camera = None;
        self.sequencer = PathSequencer::new();
        self.machine.load(trajectory.len());
        tracing::info!("Session ready with {} events", trajectory.len());
        self.trajectory = Some(trajectory);

        // Same-index seek renders the static initial state
        if let Err(rejection) = self.seek(0, false, true) {
            tracing::warn!("Initial display failed: {rejection:?}");
        }
    }

    /// Move the selection to `target`.
    ///
    /// Rejected requests change nothing and are only logged.
    pub fn seek(
        &mut self,
        target: usize,
        animated: bool,
        user_initiated: bool,
    ) -> std::result::Result<Transition, SeekRejection> {
        self.seek_request(SeekRequest { target, animated, user_initiated })
    }

    fn seek_request(&mut self, request: SeekRequest) -> std::result::Result<Transition, SeekRejection> {
        let transition = match self.machine.seek(request) {
            Ok(transition) => transition,
            Err(rejection) => {
                tracing::debug!("Seek to {} rejected: {rejection:?}", request.target);
                return Err(rejection);
            }
        };
        let Some(trajectory) = self.trajectory.as_ref() else {
            return Err(SeekRejection::NotReady);
        };
        let events = trajectory.events();
        let now = self.scheduler.now();
        let timing = self.config.timing(self.dragging);

        if transition.is_change() {
            if let Some(previous) = self.transition.take() {
                let cancelled = self.scheduler.cancel_owned_by(previous);
                if cancelled > 0 {
                    tracing::debug!("Cancelled {cancelled} timers of superseded transition");
                }
            }
        }

        let plan = self.sequencer.begin(events, transition, timing, now);

        if transition.is_change() {
            let id = TransitionId::new();
            let span = plan.tasks.iter().map(|(delay, _)| *delay).max();
            for (delay, task) in plan.tasks {
                self.scheduler.schedule(delay, Some(id), Task::Sequencer(task));
            }
            if let Some(span) = span {
                let check = span + timing.path_ms + self.config.settle_margin_ms;
                self.scheduler.schedule(check, Some(id), Task::SettleCheck);
            }
            if self.machine.is_animating() {
                let guard = timing.path_ms + self.config.settle_margin_ms;
                self.scheduler.schedule(guard, Some(id), Task::ClearAnimating);
            }
            self.transition = Some(id);
            tracing::debug!(
                "Transition {} -> {} ({:?}, {:?})",
                transition.from,
                transition.to,
                plan.mode,
                transition.direction()
            );
        }

        self.groups = aggregate(events, transition.to);
        if transition.is_change() || plan.mode == PlanMode::Rebuild {
            // Scrubbing frames each step instantly so the view keeps up with the pointer
            self.last_camera = self.camera.frame_transition(
                events,
                transition.to,
                transition.from,
                transition.animated && !self.dragging,
            );
        }
        self.highlights.retain_resident(&self.sequencer);

        Ok(transition)
    }

    /// Step one event forward, clamped to the last event
    pub fn step_forward(&mut self) -> std::result::Result<Transition, SeekRejection> {
        let target = self.machine.step_forward_target();
        self.seek_request(SeekRequest::user(target))
    }

    /// Step one event backward, clamped to the first event
    pub fn step_backward(&mut self) -> std::result::Result<Transition, SeekRejection> {
        let target = self.machine.step_backward_target();
        self.seek_request(SeekRequest::user(target))
    }

    /// Handle a navigation key; keys that would not move are ignored
    pub fn navigate(&mut self, key: NavKey) -> Option<Transition> {
        let target = self.machine.navigate_target(key)?;
        self.seek_request(SeekRequest::user(target)).ok()
    }

    /// Enter scrubbing mode: durations collapse until [`Self::end_drag`]
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// Scrub to `target`
    pub fn drag_to(&mut self, target: usize) -> std::result::Result<Transition, SeekRejection> {
        if !self.dragging {
            self.begin_drag();
        }
        self.seek_request(SeekRequest::user(target))
    }

    /// Leave scrubbing mode
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Whether scrubbing mode is active
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Emphasize the segment owned by `event_index`, toggling it off if already emphasized
    pub fn highlight(&mut self, event_index: usize, refocus: bool) -> HighlightOutcome {
        let now = self.scheduler.now();
        let (outcome, tasks) =
            self.highlights
                .request(event_index, refocus, &self.sequencer, &self.config, now);
        for (delay, task) in tasks {
            self.scheduler.schedule(delay, None, Task::Highlight(task));
        }
        if let HighlightOutcome::Applied(segment) = outcome {
            if refocus {
                self.refocus(segment);
            }
        }
        outcome
    }

    fn refocus(&mut self, segment: SegmentId) {
        if let Some(segment) = self.sequencer.segment(segment) {
            self.last_camera = self.camera.fit(&segment.points);
        }
    }

    /// Start autoplay; returns whether it started
    pub fn play(&mut self) -> bool {
        if !self.machine.play() {
            return false;
        }
        self.schedule_autoplay();
        tracing::info!("Autoplay started at {:?}", self.machine.play_speed());
        true
    }

    /// Stop autoplay
    pub fn pause(&mut self) {
        self.machine.pause();
        if let Some(timer) = self.autoplay_timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    /// Toggle autoplay; returns whether it is now playing
    pub fn toggle_play(&mut self) -> bool {
        if self.machine.is_playing() {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Change the autoplay interval, restarting it if running
    pub fn set_play_speed(&mut self, speed: PlaySpeed) {
        self.machine.set_play_speed(speed);
        if self.machine.is_playing() {
            self.schedule_autoplay();
        }
    }

    /// Whether autoplay is running
    pub fn is_playing(&self) -> bool {
        self.machine.is_playing()
    }

    fn schedule_autoplay(&mut self) {
        if let Some(timer) = self.autoplay_timer.take() {
            self.scheduler.cancel(timer);
        }
        let interval = self.machine.play_speed().interval_ms();
        self.autoplay_timer = Some(self.scheduler.schedule(interval, None, Task::Autoplay));
    }

    fn autoplay_tick(&mut self) {
        self.autoplay_timer = None;
        if !self.machine.is_playing() {
            return;
        }
        if !self.machine.at_end() {
            let target = self.machine.current_index() + 1;
            // Dropped while a transition is still in progress; the next tick retries
            let _ = self.seek_request(SeekRequest::programmatic(target));
        }
        if self.machine.at_end() {
            self.machine.pause();
            tracing::info!("Autoplay reached the final event");
        } else {
            self.schedule_autoplay();
        }
    }

    /// Advance the session clock by `delta_ms`, firing every timer that falls due
    pub fn advance(&mut self, delta_ms: u64) {
        let until = self.scheduler.now() + delta_ms;
        while let Some((_, task)) = self.scheduler.pop_due(until) {
            self.fire(task);
        }
        self.scheduler.advance_clock(until);
    }

    fn fire(&mut self, task: Task) {
        let now = self.scheduler.now();
        match task {
            Task::Sequencer(task) => {
                let Some(trajectory) = self.trajectory.as_ref() else {
                    return;
                };
                let follow_up = self.sequencer.handle(trajectory.events(), task, now);
                for (delay, next) in follow_up {
                    self.scheduler.schedule(delay, self.transition, Task::Sequencer(next));
                }
                self.highlights.retain_resident(&self.sequencer);
            }
            Task::ClearAnimating => {
                self.machine.clear_animating();
                tracing::debug!("Transition guard released");
            }
            Task::SettleCheck => {
                if self.sequencer.is_settled() {
                    return;
                }
                tracing::warn!("Path animation did not settle in time, forcing completion");
                if let Some(trajectory) = self.trajectory.as_ref() {
                    self.sequencer.settle(trajectory.events());
                }
                self.highlights.retain_resident(&self.sequencer);
            }
            Task::Highlight(task) => {
                let (applied, follow_up) =
                    self.highlights.handle(task, &self.sequencer, &self.config, now);
                for (delay, next) in follow_up {
                    self.scheduler.schedule(delay, None, Task::Highlight(next));
                }
                if let Some(applied) = applied.filter(|applied| applied.refocus) {
                    self.refocus(applied.segment);
                }
            }
            Task::Autoplay => self.autoplay_tick(),
        }
    }

    /// Read-only snapshot for rendering
    pub fn frame(&self) -> Frame {
        let now = self.scheduler.now();
        let state = self.machine.state();
        let total = self.machine.len();
        let current = self.current_event();
        let current_key = current.and_then(|event| event.end_coords).map(|coords| coords.key());
        let path_ms = self.config.timing(self.dragging).path_ms;

        let markers = self
            .groups
            .values()
            .map(|group| MarkerDescriptor::from_group(group, current_key.as_ref()))
            .collect();

        let segments = self
            .sequencer
            .segments()
            .map(|segment| {
                let overlay = self.highlights.overlay_for(segment.id);
                let style = overlay.map_or(segment.style(), |overlay| {
                    overlay.style_at(now, self.config.highlight_fade_ms)
                });
                let progress = match overlay {
                    Some(overlay) if !segment.is_reverse => overlay.reveal_progress(now, path_ms),
                    _ => segment.stroke.progress(now),
                };
                SegmentView {
                    id: segment.id,
                    kind: segment.kind(),
                    event_index: segment.event_index(),
                    points: segment.points.clone(),
                    style,
                    is_latest: segment.is_latest,
                    is_reverse: segment.is_reverse,
                    progress,
                    highlighted: overlay.is_some(),
                }
            })
            .collect();

        Frame {
            now_ms: now,
            phase: self.machine.phase(),
            state,
            direction: state.direction(),
            sequence_phase: self.sequencer.phase(),
            is_playing: self.machine.is_playing(),
            progress: Progress {
                position: if total == 0 { 0 } else { state.current_index + 1 },
                total,
                percent: progress_percent(state.current_index, total),
            },
            event: current.map(EventCard::from_event),
            markers,
            segments,
            camera: self.last_camera,
            highlight: self.highlights.active().copied(),
        }
    }

    /// Detail panel data for a location group
    pub fn location_detail(&self, key: &CoordinateKey) -> Option<LocationDetail> {
        let group = self.groups.get(key)?;
        Some(LocationDetail::from_group(group, self.machine.current_index()))
    }

    /// Statistics over the whole trajectory
    pub fn statistics(&self) -> Result<TrajectoryStats> {
        let trajectory = self.trajectory.as_ref().ok_or(SessionError::NotReady)?;
        Ok(TrajectoryStats::compute(trajectory.events()))
    }

    /// Source record of an event as pretty JSON
    pub fn export_event(&self, index: usize) -> Result<String> {
        let trajectory = self.trajectory.as_ref().ok_or(SessionError::NotReady)?;
        let event = trajectory.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: trajectory.len(),
        })?;
        Ok(event.export_json()?)
    }

    /// Selected event
    pub fn current_event(&self) -> Option<&Event> {
        self.events().get(self.machine.current_index())
    }

    /// Loaded events, empty while idle
    pub fn events(&self) -> &[Event] {
        self.trajectory.as_ref().map(Trajectory::events).unwrap_or_default()
    }

    /// Lifecycle phase
    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    /// Playback position
    pub fn state(&self) -> PlaybackState {
        self.machine.state()
    }

    /// Location groups for the current horizon
    pub fn groups(&self) -> &LocationGroups {
        &self.groups
    }

    /// Active segment set
    pub fn sequencer(&self) -> &PathSequencer {
        &self.sequencer
    }

    /// Highlight overlays
    pub fn highlights(&self) -> &HighlightManager {
        &self.highlights
    }

    /// Most recent view request
    pub fn camera_command(&self) -> Option<CameraCommand> {
        self.last_camera
    }

    /// Timing configuration
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Change the path animation duration, clamped and snapped
    pub fn set_path_duration(&mut self, duration_ms: u64) {
        self.config.set_path_duration(duration_ms);
    }

    /// Change the camera duration tiers
    pub fn set_camera_speeds(&mut self, speeds: CameraSpeeds) {
        self.camera.set_speeds(speeds);
    }

    /// Session clock
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Due time of the next pending timer
    pub fn next_due_ms(&self) -> Option<u64> {
        self.scheduler.next_due()
    }
}
