// SPDX-License-Identifier: MIT OR Apache-2.0
//! Temporary emphasis of one path segment.
//!
//! Highlights are overlays: the segment itself is never restyled, so
//! reverting only drops the overlay. The manager owns at most one active
//! overlay plus one fading overlay being replaced.

use crate::config::AnimationConfig;
use crate::easing::{lerp, Easing};
use crate::segment::{SegmentId, SegmentStyle};
use crate::sequencer::PathSequencer;
use serde::Serialize;

/// Delayed highlight work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightTask {
    /// Auto-revert the overlay with this token
    Expire(u64),
    /// The fade of the overlay with this token has finished
    FadeComplete(u64),
}

/// Overlay lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HighlightPhase {
    /// Emphasized, replaying its reveal
    Active,
    /// Quickly fading back to its saved style
    FadingOut {
        /// Fade start
        started_ms: u64,
    },
}

/// Emphasis applied over one segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighlightOverlay {
    /// Generation token matching this overlay's timers
    pub token: u64,
    /// Event whose segment is emphasized
    pub event_index: usize,
    /// Emphasized segment
    pub segment: SegmentId,
    /// Style the segment had when highlighted
    pub saved_style: SegmentStyle,
    /// Emphasized style
    pub style: SegmentStyle,
    /// Lifecycle
    pub phase: HighlightPhase,
    /// When the reveal replay started
    pub started_ms: u64,
}

impl HighlightOverlay {
    /// Style to draw at `now_ms`
    pub fn style_at(&self, now_ms: u64, fade_ms: u64) -> SegmentStyle {
        match self.phase {
            HighlightPhase::Active => self.style,
            HighlightPhase::FadingOut { started_ms } => {
                let t = Easing::Linear.progress(started_ms, fade_ms, now_ms);
                let mut style = if t < 0.5 { self.style } else { self.saved_style };
                style.opacity = lerp(self.style.opacity as f64, self.saved_style.opacity as f64, t) as f32;
                style.weight = lerp(self.style.weight as f64, self.saved_style.weight as f64, t) as f32;
                style
            }
        }
    }

    /// Drawn fraction of the reveal replay at `now_ms`
    pub fn reveal_progress(&self, now_ms: u64, duration_ms: u64) -> f64 {
        match self.phase {
            HighlightPhase::Active => Easing::EaseInOut.progress(self.started_ms, duration_ms, now_ms),
            HighlightPhase::FadingOut { .. } => 1.0,
        }
    }
}

/// Result of a highlight request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// The event has no resident segment
    Ignored,
    /// Applied immediately
    Applied(SegmentId),
    /// Waiting for the previous overlay to fade out
    Queued,
    /// The same event was highlighted; it is now cleared
    Cleared,
}

/// A highlight that has just taken effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedHighlight {
    /// Emphasized segment
    pub segment: SegmentId,
    /// Whether the camera should refocus on it
    pub refocus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    event_index: usize,
    refocus: bool,
}

/// Owner of highlight overlays
#[derive(Debug, Clone, Default)]
pub struct HighlightManager {
    active: Option<HighlightOverlay>,
    fading: Option<HighlightOverlay>,
    pending: Option<PendingRequest>,
    next_token: u64,
}

impl HighlightManager {
    /// Create a manager with no overlays
    pub fn new() -> Self {
        Self::default()
    }

    /// Active overlay
    pub fn active(&self) -> Option<&HighlightOverlay> {
        self.active.as_ref()
    }

    /// Overlay being faded out
    pub fn fading(&self) -> Option<&HighlightOverlay> {
        self.fading.as_ref()
    }

    /// Overlay drawn over `segment`, if any
    pub fn overlay_for(&self, segment: SegmentId) -> Option<&HighlightOverlay> {
        self.active
            .iter()
            .chain(self.fading.iter())
            .find(|overlay| overlay.segment == segment)
    }

    /// Whether an event is currently highlighted
    pub fn is_highlighted(&self, event_index: usize) -> bool {
        self.active.is_some_and(|overlay| overlay.event_index == event_index)
    }

    /// Request emphasis of the segment owned by `event_index`
    pub fn request(
        &mut self,
        event_index: usize,
        refocus: bool,
        sequencer: &PathSequencer,
        config: &AnimationConfig,
        now_ms: u64,
    ) -> (HighlightOutcome, Vec<(u64, HighlightTask)>) {
        if self.is_highlighted(event_index) {
            self.active = None;
            self.pending = None;
            tracing::debug!("Highlight on event {event_index} toggled off");
            return (HighlightOutcome::Cleared, Vec::new());
        }
        if self.pending.is_some_and(|pending| pending.event_index == event_index) {
            self.pending = None;
            tracing::debug!("Queued highlight on event {event_index} toggled off");
            return (HighlightOutcome::Cleared, Vec::new());
        }

        if sequencer.segment_for_event(event_index).is_none() {
            return (HighlightOutcome::Ignored, Vec::new());
        }

        let request = PendingRequest { event_index, refocus };
        if let Some(mut previous) = self.active.take() {
            previous.phase = HighlightPhase::FadingOut { started_ms: now_ms };
            let token = previous.token;
            self.fading = Some(previous);
            self.pending = Some(request);
            return (
                HighlightOutcome::Queued,
                vec![(config.highlight_fade_ms, HighlightTask::FadeComplete(token))],
            );
        }

        if self.fading.is_some() {
            // A fade is already running; the newest request replaces any queued one
            self.pending = Some(request);
            return (HighlightOutcome::Queued, Vec::new());
        }

        self.pending = None;
        match self.apply(request, sequencer, config, now_ms) {
            Some((applied, tasks)) => (HighlightOutcome::Applied(applied.segment), tasks),
            None => (HighlightOutcome::Ignored, Vec::new()),
        }
    }

    /// Apply a fired task, returning a newly applied highlight and follow-up tasks
    pub fn handle(
        &mut self,
        task: HighlightTask,
        sequencer: &PathSequencer,
        config: &AnimationConfig,
        now_ms: u64,
    ) -> (Option<AppliedHighlight>, Vec<(u64, HighlightTask)>) {
        match task {
            HighlightTask::Expire(token) => {
                if self.active.is_some_and(|overlay| overlay.token == token) {
                    self.active = None;
                    tracing::debug!("Highlight reverted after timeout");
                }
                (None, Vec::new())
            }
            HighlightTask::FadeComplete(token) => {
                // A fade dropped with its segment still releases the queued request
                if self.fading.is_some_and(|overlay| overlay.token != token) {
                    return (None, Vec::new());
                }
                self.fading = None;
                match self.pending.take() {
                    Some(request) => self
                        .apply(request, sequencer, config, now_ms)
                        .map_or((None, Vec::new()), |(applied, tasks)| (Some(applied), tasks)),
                    None => (None, Vec::new()),
                }
            }
        }
    }

    /// Drop overlays whose segment has left the active set
    pub fn retain_resident(&mut self, sequencer: &PathSequencer) {
        if self.active.is_some_and(|overlay| !sequencer.contains(overlay.segment)) {
            tracing::debug!("Dropping highlight on removed segment");
            self.active = None;
        }
        if self.fading.is_some_and(|overlay| !sequencer.contains(overlay.segment)) {
            self.fading = None;
        }
    }

    /// Drop all overlays
    pub fn clear(&mut self) {
        self.active = None;
        self.fading = None;
        self.pending = None;
    }

    fn apply(
        &mut self,
        request: PendingRequest,
        sequencer: &PathSequencer,
        config: &AnimationConfig,
        now_ms: u64,
    ) -> Option<(AppliedHighlight, Vec<(u64, HighlightTask)>)> {
        let segment = sequencer.segment_for_event(request.event_index)?;
        let token = self.next_token;
        self.next_token += 1;

        self.active = Some(HighlightOverlay {
            token,
            event_index: request.event_index,
            segment: segment.id,
            saved_style: segment.style(),
            style: SegmentStyle::emphasized(),
            phase: HighlightPhase::Active,
            started_ms: now_ms,
        });
        tracing::debug!("Highlighting event {}", request.event_index);

        Some((
            AppliedHighlight { segment: segment.id, refocus: request.refocus },
            vec![(config.highlight_timeout_ms, HighlightTask::Expire(token))],
        ))
    }
}
