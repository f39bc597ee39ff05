// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path animation sequencing.
//!
//! The [`PathSequencer`] owns the active segment set. Each accepted
//! transition is turned into a [`TransitionPlan`]: immediate edits to the set
//! plus delayed [`SequencerTask`]s that the owner schedules and feeds back
//! through [`PathSequencer::handle`] when they fire.
//!
//! Phases per transition:
//!
//! ```text
//! Idle -> ConnectionRevealing -> InternalRevealing -> Settled   (one step forward)
//! Idle -> Retracting -> Settled                                  (any step backward)
//! Idle -> Settled                                                (rebuild / re-seek)
//! ```

use crate::config::Timing;
use crate::segment::{PathSegment, SegmentId, Stroke};
use crate::state::Transition;
use indexmap::IndexMap;
use lifetrail_geo::Event;
use serde::Serialize;

/// Phase of the transition currently being sequenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SequencePhase {
    /// Nothing built yet
    #[default]
    Idle,
    /// The connection into the new event is being drawn
    ConnectionRevealing,
    /// The new event's own segment is being drawn
    InternalRevealing,
    /// Segments past the target are shrinking away
    Retracting,
    /// All strokes complete
    Settled,
}

/// Delayed work produced by a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerTask {
    /// Add and reveal an event's internal segment as latest
    RevealInternal {
        /// Owning event
        event_index: usize,
    },
    /// A reveal stroke has completed
    FinishReveal(SegmentId),
    /// Begin shrinking a segment
    StartRetract(SegmentId),
    /// A retraction has completed; drop the segment
    RemoveSegment(SegmentId),
}

/// How a transition is realized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanMode {
    /// Nothing changes
    Unchanged,
    /// Full instant rebuild
    Rebuild,
    /// One-step reveal
    Reveal,
    /// Staggered retraction
    Retract,
}

/// Output of [`PathSequencer::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Chosen mode
    pub mode: PlanMode,
    /// Tasks to schedule, as `(delay_ms, task)`
    pub tasks: Vec<(u64, SequencerTask)>,
}

impl TransitionPlan {
    fn unchanged() -> Self {
        Self { mode: PlanMode::Unchanged, tasks: Vec::new() }
    }

    fn rebuild() -> Self {
        Self { mode: PlanMode::Rebuild, tasks: Vec::new() }
    }

    /// Segments this plan will retract, in stagger order
    pub fn retracted(&self) -> Vec<SegmentId> {
        self.tasks
            .iter()
            .filter_map(|(_, task)| match task {
                SequencerTask::StartRetract(id) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

/// Owner of the active segment set
#[derive(Debug, Clone, Default)]
pub struct PathSequencer {
    active: IndexMap<SegmentId, PathSegment>,
    phase: SequencePhase,
    target_index: usize,
    pending_internal: Option<usize>,
    retracting: Vec<SegmentId>,
    timing: Option<Timing>,
}

impl PathSequencer {
    /// Create an empty sequencer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// Whether no transition work is outstanding
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SequencePhase::Settled | SequencePhase::Idle)
    }

    /// Index the active set is converging on
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Active segments in draw order
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.active.values()
    }

    /// Number of active segments
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the active set is empty
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active segment by identity
    pub fn segment(&self, id: SegmentId) -> Option<&PathSegment> {
        self.active.get(&id)
    }

    /// Whether a segment is active
    pub fn contains(&self, id: SegmentId) -> bool {
        self.active.contains_key(&id)
    }

    /// The segment styled as latest
    pub fn latest(&self) -> Option<&PathSegment> {
        self.active.values().find(|segment| segment.is_latest)
    }

    /// Segment owned by an event: its internal segment, else its connection
    pub fn segment_for_event(&self, event_index: usize) -> Option<&PathSegment> {
        self.segment(SegmentId::internal(event_index))
            .or_else(|| self.segment(SegmentId::connection(event_index)))
    }

    /// Identities of the active set
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.active.keys().copied().collect()
    }

    /// Discard everything and build the full set for `events[0..=target]` instantly
    pub fn rebuild(&mut self, events: &[Event], target: usize) {
        self.active.clear();
        self.pending_internal = None;
        self.retracting.clear();

        let target = target.min(events.len().saturating_sub(1));
        for (i, event) in events.iter().enumerate().take(target + 1) {
            if let Some(segment) = PathSegment::internal(event) {
                self.insert(segment.with_latest(i == target));
            }
            if i > 0 {
                if let Some(segment) = PathSegment::connection(&events[i - 1], event) {
                    self.insert(segment);
                }
            }
        }

        self.target_index = target;
        self.phase = if events.is_empty() { SequencePhase::Idle } else { SequencePhase::Settled };
        tracing::debug!("Rebuilt {} segments up to event {}", self.active.len(), target);
    }

    /// Complete any in-flight transition instantly.
    ///
    /// Used when a new transition supersedes one whose timers were cancelled.
    pub fn settle(&mut self, events: &[Event]) {
        if self.is_settled() {
            return;
        }
        tracing::debug!("Settling interrupted transition at {:?}", self.phase);
        self.rebuild(events, self.target_index);
    }

    /// Plan an accepted transition
    pub fn begin(
        &mut self,
        events: &[Event],
        transition: Transition,
        timing: Timing,
        now_ms: u64,
    ) -> TransitionPlan {
        if !transition.is_change() {
            if self.phase == SequencePhase::Idle || self.target_index != transition.to {
                self.rebuild(events, transition.to);
                return TransitionPlan::rebuild();
            }
            return TransitionPlan::unchanged();
        }

        self.settle(events);
        self.timing = Some(timing);

        let diverged = self.phase == SequencePhase::Idle || self.target_index != transition.from;
        if diverged || !transition.animated || transition.to > transition.from + 1 {
            self.rebuild(events, transition.to);
            return TransitionPlan::rebuild();
        }

        if transition.is_single_step_forward() {
            self.plan_reveal(events, transition.to, timing, now_ms)
        } else {
            self.plan_retract(transition.to, timing)
        }
    }

    fn plan_reveal(
        &mut self,
        events: &[Event],
        target: usize,
        timing: Timing,
        now_ms: u64,
    ) -> TransitionPlan {
        let mut tasks = Vec::new();
        self.target_index = target;

        for segment in self.active.values_mut() {
            segment.is_latest = false;
        }

        let (Some(previous), Some(current)) = (events.get(target - 1), events.get(target)) else {
            self.phase = SequencePhase::Settled;
            return TransitionPlan { mode: PlanMode::Reveal, tasks };
        };

        let mut phase = SequencePhase::Settled;
        if let Some(connection) = PathSegment::connection(previous, current) {
            let id = connection.id;
            self.insert(connection.revealing(now_ms, timing.path_ms));
            tasks.push((timing.path_ms, SequencerTask::FinishReveal(id)));
            phase = SequencePhase::ConnectionRevealing;
        }

        if PathSegment::internal(current).is_some() {
            self.pending_internal = Some(target);
            tasks.push((timing.phase_delay_ms, SequencerTask::RevealInternal { event_index: target }));
            if phase == SequencePhase::Settled {
                phase = SequencePhase::InternalRevealing;
            }
        }

        self.phase = phase;
        tracing::debug!("Revealing event {} with {} tasks", target, tasks.len());
        TransitionPlan { mode: PlanMode::Reveal, tasks }
    }

    fn plan_retract(&mut self, target: usize, timing: Timing) -> TransitionPlan {
        self.target_index = target;
        self.retracting = self
            .active
            .keys()
            .filter(|id| id.event_index > target)
            .copied()
            .collect();

        if self.retracting.is_empty() {
            self.promote_latest();
            self.phase = SequencePhase::Settled;
            return TransitionPlan { mode: PlanMode::Retract, tasks: Vec::new() };
        }

        let tasks = self
            .retracting
            .iter()
            .enumerate()
            .map(|(i, id)| (i as u64 * timing.stagger_ms, SequencerTask::StartRetract(*id)))
            .collect();

        self.phase = SequencePhase::Retracting;
        tracing::debug!("Retracting {} segments back to event {}", self.retracting.len(), target);
        TransitionPlan { mode: PlanMode::Retract, tasks }
    }

    /// Apply a fired task, returning follow-up tasks to schedule
    pub fn handle(&mut self, events: &[Event], task: SequencerTask, now_ms: u64) -> Vec<(u64, SequencerTask)> {
        let path_ms = self.timing.map_or(0, |timing| timing.path_ms);
        let mut follow_up = Vec::new();

        match task {
            SequencerTask::RevealInternal { event_index } => {
                if self.pending_internal != Some(event_index) {
                    return follow_up;
                }
                self.pending_internal = None;
                if let Some(segment) = events.get(event_index).and_then(PathSegment::internal) {
                    let id = segment.id;
                    self.insert(segment.with_latest(true).revealing(now_ms, path_ms));
                    follow_up.push((path_ms, SequencerTask::FinishReveal(id)));
                    self.phase = SequencePhase::InternalRevealing;
                }
            }
            SequencerTask::FinishReveal(id) => {
                if let Some(segment) = self.active.get_mut(&id) {
                    segment.finish();
                }
                self.update_reveal_phase();
            }
            SequencerTask::StartRetract(id) => {
                if let Some(segment) = self.active.get_mut(&id) {
                    segment.retract(now_ms, path_ms);
                    follow_up.push((path_ms, SequencerTask::RemoveSegment(id)));
                } else {
                    self.finish_retraction(id);
                }
            }
            SequencerTask::RemoveSegment(id) => {
                self.active.shift_remove(&id);
                self.finish_retraction(id);
            }
        }

        follow_up
    }

    fn update_reveal_phase(&mut self) {
        if !matches!(
            self.phase,
            SequencePhase::ConnectionRevealing | SequencePhase::InternalRevealing
        ) {
            return;
        }
        let revealing = self
            .active
            .values()
            .any(|segment| matches!(segment.stroke, Stroke::Revealing { .. }));
        if self.pending_internal.is_none() && !revealing {
            self.phase = SequencePhase::Settled;
        }
    }

    fn finish_retraction(&mut self, id: SegmentId) {
        self.retracting.retain(|pending| *pending != id);
        if self.phase == SequencePhase::Retracting && self.retracting.is_empty() {
            self.promote_latest();
            self.phase = SequencePhase::Settled;
        }
    }

    fn promote_latest(&mut self) {
        let latest = SegmentId::internal(self.target_index);
        for (id, segment) in self.active.iter_mut() {
            segment.is_latest = *id == latest;
        }
    }

    fn insert(&mut self, segment: PathSegment) {
        debug_assert!(segment.points.len() >= 2);
        self.active.insert(segment.id, segment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnimationConfig;
    use lifetrail_geo::{CoordinateResolver, CoordinateTable, EventRecord, LngLat};
    use std::collections::BTreeSet;

    /// Events hopping between distinct cities so every connection is drawn
    fn hopping_events(count: usize) -> Vec<Event> {
        let resolver = CoordinateResolver::new(CoordinateTable::new());
        (0..count)
            .map(|i| {
                let record = EventRecord {
                    date: format!("{}", 1900 + i),
                    event: format!("event {i}"),
                    ..Default::default()
                };
                let mut event = Event::resolve(i, record, &resolver);
                event.start_coords = Some(LngLat::new(i as f64, 0.0));
                event.end_coords = Some(LngLat::new(i as f64, 1.0));
                event
            })
            .collect()
    }

    fn timing() -> Timing {
        AnimationConfig::default().timing(false)
    }

    fn ids(sequencer: &PathSequencer) -> BTreeSet<SegmentId> {
        sequencer.segment_ids().into_iter().collect()
    }

    /// Fire every task in due order, as the session would
    fn run(sequencer: &mut PathSequencer, events: &[Event], plan: TransitionPlan) {
        let mut queue: Vec<(u64, usize, SequencerTask)> = plan
            .tasks
            .into_iter()
            .enumerate()
            .map(|(seq, (delay, task))| (delay, seq, task))
            .collect();
        let mut seq = queue.len();
        while !queue.is_empty() {
            queue.sort_by_key(|(due, seq, _)| (*due, *seq));
            let (due, _, task) = queue.remove(0);
            for (delay, next) in sequencer.handle(events, task, due) {
                queue.push((due + delay, seq, next));
                seq += 1;
            }
        }
    }

    fn transition(from: usize, to: usize, animated: bool) -> Transition {
        Transition { from, to, animated }
    }

    #[test]
    fn test_rebuild_marks_only_final_latest() {
        let events = hopping_events(4);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 2);

        // Internal 0..=2 plus connections 1 and 2
        assert_eq!(sequencer.len(), 5);
        assert_eq!(sequencer.segments().filter(|s| s.is_latest).count(), 1);
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(2));
        assert_eq!(sequencer.phase(), SequencePhase::Settled);
    }

    #[test]
    fn test_forward_step_orders_connection_before_internal() {
        let events = hopping_events(3);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 0);

        let plan = sequencer.begin(&events, transition(0, 1, true), timing(), 0);
        assert_eq!(plan.mode, PlanMode::Reveal);
        assert_eq!(sequencer.phase(), SequencePhase::ConnectionRevealing);

        // Connection added immediately, old latest demoted
        assert!(sequencer.contains(SegmentId::connection(1)));
        assert!(!sequencer.contains(SegmentId::internal(1)));
        assert!(sequencer.latest().is_none());

        let reveal_delay = plan
            .tasks
            .iter()
            .find(|(_, task)| matches!(task, SequencerTask::RevealInternal { .. }))
            .map(|(delay, _)| *delay)
            .unwrap();
        assert_eq!(reveal_delay, 500);

        run(&mut sequencer, &events, plan);
        assert_eq!(sequencer.phase(), SequencePhase::Settled);
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(1));

        let mut rebuilt = PathSequencer::new();
        rebuilt.rebuild(&events, 1);
        assert_eq!(ids(&sequencer), ids(&rebuilt));
    }

    #[test]
    fn test_backward_retracts_exactly_later_segments() {
        let events = hopping_events(12);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 10);

        let plan = sequencer.begin(&events, transition(10, 7, true), timing(), 0);
        assert_eq!(plan.mode, PlanMode::Retract);
        let retracted: BTreeSet<usize> = plan.retracted().iter().map(|id| id.event_index).collect();
        assert_eq!(retracted, BTreeSet::from([8, 9, 10]));
        assert_eq!(plan.retracted().len(), 6);

        // Stagger grows with position
        let delays: Vec<u64> = plan.tasks.iter().map(|(delay, _)| *delay).collect();
        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));

        // Latest is not reassigned until retraction completes
        assert!(sequencer.latest().is_some_and(|s| s.id == SegmentId::internal(10)));
        run(&mut sequencer, &events, plan);
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(7));
        assert!(sequencer.segments().all(|s| s.event_index() <= 7));
    }

    #[test]
    fn test_round_trip_restores_segment_set() {
        let events = hopping_events(6);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 3);
        let before = ids(&sequencer);

        let plan = sequencer.begin(&events, transition(3, 4, true), timing(), 0);
        run(&mut sequencer, &events, plan);
        let plan = sequencer.begin(&events, transition(4, 3, true), timing(), 5000);
        run(&mut sequencer, &events, plan);

        assert_eq!(ids(&sequencer), before);
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(3));
    }

    #[test]
    fn test_interrupted_reveal_settles_before_retract() {
        let events = hopping_events(6);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 3);
        let before = ids(&sequencer);

        // Forward step never completes; its timers were cancelled by the owner
        let _ = sequencer.begin(&events, transition(3, 4, true), timing(), 0);
        assert!(!sequencer.is_settled());

        let plan = sequencer.begin(&events, transition(4, 3, true), timing(), 100);
        assert_eq!(
            plan.retracted().into_iter().collect::<BTreeSet<_>>(),
            BTreeSet::from([SegmentId::internal(4), SegmentId::connection(4)])
        );
        run(&mut sequencer, &events, plan);
        assert_eq!(ids(&sequencer), before);
    }

    #[test]
    fn test_reseek_same_index_is_unchanged() {
        let events = hopping_events(4);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 2);
        let before = ids(&sequencer);

        let plan = sequencer.begin(&events, transition(2, 2, true), timing(), 0);
        assert_eq!(plan.mode, PlanMode::Unchanged);
        assert_eq!(ids(&sequencer), before);
    }

    #[test]
    fn test_multi_step_forward_rebuilds() {
        let events = hopping_events(8);
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 1);

        let plan = sequencer.begin(&events, transition(1, 5, true), timing(), 0);
        assert_eq!(plan.mode, PlanMode::Rebuild);
        assert!(plan.tasks.is_empty());
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(5));
    }

    #[test]
    fn test_unresolved_endpoints_are_skipped() {
        let mut events = hopping_events(3);
        events[1].start_coords = None;
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 2);

        assert!(!sequencer.contains(SegmentId::internal(1)));
        assert!(!sequencer.contains(SegmentId::connection(1)));
        assert!(sequencer.contains(SegmentId::connection(2)));
        assert!(sequencer.segments().all(|s| s.points.len() >= 2));
    }

    #[test]
    fn test_stationary_event_forward_step_has_no_connection() {
        let mut events = hopping_events(2);
        events[1].start_coords = events[0].end_coords;
        events[1].end_coords = events[0].end_coords;
        let mut sequencer = PathSequencer::new();
        sequencer.rebuild(&events, 0);

        let plan = sequencer.begin(&events, transition(0, 1, true), timing(), 0);
        assert!(!sequencer.contains(SegmentId::connection(1)));
        assert_eq!(sequencer.phase(), SequencePhase::InternalRevealing);
        run(&mut sequencer, &events, plan);
        assert_eq!(sequencer.latest().unwrap().id, SegmentId::internal(1));
    }
}
