// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pumps a session's clock during autoplay.

use lifetrail_playback::{Frame, ReplaySession};
use std::time::Duration;

/// How the session clock advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Largest single clock step
    pub tick_ms: u64,
    /// Sleep for each step instead of running as fast as possible
    pub realtime: bool,
}

impl Default for Pacing {
    fn default() -> Self {
        Self { tick_ms: 16, realtime: false }
    }
}

/// Autoplay from the current event to the last one.
///
/// `emit` receives a frame each time the selection changes and once more
/// when every timer has drained. Returns the number of frames emitted.
pub async fn autoplay<F>(session: &mut ReplaySession, pacing: Pacing, mut emit: F) -> usize
where
    F: FnMut(&Frame),
{
    let tick_ms = pacing.tick_ms.max(1);
    let mut emitted = 0;
    let mut shown = session.state().current_index;

    emit(&session.frame());
    emitted += 1;

    if !session.play() {
        tracing::info!("Already at the final event");
        return emitted;
    }

    while session.is_playing() || session.pending_timers() > 0 {
        let now = session.now_ms();
        let step = session
            .next_due_ms()
            .map_or(tick_ms, |due| due.saturating_sub(now).clamp(1, tick_ms));
        if pacing.realtime {
            tokio::time::sleep(Duration::from_millis(step)).await;
        }
        session.advance(step);

        let current = session.state().current_index;
        if current != shown {
            shown = current;
            emit(&session.frame());
            emitted += 1;
        }
    }

    tracing::debug!("Autoplay drained at t={} ms", session.now_ms());
    emit(&session.frame());
    emitted + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifetrail_geo::{Event, EventRecord, LngLat, MovementType, Trajectory};
    use lifetrail_playback::{AnimationConfig, CameraSpeeds, SequencePhase};

    fn event(lng: f64) -> Event {
        Event {
            index: 0,
            date: "1900".to_string(),
            age: None,
            movement_type: MovementType::LongDistanceMove,
            text: "move".to_string(),
            start_coords: Some(LngLat::new(lng - 1.0, 30.0)),
            end_coords: Some(LngLat::new(lng, 30.0)),
            transit: Vec::new(),
            start_location_name: None,
            end_location_name: None,
            record: EventRecord::default(),
        }
    }

    fn session(len: usize) -> ReplaySession {
        let events = (0..len).map(|i| event(100.0 + i as f64 * 2.0)).collect();
        let mut session = ReplaySession::new(AnimationConfig::default(), CameraSpeeds::default());
        session.load(Trajectory::from_events(events).unwrap());
        session
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap()
    }

    #[test]
    fn test_autoplay_visits_every_event() {
        let mut session = session(4);
        let mut seen = Vec::new();
        let emitted = runtime().block_on(autoplay(&mut session, Pacing::default(), |frame| {
            seen.push(frame.state.current_index);
        }));

        assert_eq!(emitted, seen.len());
        assert_eq!(seen, vec![0, 1, 2, 3, 3]);
        assert!(!session.is_playing());
        assert_eq!(session.pending_timers(), 0);
        assert_eq!(session.sequencer().phase(), SequencePhase::Settled);
    }

    #[test]
    fn test_autoplay_at_end_emits_once() {
        let mut session = session(2);
        session.seek(1, false, true).unwrap();
        let emitted = runtime().block_on(autoplay(&mut session, Pacing::default(), |_| {}));
        assert_eq!(emitted, 1);
    }
}
