// SPDX-License-Identifier: MIT OR Apache-2.0
//! Virtual clock and cancellable timers.
//!
//! Every delayed effect in a session goes through a [`Scheduler`]. Timers are
//! tagged with the [`TransitionId`] that created them so a superseded
//! transition can be cancelled wholesale. Time only moves when the owner
//! advances it, which keeps playback deterministic under test.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one accepted navigation transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub Uuid);

impl TransitionId {
    /// Create a new random transition ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransitionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<T> {
    id: TimerId,
    due_ms: u64,
    owner: Option<TransitionId>,
    task: T,
}

/// Timer queue driven by an explicit clock
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, owner: Option<TransitionId>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due_ms: self.now_ms + delay_ms,
            owner,
            task,
        });
        id
    }

    fn drop_where(&mut self, mut predicate: impl FnMut(&Timer<T>) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|timer| !predicate(timer));
        before - self.timers.len()
    }

    /// Cancel one timer, returning whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.drop_where(|timer| timer.id == id) > 0
    }

    /// Cancel every timer owned by `owner`, returning how many were dropped
    pub fn cancel_owned_by(&mut self, owner: TransitionId) -> usize {
        self.drop_where(|timer| timer.owner == Some(owner))
    }

    /// Cancel every timer whose task matches, returning how many were dropped
    pub fn cancel_tasks(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        self.drop_where(|timer| predicate(&timer.task))
    }

    /// Whether a timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Number of pending timers owned by `owner`
    pub fn pending_for(&self, owner: TransitionId) -> usize {
        self.timers.iter().filter(|timer| timer.owner == Some(owner)).count()
    }

    /// Whether no timers are pending
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.due_ms).min()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to its due time.
    ///
    /// Timers due at the same instant fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerId, T)> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.id))
            .map(|(position, _)| position)?;

        let timer = self.timers.remove(position);
        self.now_ms = self.now_ms.max(timer.due_ms);
        Some((timer.id, timer.task))
    }

    /// Move the clock forward without firing anything
    pub fn advance_clock(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
