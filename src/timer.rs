//! Deadline queue driving the session.
//!
//! Every schedule is an explicit entry dispatched from the session clock.
//! Entries fire one at a time in deadline order, so a firing that cancels
//! other entries (ending the session cancels the two periodic schedules)
//! takes effect before anything later-due runs. One-shot entries carry the
//! identity of the bubble or popup they target and are left to lapse
//! against existence checks rather than being cancelled.

use crate::bubble::{BubbleId, PopupId};

/// What a timer firing means to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// 1-second countdown tick.
    Countdown,
    /// Periodic bubble spawn (also used for the staggered initial spawns).
    Spawner,
    /// Remove an unpopped bubble 5s after spawn.
    BubbleExpiry(BubbleId),
    /// Remove a popped bubble once its popping window closes.
    PopComplete(BubbleId),
    /// Remove a transient score popup.
    PopupFade(PopupId),
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due_ms: u64,
    period_ms: Option<u64>,
    // FIFO tie-break among entries sharing a deadline
    seq: u64,
    kind: TimerKind,
}

/// Pending timer entries, dispatched by [`TimerQueue::pop_due`].
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot entry.
    pub fn schedule(&mut self, due_ms: u64, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimerEntry {
            due_ms,
            period_ms: None,
            seq,
            kind,
        });
    }

    /// Schedule an entry that re-arms itself every `period_ms` after firing.
    pub fn schedule_periodic(&mut self, first_due_ms: u64, period_ms: u64, kind: TimerKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimerEntry {
            due_ms: first_due_ms,
            period_ms: Some(period_ms),
            seq,
            kind,
        });
    }

    /// Remove every entry of the given kind, periodic or one-shot.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.entries.retain(|e| e.kind != kind);
    }

    /// Take the earliest entry due at or before `now_ms`, re-arming it first
    /// if periodic. Returns `None` once nothing else is due.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerKind> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(idx);
        if let Some(period) = entry.period_ms {
            self.schedule_periodic(entry.due_ms + period, period, entry.kind);
        }
        Some(entry.kind)
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
