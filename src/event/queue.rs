//! Time-ordered queue of pending note triggers.
//!
//! A min-heap keyed on trigger time. Notes with equal trigger times come out
//! in insertion order, though callers must not rely on that.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use super::types::ScheduledNote;

/// Heap entry: ordered by time, then by insertion sequence.
#[derive(Debug)]
struct Queued {
    seq: u64,
    note: ScheduledNote,
}

impl Queued {
    fn key(&self) -> (Instant, u64) {
        (self.note.trigger_time, self.seq)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending note triggers, earliest first.
#[derive(Debug, Default)]
pub struct NoteQueue {
    heap: BinaryHeap<Reverse<Queued>>,
    next_seq: u64,
}

impl NoteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a note.
    pub fn push(&mut self, note: ScheduledNote) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Queued { seq, note }));
    }

    /// Trigger time of the earliest queued note.
    pub fn next_time(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(q)| q.note.trigger_time)
    }

    /// Pop the earliest note if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<ScheduledNote> {
        if self.next_time()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(q)| q.note)
    }

    /// Pop every note due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<ScheduledNote> {
        let mut due = Vec::new();
        while let Some(note) = self.pop_due(now) {
            due.push(note);
        }
        due
    }

    /// Number of queued notes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every queued note.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat::Note;
    use std::sync::Arc;
    use std::time::Duration;

    fn scheduled(at: Instant, name: &str) -> ScheduledNote {
        ScheduledNote::new(
            at,
            Arc::new(Note::new(name, "")),
            Arc::from(Vec::<crate::pattern::Effect>::new()),
        )
    }

    #[test]
    fn empty_queue() {
        let mut q = NoteQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.next_time(), None);
        assert!(q.pop_due(Instant::now()).is_none());
    }

    #[test]
    fn pops_in_time_order() {
        let t0 = Instant::now();
        let mut q = NoteQueue::new();
        q.push(scheduled(t0 + Duration::from_millis(30), "c"));
        q.push(scheduled(t0 + Duration::from_millis(10), "a"));
        q.push(scheduled(t0 + Duration::from_millis(20), "b"));

        let names: Vec<String> = q
            .drain_due(t0 + Duration::from_secs(1))
            .into_iter()
            .map(|n| n.note.instrument.clone())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn only_due_notes_are_popped() {
        let t0 = Instant::now();
        let mut q = NoteQueue::new();
        q.push(scheduled(t0, "now"));
        q.push(scheduled(t0 + Duration::from_millis(50), "later"));

        let due = q.drain_due(t0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].note.instrument, "now");
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_time(), Some(t0 + Duration::from_millis(50)));
    }

    #[test]
    fn trigger_time_equal_to_now_is_due() {
        let t0 = Instant::now();
        let mut q = NoteQueue::new();
        q.push(scheduled(t0 + Duration::from_millis(5), "x"));
        assert!(q.pop_due(t0 + Duration::from_millis(4)).is_none());
        assert!(q.pop_due(t0 + Duration::from_millis(5)).is_some());
    }

    #[test]
    fn simultaneous_notes_all_fire() {
        let t0 = Instant::now();
        let mut q = NoteQueue::new();
        for name in ["a", "b", "c", "d"] {
            q.push(scheduled(t0, name));
        }
        assert_eq!(q.drain_due(t0).len(), 4);
    }

    #[test]
    fn clear_empties() {
        let t0 = Instant::now();
        let mut q = NoteQueue::new();
        q.push(scheduled(t0, "a"));
        q.clear();
        assert!(q.is_empty());
    }
}
