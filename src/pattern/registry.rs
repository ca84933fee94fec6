//! Pattern registry — every live pattern plus the shared note queue.
//!
//! The registry is the mutable half of the scheduler context. It is always
//! accessed under one lock, so a beat's worth of pattern steps sees a single
//! consistent set of patterns and queue pushes and pops never interleave.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::{Pattern, StepOutcome};
use crate::beat::ProcessContext;
use crate::event::{NoteQueue, ScheduledNote};

/// Identifies one registration of a pattern. Re-registering a name yields a
/// new id, so stale handles cannot touch the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub u64);

#[derive(Debug)]
struct Entry {
    id: PatternId,
    pattern: Pattern,
}

/// Named patterns, pending notes and the group id counter.
#[derive(Debug)]
pub struct Registry {
    patterns: HashMap<String, Entry>,
    queue: NoteQueue,
    rng: ChaCha8Rng,
    next_group_id: i32,
    next_pattern_id: u64,
}

impl Registry {
    /// Create an empty registry. `seed` fixes the Random combinator's choices;
    /// without it the RNG is seeded from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            patterns: HashMap::new(),
            queue: NoteQueue::new(),
            rng,
            next_group_id: 1,
            next_pattern_id: 1,
        }
    }

    /// Insert a pattern under its name, replacing any previous one.
    pub fn register(&mut self, pattern: Pattern) -> PatternId {
        let id = PatternId(self.next_pattern_id);
        self.next_pattern_id += 1;

        let name = pattern.name().to_string();
        info!(
            pattern = %name,
            steps = pattern.steps().len(),
            repeats = %pattern.repeats(),
            "pattern registered"
        );
        if self.patterns.insert(name.clone(), Entry { id, pattern }).is_some() {
            debug!(pattern = %name, "replaced previous pattern");
        }
        id
    }

    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name).map(|e| &e.pattern)
    }

    /// The pattern registered as `id` under `name`, if it is still there.
    pub fn get_mut(&mut self, name: &str, id: PatternId) -> Option<&mut Pattern> {
        self.patterns
            .get_mut(name)
            .filter(|e| e.id == id)
            .map(|e| &mut e.pattern)
    }

    /// Id of the current registration under `name`.
    pub fn id_of(&self, name: &str) -> Option<PatternId> {
        self.patterns.get(name).map(|e| e.id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Registered pattern names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.patterns.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Remove every pattern. Queued notes still fire.
    pub fn hush(&mut self) {
        info!(count = self.patterns.len(), "hush");
        self.patterns.clear();
    }

    /// Remove one pattern. Returns whether it existed.
    pub fn silence(&mut self, name: &str) -> bool {
        let removed = self.patterns.remove(name).is_some();
        if removed {
            info!(pattern = %name, "pattern silenced");
        }
        removed
    }

    /// Hand out the next note group id, starting at 1.
    pub fn next_group_id(&mut self) -> i32 {
        let id = self.next_group_id;
        // Past i32::MAX the server ids start over at 1.
        self.next_group_id = self.next_group_id.checked_add(1).unwrap_or(1);
        id
    }

    pub fn queue(&self) -> &NoteQueue {
        &self.queue
    }

    /// Pop every note due at `now`, earliest first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<ScheduledNote> {
        self.queue.drain_due(now)
    }

    /// Advance every registered pattern by one step.
    ///
    /// Patterns that finish their last repeat are removed once all patterns
    /// have stepped. Returns the number of patterns stepped.
    pub fn step_all(&mut self, beat_start: Instant, beat: Duration) -> usize {
        let mut cx = ProcessContext {
            queue: &mut self.queue,
            rng: &mut self.rng,
        };

        let mut finished = Vec::new();
        for (name, entry) in self.patterns.iter_mut() {
            if entry.pattern.step(beat_start, beat, &mut cx) == StepOutcome::Exhausted {
                finished.push(name.clone());
            }
        }
        let stepped = self.patterns.len();

        for name in finished {
            self.patterns.remove(&name);
            info!(pattern = %name, "pattern finished");
        }
        stepped
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(None)
    }
}
