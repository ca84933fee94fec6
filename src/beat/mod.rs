//! Beat trees — the composable building blocks of a pattern.
//!
//! A [`BeatNode`] is either a playable [`Note`] or a combinator over child
//! beats. Processing a tree with a duration and start time pushes timed
//! [`ScheduledNote`]s onto the note queue:
//!
//! - `Sequence` splits the duration evenly across its children, in order
//! - `Parallel` plays every child over the full duration
//! - `Cycle` plays one child per call, round-robin
//! - `Random` plays one child per call, drawn uniformly each time

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::dsl::pitch::pitch_to_frequency;
use crate::event::{NoteQueue, ScheduledNote};
use crate::pattern::effect::EffectChain;

/// A single instrument trigger, e.g. `bass:C2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub instrument: String,
    /// Pitch name; may be empty.
    pub pitch: String,
}

impl Note {
    pub fn new(instrument: impl Into<String>, pitch: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            pitch: pitch.into(),
        }
    }

    /// Frequency in Hz. Unparseable pitches fall back to A4.
    pub fn frequency(&self) -> f64 {
        pitch_to_frequency(&self.pitch)
    }
}

/// Where processing sends its output, and the randomness source for
/// `Random` nodes.
pub struct ProcessContext<'a> {
    pub queue: &'a mut NoteQueue,
    pub rng: &'a mut ChaCha8Rng,
}

/// A node in a beat tree. Combinator child lists are never empty.
#[derive(Debug, Clone, PartialEq)]
pub enum BeatNode {
    Note(Arc<Note>),
    Sequence(Vec<BeatNode>),
    Parallel(Vec<BeatNode>),
    Cycle {
        children: Vec<BeatNode>,
        /// Index of the child played on the next call.
        cursor: usize,
    },
    Random(Vec<BeatNode>),
}

impl BeatNode {
    pub fn note(note: Note) -> Self {
        BeatNode::Note(Arc::new(note))
    }

    /// `None` if `children` is empty.
    pub fn sequence(children: Vec<BeatNode>) -> Option<Self> {
        (!children.is_empty()).then(|| BeatNode::Sequence(children))
    }

    /// `None` if `children` is empty.
    pub fn parallel(children: Vec<BeatNode>) -> Option<Self> {
        (!children.is_empty()).then(|| BeatNode::Parallel(children))
    }

    /// `None` if `children` is empty.
    pub fn cycle(children: Vec<BeatNode>) -> Option<Self> {
        (!children.is_empty()).then(|| BeatNode::Cycle {
            children,
            cursor: 0,
        })
    }

    /// `None` if `children` is empty.
    pub fn random(children: Vec<BeatNode>) -> Option<Self> {
        (!children.is_empty()).then(|| BeatNode::Random(children))
    }

    /// Schedule this beat over `duration` starting at `start`.
    ///
    /// Every note reached is queued with a clone of `effects`, so later
    /// changes to the pattern's chain do not touch already-queued notes.
    pub fn process(
        &mut self,
        duration: Duration,
        start: Instant,
        effects: &EffectChain,
        cx: &mut ProcessContext<'_>,
    ) {
        match self {
            BeatNode::Note(note) => {
                cx.queue.push(ScheduledNote::new(
                    start,
                    Arc::clone(note),
                    Arc::clone(effects),
                ));
            }
            BeatNode::Sequence(children) => {
                if children.is_empty() {
                    return;
                }
                let n = u32::try_from(children.len()).unwrap_or(u32::MAX);
                let step = duration / n;
                for (i, child) in (0u32..).zip(children.iter_mut()) {
                    child.process(step, start + step * i, effects, cx);
                }
            }
            BeatNode::Parallel(children) => {
                for child in children.iter_mut() {
                    child.process(duration, start, effects, cx);
                }
            }
            BeatNode::Cycle { children, cursor } => {
                if children.is_empty() {
                    return;
                }
                children[*cursor].process(duration, start, effects, cx);
                *cursor = (*cursor + 1) % children.len();
            }
            BeatNode::Random(children) => {
                if children.is_empty() {
                    return;
                }
                let pick = cx.rng.gen_range(0..children.len());
                children[pick].process(duration, start, effects, cx);
            }
        }
    }
}
