//! Patterns — named, independently stepping sequences of beats.
//!
//! A [`Pattern`] owns its top-level beats, a step cursor, a repeat counter and
//! an effect chain. Each scheduler beat calls [`Pattern::step`] once, which
//! plays the beat under the cursor over one beat's duration.

pub mod effect;
pub mod registry;

use std::fmt;
use std::time::{Duration, Instant};

pub use effect::{Effect, EffectBuilder, EffectChain, EffectError, EffectKind};
pub use registry::{PatternId, Registry};

use crate::beat::{BeatNode, ProcessContext};
use crate::dsl;

/// How many more full passes a pattern plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeats {
    Infinite,
    Times(u32),
}

impl Repeats {
    pub fn is_exhausted(self) -> bool {
        self == Repeats::Times(0)
    }
}

impl fmt::Display for Repeats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repeats::Infinite => f.write_str("loop"),
            Repeats::Times(n) => write!(f, "x{n}"),
        }
    }
}

/// Result of a single [`Pattern::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The pattern has more to play.
    Continue,
    /// The last repeat just finished; the pattern should be removed.
    Exhausted,
}

/// A named pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    steps: Vec<BeatNode>,
    repeats: Repeats,
    cursor: usize,
    effects: EffectChain,
}

impl Pattern {
    pub fn new(name: impl Into<String>, steps: Vec<BeatNode>, repeats: Repeats) -> Self {
        Self {
            name: name.into(),
            steps,
            repeats,
            cursor: 0,
            effects: EffectChain::from(Vec::<Effect>::new()),
        }
    }

    /// Parse `source` into steps. An unbalanced pattern has no steps.
    pub fn parse(name: impl Into<String>, source: &str, repeats: Repeats) -> Self {
        Self::new(name, dsl::parse(source), repeats)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[BeatNode] {
        &self.steps
    }

    /// Remaining passes, including the one in progress.
    pub fn repeats(&self) -> Repeats {
        self.repeats
    }

    /// Index of the step played next.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// A shared snapshot of the current chain.
    pub fn effect_chain(&self) -> EffectChain {
        EffectChain::clone(&self.effects)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Play the step under the cursor over `beat`, starting at `beat_start`.
    ///
    /// Finishing the last step counts down one repeat. A pattern with no
    /// steps plays nothing and never finishes.
    pub fn step(
        &mut self,
        beat_start: Instant,
        beat: Duration,
        cx: &mut ProcessContext<'_>,
    ) -> StepOutcome {
        let len = self.steps.len();
        if len == 0 {
            return StepOutcome::Continue;
        }

        self.steps[self.cursor].process(beat, beat_start, &self.effects, cx);

        let mut outcome = StepOutcome::Continue;
        if self.cursor == len - 1 {
            if let Repeats::Times(n) = &mut self.repeats {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    outcome = StepOutcome::Exhausted;
                }
            }
        }
        self.cursor = (self.cursor + 1) % len;
        outcome
    }
}

impl EffectBuilder for Pattern {
    fn add_effect(&mut self, effect: Effect) -> &mut Self {
        let mut chain = self.effects.to_vec();
        chain.push(effect);
        self.effects = chain.into();
        self
    }
}
