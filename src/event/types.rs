//! A note waiting to be fired.

use std::sync::Arc;
use std::time::Instant;

use crate::beat::Note;
use crate::pattern::effect::EffectChain;

/// A note trigger queued for a specific wall-clock instant.
///
/// Created when a beat tree is processed and consumed exactly once by the
/// scheduler.
#[derive(Debug, Clone)]
pub struct ScheduledNote {
    pub trigger_time: Instant,
    pub note: Arc<Note>,
    /// The pattern's effect chain as it was when the note was scheduled.
    pub effects: EffectChain,
}

impl ScheduledNote {
    pub fn new(trigger_time: Instant, note: Arc<Note>, effects: EffectChain) -> Self {
        Self {
            trigger_time,
            note,
            effects,
        }
    }
}
