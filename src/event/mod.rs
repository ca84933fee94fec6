//! Timing primitives — the shared tempo cell and the queue of pending notes.

pub mod queue;
pub mod tempo;
pub mod types;

pub use queue::NoteQueue;
pub use tempo::{beat_interval, Tempo, TempoError, DEFAULT_BPM};
pub use types::ScheduledNote;
