//! miniclef — a live coding pattern sequencer.
//!
//! Patterns are written in a small bracket language, parsed into beat trees,
//! and stepped once per beat by a scheduler thread that sends note triggers
//! to an external synth server over OSC.

pub mod beat;
pub mod command;
pub mod config;
pub mod dsl;
pub mod event;
pub mod osc;
pub mod pattern;
pub mod scheduler;
