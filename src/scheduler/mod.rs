//! Scheduler — fires due notes and steps every pattern once per beat.
//!
//! Each [`Scheduler::tick`] first fires every queued note whose trigger time
//! has passed, then, if a full beat has elapsed since the last boundary,
//! resets the boundary to the current instant and steps all patterns.
//! Resetting to "now" rather than to the scheduled boundary means a late
//! tick delays every following beat instead of bunching them up.

pub mod session;

use std::io;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::osc::message::load_synthdefs;
use crate::osc::{note_messages, Instrument, Transport};
use crate::pattern::EffectChain;

pub use session::{PatternHandle, PatternSummary, Session};

/// Longest the run loop sleeps between ticks by default.
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_millis(1);

/// What one [`Scheduler::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Notes sent to the transport.
    pub fired: usize,
    /// Due notes whose instrument is unknown.
    pub dropped: usize,
    /// Patterns stepped, if this tick crossed a beat boundary.
    pub stepped: Option<usize>,
}

/// A note taken off the queue, ready to send.
struct Firing {
    instrument: Instrument,
    freq: f64,
    effects: EffectChain,
    group_id: i32,
}

/// Drives a [`Session`]: owns the beat clock and the outbound transport.
pub struct Scheduler {
    session: Session,
    transport: Box<dyn Transport>,
    beat_start: Option<Instant>,
    max_sleep: Duration,
}

impl Scheduler {
    pub fn new(session: Session, transport: Box<dyn Transport>) -> Self {
        Self {
            session,
            transport,
            beat_start: None,
            max_sleep: DEFAULT_MAX_SLEEP,
        }
    }

    /// Cap on how long [`run`](Self::run) sleeps between ticks.
    pub fn with_max_sleep(mut self, max_sleep: Duration) -> Self {
        self.max_sleep = max_sleep;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start of the current beat, once the first tick has run.
    pub fn beat_start(&self) -> Option<Instant> {
        self.beat_start
    }

    /// Ask the synth server to load its synth definitions from `dir`.
    pub fn load_synthdefs(&mut self, dir: &Path) {
        match self.transport.send(&load_synthdefs(dir)) {
            Ok(()) => info!(dir = %dir.display(), "synthdefs requested"),
            Err(e) => warn!(dir = %dir.display(), error = %e, "synthdef load failed"),
        }
    }

    /// Run one scheduler iteration at `now`.
    ///
    /// The first tick only starts the beat clock; patterns are first stepped
    /// one beat later.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport::default();

        let (firing, dropped) = self.take_due(now);
        report.dropped = dropped;
        for note in firing {
            trace!(
                instrument = %note.instrument,
                group = note.group_id,
                freq = note.freq,
                "note"
            );
            let messages = note_messages(note.instrument, note.freq, &note.effects, note.group_id);
            for msg in &messages {
                if let Err(e) = self.transport.send(msg) {
                    warn!(addr = %msg.addr, error = %e, "send failed");
                }
            }
            report.fired += 1;
        }

        let Some(start) = self.beat_start else {
            self.beat_start = Some(now);
            return report;
        };
        let beat = self.session.tempo_cell().beat_interval();
        // A beat too long to land on the clock never ends.
        match start.checked_add(beat) {
            Some(boundary) if now >= boundary => {}
            _ => return report,
        }

        self.beat_start = Some(now);
        let stepped = self.session.registry().step_all(now, beat);
        trace!(stepped, "beat");
        report.stepped = Some(stepped);
        report
    }

    /// Pop due notes and allocate their group ids under one lock.
    fn take_due(&self, now: Instant) -> (Vec<Firing>, usize) {
        let mut registry = self.session.registry();
        let due = registry.drain_due(now);
        let mut firing = Vec::with_capacity(due.len());
        let mut dropped = 0;
        for scheduled in due {
            let freq = scheduled.note.frequency();
            match scheduled.note.instrument.parse::<Instrument>() {
                Ok(instrument) => firing.push(Firing {
                    instrument,
                    freq,
                    effects: scheduled.effects,
                    group_id: registry.next_group_id(),
                }),
                Err(_) => {
                    debug!(
                        instrument = %scheduled.note.instrument,
                        "unknown instrument, note dropped"
                    );
                    dropped += 1;
                }
            }
        }
        (firing, dropped)
    }

    /// When the next tick has work to do, capped at `max_sleep` from `now`.
    pub fn next_deadline(&self, now: Instant) -> Instant {
        let mut deadline = now + self.max_sleep;
        let boundary = self
            .beat_start
            .and_then(|start| start.checked_add(self.session.tempo_cell().beat_interval()));
        if let Some(boundary) = boundary {
            deadline = deadline.min(boundary);
        }
        if let Some(next) = self.session.registry().queue().next_time() {
            deadline = deadline.min(next);
        }
        deadline
    }

    /// Tick forever on the current thread.
    pub fn run(mut self) -> ! {
        info!(bpm = self.session.tempo(), "scheduler started");
        loop {
            self.tick(Instant::now());
            let now = Instant::now();
            let deadline = self.next_deadline(now);
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
    }

    /// Run the scheduler on a named background thread.
    ///
    /// The thread never exits on its own; it ends with the process.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("miniclef-scheduler".to_string())
            .spawn(move || self.run())
    }
}
