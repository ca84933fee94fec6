//! Session — the caller-facing half of the shared scheduler context.
//!
//! A [`Session`] is a cheap, cloneable handle to the tempo cell and the
//! registry. Any thread may hold one; the scheduler thread holds another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::beat::BeatNode;
use crate::dsl;
use crate::event::{Tempo, TempoError};
use crate::pattern::{Effect, EffectBuilder, Pattern, PatternId, Registry, Repeats};

#[derive(Debug)]
struct Shared {
    tempo: Tempo,
    registry: Mutex<Registry>,
}

/// A one-line view of a registered pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSummary {
    pub name: String,
    pub steps: usize,
    pub cursor: usize,
    pub repeats: Repeats,
    pub effects: usize,
}

/// Shared live-coding state: tempo plus every registered pattern.
#[derive(Debug, Clone)]
pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// A session at `tempo`. `seed` fixes the Random combinator's choices.
    pub fn new(tempo: Tempo, seed: Option<u64>) -> Self {
        Self {
            shared: Arc::new(Shared {
                tempo,
                registry: Mutex::new(Registry::new(seed)),
            }),
        }
    }

    /// Current BPM.
    pub fn tempo(&self) -> f64 {
        self.shared.tempo.bpm()
    }

    /// Change the tempo. Non-positive values are rejected and the previous
    /// tempo stays in effect.
    pub fn set_tempo(&self, bpm: f64) -> Result<(), TempoError> {
        match self.shared.tempo.set_bpm(bpm) {
            Ok(()) => {
                info!(bpm, "tempo changed");
                Ok(())
            }
            Err(e) => {
                warn!(bpm, error = %e, "tempo rejected");
                Err(e)
            }
        }
    }

    pub(crate) fn tempo_cell(&self) -> &Tempo {
        &self.shared.tempo
    }

    /// Lock the registry.
    ///
    /// A panic on another thread while holding the lock leaves the registry
    /// in a usable state, so poisoning is ignored.
    pub fn registry(&self) -> MutexGuard<'_, Registry> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Parse `source` and register it as `name`, replacing any pattern of the
    /// same name.
    ///
    /// A pattern whose brackets do not balance is still registered; it plays
    /// nothing. `Repeats::Times(0)` registers nothing and returns a handle
    /// that ignores effects.
    pub fn define(&self, name: &str, source: &str, repeats: Repeats) -> PatternHandle {
        if let Err(e) = dsl::check(source) {
            warn!(pattern = %name, error = %e, "invalid pattern, it will play nothing");
        }
        self.define_beats(name, dsl::parse(source), repeats)
    }

    /// Register an already-built beat list.
    pub fn define_beats(
        &self,
        name: &str,
        steps: Vec<BeatNode>,
        repeats: Repeats,
    ) -> PatternHandle {
        if repeats.is_exhausted() {
            info!(pattern = %name, "zero repeats, nothing registered");
            return PatternHandle::detached(self.clone(), name);
        }
        let id = self.registry().register(Pattern::new(name, steps, repeats));
        PatternHandle {
            session: self.clone(),
            name: name.to_string(),
            id: Some(id),
        }
    }

    pub fn repeat(&self, count: u32, name: &str, source: &str) -> PatternHandle {
        self.define(name, source, Repeats::Times(count))
    }

    pub fn once(&self, name: &str, source: &str) -> PatternHandle {
        self.repeat(1, name, source)
    }

    pub fn twice(&self, name: &str, source: &str) -> PatternHandle {
        self.repeat(2, name, source)
    }

    pub fn thrice(&self, name: &str, source: &str) -> PatternHandle {
        self.repeat(3, name, source)
    }

    /// Register a pattern that plays until silenced.
    pub fn loop_pattern(&self, name: &str, source: &str) -> PatternHandle {
        self.define(name, source, Repeats::Infinite)
    }

    /// A handle to whatever is currently registered as `name`.
    pub fn pattern(&self, name: &str) -> Option<PatternHandle> {
        let id = self.registry().id_of(name)?;
        Some(PatternHandle {
            session: self.clone(),
            name: name.to_string(),
            id: Some(id),
        })
    }

    /// Remove every pattern. Notes already queued still play.
    pub fn hush(&self) {
        self.registry().hush();
    }

    /// Remove one pattern. Returns whether it was registered.
    pub fn silence(&self, name: &str) -> bool {
        self.registry().silence(name)
    }

    /// Registered pattern names, sorted.
    pub fn pattern_names(&self) -> Vec<String> {
        self.registry().names()
    }

    /// Summaries of every registered pattern, sorted by name.
    pub fn summaries(&self) -> Vec<PatternSummary> {
        let registry = self.registry();
        registry
            .names()
            .into_iter()
            .filter_map(|name| {
                let p = registry.get(&name)?;
                Some(PatternSummary {
                    steps: p.steps().len(),
                    cursor: p.cursor(),
                    repeats: p.repeats(),
                    effects: p.effects().len(),
                    name,
                })
            })
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Tempo::default(), None)
    }
}

/// Handle to one registration of a pattern, used to chain effects onto it.
///
/// Once the pattern is overwritten, silenced, or finishes, effects added
/// through the handle are ignored.
#[derive(Debug, Clone)]
pub struct PatternHandle {
    session: Session,
    name: String,
    id: Option<PatternId>,
}

impl PatternHandle {
    fn detached(session: Session, name: &str) -> Self {
        Self {
            session,
            name: name.to_string(),
            id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<PatternId> {
        self.id
    }

    /// Whether the registration this handle points at is still live.
    pub fn is_live(&self) -> bool {
        match self.id {
            Some(id) => self.session.registry().get_mut(&self.name, id).is_some(),
            None => false,
        }
    }
}

impl EffectBuilder for PatternHandle {
    fn add_effect(&mut self, effect: Effect) -> &mut Self {
        let Some(id) = self.id else {
            return self;
        };
        let mut registry = self.session.registry();
        match registry.get_mut(&self.name, id) {
            Some(pattern) => {
                pattern.add_effect(effect);
            }
            None => {
                debug!(pattern = %self.name, effect = %effect.kind, "stale handle, effect dropped");
            }
        }
        drop(registry);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::EffectKind;

    fn session() -> Session {
        Session::new(Tempo::default(), Some(3))
    }

    #[test]
    fn default_tempo() {
        assert_eq!(session().tempo(), 135.0);
    }

    #[test]
    fn tempo_guard_keeps_previous() {
        let s = session();
        s.set_tempo(90.0).unwrap();
        assert!(s.set_tempo(0.0).is_err());
        assert!(s.set_tempo(-10.0).is_err());
        assert_eq!(s.tempo(), 90.0);
    }

    #[test]
    fn repeat_shorthands() {
        let s = session();
        s.once("a", "x");
        s.twice("b", "x");
        s.thrice("c", "x");
        s.loop_pattern("d", "x");
        s.repeat(5, "e", "x");
        let r: Vec<Repeats> = s.summaries().into_iter().map(|p| p.repeats).collect();
        assert_eq!(
            r,
            vec![
                Repeats::Times(1),
                Repeats::Times(2),
                Repeats::Times(3),
                Repeats::Infinite,
                Repeats::Times(5),
            ]
        );
    }

    #[test]
    fn zero_repeats_registers_nothing() {
        let s = session();
        let mut h = s.repeat(0, "p", "a b");
        assert!(!h.is_live());
        h.vibrato(6.0, 0.02);
        assert!(s.pattern_names().is_empty());
    }

    #[test]
    fn invalid_pattern_registers_empty() {
        let s = session();
        s.loop_pattern("p", "[a b");
        let summary = &s.summaries()[0];
        assert_eq!(summary.name, "p");
        assert_eq!(summary.steps, 0);
    }

    #[test]
    fn handle_chains_effects() {
        let s = session();
        s.loop_pattern("p", "bass:C2").vibrato(5.0, 0.1).reverb(1.0, 0.1);
        let registry = s.registry();
        let kinds: Vec<EffectKind> = registry
            .get("p")
            .unwrap()
            .effects()
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EffectKind::Vibrato, EffectKind::Reverb]);
    }

    #[test]
    fn stale_handle_after_overwrite() {
        let s = session();
        let mut old = s.loop_pattern("p", "a");
        s.loop_pattern("p", "b");
        assert!(!old.is_live());
        old.chop(4.0);
        assert_eq!(s.summaries()[0].effects, 0);
    }

    #[test]
    fn pattern_lookup_targets_current_registration() {
        let s = session();
        s.loop_pattern("p", "a");
        s.loop_pattern("p", "b");
        let mut h = s.pattern("p").unwrap();
        h.tremolo(2.0);
        assert_eq!(s.summaries()[0].effects, 1);
        assert!(s.pattern("q").is_none());
    }

    #[test]
    fn silence_and_hush() {
        let s = session();
        s.loop_pattern("a", "x");
        s.loop_pattern("b", "y");
        assert!(s.silence("a"));
        assert!(!s.silence("a"));
        assert_eq!(s.pattern_names(), vec!["b"]);
        s.hush();
        assert!(s.pattern_names().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let s = session();
        let other = s.clone();
        other.loop_pattern("p", "a");
        other.set_tempo(100.0).unwrap();
        assert_eq!(s.pattern_names(), vec!["p"]);
        assert_eq!(s.tempo(), 100.0);
    }
}
