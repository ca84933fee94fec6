//! Set files — a tempo plus patterns to start with, in YAML.
//!
//! ```yaml
//! tempo: 120
//! patterns:
//!   - name: bassline
//!     pattern: "bass:C2 [bass:C2 bass:G2] <bass:Eb2 bass:F2>"
//!     repeat: loop
//!     effects:
//!       - kind: vibrato
//!         params: [5.0, 0.05]
//!   - name: intro
//!     pattern: "(pads:C4 pads:E4 pads:G4)"
//!     repeat: 2
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{read, ConfigError};
use crate::pattern::{Effect, EffectBuilder, EffectError, EffectKind, Repeats};
use crate::scheduler::Session;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetFile {
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub repeat: RepeatSpec,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

/// `loop`, `once`, `twice`, `thrice`, or a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatSpec {
    Count(u32),
    Named(RepeatWord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatWord {
    Loop,
    Once,
    Twice,
    Thrice,
}

impl Default for RepeatSpec {
    fn default() -> Self {
        RepeatSpec::Named(RepeatWord::Loop)
    }
}

impl From<RepeatSpec> for Repeats {
    fn from(spec: RepeatSpec) -> Self {
        match spec {
            RepeatSpec::Count(n) => Repeats::Times(n),
            RepeatSpec::Named(RepeatWord::Loop) => Repeats::Infinite,
            RepeatSpec::Named(RepeatWord::Once) => Repeats::Times(1),
            RepeatSpec::Named(RepeatWord::Twice) => Repeats::Times(2),
            RepeatSpec::Named(RepeatWord::Thrice) => Repeats::Times(3),
        }
    }
}

/// An effect with leading parameters; the rest take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub kind: EffectKind,
    #[serde(default)]
    pub params: Vec<f32>,
}

impl EffectSpec {
    pub fn to_effect(&self) -> Result<Effect, EffectError> {
        Effect::from_partial(self.kind, &self.params)
    }
}

impl SetFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the tempo and register every pattern.
    ///
    /// A bad tempo or effect is logged and skipped; the rest of the set still
    /// loads. Returns the number of patterns registered.
    pub fn apply(&self, session: &Session) -> usize {
        if let Some(bpm) = self.tempo {
            // Rejections are logged by the session.
            let _ = session.set_tempo(bpm);
        }

        let mut registered = 0;
        for spec in &self.patterns {
            let mut handle = session.define(&spec.name, &spec.pattern, spec.repeat.into());
            for effect in &spec.effects {
                match effect.to_effect() {
                    Ok(effect) => {
                        handle.add_effect(effect);
                    }
                    Err(e) => warn!(pattern = %spec.name, error = %e, "effect skipped"),
                }
            }
            if handle.id().is_some() {
                registered += 1;
            }
        }
        info!(patterns = registered, "set loaded");
        registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tempo;
    use std::io::Write;

    const SET: &str = r#"
tempo: 120
patterns:
  - name: bassline
    pattern: "bass:C2 [bass:C2 bass:G2]"
    effects:
      - kind: vibrato
        params: [5.0]
      - kind: low_pass
  - name: intro
    pattern: "(pads:C4 pads:E4)"
    repeat: 2
  - name: stab
    pattern: "saw:A4"
    repeat: once
"#;

    fn session() -> Session {
        Session::new(Tempo::default(), Some(5))
    }

    #[test]
    fn parses_repeat_forms() {
        let set: SetFile = serde_yaml::from_str(SET).unwrap();
        let repeats: Vec<Repeats> = set.patterns.iter().map(|p| p.repeat.into()).collect();
        assert_eq!(
            repeats,
            vec![Repeats::Infinite, Repeats::Times(2), Repeats::Times(1)]
        );
    }

    #[test]
    fn effect_params_fill_defaults() {
        let set: SetFile = serde_yaml::from_str(SET).unwrap();
        let effects = &set.patterns[0].effects;
        assert_eq!(effects[0].to_effect().unwrap(), Effect::vibrato(5.0, 0.02));
        assert_eq!(effects[1].to_effect().unwrap(), Effect::low_pass(400.0, 1.0));
    }

    #[test]
    fn apply_registers_everything() {
        let set: SetFile = serde_yaml::from_str(SET).unwrap();
        let s = session();
        assert_eq!(set.apply(&s), 3);
        assert_eq!(s.tempo(), 120.0);
        assert_eq!(s.pattern_names(), vec!["bassline", "intro", "stab"]);
        assert_eq!(s.summaries()[0].effects, 2);
    }

    #[test]
    fn bad_entries_are_skipped() {
        let yaml = r#"
tempo: -4
patterns:
  - name: p
    pattern: "bass"
    effects:
      - kind: chop
        params: [1, 2, 3]
      - kind: reverb
  - name: none
    pattern: "bass"
    repeat: 0
"#;
        let set: SetFile = serde_yaml::from_str(yaml).unwrap();
        let s = session();
        assert_eq!(set.apply(&s), 1);
        assert_eq!(s.tempo(), 135.0);
        assert_eq!(s.summaries()[0].effects, 1);
    }

    #[test]
    fn unknown_effect_kind_fails_to_parse() {
        let yaml = "patterns:\n  - name: p\n    pattern: a\n    effects:\n      - kind: wah\n";
        assert!(serde_yaml::from_str::<SetFile>(yaml).is_err());
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SET.as_bytes()).unwrap();
        let set = SetFile::load(file.path()).unwrap();
        assert_eq!(set.tempo, Some(120.0));
        assert_eq!(set.patterns.len(), 3);
    }

    #[test]
    fn missing_set_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SetFile::load(&dir.path().join("set.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
