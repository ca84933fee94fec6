//! Effects — named audio directives attached to a pattern.
//!
//! Each kind has a fixed parameter list with defaults. A pattern's effects
//! form an append-only chain that is snapshotted into every note it
//! schedules.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An immutable snapshot of a pattern's effects, in the order they were added.
pub type EffectChain = Arc<[Effect]>;

/// A single effect: its kind plus one value per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub params: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("unknown effect '{0}'")]
    UnknownKind(String),
    #[error("{kind} takes at most {max} parameters, got {given}")]
    TooManyParams {
        kind: EffectKind,
        given: usize,
        max: usize,
    },
}

macro_rules! effect_kinds {
    ($( $variant:ident => $name:ident ( $( $param:ident = $default:literal ),+ ) ),+ $(,)?) => {
        /// Every supported effect kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum EffectKind {
            $( $variant, )+
        }

        impl EffectKind {
            pub const ALL: &'static [EffectKind] = &[ $( EffectKind::$variant, )+ ];

            /// Snake-case name, as used in commands and on the wire.
            pub fn name(self) -> &'static str {
                match self {
                    $( EffectKind::$variant => stringify!($name), )+
                }
            }

            pub fn param_names(self) -> &'static [&'static str] {
                match self {
                    $( EffectKind::$variant => &[ $( stringify!($param) ),+ ], )+
                }
            }

            pub fn default_params(self) -> &'static [f32] {
                match self {
                    $( EffectKind::$variant => &[ $( $default ),+ ], )+
                }
            }
        }

        impl Effect {
            $(
                #[doc = concat!("A `", stringify!($name), "` effect.")]
                pub fn $name( $( $param: f32 ),+ ) -> Self {
                    Self {
                        kind: EffectKind::$variant,
                        params: vec![ $( $param ),+ ],
                    }
                }
            )+
        }

        /// Chained effect configuration. Every method appends one effect and
        /// returns the same handle.
        pub trait EffectBuilder {
            /// Append `effect` to the chain.
            fn add_effect(&mut self, effect: Effect) -> &mut Self;

            $(
                #[doc = concat!("Append a `", stringify!($name), "` effect.")]
                fn $name(&mut self, $( $param: f32 ),+ ) -> &mut Self {
                    self.add_effect(Effect::$name( $( $param ),+ ))
                }
            )+
        }
    };
}

effect_kinds! {
    Vibrato => vibrato(rate = 6.0, depth = 0.02),
    SlideTo => slide_to(slide = 1.0, delay = 0.0),
    SlideFrom => slide_from(slide = 1.0, delay = 0.0),
    PitchBend => pitch_bend(bend = 1.0, delay = 0.0),
    PitchShift => pitch_shift(shift = 0.0),
    Chop => chop(num_parts = 4.0),
    Coarse => coarse(num_parts = 4.0),
    HighPass => high_pass(hpf = 2000.0, hpr = 1.0),
    LowPass => low_pass(lpf = 400.0, lpr = 1.0),
    Bitcrush => bitcrush(bits = 4.0, crush = 8.0),
    Distortion => distortion(dist = 1.0),
    WaveShape => wave_shape(shape = 1.0),
    Overdrive => overdrive(drive = 1.0),
    Reverb => reverb(room = 1.0, mix = 0.1),
    PanSpin => pan_spin(num_times = 4.0),
    Formant => formant(formant = 4.0),
    Tremolo => tremolo(num_times = 2.0),
    Glissando => glissando(gliss = 0.0),
}

impl EffectKind {
    pub fn arity(self) -> usize {
        self.default_params().len()
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| EffectError::UnknownKind(s.to_string()))
    }
}

impl Effect {
    /// An effect with every parameter at its default.
    pub fn with_defaults(kind: EffectKind) -> Self {
        Self {
            kind,
            params: kind.default_params().to_vec(),
        }
    }

    /// Build an effect from leading parameters; missing trailing parameters
    /// take their defaults.
    pub fn from_partial(kind: EffectKind, given: &[f32]) -> Result<Self, EffectError> {
        let defaults = kind.default_params();
        if given.len() > defaults.len() {
            return Err(EffectError::TooManyParams {
                kind,
                given: given.len(),
                max: defaults.len(),
            });
        }
        let mut params = given.to_vec();
        params.extend_from_slice(&defaults[given.len()..]);
        Ok(Self { kind, params })
    }

    /// Parameter name/value pairs.
    pub fn named_params(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.kind
            .param_names()
            .iter()
            .copied()
            .zip(self.params.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Chain(Vec<Effect>);

    impl EffectBuilder for Chain {
        fn add_effect(&mut self, effect: Effect) -> &mut Self {
            self.0.push(effect);
            self
        }
    }

    #[test]
    fn eighteen_kinds() {
        assert_eq!(EffectKind::ALL.len(), 18);
    }

    #[test]
    fn documented_defaults() {
        assert_eq!(EffectKind::Vibrato.default_params(), &[6.0, 0.02]);
        assert_eq!(EffectKind::HighPass.default_params(), &[2000.0, 1.0]);
        assert_eq!(EffectKind::LowPass.default_params(), &[400.0, 1.0]);
        assert_eq!(EffectKind::Bitcrush.default_params(), &[4.0, 8.0]);
        assert_eq!(EffectKind::Reverb.default_params(), &[1.0, 0.1]);
        assert_eq!(EffectKind::Tremolo.default_params(), &[2.0]);
        assert_eq!(EffectKind::Glissando.default_params(), &[0.0]);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for &kind in EffectKind::ALL {
            assert_eq!(kind.name().parse::<EffectKind>(), Ok(kind));
        }
        assert_eq!(EffectKind::PanSpin.name(), "pan_spin");
        assert_eq!(EffectKind::SlideTo.to_string(), "slide_to");
    }

    #[test]
    fn unknown_kind() {
        assert_eq!(
            "wah".parse::<EffectKind>(),
            Err(EffectError::UnknownKind("wah".to_string()))
        );
    }

    #[test]
    fn param_names_match_arity() {
        for &kind in EffectKind::ALL {
            assert_eq!(kind.param_names().len(), kind.arity());
        }
        assert_eq!(EffectKind::Vibrato.param_names(), &["rate", "depth"]);
    }

    #[test]
    fn partial_params_fill_defaults() {
        let e = Effect::from_partial(EffectKind::Reverb, &[0.5]).unwrap();
        assert_eq!(e.params, vec![0.5, 0.1]);
        let e = Effect::from_partial(EffectKind::Reverb, &[]).unwrap();
        assert_eq!(e, Effect::with_defaults(EffectKind::Reverb));
    }

    #[test]
    fn too_many_params() {
        let err = Effect::from_partial(EffectKind::Chop, &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            EffectError::TooManyParams {
                kind: EffectKind::Chop,
                given: 2,
                max: 1
            }
        );
        assert_eq!(err.to_string(), "chop takes at most 1 parameters, got 2");
    }

    #[test]
    fn builder_chains_in_order() {
        let mut chain = Chain::default();
        chain.vibrato(5.0, 0.1).reverb(0.8, 0.3).chop(8.0);
        let kinds: Vec<EffectKind> = chain.0.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EffectKind::Vibrato, EffectKind::Reverb, EffectKind::Chop]
        );
        assert_eq!(chain.0[0].params, vec![5.0, 0.1]);
    }

    #[test]
    fn named_params_pairs() {
        let e = Effect::low_pass(800.0, 0.5);
        let pairs: Vec<_> = e.named_params().collect();
        assert_eq!(pairs, vec![("lpf", 800.0), ("lpr", 0.5)]);
    }

    #[test]
    fn kind_deserializes_from_snake_case() {
        let kind: EffectKind = serde_yaml::from_str("high_pass").unwrap();
        assert_eq!(kind, EffectKind::HighPass);
    }
}
