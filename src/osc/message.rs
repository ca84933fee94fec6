//! Outbound message encoding for a SuperCollider-style synth server.
//!
//! Each fired note becomes a group, then its effects, then the instrument
//! synth inside that group.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rosc::{OscMessage, OscType};

use crate::pattern::{Effect, EffectKind};

/// Node id that asks the server to pick one.
const AUTO_NODE_ID: i32 = -1;
/// Add action: head of the target group.
const ADD_TO_HEAD: i32 = 0;
/// Add action: tail of the target group.
const ADD_TO_TAIL: i32 = 1;
/// Root node every group is created under.
const ROOT_NODE: i32 = 0;

/// Fixed amplitude sent with every note.
pub const NOTE_AMP: f32 = 1.0;

/// Instruments the synth server has definitions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Angel,
    Arpy,
    Bass,
    Bell,
    Pads,
    Pluck,
    Ripple,
    Saw,
    Sinepad,
    Sitar,
    Swell,
}

impl Instrument {
    pub const ALL: &'static [Instrument] = &[
        Instrument::Angel,
        Instrument::Arpy,
        Instrument::Bass,
        Instrument::Bell,
        Instrument::Pads,
        Instrument::Pluck,
        Instrument::Ripple,
        Instrument::Saw,
        Instrument::Sinepad,
        Instrument::Sitar,
        Instrument::Swell,
    ];

    /// Synth definition name.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Angel => "angel",
            Instrument::Arpy => "arpy",
            Instrument::Bass => "bass",
            Instrument::Bell => "bell",
            Instrument::Pads => "pads",
            Instrument::Pluck => "pluck",
            Instrument::Ripple => "ripple",
            Instrument::Saw => "saw",
            Instrument::Sinepad => "sinepad",
            Instrument::Sitar => "sitar",
            Instrument::Swell => "swell",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a note names no known instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInstrument;

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .iter()
            .copied()
            .find(|i| i.name() == s)
            .ok_or(UnknownInstrument)
    }
}

/// `/g_new group_id 0 0`: a fresh group under the root node.
pub fn new_group(group_id: i32) -> OscMessage {
    OscMessage {
        addr: "/g_new".to_string(),
        args: vec![
            OscType::Int(group_id),
            OscType::Int(ADD_TO_HEAD),
            OscType::Int(ROOT_NODE),
        ],
    }
}

/// The message applying `effect` inside a note's group.
///
/// Only vibrato has a synth definition on the server; every other kind is
/// kept on the pattern but produces no message.
pub fn effect(effect: &Effect, group_id: i32) -> Option<OscMessage> {
    match effect.kind {
        EffectKind::Vibrato => {
            let mut args = vec![
                OscType::String(effect.kind.name().to_string()),
                OscType::Int(AUTO_NODE_ID),
                OscType::Int(ADD_TO_TAIL),
                OscType::Int(group_id),
            ];
            push_controls(&mut args, effect.named_params());
            Some(OscMessage {
                addr: "/s_new".to_string(),
                args,
            })
        }
        _ => None,
    }
}

/// `/s_new instrument -1 0 group_id freq <f> amp 1.0`
pub fn new_synth(instrument: Instrument, group_id: i32, freq: f64) -> OscMessage {
    let mut args = vec![
        OscType::String(instrument.name().to_string()),
        OscType::Int(AUTO_NODE_ID),
        OscType::Int(ADD_TO_HEAD),
        OscType::Int(group_id),
    ];
    push_controls(&mut args, [("freq", freq as f32), ("amp", NOTE_AMP)]);
    OscMessage {
        addr: "/s_new".to_string(),
        args,
    }
}

/// Everything sent for one note: group, effects newest first, then the synth.
pub fn note_messages(
    instrument: Instrument,
    freq: f64,
    effects: &[Effect],
    group_id: i32,
) -> Vec<OscMessage> {
    let mut messages = vec![new_group(group_id)];
    messages.extend(effects.iter().rev().filter_map(|e| effect(e, group_id)));
    messages.push(new_synth(instrument, group_id, freq));
    messages
}

/// `/d_loadDir <dir>`: load every synth definition in a directory.
pub fn load_synthdefs(dir: &Path) -> OscMessage {
    OscMessage {
        addr: "/d_loadDir".to_string(),
        args: vec![OscType::String(dir.display().to_string())],
    }
}

fn push_controls<'a>(args: &mut Vec<OscType>, controls: impl IntoIterator<Item = (&'a str, f32)>) {
    for (key, value) in controls {
        args.push(OscType::String(key.to_string()));
        args.push(OscType::Float(value));
    }
}
