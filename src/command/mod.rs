//! Live commands — one line of text per action against a [`Session`].
//!
//! ```text
//! tempo [bpm]                     show or set the tempo
//! loop NAME PATTERN               play until silenced
//! once|twice|thrice NAME PATTERN  play 1, 2 or 3 times
//! repeat N NAME PATTERN           play N times
//! fx NAME KIND [PARAM...]         add an effect
//! silence NAME                    remove one pattern
//! hush                            remove every pattern
//! list                            show registered patterns
//! help                            show this summary
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use thiserror::Error;

use crate::dsl;
use crate::event::TempoError;
use crate::pattern::{Effect, EffectBuilder, EffectError, EffectKind, Repeats};
use crate::scheduler::Session;

pub const HELP: &str = "\
tempo [bpm]                     show or set the tempo
loop NAME PATTERN               play until silenced
once|twice|thrice NAME PATTERN  play 1, 2 or 3 times
repeat N NAME PATTERN           play N times
fx NAME KIND [PARAM...]         add an effect
silence NAME                    remove one pattern
hush                            remove every pattern
list                            show registered patterns
help                            show this summary";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tempo(Option<f64>),
    Define {
        name: String,
        repeats: Repeats,
        pattern: String,
    },
    Effect {
        name: String,
        effect: Effect,
    },
    Silence(String),
    Hush,
    List,
    Help,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("{command}: missing {what}")]
    Missing {
        command: &'static str,
        what: &'static str,
    },
    #[error("not a number: '{0}'")]
    BadNumber(String),
    #[error("no pattern named '{0}'")]
    NoSuchPattern(String),
    #[error(transparent)]
    Effect(#[from] EffectError),
    #[error(transparent)]
    Tempo(#[from] TempoError),
}

/// Parse one input line. Blank and comment lines give `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = next_word(line);
    let command = match word {
        "tempo" => match next_word(rest).0 {
            "" => Command::Tempo(None),
            bpm => Command::Tempo(Some(number(bpm)?)),
        },
        "loop" => define("loop", Repeats::Infinite, rest)?,
        "once" => define("once", Repeats::Times(1), rest)?,
        "twice" => define("twice", Repeats::Times(2), rest)?,
        "thrice" => define("thrice", Repeats::Times(3), rest)?,
        "repeat" => {
            let (count, rest) = next_word(rest);
            let count = required("repeat", "count", count)?;
            let count = count
                .parse::<u32>()
                .map_err(|_| CommandError::BadNumber(count.to_string()))?;
            define("repeat", Repeats::Times(count), rest)?
        }
        "fx" => {
            let (name, rest) = next_word(rest);
            let name = required("fx", "pattern name", name)?;
            let (kind, rest) = next_word(rest);
            let kind: EffectKind = required("fx", "effect kind", kind)?.parse()?;
            let params = rest
                .split_whitespace()
                .map(number)
                .collect::<Result<Vec<f32>, _>>()?;
            Command::Effect {
                name: name.to_string(),
                effect: Effect::from_partial(kind, &params)?,
            }
        }
        "silence" => {
            let name = required("silence", "pattern name", next_word(rest).0)?;
            Command::Silence(name.to_string())
        }
        "hush" => Command::Hush,
        "list" => Command::List,
        "help" => Command::Help,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

impl Command {
    /// Run the command and describe what happened.
    pub fn execute(self, session: &Session) -> Result<String, CommandError> {
        match self {
            Command::Tempo(None) => Ok(format!("tempo {}", session.tempo())),
            Command::Tempo(Some(bpm)) => {
                session.set_tempo(bpm)?;
                Ok(format!("tempo {bpm}"))
            }
            Command::Define {
                name,
                repeats,
                pattern,
            } => {
                let handle = session.define(&name, &pattern, repeats);
                Ok(match (handle.id(), dsl::check(&pattern)) {
                    (None, _) => format!("{name}: zero repeats, nothing registered"),
                    (Some(_), Err(e)) => format!("{name} ({repeats}) registered silent: {e}"),
                    (Some(_), Ok(())) => format!("{name} ({repeats})"),
                })
            }
            Command::Effect { name, effect } => {
                let mut handle = session
                    .pattern(&name)
                    .ok_or_else(|| CommandError::NoSuchPattern(name.clone()))?;
                let kind = effect.kind;
                handle.add_effect(effect);
                Ok(format!("{name} + {kind}"))
            }
            Command::Silence(name) => {
                if session.silence(&name) {
                    Ok(format!("silenced {name}"))
                } else {
                    Err(CommandError::NoSuchPattern(name))
                }
            }
            Command::Hush => {
                session.hush();
                Ok("hushed".to_string())
            }
            Command::List => {
                let summaries = session.summaries();
                if summaries.is_empty() {
                    return Ok("no patterns".to_string());
                }
                let lines: Vec<String> = summaries
                    .iter()
                    .map(|p| {
                        format!(
                            "{:<12} {} steps, at {}, {}, {} fx",
                            p.name, p.steps, p.cursor, p.repeats, p.effects
                        )
                    })
                    .collect();
                Ok(lines.join("\n"))
            }
            Command::Help => Ok(HELP.to_string()),
        }
    }
}

fn define(command: &'static str, repeats: Repeats, rest: &str) -> Result<Command, CommandError> {
    let (name, pattern) = next_word(rest);
    let name = required(command, "pattern name", name)?;
    let pattern = required(command, "pattern", pattern.trim_end())?;
    Ok(Command::Define {
        name: name.to_string(),
        repeats,
        pattern: pattern.to_string(),
    })
}

fn required<'a>(
    command: &'static str,
    what: &'static str,
    word: &'a str,
) -> Result<&'a str, CommandError> {
    if word.is_empty() {
        Err(CommandError::Missing { command, what })
    } else {
        Ok(word)
    }
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadNumber(word.to_string()))
}

/// Split off the first whitespace-delimited word.
fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Tempo;

    fn run(session: &Session, line: &str) -> Result<String, CommandError> {
        parse_line(line)?
            .map(|c| c.execute(session))
            .unwrap_or_else(|| Ok(String::new()))
    }

    #[test]
    fn help_lists_every_command() {
        let session = Session::new(Tempo::default(), None);
        let text = run(&session, "help").unwrap();
        for cmd in ["tempo", "loop", "once", "repeat", "fx", "silence", "hush", "list", "help"] {
            assert!(
                text.lines().any(|l| l.starts_with(cmd)),
                "help is missing {cmd}"
            );
        }
    }

    #[test]
    fn blank_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# loop p a").unwrap(), None);
    }

    #[test]
    fn define_keeps_pattern_text() {
        assert_eq!(
            parse_line("loop drums  [bass:C2 pads]  <a b>").unwrap(),
            Some(Command::Define {
                name: "drums".into(),
                repeats: Repeats::Infinite,
                pattern: "[bass:C2 pads]  <a b>".into(),
            })
        );
    }

    #[test]
    fn repeat_words() {
        let repeats = |line: &str| match parse_line(line).unwrap() {
            Some(Command::Define { repeats, .. }) => repeats,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(repeats("once p a"), Repeats::Times(1));
        assert_eq!(repeats("twice p a"), Repeats::Times(2));
        assert_eq!(repeats("thrice p a"), Repeats::Times(3));
        assert_eq!(repeats("repeat 7 p a"), Repeats::Times(7));
    }

    #[test]
    fn missing_arguments() {
        assert_eq!(
            parse_line("loop p"),
            Err(CommandError::Missing {
                command: "loop",
                what: "pattern"
            })
        );
        assert_eq!(
            parse_line("repeat"),
            Err(CommandError::Missing {
                command: "repeat",
                what: "count"
            })
        );
        assert_eq!(
            parse_line("repeat x p a"),
            Err(CommandError::BadNumber("x".into()))
        );
        assert!(matches!(
            parse_line("silence"),
            Err(CommandError::Missing { .. })
        ));
    }

    #[test]
    fn fx_parsing() {
        assert_eq!(
            parse_line("fx p reverb 0.5").unwrap(),
            Some(Command::Effect {
                name: "p".into(),
                effect: Effect::reverb(0.5, 0.1),
            })
        );
        assert_eq!(
            parse_line("fx p wah"),
            Err(CommandError::Effect(EffectError::UnknownKind("wah".into())))
        );
        assert!(matches!(
            parse_line("fx p chop 1 2"),
            Err(CommandError::Effect(EffectError::TooManyParams { .. }))
        ));
        assert_eq!(
            parse_line("fx p chop lots"),
            Err(CommandError::BadNumber("lots".into()))
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_line("play p"),
            Err(CommandError::Unknown("play".into()))
        );
    }

    #[test]
    fn tempo_query_and_set() {
        let s = Session::new(Tempo::default(), Some(1));
        assert_eq!(run(&s, "tempo").unwrap(), "tempo 135");
        assert_eq!(run(&s, "tempo 98.5").unwrap(), "tempo 98.5");
        assert!(matches!(run(&s, "tempo 0"), Err(CommandError::Tempo(_))));
        assert_eq!(s.tempo(), 98.5);
    }

    #[test]
    fn define_fx_silence_flow() {
        let s = Session::new(Tempo::default(), Some(1));
        assert_eq!(run(&s, "loop p bass:C2").unwrap(), "p (loop)");
        assert_eq!(run(&s, "fx p vibrato").unwrap(), "p + vibrato");
        assert_eq!(s.summaries()[0].effects, 1);
        assert_eq!(
            run(&s, "fx q vibrato"),
            Err(CommandError::NoSuchPattern("q".into()))
        );
        assert_eq!(run(&s, "silence p").unwrap(), "silenced p");
        assert_eq!(
            run(&s, "silence p"),
            Err(CommandError::NoSuchPattern("p".into()))
        );
    }

    #[test]
    fn define_reports_invalid_and_zero() {
        let s = Session::new(Tempo::default(), Some(1));
        let out = run(&s, "twice p [a b").unwrap();
        assert!(out.starts_with("p (x2) registered silent"), "{out}");
        let out = run(&s, "repeat 0 q a").unwrap();
        assert_eq!(out, "q: zero repeats, nothing registered");
        assert_eq!(s.pattern_names(), vec!["p"]);
    }

    #[test]
    fn list_and_hush() {
        let s = Session::new(Tempo::default(), Some(1));
        assert_eq!(run(&s, "list").unwrap(), "no patterns");
        run(&s, "loop a bass").unwrap();
        run(&s, "once b [pads saw]").unwrap();
        let listing = run(&s, "list").unwrap();
        assert_eq!(listing.lines().count(), 2);
        assert!(listing.lines().next().unwrap().starts_with("a "));
        assert_eq!(run(&s, "hush").unwrap(), "hushed");
        assert!(s.pattern_names().is_empty());
    }
}
