//! Pattern language — bracket checking, parsing into beat trees, pitch names.

pub mod error;
pub mod parser;
pub mod pitch;
pub mod validate;

pub use error::{BracketKind, PatternError};
pub use parser::{parse, parse_token};
pub use pitch::{pitch_to_frequency, Pitch};
pub use validate::{check, is_valid};
