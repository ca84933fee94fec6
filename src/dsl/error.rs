//! Error types for the pattern language.

use thiserror::Error;

/// Which bracket family a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    /// `[...]`
    Square,
    /// `(...)`
    Round,
    /// `<...>`
    Angle,
}

impl BracketKind {
    pub fn open(self) -> char {
        match self {
            BracketKind::Square => '[',
            BracketKind::Round => '(',
            BracketKind::Angle => '<',
        }
    }

    pub fn close(self) -> char {
        match self {
            BracketKind::Square => ']',
            BracketKind::Round => ')',
            BracketKind::Angle => '>',
        }
    }

    pub(crate) fn from_open(c: char) -> Option<Self> {
        match c {
            '[' => Some(BracketKind::Square),
            '(' => Some(BracketKind::Round),
            '<' => Some(BracketKind::Angle),
            _ => None,
        }
    }

    pub(crate) fn from_close(c: char) -> Option<Self> {
        match c {
            ']' => Some(BracketKind::Square),
            ')' => Some(BracketKind::Round),
            '>' => Some(BracketKind::Angle),
            _ => None,
        }
    }
}

/// Why a pattern string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A closing bracket appeared with no open bracket of its family.
    #[error("unexpected '{}' at offset {offset}", .kind.close())]
    UnexpectedClose { kind: BracketKind, offset: usize },
    /// The string ended with open brackets left over.
    #[error("{count} unclosed '{}'", .kind.open())]
    Unclosed { kind: BracketKind, count: usize },
}
