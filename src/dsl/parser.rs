//! Recursive-descent parser for pattern strings.
//!
//! Grammar (informal):
//!
//! ```text
//! pattern  := item*
//! item     := '[' pattern ']'     -> Sequence
//!           | '(' pattern ')'     -> Parallel
//!           | '<' pattern '>'     -> Cycle
//!           | token               -> Note
//! token    := non-whitespace run, split once on ':' into instrument and pitch
//! ```
//!
//! A string that fails the bracket check parses to nothing. Random groups
//! have no bracket syntax; they are built with [`BeatNode::random`].

use tracing::debug;

use super::validate;
use crate::beat::{BeatNode, Note};

/// Parse a pattern string into its top-level beats.
///
/// Returns an empty list if the brackets do not balance.
pub fn parse(pattern: &str) -> Vec<BeatNode> {
    if let Err(e) = validate::check(pattern) {
        debug!(pattern, error = %e, "pattern rejected");
        return Vec::new();
    }

    let mut beats = Vec::new();
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if let Some(group) = Group::from_open(c) {
            let close = matching_close(rest, c, group.close());
            let inner = &rest[c.len_utf8()..close];
            // Empty groups like `[]` contribute nothing.
            if let Some(node) = group.build(parse(inner)) {
                beats.push(node);
            }
            rest = rest.get(close + 1..).unwrap_or("");
        } else if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            beats.push(BeatNode::note(parse_token(&rest[..end])));
            rest = &rest[end..];
        }
    }

    beats
}

/// Split a token on its first colon into instrument and pitch.
pub fn parse_token(token: &str) -> Note {
    match token.split_once(':') {
        Some((instrument, pitch)) => Note::new(instrument, pitch),
        None => Note::new(token, ""),
    }
}

/// The combinator a bracket family builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Sequence,
    Parallel,
    Cycle,
}

impl Group {
    fn from_open(c: char) -> Option<Self> {
        match c {
            '[' => Some(Group::Sequence),
            '(' => Some(Group::Parallel),
            '<' => Some(Group::Cycle),
            _ => None,
        }
    }

    fn close(self) -> char {
        match self {
            Group::Sequence => ']',
            Group::Parallel => ')',
            Group::Cycle => '>',
        }
    }

    fn build(self, children: Vec<BeatNode>) -> Option<BeatNode> {
        match self {
            Group::Sequence => BeatNode::sequence(children),
            Group::Parallel => BeatNode::parallel(children),
            Group::Cycle => BeatNode::cycle(children),
        }
    }
}

/// Byte offset of the closer matching the opener at the start of `s`.
///
/// Only brackets of the same family are counted. If no closer is found the
/// end of the string is returned.
fn matching_close(s: &str, open: char, close: char) -> usize {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
        }
        if depth == 0 {
            return i;
        }
    }
    s.len()
}
