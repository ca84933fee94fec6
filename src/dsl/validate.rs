//! Bracket balance checking.
//!
//! Each bracket family keeps its own open count. A pattern is valid when no
//! count ever drops below zero and every count is zero at the end. Families
//! are counted independently, so `[(])` passes: interleaving across families
//! is not checked.

use super::error::{BracketKind, PatternError};

/// Open counts for `[`, `(` and `<`, in that order.
#[derive(Debug, Default)]
struct Counts([usize; 3]);

impl Counts {
    fn slot(kind: BracketKind) -> usize {
        match kind {
            BracketKind::Square => 0,
            BracketKind::Round => 1,
            BracketKind::Angle => 2,
        }
    }

    fn open(&mut self, kind: BracketKind) {
        self.0[Self::slot(kind)] += 1;
    }

    /// Returns false if the family had nothing open.
    fn close(&mut self, kind: BracketKind) -> bool {
        let count = &mut self.0[Self::slot(kind)];
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }
}

/// Check bracket balance, reporting the first problem found.
pub fn check(pattern: &str) -> Result<(), PatternError> {
    let mut counts = Counts::default();

    for (offset, c) in pattern.char_indices() {
        if let Some(kind) = BracketKind::from_open(c) {
            counts.open(kind);
        } else if let Some(kind) = BracketKind::from_close(c) {
            if !counts.close(kind) {
                return Err(PatternError::UnexpectedClose { kind, offset });
            }
        }
    }

    for kind in [BracketKind::Square, BracketKind::Round, BracketKind::Angle] {
        let count = counts.0[Counts::slot(kind)];
        if count > 0 {
            return Err(PatternError::Unclosed { kind, count });
        }
    }
    Ok(())
}

/// Whether the pattern's brackets balance.
pub fn is_valid(pattern: &str) -> bool {
    check(pattern).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_mixed_brackets_are_valid() {
        assert!(is_valid("[a (b c) <d e>]"));
    }

    #[test]
    fn plain_tokens_are_valid() {
        assert!(is_valid("bass:C4 pads:E4"));
        assert!(is_valid(""));
        assert!(is_valid("   "));
    }

    #[test]
    fn closing_first_is_invalid() {
        assert_eq!(
            check("] a ["),
            Err(PatternError::UnexpectedClose {
                kind: BracketKind::Square,
                offset: 0
            })
        );
    }

    #[test]
    fn negative_prefix_is_invalid_even_if_total_balances() {
        assert!(!is_valid("a > <"));
        assert!(!is_valid("(a)) ((b)"));
    }

    #[test]
    fn unclosed_is_reported_with_count() {
        assert_eq!(
            check("<<a"),
            Err(PatternError::Unclosed {
                kind: BracketKind::Angle,
                count: 2
            })
        );
    }

    #[test]
    fn cross_family_misordering_is_accepted() {
        // Each family balances on its own.
        assert!(is_valid("[a (b] c)"));
        assert!(is_valid("<[>]"));
    }

    #[test]
    fn offset_is_byte_offset() {
        assert_eq!(
            check("é)"),
            Err(PatternError::UnexpectedClose {
                kind: BracketKind::Round,
                offset: 2
            })
        );
    }
}
