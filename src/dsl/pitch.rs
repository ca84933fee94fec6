//! Pitch names — converts "A4", "Eb3", "f#", "Cs5" to frequencies.

/// Concert pitch of A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// Octave used when a pitch omits it.
pub const DEFAULT_OCTAVE: i32 = 4;

/// A parsed pitch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    /// Upper-case note letter, `A`..=`G`.
    pub letter: char,
    /// Semitone adjustment: -1 flat, 0 natural, +1 sharp.
    pub accidental: i32,
    pub octave: i32,
}

impl Pitch {
    /// Parse `<letter>[accidental][octave]`.
    ///
    /// - Letter: A-G, either case
    /// - Accidental: `b` or `f` (flat), `s` or `#` (sharp)
    /// - Octave: a single digit, defaulting to 4
    pub fn parse(name: &str) -> Option<Pitch> {
        let mut chars = name.chars().peekable();

        let letter = chars.next()?.to_ascii_uppercase();
        if !('A'..='G').contains(&letter) {
            return None;
        }

        let accidental = match chars.peek() {
            Some('b' | 'f') => -1,
            Some('s' | '#') => 1,
            _ => 0,
        };
        if accidental != 0 {
            chars.next();
        }

        let octave = match chars.next() {
            Some(d) => d.to_digit(10)? as i32,
            None => DEFAULT_OCTAVE,
        };

        if chars.next().is_some() {
            return None;
        }

        Some(Pitch {
            letter,
            accidental,
            octave,
        })
    }

    /// Semitones above (or below) A within the same octave.
    ///
    /// Flats and sharps apply to every letter, so Cb = -10, Fb = -5, Es = -4
    /// and Bs = 3.
    pub fn semitones_from_a(self) -> i32 {
        let natural = match self.letter {
            'C' => -9,
            'D' => -7,
            'E' => -5,
            'F' => -4,
            'G' => -2,
            'A' => 0,
            _ => 2,
        };
        natural + self.accidental
    }

    /// Semitones from A4.
    pub fn semitones_from_a4(self) -> i32 {
        self.semitones_from_a() + 12 * (self.octave - DEFAULT_OCTAVE)
    }

    /// Equal-tempered frequency in Hz.
    pub fn frequency(self) -> f64 {
        A4_FREQUENCY * 2f64.powf(self.semitones_from_a4() as f64 / 12.0)
    }
}

/// Frequency for a pitch name, falling back to A4 when it does not parse.
pub fn pitch_to_frequency(name: &str) -> f64 {
    Pitch::parse(name).map_or(A4_FREQUENCY, Pitch::frequency)
}
