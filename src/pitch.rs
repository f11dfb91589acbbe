//! # Pitch-Degree Model
//!
//! A chord root is a major-scale degree (I..VII) plus a signed accidental.
//! All harmonic relations used by the rewrite rules are expressed through one
//! operation, [`Root::shift`], which moves by a number of scale degrees and a
//! number of semitones and then re-spells the result on the target degree.
//!
//! ## Relations
//! | Relation        | Degrees | Semitones |
//! |-----------------|---------|-----------|
//! | dominant        | +4      | +7        |
//! | subdominant     | +3      | +5        |
//! | supertonic      | +1      | +2        |
//! | mediant         | +2      | +4        |
//! | flat supertonic | +1      | +1        |
//! | sharpened       | +0      | +1        |
//! | leading tone    | +6      | -1        |
//!
//! ## Example
//! ```rust
//! use steedman::Root;
//!
//! let tonic: Root = "I".parse().unwrap();
//! assert_eq!(tonic.dominant().to_string(), "V");
//! assert_eq!(tonic.flat_supertonic().to_string(), "bII");
//! assert_eq!(tonic.sharpened().to_string(), "#I");
//! ```

use crate::error::GrammarError;
use std::fmt;
use std::str::FromStr;

/// Semitone offset of each natural major-scale degree from the tonic.
pub const MAJOR_SCALE_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

const DEGREE_NAMES: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Chord root relative to a diatonic major scale.
///
/// Equality is by spelling: `bII` and `#I` sound the same but are different roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Root {
    degree: u8,
    accidental: i32,
}

impl Root {
    /// Build a root from a 0-based degree (0 = I) and an accidental.
    /// The degree wraps modulo 7.
    pub fn new(degree: u8, accidental: i32) -> Self {
        Self {
            degree: degree % 7,
            accidental,
        }
    }

    pub fn degree(&self) -> u8 {
        self.degree
    }

    pub fn accidental(&self) -> i32 {
        self.accidental
    }

    /// Pitch class of this root above the tonic, 0..12.
    pub fn semitone(&self) -> i32 {
        (MAJOR_SCALE_SEMITONES[self.degree as usize] + self.accidental).rem_euclid(12)
    }

    /// Move by `degree_steps` scale degrees and `semitone_steps` semitones,
    /// spelling the result on the new degree with the smallest accidental.
    pub fn shift(&self, degree_steps: i32, semitone_steps: i32) -> Root {
        let degree = (self.degree as i32 + degree_steps).rem_euclid(7);
        let target = (self.semitone() + semitone_steps).rem_euclid(12);
        let natural = MAJOR_SCALE_SEMITONES[degree as usize];
        Root {
            degree: degree as u8,
            accidental: normalize_accidental(target - natural),
        }
    }

    pub fn dominant(&self) -> Root {
        self.shift(4, 7)
    }

    pub fn subdominant(&self) -> Root {
        self.shift(3, 5)
    }

    pub fn supertonic(&self) -> Root {
        self.shift(1, 2)
    }

    pub fn mediant(&self) -> Root {
        self.shift(2, 4)
    }

    pub fn flat_supertonic(&self) -> Root {
        self.shift(1, 1)
    }

    pub fn sharpened(&self) -> Root {
        self.shift(0, 1)
    }

    /// Half step below, spelled on the seventh degree above.
    pub fn leading_tone(&self) -> Root {
        self.shift(6, -1)
    }
}

/// Fold a semitone difference into the range (-6, 6].
pub fn normalize_accidental(delta: i32) -> i32 {
    let delta = delta.rem_euclid(12);
    if delta > 6 {
        delta - 12
    } else {
        delta
    }
}

/// Split a leading run of accidental characters off `text`.
///
/// Returns the signed accidental and the rest of the text. Accepts ASCII
/// `b`/`#` and the Unicode flat/sharp signs.
pub(crate) fn split_accidentals(text: &str) -> (i32, &str) {
    let mut accidental = 0;
    let mut rest = text;
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some('b') | Some('♭') => accidental -= 1,
            Some('#') | Some('♯') => accidental += 1,
            _ => break,
        }
        rest = chars.as_str();
    }
    (accidental, rest)
}

/// Look up an uppercase Roman numeral.
pub(crate) fn degree_of_numeral(numeral: &str) -> Option<u8> {
    DEGREE_NAMES
        .iter()
        .position(|name| *name == numeral)
        .map(|index| index as u8)
}

impl FromStr for Root {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (accidental, numeral) = split_accidentals(s);
        let degree =
            degree_of_numeral(numeral).ok_or_else(|| GrammarError::InvalidRoot(s.to_string()))?;
        Ok(Root { degree, accidental })
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.accidental > 0 { "#" } else { "b" };
        for _ in 0..self.accidental.unsigned_abs() {
            f.write_str(sign)?;
        }
        f.write_str(DEGREE_NAMES[self.degree as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(s: &str) -> Root {
        s.parse().unwrap()
    }

    #[test]
    fn test_semitone_of_degrees() {
        assert_eq!(root("I").semitone(), 0);
        assert_eq!(root("V").semitone(), 7);
        assert_eq!(root("bII").semitone(), 1);
        assert_eq!(root("#IV").semitone(), 6);
        assert_eq!(root("bI").semitone(), 11);
    }

    #[test]
    fn test_normalize_accidental_range() {
        assert_eq!(normalize_accidental(0), 0);
        assert_eq!(normalize_accidental(6), 6);
        assert_eq!(normalize_accidental(7), -5);
        assert_eq!(normalize_accidental(-1), -1);
        assert_eq!(normalize_accidental(-6), 6);
        assert_eq!(normalize_accidental(13), 1);
    }

    #[test]
    fn test_named_relations_from_tonic() {
        let tonic = root("I");
        assert_eq!(tonic.dominant(), root("V"));
        assert_eq!(tonic.subdominant(), root("IV"));
        assert_eq!(tonic.supertonic(), root("II"));
        assert_eq!(tonic.mediant(), root("III"));
        assert_eq!(tonic.flat_supertonic(), root("bII"));
        assert_eq!(tonic.sharpened(), root("#I"));
        assert_eq!(tonic.leading_tone(), root("VII"));
    }

    #[test]
    fn test_relations_respell_accidentals() {
        // Dominant of II is VI, dominant of VII is #IV
        assert_eq!(root("II").dominant(), root("VI"));
        assert_eq!(root("VII").dominant(), root("#IV"));
        // Subdominant of bVII is bIII
        assert_eq!(root("bVII").subdominant(), root("bIII"));
        // Flat supertonic of V is bVI
        assert_eq!(root("V").flat_supertonic(), root("bVI"));
        // Leading tone of IV is III
        assert_eq!(root("IV").leading_tone(), root("III"));
    }

    #[test]
    fn test_enharmonic_roots_are_distinct() {
        assert_eq!(root("bII").semitone(), root("#I").semitone());
        assert_ne!(root("bII"), root("#I"));
    }

    #[test]
    fn test_parse_unicode_and_stacked_accidentals() {
        assert_eq!(root("♭VII"), root("bVII"));
        assert_eq!(root("♯IV"), root("#IV"));
        assert_eq!(root("bbVII").accidental(), -2);
        assert_eq!(root("b#V").accidental(), 0);
    }

    #[test]
    fn test_invalid_roots() {
        assert!(matches!("VIII".parse::<Root>(), Err(GrammarError::InvalidRoot(_))));
        assert!(matches!("".parse::<Root>(), Err(GrammarError::InvalidRoot(_))));
        assert!(matches!("ii".parse::<Root>(), Err(GrammarError::InvalidRoot(_))));
        assert!(matches!("Ib".parse::<Root>(), Err(GrammarError::InvalidRoot(_))));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["I", "bII", "#IV", "bbVII", "VI"] {
            assert_eq!(root(text).to_string(), text);
        }
    }
}
