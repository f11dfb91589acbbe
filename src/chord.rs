//! # Chord Model
//!
//! A chord is a [`Root`] plus three quality flags. The canonical token puts
//! the root first and then exactly one suffix, chosen in this order:
//!
//! | Flags                   | Suffix | Example  |
//! |-------------------------|--------|----------|
//! | diminished seventh      | `°7`   | `#I°7`   |
//! | minor + seventh         | `m7`   | `IIm7`   |
//! | seventh                 | `7`    | `V7`     |
//! | minor                   | `m`    | `VIm`    |
//! | none                    |        | `IV`     |
//!
//! Lowercase Roman shorthand is accepted when parsing: `ii` is `IIm`, `v7` is
//! `Vm7`, `bvii` is `bVIIm`.

use crate::error::GrammarError;
use crate::pitch::{split_accidentals, Root};
use std::fmt;
use std::str::FromStr;

const LOWERCASE_NUMERALS: [&str; 7] = ["i", "ii", "iii", "iv", "v", "vi", "vii"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    root: Root,
    minor: bool,
    dominant7: bool,
    diminished7: bool,
}

impl Chord {
    /// Build a chord, rejecting a diminished seventh that also carries the
    /// minor or seventh flag.
    pub fn new(
        root: Root,
        minor: bool,
        dominant7: bool,
        diminished7: bool,
    ) -> Result<Self, GrammarError> {
        if diminished7 && (minor || dominant7) {
            return Err(GrammarError::InvalidChord(
                "Diminished seventh cannot be combined with m/7 flags.".to_string(),
            ));
        }
        Ok(Self {
            root,
            minor,
            dominant7,
            diminished7,
        })
    }

    pub fn major(root: Root) -> Self {
        Self::with_flags(root, false, false)
    }

    pub fn minor(root: Root) -> Self {
        Self::with_flags(root, true, false)
    }

    pub fn dominant_seventh(root: Root) -> Self {
        Self::with_flags(root, false, true)
    }

    pub fn minor_seventh(root: Root) -> Self {
        Self::with_flags(root, true, true)
    }

    pub fn diminished_seventh(root: Root) -> Self {
        Self {
            root,
            minor: false,
            dominant7: false,
            diminished7: true,
        }
    }

    /// Any minor/seventh combination; never diminished.
    pub fn with_flags(root: Root, minor: bool, dominant7: bool) -> Self {
        Self {
            root,
            minor,
            dominant7,
            diminished7: false,
        }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn is_minor(&self) -> bool {
        self.minor
    }

    pub fn is_dominant7(&self) -> bool {
        self.dominant7
    }

    pub fn is_diminished7(&self) -> bool {
        self.diminished7
    }

    /// No seventh of either kind.
    pub fn is_plain(&self) -> bool {
        !self.diminished7 && !self.dominant7
    }

    pub fn is_plain_major(&self) -> bool {
        self.is_plain() && !self.minor
    }

    pub fn is_major_dom7(&self) -> bool {
        self.dominant7 && !self.minor && !self.diminished7
    }

    pub fn is_minor_dom7(&self) -> bool {
        self.dominant7 && self.minor && !self.diminished7
    }

    /// The same chord with the seventh dropped (`IIm7` -> `IIm`).
    pub fn without_seventh(&self) -> Self {
        Self::with_flags(self.root, self.minor, false)
    }
}

/// Rewrite lowercase shorthand (`ii`, `bvii7`) into uppercase-with-suffix form.
/// Returns `None` when `text` is not shorthand.
fn expand_lowercase_shorthand(text: &str) -> Option<String> {
    let (_, rest) = split_accidentals(text);
    let (numeral, seventh) = match rest.strip_suffix('7') {
        Some(numeral) => (numeral, true),
        None => (rest, false),
    };
    if !LOWERCASE_NUMERALS.contains(&numeral) {
        return None;
    }
    let prefix = &text[..text.len() - rest.len()];
    let suffix = if seventh { "m7" } else { "m" };
    Some(format!("{}{}{}", prefix, numeral.to_uppercase(), suffix))
}

/// Parse a chord symbol without duration (`bIIm7`, `V7`, `#I°7`, `ii`).
pub fn parse_chord(token: &str) -> Result<Chord, GrammarError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(GrammarError::EmptyToken("Empty chord token.".to_string()));
    }
    let expanded = expand_lowercase_shorthand(trimmed);
    let text = expanded.as_deref().unwrap_or(trimmed);

    if let Some(root) = text.strip_suffix("°7") {
        return Chord::new(root.parse()?, false, false, true);
    }
    if let Some(root) = text.strip_suffix("m7") {
        return Chord::new(root.parse()?, true, true, false);
    }
    if let Some(root) = text.strip_suffix('7') {
        return Chord::new(root.parse()?, false, true, false);
    }
    if let Some(root) = text.strip_suffix('m') {
        return Chord::new(root.parse()?, true, false, false);
    }
    Chord::new(text.parse()?, false, false, false)
}

impl FromStr for Chord {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.diminished7 {
            "°7"
        } else if self.dominant7 && self.minor {
            "m7"
        } else if self.dominant7 {
            "7"
        } else if self.minor {
            "m"
        } else {
            ""
        };
        write!(f, "{}{}", self.root, suffix)
    }
}
