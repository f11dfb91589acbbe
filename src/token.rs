//! # Token Notation
//!
//! One chord per token, with an optional duration after `@`:
//!
//! ```text
//! token    := chord ("@" duration)?
//! chord    := accidental* numeral suffix?     (see `chord`)
//! duration := integer | a/b | decimal          (see `duration`)
//! ```
//!
//! A whole progression is either comma separated tokens
//! (`I@4,IV@2,V7@2`) or a JSON array whose elements are token strings or
//! objects `{"chord": "IIm7", "duration": 2}` (`dur` is accepted as an alias).
//!
//! A duration of exactly 1 is omitted when formatting unless explicitly
//! requested, so `I@1` prints as `I`.

use crate::chord::{parse_chord, Chord};
use crate::duration::{parse_duration, parse_duration_str, Duration};
use crate::error::GrammarError;
use num_rational::BigRational;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A chord held for a positive duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimedChord {
    pub chord: Chord,
    pub duration: Duration,
}

impl TimedChord {
    pub fn new(chord: Chord, duration: Duration) -> Self {
        Self { chord, duration }
    }

    /// A chord lasting one beat.
    pub fn unit(chord: Chord) -> Self {
        Self::new(chord, Duration::one())
    }

    /// Canonical token; `@1` is omitted.
    pub fn to_token(&self) -> String {
        self.to_token_with_unit(false)
    }

    /// Token with `@duration` always present when `show_unit_one` is set.
    pub fn to_token_with_unit(&self, show_unit_one: bool) -> String {
        if self.duration.is_one() && !show_unit_one {
            self.chord.to_string()
        } else {
            format!("{}@{}", self.chord, self.duration)
        }
    }

    /// Same chord with the duration multiplied by `factor`.
    pub fn scaled(&self, factor: &BigRational) -> Result<Self, GrammarError> {
        Ok(Self::new(self.chord, self.duration.scaled(factor)?))
    }
}

impl fmt::Display for TimedChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl FromStr for TimedChord {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_timed_chord_token(s)
    }
}

/// Format a timed chord, omitting a unit duration.
pub fn format_token(timed: &TimedChord) -> String {
    timed.to_token()
}

/// Parse `chord[@duration]`. The duration defaults to 1.
pub fn parse_timed_chord_token(token: &str) -> Result<TimedChord, GrammarError> {
    let text = token.trim();
    if text.is_empty() {
        return Err(GrammarError::EmptyToken("Empty chord token.".to_string()));
    }
    match text.rsplit_once('@') {
        Some((chord_text, duration_text)) => {
            let chord_text = chord_text.trim();
            if chord_text.is_empty() {
                return Err(GrammarError::EmptyToken(format!(
                    "Missing chord before '@' in token: '{}'",
                    token
                )));
            }
            Ok(TimedChord::new(
                parse_chord(chord_text)?,
                parse_duration_str(duration_text)?,
            ))
        }
        None => Ok(TimedChord::unit(parse_chord(text)?)),
    }
}

/// Canonical tokens for a sequence.
pub fn timed_chord_tokens(chords: &[TimedChord]) -> Vec<String> {
    chords.iter().map(TimedChord::to_token).collect()
}

/// Parse a list of token strings.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<TimedChord>, GrammarError> {
    tokens
        .iter()
        .map(|token| parse_timed_chord_token(token.as_ref()))
        .collect()
}

/// Parse one element of the JSON array form.
pub fn parse_json_progression_item(item: &Value) -> Result<TimedChord, GrammarError> {
    let object = match item {
        Value::String(token) => return parse_timed_chord_token(token),
        Value::Object(object) => object,
        _ => {
            return Err(GrammarError::ProgressionFormat(
                "JSON progression elements must be strings or objects.".to_string(),
            ))
        }
    };

    let chord_text = object.get("chord").and_then(Value::as_str).ok_or_else(|| {
        GrammarError::ProgressionFormat(
            "JSON object entries must include string key \"chord\".".to_string(),
        )
    })?;

    let duration = match object.get("duration").or_else(|| object.get("dur")) {
        Some(value) => parse_duration(value)?,
        None if chord_text.contains('@') => return parse_timed_chord_token(chord_text),
        None => Duration::one(),
    };
    Ok(TimedChord::new(parse_chord(chord_text)?, duration))
}

/// Parse a progression written as comma separated tokens or as a JSON array.
pub fn parse_progression_arg(raw: &str) -> Result<Vec<TimedChord>, GrammarError> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        let parsed: Value = serde_json::from_str(raw)
            .map_err(|e| GrammarError::ProgressionFormat(e.to_string()))?;
        let items = parsed.as_array().ok_or_else(|| {
            GrammarError::ProgressionFormat("JSON progression must be an array.".to_string())
        })?;
        return items.iter().map(parse_json_progression_item).collect();
    }
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_timed_chord_token)
        .collect()
}
