//! # Progression Text
//!
//! Dispatch between token notation and grid notation.
//!
//! `auto` picks grid notation when the text looks like `| ... / ... |` and
//! token notation otherwise; the resolved notation is returned alongside the
//! parsed chords so callers can answer in the same notation.

use crate::error::GrammarError;
use crate::grid::{looks_like_grid_notation, parse_grid_notation, GridOptions};
use crate::token::{parse_progression_arg, TimedChord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Notation requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotationMode {
    #[default]
    Auto,
    Duration,
    Grid,
}

/// Notation a progression was actually parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    Duration,
    Grid,
}

impl FromStr for NotationMode {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(NotationMode::Auto),
            "duration" => Ok(NotationMode::Duration),
            "grid" => Ok(NotationMode::Grid),
            _ => Err(GrammarError::InvalidArgument(
                "notation mode must be \"auto\", \"duration\", or \"grid\".".to_string(),
            )),
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::Duration => f.write_str("duration"),
            Notation::Grid => f.write_str("grid"),
        }
    }
}

/// Parse with default grid settings.
pub fn parse_progression_text(
    raw: &str,
    mode: NotationMode,
) -> Result<(Vec<TimedChord>, Notation), GrammarError> {
    parse_progression_text_with(raw, mode, &GridOptions::default())
}

pub fn parse_progression_text_with(
    raw: &str,
    mode: NotationMode,
    grid: &GridOptions,
) -> Result<(Vec<TimedChord>, Notation), GrammarError> {
    let notation = match mode {
        NotationMode::Grid => Notation::Grid,
        NotationMode::Duration => Notation::Duration,
        NotationMode::Auto if looks_like_grid_notation(raw) => Notation::Grid,
        NotationMode::Auto => Notation::Duration,
    };
    let progression = match notation {
        Notation::Grid => parse_grid_notation(raw, grid)?,
        Notation::Duration => parse_progression_arg(raw)?,
    };
    Ok((progression, notation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::timed_chord_tokens;

    #[test]
    fn test_parse_progression_text_auto_detects_grid() {
        let (progression, mode) =
            parse_progression_text("| I / I,ii / ii / ii |", NotationMode::Auto).unwrap();
        assert_eq!(mode, Notation::Grid);
        assert_eq!(timed_chord_tokens(&progression), vec!["I@3/2", "IIm@5/2"]);
    }

    #[test]
    fn test_auto_falls_back_to_tokens() {
        let (progression, mode) =
            parse_progression_text("I@3/2, ii@5/2", NotationMode::Auto).unwrap();
        assert_eq!(mode, Notation::Duration);
        assert_eq!(timed_chord_tokens(&progression), vec!["I@3/2", "IIm@5/2"]);
    }

    #[test]
    fn test_forced_modes() {
        assert!(matches!(
            parse_progression_text("I@4", NotationMode::Grid),
            Err(GrammarError::GridFormat(_))
        ));
        assert!(parse_progression_text("| I / I / I / I |", NotationMode::Duration).is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(" GRID ".parse::<NotationMode>().unwrap(), NotationMode::Grid);
        assert_eq!("auto".parse::<NotationMode>().unwrap(), NotationMode::Auto);
        assert!(matches!(
            "bars".parse::<NotationMode>(),
            Err(GrammarError::InvalidArgument(_))
        ));
    }
}
