//! # Grid Notation
//!
//! Bar/beat text where position implies duration:
//!
//! ```text
//! | I / I,ii / ii / ii |
//! | V7 / V7 / I / I |
//! ```
//!
//! ## Rules
//! - Every bar is `| beat / beat / ... |` with exactly `beats_per_bar` beats.
//! - A beat holding `a,b` splits that beat evenly between its chords.
//! - Chords carry no `@duration` here; each bar is a separate `|...|` group,
//!   so consecutive bars are separated by whitespace or newlines.
//! - The least common multiple of all per-beat subdivision counts must not
//!   exceed `max_subdivisions`.
//!
//! ## Parsing
//! Each beat is expanded into equal slots and adjacent equal chords are merged,
//! so `| I / I,ii / ii / ii |` becomes `I@3/2, IIm@5/2`.
//!
//! ## Rendering
//! Durations are turned into slot counts at the common subdivision, the slot
//! list is optionally padded with the last chord up to a whole bar, and each
//! beat is written as its run of chords. A beat whose runs all have the same
//! length is written compactly (`I,IIm` for `I I IIm IIm`); otherwise each slot
//! is written out so the text parses back to the same durations.

use crate::chord::{parse_chord, Chord};
use crate::duration::{common_subdivision, Duration};
use crate::error::GrammarError;
use crate::token::TimedChord;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;

pub const DEFAULT_BEATS_PER_BAR: usize = 4;
pub const MAX_GRID_SUBDIVISIONS: usize = 4;
/// Upper bound on the slots a rendered grid may hold.
pub const MAX_GRID_SLOTS: usize = 1 << 16;

/// Layout settings shared by grid parsing and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub beats_per_bar: usize,
    pub max_subdivisions: usize,
    /// Repeat the final chord until the last bar is full.
    pub pad_with_last_chord: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            beats_per_bar: DEFAULT_BEATS_PER_BAR,
            max_subdivisions: MAX_GRID_SUBDIVISIONS,
            pad_with_last_chord: true,
        }
    }
}

impl GridOptions {
    fn check_beats_per_bar(&self) -> Result<(), GrammarError> {
        if self.beats_per_bar == 0 {
            return Err(GrammarError::InvalidArgument(
                "beats_per_bar must be positive.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cheap check used by automatic notation detection: the text has a `/` and at
/// least one complete `|...|` group.
pub fn looks_like_grid_notation(raw: &str) -> bool {
    let text = raw.trim();
    !text.is_empty() && text.contains('/') && text.matches('|').count() >= 2
}

/// Split grid text into bar bodies, rejecting anything outside `|...|`.
fn split_bars(text: &str) -> Result<Vec<&str>, GrammarError> {
    let outside = || GrammarError::GridFormat("Unexpected text outside bar delimiters '|'.".to_string());
    let mut bars = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        let body = rest.strip_prefix('|').ok_or_else(outside)?;
        let close = body.find('|').ok_or_else(outside)?;
        bars.push(&body[..close]);
        rest = body[close + 1..].trim_start();
    }
    Ok(bars)
}

/// Parse grid notation into a run-length merged chord sequence.
pub fn parse_grid_notation(
    raw: &str,
    options: &GridOptions,
) -> Result<Vec<TimedChord>, GrammarError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GrammarError::GridFormat("Grid notation is empty.".to_string()));
    }
    options.check_beats_per_bar()?;

    let mut slots: Vec<(Chord, Duration)> = Vec::new();
    let mut required = BigInt::from(1);

    for (bar_index, bar) in split_bars(text)?.into_iter().enumerate() {
        let bar_number = bar_index + 1;
        let beats: Vec<&str> = bar.trim().split('/').map(str::trim).collect();
        if beats.len() != options.beats_per_bar {
            return Err(GrammarError::GridFormat(format!(
                "Bar {} must contain exactly {} beats separated by '/'.",
                bar_number, options.beats_per_bar
            )));
        }

        for (beat_index, beat) in beats.into_iter().enumerate() {
            let beat_number = beat_index + 1;
            if beat.is_empty() {
                return Err(GrammarError::GridFormat(format!(
                    "Bar {}, beat {} cannot be empty.",
                    bar_number, beat_number
                )));
            }
            let parts: Vec<&str> = beat.split(',').map(str::trim).collect();
            if parts.iter().any(|part| part.is_empty()) {
                return Err(GrammarError::GridFormat(format!(
                    "Bar {}, beat {} has an empty subdivision.",
                    bar_number, beat_number
                )));
            }
            required = required.lcm(&BigInt::from(parts.len()));
            let slot_duration = Duration::from_ratio(1, parts.len() as i64)?;
            for part in parts {
                slots.push((parse_chord(part)?, slot_duration.clone()));
            }
        }
    }

    if slots.is_empty() {
        return Err(GrammarError::GridFormat(
            "Grid notation does not contain any chords.".to_string(),
        ));
    }
    if required > BigInt::from(options.max_subdivisions) {
        return Err(GrammarError::SubdivisionOverflow {
            required: required.to_string(),
            max: options.max_subdivisions,
        });
    }

    Ok(merge_runs(slots))
}

/// Merge adjacent slots holding the same chord, summing their durations.
fn merge_runs(slots: Vec<(Chord, Duration)>) -> Vec<TimedChord> {
    let mut out: Vec<TimedChord> = Vec::new();
    for (chord, duration) in slots {
        if let Some(last) = out.last_mut() {
            if last.chord == chord {
                last.duration = &last.duration + &duration;
                continue;
            }
        }
        out.push(TimedChord::new(chord, duration));
    }
    out
}

/// Render a sequence as grid notation, one bar per line.
///
/// Returns an empty string for an empty sequence.
pub fn grid_notation_of(
    progression: &[TimedChord],
    options: &GridOptions,
) -> Result<String, GrammarError> {
    if progression.is_empty() {
        return Ok(String::new());
    }
    options.check_beats_per_bar()?;

    let required = common_subdivision(progression.iter().map(|timed| &timed.duration));
    if required > BigInt::from(options.max_subdivisions) {
        return Err(GrammarError::SubdivisionOverflow {
            required: required.to_string(),
            max: options.max_subdivisions,
        });
    }
    // Bounded by max_subdivisions just above.
    let required = required.to_usize().unwrap_or(options.max_subdivisions);

    let mut runs: Vec<(String, usize)> = Vec::with_capacity(progression.len());
    let mut total: usize = 0;
    for timed in progression {
        let count = timed
            .duration
            .slot_count(required)
            .and_then(|count| count.to_usize())
            .ok_or_else(|| GrammarError::DurationAlignment {
                duration: timed.duration.to_string(),
                subdivisions: required,
            })?;
        total = total
            .checked_add(count)
            .filter(|total| *total <= MAX_GRID_SLOTS)
            .ok_or_else(|| {
                GrammarError::InvalidArgument(format!(
                    "Progression is too long to render as a grid (more than {} slots).",
                    MAX_GRID_SLOTS
                ))
            })?;
        runs.push((timed.chord.to_string(), count));
    }

    let mut slots: Vec<String> = Vec::with_capacity(total);
    for (token, count) in runs {
        slots.extend(std::iter::repeat(token).take(count));
    }

    let slots_per_bar = options.beats_per_bar * required;
    let remainder = slots.len() % slots_per_bar;
    if remainder != 0 {
        if !options.pad_with_last_chord {
            return Err(GrammarError::GridFormat(
                "Progression does not fill complete bars; enable padding to render.".to_string(),
            ));
        }
        if let Some(last) = slots.last().cloned() {
            slots.extend(std::iter::repeat(last).take(slots_per_bar - remainder));
        }
    }

    let bars: Vec<String> = slots
        .chunks(slots_per_bar)
        .map(|bar| {
            let beats: Vec<String> = bar.chunks(required).map(render_beat).collect();
            format!("| {} |", beats.join(" / "))
        })
        .collect();
    Ok(bars.join("\n"))
}

/// Write one beat's slots, collapsing runs when they share a common length.
fn render_beat(slots: &[String]) -> String {
    let mut runs: Vec<(&str, usize)> = Vec::new();
    for slot in slots {
        if let Some((token, len)) = runs.last_mut() {
            if *token == slot.as_str() {
                *len += 1;
                continue;
            }
        }
        runs.push((slot.as_str(), 1));
    }
    let step = runs.iter().fold(0usize, |acc, (_, len)| acc.gcd(len));
    let mut parts: Vec<&str> = Vec::new();
    for (token, len) in runs {
        parts.extend(std::iter::repeat(token).take(len / step));
    }
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{parse_tokens, timed_chord_tokens};
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> Result<Vec<String>, GrammarError> {
        parse_grid_notation(raw, &GridOptions::default()).map(|seq| timed_chord_tokens(&seq))
    }

    fn render(tokens: &[&str]) -> Result<String, GrammarError> {
        grid_notation_of(&parse_tokens(tokens).unwrap(), &GridOptions::default())
    }

    #[test]
    fn test_parse_grid_notation_to_timed_chords() {
        assert_eq!(
            parse("| I / I,ii / ii / ii |").unwrap(),
            vec!["I@3/2", "IIm@5/2"]
        );
    }

    #[test]
    fn test_parse_multiple_bars() {
        let raw = "| I / I / IV / IV |\n| V7 / V7 / I / I |";
        assert_eq!(parse(raw).unwrap(), vec!["I@2", "IV@2", "V7@2", "I@2"]);
        assert_eq!(
            parse("| I / I / I / I | | I / I / V7 / V7 |").unwrap(),
            vec!["I@6", "V7@2"]
        );
    }

    #[test]
    fn test_render_timed_chords_to_grid_notation() {
        assert_eq!(render(&["I@3/2", "IIm@5/2"]).unwrap(), "| I / I,IIm / IIm / IIm |");
        assert_eq!(render(&["I@3/2", "IIm@1/2"]).unwrap(), "| I / I,IIm / IIm / IIm |");
    }

    #[test]
    fn test_render_multiple_bars() {
        assert_eq!(
            render(&["I@4", "IV@2", "V7@2"]).unwrap(),
            "| I / I / I / I |\n| IV / IV / V7 / V7 |"
        );
    }

    #[test]
    fn test_render_uneven_beat_keeps_slots() {
        let rendered = render(&["I@1/4", "IIm@15/4"]).unwrap();
        assert_eq!(rendered, "| I,IIm,IIm,IIm / IIm / IIm / IIm |");
        assert_eq!(parse(&rendered).unwrap(), vec!["I@1/4", "IIm@15/4"]);
    }

    #[test]
    fn test_round_trip() {
        for tokens in [
            vec!["I@3/2", "IIm@5/2"],
            vec!["I@2", "VIm@1/2", "IIm@3/2", "V7@4"],
            vec!["IIm7@3/4", "V7@1/4", "I@3"],
        ] {
            let rendered = render(&tokens).unwrap();
            assert_eq!(parse(&rendered).unwrap(), tokens);
        }
    }

    #[test]
    fn test_structure_errors() {
        let cases = [
            "I / I / I / I",
            "| I / I / I |",
            "| I / / I / I |",
            "| I / I, / I / I |",
            "| I / I / I / I | trailing",
            "| I / I / I / I",
            "",
        ];
        for raw in cases {
            assert!(
                matches!(parse(raw), Err(GrammarError::GridFormat(_))),
                "expected grid error for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_adjacent_bars_need_separate_delimiters() {
        assert!(matches!(
            parse("| I / I / I / I | IV / IV / IV / IV |"),
            Err(GrammarError::GridFormat(_))
        ));
    }

    #[test]
    fn test_subdivision_overflow() {
        assert!(matches!(
            parse("| I,IV,V / I,V / I / I |"),
            Err(GrammarError::SubdivisionOverflow { .. })
        ));
        assert!(matches!(
            render(&["I@1/5", "V@19/5"]),
            Err(GrammarError::SubdivisionOverflow { .. })
        ));
        let wide = GridOptions {
            max_subdivisions: 6,
            ..GridOptions::default()
        };
        assert!(parse_grid_notation("| I,IV,V / I,V / I / I |", &wide).is_ok());
    }

    #[test]
    fn test_subdivision_overflow_with_huge_lcm() {
        let primes: [usize; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];
        let bars: Vec<String> = primes
            .chunks(4)
            .map(|bar| {
                let beats: Vec<String> = bar.iter().map(|&n| vec!["I"; n].join(",")).collect();
                format!("| {} |", beats.join(" / "))
            })
            .collect();
        match parse_grid_notation(&bars.join("\n"), &GridOptions::default()) {
            Err(GrammarError::SubdivisionOverflow { required, max }) => {
                assert_eq!(max, 4);
                assert_eq!(required, "32589158477190044730");
            }
            other => panic!("expected subdivision overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_render_rejects_oversized_progression() {
        assert!(matches!(
            render(&["I@1000000000"]),
            Err(GrammarError::InvalidArgument(_))
        ));
        let long = format!("I@{}", MAX_GRID_SLOTS);
        assert!(render(&[long.as_str()]).is_ok());
    }

    #[test]
    fn test_padding_disabled() {
        let options = GridOptions {
            pad_with_last_chord: false,
            ..GridOptions::default()
        };
        let seq = parse_tokens(&["I@3"]).unwrap();
        assert!(matches!(
            grid_notation_of(&seq, &options),
            Err(GrammarError::GridFormat(_))
        ));
        let full = parse_tokens(&["I@2", "V7@2"]).unwrap();
        assert_eq!(grid_notation_of(&full, &options).unwrap(), "| I / I / V7 / V7 |");
    }

    #[test]
    fn test_three_beat_bars() {
        let options = GridOptions {
            beats_per_bar: 3,
            ..GridOptions::default()
        };
        let seq = parse_grid_notation("| I / I / V7 |", &options).unwrap();
        assert_eq!(timed_chord_tokens(&seq), vec!["I@2", "V7"]);
        assert_eq!(grid_notation_of(&seq, &options).unwrap(), "| I / I / V7 |");
    }

    #[test]
    fn test_zero_beats_per_bar() {
        let options = GridOptions {
            beats_per_bar: 0,
            ..GridOptions::default()
        };
        assert!(matches!(
            parse_grid_notation("| I |", &options),
            Err(GrammarError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_looks_like_grid_notation() {
        assert!(looks_like_grid_notation("| I / I,ii / ii / ii |"));
        assert!(!looks_like_grid_notation("I@3/2,IIm@5/2"));
        assert!(!looks_like_grid_notation("| I@3/2"));
        assert!(!looks_like_grid_notation("   "));
    }

    #[test]
    fn test_empty_render() {
        assert_eq!(grid_notation_of(&[], &GridOptions::default()).unwrap(), "");
    }
}
