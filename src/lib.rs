//! # Steedman
//!
//! Harmonic elaboration of jazz chord progressions with a Steedman-style
//! rewrite grammar.
//!
//! ## Pipeline
//! 1. Parse text in token notation (`I@4,V7@4`) or grid notation
//!    (`| I / I / V7 / V7 |`) into [`TimedChord`]s
//! 2. Apply the rewrite rules once ([`find_next_steps`]) or repeatedly
//!    ([`explore_by_depth`])
//! 3. Format results back as tokens or grid notation
//!
//! ## Example
//! ```rust
//! use steedman::{find_next_steps, parse_progression_text, NotationMode};
//!
//! let (progression, _) = parse_progression_text("I@3, V7@1", NotationMode::Auto)?;
//! let steps = find_next_steps(&progression);
//! assert!(steps.iter().any(|app| app.replacement == ["II7@3", "V7"]));
//! # Ok::<(), steedman::GrammarError>(())
//! ```

pub mod chord;
pub mod config;
pub mod duration;
pub mod error;
pub mod grid;
pub mod pitch;
pub mod progression;
pub mod rules;
pub mod search;
pub mod token;

pub use chord::{parse_chord, Chord};
pub use config::GrammarConfig;
pub use duration::{parse_duration, parse_duration_str, Duration};
pub use error::*;
pub use grid::{grid_notation_of, looks_like_grid_notation, parse_grid_notation, GridOptions};
pub use pitch::Root;
pub use progression::{parse_progression_text, parse_progression_text_with, Notation, NotationMode};
pub use rules::{find_next_steps, RuleApplication, RuleId};
pub use search::{explore_by_depth, find_next_steps_from_tokens, DepthLevels, ExplorationReport};
pub use token::{
    format_token, parse_progression_arg, parse_timed_chord_token, parse_tokens,
    timed_chord_tokens, TimedChord,
};
