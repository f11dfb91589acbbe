//! # Error Types
//!
//! This module defines all error types for the grammar engine.
//!
//! Every parse, format and search entry point either succeeds completely or
//! fails with one of these variants before producing output. Nothing here is
//! retryable; callers (the CLI, an HTTP layer) decide how to present them.
//!
//! ## Error Types
//! - `InvalidRoot` - Roman numeral outside I..VII or a malformed accidental run
//! - `InvalidChord` - quality flags that break the diminished-seventh rule
//! - `InvalidDuration` - empty, non-numeric or non-positive duration
//! - `EmptyToken` - blank chord text where a chord was required
//! - `GridFormat` - bar/beat syntax violations in grid notation
//! - `SubdivisionOverflow` - a grid needs more subdivisions per beat than allowed
//! - `DurationAlignment` - a duration that does not land on a whole slot count
//! - `InvalidArgument` - negative search depth, zero beats per bar, unknown mode
//! - `ProgressionFormat` - malformed JSON array progression
//! - `Config` - unreadable or invalid YAML configuration
//!
//! ## Usage
//! ```rust
//! use steedman::{parse_timed_chord_token, GrammarError};
//!
//! match parse_timed_chord_token("VIII@2") {
//!     Err(GrammarError::InvalidRoot(text)) => assert_eq!(text, "VIII"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Roman numeral root that is not one of I..VII.
    ///
    /// # Example
    /// ```
    /// # use steedman::GrammarError;
    /// let err = GrammarError::InvalidRoot("VIII".to_string());
    /// assert_eq!(err.to_string(), "Invalid Roman numeral root: 'VIII'");
    /// ```
    #[error("Invalid Roman numeral root: '{0}'")]
    InvalidRoot(String),

    /// Diminished seventh combined with the minor or seventh flag.
    #[error("Invalid chord: {0}")]
    InvalidChord(String),

    /// Duration literal that is empty, non-numeric or not strictly positive.
    ///
    /// # Example
    /// ```
    /// # use steedman::GrammarError;
    /// let err = GrammarError::InvalidDuration("Duration must be positive.".to_string());
    /// assert_eq!(err.to_string(), "Invalid duration: Duration must be positive.");
    /// ```
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Empty chord token: {0}")]
    EmptyToken(String),

    /// Structural error in grid notation.
    #[error("Grid format error: {0}")]
    GridFormat(String),

    /// The least common multiple of beat subdivisions exceeds the configured maximum.
    ///
    /// `required` is kept as text: when rendering, it comes from the
    /// denominators of arbitrary-precision durations.
    ///
    /// # Example
    /// ```
    /// # use steedman::GrammarError;
    /// let err = GrammarError::SubdivisionOverflow {
    ///     required: "6".to_string(),
    ///     max: 4,
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Grid requires 6 subdivisions/beat, exceeding the max 4."
    /// );
    /// ```
    #[error("Grid requires {required} subdivisions/beat, exceeding the max {max}.")]
    SubdivisionOverflow { required: String, max: usize },

    #[error("Duration {duration} cannot align with subdivision {subdivisions}.")]
    DurationAlignment { duration: String, subdivisions: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid progression: {0}")]
    ProgressionFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
