//! # Depth Search
//!
//! Breadth-first enumeration of every progression reachable from a start
//! progression by repeated rule applications.
//!
//! Progressions are identified by their canonical token lists. Level 0 is the
//! start; level k+1 holds the results of one rule application to any member of
//! level k that have not appeared at any earlier level. Each level is sorted.
//!
//! The branching factor grows quickly with the number of chords, so callers
//! should keep `depth` small.

use crate::error::GrammarError;
use crate::rules::{find_next_steps, RuleApplication};
use crate::token::{parse_tokens, timed_chord_tokens, TimedChord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

pub const DEFAULT_SEARCH_DEPTH: i64 = 1;

/// Sequences per level, keyed by level number `0..=depth`.
pub type DepthLevels = BTreeMap<usize, Vec<Vec<String>>>;

/// All one-step rewrites of a progression written as tokens.
pub fn find_next_steps_from_tokens<S: AsRef<str>>(
    tokens: &[S],
) -> Result<Vec<RuleApplication>, GrammarError> {
    Ok(find_next_steps(&parse_tokens(tokens)?))
}

/// Explore progressions reachable within `depth` rule applications.
pub fn explore_by_depth(
    progression: &[TimedChord],
    depth: i64,
) -> Result<DepthLevels, GrammarError> {
    if depth < 0 {
        return Err(GrammarError::InvalidArgument(
            "Depth must be non-negative.".to_string(),
        ));
    }

    let start = timed_chord_tokens(progression);
    let mut levels = DepthLevels::new();
    levels.insert(0, vec![start.clone()]);
    let mut seen: HashSet<Vec<String>> = HashSet::from([start.clone()]);
    let mut frontier: BTreeSet<Vec<String>> = BTreeSet::from([start]);

    for level in 1..=depth as usize {
        let mut next: BTreeSet<Vec<String>> = BTreeSet::new();
        for tokens in &frontier {
            for app in find_next_steps(&parse_tokens(tokens)?) {
                if !seen.contains(&app.result) {
                    next.insert(app.result);
                }
            }
        }
        debug!(depth = level, count = next.len(), "explored depth level");
        seen.extend(next.iter().cloned());
        levels.insert(level, next.iter().cloned().collect());
        frontier = next;
    }
    Ok(levels)
}

/// Serializable form of a depth search, one entry per level.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    pub depth: usize,
    pub levels: Vec<LevelReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub level: usize,
    pub count: usize,
    pub sequences: Vec<Vec<String>>,
}

impl ExplorationReport {
    pub fn new(depth: usize, levels: DepthLevels) -> Self {
        Self {
            depth,
            levels: levels
                .into_iter()
                .map(|(level, sequences)| LevelReport {
                    level,
                    count: sequences.len(),
                    sequences,
                })
                .collect(),
        }
    }
}
