//! Integration tests for the rewrite grammar
//!
//! Drives the public API end to end: text in, rewrites and searches out.

use pretty_assertions::assert_eq;
use std::collections::HashSet;
use steedman::{
    explore_by_depth, find_next_steps, grid_notation_of, parse_grid_notation,
    parse_progression_text, parse_timed_chord_token, parse_tokens, timed_chord_tokens, Duration,
    GridOptions, Notation, NotationMode, RuleId,
};

fn total(tokens: &[String]) -> Duration {
    let timed = parse_tokens(tokens).unwrap();
    Duration::total(timed.iter().map(|t| &t.duration)).unwrap()
}

#[test]
fn test_token_round_trip() {
    let chord = parse_timed_chord_token("bIIm7@3/2").unwrap();
    assert_eq!(chord.to_token(), "bIIm7@3/2");
}

#[test]
fn test_every_rewrite_conserves_duration() {
    let (progression, _) = parse_progression_text(
        "I@4, VIm@2, IIm7@1, V7@1, I@2, I@2, I@2, V7@2",
        NotationMode::Duration,
    )
    .unwrap();
    let applications = find_next_steps(&progression);
    let rules: HashSet<RuleId> = applications.iter().map(|app| app.rule).collect();
    assert_eq!(rules.len(), RuleId::ALL.len(), "every rule should fire: {:?}", rules);

    let original = total(&timed_chord_tokens(&progression));
    for app in &applications {
        assert_eq!(total(&app.replacement), total(&app.before), "{:?}", app);
        assert_eq!(total(&app.result), original, "{:?}", app);
    }
}

#[test]
fn test_next_steps_have_unique_keys() {
    let progression = parse_tokens(&["I@2", "I@2", "I@2", "V7@2", "I@4"]).unwrap();
    let mut keys = HashSet::new();
    for app in find_next_steps(&progression) {
        assert!(keys.insert((app.rule, app.start, app.end, app.result)));
    }
}

#[test]
fn test_exploration_novelty_across_levels() {
    let progression = parse_tokens(&["I@2", "V7@2"]).unwrap();
    let levels = explore_by_depth(&progression, 3).unwrap();
    assert_eq!(levels.len(), 4);
    let mut seen = HashSet::new();
    for sequences in levels.values() {
        for sequence in sequences {
            assert!(seen.insert(sequence.clone()));
        }
    }
}

#[test]
fn test_exploration_from_single_chord() {
    let progression = parse_tokens(&["I@2"]).unwrap();
    let levels = explore_by_depth(&progression, 2).unwrap();
    assert_eq!(levels[&0], vec![vec!["I@2".to_string()]]);
    let level1: HashSet<Vec<String>> = levels[&1].iter().cloned().collect();
    let expected: HashSet<Vec<String>> = [vec!["I", "I"], vec!["I", "IV"]]
        .iter()
        .map(|seq| seq.iter().map(|t| t.to_string()).collect())
        .collect();
    assert_eq!(level1, expected);
    assert!(!levels[&2].is_empty());
}

#[test]
fn test_grid_to_rewrites_to_grid() {
    let (progression, notation) =
        parse_progression_text("| I / I,ii / ii / ii |", NotationMode::Auto).unwrap();
    assert_eq!(notation, Notation::Grid);
    assert_eq!(timed_chord_tokens(&progression), vec!["I@3/2", "IIm@5/2"]);

    let options = GridOptions::default();
    assert_eq!(
        grid_notation_of(&progression, &options).unwrap(),
        "| I / I,IIm / IIm / IIm |"
    );

    // Results that stay within the subdivision limit render and parse back.
    for app in find_next_steps(&progression) {
        let result = parse_tokens(&app.result).unwrap();
        if let Ok(grid) = grid_notation_of(&result, &options) {
            let reparsed = parse_grid_notation(&grid, &options).unwrap();
            let total_in = Duration::total(result.iter().map(|t| &t.duration)).unwrap();
            let total_out = Duration::total(reparsed.iter().map(|t| &t.duration)).unwrap();
            assert_eq!(total_out, total_in, "{}", grid);
        }
    }
}

#[test]
fn test_grid_round_trip_merges_adjacent_chords() {
    let options = GridOptions::default();
    let progression = parse_tokens(&["I@2", "I@2", "IV@2", "V7@1/2", "V7@3/2"]).unwrap();
    let grid = grid_notation_of(&progression, &options).unwrap();
    assert_eq!(grid, "| I / I / I / I |\n| IV / IV / V7 / V7 |");
    let reparsed = parse_grid_notation(&grid, &options).unwrap();
    assert_eq!(timed_chord_tokens(&reparsed), vec!["I@4", "IV@2", "V7@2"]);
}
