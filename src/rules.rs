//! # Rewrite Rules
//!
//! Seven context-sensitive rules, each replacing a short span of chords with a
//! harmonically motivated span of the same total duration.
//!
//! | Rule | Matches                | Rewrites to                         |
//! |------|------------------------|-------------------------------------|
//! | 1    | `x(m)(7)`              | `x(m) x(m)(7)`, duration halved      |
//! | 2    | `x(m)(7)`              | `x(m)(7) Sd(x)`, duration halved     |
//! | 3a   | `w x7`                 | `D(x)7 x7` and `D(x)m7 x7`           |
//! | 3b   | `w xm7`                | `D(x)7 xm7`                          |
//! | 4    | `D(x)7 x(m)(7)`        | `bSt(x)(m)7 x(m)(7)`                 |
//! | 5    | `x x x` (plain major)  | `x St(x)m M(x)m`                     |
//! | 6    | `x(m) x(m) y`          | `x(m) #x°7 y`                        |
//!
//! `w` is any plain chord (no seventh); rule 6 requires `y` to be the minor
//! supertonic, the leading tone, or the dominant of `x`, and never a
//! diminished seventh.
//!
//! Split rules divide the matched chord's duration exactly in half;
//! substitution rules keep each slot's duration.
//!
//! ## Entry Point
//! `find_next_steps(progression: &[TimedChord]) -> Vec<RuleApplication>`

use crate::chord::Chord;
use crate::token::{timed_chord_tokens, TimedChord};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Identifier of one of the seven rewrite rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    Split,
    SplitSubdominant,
    DominantOfSeventh,
    DominantOfMinorSeventh,
    TritoneSubstitution,
    DiatonicAscent,
    DiminishedPassing,
}

impl RuleId {
    /// All rules in application order.
    pub const ALL: [RuleId; 7] = [
        RuleId::Split,
        RuleId::SplitSubdominant,
        RuleId::DominantOfSeventh,
        RuleId::DominantOfMinorSeventh,
        RuleId::TritoneSubstitution,
        RuleId::DiatonicAscent,
        RuleId::DiminishedPassing,
    ];

    /// Short identifier used in output: `"1"`, `"2"`, `"3a"`, `"3b"`, `"4"`, `"5"`, `"6"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Split => "1",
            RuleId::SplitSubdominant => "2",
            RuleId::DominantOfSeventh => "3a",
            RuleId::DominantOfMinorSeventh => "3b",
            RuleId::TritoneSubstitution => "4",
            RuleId::DiatonicAscent => "5",
            RuleId::DiminishedPassing => "6",
        }
    }

    /// Every application of this rule to `seq`, left to right.
    pub fn apply(&self, seq: &[TimedChord]) -> Vec<RuleApplication> {
        let mut out = Vec::new();
        match self {
            RuleId::Split => rule_split(seq, &mut out),
            RuleId::SplitSubdominant => rule_split_subdominant(seq, &mut out),
            RuleId::DominantOfSeventh => rule_dominant_of_seventh(seq, &mut out),
            RuleId::DominantOfMinorSeventh => rule_dominant_of_minor_seventh(seq, &mut out),
            RuleId::TritoneSubstitution => rule_tritone_substitution(seq, &mut out),
            RuleId::DiatonicAscent => rule_diatonic_ascent(seq, &mut out),
            RuleId::DiminishedPassing => rule_diminished_passing(seq, &mut out),
        }
        out
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One concrete rewrite of `seq[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleApplication {
    pub rule: RuleId,
    pub start: usize,
    pub end: usize,
    pub before: Vec<String>,
    pub replacement: Vec<String>,
    pub result: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assumption: Option<String>,
}

impl RuleApplication {
    fn new(
        rule: RuleId,
        seq: &[TimedChord],
        start: usize,
        end: usize,
        replacement: &[TimedChord],
    ) -> Self {
        let mut result: Vec<TimedChord> = Vec::with_capacity(seq.len() + replacement.len());
        result.extend_from_slice(&seq[..start]);
        result.extend_from_slice(replacement);
        result.extend_from_slice(&seq[end..]);
        Self {
            rule,
            start,
            end,
            before: timed_chord_tokens(&seq[start..end]),
            replacement: timed_chord_tokens(replacement),
            result: timed_chord_tokens(&result),
            assumption: None,
        }
    }

    /// Half-open span the replacement occupies in `result`.
    pub fn replacement_span_in_result(&self) -> (usize, usize) {
        (self.start, self.start + self.replacement.len())
    }

    /// `result` joined with `" / "`, with the replaced span wrapped in brackets.
    pub fn result_with_span_marked(&self) -> String {
        let mut tokens = self.result.clone();
        let (start, end) = self.replacement_span_in_result();
        if start < end && end <= tokens.len() {
            tokens[start].insert(0, '[');
            tokens[end - 1].push(']');
        }
        tokens.join(" / ")
    }
}

// Rule 1: x(m)(7) -> x(m) x(m)(7)
fn rule_split(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, timed) in seq.iter().enumerate() {
        let chord = timed.chord;
        if chord.is_diminished7() {
            continue;
        }
        let half = timed.duration.half();
        let replacement = [
            TimedChord::new(chord.without_seventh(), half.clone()),
            TimedChord::new(chord, half),
        ];
        out.push(RuleApplication::new(RuleId::Split, seq, i, i + 1, &replacement));
    }
}

// Rule 2: x(m)(7) -> x(m)(7) Sd(x)
fn rule_split_subdominant(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, timed) in seq.iter().enumerate() {
        let chord = timed.chord;
        if chord.is_diminished7() {
            continue;
        }
        let half = timed.duration.half();
        let replacement = [
            TimedChord::new(chord, half.clone()),
            TimedChord::new(Chord::major(chord.root().subdominant()), half),
        ];
        out.push(RuleApplication::new(
            RuleId::SplitSubdominant,
            seq,
            i,
            i + 1,
            &replacement,
        ));
    }
}

// Rule 3a: w x7 -> D(x)(m)7 x7
fn rule_dominant_of_seventh(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, pair) in seq.windows(2).enumerate() {
        let (w, x7) = (&pair[0], &pair[1]);
        if !w.chord.is_plain() || !x7.chord.is_major_dom7() {
            continue;
        }
        let dominant = x7.chord.root().dominant();
        for candidate in [Chord::dominant_seventh(dominant), Chord::minor_seventh(dominant)] {
            let replacement = [TimedChord::new(candidate, w.duration.clone()), x7.clone()];
            out.push(RuleApplication::new(
                RuleId::DominantOfSeventh,
                seq,
                i,
                i + 2,
                &replacement,
            ));
        }
    }
}

// Rule 3b: w xm7 -> D(x)7 xm7
fn rule_dominant_of_minor_seventh(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, pair) in seq.windows(2).enumerate() {
        let (w, xm7) = (&pair[0], &pair[1]);
        if !w.chord.is_plain() || !xm7.chord.is_minor_dom7() {
            continue;
        }
        let replacement = [
            TimedChord::new(
                Chord::dominant_seventh(xm7.chord.root().dominant()),
                w.duration.clone(),
            ),
            xm7.clone(),
        ];
        out.push(RuleApplication::new(
            RuleId::DominantOfMinorSeventh,
            seq,
            i,
            i + 2,
            &replacement,
        ));
    }
}

// Rule 4: D(x)7 x(m)(7) -> bSt(x)(m)7 x(m)(7)
fn rule_tritone_substitution(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, pair) in seq.windows(2).enumerate() {
        let (dx7, x) = (&pair[0], &pair[1]);
        if !dx7.chord.is_major_dom7() || x.chord.is_diminished7() {
            continue;
        }
        let target = x.chord.root();
        if dx7.chord.root() != target.dominant() {
            continue;
        }
        let substitute = Chord::with_flags(target.flat_supertonic(), x.chord.is_minor(), true);
        let replacement = [TimedChord::new(substitute, dx7.duration.clone()), x.clone()];
        out.push(RuleApplication::new(
            RuleId::TritoneSubstitution,
            seq,
            i,
            i + 2,
            &replacement,
        ));
    }
}

// Rule 5: x x x -> x St(x)m M(x)m, plain major x only
fn rule_diatonic_ascent(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, triple) in seq.windows(3).enumerate() {
        let x = triple[0].chord;
        if triple[1].chord != x || triple[2].chord != x || !x.is_plain_major() {
            continue;
        }
        let replacement = [
            triple[0].clone(),
            TimedChord::new(Chord::minor(x.root().supertonic()), triple[1].duration.clone()),
            TimedChord::new(Chord::minor(x.root().mediant()), triple[2].duration.clone()),
        ];
        out.push(RuleApplication::new(
            RuleId::DiatonicAscent,
            seq,
            i,
            i + 3,
            &replacement,
        ));
    }
}

/// Whether `y` may follow a passing `#x°7`: minor supertonic, leading tone or
/// dominant of `x`, and not itself a diminished seventh.
fn is_passing_target(x: &Chord, y: &Chord) -> bool {
    if y.is_diminished7() {
        return false;
    }
    let root = x.root();
    let y_root = y.root();
    (y_root == root.supertonic() && y.is_minor())
        || y_root == root.leading_tone()
        || y_root == root.dominant()
}

// Rule 6: x(m) x(m) y -> x(m) #x°7 y
fn rule_diminished_passing(seq: &[TimedChord], out: &mut Vec<RuleApplication>) {
    for (i, triple) in seq.windows(3).enumerate() {
        let x = triple[0].chord;
        if triple[1].chord != x || !x.is_plain() || !is_passing_target(&x, &triple[2].chord) {
            continue;
        }
        let replacement = [
            triple[0].clone(),
            TimedChord::new(
                Chord::diminished_seventh(x.root().sharpened()),
                triple[1].duration.clone(),
            ),
            triple[2].clone(),
        ];
        out.push(RuleApplication::new(
            RuleId::DiminishedPassing,
            seq,
            i,
            i + 3,
            &replacement,
        ));
    }
}

/// All one-step rewrites of `progression`, rules in order 1, 2, 3a, 3b, 4, 5, 6.
///
/// Applications with the same rule, span and result are reported once.
pub fn find_next_steps(progression: &[TimedChord]) -> Vec<RuleApplication> {
    let mut seen: HashSet<(RuleId, usize, usize, Vec<String>)> = HashSet::new();
    let mut out = Vec::new();
    for rule in RuleId::ALL {
        for app in rule.apply(progression) {
            if seen.insert((app.rule, app.start, app.end, app.result.clone())) {
                out.push(app);
            }
        }
    }
    out
}
