//! # Duration Arithmetic
//!
//! Durations are exact, strictly positive rationals in beat units, backed by
//! arbitrary-precision integers so that repeated halving never loses
//! precision.
//!
//! ## Accepted literals
//! - integers: `4`, `+2`
//! - rationals: `3/2`, `-1/2` (rejected later as non-positive)
//! - decimals: `1.5`, `.25`, `2.`, `1e-1`
//!
//! ## Display
//! Whole values print as the integer (`3`), everything else as `n/d` in
//! lowest terms (`3/2`).

use crate::error::GrammarError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde_json::Value;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Duration(BigRational);

impl Duration {
    /// Wrap a rational, rejecting zero and negative values.
    pub fn new(value: BigRational) -> Result<Self, GrammarError> {
        if !value.is_positive() {
            return Err(GrammarError::InvalidDuration(
                "Duration must be positive.".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn from_ratio(numer: i64, denom: i64) -> Result<Self, GrammarError> {
        if denom == 0 {
            return Err(GrammarError::InvalidDuration(
                "Duration denominator cannot be zero.".to_string(),
            ));
        }
        Self::new(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn from_integer(value: i64) -> Result<Self, GrammarError> {
        Self::from_ratio(value, 1)
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn as_ratio(&self) -> &BigRational {
        &self.0
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// Exactly half of this duration.
    pub fn half(&self) -> Self {
        Self(&self.0 / BigRational::from_integer(BigInt::from(2)))
    }

    /// Multiply by a positive factor (beats <-> bars conversion).
    pub fn scaled(&self, factor: &BigRational) -> Result<Self, GrammarError> {
        Self::new(&self.0 * factor)
    }

    /// Number of slots this duration covers when each beat holds
    /// `subdivisions` slots, or `None` when it does not land on a whole slot.
    pub fn slot_count(&self, subdivisions: usize) -> Option<BigInt> {
        let slots = &self.0 * BigRational::from_integer(BigInt::from(subdivisions));
        if slots.is_integer() {
            Some(slots.to_integer())
        } else {
            None
        }
    }

    /// Sum of a run of durations. Returns `None` for an empty run.
    pub fn total<'a, I>(durations: I) -> Option<Duration>
    where
        I: IntoIterator<Item = &'a Duration>,
    {
        durations
            .into_iter()
            .fold(None, |acc: Option<Duration>, d| match acc {
                Some(sum) => Some(&sum + d),
                None => Some(d.clone()),
            })
    }
}

impl Add for &Duration {
    type Output = Duration;

    fn add(self, rhs: &Duration) -> Duration {
        Duration(&self.0 + &rhs.0)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl FromStr for Duration {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration_str(s)
    }
}

/// Least common multiple of the denominators of `durations` (1 when empty).
pub fn common_subdivision<'a, I>(durations: I) -> BigInt
where
    I: IntoIterator<Item = &'a Duration>,
{
    durations
        .into_iter()
        .fold(BigInt::one(), |acc, d| acc.lcm(d.denom()))
}

/// Parse a duration literal: integer, `a/b`, or decimal with optional exponent.
pub fn parse_duration_str(text: &str) -> Result<Duration, GrammarError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GrammarError::InvalidDuration(
            "Duration cannot be empty.".to_string(),
        ));
    }
    let value = parse_rational_literal(trimmed).ok_or_else(|| {
        GrammarError::InvalidDuration(format!("Invalid duration literal: '{}'", trimmed))
    })?;
    Duration::new(value)
}

/// Parse a duration from a JSON value: a number or a string literal.
pub fn parse_duration(value: &Value) -> Result<Duration, GrammarError> {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(int) => Duration::new(BigRational::from_integer(BigInt::from(int))),
            // Floats go through their shortest decimal text, so 0.1 means 1/10.
            None => parse_duration_str(&number.to_string()),
        },
        Value::String(text) => parse_duration_str(text),
        other => Err(GrammarError::InvalidDuration(format!(
            "Unsupported duration type: {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_rational_literal(text: &str) -> Option<BigRational> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_signed_integer(numer.trim())?;
        let denom = parse_digits(denom.trim())?;
        if denom.is_zero() {
            return None;
        }
        return Some(BigRational::new(numer, denom));
    }
    parse_decimal(text)
}

fn parse_digits(text: &str) -> Option<BigInt> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn parse_signed_integer(text: &str) -> Option<BigInt> {
    let (negative, digits) = split_sign(text);
    let value = parse_digits(digits)?;
    Some(if negative { -value } else { value })
}

/// Largest decimal exponent accepted in a duration literal.
const MAX_DECIMAL_EXPONENT: u32 = 4096;

fn parse_decimal(text: &str) -> Option<BigRational> {
    let (negative, unsigned) = split_sign(text);
    let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => {
            let (negative_exp, digits) = split_sign(&unsigned[pos + 1..]);
            let exp = parse_digits(digits)?
                .to_u32()
                .filter(|exp| *exp <= MAX_DECIMAL_EXPONENT)?;
            (&unsigned[..pos], if negative_exp { -(exp as i64) } else { exp as i64 })
        }
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = format!("{}{}", int_part, frac_part);
    let numer = parse_digits(&all_digits)?;
    let scale = exponent - frac_part.len() as i64;
    let ten = BigInt::from(10);
    let power = num_traits::pow(ten, scale.unsigned_abs() as usize);
    let value = if scale >= 0 {
        BigRational::from_integer(numer * power)
    } else {
        BigRational::new(numer, power)
    };
    Some(if negative { -value } else { value })
}
