//! Numeric normalization
//!
//! Coerces loosely-typed input (request bodies, stored values, computed sums)
//! into whole budget units that fit the JSON safe-integer range. Budget units
//! have no fractional part, so floating-point input is truncated toward zero.
//!
//! Rejections are reported to a [`DiagnosticSink`]; the default sink emits a
//! `tracing` warning. Normalization itself never fails or panics.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Largest integer a JSON consumer can represent exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Smallest integer a JSON consumer can represent exactly
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

/// An unvalidated numeric input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawAmount<'a> {
    /// No value supplied (absent field or JSON null)
    Missing,
    /// Free-form text such as `"1,234"` or `"$50"`
    Text(&'a str),
    /// A floating-point number
    Float(f64),
    /// An integer wider than any stored amount, e.g. an accumulated sum
    Integer(i128),
    /// A value of a non-numeric JSON type (bool, array, object)
    Unsupported(&'static str),
}

impl<'a> From<&'a str> for RawAmount<'a> {
    fn from(text: &'a str) -> Self {
        RawAmount::Text(text)
    }
}

impl From<i64> for RawAmount<'_> {
    fn from(value: i64) -> Self {
        RawAmount::Integer(value as i128)
    }
}

impl From<i128> for RawAmount<'_> {
    fn from(value: i128) -> Self {
        RawAmount::Integer(value)
    }
}

impl From<f64> for RawAmount<'_> {
    fn from(value: f64) -> Self {
        RawAmount::Float(value)
    }
}

impl<'a> From<Option<&'a Value>> for RawAmount<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawAmount::Missing,
            Some(value) => RawAmount::from(value),
        }
    }
}

impl<'a> From<&'a Value> for RawAmount<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => RawAmount::Missing,
            Value::String(text) => RawAmount::Text(text),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    RawAmount::Integer(int as i128)
                } else if let Some(uint) = number.as_u64() {
                    RawAmount::Integer(uint as i128)
                } else {
                    RawAmount::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::Bool(_) => RawAmount::Unsupported("boolean"),
            Value::Array(_) => RawAmount::Unsupported("array"),
            Value::Object(_) => RawAmount::Unsupported("object"),
        }
    }
}

impl fmt::Display for RawAmount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Missing => write!(f, "<missing>"),
            RawAmount::Text(text) => write!(f, "{:?}", text),
            RawAmount::Float(value) => write!(f, "{}", value),
            RawAmount::Integer(value) => write!(f, "{}", value),
            RawAmount::Unsupported(kind) => write!(f, "<{}>", kind),
        }
    }
}

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text contained no digits after stripping
    NoDigits,
    /// NaN or infinity
    NonFinite,
    /// Outside the safe-integer range
    OutOfRange,
    /// Not a number or string at all
    UnsupportedType,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoDigits => write!(f, "no digits"),
            Rejection::NonFinite => write!(f, "not a finite number"),
            Rejection::OutOfRange => write!(f, "outside the safe integer range"),
            Rejection::UnsupportedType => write!(f, "unsupported type"),
        }
    }
}

/// Receives a note for every rejected input
pub trait DiagnosticSink: Send + Sync {
    fn rejected(&self, input: &RawAmount<'_>, reason: Rejection);
}

/// Default sink: a `tracing` warning per rejection
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn rejected(&self, input: &RawAmount<'_>, reason: Rejection) {
        tracing::warn!(input = %input, %reason, "rejected numeric input");
    }
}

/// Converts raw input into safe whole-unit integers
#[derive(Clone)]
pub struct NumericNormalizer {
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for NumericNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NumericNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericNormalizer").finish_non_exhaustive()
    }
}

impl NumericNormalizer {
    /// Normalizer reporting to the tracing sink
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Normalizer reporting to a caller-supplied sink
    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Normalize a raw value
    ///
    /// Returns `None` for missing input and for anything rejected. Missing
    /// input is not a rejection and is not reported.
    pub fn normalize<'a>(&self, raw: impl Into<RawAmount<'a>>) -> Option<i64> {
        let raw = raw.into();
        match classify(&raw) {
            Outcome::Missing => None,
            Outcome::Value(value) => Some(value),
            Outcome::Rejected(reason) => {
                self.sink.rejected(&raw, reason);
                None
            }
        }
    }

    /// Normalize, coercing missing or rejected input to zero
    pub fn normalize_or_zero<'a>(&self, raw: impl Into<RawAmount<'a>>) -> i64 {
        self.normalize(raw).unwrap_or(0)
    }

    /// Normalize and accept only strictly positive results
    pub fn positive<'a>(&self, raw: impl Into<RawAmount<'a>>) -> Option<i64> {
        self.normalize(raw).filter(|value| *value > 0)
    }
}

enum Outcome {
    Missing,
    Value(i64),
    Rejected(Rejection),
}

fn classify(raw: &RawAmount<'_>) -> Outcome {
    match *raw {
        RawAmount::Missing => Outcome::Missing,
        RawAmount::Text("") => Outcome::Missing,
        RawAmount::Text(text) => parse_text(text),
        RawAmount::Float(value) => {
            if !value.is_finite() {
                return Outcome::Rejected(Rejection::NonFinite);
            }
            let truncated = value.trunc();
            if truncated > MAX_SAFE_INTEGER as f64 || truncated < MIN_SAFE_INTEGER as f64 {
                return Outcome::Rejected(Rejection::OutOfRange);
            }
            Outcome::Value(truncated as i64)
        }
        RawAmount::Integer(value) => check_range(value),
        RawAmount::Unsupported(_) => Outcome::Rejected(Rejection::UnsupportedType),
    }
}

/// Strip everything but digits and minus signs, then read an optional leading
/// minus followed by the leading run of digits.
fn parse_text(text: &str) -> Outcome {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    let (negative, rest) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let digit_count = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return Outcome::Rejected(Rejection::NoDigits);
    }

    // Only overflow can fail here: the slice is all ASCII digits.
    let magnitude = match rest[..digit_count].parse::<i128>() {
        Ok(magnitude) => magnitude,
        Err(_) => return Outcome::Rejected(Rejection::OutOfRange),
    };

    check_range(if negative { -magnitude } else { magnitude })
}

fn check_range(value: i128) -> Outcome {
    if value > MAX_SAFE_INTEGER as i128 || value < MIN_SAFE_INTEGER as i128 {
        Outcome::Rejected(Rejection::OutOfRange)
    } else {
        Outcome::Value(value as i64)
    }
}
