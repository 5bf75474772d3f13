//! Parsing of typed values.
//!
//! Accepted forms:
//!
//! ```text
//! 12s      segments
//! 45deg    angle in degrees
//! 30       bare number, read in the current mode
//! 2.5cm    length: mm (default), cm, m, in or ", ft or '
//! ```
//!
//! Lengths are returned in millimetres. A comma may stand for the decimal
//! point.

use crate::error::{BendError, Result};

/// A parsed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    /// Subdivision count (`"<n>s"`).
    Segments(i64),
    /// Angle in radians (`"<x>deg"`).
    Angle(f64),
    /// Length in millimetres (number with a unit suffix).
    Length(f64),
    /// Number without any suffix.
    Number(f64),
}

const UNITS: [(&str, f64); 7] = [
    ("mm", 1.0),
    ("cm", 10.0),
    ("m", 1000.0),
    ("in", 25.4),
    ("\"", 25.4),
    ("ft", 304.8),
    ("'", 304.8),
];

/// Parse user text into a value.
pub fn parse_input(text: &str) -> Result<InputValue> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BendError::Parse("empty input".into()));
    }
    if let Some(count) = text.strip_suffix('s') {
        return count
            .trim()
            .parse::<i64>()
            .map(InputValue::Segments)
            .map_err(|_| BendError::Parse(format!("bad segment count: {text}")));
    }
    if let Some(degrees) = text.strip_suffix("deg") {
        return parse_number(degrees)
            .map(|d| InputValue::Angle(d.to_radians()))
            .ok_or_else(|| BendError::Parse(format!("bad angle: {text}")));
    }
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+')))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value = parse_number(number).ok_or_else(|| BendError::Parse(format!("bad number: {text}")))?;
    let unit = unit.trim();
    if unit.is_empty() {
        return Ok(InputValue::Number(value));
    }
    UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, scale)| InputValue::Length(value * scale))
        .ok_or_else(|| BendError::Parse(format!("unknown unit: {unit}")))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
