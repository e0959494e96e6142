use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single spreadsheet cell. Missing cells are represented as `None` by the
/// tables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Exact decimal reading of the cell.
    ///
    /// Floats go through their shortest round-trip text so `1.0005` stays
    /// `1.0005` instead of picking up binary noise. Text is accepted with
    /// spaces as thousands separators and a comma as the decimal mark.
    /// Numbers beyond the `Decimal` range are [`NumericError::OutOfRange`],
    /// not [`NumericError::NotNumeric`].
    pub fn to_decimal(&self) -> Result<Decimal, NumericError> {
        match self {
            Value::Integer(i) => Ok(Decimal::from(*i)),
            Value::Float(f) => float_to_decimal(*f),
            Value::Text(s) => parse_decimal_text(s),
            _ => Err(NumericError::NotNumeric),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    NotNumeric,
    OutOfRange,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NotNumeric => write!(f, "not a number"),
            NumericError::OutOfRange => write!(f, "number outside the decimal range"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Renders an optional cell the way it is written to exports: null is empty.
pub fn display_cell(cell: Option<&Value>) -> String {
    cell.map(Value::as_display).unwrap_or_default()
}

/// Cell read from delimited text: empty fields are null, everything else is text.
pub fn text_cell(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        None
    } else {
        Some(Value::Text(raw.to_string()))
    }
}

fn float_to_decimal(value: f64) -> Result<Decimal, NumericError> {
    if value.is_nan() {
        return Err(NumericError::NotNumeric);
    }
    if value.is_infinite() {
        return Err(NumericError::OutOfRange);
    }
    Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::try_from(value))
        .map_err(|_| NumericError::OutOfRange)
}

fn parse_decimal_text(raw: &str) -> Result<Decimal, NumericError> {
    let compact = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect::<String>();
    if compact.is_empty() {
        return Err(NumericError::NotNumeric);
    }
    if let Ok(value) = Decimal::from_str(&compact).or_else(|_| Decimal::from_scientific(&compact)) {
        return Ok(value);
    }
    // Text that is a valid float but not a valid decimal is a number too large
    // (or too precise) for `Decimal`.
    match compact.parse::<f64>() {
        Ok(value) if value.is_finite() => float_to_decimal(value),
        Ok(value) if value.is_infinite() && compact.chars().any(|c| c.is_ascii_digit()) => {
            Err(NumericError::OutOfRange)
        }
        _ => Err(NumericError::NotNumeric),
    }
}
