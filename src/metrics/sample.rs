//! Raw per-tick samples kept in history buffers.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// One decoded reading, kept with the JSON scalar type it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    /// Integral JSON number.
    Int(i64),
    /// Non-integral JSON number.
    Float(f64),
    /// JSON boolean.
    Bool(bool),
    /// JSON string.
    Text(String),
}

impl Sample {
    /// Ordered-attempt decode of an unannotated JSON value.
    ///
    /// The order is i64, f64, bool, string, array. Integers must be tried
    /// before floats: every JSON integer is also a valid float, and the two
    /// format and coerce differently downstream. Arrays collapse to their
    /// trailing-zero-trimmed average, typed after their first element.
    pub fn decode(value: &Value) -> Option<Sample> {
        if let Some(n) = value.as_i64() {
            return Some(Sample::Int(n));
        }
        if let Some(f) = value.as_f64() {
            return Some(Sample::Float(f));
        }
        if let Some(b) = value.as_bool() {
            return Some(Sample::Bool(b));
        }
        if let Some(s) = value.as_str() {
            return Some(Sample::Text(s.to_owned()));
        }
        if let Some(items) = value.as_array() {
            return Some(Self::decode_array(items));
        }
        None
    }

    fn decode_array(items: &[Value]) -> Sample {
        let Some(first) = items.first() else {
            return Sample::Int(0);
        };

        let numbers: Vec<f64> = items.iter().map(|v| v.as_f64().unwrap_or(0.0)).collect();
        let avg = trimmed_average(&numbers);

        if first.is_i64() {
            #[allow(clippy::cast_possible_truncation)]
            Sample::Int(avg as i64)
        } else {
            Sample::Float(avg)
        }
    }

    /// Integer projection used for sparklines.
    ///
    /// Floats keep two decimal digits (`12.34` becomes `1234`), booleans map
    /// to 0/1 and text to 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_sparkline_int(&self) -> i64 {
        match self {
            Sample::Int(n) => *n,
            Sample::Float(f) => (f * 100.0) as i64,
            Sample::Bool(b) => i64::from(*b),
            Sample::Text(_) => 0,
        }
    }

    /// Numeric value, if the sample is a number.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Sample::Int(n) => Some(*n as f64),
            Sample::Float(f) => Some(*f),
            Sample::Bool(_) | Sample::Text(_) => None,
        }
    }

    /// Compare by numeric value, promoting int against float.
    ///
    /// Non-numeric samples are unordered.
    #[allow(clippy::cast_precision_loss)]
    pub fn numeric_cmp(&self, other: &Sample) -> Option<Ordering> {
        match (self, other) {
            (Sample::Int(a), Sample::Int(b)) => Some(a.cmp(b)),
            (Sample::Int(a), Sample::Float(b)) => (*a as f64).partial_cmp(b),
            (Sample::Float(a), Sample::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Sample::Float(a), Sample::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Mean of `values` after dropping the rightmost run of zeros.
///
/// Runtime buffers such as `PauseNs` start out zero-filled, so the unfilled
/// tail must not drag the mean down. An all-zero slice averages to zero.
#[allow(clippy::cast_precision_loss)]
pub fn trimmed_average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let end = values
        .iter()
        .rposition(|v| *v != 0.0)
        .map_or(values.len(), |idx| idx + 1);
    let trimmed = &values[..end];

    trimmed.iter().sum::<f64>() / trimmed.len() as f64
}
