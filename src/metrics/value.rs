//! Typed metric values.
//!
//! Every metric holds exactly one `MetricValue`, whose variant is fixed by
//! the path's [`Kind`] at registration. Reads never fail: an unexpected
//! scalar type degrades to a zero value and a value of the wrong shape marks
//! the metric unavailable, so one odd field cannot stop ingestion of its
//! siblings.

use serde_json::Value;
use std::fmt;

use super::format::{format_bytes, format_duration, round_duration};
use super::gc::{GcIntervals, GcPauses};
use super::histogram::DistributionHistogram;
use super::path::{Kind, MetricPath};
use super::sample::Sample;

/// Placeholder rendered for unavailable values.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone)]
enum Data {
    Number(Sample),
    Memory(i64),
    Duration(i64),
    Text(String),
    GcPauses(Box<GcPauses>),
    GcIntervals(Box<GcIntervals>),
}

/// Current value of one metric plus its availability.
#[derive(Debug, Clone)]
pub struct MetricValue {
    data: Data,
    available: bool,
}

impl MetricValue {
    /// Zero value of the given kind. Starts out available.
    pub fn new(kind: Kind) -> Self {
        let data = match kind {
            Kind::Default => Data::Number(Sample::Int(0)),
            Kind::Memory => Data::Memory(0),
            Kind::Duration => Data::Duration(0),
            Kind::String => Data::Text(String::new()),
            Kind::GcPauses => Data::GcPauses(Box::default()),
            Kind::GcIntervals => Data::GcIntervals(Box::default()),
        };
        Self {
            data,
            available: true,
        }
    }

    /// Zero value for the kind implied by `path`.
    pub fn for_path(path: &MetricPath) -> Self {
        Self::new(path.kind())
    }

    /// Kind of this value.
    pub fn kind(&self) -> Kind {
        match self.data {
            Data::Number(_) => Kind::Default,
            Data::Memory(_) => Kind::Memory,
            Data::Duration(_) => Kind::Duration,
            Data::Text(_) => Kind::String,
            Data::GcPauses(_) => Kind::GcPauses,
            Data::GcIntervals(_) => Kind::GcIntervals,
        }
    }

    /// Interpret a raw JSON value.
    ///
    /// Returns false and marks the metric unavailable when the value has the
    /// wrong shape for the kind: anything but an array for GC kinds, objects
    /// and null for everything else, and arrays for all typed scalars.
    #[allow(clippy::cast_possible_truncation)]
    pub fn set(&mut self, raw: &Value) -> bool {
        if !self.accepts(raw) {
            self.set_unavailable();
            return false;
        }

        self.available = true;
        match &mut self.data {
            Data::Number(sample) => *sample = Sample::decode(raw).unwrap_or(Sample::Int(0)),
            Data::Memory(bytes) => *bytes = raw.as_i64().unwrap_or(0),
            Data::Duration(nanos) => {
                *nanos = raw
                    .as_i64()
                    .or_else(|| raw.as_f64().map(|f| f as i64))
                    .unwrap_or(0);
            },
            Data::Text(text) => {
                *text = raw.as_str().unwrap_or(NOT_AVAILABLE).to_owned();
            },
            Data::GcPauses(pauses) => pauses.set(raw),
            Data::GcIntervals(intervals) => intervals.set(raw),
        }
        true
    }

    fn accepts(&self, raw: &Value) -> bool {
        let scalar = matches!(raw, Value::Number(_) | Value::Bool(_) | Value::String(_));
        match self.data {
            Data::Number(_) => scalar || raw.is_array(),
            Data::Memory(_) | Data::Duration(_) | Data::Text(_) => scalar,
            Data::GcPauses(_) | Data::GcIntervals(_) => raw.is_array(),
        }
    }

    /// Mark the metric as missing from the latest snapshot.
    pub fn set_unavailable(&mut self) {
        self.available = false;
        match &mut self.data {
            Data::Number(sample) => *sample = Sample::Int(0),
            Data::Memory(n) | Data::Duration(n) => *n = 0,
            Data::Text(text) => *text = NOT_AVAILABLE.to_owned(),
            Data::GcPauses(_) | Data::GcIntervals(_) => {},
        }
    }

    /// Whether the latest read found the metric.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Integer projection for sparkline-capable kinds.
    ///
    /// Numbers truncate, booleans map to 0/1, GC kinds report their mean in
    /// nanoseconds and strings have none.
    #[allow(clippy::cast_possible_truncation)]
    pub fn int_value(&self) -> Option<i64> {
        match &self.data {
            Data::Number(sample) => Some(truncate(sample)),
            Data::Memory(n) | Data::Duration(n) => Some(*n),
            Data::Text(_) => None,
            Data::GcPauses(_) | Data::GcIntervals(_) if !self.available => Some(0),
            Data::GcPauses(pauses) => Some(pauses.mean() as i64),
            Data::GcIntervals(intervals) => Some(intervals.mean() as i64),
        }
    }

    /// What the latest successful read appends to the metric's history.
    ///
    /// Plain numbers keep the sample the ordered-attempt decoder produced;
    /// typed kinds push their integer projection.
    pub fn history_sample(&self) -> Option<Sample> {
        match &self.data {
            _ if !self.available => None,
            Data::Number(sample) => Some(sample.clone()),
            Data::Text(_) => None,
            _ => self.int_value().map(Sample::Int),
        }
    }

    /// Histogram over the GC buffer with the requested bin count.
    pub fn histogram(&self, bins: usize) -> Option<DistributionHistogram> {
        match &self.data {
            Data::GcPauses(pauses) => Some(pauses.histogram(bins)),
            Data::GcIntervals(intervals) => Some(intervals.histogram(bins)),
            _ => None,
        }
    }

    /// Render a history sample with this metric's kind formatting.
    pub fn format_sample(&self, sample: &Sample) -> String {
        match self.kind() {
            Kind::Memory => format_bytes(truncate(sample)),
            Kind::Duration | Kind::GcPauses | Kind::GcIntervals => {
                format_duration(round_duration(truncate(sample)))
            },
            Kind::Default => format_plain(sample),
            Kind::String => match sample {
                Sample::Text(s) => s.clone(),
                _ => NOT_AVAILABLE.to_string(),
            },
        }
    }
}

/// Integer projection without the sparkline scaling of floats.
#[allow(clippy::cast_possible_truncation)]
fn truncate(sample: &Sample) -> i64 {
    match sample {
        Sample::Int(n) => *n,
        Sample::Float(f) => *f as i64,
        Sample::Bool(b) => i64::from(*b),
        Sample::Text(_) => 0,
    }
}

/// Rendering of an unannotated value, keeping its decoded type.
fn format_plain(sample: &Sample) -> String {
    match sample {
        Sample::Int(n) => n.to_string(),
        Sample::Float(f) => format_number(*f),
        Sample::Bool(b) => b.to_string(),
        Sample::Text(s) => s.clone(),
    }
}

/// Integer text when the fraction is exactly zero, else two decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

impl fmt::Display for MetricValue {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.available {
            return f.write_str(NOT_AVAILABLE);
        }
        match &self.data {
            Data::Number(sample) => f.write_str(&format_plain(sample)),
            Data::Memory(bytes) => f.write_str(&format_bytes(*bytes)),
            Data::Duration(nanos) => f.write_str(&format_duration(round_duration(*nanos))),
            Data::Text(text) => f.write_str(text),
            Data::GcPauses(pauses) => {
                f.write_str(&format_duration(round_duration(pauses.mean() as i64)))
            },
            Data::GcIntervals(intervals) => {
                f.write_str(&format_duration(round_duration(intervals.mean() as i64)))
            },
        }
    }
}
