//! Metric paths and their semantic kinds.
//!
//! A path looks like `[kind:]segment(.segment)*`, e.g. `mem:memstats.Alloc`.
//! Segments may carry an escaped dot (`\.`), so keys such as
//! `bench.bleve` can be addressed without being split.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{Result, VarmonError};

/// Full path of the Go runtime `PauseNs` circular buffer.
pub const GC_PAUSES_PATH: &str = "memstats.PauseNs";

/// Full path of the Go runtime `PauseEnd` circular buffer.
pub const GC_INTERVALS_PATH: &str = "memstats.PauseEnd";

/// Semantic kind of a metric, which drives parsing and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Plain number.
    Default,
    /// Byte count.
    Memory,
    /// Nanosecond count.
    Duration,
    /// Free-form string.
    String,
    /// GC pause durations buffer.
    GcPauses,
    /// GC pause end-timestamps buffer.
    GcIntervals,
}

impl Kind {
    /// Whether values of this kind can be drawn as a sparkline.
    pub fn is_sparkline_capable(self) -> bool {
        !matches!(self, Kind::String)
    }

    /// Kind selected by a `kind:` prefix; unknown prefixes map to `Default`.
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "mem" => Kind::Memory,
            "duration" => Kind::Duration,
            "str" => Kind::String,
            _ => Kind::Default,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Default => "default",
            Kind::Memory => "mem",
            Kind::Duration => "duration",
            Kind::String => "str",
            Kind::GcPauses => "gc_pauses",
            Kind::GcIntervals => "gc_intervals",
        };
        f.write_str(name)
    }
}

/// Dotted, escape-aware path to a value inside a telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetricPath {
    raw: String,
}

impl MetricPath {
    /// Wrap a raw path string. Segmentation happens lazily.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The path exactly as configured, including any `kind:` prefix.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path segments used to walk the decoded JSON tree.
    ///
    /// `"mem:memstats.Alloc"` yields `["memstats", "Alloc"]`.
    pub fn segments(&self) -> Vec<String> {
        split_escaped(self.long_name())
    }

    /// Full path with the `kind:` prefix stripped.
    pub fn long_name(&self) -> &str {
        match self.prefix_end() {
            Some(idx) => &self.raw[idx + 1..],
            None => &self.raw,
        }
    }

    /// Last path segment, e.g. `Alloc` for `memstats.Alloc`.
    pub fn short_name(&self) -> String {
        self.segments().pop().unwrap_or_default()
    }

    /// Semantic kind. The two GC buffer paths override any prefix.
    pub fn kind(&self) -> Kind {
        match self.long_name() {
            GC_PAUSES_PATH => return Kind::GcPauses,
            GC_INTERVALS_PATH => return Kind::GcIntervals,
            _ => {},
        }

        match self.prefix_end() {
            Some(idx) => Kind::from_prefix(&self.raw[..idx]),
            None => Kind::Default,
        }
    }

    /// Byte index of the first `:` not preceded by a backslash.
    fn prefix_end(&self) -> Option<usize> {
        let mut prev = None;
        for (idx, ch) in self.raw.char_indices() {
            if ch == ':' && prev != Some('\\') {
                return Some(idx);
            }
            prev = Some(ch);
        }
        None
    }
}

/// Split on unescaped dots.
///
/// `\.` keeps a literal dot, `\\` collapses to one backslash, and any other
/// `\x` passes through untouched. Empty segments are dropped.
fn split_escaped(s: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for ch in s.chars() {
        match (escaped, ch) {
            (false, '.') => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            },
            (false, '\\') => {
                current.push('\\');
                escaped = true;
            },
            (false, c) => current.push(c),
            // the backslash pushed on the previous step stands for both
            (true, '\\') => escaped = false,
            (true, '.') => {
                current.pop();
                current.push('.');
                escaped = false;
            },
            (true, c) => {
                current.push(c);
                escaped = false;
            },
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

impl fmt::Display for MetricPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for MetricPath {
    type Err = VarmonError;

    fn from_str(s: &str) -> Result<Self> {
        let path = MetricPath::new(s.trim());
        if path.segments().is_empty() {
            return Err(VarmonError::config(format!("metric path '{s}' has no segments")));
        }
        Ok(path)
    }
}

impl TryFrom<String> for MetricPath {
    type Error = VarmonError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MetricPath> for String {
    fn from(path: MetricPath) -> Self {
        path.raw
    }
}

/// Parse a comma-separated list of metric paths.
pub fn parse_paths(list: &str) -> Result<Vec<MetricPath>> {
    let paths = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect::<Result<Vec<MetricPath>>>()?;

    if paths.is_empty() {
        return Err(VarmonError::config("no vars specified"));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let path = MetricPath::new("memstats.Alloc");
        assert_eq!(path.segments(), vec!["memstats", "Alloc"]);
        assert_eq!(path.short_name(), "Alloc");
        assert_eq!(path.long_name(), "memstats.Alloc");
        assert_eq!(path.kind(), Kind::Default);
    }

    #[test]
    fn test_kind_prefix() {
        let path = MetricPath::new("mem:memstats.Alloc");
        assert_eq!(path.segments(), vec!["memstats", "Alloc"]);
        assert_eq!(path.short_name(), "Alloc");
        assert_eq!(path.long_name(), "memstats.Alloc");
        assert_eq!(path.kind(), Kind::Memory);

        assert_eq!(MetricPath::new("duration:ResponseTimes.API.Users").kind(), Kind::Duration);
        assert_eq!(MetricPath::new("str:build.version").kind(), Kind::String);
        assert_eq!(MetricPath::new("bogus:counter.A").kind(), Kind::Default);
        assert_eq!(MetricPath::new("bogus:counter.A").long_name(), "counter.A");
    }

    #[test]
    fn test_gc_paths_override_prefix() {
        assert_eq!(MetricPath::new("memstats.PauseNs").kind(), Kind::GcPauses);
        assert_eq!(MetricPath::new("duration:memstats.PauseNs").kind(), Kind::GcPauses);
        assert_eq!(MetricPath::new("memstats.PauseEnd").kind(), Kind::GcIntervals);
        assert_eq!(MetricPath::new("mem:memstats.PauseEnd").kind(), Kind::GcIntervals);
        assert_eq!(MetricPath::new("memstats.PauseTotalNs").kind(), Kind::Default);
    }

    #[test]
    fn test_escaped_dot() {
        let path = MetricPath::new(r"bleve.indexes.bench\.bleve.index.lookup_queue_len");
        assert_eq!(
            path.segments(),
            vec!["bleve", "indexes", "bench.bleve", "index", "lookup_queue_len"]
        );
    }

    #[test]
    fn test_double_backslash_splits() {
        let path = MetricPath::new(r"bleve.indexes.bench\\.bleve.index.lookup_queue_len");
        assert_eq!(
            path.segments(),
            vec!["bleve", "indexes", r"bench\", "bleve", "index", "lookup_queue_len"]
        );
    }

    #[test]
    fn test_triple_backslash_keeps_dot() {
        let path = MetricPath::new(r"bleve.indexes.bench\\\.bleve.index.lookup_queue_len");
        assert_eq!(
            path.segments(),
            vec!["bleve", "indexes", r"bench\.bleve", "index", "lookup_queue_len"]
        );
    }

    #[test]
    fn test_quadruple_backslash_splits() {
        let path = MetricPath::new(r"bleve.indexes.bench\\\\.bleve.index.lookup_queue_len");
        assert_eq!(
            path.segments(),
            vec!["bleve", "indexes", r"bench\\", "bleve", "index", "lookup_queue_len"]
        );
    }

    #[test]
    fn test_unknown_escape_passes_through() {
        let path = MetricPath::new(r"bleve.indexes.bench\xbleve.index.lookup_queue_len");
        assert_eq!(
            path.segments(),
            vec!["bleve", "indexes", r"bench\xbleve", "index", "lookup_queue_len"]
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(MetricPath::new("a..b.").segments(), vec!["a", "b"]);
        assert!(MetricPath::new("").segments().is_empty());
        assert_eq!(MetricPath::new("").short_name(), "");
    }

    #[test]
    fn test_parse_paths() {
        let paths = parse_paths("memstats.Alloc,mem:memstats.Sys, goroutines").unwrap();
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[1].kind(), Kind::Memory);
        assert_eq!(paths[2].as_str(), "goroutines");

        assert!(parse_paths("").is_err());
        assert!(parse_paths(",,").is_err());
        assert!("mem:".parse::<MetricPath>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_uses_raw_string() {
        let path: MetricPath = serde_json::from_str("\"mem:memstats.Alloc\"").unwrap();
        assert_eq!(path.kind(), Kind::Memory);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"mem:memstats.Alloc\"");
    }
}
