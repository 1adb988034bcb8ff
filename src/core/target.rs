//! Instance addresses.
//!
//! Accepted forms, comma-separated and freely mixed:
//! - `1234` or `1234-1236`: ports on localhost
//! - `host:1234` or `host:2000-2001`
//! - `https://host:443/custom/vars`, port ranges allowed here too

use crate::core::{Result, VarmonError};
use reqwest::Url;
use std::fmt;

/// Path served by Go's `expvar` package.
pub const DEFAULT_ENDPOINT: &str = "/debug/vars";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_SCHEME: &str = "http";

/// Fully-qualified telemetry URL of one monitored instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Wrap an already-built URL.
    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// URL to poll.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Short `host:port` form used as a name until the instance reports one.
    pub fn address(&self) -> String {
        let host = self.url.host_str().unwrap_or(DEFAULT_HOST);
        match self.url.port_or_known_default() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Expand a comma-separated target list.
pub fn parse_targets(list: &str, endpoint: &str) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        targets.extend(parse_entry(entry, endpoint)?);
    }
    Ok(targets)
}

fn parse_entry(entry: &str, endpoint: &str) -> Result<Vec<Target>> {
    let (scheme, rest) = match entry.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => (DEFAULT_SCHEME, entry),
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let path = if path.is_empty() || path == "/" {
        endpoint
    } else {
        path
    };

    let (host, ports) = match authority.rsplit_once(':') {
        Some((host, ports)) => (host, Some(ports)),
        None if is_port_spec(authority) => (DEFAULT_HOST, Some(authority)),
        None => (authority, None),
    };
    if host.is_empty() {
        return Err(VarmonError::invalid_target(format!("missing host in '{entry}'")));
    }

    let build = |authority: String| -> Result<Target> {
        let raw = format!("{scheme}://{authority}{path}");
        Url::parse(&raw)
            .map(Target::from_url)
            .map_err(|e| VarmonError::invalid_target(format!("'{raw}': {e}")))
    };

    match ports {
        None if entry.contains("://") => Ok(vec![build(host.to_string())?]),
        None => Err(VarmonError::invalid_target(format!("missing port in '{entry}'"))),
        Some(ports) => expand_ports(ports)?
            .into_iter()
            .map(|port| build(format!("{host}:{port}")))
            .collect(),
    }
}

fn is_port_spec(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Expand `80` or `8000-8002` into individual ports.
fn expand_ports(spec: &str) -> Result<Vec<u16>> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u16>()
            .map_err(|_| VarmonError::invalid_target(format!("invalid port '{s}'")))
    };

    match spec.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse(start)?, parse(end)?);
            if start > end {
                return Err(VarmonError::invalid_target(format!(
                    "port range {start}-{end} is reversed"
                )));
            }
            Ok((start..=end).collect())
        },
        None => Ok(vec![parse(spec)?]),
    }
}
