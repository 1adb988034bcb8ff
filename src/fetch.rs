//! Telemetry fetching.
//!
//! The [`Fetcher`] trait is the seam between the refresh state machine and
//! the network; [`HttpFetcher`] is the real implementation over `reqwest`.

use crate::core::config::{BasicAuth, PollConfig};
use crate::core::{Result, Target, VarmonError};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Source of decoded telemetry snapshots.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one decoded JSON object from the target.
    async fn fetch(&self, target: &Target) -> Result<Value>;
}

/// Fetches expvar JSON over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    basic_auth: Option<BasicAuth>,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration, basic_auth: Option<BasicAuth>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("varmon/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout,
            basic_auth,
        })
    }

    /// Create a fetcher from the poll section of the configuration.
    pub fn from_config(poll: &PollConfig) -> Result<Self> {
        Self::new(poll.timeout, poll.basic_auth.clone())
    }

    fn timeout_error(&self) -> VarmonError {
        VarmonError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &Target) -> Result<Value> {
        let mut request = self.client.get(target.url().clone());
        if let Some(auth) = &self.basic_auth {
            request = request.basic_auth(&auth.user, Some(&auth.password));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                VarmonError::from(e)
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(VarmonError::NotFound(target.to_string())),
            status if !status.is_success() => {
                return Err(VarmonError::fetch(format!("{target} responded with {status}")));
            },
            _ => {},
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                VarmonError::from(e)
            }
        })?;
        let payload: Value = serde_json::from_slice(&body)?;

        if !payload.is_object() {
            return Err(VarmonError::invalid_payload(format!(
                "{target} did not return a JSON object"
            )));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_reports_millis() {
        let fetcher = HttpFetcher::new(Duration::from_millis(1500), None).unwrap();
        match fetcher.timeout_error() {
            VarmonError::Timeout { timeout_ms } => assert_eq!(timeout_ms, 1500),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_config_carries_auth() {
        let poll = PollConfig {
            basic_auth: Some(BasicAuth {
                user: "admin".to_string(),
                password: "secret".to_string(),
            }),
            ..PollConfig::default()
        };
        let fetcher = HttpFetcher::from_config(&poll).unwrap();
        assert_eq!(fetcher.basic_auth, poll.basic_auth);
        assert_eq!(fetcher.timeout, Duration::from_secs(1));
    }
}
