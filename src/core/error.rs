use thiserror::Error;

/// Errors raised while configuring, fetching, decoding or rendering.
#[derive(Error, Debug)]
pub enum VarmonError {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unparseable port, host or URL list
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Request failed or returned an unexpected status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The endpoint answered 404
    #[error("Vars not found at {0}. Did you import expvar?")]
    NotFound(String),

    /// Transport-level reqwest failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Body was JSON but not an object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Filesystem or stream failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request exceeded the configured timeout
    #[error("Timeout error: operation took longer than {timeout_ms}ms")]
    Timeout {
        /// Configured limit in milliseconds
        timeout_ms: u64,
    },

    /// Input text that could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        /// What failed to parse
        message: String,
    },

    /// Output could not be written
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type alias for varmon operations
pub type Result<T> = std::result::Result<T, VarmonError>;

impl VarmonError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new invalid target error
    pub fn invalid_target<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTarget(msg.into())
    }

    /// Creates a new fetch error
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Creates a new invalid payload error
    pub fn invalid_payload<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Creates a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Creates a new render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }

    /// Returns true if the next tick may succeed without operator action
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(_) | Self::NotFound(_) | Self::Timeout { .. } => true,
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Serialization(_) | Self::InvalidPayload(_) => true,
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::InvalidTarget(_) => "config",
            Self::Fetch(_) | Self::Http(_) => "network",
            Self::NotFound(_) => "not_found",
            Self::Serialization(_) | Self::InvalidPayload(_) | Self::Parse { .. } => {
                "serialization"
            },
            Self::Io(_) => "io",
            Self::Timeout { .. } => "timeout",
            Self::Render(_) => "ui",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = VarmonError::config("no vars specified");
        assert_eq!(err.to_string(), "Configuration error: no vars specified");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_struct_variant_messages() {
        let err = VarmonError::parse("bad interval");
        assert_eq!(err.to_string(), "Parse error: bad interval");
        assert_eq!(err.category(), "serialization");

        let err = VarmonError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "Timeout error: operation took longer than 250ms");
        assert_eq!(VarmonError::render("stdout closed").category(), "ui");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(VarmonError::fetch("connection refused").is_recoverable());
        assert!(VarmonError::NotFound("http://localhost:1234/debug/vars".into()).is_recoverable());
        assert!(VarmonError::Timeout { timeout_ms: 1000 }.is_recoverable());
        assert!(!VarmonError::config("invalid config").is_recoverable());
        assert!(!VarmonError::invalid_target("1234-12").is_recoverable());
    }

    #[test]
    fn test_not_found_message() {
        let err = VarmonError::NotFound("http://localhost:1234/debug/vars".into());
        assert_eq!(
            err.to_string(),
            "Vars not found at http://localhost:1234/debug/vars. Did you import expvar?"
        );
        assert_eq!(err.category(), "not_found");
    }
}
