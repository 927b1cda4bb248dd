use std::error::Error as StdError;
use std::fmt;

/// Everything that can end an exchange early.
///
/// Malformed stream frames are not represented here: they are skipped by the
/// decoders and never terminate an exchange.
#[derive(Debug)]
pub enum ExchangeError {
    /// No API key configured for the provider. Raised before any I/O.
    MissingApiKey { provider: String },
    /// The configured key cannot be carried in an HTTP header.
    InvalidApiKey { provider: String },
    /// The request body could not be serialized.
    Encode(serde_json::Error),
    /// Connection, DNS, TLS, timeout or body-read failure.
    Transport(reqwest::Error),
    /// The provider answered with a non-2xx status.
    Protocol { status: u16, body: String },
}

impl ExchangeError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ExchangeError::MissingApiKey { .. } | ExchangeError::InvalidApiKey { .. }
        )
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::MissingApiKey { provider } => {
                write!(f, "API key not set for provider: {provider}")
            }
            ExchangeError::InvalidApiKey { provider } => {
                write!(f, "API key for provider {provider} contains invalid characters")
            }
            ExchangeError::Encode(source) => write!(f, "Failed to encode request: {source}"),
            ExchangeError::Transport(source) => {
                if source.is_timeout() {
                    write!(f, "Request timed out: {source}")
                } else {
                    write!(f, "{source}")
                }
            }
            ExchangeError::Protocol { status, body } => {
                write!(f, "API error (status {status}): {body}")
            }
        }
    }
}

impl StdError for ExchangeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ExchangeError::Encode(source) => Some(source),
            ExchangeError::Transport(source) => Some(source),
            _ => None,
        }
    }
}
