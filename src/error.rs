//! Error types for the pypic application

use thiserror::Error;

/// Result type alias for pypic operations
pub type Result<T> = std::result::Result<T, PypicError>;

/// Main error type for the pypic application
#[derive(Error, Debug)]
pub enum PypicError {
    /// Transport-level failure talking to the package index
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The search endpoint could not be reached
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// Search page markup did not have the expected shape
    #[error("Malformed search page: {0}")]
    Markup(#[from] MarkupError),

    /// A string-only operation received some other kind of value
    #[error("Invalid argument type: expected {expected}, found {found}")]
    InvalidArgumentType {
        expected: &'static str,
        found: String,
    },

    /// A search result was built with a field it does not have
    #[error("SearchResult has no field '{0}'")]
    UnknownField(String),

    /// JSON serialization/deserialization failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML serialization/deserialization failed
    #[error("YAML parsing failed: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Failures reported by an [`HttpTransport`](crate::transport::HttpTransport)
#[derive(Error, Debug)]
pub enum TransportError {
    /// The connection to the server could not be established
    #[error("connection failed: {0}")]
    Connection(String),

    /// The request did not complete in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other failure while sending the request or reading the body
    #[error("request failed: {0}")]
    Request(String),
}

/// Ways a search page can deviate from the fixed result-table layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The anchor text was not `name<NBSP>version`
    #[error("expected 'name\\u{{a0}}version' in result link, found '{0}'")]
    NameField(String),

    /// The first data cell after the link was not an integer
    #[error("expected an integer weight, found '{0}'")]
    Weight(String),

    /// A `</tr>` arrived with no result row open
    #[error("table row closed with no pending search result")]
    OrphanRow,
}

impl PypicError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::ValidationError(message.into())
    }

    /// Create a new invalid argument type error
    pub fn invalid_type<S: Into<String>>(expected: &'static str, found: S) -> Self {
        Self::InvalidArgumentType {
            expected,
            found: found.into(),
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::SearchUnavailable(_) => {
                "Search results could not be retrieved from the package index. Please check your connection and try again."
                    .to_string()
            }
            Self::Transport(TransportError::Connection(_)) => {
                "Network connection failed. Please check your internet connection.".to_string()
            }
            Self::Transport(TransportError::Timeout(_)) => {
                "The package index did not answer in time. Try again or raise --timeout."
                    .to_string()
            }
            Self::Markup(e) => {
                format!("The package index returned a search page pypic cannot read ({})", e)
            }
            _ => self.to_string(),
        }
    }
}

impl TransportError {
    /// Whether the failure happened before any response arrived
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
