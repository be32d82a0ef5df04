//! Error types for the publication pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! Each layer owns its own enum so failures stay scoped to the unit they affect:
//! one page ([`FetchError`]), one publication ([`ModelError`], [`ClassifyError`]),
//! or the whole operation when the input configuration is invalid ([`PipelineError`]).

use std::time::Duration;

/// Errors from the page fetching layer.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Listing service asked us to slow down (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Waiting for the next page exceeded the configured bound
    #[error("Timed out waiting for page after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Profile locator could not be turned into a request
    #[error("Invalid profile locator '{locator}': {message}")]
    InvalidLocator {
        /// The locator as given
        locator: String,
        /// Why it was rejected
        message: String,
    },

    /// Reading a pre-downloaded page failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited {
            retry_after: Duration::from_secs(seconds),
        }
    }

    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid locator error.
    #[must_use]
    pub fn invalid_locator(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            message: message.into(),
        }
    }

    /// Returns true if the failure was the bounded wait running out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Errors from the remote classification model.
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the model provider (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Missing or rejected credentials (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from the provider
        message: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the provider
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response carried no completion text
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    /// Completion was not one of the accepted labels
    #[error("Unexpected model answer: {0:?}")]
    UnexpectedAnswer(String),
}

impl ModelError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited {
            retry_after: Duration::from_secs(seconds),
        }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and worth another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. } => true,
            Self::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            Self::Middleware(_) => true,
            _ => false,
        }
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Per-publication classification failure.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// Every allowed attempt failed with a transient error.
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last: ModelError,
    },

    /// The model failed in a way another attempt would not fix.
    #[error("Classification failed after {attempts} attempts: {source}")]
    Rejected {
        /// Number of attempts made, the failing one included
        attempts: u32,
        /// Error that ended the attempts
        source: ModelError,
    },
}

impl ClassifyError {
    /// Number of model calls made before giving up.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Rejected { attempts, .. } => *attempts,
        }
    }
}

/// Errors that abort a pipeline operation before any processing happens.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Start year is after end year
    #[error("Invalid year range: start {start} is after end {end}")]
    InvalidYearRange {
        /// Requested first year
        start: i32,
        /// Requested last year
        end: i32,
    },

    /// A required input was not supplied
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Reading inputs or writing reports failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Saved raw records could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a missing input error.
    #[must_use]
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    /// Convert to a short message suitable for the command line.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::InvalidYearRange { start, end } => {
                format!("Start year {start} cannot be greater than end year {end}.")
            }
            Self::MissingInput(what) => format!("Nothing to process: {what}."),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type alias for model calls.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
