/*!
 * Error types for the manimgen application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while pulling a fenced block out of model output.
///
/// `NotFound` and `Malformed` are kept apart so callers can decide to fall
/// back to the raw text only when the fence itself is missing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// No fenced block tagged with the format was present
    #[error("No ```{format} block found in response")]
    NotFound {
        /// Fence tag that was searched for
        format: String,
    },

    /// A fenced block was found but its payload could not be parsed
    #[error("Malformed ```{format} block: {reason}")]
    Malformed {
        /// Fence tag of the block
        format: String,
        /// Parser error message
        reason: String,
        /// The enclosed payload as found
        payload: String,
    },
}

/// Errors produced by a single generation stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// Transport or API fault talking to the model
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model replied, but without a usable structured payload
    #[error("{stage} stage returned a malformed response: {reason}")]
    MalformedResponse {
        /// Name of the stage that failed
        stage: &'static str,
        /// Why the reply was rejected
        reason: String,
        /// The full reply text, kept for logging and inspection
        raw_content: String,
    },
}

impl StageError {
    /// Wrap an extraction failure together with the reply it came from.
    pub fn malformed(stage: &'static str, error: ExtractionError, raw_content: &str) -> Self {
        Self::MalformedResponse {
            stage,
            reason: error.to_string(),
            raw_content: raw_content.to_string(),
        }
    }

    /// Returns true if the model answered but the answer was unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }
}

/// Errors that can occur while rendering scenes to video
#[derive(Error, Debug)]
pub enum RenderError {
    /// Filesystem failure inside the render workspace
    #[error("Render I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The render command could not be started
    #[error("Failed to start '{command}': {message}")]
    SpawnFailed {
        /// Program that was invoked
        command: String,
        /// Underlying error message
        message: String,
    },

    /// The render command exited unsuccessfully
    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        /// Full command line
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The render command did not finish in time
    #[error("Command '{command}' timed out after {seconds}s")]
    Timeout {
        /// Full command line
        command: String,
        /// Timeout that elapsed
        seconds: u64,
    },

    /// The expected video file was not produced
    #[error("Rendered video not found at {0}")]
    MissingOutput(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a generation stage
    #[error("Stage error: {0}")]
    Stage(#[from] StageError),

    /// Error from rendering
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
