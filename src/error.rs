//! Error types for the render service

use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling a render request
#[derive(Error, Debug)]
pub enum Error {
    /// The request body was malformed or failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to launch the browser or open a tab
    #[error("Browser launch failed: {0}")]
    InitializationError(String),

    /// Failed to load the bootstrap page
    #[error("Failed to load scene page: {0}")]
    LoadError(String),

    /// The in-page script reported an error, or capture failed
    #[error("Canvas rendering error: {0}")]
    RenderError(String),

    /// Rendering finished but the canvas container was missing from the page
    #[error("Canvas container element not found")]
    ElementNotFound,

    /// Page load or completion wait exceeded its bound
    #[error("Rendering timed out after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether this error came from the caller's input rather than the
    /// browser pipeline.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::RenderError(err.to_string())
    }
}
