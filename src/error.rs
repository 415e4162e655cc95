//! Error types for Pagedrive
//!
//! Two layers live here. [`ActionError`] is the flat, four-kind taxonomy that
//! every backend operation and pipeline invocation reports; it never carries
//! backend-specific detail. [`Error`] is the crate-level type for everything
//! outside that uniform contract (backend launch, configuration, selector
//! parsing, I/O).

use thiserror::Error;

/// Outcome kind of a failed backend operation or pipeline invocation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionError {
    /// A bounded wait (page load, predicate, selector) exceeded its deadline
    #[error("operation timed out")]
    Timeout,

    /// The fetch/render channel or the script execution channel failed
    #[error("network failure")]
    NetworkFailure,

    /// Content was requested before any navigation succeeded
    #[error("no content captured yet")]
    NotFound,

    /// The active backend does not implement the operation
    #[error("operation not supported by this backend")]
    NotSupported,
}

/// Result type for backend operations and pipeline invocations
pub type ActionResult<T> = std::result::Result<T, ActionError>;

/// The main error type for Pagedrive operations
#[derive(Error, Debug)]
pub enum Error {
    /// Backend operation failed
    #[error("Action failed: {0}")]
    Action(#[from] ActionError),

    /// Backend lifecycle and configuration errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Content extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Backend lifecycle and configuration errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch the rendering engine
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Backend configuration rejected
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    /// Failed to open the page/tab the backend renders into
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Failed to build the HTTP client
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Selector could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// No element matched the selector
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

/// Result type alias for Pagedrive operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Kind of the underlying action failure, if this is one
    pub fn action_kind(&self) -> Option<ActionError> {
        match self {
            Error::Action(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<chromiumoxide::error::CdpError> for ActionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        use chromiumoxide::error::CdpError;

        tracing::debug!("cdp error: {}", err);
        match err {
            CdpError::Timeout => ActionError::Timeout,
            _ => ActionError::NetworkFailure,
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        tracing::debug!("http error: {}", err);
        if err.is_timeout() {
            ActionError::Timeout
        } else {
            ActionError::NetworkFailure
        }
    }
}
