//! Error types for the evaluation client.
//!
//! The `Display` text of every variant is what the user sees, so keep it
//! readable and free of internal detail.

use reqwest::StatusCode;

/// Shown whenever the service answers 502, whatever the body says.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Server is temporarily unavailable (502). Please try again later.";

/// Which outbound request produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Upload,
    Download,
}

/// Errors raised while talking to the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// HTTP 502: the service is overloaded or still starting.
    #[error("{}", SERVICE_UNAVAILABLE_MESSAGE)]
    ServiceUnavailable,

    /// Any other non-2xx response.
    #[error("{}", request_failure_message(.operation, .status, .message))]
    Request {
        operation: Operation,
        status: StatusCode,
        message: Option<String>,
    },

    /// No response at all (DNS, refused connection, reset).
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response whose body we could not use.
    #[error("invalid response from server: {message}")]
    InvalidResponse { message: String },

    /// The log stream could not be set up.
    #[error("log stream error: {message}")]
    Stream { message: String },

    /// Client configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

fn request_failure_message(
    operation: &Operation,
    status: &StatusCode,
    message: &Option<String>,
) -> String {
    match (operation, message) {
        (Operation::Upload, Some(message)) => message.to_string(),
        (Operation::Upload, None) => format!("Upload failed (status {})", status.as_u16()),
        // Downloads return a PDF on success, so there is no message contract on failure.
        (Operation::Download, _) => format!("Failed to download (status {})", status.as_u16()),
    }
}

/// Errors raised by the session controller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid file type. Please select a PDF file.")]
    InvalidFileType,

    #[error("Please select both the answer script and the question paper.")]
    MissingFiles,

    #[error("No evaluation has been started yet.")]
    NoActiveJob,

    #[error("The evaluation is still running.")]
    EvaluationInProgress,

    #[error("Lost connection to the evaluation log stream.")]
    StreamLost,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
pub type SessionResult<T> = Result<T, SessionError>;
