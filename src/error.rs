//! Error types for the rendering pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or deleting a post image
#[derive(Error, Debug)]
pub enum Error {
    /// The request payload failed schema or pattern validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The headless renderer failed to launch, load, or capture
    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    /// Remote storage rejected the upload or the network failed
    #[error("Upload failed: {0}")]
    UploadFailure(String),

    /// Remote storage returned an unexpected destroy result or errored
    #[error("Deletion failed: {0}")]
    DeletionFailure(String),
}

impl Error {
    /// Category label used in logs and error responses
    pub fn category(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "InvalidInput",
            Error::RenderFailure(_) => "RenderFailure",
            Error::UploadFailure(_) => "UploadFailure",
            Error::DeletionFailure(_) => "DeletionFailure",
        }
    }
}
