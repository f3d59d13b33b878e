use thiserror::Error;

/// Error types for the fitgrid library.
///
/// Tree reconciliation never produces these: invalid input is coerced to
/// `Unspecified` in place. Errors only surface from the function table,
/// the persistence layer and the foreign runtime.
#[derive(Error, Debug)]
pub enum FitGridError {
    /// Function table failure (duplicate names, deletion while selected, ...).
    #[error("Function error: {0}")]
    Function(#[from] crate::functions::FunctionError),

    /// The foreign runtime refused to build an object.
    #[error("Marshaling error: {0}")]
    Marshal(#[from] crate::bridge::ForeignError),

    /// A persisted file did not have the expected shape.
    #[error("Malformed file: {0}")]
    MalformedFile(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for fitgrid operations.
pub type Result<T> = std::result::Result<T, FitGridError>;

impl From<String> for FitGridError {
    fn from(s: String) -> Self {
        FitGridError::Other(s)
    }
}

impl From<&str> for FitGridError {
    fn from(s: &str) -> Self {
        FitGridError::Other(s.to_string())
    }
}
