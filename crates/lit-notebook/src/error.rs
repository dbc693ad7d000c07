//! Error types for lit-notebook.

use thiserror::Error;

/// Result type for lit-notebook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error reported by a server collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while starting or embedding a notebook display.
#[derive(Debug, Error)]
pub enum Error {
    /// Display height is not a positive pixel count.
    #[error("invalid display height {0}: must be a positive number of pixels")]
    InvalidHeight(i64),

    /// The server collaborator failed to construct or serve.
    #[error("server error: {0}")]
    Server(#[source] BoxError),

    /// The notebook display channel rejected the payload.
    #[error("display channel error: {0}")]
    Display(#[from] std::io::Error),

    /// A template referenced a placeholder with no binding.
    #[error("template error: unbound placeholder %{0}%")]
    Template(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a collaborator error as [`Error::Server`].
    pub fn server(err: impl Into<BoxError>) -> Self {
        Self::Server(err.into())
    }

    /// Get a recovery hint for this error, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidHeight(_) => Some("pass a height such as 1000 (the default)"),
            Self::Server(_) => Some("check that the host is resolvable and the port is free"),
            Self::Display(_) => Some("run inside a notebook kernel or pass --raw to print the markup"),
            Self::Template(_) | Self::Serialization(_) => None,
        }
    }

    /// Format the error with its hint appended.
    pub fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}
