//! Error types for the notebook server.

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// IO error (bind, accept, thread spawn).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Host and port did not resolve to any address.
    #[error("Invalid address: {host}:{port}")]
    InvalidAddress { host: String, port: u16 },

    /// The server thread ended abnormally.
    #[error("Server runtime error: {0}")]
    Runtime(String),
}

impl From<ServerError> for lit_notebook::Error {
    fn from(e: ServerError) -> Self {
        lit_notebook::Error::server(e)
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
