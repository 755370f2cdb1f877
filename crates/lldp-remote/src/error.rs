//! Error types for remote command execution.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use std::io;
use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while running a command on a server.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Failed to spawn the local process (ssh binary missing, fork failure).
    #[error("Failed to execute command '{command}': {source}")]
    Spawn {
        /// The full local command line.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Command returned a non-zero exit code.
    #[error("Command failed on {server}: '{command}' (exit code {exit_code}): {output}")]
    CommandFailed {
        /// Server the command was sent to.
        server: String,
        /// The remote command.
        command: String,
        /// The exit code (255 from ssh usually means the connection failed).
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// Command did not finish within the configured timeout.
    #[error("Command timed out on {server} after {secs}s: '{command}'")]
    Timeout {
        server: String,
        command: String,
        secs: u64,
    },

    /// Server spec could not be used.
    #[error("Invalid server '{server}': {message}")]
    InvalidServer {
        /// The server spec as given by the user.
        server: String,
        /// Error message.
        message: String,
    },
}

impl RemoteError {
    /// Creates an invalid server error.
    pub fn invalid_server(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidServer {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    ///
    /// Nothing in this workspace retries; callers wrapping a transport may.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Timeout { .. } => true,
            // ssh reports connection-level failures as 255
            RemoteError::CommandFailed { exit_code, .. } => *exit_code == 255,
            _ => false,
        }
    }
}
