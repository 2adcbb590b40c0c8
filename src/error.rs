/// Error handling module for stack-control.
///
/// This module defines the error types used throughout the library.
/// It provides a comprehensive set of errors that can occur when
/// supervising managed server processes, along with helpful context
/// for debugging.
///
/// # Example
///
/// ```
/// use stack_control::error::{Error, Result};
///
/// fn handle_error(result: Result<()>) {
///     match result {
///         Ok(_) => println!("Operation succeeded"),
///         Err(Error::ProcessNotFound(name)) => println!("Process '{}' is not part of the managed group", name),
///         Err(Error::CommandFailed(msg)) => println!("Control command failed: {}", msg),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
use thiserror::Error;

/// Errors that can occur in the stack-control library.
///
/// This enum represents all possible error types that can be returned from
/// operations in the library. Each variant includes context information to
/// help diagnose and handle the error appropriately.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to parse configuration from a file or string.
    ///
    /// This error occurs when:
    /// - The configuration JSON is malformed
    /// - Required fields are missing
    /// - Field types are incorrect
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration is valid JSON but contains invalid values.
    ///
    /// This error occurs when:
    /// - The process group is empty or larger than two processes
    /// - Two processes share a name
    /// - The stop order is not a permutation of the group's names
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Requested process was not found in the managed group.
    ///
    /// This error occurs when:
    /// - A process name is passed that doesn't exist in the configuration
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    /// A control command could not be launched.
    ///
    /// This error occurs when:
    /// - The executable doesn't exist or isn't executable
    /// - The OS refuses to spawn the process
    #[error("Failed to launch control command: {0}")]
    CommandFailed(String),

    /// Error reading a managed process's log file.
    ///
    /// This error occurs when:
    /// - The log file exists but cannot be opened
    /// - Reading the file fails mid-way
    #[error("Log read error: {0}")]
    LogRead(String),

    /// The control API could not be started.
    ///
    /// This error occurs when:
    /// - The bind address cannot be parsed or resolved
    /// - The listen socket cannot be bound
    #[error("API server error: {0}")]
    ApiServer(String),

    /// Any other error not covered by the above categories.
    ///
    /// This is a catch-all error for cases not explicitly handled elsewhere.
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for stack-control operations.
///
/// This is a convenience type alias for `std::result::Result` with the `Error` type
/// from this module. Use this throughout the library and in client code to handle
/// errors in a consistent way.
pub type Result<T> = std::result::Result<T, Error>;
