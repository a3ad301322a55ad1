//! Error types for netharness.

use std::time::Duration;

use thiserror::Error;

/// Caller-visible error taxonomy for the keyword layer.
///
/// The four primary kinds — [`Connection`](Error::Connection),
/// [`Timeout`](Error::Timeout), [`Command`](Error::Command) and
/// [`Parse`](Error::Parse) — are what a test step can distinguish in its
/// report. The remaining variants cover registry bookkeeping and the
/// delegated template engines. Every error is terminal for the current
/// test step; nothing in this layer retries.
#[derive(Error, Debug)]
pub enum Error {
    /// Could not establish a session to the device.
    #[error("Unable to connect to device [{host}]: {reason}")]
    Connection { host: String, reason: String },

    /// A connect or command operation exceeded its deadline.
    #[error("Timed out after {timeout:?} while {operation}")]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// A command or configuration push failed for any other reason.
    #[error("Command failed: {0}")]
    Command(String),

    /// Template-based parsing matched zero variables.
    ///
    /// Carries the original text and template so the failure can be
    /// diagnosed from the test report alone.
    #[error(
        "Unable to parse text using the provided template.\n\
         Text:\n{text}\n\n\
         Tried to parse text using:\n\n{template}\n\
         Please validate the CLI command is returning the correct text \
         and that your template is accurate."
    )]
    Parse { text: String, template: String },

    /// Connection registry bookkeeping failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration template rendering failed.
    #[error("Template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    /// The structured data file could not be loaded.
    #[error("Failed to load data file: {0}")]
    DataFile(#[from] serde_yaml::Error),

    /// Command output was not valid JSON.
    #[error("Invalid JSON in command output: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation needs a capability this build was compiled without.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Errors signaled by the delegated CLI driver.
///
/// The keyword layer depends on connect-time and timeout failures being
/// distinguishable from ordinary command failures; everything else is
/// wrapped as [`CommandFailed`](DriverError::CommandFailed) at the
/// facade boundary.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Failed to reach the device at the network level.
    #[error("Connection failed to {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    /// The device rejected the supplied credentials.
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The operation did not complete within its deadline.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Command execution failed.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The session was closed underneath us.
    #[error("Connection disconnected")]
    Disconnected,
}

/// Connection registry errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The alias is already bound to a live connection.
    #[error("Alias '{0}' is already in use")]
    DuplicateAlias(String),

    /// No live connection matches the given alias or index.
    #[error("Non-existing index or alias '{0}'")]
    NotFound(String),

    /// An operation needed the current connection but none is set.
    #[error("No open connection.")]
    NoCurrent,
}

/// Result type alias using the keyword layer's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
