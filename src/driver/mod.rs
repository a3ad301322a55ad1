//! The consumed interface of the delegated CLI automation library.
//!
//! Nothing in this crate talks to a device directly. Connecting,
//! authenticating, prompt detection, configuration mode and file
//! transfer all belong to an external driver; this module models the
//! slice of its surface the keyword layer consumes, as object-safe
//! async traits so a production driver or a scripted replay can be
//! injected interchangeably.

mod device_type;
mod profile;

pub use device_type::DeviceType;
pub use profile::ConnectionProfile;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// How a command's response should be read from the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReadMode {
    /// Wait for the device prompt pattern (the default).
    #[default]
    Prompt,

    /// Fixed-delay read, for devices that do not return a recognizable
    /// prompt after the command.
    Timing,

    /// Wait for a caller-supplied pattern instead of the prompt.
    Expect(String),
}

/// Typed outcome of a configuration commit.
///
/// A rejected candidate configuration is an expected, recoverable
/// condition on commit-required devices, so it is modeled as a value
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The commit applied cleanly.
    Applied,

    /// The device rejected the candidate configuration. The payload is
    /// the device's validation message.
    ValidationFailed(String),
}

/// Direction of a file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

/// A file transfer request handed to the driver.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Local file, including path.
    pub source: PathBuf,

    /// Remote file system the transfer targets (e.g. `bootflash:`).
    pub file_system: String,

    /// Full destination path and filename on the device.
    pub dest: String,

    pub direction: TransferDirection,

    /// Overwrite an existing destination file.
    pub overwrite: bool,
}

/// Result of a file transfer, returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    /// Destination file exists after the transfer.
    pub file_exists: bool,

    /// The file was actually copied (false when it already matched).
    pub file_transferred: bool,

    /// The destination contents were verified against the source.
    pub file_verified: bool,
}

/// One live CLI session to a device.
///
/// A handle is exclusively owned by its registry slot; the registry is
/// the sole entity responsible for closing it.
#[async_trait]
pub trait CliDriver: Send {
    /// Device family of this session.
    fn device_type(&self) -> &DeviceType;

    /// Capture the device prompt.
    async fn find_prompt(&mut self) -> Result<String, DriverError>;

    /// Send a single command and return its output.
    async fn send_command(
        &mut self,
        command: &str,
        read: ReadMode,
    ) -> Result<String, DriverError>;

    /// Send a batch of configuration lines in configuration mode.
    async fn send_config_set(
        &mut self,
        lines: &[String],
        cmd_verify: bool,
    ) -> Result<String, DriverError>;

    /// Commit the candidate configuration.
    async fn commit(&mut self) -> Result<CommitOutcome, DriverError>;

    /// Leave configuration mode.
    async fn exit_config_mode(&mut self) -> Result<String, DriverError>;

    /// Transfer a file to or from the device.
    async fn transfer_file(
        &mut self,
        request: &TransferRequest,
    ) -> Result<TransferResult, DriverError>;

    /// Tear down the session.
    async fn disconnect(&mut self) -> Result<(), DriverError>;
}

/// Establishes live sessions from a connection profile.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Connect and authenticate, returning a ready session.
    async fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn CliDriver>, DriverError>;
}
