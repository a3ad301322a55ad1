//! Connection profile handed to the driver factory.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::DeviceType;

/// Everything the driver needs to establish one session.
///
/// Built from keyword arguments with the defaults the keyword surface
/// documents: 120 second timeout, port 22, verbose session output.
/// The password is held as a [`SecretString`] so it never appears in
/// debug output or logs.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Device family, which drives commit and merge behavior.
    pub device_type: DeviceType,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: SecretString,

    /// Connect and command deadline.
    pub timeout: Duration,

    /// Echo session traffic into the driver's own log.
    pub verbose: bool,

    /// Optional path for the driver's session transcript.
    pub session_log: Option<PathBuf>,

    /// SSH port.
    pub port: u16,
}

impl ConnectionProfile {
    /// Create a profile with the documented defaults.
    pub fn new(
        host: impl Into<String>,
        device_type: DeviceType,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            device_type,
            username: username.into(),
            password: SecretString::from(password.into()),
            timeout: Duration::from_secs(120),
            verbose: true,
            session_log: None,
            port: 22,
        }
    }

    /// Set the connect and command deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the SSH port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Suppress session echo.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Write the driver's session transcript to the given path.
    pub fn with_session_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_log = Some(path.into());
        self
    }

    /// Socket address string for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_keyword_surface() {
        let profile = ConnectionProfile::new(
            "10.0.0.1",
            DeviceType::CiscoNxos,
            "admin",
            "secret",
        );
        assert_eq!(profile.timeout, Duration::from_secs(120));
        assert_eq!(profile.port, 22);
        assert!(profile.verbose);
        assert!(profile.session_log.is_none());
        assert_eq!(profile.socket_addr(), "10.0.0.1:22");
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let profile = ConnectionProfile::new(
            "10.0.0.1",
            DeviceType::Junos,
            "admin",
            "hunter2",
        );
        let debug = format!("{profile:?}");
        assert!(!debug.contains("hunter2"));
    }
}
