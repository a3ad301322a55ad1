//! The keyword facade: the operations a test step invokes.
//!
//! Each method maps one keyword. All of them resolve the target session
//! through the [`ConnectionRegistry`], translate driver failures into
//! the caller-visible [`Error`] taxonomy and emit report output through
//! the configured [`LogSink`]. Methods are plain `async fn`s; the
//! harness drives them one at a time.

use std::path::Path;

use serde_json::Value;

use crate::driver::{
    CommitOutcome, ConnectionProfile, DeviceType, DriverFactory, ReadMode, TransferDirection,
    TransferRequest, TransferResult,
};
use crate::error::{DriverError, Error, Result};
use crate::logging::{FacadeSink, HtmlLogger, LogSink};
use crate::registry::ConnectionRegistry;
use crate::template;

/// Map a connect-time driver failure into the caller-visible taxonomy.
fn connect_error(host: &str, err: DriverError) -> Error {
    match err {
        DriverError::Timeout(timeout) => Error::Timeout {
            operation: format!("connecting to device {host}"),
            timeout,
        },
        other => Error::Connection {
            host: host.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Map a command-time driver failure into the caller-visible taxonomy.
fn command_error(operation: &str, err: DriverError) -> Error {
    match err {
        DriverError::Timeout(timeout) => Error::Timeout {
            operation: operation.to_string(),
            timeout,
        },
        other => Error::Command(other.to_string()),
    }
}

/// The keyword layer.
///
/// Owns the registry, the HTML renderer and the driver factory used by
/// `open_connection`. One instance lives for the duration of a test
/// run.
pub struct Keywords {
    registry: ConnectionRegistry,
    html: HtmlLogger,
    sink: Box<dyn LogSink>,
    factory: Box<dyn DriverFactory>,
}

impl Keywords {
    /// Build the facade around a driver factory, logging through the
    /// `log` facade.
    pub fn new(factory: impl DriverFactory + 'static) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            html: HtmlLogger::new(),
            sink: Box::new(FacadeSink),
            factory: Box::new(factory),
        }
    }

    /// Replace the log sink, for harness adapters with their own
    /// report pipeline.
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// The underlying registry, for inspection.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Connect to a device and register the session, making it current.
    ///
    /// Returns the assigned 1-based index. The prompt is captured once
    /// here and reused as the session's display name in every rendered
    /// fragment.
    pub async fn open_connection(
        &mut self,
        profile: &ConnectionProfile,
        alias: Option<&str>,
    ) -> Result<usize> {
        self.sink
            .info(&format!("Connecting to {} ({})", profile.host, profile.device_type));

        let mut handle = self
            .factory
            .connect(profile)
            .await
            .map_err(|e| connect_error(&profile.host, e))?;
        let prompt = handle
            .find_prompt()
            .await
            .map_err(|e| connect_error(&profile.host, e))?;

        let index = self
            .registry
            .register(handle, prompt, alias.map(str::to_string))?;
        self.sink
            .info(&format!("Registered connection to {}", profile.host));
        self.sink
            .info(&format!("Alias: {} Index: {index}", alias.unwrap_or("-")));
        Ok(index)
    }

    /// Run one command on the current session and return `(host, output)`.
    async fn run(&mut self, command: &str, read: ReadMode) -> Result<(String, String)> {
        let record = self.registry.get(None)?;
        let host = record.initial_prompt().to_string();
        let output = record
            .handle_mut()
            .send_command(command, read)
            .await
            .map_err(|e| command_error(&format!("waiting for output of '{command}'"), e))?;
        Ok((host, output))
    }

    /// Run a command on the current connection and return its output.
    ///
    /// `timing` switches the read strategy to a fixed delay, for
    /// commands after which the device does not return to a
    /// recognizable prompt.
    pub async fn cli(&mut self, command: &str, timing: bool) -> Result<String> {
        self.sink.info(command);
        let read = if timing { ReadMode::Timing } else { ReadMode::Prompt };
        let (host, output) = self.run(command, read).await?;
        let fragment = self.html.cli(&host, command, &output)?;
        self.sink.html(&fragment);
        Ok(output)
    }

    /// Run a command, reading until `expect` matches instead of the
    /// prompt.
    pub async fn cli_expect(&mut self, command: &str, expect: &str) -> Result<String> {
        self.sink.info(command);
        let (host, output) = self
            .run(command, ReadMode::Expect(expect.to_string()))
            .await?;
        let fragment = self.html.cli(&host, command, &output)?;
        self.sink.html(&fragment);
        Ok(output)
    }

    /// Run a command and parse its output with a TextFSM template.
    ///
    /// A single matched record is returned directly; multiple records
    /// come back as a list, as does a single record when `force_list`
    /// is set. The rendered fragment shows the raw output, the template
    /// and the parsed variables side by side.
    #[cfg(feature = "textfsm")]
    pub async fn cli_ttp(
        &mut self,
        command: &str,
        template: &str,
        timing: bool,
        force_list: bool,
    ) -> Result<Value> {
        self.sink.info(command);
        let read = if timing { ReadMode::Timing } else { ReadMode::Prompt };
        let (host, output) = self.run(command, read).await?;

        let parsed = crate::parse::parse_text(&output, template, force_list)?;
        let fragment = self
            .html
            .cli_parse(&host, command, &output, template, &parsed)?;
        self.sink.html(&fragment);
        Ok(parsed)
    }

    /// Run a command and parse its output with a TextFSM template.
    ///
    /// This build was compiled without the `textfsm` feature, so the
    /// keyword always fails.
    #[cfg(not(feature = "textfsm"))]
    pub async fn cli_ttp(
        &mut self,
        _command: &str,
        _template: &str,
        _timing: bool,
        _force_list: bool,
    ) -> Result<Value> {
        Err(Error::Unsupported(
            "textfsm parsing (enable the `textfsm` feature)",
        ))
    }

    /// Run a command and decode its JSON form.
    ///
    /// The command is run twice: once as given, for the human-readable
    /// report, then with ` | json` appended for the decoded value.
    pub async fn cli_json(&mut self, command: &str, timing: bool) -> Result<Value> {
        self.cli(command, timing).await?;
        let raw = self.cli(&format!("{command} | json"), false).await?;
        let value = serde_json::from_str(raw.trim())?;
        Ok(value)
    }

    /// Push configuration lines to the current connection.
    ///
    /// On commit-required families the candidate is committed after the
    /// push. A rejected candidate on IOS XR is handled in place: the
    /// device's failure detail is fetched with `show configuration
    /// failed`, logged as an error and returned after the candidate is
    /// aborted, so the calling step can decide whether that is fatal.
    /// On other commit-required families a rejection fails the keyword.
    pub async fn push_config(&mut self, lines: &[String], cmd_verify: bool) -> Result<String> {
        self.sink.info(&lines.join("\n"));

        let record = self.registry.get(None)?;
        let device = record.device_type().clone();
        let output = record
            .handle_mut()
            .send_config_set(lines, cmd_verify)
            .await
            .map_err(|e| command_error("pushing configuration", e))?;
        self.sink.info(&output);

        if !device.requires_commit() {
            return Ok(output);
        }

        let record = self.registry.get(None)?;
        let outcome = record
            .handle_mut()
            .commit()
            .await
            .map_err(|e| command_error("committing configuration", e))?;
        match outcome {
            CommitOutcome::Applied => {
                record
                    .handle_mut()
                    .exit_config_mode()
                    .await
                    .map_err(|e| command_error("leaving configuration mode", e))?;
                Ok(output)
            }
            CommitOutcome::ValidationFailed(message) if device == DeviceType::CiscoXr => {
                let detail = record
                    .handle_mut()
                    .send_command("show configuration failed", ReadMode::Prompt)
                    .await
                    .map_err(|e| command_error("fetching commit failure detail", e))?;
                self.sink.error(&message);
                self.sink.error(&detail);
                record
                    .handle_mut()
                    .send_command("abort", ReadMode::Timing)
                    .await
                    .map_err(|e| command_error("aborting candidate configuration", e))?;
                Ok(detail)
            }
            CommitOutcome::ValidationFailed(message) => Err(Error::Command(message)),
        }
    }

    /// Render a configuration template against a structured data file
    /// and return the lines, ready for [`push_config`](Self::push_config).
    pub fn generate_config(&self, template_path: &Path, data_path: &Path) -> Result<Vec<String>> {
        template::generate_config(template_path, data_path)
    }

    /// Upload a local file to the current device's file system.
    ///
    /// Existing destination files are overwritten. The driver's
    /// transfer report is returned verbatim.
    pub async fn send_file(
        &mut self,
        source: &Path,
        file_system: &str,
        dest: &str,
    ) -> Result<TransferResult> {
        self.sink.info(&format!(
            "Transferring {} to {file_system}{dest}",
            source.display()
        ));
        let request = TransferRequest {
            source: source.to_path_buf(),
            file_system: file_system.to_string(),
            dest: dest.to_string(),
            direction: TransferDirection::Upload,
            overwrite: true,
        };
        let record = self.registry.get(None)?;
        let result = record
            .handle_mut()
            .transfer_file(&request)
            .await
            .map_err(|e| command_error("transferring file", e))?;
        self.sink.info(&format!("{result:?}"));
        Ok(result)
    }

    /// Clear interface counters, answering the confirmation prompt.
    pub async fn clear_counters(&mut self) -> Result<String> {
        self.sink.info("clear counters");
        let (host, first) = self
            .run("clear counters", ReadMode::Expect("confirm".to_string()))
            .await?;
        let (_, second) = self.run("\n", ReadMode::Expect("#".to_string())).await?;

        let output = format!("{first}{second}");
        let fragment = self.html.cli(&host, "clear counters", &output)?;
        self.sink.html(&fragment);
        Ok(output)
    }

    /// Merge a configuration file into an F5 device from the terminal.
    ///
    /// The file content is fed through `load sys config merge
    /// from-terminal` and terminated with Ctrl-D. Fails before touching
    /// the device when the current connection is not an F5.
    pub async fn f5_merge_config(&mut self, file: &Path) -> Result<String> {
        let record = self.registry.get(None)?;
        let device = record.device_type().clone();
        if !device.is_f5() {
            return Err(Error::Command(format!(
                "Merge from terminal requires an F5 device, current connection is '{device}'"
            )));
        }

        let content = tokio::fs::read_to_string(file).await?;
        self.sink
            .info(&format!("Merging configuration from {}", file.display()));

        self.run("load sys config merge from-terminal", ReadMode::Timing)
            .await?;
        self.run(&content, ReadMode::Timing).await?;
        self.run("\u{4}", ReadMode::Timing).await?;
        let (host, output) = self.run("\r", ReadMode::Prompt).await?;

        let fragment = self
            .html
            .cli(&host, "load sys config merge from-terminal", &output)?;
        self.sink.html(&fragment);
        Ok(output)
    }

    /// Close the current connection.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.registry.close_current().await?;
        Ok(())
    }

    /// Close every open connection.
    ///
    /// Individual disconnect failures are reported to the sink but
    /// never fail the keyword; it is teardown.
    pub async fn close_connections(&mut self) {
        for (index, err) in self.registry.close_all().await {
            self.sink
                .error(&format!("Failed to close connection {index}: {err}"));
        }
    }

    /// Switch the current connection by alias or 1-based index and
    /// return its index.
    pub async fn change_connection(&mut self, alias_or_index: &str) -> Result<usize> {
        let index = self.registry.switch(alias_or_index)?;
        self.sink
            .info(&format!("Switched to connection {index} ({alias_or_index})"));
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn connect_timeout_maps_to_timeout_kind() {
        let err = connect_error("r1", DriverError::Timeout(Duration::from_secs(9)));
        match err {
            Error::Timeout { operation, timeout } => {
                assert_eq!(operation, "connecting to device r1");
                assert_eq!(timeout, Duration::from_secs(9));
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[test]
    fn connect_refusal_maps_to_connection_kind() {
        let err = connect_error(
            "r1",
            DriverError::AuthenticationFailed {
                user: "admin".into(),
            },
        );
        match err {
            Error::Connection { host, reason } => {
                assert_eq!(host, "r1");
                assert!(reason.contains("admin"));
            }
            other => panic!("expected connection error, got {other}"),
        }
    }

    #[test]
    fn command_failures_keep_the_driver_detail() {
        let err = command_error(
            "pushing configuration",
            DriverError::CommandFailed("invalid input".into()),
        );
        match err {
            Error::Command(reason) => assert!(reason.contains("invalid input")),
            other => panic!("expected command error, got {other}"),
        }
    }
}
