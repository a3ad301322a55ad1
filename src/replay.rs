//! Scripted driver for exercising keyword flows without a device.
//!
//! A [`ReplayDriver`] plays back canned command/output exchanges in
//! order and journals every call it receives, so a test can assert on
//! exactly what the keyword layer sent. A [`ReplayFactory`] hands out
//! prepared drivers (or scripted connect failures) to
//! [`Keywords::open_connection`](crate::keywords::Keywords::open_connection).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::driver::{
    CliDriver, CommitOutcome, ConnectionProfile, DeviceType, DriverFactory, ReadMode,
    TransferRequest, TransferResult,
};
use crate::error::DriverError;

/// One scripted command/output exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub command: String,
    pub output: String,
}

/// Everything a [`ReplayDriver`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayEvent {
    Command { command: String, read: ReadMode },
    ConfigSet { lines: Vec<String>, cmd_verify: bool },
    Commit,
    ExitConfigMode,
    Transfer { dest: String },
    Disconnect,
}

/// Shared view of a driver's journal, usable after the driver has been
/// handed to the registry.
#[derive(Clone, Default)]
pub struct ReplayJournal {
    events: Arc<Mutex<Vec<ReplayEvent>>>,
}

impl ReplayJournal {
    fn record(&self, event: ReplayEvent) {
        self.events.lock().expect("journal lock").push(event);
    }

    /// All recorded events, in call order.
    pub fn events(&self) -> Vec<ReplayEvent> {
        self.events.lock().expect("journal lock").clone()
    }

    /// Just the command strings, for quick order assertions.
    pub fn commands(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReplayEvent::Command { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }
}

/// Driver that replays a canned script.
pub struct ReplayDriver {
    device_type: DeviceType,
    prompt: String,
    exchanges: VecDeque<Exchange>,
    journal: ReplayJournal,
    commit_outcome: CommitOutcome,
    transfer_result: TransferResult,
    fail_disconnect: bool,
}

impl ReplayDriver {
    /// New driver with an empty script.
    pub fn new(device_type: DeviceType, prompt: impl Into<String>) -> Self {
        Self {
            device_type,
            prompt: prompt.into(),
            exchanges: VecDeque::new(),
            journal: ReplayJournal::default(),
            commit_outcome: CommitOutcome::Applied,
            transfer_result: TransferResult {
                file_exists: true,
                file_transferred: true,
                file_verified: true,
            },
            fail_disconnect: false,
        }
    }

    /// Append an expected command and the output to play back for it.
    pub fn expect_exchange(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.exchanges.push_back(Exchange {
            command: command.into(),
            output: output.into(),
        });
        self
    }

    /// Outcome the next `commit` call reports.
    pub fn with_commit_outcome(mut self, outcome: CommitOutcome) -> Self {
        self.commit_outcome = outcome;
        self
    }

    /// Result the next `transfer_file` call returns.
    pub fn with_transfer_result(mut self, result: TransferResult) -> Self {
        self.transfer_result = result;
        self
    }

    /// Make `disconnect` fail, for teardown-tolerance tests.
    pub fn with_disconnect_failure(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    /// Handle on this driver's journal. Clone it before the driver is
    /// moved into the registry.
    pub fn journal(&self) -> ReplayJournal {
        self.journal.clone()
    }

    fn next_output(&mut self, command: &str) -> Result<String, DriverError> {
        let exchange = self.exchanges.pop_front().ok_or_else(|| {
            DriverError::CommandFailed(format!("unscripted command: {command:?}"))
        })?;
        if exchange.command != command {
            return Err(DriverError::CommandFailed(format!(
                "expected command {:?}, got {command:?}",
                exchange.command
            )));
        }
        Ok(exchange.output)
    }
}

#[async_trait]
impl CliDriver for ReplayDriver {
    fn device_type(&self) -> &DeviceType {
        &self.device_type
    }

    async fn find_prompt(&mut self) -> Result<String, DriverError> {
        Ok(self.prompt.clone())
    }

    async fn send_command(
        &mut self,
        command: &str,
        read: ReadMode,
    ) -> Result<String, DriverError> {
        self.journal.record(ReplayEvent::Command {
            command: command.to_string(),
            read: read.clone(),
        });
        let output = self.next_output(command)?;

        // An expect pattern the scripted output never produces behaves
        // like the real thing: the read times out.
        if let ReadMode::Expect(pattern) = &read {
            let matcher = Regex::new(pattern)
                .map_err(|e| DriverError::CommandFailed(format!("bad expect pattern: {e}")))?;
            if !matcher.is_match(&output) {
                return Err(DriverError::Timeout(Duration::from_secs(10)));
            }
        }
        Ok(output)
    }

    async fn send_config_set(
        &mut self,
        lines: &[String],
        cmd_verify: bool,
    ) -> Result<String, DriverError> {
        self.journal.record(ReplayEvent::ConfigSet {
            lines: lines.to_vec(),
            cmd_verify,
        });
        Ok(lines.join("\n"))
    }

    async fn commit(&mut self) -> Result<CommitOutcome, DriverError> {
        self.journal.record(ReplayEvent::Commit);
        Ok(self.commit_outcome.clone())
    }

    async fn exit_config_mode(&mut self) -> Result<String, DriverError> {
        self.journal.record(ReplayEvent::ExitConfigMode);
        Ok(self.prompt.clone())
    }

    async fn transfer_file(
        &mut self,
        request: &TransferRequest,
    ) -> Result<TransferResult, DriverError> {
        self.journal.record(ReplayEvent::Transfer {
            dest: request.dest.clone(),
        });
        Ok(self.transfer_result.clone())
    }

    async fn disconnect(&mut self) -> Result<(), DriverError> {
        self.journal.record(ReplayEvent::Disconnect);
        if self.fail_disconnect {
            Err(DriverError::Disconnected)
        } else {
            Ok(())
        }
    }
}

enum ConnectOutcome {
    Session(ReplayDriver),
    Refused(String),
    TimedOut(Duration),
}

/// Factory handing out prepared sessions in order.
#[derive(Default)]
pub struct ReplayFactory {
    outcomes: Mutex<VecDeque<ConnectOutcome>>,
}

impl ReplayFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a prepared session for the next `connect`.
    pub fn with_session(self, driver: ReplayDriver) -> Self {
        self.outcomes
            .lock()
            .expect("factory lock")
            .push_back(ConnectOutcome::Session(driver));
        self
    }

    /// Queue a connect refusal.
    pub fn with_refusal(self, reason: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .expect("factory lock")
            .push_back(ConnectOutcome::Refused(reason.into()));
        self
    }

    /// Queue a connect timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.outcomes
            .lock()
            .expect("factory lock")
            .push_back(ConnectOutcome::TimedOut(timeout));
        self
    }
}

#[async_trait]
impl DriverFactory for ReplayFactory {
    async fn connect(
        &self,
        profile: &ConnectionProfile,
    ) -> Result<Box<dyn CliDriver>, DriverError> {
        let outcome = self
            .outcomes
            .lock()
            .expect("factory lock")
            .pop_front()
            .ok_or_else(|| DriverError::ConnectionFailed {
                host: profile.host.clone(),
                port: profile.port,
                reason: "no scripted session left".to_string(),
            })?;

        match outcome {
            ConnectOutcome::Session(driver) => Ok(Box::new(driver)),
            ConnectOutcome::Refused(reason) => Err(DriverError::ConnectionFailed {
                host: profile.host.clone(),
                port: profile.port,
                reason,
            }),
            ConnectOutcome::TimedOut(timeout) => Err(DriverError::Timeout(timeout)),
        }
    }
}
