//! Connection registry: alias/index bookkeeping for live sessions.
//!
//! Each registered session gets a stable 1-based index and, optionally,
//! a unique alias. At most one record is "current" at a time; command
//! keywords that omit an explicit target resolve through it.
//!
//! Index assignment is append-only: closing the current connection
//! leaves a tombstone at its position and the index is never handed to
//! another handle. Only [`close_all`](ConnectionRegistry::close_all)
//! empties the registry, after which numbering restarts at 1.

use std::collections::HashMap;

use log::{info, warn};

use crate::driver::{CliDriver, DeviceType};
use crate::error::{DriverError, RegistryError};

/// One registered session.
pub struct ConnectionRecord {
    index: usize,
    alias: Option<String>,
    handle: Box<dyn CliDriver>,
    initial_prompt: String,
}

impl std::fmt::Debug for ConnectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRecord")
            .field("index", &self.index)
            .field("alias", &self.alias)
            .field("initial_prompt", &self.initial_prompt)
            .finish_non_exhaustive()
    }
}

impl ConnectionRecord {
    /// Stable 1-based index assigned at registration.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Caller-chosen alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Prompt captured once at registration, used for display.
    pub fn initial_prompt(&self) -> &str {
        &self.initial_prompt
    }

    /// Device family of the live session.
    pub fn device_type(&self) -> &DeviceType {
        self.handle.device_type()
    }

    /// The live session handle.
    pub fn handle_mut(&mut self) -> &mut dyn CliDriver {
        self.handle.as_mut()
    }
}

/// Registry of live sessions, one per test run.
///
/// Shared mutable state with no locking discipline; safe only because
/// the surrounding harness drives execution as a single sequential
/// script.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Vec<Option<ConnectionRecord>>,
    aliases: HashMap<String, usize>,
    current: Option<usize>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not closed) connections.
    pub fn len(&self) -> usize {
        self.connections.iter().flatten().count()
    }

    /// True when no live connection is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a new session, making it current.
    ///
    /// Returns the assigned index. Fails without mutating the registry
    /// when `alias` is already bound to a live connection.
    pub fn register(
        &mut self,
        handle: Box<dyn CliDriver>,
        initial_prompt: String,
        alias: Option<String>,
    ) -> Result<usize, RegistryError> {
        if let Some(alias) = &alias {
            if self.aliases.contains_key(alias) {
                return Err(RegistryError::DuplicateAlias(alias.clone()));
            }
        }

        let slot = self.connections.len();
        let index = slot + 1;
        self.connections.push(Some(ConnectionRecord {
            index,
            alias: alias.clone(),
            handle,
            initial_prompt,
        }));
        if let Some(alias) = alias {
            self.aliases.insert(alias, slot);
        }
        self.current = Some(slot);
        Ok(index)
    }

    /// Resolve an alias or 1-based index to a slot. Alias lookup wins
    /// when a numeric alias shadows an index.
    fn resolve(&self, alias_or_index: &str) -> Option<usize> {
        if let Some(&slot) = self.aliases.get(alias_or_index) {
            return Some(slot);
        }
        let index: usize = alias_or_index.parse().ok()?;
        let slot = index.checked_sub(1)?;
        match self.connections.get(slot) {
            Some(Some(_)) => Some(slot),
            _ => None,
        }
    }

    /// Make the named connection current and return its index.
    pub fn switch(&mut self, alias_or_index: &str) -> Result<usize, RegistryError> {
        let slot = self
            .resolve(alias_or_index)
            .ok_or_else(|| RegistryError::NotFound(alias_or_index.to_string()))?;
        self.current = Some(slot);
        Ok(slot + 1)
    }

    /// Look up a connection without changing which one is current.
    ///
    /// `None` resolves to the current connection.
    pub fn get(
        &mut self,
        alias_or_index: Option<&str>,
    ) -> Result<&mut ConnectionRecord, RegistryError> {
        match alias_or_index {
            Some(key) => {
                let slot = self
                    .resolve(key)
                    .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
                self.connections[slot]
                    .as_mut()
                    .ok_or_else(|| RegistryError::NotFound(key.to_string()))
            }
            None => self.current_mut(),
        }
    }

    /// The current connection.
    pub fn current_mut(&mut self) -> Result<&mut ConnectionRecord, RegistryError> {
        let slot = self.current.ok_or(RegistryError::NoCurrent)?;
        self.connections[slot]
            .as_mut()
            .ok_or(RegistryError::NoCurrent)
    }

    /// Disconnect the current connection and remove it.
    ///
    /// The alias binding and current pointer are cleared even when the
    /// disconnect itself fails; the failure is then surfaced.
    pub async fn close_current(&mut self) -> Result<(), RegistryError> {
        let slot = self.current.ok_or(RegistryError::NoCurrent)?;
        let mut record = self.connections[slot]
            .take()
            .ok_or(RegistryError::NoCurrent)?;

        let disconnected = record.handle.disconnect().await;
        if let Some(alias) = &record.alias {
            self.aliases.remove(alias);
        }
        self.current = None;
        info!("Closed connection {} ({:?})", record.index, record.alias);

        if let Err(e) = disconnected {
            warn!("Disconnect of connection {} failed: {e}", record.index);
        }
        Ok(())
    }

    /// Disconnect every live connection, in registration order.
    ///
    /// A disconnect failure on one connection never prevents closing
    /// the remaining ones; failures are returned so the caller can
    /// report them. Afterwards the registry is empty and index
    /// numbering restarts at 1.
    pub async fn close_all(&mut self) -> Vec<(usize, DriverError)> {
        let mut failures = Vec::new();
        for mut record in self.connections.drain(..).flatten() {
            if let Err(e) = record.handle.disconnect().await {
                warn!("Disconnect of connection {} failed: {e}", record.index);
                failures.push((record.index, e));
            }
        }
        self.aliases.clear();
        self.current = None;
        failures
    }
}
