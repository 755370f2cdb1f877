//! Configuration file support for lldp-topo
//!
//! Loads and validates lldp-topo configuration from TOML files. Every field
//! has a default, so an absent file is the same as an empty one. Command
//! line flags override what the file says.

use crate::error::{Result, TopoError};
use lldp_remote::transport::DEFAULT_SSH_COMMAND;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How commands reach the servers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// ssh invocation used when no alternate command is set
    #[serde(default = "default_ssh_command")]
    pub ssh_command: String,

    /// Alternate wrapper, e.g. `juju ssh`. Takes precedence over ssh_command.
    #[serde(default)]
    pub alt_command: Option<String>,

    /// Per-command timeout in seconds, 0 disables it
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

/// LLDP agent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LldpConfig {
    /// lldpcli binary on the remote side
    #[serde(default = "default_lldpcli")]
    pub lldpcli: String,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of servers queried at the same time
    #[serde(default = "default_parallel_hosts")]
    pub parallel_hosts: usize,
}

/// Complete lldp-topo configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopoConfig {
    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub lldp: LldpConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_ssh_command() -> String {
    DEFAULT_SSH_COMMAND.to_string()
}

fn default_command_timeout() -> u64 {
    60
}

fn default_lldpcli() -> String {
    "lldpcli".to_string()
}

fn default_parallel_hosts() -> usize {
    4
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ssh_command: default_ssh_command(),
            alt_command: None,
            command_timeout_secs: default_command_timeout(),
        }
    }
}

impl Default for LldpConfig {
    fn default() -> Self {
        Self {
            lldpcli: default_lldpcli(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_hosts: default_parallel_hosts(),
        }
    }
}

impl TopoConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TopoError::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            TopoError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// The wrapper command that will prefix every remote command
    pub fn transport_command(&self) -> &str {
        self.transport
            .alt_command
            .as_deref()
            .unwrap_or(&self.transport.ssh_command)
    }

    /// Per-command timeout, `None` when disabled
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.transport.command_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.transport_command().trim().is_empty() {
            return Err(TopoError::Configuration(
                "transport command must not be empty".to_string(),
            ));
        }

        if self.lldp.lldpcli.trim().is_empty() {
            return Err(TopoError::Configuration(
                "lldpcli must not be empty".to_string(),
            ));
        }

        if self.engine.parallel_hosts == 0 {
            return Err(TopoError::Configuration(
                "parallel_hosts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
