//! Transports that run commands on a server.
//!
//! [`RemoteExec`] is the seam between the topology engine and the outside
//! world. [`ShellTransport`] is the production implementation: it prefixes
//! every command with `ssh <server>` or with a user-supplied wrapper such as
//! `juju ssh`.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{RemoteError, RemoteResult};
use crate::shell::{self, shellquote};

/// Default ssh invocation. `BatchMode` makes a missing key fail fast
/// instead of prompting.
pub const DEFAULT_SSH_COMMAND: &str = "ssh -o BatchMode=yes -o StrictHostKeyChecking=accept-new";

/// Command used to check that the transport reaches the server.
pub const PROBE_REACHABLE_CMD: &str = "echo";

/// Runs commands on servers.
#[async_trait]
pub trait RemoteExec: Send + Sync {
    /// Runs one command on `server` and returns its trimmed stdout.
    ///
    /// A non-zero exit status is an error.
    async fn run(&self, server: &str, command: &str) -> RemoteResult<String>;

    /// Runs a list of commands, stopping at the first failure.
    async fn run_batch(&self, server: &str, commands: &[String]) -> RemoteResult<Vec<String>> {
        let mut answers = Vec::with_capacity(commands.len());
        for command in commands {
            answers.push(self.run(server, command).await?);
        }
        Ok(answers)
    }
}

/// Splits a `user@host` spec. The user part is optional.
pub fn split_server(server: &str) -> RemoteResult<(Option<&str>, &str)> {
    let server = server.trim();
    let (user, host) = match server.split_once('@') {
        Some((user, host)) => (Some(user), host),
        None => (None, server),
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(RemoteError::invalid_server(server, "expected user@host"));
    }
    if user.is_some_and(str::is_empty) {
        return Err(RemoteError::invalid_server(server, "empty user name"));
    }
    Ok((user, host))
}

/// Runs commands through a local wrapper command line.
#[derive(Debug, Clone)]
pub struct ShellTransport {
    prefix: String,
    timeout: Option<Duration>,
}

impl ShellTransport {
    /// Plain ssh transport using [`DEFAULT_SSH_COMMAND`].
    pub fn ssh() -> Self {
        Self::with_command(DEFAULT_SSH_COMMAND)
    }

    /// Uses `command` as the prefix, e.g. `juju ssh` or `ssh -J bastion`.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            prefix: command.into(),
            timeout: None,
        }
    }

    /// Kills commands that run longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the local command line for one remote command.
    pub fn command_line(&self, server: &str, command: &str) -> String {
        format!("{} {} {}", self.prefix, shellquote(server), shellquote(command))
    }
}

#[async_trait]
impl RemoteExec for ShellTransport {
    async fn run(&self, server: &str, command: &str) -> RemoteResult<String> {
        split_server(server)?;
        let line = self.command_line(server, command);
        debug!(server = %server, command = %command, "Running remote command");

        let result = shell::run_local(&line, self.timeout).await.map_err(|e| match e {
            RemoteError::Timeout { secs, .. } => RemoteError::Timeout {
                server: server.to_string(),
                command: command.to_string(),
                secs,
            },
            other => other,
        })?;

        if result.success() {
            Ok(result.stdout)
        } else {
            Err(RemoteError::CommandFailed {
                server: server.to_string(),
                command: command.to_string(),
                exit_code: result.exit_code(),
                output: result.diagnostic().to_string(),
            })
        }
    }
}

/// Connectivity test outcome for one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeResult {
    /// Transport reached the server.
    pub reachable: bool,
    /// The LLDP agent answered a query.
    pub lldp_responsive: bool,
}

impl ProbeResult {
    pub fn passed(&self) -> bool {
        self.reachable && self.lldp_responsive
    }
}

/// Checks that `server` is reachable and that `lldp_command` succeeds there.
///
/// The LLDP query is only attempted on a reachable server.
pub async fn probe<T>(transport: &T, server: &str, lldp_command: &str) -> ProbeResult
where
    T: RemoteExec + ?Sized,
{
    let mut result = ProbeResult::default();

    match transport.run(server, PROBE_REACHABLE_CMD).await {
        Ok(_) => result.reachable = true,
        Err(e) => {
            warn!(server = %server, error = %e, "Server not reachable");
            return result;
        }
    }

    match transport.run(server, lldp_command).await {
        Ok(_) => result.lldp_responsive = true,
        Err(e) => warn!(server = %server, error = %e, "LLDP agent not responding"),
    }

    info!(
        server = %server,
        reachable = result.reachable,
        lldp_responsive = result.lldp_responsive,
        "Probe finished"
    );
    result
}
