//! Local shell command execution.
//!
//! Every remote query ends up as a local `/bin/sh -c` invocation of the
//! transport command (`ssh`, `juju ssh`, ...) with the remote command quoted
//! as a single argument. Quoting happens here so the local shell never
//! interprets `||`, `$` or `;` meant for the remote side.
//!
//! ```ignore
//! use lldp_remote::shell::{run_local, shellquote};
//!
//! let line = format!("ssh ubuntu@server1 {}", shellquote("cat /sys/class/net/eno1/speed"));
//! let output = run_local(&line, None).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{RemoteError, RemoteResult};

/// Shell used for every local invocation.
pub const SH_CMD: &str = "/bin/sh";

/// Characters with a meaning inside double quotes: $ ` " \ and newline.
static DQUOTE_SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes `s` as one double-quoted shell word.
///
/// ```
/// use lldp_remote::shell::shellquote;
///
/// assert_eq!(shellquote("eno1"), "\"eno1\"");
/// assert_eq!(shellquote("echo $iface_type"), "\"echo \\$iface_type\"");
/// ```
pub fn shellquote(s: &str) -> String {
    format!("\"{}\"", DQUOTE_SPECIAL_RE.replace_all(s, r"\$1"))
}

/// What a finished local command left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// stdout with surrounding whitespace removed.
    pub stdout: String,
    /// stderr with surrounding whitespace removed.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Exit status, -1 for a signal.
    pub fn exit_code(&self) -> i32 {
        self.status.unwrap_or(-1)
    }

    /// Text worth showing when the command failed. ssh reports its own
    /// problems on stderr, so that wins over stdout.
    pub fn diagnostic(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Runs `line` through `/bin/sh -c`.
///
/// Any exit status is `Ok`; only a failed spawn or an elapsed `timeout` is
/// an error. The child is killed when the timeout elapses.
pub async fn run_local(line: &str, timeout: Option<Duration>) -> RemoteResult<CommandOutput> {
    trace!(command = %line, "Executing local command");

    let child = Command::new(SH_CMD)
        .arg("-c")
        .arg(line)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let finished = match timeout {
        Some(limit) => tokio::time::timeout(limit, child)
            .await
            .map_err(|_| RemoteError::Timeout {
                server: "localhost".to_string(),
                command: line.to_string(),
                secs: limit.as_secs(),
            })?,
        None => child.await,
    };
    let raw = finished.map_err(|source| RemoteError::Spawn {
        command: line.to_string(),
        source,
    })?;

    let output = CommandOutput {
        status: raw.status.code(),
        stdout: String::from_utf8_lossy(&raw.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&raw.stderr).trim().to_string(),
    };

    if !output.success() {
        debug!(
            command = %line,
            exit_code = output.exit_code(),
            stderr = %output.stderr,
            "Local command failed"
        );
    }
    Ok(output)
}
