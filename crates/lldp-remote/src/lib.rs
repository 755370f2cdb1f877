//! Remote command execution for LLDP topology discovery.
//!
//! - [`shell`]: local `/bin/sh` execution with proper quoting
//! - [`transport`]: the [`RemoteExec`] trait, the ssh / wrapper-command
//!   [`ShellTransport`] and the connectivity [`probe`]
//! - [`error`]: error types for remote operations
//!
//! # Example
//!
//! ```ignore
//! use lldp_remote::{RemoteExec, ShellTransport};
//!
//! let transport = ShellTransport::with_command("juju ssh");
//! let chassis = transport.run("0", "lldpcli -f json show chassis details").await?;
//! ```

pub mod error;
pub mod shell;
pub mod transport;

pub use error::{RemoteError, RemoteResult};
pub use transport::{probe, split_server, ProbeResult, RemoteExec, ShellTransport};
