//! Error types for lldp-topo

use lldp_remote::RemoteError;
use thiserror::Error;

/// Topology engine errors
///
/// Configuration problems, an empty server list and a run in which no
/// server could be reached are fatal; everything else is contained per
/// host by the engine.
#[derive(Error, Debug)]
pub enum TopoError {
    /// Remote query failed for one server
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Nothing to query
    #[error("No servers given")]
    NoServers,

    /// Every server failed its queries
    #[error("None of the {0} servers could be reached")]
    NoReachableServers(usize),

    /// Output could not be produced
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lldp-topo operations
pub type Result<T> = std::result::Result<T, TopoError>;
