//! Common types for LLDP topology discovery.
//!
//! This crate provides type-safe representations of the primitives shared
//! by the topology engine and its renderers:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`Capability`] and [`CapabilityCode`]: LLDP system capabilities and
//!   their fixed 4-character positional summary
//! - [`InterfaceKind`] and [`PfInfo`]: physical/virtual/VLAN classification
//!   of a local interface
//! - [`OperState`]: operational state reported by the kernel

mod capability;
mod iface;
mod mac;

pub use capability::{Capability, CapabilityCode};
pub use iface::{InterfaceKind, OperState, PfInfo};
pub use mac::MacAddress;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid capability: {0}")]
    InvalidCapability(String),

    #[error("invalid operational state: {0}")]
    InvalidOperState(String),
}
