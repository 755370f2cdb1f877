//! Local interface classification types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operational state of a network interface as reported by
/// `/sys/class/net/<iface>/operstate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperState {
    /// Interface is operationally up.
    Up,
    /// Interface is operationally down.
    Down,
    /// Kernel could not determine the state, or the read failed.
    #[default]
    Unknown,
}

impl OperState {
    /// Maps a raw sysfs value. Kernel states other than up/down
    /// (dormant, lowerlayerdown, testing, notpresent) collapse to `Unknown`.
    pub fn from_sysfs(raw: &str) -> Self {
        raw.parse().unwrap_or(OperState::Unknown)
    }
}

impl fmt::Display for OperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperState::Up => write!(f, "up"),
            OperState::Down => write!(f, "down"),
            OperState::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for OperState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(OperState::Up),
            "down" => Ok(OperState::Down),
            "unknown" => Ok(OperState::Unknown),
            _ => Err(ParseError::InvalidOperState(s.to_string())),
        }
    }
}

/// Physical-layer details of a physical function.
///
/// Every field degrades independently: `None` means that one value could
/// not be resolved on the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PfInfo {
    /// Vendor name resolved from the PCI vendor id.
    pub vendor_name: Option<String>,
    /// PCI vendor id as read from sysfs (e.g. `0x8086`).
    pub vendor_id: Option<String>,
    /// Device model name resolved from the PCI device id.
    pub device_name: Option<String>,
    /// PCI device id as read from sysfs (e.g. `0x10fb`).
    pub device_id: Option<String>,
    /// Negotiated link speed in Mb/s.
    pub speed_mbps: Option<u32>,
    pub oper_state: OperState,
    /// NUMA node the device hangs off.
    pub numa_node: Option<i32>,
    /// Number of SR-IOV virtual functions currently enabled.
    pub num_vfs: Option<u32>,
}

/// Classification of a local interface.
///
/// Physical-layer details exist only for physical functions, and the type
/// says so: there is no way to attach a [`PfInfo`] to a VF or a VLAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "extra", rename_all = "lowercase")]
pub enum InterfaceKind {
    /// Physical function. Details are `None` when they were not requested.
    Pf(Option<Box<PfInfo>>),
    /// SR-IOV virtual function.
    Vf,
    /// VLAN sub-interface.
    Vlan,
    /// Not classified, either skipped or the probe failed.
    #[default]
    Unknown,
}

impl InterfaceKind {
    /// Short type label (`pf`, `vf`, `vlan`), `None` when unknown.
    pub const fn label(&self) -> Option<&'static str> {
        match self {
            InterfaceKind::Pf(_) => Some("pf"),
            InterfaceKind::Vf => Some("vf"),
            InterfaceKind::Vlan => Some("vlan"),
            InterfaceKind::Unknown => None,
        }
    }

    /// Physical-layer details, present only for a resolved PF.
    pub fn pf_info(&self) -> Option<&PfInfo> {
        match self {
            InterfaceKind::Pf(info) => info.as_deref(),
            _ => None,
        }
    }
}
