//! Edge row assembly.
//!
//! Pure and synchronous: all remote data for a host has been fetched before
//! [`assemble`] runs, and classification results come in through a closure.

use lldp_types::{CapabilityCode, InterfaceKind, MacAddress};

use crate::parser::{ChassisInfo, InterfaceRecord};

/// One local interface and its remote neighbor, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRow {
    pub local_host: String,
    pub local_chassis_id: Option<String>,
    pub local_caps: CapabilityCode,
    pub local_iface: String,
    pub local_kind: InterfaceKind,
    pub local_mac: Option<MacAddress>,
    pub remote_name: Option<String>,
    pub remote_chassis_id: Option<String>,
    pub remote_caps: CapabilityCode,
    pub remote_iface: Option<String>,
}

/// The host side of every row built for one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHost {
    pub name: String,
    pub chassis_id: Option<String>,
    pub caps: CapabilityCode,
}

impl LocalHost {
    /// Uses the chassis name when the agent reported one, `fallback_name`
    /// otherwise. The host is always known, so its code never contains `X`.
    pub fn new(chassis: Option<&ChassisInfo>, fallback_name: &str) -> Self {
        match chassis {
            Some(chassis) => Self {
                name: chassis
                    .name
                    .clone()
                    .unwrap_or_else(|| fallback_name.to_string()),
                chassis_id: chassis.id.clone(),
                caps: CapabilityCode::encode(&chassis.capabilities, true),
            },
            None => Self {
                name: fallback_name.to_string(),
                chassis_id: None,
                caps: CapabilityCode::encode(&[], true),
            },
        }
    }
}

/// Builds the rows of one host, in record order.
///
/// `classify` is called once per emitted row, never for records dropped by
/// `quick`.
pub fn assemble<F>(
    host: &LocalHost,
    records: &[InterfaceRecord],
    mut classify: F,
    quick: bool,
) -> Vec<EdgeRow>
where
    F: FnMut(&str) -> InterfaceKind,
{
    records
        .iter()
        .filter(|record| !quick || record.neighbor.is_some())
        .map(|record| {
            let neighbor = record.neighbor.as_ref();
            EdgeRow {
                local_host: host.name.clone(),
                local_chassis_id: host.chassis_id.clone(),
                local_caps: host.caps,
                local_iface: record.name.clone(),
                local_kind: classify(&record.name),
                local_mac: record.mac,
                remote_name: neighbor.and_then(|n| n.chassis.name.clone()),
                remote_chassis_id: neighbor.and_then(|n| n.chassis.id.clone()),
                remote_caps: CapabilityCode::encode(
                    neighbor.map(|n| n.chassis.capabilities.as_slice()).unwrap_or(&[]),
                    neighbor.is_some(),
                ),
                remote_iface: neighbor.and_then(|n| n.port.clone()),
            }
        })
        .collect()
}

/// Concatenates per-host blocks in the order given. No deduplication: two
/// hosts seeing the same switch port give two rows.
pub fn concat<I>(blocks: I) -> Vec<EdgeRow>
where
    I: IntoIterator<Item = Vec<EdgeRow>>,
{
    blocks.into_iter().flatten().collect()
}
