//! Tabular reports built from edge rows and interface listings.
//!
//! A [`Table`] holds one optional string per cell. Absence stays absent
//! here; the renderers decide how it looks.

use lldp_types::{InterfaceKind, PfInfo};
use serde::Serialize;

use crate::assembler::EdgeRow;
use crate::topology::InterfaceReport;

/// Columns of the `get-topology` report.
pub const TOPOLOGY_HEADERS: [&str; 11] = [
    "Edge 1",
    "ChassisID 1",
    "BRWS 1",
    "Iface 1",
    "Iface 1 Type",
    "Iface 1 Extra",
    "MAC 1",
    "Edge 2",
    "ChassisID 2",
    "BRWS 2",
    "Iface 2",
];

/// Columns of the `list-interfaces` report.
pub const INTERFACE_HEADERS: [&str; 11] = [
    "Server",
    "Iface",
    "Type",
    "Device ID",
    "Device Name",
    "Vendor ID",
    "Vendor Name",
    "Numa ID",
    "Speed",
    "Oper State",
    "Num VFs",
];

/// Cell shown when extra details were not requested or do not apply.
pub const EXTRA_NOT_APPLICABLE: &str = "N/A";

const UNKNOWN_VENDOR: &str = "UNKNOWN VENDOR";
const UNKNOWN_VENDOR_ID: &str = "UNKNOWN VENDOR ID";
const UNKNOWN_DEVICE: &str = "UNKNOWN DEVICE";
const UNKNOWN_DEVICE_ID: &str = "UNKNOWN DEVICE ID";
const UNKNOWN_SPEED: &str = "UNKNOWN SPEED";
const UNKNOWN_NUMVFS: &str = "UNKNOWN NUMVFS";
const UNKNOWN_NUMA: &str = "UNKNOWN NUMA";

/// Header row plus data rows of optional cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Option<String>>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Builds the `get-topology` report.
pub fn topology_table(rows: &[EdgeRow]) -> Table {
    let mut table = Table::new(&TOPOLOGY_HEADERS);
    for row in rows {
        table.push(vec![
            Some(row.local_host.clone()),
            row.local_chassis_id.clone(),
            Some(row.local_caps.to_string()),
            Some(row.local_iface.clone()),
            row.local_kind.label().map(str::to_string),
            Some(extra_cell(&row.local_kind)),
            row.local_mac.map(|mac| mac.to_string()),
            row.remote_name.clone(),
            row.remote_chassis_id.clone(),
            Some(row.remote_caps.to_string()),
            row.remote_iface.clone(),
        ]);
    }
    table
}

/// Builds the `list-interfaces` report. Only physical functions are listed.
pub fn interface_table(reports: &[InterfaceReport]) -> Table {
    let mut table = Table::new(&INTERFACE_HEADERS);
    for report in reports {
        let InterfaceKind::Pf(info) = &report.kind else {
            continue;
        };
        let info = info.as_deref().cloned().unwrap_or_default();
        table.push(vec![
            Some(report.server.clone()),
            Some(report.iface.clone()),
            report.kind.label().map(str::to_string),
            Some(or_label(&info.device_id, UNKNOWN_DEVICE_ID)),
            Some(or_label(&info.device_name, UNKNOWN_DEVICE)),
            Some(or_label(&info.vendor_id, UNKNOWN_VENDOR_ID)),
            Some(or_label(&info.vendor_name, UNKNOWN_VENDOR)),
            Some(
                info.numa_node
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| UNKNOWN_NUMA.to_string()),
            ),
            Some(speed(&info)),
            Some(info.oper_state.to_string()),
            Some(num_vfs(&info)),
        ]);
    }
    table
}

/// Flattens PF details into one comma-joined cell:
/// `vendor name,vendor id,device name,device id,speed,operstate,num vfs`.
pub fn extra_cell(kind: &InterfaceKind) -> String {
    match kind.pf_info() {
        Some(info) => [
            or_label(&info.vendor_name, UNKNOWN_VENDOR),
            or_label(&info.vendor_id, UNKNOWN_VENDOR_ID),
            or_label(&info.device_name, UNKNOWN_DEVICE),
            or_label(&info.device_id, UNKNOWN_DEVICE_ID),
            speed(info),
            info.oper_state.to_string(),
            num_vfs(info),
        ]
        .join(","),
        None => EXTRA_NOT_APPLICABLE.to_string(),
    }
}

fn or_label(value: &Option<String>, label: &str) -> String {
    value.clone().unwrap_or_else(|| label.to_string())
}

fn speed(info: &PfInfo) -> String {
    info.speed_mbps
        .map(|s| s.to_string())
        .unwrap_or_else(|| UNKNOWN_SPEED.to_string())
}

fn num_vfs(info: &PfInfo) -> String {
    info.num_vfs
        .map(|n| n.to_string())
        .unwrap_or_else(|| UNKNOWN_NUMVFS.to_string())
}
