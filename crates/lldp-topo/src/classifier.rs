//! Interface classification (physical function, virtual function, VLAN).
//!
//! How an interface is recognised is a [`ClassifyPolicy`]: the policy builds
//! one probe command and decides from its output. [`SysfsPolicy`] is the
//! default and looks at the kernel's sysfs/procfs view of the interface.
//!
//! For physical functions in [`ClassifyMode::Full`] the classifier then
//! reads one sysfs attribute per command, so each field degrades on its own
//! when a read fails.

use lldp_remote::shell::shellquote;
use lldp_remote::RemoteExec;
use lldp_types::{InterfaceKind, OperState, PfInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::pci_ids;

/// How much to find out about each interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyMode {
    /// Issue no queries; every interface is `Unknown`.
    Skip,
    /// Determine pf/vf/vlan only.
    #[default]
    Kind,
    /// Also resolve vendor, device, speed and state of physical functions.
    Full,
}

/// Pluggable pf/vf/vlan decision.
pub trait ClassifyPolicy: Send + Sync {
    /// Command run on the host to gather evidence about `iface`.
    fn probe_command(&self, iface: &str) -> String;

    /// Decides the kind from the probe output. A PF is returned without
    /// details; the classifier fills them in.
    fn decide(&self, iface: &str, probe_output: &str) -> InterfaceKind;
}

/// Marker printed when `/sys/class/net/<if>/device` exists.
const MARK_DEVICE: &str = "device";
/// Marker printed when the device is an SR-IOV VF (has a `physfn` link).
const MARK_PHYSFN: &str = "physfn";
/// Marker printed when the 8021q module knows the interface.
const MARK_VLAN: &str = "vlan";

/// `eno1.100`, `bond0.42`, `vlan100`
static VLAN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:.+\.\d{1,4}|vlan\d{1,4})$").expect("Invalid regex pattern"));

/// Decides from sysfs: VLAN first, then VF, then PF.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysfsPolicy;

impl ClassifyPolicy for SysfsPolicy {
    fn probe_command(&self, iface: &str) -> String {
        let q = shellquote(iface);
        format!(
            "d=/sys/class/net/{q}; \
             [ -e \"$d/device\" ] && echo {MARK_DEVICE}; \
             [ -e \"$d/device/physfn\" ] && echo {MARK_PHYSFN}; \
             [ -e /proc/net/vlan/{q} ] && echo {MARK_VLAN}; \
             true"
        )
    }

    fn decide(&self, iface: &str, probe_output: &str) -> InterfaceKind {
        let marks: HashSet<&str> = probe_output.split_whitespace().collect();

        if marks.contains(MARK_VLAN) || VLAN_NAME_RE.is_match(iface) {
            InterfaceKind::Vlan
        } else if marks.contains(MARK_PHYSFN) {
            InterfaceKind::Vf
        } else if marks.contains(MARK_DEVICE) {
            InterfaceKind::Pf(None)
        } else {
            InterfaceKind::Unknown
        }
    }
}

/// sysfs attribute reads for a physical function, in [`PfInfo`] order.
pub fn pf_info_commands(iface: &str) -> [String; 6] {
    let d = format!("/sys/class/net/{}", shellquote(iface));
    [
        format!("cat {d}/device/vendor"),
        format!("cat {d}/device/device"),
        format!("cat {d}/speed"),
        format!("cat {d}/operstate"),
        format!("cat {d}/device/numa_node"),
        format!("cat {d}/device/sriov_numvfs"),
    ]
}

/// Builds [`PfInfo`] from the six attribute reads; `None` entries are
/// failed reads.
pub fn pf_info_from_reads(reads: [Option<String>; 6]) -> PfInfo {
    let [vendor_id, device_id, speed, operstate, numa, numvfs] = reads;
    let vendor_id = vendor_id.as_deref().and_then(pci_ids::normalize_id);
    let device_id = device_id.as_deref().and_then(pci_ids::normalize_id);

    PfInfo {
        vendor_name: vendor_id
            .as_deref()
            .and_then(pci_ids::vendor_name)
            .map(str::to_string),
        device_name: match (&vendor_id, &device_id) {
            (Some(v), Some(d)) => pci_ids::device_name(v, d).map(str::to_string),
            _ => None,
        },
        vendor_id,
        device_id,
        // The kernel reports -1 while the link is down
        speed_mbps: speed.and_then(|s| s.trim().parse().ok()),
        oper_state: operstate
            .as_deref()
            .map(OperState::from_sysfs)
            .unwrap_or_default(),
        numa_node: numa.and_then(|s| s.trim().parse().ok()),
        num_vfs: numvfs.and_then(|s| s.trim().parse().ok()),
    }
}

/// Classifies interfaces of one host through a [`RemoteExec`].
pub struct Classifier<T: RemoteExec + ?Sized> {
    transport: Arc<T>,
    policy: Arc<dyn ClassifyPolicy>,
    mode: ClassifyMode,
}

impl<T: RemoteExec + ?Sized> Clone for Classifier<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            policy: Arc::clone(&self.policy),
            mode: self.mode,
        }
    }
}

impl<T: RemoteExec + ?Sized> Classifier<T> {
    pub fn new(transport: Arc<T>, policy: Arc<dyn ClassifyPolicy>, mode: ClassifyMode) -> Self {
        Self {
            transport,
            policy,
            mode,
        }
    }

    /// Classifies `iface` on `server`.
    ///
    /// Never fails: an unreachable host or a failed probe gives `Unknown`.
    pub async fn classify(&self, server: &str, iface: &str) -> InterfaceKind {
        if self.mode == ClassifyMode::Skip {
            return InterfaceKind::Unknown;
        }

        let probe = self.policy.probe_command(iface);
        let output = match self.transport.run(server, &probe).await {
            Ok(output) => output,
            Err(e) => {
                warn!(server = %server, iface = %iface, error = %e, "Interface probe failed");
                return InterfaceKind::Unknown;
            }
        };

        let kind = self.policy.decide(iface, &output);
        debug!(server = %server, iface = %iface, kind = ?kind.label(), "Classified interface");

        match kind {
            InterfaceKind::Pf(_) if self.mode == ClassifyMode::Full => {
                InterfaceKind::Pf(Some(Box::new(self.pf_info(server, iface).await)))
            }
            other => other,
        }
    }

    async fn pf_info(&self, server: &str, iface: &str) -> PfInfo {
        let mut reads: [Option<String>; 6] = Default::default();
        for (slot, command) in reads.iter_mut().zip(pf_info_commands(iface)) {
            *slot = match self.transport.run(server, &command).await {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!(server = %server, iface = %iface, error = %e, "sysfs read failed");
                    None
                }
            };
        }
        pf_info_from_reads(reads)
    }
}
