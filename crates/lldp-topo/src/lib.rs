//! LLDP Topology Discovery
//!
//! Reconstructs the physical network topology of a fleet of servers from
//! the LLDP state each server's agent already holds. Every server is queried
//! over a remote transport; its dumps are parsed, each local interface is
//! classified (pf, vf, vlan), and the result is a flat list of edge rows
//! rendered as a table, csv, yaml or json.

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod error;
pub mod parser;
pub mod pci_ids;
pub mod render;
pub mod report;
pub mod topology;

pub use assembler::{EdgeRow, LocalHost};
pub use classifier::{ClassifyMode, ClassifyPolicy, Classifier, SysfsPolicy};
pub use config::{EngineConfig, LldpConfig, TopoConfig, TransportConfig};
pub use error::{Result, TopoError};
pub use parser::{ChassisInfo, HostDump, InterfaceRecord, Neighbor, ParsedHost};
pub use render::OutputFormat;
pub use report::Table;
pub use topology::{InterfaceReport, TopologyEngine, TopologyOptions};
