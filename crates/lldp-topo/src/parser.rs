//! lldpcli JSON dump parsing.
//!
//! The dumps are parsed into a generic [`serde_json::Value`] tree first and
//! then projected into typed records with an explicit presence check on
//! every access. lldpcli is inconsistent about cardinality (a single
//! interface comes out as a map, several as a list of one-key maps; a single
//! capability as a map, several as a list), so every collection goes through
//! [`named_entries`] or [`items`].
//!
//! Key order of the source is preserved (`serde_json` is built with
//! `preserve_order`), and it is the order of the returned records.

use lldp_types::{Capability, MacAddress};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Identity and capabilities of an LLDP speaker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChassisInfo {
    /// System name. Some switches do not send one.
    pub name: Option<String>,
    /// Chassis id value, usually a MAC.
    pub id: Option<String>,
    /// Enabled capabilities, in the order they were listed.
    pub capabilities: Vec<Capability>,
}

/// Remote end of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub chassis: ChassisInfo,
    /// Remote interface name.
    pub port: Option<String>,
}

/// One local interface as reported by the LLDP agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub mac: Option<MacAddress>,
    pub neighbor: Option<Neighbor>,
}

/// Raw output of the three lldpcli queries for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostDump {
    /// `show chassis details`
    pub chassis: String,
    /// `show interfaces details`
    pub interfaces: String,
    /// `show neighbors details`
    pub neighbors: String,
}

/// Parsed form of a [`HostDump`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedHost {
    /// Local chassis, `None` if the chassis section was unusable.
    pub chassis: Option<ChassisInfo>,
    /// One record per local interface, in dump order.
    pub records: Vec<InterfaceRecord>,
}

/// Parses a complete host dump.
///
/// Never fails: an empty or unparsable dump yields no records and a warning.
pub fn parse(dump: &HostDump) -> ParsedHost {
    let chassis = parse_chassis(&dump.chassis);
    let records = parse_interfaces(&dump.interfaces, &dump.neighbors);
    ParsedHost { chassis, records }
}

/// Parses `lldpcli -f json show chassis details`.
pub fn parse_chassis(raw: &str) -> Option<ChassisInfo> {
    let tree = load(raw, "chassis")?;
    let chassis = tree.get("local-chassis")?.get("chassis")?;
    Some(chassis_info(chassis))
}

/// Builds interface records from the interfaces and neighbors sections.
///
/// The interfaces section is authoritative for the set and order of local
/// interfaces. When it is unusable the neighbors section is used instead,
/// without MACs. Neighbors reported on an interface missing from the
/// interfaces section are appended at the end.
pub fn parse_interfaces(raw_interfaces: &str, raw_neighbors: &str) -> Vec<InterfaceRecord> {
    let mut neighbors = parse_neighbors(raw_neighbors);

    let mut records: Vec<InterfaceRecord> = match load(raw_interfaces, "interfaces") {
        Some(tree) => lldp_interfaces(&tree)
            .into_iter()
            .map(|(name, body)| InterfaceRecord {
                name: name.to_string(),
                mac: local_mac(body),
                neighbor: None,
            })
            .collect(),
        None => Vec::new(),
    };

    let mut seen = HashSet::new();
    records.retain(|r| {
        let first = seen.insert(r.name.clone());
        if !first {
            warn!(iface = %r.name, "Interface listed twice, keeping first");
        }
        first
    });

    for record in &mut records {
        record.neighbor = neighbors.remove(&record.name).map(|(_, n)| n);
    }

    let mut orphans: Vec<(usize, String, Neighbor)> = neighbors
        .into_iter()
        .map(|(name, (pos, n))| (pos, name, n))
        .collect();
    orphans.sort_by_key(|(pos, _, _)| *pos);
    if !records.is_empty() && !orphans.is_empty() {
        warn!(count = orphans.len(), "Neighbors on interfaces missing from interface list");
    }
    records.extend(orphans.into_iter().map(|(_, name, n)| InterfaceRecord {
        name,
        mac: None,
        neighbor: Some(n),
    }));

    debug!(count = records.len(), "Parsed interface records");
    records
}

/// Parses `lldpcli -f json show neighbors details` into
/// `interface name -> (position, neighbor)`.
pub fn parse_neighbors(raw: &str) -> HashMap<String, (usize, Neighbor)> {
    let mut out = HashMap::new();
    let Some(tree) = load(raw, "neighbors") else {
        return out;
    };

    for (name, body) in lldp_interfaces(&tree) {
        if out.contains_key(name) {
            warn!(iface = %name, "Several neighbors on one interface, keeping first");
            continue;
        }
        let chassis = body.get("chassis").map(chassis_info).unwrap_or_default();
        let neighbor = Neighbor {
            chassis,
            port: body.get("port").and_then(remote_port),
        };
        let pos = out.len();
        out.insert(name.to_string(), (pos, neighbor));
    }
    out
}

/// Parses `ip -j link list` into interface names in kernel order.
pub fn parse_link_list(raw: &str) -> Vec<String> {
    let Some(tree) = load(raw, "links") else {
        return Vec::new();
    };
    items(&tree)
        .filter_map(|link| text(link.get("ifname")))
        .collect()
}

fn load(raw: &str, section: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        warn!(section, "Empty LLDP dump");
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(tree) => Some(tree),
        Err(e) => {
            warn!(section, error = %e, "Unparsable LLDP dump");
            None
        }
    }
}

fn lldp_interfaces(tree: &Value) -> Vec<(&str, &Value)> {
    tree.get("lldp")
        .and_then(|lldp| lldp.get("interface"))
        .map(named_entries)
        .unwrap_or_default()
}

/// Flattens `{a: .., b: ..}` and `[{a: ..}, {b: ..}]` into `[(a, ..), (b, ..)]`.
fn named_entries(value: &Value) -> Vec<(&str, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Value::Array(list) => list.iter().flat_map(named_entries).collect(),
        _ => Vec::new(),
    }
}

/// Iterates a value that is either a list or a single element.
fn items(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(list) => Box::new(list.iter()),
        Value::Null => Box::new(std::iter::empty()),
        other => Box::new(std::iter::once(other)),
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn enabled(value: Option<&Value>) -> bool {
    match value {
        // lldpd always sends the flag; a bare listing counts as advertised
        None => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "on" | "yes"),
        Some(_) => false,
    }
}

/// Reads a chassis node, either `{name: {id, capability}}` or the unnamed
/// `{id, capability}` form.
fn chassis_info(chassis: &Value) -> ChassisInfo {
    let Some(map) = chassis.as_object() else {
        return ChassisInfo::default();
    };

    let unnamed = map.contains_key("id") || map.contains_key("capability");
    let (name, body) = if unnamed {
        (None, chassis)
    } else {
        let mut keys = map.iter();
        match keys.next() {
            Some((name, body)) => {
                if map.len() > 1 {
                    warn!(chassis = %name, count = map.len(), "Several chassis, keeping first");
                }
                (Some(name.clone()), body)
            }
            None => (None, chassis),
        }
    };

    let capabilities = body
        .get("capability")
        .map(|caps| {
            items(caps)
                .filter(|cap| enabled(cap.get("enabled")))
                .filter_map(|cap| text(cap.get("type")))
                .filter_map(|name| name.parse::<Capability>().ok())
                .collect()
        })
        .unwrap_or_default();

    ChassisInfo {
        name,
        id: body.get("id").and_then(|id| text(id.get("value"))),
        capabilities,
    }
}

/// Remote interface name from a neighbor `port` node.
///
/// Servers often send their MAC as port id and the interface name as
/// description; the name is more useful then.
fn remote_port(port: &Value) -> Option<String> {
    let id = port.get("id");
    let id_type = id.and_then(|id| text(id.get("type")));
    let id_value = id.and_then(|id| text(id.get("value")));
    let descr = text(port.get("descr"));
    match (id_type.as_deref(), descr) {
        (Some("mac"), Some(descr)) => Some(descr),
        _ => id_value,
    }
}

/// Local MAC from an interfaces-section `port` node. An all-zero id is
/// what agents send for interfaces without a hardware address.
fn local_mac(iface: &Value) -> Option<MacAddress> {
    let value = text(iface.get("port")?.get("id")?.get("value"))?;
    value.parse::<MacAddress>().ok().filter(|mac| !mac.is_zero())
}
