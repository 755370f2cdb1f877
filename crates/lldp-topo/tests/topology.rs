//! Integration tests for the topology pipeline
//!
//! Drives retrieval, parsing, classification, assembly and rendering
//! through an in-memory transport loaded with real lldpcli output.

use async_trait::async_trait;
use lldp_remote::{RemoteError, RemoteExec, RemoteResult};
use lldp_topo::classifier::pf_info_commands;
use lldp_topo::parser::{self, HostDump};
use lldp_topo::render::{render, OutputFormat};
use lldp_topo::report::{self, extra_cell};
use lldp_topo::{
    ClassifyMode, ClassifyPolicy, EdgeRow, SysfsPolicy, TopoConfig, TopoError, TopologyEngine,
    TopologyOptions,
};
use lldp_types::{InterfaceKind, OperState};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_test::assert_err;

const SHOW_CHASSIS: &str = "lldpcli -f json show chassis details";
const SHOW_INTERFACES: &str = "lldpcli -f json show interfaces details";
const SHOW_NEIGHBORS: &str = "lldpcli -f json show neighbors details";

const SERVER1: &str = "ubuntu@server1";
const SERVER2: &str = "ubuntu@server2";

/// Transport answering from a fixed `(server, command) -> output` table.
/// Anything else fails the way an unreachable ssh does.
#[derive(Default)]
struct FakeTransport {
    answers: HashMap<(String, String), String>,
    issued: Mutex<Vec<(String, String)>>,
}

impl FakeTransport {
    fn answer(mut self, server: &str, command: &str, output: &str) -> Self {
        self.answers
            .insert((server.to_string(), command.to_string()), output.to_string());
        self
    }

    fn lldp(self, server: &str, chassis: &str, interfaces: &str, neighbors: &str) -> Self {
        self.answer(server, SHOW_CHASSIS, chassis)
            .answer(server, SHOW_INTERFACES, interfaces)
            .answer(server, SHOW_NEIGHBORS, neighbors)
    }

    /// Answers the sysfs probe for `iface` with the given markers.
    fn probe(self, server: &str, iface: &str, markers: &str) -> Self {
        let command = SysfsPolicy.probe_command(iface);
        self.answer(server, &command, markers)
    }

    fn sysfs(mut self, server: &str, iface: &str, reads: [&str; 6]) -> Self {
        for (command, value) in pf_info_commands(iface).iter().zip(reads) {
            self = self.answer(server, command, value);
        }
        self
    }

    fn issued_on(&self, server: &str) -> Vec<String> {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == server)
            .map(|(_, c)| c.clone())
            .collect()
    }
}

#[async_trait]
impl RemoteExec for FakeTransport {
    async fn run(&self, server: &str, command: &str) -> RemoteResult<String> {
        self.issued
            .lock()
            .unwrap()
            .push((server.to_string(), command.to_string()));
        match self.answers.get(&(server.to_string(), command.to_string())) {
            Some(output) => Ok(output.clone()),
            None => Err(RemoteError::CommandFailed {
                server: server.to_string(),
                command: command.to_string(),
                exit_code: 255,
                output: "ssh: connect to host port 22: Connection refused".to_string(),
            }),
        }
    }
}

fn server1() -> FakeTransport {
    FakeTransport::default().lldp(
        SERVER1,
        include_str!("fixtures/server1_chassis.json"),
        include_str!("fixtures/server1_interfaces.json"),
        include_str!("fixtures/server1_neighbors.json"),
    )
}

fn with_server2(transport: FakeTransport) -> FakeTransport {
    transport.lldp(
        SERVER2,
        include_str!("fixtures/server2_chassis.json"),
        include_str!("fixtures/server2_interfaces.json"),
        include_str!("fixtures/server2_neighbors.json"),
    )
}

/// server1 probes: eno1 and ens3f0 are PFs, the ens3f1 probe fails.
fn server1_probed() -> FakeTransport {
    server1()
        .probe(SERVER1, "eno1", "device")
        .probe(SERVER1, "ens3f0", "device")
}

fn engine(transport: FakeTransport) -> TopologyEngine<FakeTransport> {
    TopologyEngine::new(transport, &TopoConfig::default())
}

fn servers(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn kind_only() -> TopologyOptions {
    TopologyOptions {
        quick: false,
        classify: ClassifyMode::Kind,
    }
}

fn ifaces(rows: &[EdgeRow]) -> Vec<&str> {
    rows.iter().map(|r| r.local_iface.as_str()).collect()
}

#[tokio::test]
async fn test_interface_with_neighbor() {
    let engine = engine(server1_probed());
    let rows = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();

    let eno1 = &rows[0];
    assert_eq!(eno1.local_host, "server1");
    assert_eq!(eno1.local_chassis_id.as_deref(), Some("d0:67:26:cc:f0:e8"));
    assert_eq!(eno1.local_caps.as_str(), "1100");
    assert_eq!(eno1.local_iface, "eno1");
    assert_eq!(eno1.local_kind, InterfaceKind::Pf(None));
    assert_eq!(eno1.local_mac.unwrap().to_string(), "d0:67:26:cc:f0:ea");
    assert_eq!(eno1.remote_name.as_deref(), Some("switch1"));
    assert_eq!(eno1.remote_chassis_id.as_deref(), Some("0c:29:ef:c9:46:a0"));
    assert_eq!(eno1.remote_caps.as_str(), "1000");
    assert_eq!(eno1.remote_iface.as_deref(), Some("Ten-GigabitEthernet2/0/9"));
}

#[tokio::test]
async fn test_interface_without_neighbor() {
    let engine = engine(server1_probed());
    let rows = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();

    let ens3f0 = &rows[1];
    assert_eq!(ens3f0.local_iface, "ens3f0");
    assert_eq!(ens3f0.local_caps.as_str(), "1100");
    assert_eq!(ens3f0.local_mac.unwrap().to_string(), "3c:fd:fe:9e:6a:30");
    assert_eq!(ens3f0.remote_name, None);
    assert_eq!(ens3f0.remote_caps.as_str(), "XXXX");
    assert_eq!(ens3f0.remote_iface, None);
}

#[tokio::test]
async fn test_row_count_matches_interfaces() {
    let engine = engine(server1_probed());
    let all = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();
    assert_eq!(ifaces(&all), vec!["eno1", "ens3f0", "ens3f1"]);

    let quick = TopologyOptions {
        quick: true,
        classify: ClassifyMode::Kind,
    };
    let neighbors_only = engine.topology(&servers(&[SERVER1]), quick).await.unwrap();
    assert_eq!(ifaces(&neighbors_only), vec!["eno1", "ens3f1"]);
}

#[tokio::test]
async fn test_quick_mode_does_not_probe_lonely_interfaces() {
    let engine = engine(server1_probed());
    let quick = TopologyOptions {
        quick: true,
        classify: ClassifyMode::Kind,
    };
    engine.topology(&servers(&[SERVER1]), quick).await.unwrap();

    let issued = engine.transport().issued_on(SERVER1);
    assert!(issued.contains(&SysfsPolicy.probe_command("eno1")));
    assert!(!issued.contains(&SysfsPolicy.probe_command("ens3f0")));
}

#[tokio::test]
async fn test_failed_probe_degrades_to_unknown() {
    let engine = engine(server1_probed());
    let rows = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();

    // The ens3f1 probe has no answer; only its kind is lost
    let ens3f1 = &rows[2];
    assert_eq!(ens3f1.local_iface, "ens3f1");
    assert_eq!(ens3f1.local_kind, InterfaceKind::Unknown);
    assert_eq!(extra_cell(&ens3f1.local_kind), "N/A");
    assert_eq!(ens3f1.local_mac.unwrap().to_string(), "3c:fd:fe:9e:6a:31");
    assert_eq!(ens3f1.remote_name.as_deref(), Some("server2"));
    assert_eq!(ens3f1.remote_caps.as_str(), "1100");
    // Port id is a MAC, so the description names the interface
    assert_eq!(ens3f1.remote_iface.as_deref(), Some("ens2f0"));
}

#[tokio::test]
async fn test_skip_mode_issues_no_probes() {
    let engine = engine(server1_probed());
    let skip = TopologyOptions {
        quick: false,
        classify: ClassifyMode::Skip,
    };
    let rows = engine.topology(&servers(&[SERVER1]), skip).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.local_kind == InterfaceKind::Unknown));
    assert_eq!(
        engine.transport().issued_on(SERVER1),
        vec![SHOW_CHASSIS, SHOW_INTERFACES, SHOW_NEIGHBORS]
    );
}

#[tokio::test]
async fn test_empty_dump_contributes_nothing() {
    let transport = server1_probed().lldp("ubuntu@empty", "", "", "");
    let engine = engine(transport);
    let rows = engine
        .topology(&servers(&["ubuntu@empty", SERVER1]), kind_only())
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.local_host == "server1"));
}

#[tokio::test]
async fn test_unreachable_server_is_skipped() {
    let engine = engine(server1_probed());
    let rows = engine
        .topology(&servers(&[SERVER1, "ubuntu@down"]), kind_only())
        .await
        .unwrap();

    assert_eq!(ifaces(&rows), vec!["eno1", "ens3f0", "ens3f1"]);
    // The batch stops at the first failed query
    assert_eq!(engine.transport().issued_on("ubuntu@down"), vec![SHOW_CHASSIS]);
}

#[tokio::test]
async fn test_no_reachable_server_fails_the_run() {
    let engine = engine(FakeTransport::default());
    let down = servers(&["ubuntu@down1", "ubuntu@down2"]);

    let err = assert_err!(engine.topology(&down, kind_only()).await);
    assert!(matches!(err, TopoError::NoReachableServers(2)));
    let err = assert_err!(engine.list_interfaces(&down).await);
    assert!(matches!(err, TopoError::NoReachableServers(2)));
}

#[tokio::test]
async fn test_reached_server_with_empty_dump_is_not_a_failure() {
    let engine = engine(FakeTransport::default().lldp("ubuntu@empty", "", "", ""));
    let rows = engine
        .topology(&servers(&["ubuntu@empty", "ubuntu@down"]), kind_only())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_host_order_permutes_blocks() {
    let transport = with_server2(server1_probed()).probe(SERVER2, "ens2f0", "device");
    let engine = engine(transport);

    let forward = engine
        .topology(&servers(&[SERVER1, SERVER2]), kind_only())
        .await
        .unwrap();
    let backward = engine
        .topology(&servers(&[SERVER2, SERVER1]), kind_only())
        .await
        .unwrap();

    assert_eq!(forward.len(), 4);
    assert_eq!(&forward[..3], &backward[1..]);
    assert_eq!(&forward[3..], &backward[..1]);
    assert_eq!(backward[0].local_host, "server2");
    assert_eq!(backward[0].remote_iface.as_deref(), Some("ens3f1"));
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let engine = engine(with_server2(server1_probed()));
    let list = servers(&[SERVER1, SERVER2]);
    let first = engine.topology(&list, kind_only()).await.unwrap();
    let second = engine.topology(&list, kind_only()).await.unwrap();
    assert_eq!(first, second);

    let dump = HostDump {
        chassis: include_str!("fixtures/server1_chassis.json").to_string(),
        interfaces: include_str!("fixtures/server1_interfaces.json").to_string(),
        neighbors: include_str!("fixtures/server1_neighbors.json").to_string(),
    };
    assert_eq!(parser::parse(&dump), parser::parse(&dump));
}

#[tokio::test]
async fn test_full_mode_resolves_pf_details() {
    let transport = server1_probed().sysfs(
        SERVER1,
        "eno1",
        ["0x8086", "0x10fb", "10000", "up", "0", "0"],
    );
    let engine = engine(transport);
    let full = TopologyOptions {
        quick: false,
        classify: ClassifyMode::Full,
    };
    let rows = engine.topology(&servers(&[SERVER1]), full).await.unwrap();

    assert_eq!(
        extra_cell(&rows[0].local_kind),
        "Intel,0x8086,Niantic IXGBE 82599 SFP,0x10fb,10000,up,0"
    );

    // ens3f0 is a PF whose sysfs reads all fail
    let info = rows[1].local_kind.pf_info().unwrap();
    assert_eq!(info.vendor_id, None);
    assert_eq!(info.oper_state, OperState::Unknown);
    assert_eq!(
        extra_cell(&rows[1].local_kind),
        "UNKNOWN VENDOR,UNKNOWN VENDOR ID,UNKNOWN DEVICE,UNKNOWN DEVICE ID,\
         UNKNOWN SPEED,unknown,UNKNOWN NUMVFS"
    );
}

#[tokio::test]
async fn test_no_servers() {
    let engine = engine(server1());
    let err = assert_err!(engine.topology(&[], kind_only()).await);
    assert!(matches!(err, TopoError::NoServers));
    let err = assert_err!(engine.list_interfaces(&[]).await);
    assert!(matches!(err, TopoError::NoServers));
    assert_err!(engine.test_connectivity(&[]).await);
}

#[tokio::test]
async fn test_csv_report() {
    let engine = engine(server1_probed());
    let rows = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();

    let mut out = Vec::new();
    render(&report::topology_table(&rows), OutputFormat::Csv, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "Edge 1;ChassisID 1;BRWS 1;Iface 1;Iface 1 Type;Iface 1 Extra;MAC 1;Edge 2;ChassisID 2;BRWS 2;Iface 2"
    );
    assert_eq!(
        lines[1],
        "server1;d0:67:26:cc:f0:e8;1100;eno1;pf;N/A;d0:67:26:cc:f0:ea;switch1;0c:29:ef:c9:46:a0;1000;Ten-GigabitEthernet2/0/9"
    );
    assert_eq!(
        lines[2],
        "server1;d0:67:26:cc:f0:e8;1100;ens3f0;pf;N/A;3c:fd:fe:9e:6a:30;None;None;XXXX;None"
    );
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn test_list_interfaces() {
    let transport = FakeTransport::default()
        .answer(SERVER1, "ip -j link list", include_str!("fixtures/ip_link_list.json"))
        .probe(SERVER1, "lo", "")
        .probe(SERVER1, "eno1", "device")
        .probe(SERVER1, "ens3f0", "device")
        .probe(SERVER1, "ens3f0v0", "device\nphysfn")
        .probe(SERVER1, "eno1.100", "")
        .sysfs(SERVER1, "eno1", ["0x8086", "0x1521", "1000", "up", "0", "0"])
        .sysfs(SERVER1, "ens3f0", ["0x8086", "0x10fb", "-1", "down", "1", "8"]);
    let engine = engine(transport);

    let reports = engine
        .list_interfaces(&servers(&[SERVER1, "ubuntu@down"]))
        .await
        .unwrap();

    let kinds: Vec<(&str, Option<&str>)> = reports
        .iter()
        .map(|r| (r.iface.as_str(), r.kind.label()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("lo", None),
            ("eno1", Some("pf")),
            ("ens3f0", Some("pf")),
            ("ens3f0v0", Some("vf")),
            ("eno1.100", Some("vlan")),
        ]
    );

    let table = report::interface_table(&reports);
    assert_eq!(table.len(), 2);
    let ens3f0: Vec<&str> = table.rows[1].iter().map(|c| c.as_deref().unwrap()).collect();
    assert_eq!(
        ens3f0,
        vec![
            SERVER1,
            "ens3f0",
            "pf",
            "0x10fb",
            "Niantic IXGBE 82599 SFP",
            "0x8086",
            "Intel",
            "1",
            "UNKNOWN SPEED",
            "down",
            "8",
        ]
    );
}

#[tokio::test]
async fn test_connectivity() {
    let transport = FakeTransport::default()
        .answer(SERVER1, "echo", "")
        .answer(SERVER1, "lldpcli show chassis", "Local chassis")
        .answer(SERVER2, "echo", "");
    let engine = engine(transport);

    let results = engine
        .test_connectivity(&servers(&[SERVER1, SERVER2, "ubuntu@down"]))
        .await
        .unwrap();

    let summary: Vec<(&str, bool, bool)> = results
        .iter()
        .map(|(s, r)| (s.as_str(), r.reachable, r.lldp_responsive))
        .collect();
    assert_eq!(
        summary,
        vec![
            (SERVER1, true, true),
            (SERVER2, true, false),
            ("ubuntu@down", false, false),
        ]
    );
    // lldpcli is not tried on an unreachable server
    assert_eq!(engine.transport().issued_on("ubuntu@down"), vec!["echo"]);
}

/// Decides from `ethtool -i` driver names instead of sysfs.
struct DriverPolicy;

impl ClassifyPolicy for DriverPolicy {
    fn probe_command(&self, iface: &str) -> String {
        format!("ethtool -i {iface}")
    }

    fn decide(&self, _iface: &str, probe_output: &str) -> InterfaceKind {
        if probe_output.contains("driver: ixgbevf") || probe_output.contains("driver: iavf") {
            InterfaceKind::Vf
        } else if probe_output.contains("driver: 8021q") {
            InterfaceKind::Vlan
        } else if probe_output.contains("driver:") {
            InterfaceKind::Pf(None)
        } else {
            InterfaceKind::Unknown
        }
    }
}

#[tokio::test]
async fn test_custom_policy() {
    let transport = server1()
        .answer(SERVER1, "ethtool -i eno1", "driver: igb\nversion: 5.15.0")
        .answer(SERVER1, "ethtool -i ens3f0", "driver: ixgbevf")
        .answer(SERVER1, "ethtool -i ens3f1", "driver: 8021q");
    let engine = engine(transport).with_policy(Arc::new(DriverPolicy));

    let rows = engine.topology(&servers(&[SERVER1]), kind_only()).await.unwrap();
    let kinds: Vec<InterfaceKind> = rows.into_iter().map(|r| r.local_kind).collect();
    assert_eq!(
        kinds,
        vec![InterfaceKind::Pf(None), InterfaceKind::Vf, InterfaceKind::Vlan]
    );
}
