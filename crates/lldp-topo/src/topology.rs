//! Topology extraction across a list of servers.
//!
//! Each server is an independent unit: its LLDP queries are fetched as one
//! all-or-nothing batch, classified, and assembled into a block of rows. A
//! server that fails is logged and contributes nothing; the rest of the run
//! carries on, unless no server at all could be reached. Blocks come back in the order the servers were given, even
//! when several servers are queried at once.

use futures::stream::{self, StreamExt};
use lldp_remote::{probe, split_server, ProbeResult, RemoteExec};
use lldp_types::InterfaceKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::assembler::{self, EdgeRow, LocalHost};
use crate::classifier::{ClassifyMode, ClassifyPolicy, Classifier, SysfsPolicy};
use crate::config::TopoConfig;
use crate::error::{Result, TopoError};
use crate::parser::{self, HostDump};

/// Lists the kernel's interfaces as JSON.
pub const IP_LINK_LIST_CMD: &str = "ip -j link list";

/// Per-run options of `get-topology`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyOptions {
    /// Only emit interfaces that have a neighbor.
    pub quick: bool,
    pub classify: ClassifyMode,
}

/// One classified interface of the `list-interfaces` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceReport {
    pub server: String,
    pub iface: String,
    pub kind: InterfaceKind,
}

/// Drives retrieval, parsing, classification and assembly.
pub struct TopologyEngine<T: RemoteExec> {
    transport: Arc<T>,
    policy: Arc<dyn ClassifyPolicy>,
    lldpcli: String,
    parallel_hosts: usize,
}

impl<T: RemoteExec> TopologyEngine<T> {
    pub fn new(transport: T, config: &TopoConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            policy: Arc::new(SysfsPolicy),
            lldpcli: config.lldp.lldpcli.clone(),
            parallel_hosts: config.engine.parallel_hosts.max(1),
        }
    }

    /// Replaces the pf/vf/vlan decision policy.
    pub fn with_policy(mut self, policy: Arc<dyn ClassifyPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The three lldpcli queries, in [`HostDump`] field order.
    pub fn lldp_commands(&self) -> [String; 3] {
        [
            format!("{} -f json show chassis details", self.lldpcli),
            format!("{} -f json show interfaces details", self.lldpcli),
            format!("{} -f json show neighbors details", self.lldpcli),
        ]
    }

    /// Command used by the connectivity test to check the agent.
    pub fn lldp_probe_command(&self) -> String {
        format!("{} show chassis", self.lldpcli)
    }

    /// Fetches the LLDP dump of one server.
    pub async fn fetch_dump(&self, server: &str) -> Result<HostDump> {
        let commands = self.lldp_commands();
        for command in &commands {
            info!(server = %server, command = %command, "LLDP query");
        }
        let answers = self.transport.run_batch(server, &commands).await?;
        let mut answers = answers.into_iter();
        let mut next = || answers.next().unwrap_or_default();
        Ok(HostDump {
            chassis: next(),
            interfaces: next(),
            neighbors: next(),
        })
    }

    /// Rows of one server.
    ///
    /// Fails only when the LLDP queries themselves fail; unparsable output
    /// and failed classification degrade instead.
    pub async fn host_topology(&self, server: &str, opts: TopologyOptions) -> Result<Vec<EdgeRow>> {
        let dump = self.fetch_dump(server).await?;
        let parsed = parser::parse(&dump);
        if parsed.records.is_empty() {
            warn!(server = %server, "No LLDP interfaces reported");
            return Ok(Vec::new());
        }

        let host = LocalHost::new(parsed.chassis.as_ref(), host_name(server));
        let classifier = Classifier::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.policy),
            opts.classify,
        );

        let mut kinds: HashMap<String, InterfaceKind> = HashMap::new();
        if opts.classify != ClassifyMode::Skip {
            for record in &parsed.records {
                if opts.quick && record.neighbor.is_none() {
                    continue;
                }
                let kind = classifier.classify(server, &record.name).await;
                info!(server = %server, iface = %record.name, kind = ?kind, "Interface");
                kinds.insert(record.name.clone(), kind);
            }
        }

        let rows = assembler::assemble(
            &host,
            &parsed.records,
            |name| kinds.remove(name).unwrap_or_default(),
            opts.quick,
        );
        debug!(server = %server, rows = rows.len(), "Assembled host rows");
        Ok(rows)
    }

    /// Rows of every server, blocks in the order of `servers`.
    pub async fn topology(&self, servers: &[String], opts: TopologyOptions) -> Result<Vec<EdgeRow>> {
        if servers.is_empty() {
            return Err(TopoError::NoServers);
        }

        let results: Vec<Result<Vec<EdgeRow>>> = stream::iter(servers)
            .map(|server| async move {
                info!(server = %server, "Server");
                let result = self.host_topology(server, opts).await;
                if let Err(e) = &result {
                    warn!(server = %server, error = %e, "Skipping server");
                }
                result
            })
            .buffered(self.parallel_hosts)
            .collect()
            .await;

        Ok(assembler::concat(reached_blocks(results)?))
    }

    /// Connectivity test of every server, in the order given.
    pub async fn test_connectivity(&self, servers: &[String]) -> Result<Vec<(String, ProbeResult)>> {
        if servers.is_empty() {
            return Err(TopoError::NoServers);
        }
        let lldp_command = self.lldp_probe_command();
        let results: Vec<(String, ProbeResult)> = stream::iter(servers)
            .map(|server| {
                let lldp_command = &lldp_command;
                async move {
                    let result = probe(self.transport.as_ref(), server, lldp_command).await;
                    (server.clone(), result)
                }
            })
            .buffered(self.parallel_hosts)
            .collect()
            .await;
        Ok(results)
    }

    /// Classifies every kernel interface of every server in full mode.
    pub async fn list_interfaces(&self, servers: &[String]) -> Result<Vec<InterfaceReport>> {
        if servers.is_empty() {
            return Err(TopoError::NoServers);
        }
        let classifier = Classifier::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.policy),
            ClassifyMode::Full,
        );

        let results: Vec<Result<Vec<InterfaceReport>>> = stream::iter(servers)
            .map(|server| {
                let classifier = classifier.clone();
                async move {
                    let raw = match self.transport.run(server, IP_LINK_LIST_CMD).await {
                        Ok(raw) => raw,
                        Err(e) => {
                            warn!(server = %server, error = %e, "Skipping server");
                            return Err(TopoError::from(e));
                        }
                    };
                    let mut reports = Vec::new();
                    for iface in parser::parse_link_list(&raw) {
                        let kind = classifier.classify(server, &iface).await;
                        reports.push(InterfaceReport {
                            server: server.clone(),
                            iface,
                            kind,
                        });
                    }
                    Ok(reports)
                }
            })
            .buffered(self.parallel_hosts)
            .collect()
            .await;

        Ok(reached_blocks(results)?.into_iter().flatten().collect())
    }
}

/// Blocks of the servers that answered, in order. Failed servers were
/// already logged and are dropped; if none answered the run fails.
fn reached_blocks<B>(results: Vec<Result<B>>) -> Result<Vec<B>> {
    let total = results.len();
    let blocks: Vec<B> = results.into_iter().filter_map(|r| r.ok()).collect();
    if blocks.is_empty() && total > 0 {
        return Err(TopoError::NoReachableServers(total));
    }
    Ok(blocks)
}

/// Host part of a `user@host` spec, the spec itself if it does not parse.
fn host_name(server: &str) -> &str {
    split_server(server).map(|(_, host)| host).unwrap_or(server)
}
