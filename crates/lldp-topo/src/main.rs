//! lldp-topo
//!
//! Queries the LLDP agent of every given server and prints the physical
//! links it sees, or lists the physical interfaces of the servers.
//!
//! ```bash
//! lldp-topo get-topology ubuntu@server1 ubuntu@server2
//! lldp-topo -o csv -c "juju ssh" gt -q -e 0 1 2
//! lldp-topo --test li ubuntu@server1
//! ```

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use lldp_remote::ShellTransport;
use lldp_topo::render::{self, OutputFormat};
use lldp_topo::{report, ClassifyMode, TopoConfig, TopologyEngine, TopologyOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "lldp-topo", version)]
#[command(about = "Discover physical network topology from the LLDP state of servers", long_about = None)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    output: OutputFormat,

    /// Increase verbosity (-v info, -vv debug with source locations)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only test the transport and lldpcli on every server
    #[arg(long, global = true)]
    test: bool,

    /// Alternate command to reach the servers, e.g. `juju ssh`
    #[arg(short = 'c', long, global = true)]
    alt_command: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Get LLDP topology
    #[command(visible_aliases = ["gt", "get"])]
    GetTopology {
        /// Server to connect to, as `user@server`
        #[arg(value_name = "SERVER", required = true)]
        servers: Vec<String>,

        /// Print only interfaces with an LLDP neighbor
        #[arg(short, long)]
        quick: bool,

        /// Show extra info about physical interfaces
        #[arg(short, long, conflicts_with = "skip_iface_info")]
        extra: bool,

        /// Do not classify interfaces at all
        #[arg(short, long)]
        skip_iface_info: bool,
    },

    /// List physical interfaces and their info
    #[command(visible_alias = "li")]
    ListInterfaces {
        /// Server to connect to, as `user@server`
        #[arg(value_name = "SERVER", required = true)]
        servers: Vec<String>,
    },
}

impl Command {
    fn servers(&self) -> &[String] {
        match self {
            Command::GetTopology { servers, .. } | Command::ListInterfaces { servers } => servers,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = TopoConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(alt_command) = cli.alt_command.clone() {
        config.transport.alt_command = Some(alt_command);
        config.validate()?;
    }

    let mut transport = ShellTransport::with_command(config.transport_command());
    if let Some(timeout) = config.command_timeout() {
        transport = transport.timeout(timeout);
    }
    info!(transport = %transport.prefix(), "lldp-topo: Starting");
    let engine = TopologyEngine::new(transport, &config);

    if cli.test {
        return run_test(&engine, cli.command.servers()).await;
    }

    let table = match &cli.command {
        Command::GetTopology {
            servers,
            quick,
            extra,
            skip_iface_info,
        } => {
            let classify = if *skip_iface_info {
                ClassifyMode::Skip
            } else if *extra {
                ClassifyMode::Full
            } else {
                ClassifyMode::Kind
            };
            let opts = TopologyOptions {
                quick: *quick,
                classify,
            };
            let rows = engine.topology(servers, opts).await?;
            report::topology_table(&rows)
        }
        Command::ListInterfaces { servers } => {
            let reports = engine.list_interfaces(servers).await?;
            report::interface_table(&reports)
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render::render(&table, cli.output, &mut out)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// Prints one line per check and server; fails if any check failed.
async fn run_test(
    engine: &TopologyEngine<ShellTransport>,
    servers: &[String],
) -> anyhow::Result<ExitCode> {
    let mut all_passed = true;
    for (server, result) in engine.test_connectivity(servers).await? {
        if !result.reachable {
            println!("Server {server}: SSH NOT working");
        } else {
            println!("Server {server}: SSH working");
            if result.lldp_responsive {
                println!("Server {server}: LLDPCLI working");
            } else {
                println!("Server {server}: LLDPCLI NOT working");
            }
        }
        all_passed &= result.passed();
    }
    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so that stdout only carries the report.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));
    let detailed = verbose >= 2;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(detailed)
                .with_file(detailed)
                .with_line_number(detailed),
        )
        .try_init()
        .context("Failed to set logger")?;
    Ok(())
}

/// Release builds compile out trace events, so `-v` stops at debug.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
