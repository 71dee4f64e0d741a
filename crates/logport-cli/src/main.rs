use std::path::PathBuf;

use clap::{Parser, Subcommand};
use logport_core::LogportError;
use logport_discover::{
    find_ports, is_local_host, scan_local_ports, DiscoveryConfig, HostLocality, PortSnapshot,
    Selector, TcpCollector, DEFAULT_COLLECTOR_PORT,
};
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Locate active logger-daemon control ports.
#[derive(Parser, Debug)]
#[command(name = "logport", version, about, long_about = None)]
struct Cli {
    /// The format for log output.
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// The minimum log level to display.
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover logger control ports on a host.
    ///
    /// Routes to the local port-directory scan when the host designates this
    /// machine, and to a remote collector query otherwise.
    Find(FindArgs),

    /// Scan the local port directory only.
    ///
    /// Never resolves hostnames or opens network connections.
    Scan(ScanArgs),

    /// Report whether a hostname designates the local machine.
    Islocal(IslocalArgs),
}

#[derive(Parser, Debug)]
struct FindArgs {
    /// Host to discover logger ports on.
    #[arg(long, value_name = "HOST", default_value = "localhost")]
    host: String,

    /// Discover the port of one specific logger process.
    #[arg(long, value_name = "PID", conflicts_with_all = ["primary", "all"])]
    pid: Option<u32>,

    /// Discover the primary logger's port (default).
    #[arg(long, conflicts_with = "all")]
    primary: bool,

    /// Discover ports for all active loggers.
    #[arg(long)]
    all: bool,

    /// Port-advertisement directory used for local scans.
    #[arg(long, value_name = "DIR", env = "LOGPORT_PORT_DIR")]
    port_dir: Option<PathBuf>,

    /// TCP port of the collector service used for remote queries.
    #[arg(long, value_name = "PORT", env = "LOGPORT_COLLECTOR_PORT")]
    collector_port: Option<u16>,

    /// Output a JSON snapshot.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Scan for one specific logger process.
    #[arg(long, value_name = "PID", conflicts_with_all = ["primary", "all"])]
    pid: Option<u32>,

    /// Scan for the primary logger (default).
    #[arg(long, conflicts_with = "all")]
    primary: bool,

    /// Scan for all active loggers.
    #[arg(long)]
    all: bool,

    /// Port-advertisement directory to scan.
    #[arg(long, value_name = "DIR", env = "LOGPORT_PORT_DIR")]
    port_dir: Option<PathBuf>,

    /// Output a JSON snapshot.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct IslocalArgs {
    /// Hostname or address to classify.
    #[arg(value_name = "HOST")]
    host: String,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

fn main() {
    let cli = Cli::parse();

    // Initialize the tracing subscriber
    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    match run_command(cli.command) {
        Ok(exit_code) => {
            info!("Discovery finished.");
            std::process::exit(exit_code);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(err.error_code());
        }
    }
}

fn run_command(command: Command) -> Result<i32, LogportError> {
    match command {
        Command::Find(args) => run_find(args),
        Command::Scan(args) => run_scan(args),
        Command::Islocal(args) => run_islocal(args),
    }
}

fn run_find(args: FindArgs) -> Result<i32, LogportError> {
    let selector = selector_from_flags(args.pid, args.all);
    let config = config_from_flags(args.port_dir);
    let client = TcpCollector::new(args.collector_port.unwrap_or(DEFAULT_COLLECTOR_PORT));

    let snapshot = find_ports(&config, &client, &args.host, &selector)?;
    emit_warnings(&snapshot);
    print_snapshot(&snapshot, args.json)?;
    Ok(0)
}

fn run_scan(args: ScanArgs) -> Result<i32, LogportError> {
    let selector = selector_from_flags(args.pid, args.all);
    let config = config_from_flags(args.port_dir);

    let snapshot = scan_local_ports(&config, &selector)?;
    emit_warnings(&snapshot);
    print_snapshot(&snapshot, args.json)?;
    Ok(0)
}

fn run_islocal(args: IslocalArgs) -> Result<i32, LogportError> {
    match is_local_host(&args.host)? {
        HostLocality::Local => println!("local"),
        HostLocality::Remote => println!("remote"),
    }
    Ok(0)
}

/// Build the selector once, at the boundary. The primary flag is the
/// default: it is the common case, and clap already rejects conflicting
/// combinations.
fn selector_from_flags(pid: Option<u32>, all: bool) -> Selector {
    if let Some(pid) = pid {
        Selector::Pid(pid)
    } else if all {
        Selector::All
    } else {
        Selector::Primary
    }
}

fn config_from_flags(port_dir: Option<PathBuf>) -> DiscoveryConfig {
    match port_dir {
        Some(port_dir) => DiscoveryConfig { port_dir },
        None => DiscoveryConfig::default(),
    }
}

fn emit_warnings(snapshot: &PortSnapshot) {
    for warning in &snapshot.warnings {
        warn!("{}", warning);
    }
}

fn print_snapshot(snapshot: &PortSnapshot, json: bool) -> Result<(), LogportError> {
    if json {
        let text = serde_json::to_string_pretty(snapshot)
            .map_err(|e| LogportError::internal(format!("JSON encoding failed: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    if snapshot.ports.is_empty() {
        println!("no active loggers found");
        return Ok(());
    }

    for record in &snapshot.ports {
        println!(
            "{:<10} {:>5}  {:<16} collector={} archive={}",
            record.owner.to_string(),
            record.port,
            record.name,
            record.collector_host.as_deref().unwrap_or("-"),
            record.archive_path.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
