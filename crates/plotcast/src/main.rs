use std::io;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use plotcast::logging::{init_logging, LogFormat, LogLevel};
use plotcast::publisher::PublisherConfig;
use plotcast::source::SineSource;
use plotcast::{control, netinfo, publisher};
use plotcast_session::Session;

#[derive(Parser, Debug)]
#[command(name = "plotcast", version, about = "UDP telemetry publisher")]
struct Cli {
    /// Control port listening for CONNECT/DISCONNECT commands.
    #[arg(long, env = "PLOTCAST_CMD_PORT", default_value_t = 47268)]
    cmd_port: u16,

    /// Samples per batch.
    #[arg(long, env = "PLOTCAST_POINTS", default_value_t = 512)]
    points: usize,

    /// Milliseconds between consecutive samples within a batch.
    #[arg(long, env = "PLOTCAST_STEP_MS", default_value_t = 1)]
    step_ms: u32,

    /// Variable name carried by binary sample packets.
    #[arg(long, env = "PLOTCAST_RAW_VAR", default_value = "sine_raw")]
    raw_var: String,

    /// Variable name carried by text-line updates.
    #[arg(long, env = "PLOTCAST_TEXT_VAR", default_value = "sine_txt")]
    text_var: String,

    /// Unit suffix appended to binary packets. Empty disables the suffix.
    #[arg(long, env = "PLOTCAST_UNIT", default_value = "V")]
    unit: String,

    /// Batches per second.
    #[arg(long, env = "PLOTCAST_SEND_RATE", default_value_t = 40)]
    send_rate: u32,

    /// Advertise this IP in acks instead of auto-detecting the outbound
    /// address.
    #[arg(long, env = "PLOTCAST_SERVER_IP")]
    server_ip: Option<IpAddr>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> io::Result<()> {
    // No control endpoint, no server: bind failure here is fatal.
    let control_socket =
        tokio::net::UdpSocket::bind((Ipv4Addr::UNSPECIFIED, cli.cmd_port)).await?;

    // The data socket stays unbound (OS-assigned port); it only ever sends.
    let data_socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;

    let server_ip = cli.server_ip.unwrap_or_else(netinfo::local_ip);
    info!(%server_ip, cmd_port = cli.cmd_port, "waiting for CONNECT");

    let session = Arc::new(Session::new(data_socket, server_ip, cli.cmd_port));
    let shutdown = CancellationToken::new();

    let publisher_config = PublisherConfig {
        raw_var: cli.raw_var,
        text_var: cli.text_var,
        unit: (!cli.unit.is_empty()).then_some(cli.unit),
        step_ms: cli.step_ms,
        send_rate: cli.send_rate,
    };
    let source = SineSource::new(cli.points);

    let publisher_task = tokio::spawn(publisher::run(
        session.clone(),
        source,
        publisher_config,
        shutdown.clone(),
    ));
    let control_task = tokio::spawn(control::run(control_socket, session, shutdown.clone()));

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    shutdown.cancel();

    let _ = tokio::join!(publisher_task, control_task);
    Ok(())
}
