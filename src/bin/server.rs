//! calcnet Server Binary
//!
//! Starts the calculator server on TCP or UDP.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use calcnet::config::{EncoderMode, PeerPolicy, Transport};
use calcnet::log::{open_sink, Role};
use calcnet::network::{DatagramServer, StreamServer};
use calcnet::Config;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TransportArg {
    Stream,
    Datagram,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Abort,
    Ignore,
}

/// calcnet Server
#[derive(Parser, Debug)]
#[command(name = "calcnet-server")]
#[command(about = "Remote calculator server")]
#[command(version)]
struct Args {
    /// Transport to serve on
    #[arg(short, long, value_enum, default_value = "stream")]
    transport: TransportArg,

    /// Listen address (host:port), transport default if omitted
    #[arg(short, long)]
    listen: Option<String>,

    /// Wire message size in bytes, transport default if omitted
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Reply with the whole operation (`3.00 + 4.00 = 7.00`)
    #[arg(long, conflicts_with = "plain")]
    echo: bool,

    /// Reply with the bare value (`7.00`)
    #[arg(long)]
    plain: bool,

    /// Only serve datagrams from this address
    #[arg(long)]
    allowed_peer: Option<IpAddr>,

    /// Reaction to datagrams from any other address
    #[arg(long, value_enum, default_value = "abort")]
    peer_policy: PolicyArg,

    /// Append the protocol log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,calcnet=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let config = build_config(&args);

    tracing::info!("calcnet Server v{}", calcnet::VERSION);
    tracing::info!("Transport: {:?}", config.transport);
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Buffer size: {}", config.buffer_size);

    let log = open_sink(config.log_file.as_deref(), Role::Server);

    let result = match config.transport {
        Transport::Stream => StreamServer::bind(config, log).and_then(|server| server.run()),
        Transport::Datagram => DatagramServer::bind(config, log).and_then(|server| server.run()),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

fn build_config(args: &Args) -> Config {
    let transport = match args.transport {
        TransportArg::Stream => Transport::Stream,
        TransportArg::Datagram => Transport::Datagram,
    };

    let mut builder = Config::builder()
        .transport(transport)
        .allowed_peer(args.allowed_peer)
        .peer_policy(match args.peer_policy {
            PolicyArg::Abort => PeerPolicy::Abort,
            PolicyArg::Ignore => PeerPolicy::Ignore,
        });

    if let Some(listen) = &args.listen {
        builder = builder.listen_addr(listen);
    }
    if let Some(size) = args.buffer_size {
        builder = builder.buffer_size(size);
    }
    if args.echo {
        builder = builder.encoder_mode(EncoderMode::Echo);
    } else if args.plain {
        builder = builder.encoder_mode(EncoderMode::Plain);
    }
    if let Some(path) = &args.log_file {
        builder = builder.log_file(path);
    }

    builder.build()
}
