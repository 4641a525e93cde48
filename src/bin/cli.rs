//! calcnet CLI Client
//!
//! Interactive client for the calculator server.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use calcnet::config::{
    DEFAULT_DATAGRAM_BUFFER_SIZE, DEFAULT_DATAGRAM_PORT, DEFAULT_STREAM_BUFFER_SIZE,
    DEFAULT_STREAM_PORT, DEFAULT_WELCOME_MESSAGE,
};
use calcnet::console::{prompt_command, DEFAULT_PROMPT_ATTEMPTS};
use calcnet::log::{open_sink, LogSink, Role};
use calcnet::network::{resolve_endpoint, DatagramClient, StreamClient};
use calcnet::protocol::BYE;
use calcnet::{PeerPolicy, Result};
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

/// calcnet CLI
#[derive(Parser, Debug)]
#[command(name = "calcnet-cli")]
#[command(about = "CLI for the calcnet remote calculator")]
struct Args {
    /// Server address (host:port), transport default if omitted
    server: Option<String>,

    /// Transport to use
    #[arg(short, long, value_enum, default_value = "stream")]
    transport: TransportArg,

    /// Wire message size in bytes, must match the server
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Reaction to replies from an address other than the server
    #[arg(long, value_enum, default_value = "abort")]
    peer_policy: PolicyArg,

    /// Invalid lines accepted in a row before giving up
    #[arg(long, default_value_t = DEFAULT_PROMPT_ATTEMPTS)]
    attempts: usize,

    /// Append the protocol log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        tracing::error!("Client error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let log = open_sink(args.log_file.as_deref(), Role::Client);

    let (port, default_size) = match args.transport {
        TransportArg::Stream => (DEFAULT_STREAM_PORT, DEFAULT_STREAM_BUFFER_SIZE),
        TransportArg::Datagram => (DEFAULT_DATAGRAM_PORT, DEFAULT_DATAGRAM_BUFFER_SIZE),
    };
    let buffer_size = args.buffer_size.unwrap_or(default_size);

    let default = SocketAddr::from(([127, 0, 0, 1], port));
    if args.server.is_none() {
        log.log("Address and port not entered, standard value applied!");
    }
    let server = resolve_endpoint(args.server.as_deref(), default)?;
    log.log(&format!("Address resolved: {}", server));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match args.transport {
        TransportArg::Stream => {
            let mut client = StreamClient::connect(server, buffer_size, log)?;
            println!("{}", client.welcome());
            converse(&mut input, &mut output, args.attempts, buffer_size, |line| client.request(line))
        }
        TransportArg::Datagram => {
            let policy = match args.peer_policy {
                PolicyArg::Abort => PeerPolicy::Abort,
                PolicyArg::Ignore => PeerPolicy::Ignore,
            };
            let client = DatagramClient::open(server, buffer_size, policy, log)?;

            // No banner on the wire for datagrams, so show it locally
            println!("{}", DEFAULT_WELCOME_MESSAGE);
            converse(&mut input, &mut output, args.attempts, buffer_size, |line| client.request(line))
        }
    }
}

/// Prompt, send, print, until the server says Bye or input runs out
fn converse<R, W, F>(input: &mut R, output: &mut W, attempts: usize, buffer_size: usize, mut send: F) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<String>,
{
    while let Some(line) = prompt_command(input, output, attempts, buffer_size)? {
        let reply = send(&line)?;
        writeln!(output, "Received: {}", reply)?;

        if reply == BYE {
            break;
        }
    }

    Ok(())
}
