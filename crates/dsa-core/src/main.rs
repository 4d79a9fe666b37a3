//! dsactl: drive a DSA fabric described by a topology file.
//!
//! The fabric runs on the tail-tag driver with an in-memory link layer, so
//! every command is a dry run of what the hooks would do on a real host.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dsa_api::Frame;
use dsa_core::{Fabric, TopologyConfig};
use log::{error, info};

/// DSA fabric control tool
#[derive(Parser, Debug)]
#[command(name = "dsactl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology file (YAML, or JSON with a .json extension)
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply the topology's LAG operations and print the LAG table as JSON
    Lag,

    /// Feed a hex-encoded frame through the receive hook
    Route {
        /// Interface the frame arrives on (defaults to the master)
        #[arg(short = 'i', long)]
        iface: Option<String>,

        /// Deliver frames to their slave; link-local control frames stay on the master
        #[arg(long)]
        deliver: bool,

        /// Frame bytes, hex encoded
        frame: String,
    },

    /// Transmit a hex-encoded frame and print the tagged wire bytes
    Send {
        /// Sending interface
        #[arg(short = 'f', long)]
        from: String,

        /// Frame bytes, hex encoded
        frame: String,
    },
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = TopologyConfig::load(&args.config)?;
    let fabric = Fabric::build(&config)?;
    info!("Loaded topology from {}", args.config.display());

    match args.command {
        Command::Lag => {
            let mut failed = 0;
            for op in &config.lag {
                if let Err(e) = fabric.apply_lag(op) {
                    error!("{:?}: {} ({})", op, e, e.errno());
                    failed += 1;
                }
            }
            let snapshot = fabric.lag_snapshot()?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            if failed > 0 {
                return Err(format!("{} LAG operations failed", failed).into());
            }
        }
        Command::Route {
            iface,
            deliver,
            frame,
        } => {
            let arriving = match iface {
                Some(name) => fabric.iface(&name)?,
                None => fabric.master(),
            };
            if deliver {
                fabric.deliver_to_slaves()?;
            }
            let mut frame = Frame::new(hex::decode(frame.trim())?);
            let chosen = fabric.registry().receive(arriving, &mut frame);
            println!("{} {}", fabric.iface_name(chosen), hex::encode(frame.data()));
        }
        Command::Send { from, frame } => {
            let device = fabric.iface(&from)?;
            let frame = Frame::new(hex::decode(frame.trim())?);
            if let Err(e) = fabric.registry().transmit(device, frame) {
                error!("Transmit from {} failed with errno {}", from, e.errno());
                return Err(e.into());
            }
            for frame in fabric.take_wire() {
                println!("{}", hex::encode(frame.data()));
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
