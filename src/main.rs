//! lbscout entry point.

use std::net::Ipv4Addr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lbscout::types::DISCOVER_PATH;
use lbscout::{netif, rank, Config, Discovery};

#[derive(Parser)]
#[command(name = "lbscout", about = "Controller discovery for the hybrid LB lab")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the controller from the dataplane VM.
    Discover {
        /// Controller address; skips subnet scanning entirely.
        #[arg(long)]
        controller_ip: Option<Ipv4Addr>,
        /// Controller REST port carrying /discover.
        #[arg(long)]
        rest_port: Option<u16>,
        /// Fail instead of trusting an unreachable --controller-ip.
        #[arg(long)]
        strict: bool,
        /// Print the resolved endpoints as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Choose and print the address the controller should advertise.
    Advertise {
        /// Advertise this address instead of auto-selecting.
        #[arg(long)]
        advertise_ip: Option<Ipv4Addr>,
        /// Prefer the address on this interface (e.g. enp0s3).
        #[arg(long)]
        prefer_iface: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    // Flags beat environment, environment beats the config file,
    // the file beats compiled-in defaults.
    let mut cfg = Config::load()?;

    match cli.command {
        Command::Discover {
            controller_ip,
            rest_port,
            strict,
            json,
        } => {
            if let Some(ip) = controller_ip {
                cfg.controller_ip = Some(ip);
            }
            if let Some(port) = rest_port {
                cfg.rest_port = port;
            }
            if strict {
                cfg.strict_override = true;
            }
            run_discover(cfg, json).await
        }
        Command::Advertise {
            advertise_ip,
            prefer_iface,
        } => {
            if let Some(ip) = advertise_ip {
                cfg.advertise_ip = Some(ip);
            }
            if let Some(iface) = prefer_iface {
                cfg.prefer_iface = Some(iface);
            }
            run_advertise(cfg)
        }
    }
}

async fn run_discover(cfg: Config, json: bool) -> Result<()> {
    let rest_port = cfg.rest_port;
    let disco = Discovery::new(cfg)?;
    let found = disco.run().await?;

    if json {
        let doc = serde_json::json!({
            "controller_ip": found.controller,
            "of_port": found.openflow_port(),
            "rest_port": rest_port,
            "vip": found.vip(),
            "http_port": found.http_port(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Using controller:");
    println!("  OpenFlow: {}:{}", found.controller, found.openflow_port());
    println!(
        "  REST:     http://{}:{}{}",
        found.controller, rest_port, DISCOVER_PATH
    );
    println!("  VIP:      {}", found.vip());
    println!("  HTTP:     {}", found.http_port());
    Ok(())
}

fn run_advertise(cfg: Config) -> Result<()> {
    let ip = match cfg.advertise_ip {
        Some(ip) => ip,
        None => {
            let addrs = netif::local_addresses();
            rank::choose_advertise_ip(&addrs, cfg.prefer_iface.as_deref(), &cfg.preferred_nets)
        }
    };

    println!("Inter-VM IP (advertise): {}", ip);
    println!("  OpenFlow: tcp://{}:{}", ip, cfg.of_port);
    println!("  REST API: http://{}:{}{}", ip, cfg.rest_port, DISCOVER_PATH);
    println!("  Metrics : http://{}:{}/metrics", ip, cfg.metrics_port);
    println!("  VIP     : {}", cfg.vip_ip);
    Ok(())
}
