//! Discovery orchestration: rank candidate subnets, sweep each one
//! concurrently, stop at the first host whose payload validates.
//!
//! Subnets are visited strictly in rank order; within a subnet probes
//! and fetches run fanned out under a concurrency bound, and the first
//! validated payload wins no matter which probe produced it. Dropping
//! the in-flight fan-out is the cancellation: once a winner is found the
//! remaining probes are abandoned, never awaited.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::pin::pin;

use futures_util::stream::{self, StreamExt};
use ipnet::Ipv4Net;
use log::{debug, info, warn};
use reqwest::Client;

use crate::candidates;
use crate::config::Config;
use crate::error::DiscoveryError;
use crate::fetch;
use crate::netif;
use crate::scan;
use crate::types::{Discovered, ScanOutcome};

pub struct Discovery {
    cfg: Config,
    client: Client,
}

impl Discovery {
    /// Build the orchestrator and its HTTP client. Client construction
    /// failing is a resource problem, not a miss.
    pub fn new(cfg: Config) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(cfg.fetch_timeout())
            .connect_timeout(cfg.fetch_timeout())
            .build()?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// One best-effort discovery pass.
    ///
    /// An explicit controller address bypasses enumeration and scanning
    /// entirely. Otherwise local subnets are ranked and swept until a
    /// payload validates or every candidate is exhausted. Retrying is
    /// the caller's decision; this never loops.
    pub async fn run(&self) -> Result<Discovered, DiscoveryError> {
        if let Some(addr) = self.cfg.controller_ip {
            return self.check_override(addr).await;
        }

        let addrs = netif::local_addresses();
        let nets = candidates::candidate_networks(&addrs, &self.cfg);
        self.run_over(nets).await
    }

    /// Sweep an explicit candidate list in order. Exposed for callers
    /// that already know which subnets to try.
    pub async fn run_over(&self, nets: Vec<Ipv4Net>) -> Result<Discovered, DiscoveryError> {
        if nets.is_empty() {
            return Err(DiscoveryError::NoCandidates);
        }

        for net in &nets {
            info!(
                "Scanning {} for controller REST on port {} ...",
                net, self.cfg.rest_port
            );
            if let Some(found) = self.scan_subnet(*net).await? {
                info!(
                    "Found controller at {}:{}",
                    found.controller, self.cfg.rest_port
                );
                return Ok(found);
            }
        }
        Err(DiscoveryError::Exhausted { attempted: nets })
    }

    /// Probe every host in `net`, fetching from the ones that accept.
    /// Returns the first validated hit, `None` when the subnet is clean.
    async fn scan_subnet(&self, net: Ipv4Net) -> Result<Option<Discovered>, DiscoveryError> {
        let mut outcomes = pin!(stream::iter(net.hosts())
            .map(|host| async move { (host, self.check_host(host).await) })
            .buffer_unordered(self.cfg.scan_concurrency.max(1)));

        while let Some((host, outcome)) = outcomes.next().await {
            match outcome? {
                ScanOutcome::Validated(payload) => {
                    let controller = payload.controller.ip.unwrap_or(host);
                    return Ok(Some(Discovered {
                        controller,
                        payload: Some(payload),
                        subnet: Some(net),
                    }));
                }
                ScanOutcome::ConnectionOnly => {
                    debug!("{} accepted TCP but served no valid payload", host);
                }
                ScanOutcome::NoConnection => {}
            }
        }
        Ok(None)
    }

    /// Probe-then-fetch for a single host. Misses of either kind stay
    /// local; only resource failures bubble up.
    async fn check_host(&self, host: Ipv4Addr) -> Result<ScanOutcome, DiscoveryError> {
        let addr = SocketAddrV4::new(host, self.cfg.rest_port);
        if !scan::probe_port(addr, self.cfg.probe_timeout()).await? {
            return Ok(ScanOutcome::NoConnection);
        }
        match fetch::fetch_payload(&self.client, host, self.cfg.rest_port).await {
            Some(payload) => Ok(ScanOutcome::Validated(payload)),
            None => Ok(ScanOutcome::ConnectionOnly),
        }
    }

    /// Operator-supplied controller address: go straight to fetch.
    /// Without `strict_override` an unreachable endpoint is only a
    /// warning and the address is trusted with default ports.
    async fn check_override(&self, addr: Ipv4Addr) -> Result<Discovered, DiscoveryError> {
        info!("Using explicit controller address {}", addr);
        match fetch::fetch_payload(&self.client, addr, self.cfg.rest_port).await {
            Some(payload) => Ok(Discovered {
                controller: payload.controller.ip.unwrap_or(addr),
                payload: Some(payload),
                subnet: None,
            }),
            None if self.cfg.strict_override => Err(DiscoveryError::Unvalidated { addr }),
            None => {
                warn!(
                    "Could not reach controller REST at {}:{}; continuing with defaults",
                    addr, self.cfg.rest_port
                );
                Ok(Discovered {
                    controller: addr,
                    payload: None,
                    subnet: None,
                })
            }
        }
    }
}
