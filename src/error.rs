//! Discovery failure taxonomy.
//!
//! Probe and fetch misses are absorbed where they happen and never show
//! up here; only the two conditions that must reach the caller do:
//! running out of candidates and being unable to probe at all.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No private addresses and the expected-subnet fallback is disabled.
    #[error("no candidate subnets to scan; provide an explicit controller address")]
    NoCandidates,

    /// Every ranked candidate subnet was scanned without a validated hit.
    #[error(
        "controller not found on any candidate subnet (attempted: {})",
        .attempted.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
    )]
    Exhausted { attempted: Vec<Ipv4Net> },

    /// Strict override mode: the given address did not validate.
    #[error("controller at {addr} did not return a valid discovery payload")]
    Unvalidated { addr: Ipv4Addr },

    /// Sockets could not be opened at all (fd exhaustion and the like).
    /// Distinct from a probe miss and never swallowed as one.
    #[error("probe failed with a non-connection error: {0}")]
    Resource(#[from] std::io::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build discovery HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
