//! Data structures shared by the controller and dataplane sides.
//!
//! The discovery payload mirrors what the controller's REST endpoint
//! serves on `/discover`: a `controller` block with its listen ports and
//! a `vip` block describing the virtual service the dataplane balances
//! toward. Both keys must be present for a response to count as a hit;
//! everything inside them is optional and falls back to the defaults
//! below.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

/// Well-known path served by the controller REST app.
pub const DISCOVER_PATH: &str = "/discover";

/// Default controller REST port used for discovery probes.
pub const DEFAULT_REST_PORT: u16 = 8080;

/// Default OpenFlow listen port.
pub const DEFAULT_OF_PORT: u16 = 6653;

/// Default Prometheus metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 9100;

/// Default backend HTTP service port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// VIP used when the payload does not carry one.
pub const DEFAULT_VIP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 100);

/// One global-scope IPv4 address reported by the host, with the
/// interface that carries it. Snapshot taken once per discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAddress {
    pub iface: String,
    pub ip: Ipv4Addr,
    pub prefix_len: u8,
}

/// Body of a successful `/discover` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryPayload {
    pub controller: ControllerInfo,
    pub vip: VipInfo,
    /// Opaque backend descriptors; passed through, never interpreted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<serde_json::Value>,
}

/// Controller identity and listen ports as advertised by the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerInfo {
    /// May be absent; the responding host's address substitutes.
    pub ip: Option<Ipv4Addr>,
    pub of_listen_port: Option<u16>,
    pub rest_port: Option<u16>,
    pub metrics_port: Option<u16>,
}

/// Virtual service identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipInfo {
    pub ip: Ipv4Addr,
    pub port: Option<u16>,
    /// Service ports reachable behind the VIP.
    #[serde(default)]
    pub services: Vec<u16>,
}

/// Per-host result of one probe-and-fetch attempt within a subnet scan.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// TCP connect timed out or was refused.
    NoConnection,
    /// TCP connect succeeded but the fetch did not validate.
    ConnectionOnly,
    /// The host returned a well-formed discovery payload.
    Validated(DiscoveryPayload),
}

/// Outcome of a whole discovery run: where the controller is and what it
/// told us. `payload` is `None` only when an explicit override address
/// was trusted without a reachable REST endpoint.
#[derive(Debug, Clone)]
pub struct Discovered {
    pub controller: Ipv4Addr,
    pub payload: Option<DiscoveryPayload>,
    /// Subnet the controller was found in; `None` for override runs.
    pub subnet: Option<Ipv4Net>,
}

impl Discovered {
    pub fn openflow_port(&self) -> u16 {
        self.payload
            .as_ref()
            .and_then(|p| p.controller.of_listen_port)
            .unwrap_or(DEFAULT_OF_PORT)
    }

    pub fn vip(&self) -> Ipv4Addr {
        self.payload
            .as_ref()
            .map(|p| p.vip.ip)
            .unwrap_or(DEFAULT_VIP)
    }

    /// Backend HTTP port: prefer 8080 among the advertised services,
    /// otherwise the first advertised service, otherwise the default.
    pub fn http_port(&self) -> u16 {
        let services = match self.payload.as_ref() {
            Some(p) => &p.vip.services,
            None => return DEFAULT_HTTP_PORT,
        };
        if services.contains(&DEFAULT_HTTP_PORT) {
            DEFAULT_HTTP_PORT
        } else {
            services.first().copied().unwrap_or(DEFAULT_HTTP_PORT)
        }
    }
}
