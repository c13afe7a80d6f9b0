use std::net::Ipv4Addr;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_METRICS_PORT, DEFAULT_OF_PORT, DEFAULT_REST_PORT, DEFAULT_VIP};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Explicit controller address; set means no enumeration or scanning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_ip: Option<Ipv4Addr>,
    /// Fail instead of trusting an unreachable `controller_ip` override.
    pub strict_override: bool,
    /// Interface whose address wins outright when choosing what to advertise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_iface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_ip: Option<Ipv4Addr>,
    /// Controller REST port probed during discovery.
    pub rest_port: u16,
    pub of_port: u16,
    pub metrics_port: u16,
    pub vip_ip: Ipv4Addr,
    /// Preference order for local networks; index is the rank.
    pub preferred_nets: Vec<Ipv4Net>,
    /// Subnet always appended to the candidate list, bound or not.
    /// `None` disables the fallback.
    pub expected_net: Option<Ipv4Net>,
    /// Cap on how many candidate subnets one run may scan.
    pub max_subnets: usize,
    pub probe_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
    /// Concurrent TCP probes in flight per subnet.
    pub scan_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            controller_ip: None,
            strict_override: false,
            prefer_iface: None,
            advertise_ip: None,
            rest_port: DEFAULT_REST_PORT,
            of_port: DEFAULT_OF_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            vip_ip: DEFAULT_VIP,
            // The inter-VM host-only network first, then RFC1918 blocks
            // in descending specificity.
            preferred_nets: vec![
                "192.168.56.0/24".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
                "10.0.0.0/8".parse().unwrap(),
                "172.16.0.0/12".parse().unwrap(),
            ],
            expected_net: Some("192.168.56.0/24".parse().unwrap()),
            max_subnets: 4,
            probe_timeout_ms: 250,
            fetch_timeout_ms: 1_000,
            scan_concurrency: 96,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("lbscout.toml"))
            .merge(Json::file("lbscout.json"))
            .merge(Env::prefixed("LBSCOUT_"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
