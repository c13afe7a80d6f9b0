//! Candidate subnet construction for the dataplane-side scan.

use ipnet::Ipv4Net;
use log::debug;

use crate::config::Config;
use crate::rank;
use crate::types::LocalAddress;

/// Build the ordered list of subnets a discovery run will scan.
///
/// Private local subnets are taken as-is, except that anything wider
/// than a /24 is shrunk to the /24 around the local address so a single
/// subnet never costs more than 254 probes. The statically expected
/// inter-VM network is appended regardless of what the OS reported,
/// the list is deduplicated, sorted best-rank-first, and capped.
pub fn candidate_networks(addrs: &[LocalAddress], cfg: &Config) -> Vec<Ipv4Net> {
    let mut nets: Vec<Ipv4Net> = Vec::new();

    for addr in addrs {
        if !addr.ip.is_private() {
            continue;
        }
        let prefix = if addr.prefix_len < 24 { 24 } else { addr.prefix_len };
        match Ipv4Net::new(addr.ip, prefix) {
            Ok(net) => nets.push(net.trunc()),
            Err(_) => {
                debug!("Skipping {} with unusable prefix /{}", addr.ip, addr.prefix_len);
            }
        }
    }

    if let Some(expected) = cfg.expected_net {
        nets.push(expected.trunc());
    }

    nets.sort_by_key(|net| {
        (rank::net_rank(net, &cfg.preferred_nets), net.prefix_len(), *net)
    });
    nets.dedup();
    nets.truncate(cfg.max_subnets);
    nets
}
