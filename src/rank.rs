//! Preference ranking of networks and addresses.
//!
//! Both sides share this: the controller uses it to pick the single
//! address it advertises, the dataplane uses it to decide which subnets
//! to scan first. Rank is the index of the first preferred block that
//! contains the candidate; lower wins. Anything outside every block
//! gets the sentinel rank one past the end.

use std::net::{Ipv4Addr, ToSocketAddrs};

use ipnet::Ipv4Net;
use log::warn;

use crate::types::LocalAddress;

/// Rank of a subnet against the preference order. The sentinel
/// `preferred.len()` means "matched nothing".
pub fn net_rank(net: &Ipv4Net, preferred: &[Ipv4Net]) -> usize {
    preferred
        .iter()
        .position(|block| block.contains(net))
        .unwrap_or(preferred.len())
}

/// Rank of a single address against the preference order.
pub fn addr_rank(ip: Ipv4Addr, preferred: &[Ipv4Net]) -> usize {
    preferred
        .iter()
        .position(|block| block.contains(&ip))
        .unwrap_or(preferred.len())
}

/// Pick the address the controller should advertise to the dataplane VM.
///
/// Priority: an address on `prefer_iface` if given, then the best-ranked
/// address (ties broken by interface name, then address, so repeated
/// runs on an unchanged host agree), then whatever the host's own name
/// resolves to, then loopback.
pub fn choose_advertise_ip(
    addrs: &[LocalAddress],
    prefer_iface: Option<&str>,
    preferred: &[Ipv4Net],
) -> Ipv4Addr {
    if let Some(want) = prefer_iface {
        if let Some(addr) = addrs.iter().find(|a| a.iface == want) {
            return addr.ip;
        }
        warn!("Preferred interface {} carries no global IPv4 address", want);
    }

    let mut ranked: Vec<(usize, &LocalAddress)> = addrs
        .iter()
        .map(|a| (addr_rank(a.ip, preferred), a))
        .collect();
    ranked.sort_by(|a, b| {
        (a.0, &a.1.iface, a.1.ip).cmp(&(b.0, &b.1.iface, b.1.ip))
    });

    match ranked.first() {
        Some(&(rank, addr)) if rank < preferred.len() => addr.ip,
        _ => hostname_fallback(),
    }
}

fn hostname_fallback() -> Ipv4Addr {
    let name = gethostname::gethostname().to_string_lossy().into_owned();
    let resolved = format!("{}:0", name)
        .to_socket_addrs()
        .ok()
        .and_then(|mut it| {
            it.find_map(|sa| match sa.ip() {
                std::net::IpAddr::V4(v4) => Some(v4),
                std::net::IpAddr::V6(_) => None,
            })
        });
    match resolved {
        Some(ip) => ip,
        None => {
            warn!("Hostname {} did not resolve to an IPv4 address", name);
            Ipv4Addr::LOCALHOST
        }
    }
}
