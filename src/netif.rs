//! Local interface enumeration.

use if_addrs::{get_if_addrs, IfAddr};
use log::warn;

use crate::types::LocalAddress;

/// Snapshot of the host's global-scope IPv4 addresses.
///
/// Loopback and link-local addresses are excluded. Enumeration failure
/// is not fatal to a discovery run: the caller falls back to the
/// statically expected subnet, so this returns an empty set instead of
/// an error.
pub fn local_addresses() -> Vec<LocalAddress> {
    let ifaces = match get_if_addrs() {
        Ok(list) => list,
        Err(e) => {
            warn!("Interface enumeration failed: {}. Continuing without local addresses.", e);
            return Vec::new();
        }
    };

    let mut out = Vec::new();
    for iface in ifaces {
        if iface.is_loopback() {
            continue;
        }
        if let IfAddr::V4(v4) = iface.addr {
            if v4.ip.is_loopback() || v4.ip.is_link_local() {
                continue;
            }
            out.push(LocalAddress {
                iface: iface.name,
                ip: v4.ip,
                prefix_len: u32::from(v4.netmask).count_ones() as u8,
            });
        }
    }
    out
}
