//! Fetching and validating a candidate host's discovery endpoint.

use std::net::Ipv4Addr;

use log::debug;
use reqwest::Client;

use crate::types::{DiscoveryPayload, DISCOVER_PATH};

/// GET `/discover` from a host that already accepted a TCP connection.
///
/// Any transport error, non-2xx status or malformed body turns the host
/// into a miss; nothing here ever propagates to the orchestrator. The
/// request timeout is carried by the client itself.
pub async fn fetch_payload(client: &Client, host: Ipv4Addr, port: u16) -> Option<DiscoveryPayload> {
    let url = format!("http://{}:{}{}", host, port, DISCOVER_PATH);

    let resp = match client.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            debug!("{}: fetch failed: {}", url, e);
            return None;
        }
    };
    if !resp.status().is_success() {
        debug!("{}: status {}", url, resp.status());
        return None;
    }
    match resp.json::<DiscoveryPayload>().await {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!("{}: body rejected: {}", url, e);
            None
        }
    }
}
