//! End-to-end discovery runs against canned in-process controllers.
//!
//! The canned controller is a bare TCP listener speaking just enough
//! HTTP/1.1 for the fetcher; everything runs on loopback so probes to
//! the other addresses in the test subnets fail fast with refusals.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use lbscout::{Config, Discovered, Discovery, DiscoveryError};

const PAYLOAD: &str = r#"{
    "controller": {"of_listen_port": 6653, "rest_port": 8080, "metrics_port": 9100},
    "vip": {"ip": "10.0.0.100", "port": 80, "services": [8080]},
    "backends": [{"name": "h2", "ip": "10.0.0.2"}]
}"#;

/// Serve `body` with `status` on a loopback port for every connection.
async fn spawn_controller(status: &'static str, body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                // Probe connections close without sending anything.
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let resp = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = sock.write_all(resp.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    port
}

/// A loopback port with nothing listening on it.
async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn test_config(rest_port: u16) -> Config {
    Config {
        rest_port,
        probe_timeout_ms: 200,
        fetch_timeout_ms: 500,
        scan_concurrency: 32,
        ..Config::default()
    }
}

fn net(s: &str) -> Ipv4Net {
    s.parse().unwrap()
}

#[tokio::test]
async fn finds_controller_and_stops_at_first_subnet() {
    let port = spawn_controller("200 OK", PAYLOAD).await;
    let disco = Discovery::new(test_config(port)).unwrap();

    let found: Discovered = disco
        .run_over(vec![net("127.0.0.0/29"), net("127.0.0.8/29")])
        .await
        .unwrap();

    assert_eq!(found.controller, Ipv4Addr::new(127, 0, 0, 1));
    // Payload carries no controller ip, so the responding host stands in.
    assert_eq!(found.subnet, Some(net("127.0.0.0/29")));
    assert_eq!(found.openflow_port(), 6653);
    assert_eq!(found.vip(), Ipv4Addr::new(10, 0, 0, 100));
    assert_eq!(found.http_port(), 8080);
}

#[tokio::test]
async fn exhaustion_names_every_attempted_subnet() {
    let port = free_port().await;
    let disco = Discovery::new(test_config(port)).unwrap();

    let err = disco
        .run_over(vec![net("127.0.0.0/29"), net("127.0.0.8/29")])
        .await
        .unwrap_err();

    assert!(matches!(err, DiscoveryError::Exhausted { .. }));
    let msg = err.to_string();
    assert!(msg.contains("127.0.0.0/29"), "message was: {}", msg);
    assert!(msg.contains("127.0.0.8/29"), "message was: {}", msg);
}

#[tokio::test]
async fn payload_without_vip_is_a_miss() {
    let port = spawn_controller("200 OK", r#"{"controller": {"of_listen_port": 6653}}"#).await;
    let disco = Discovery::new(test_config(port)).unwrap();

    let err = disco.run_over(vec![net("127.0.0.0/29")]).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Exhausted { .. }));
}

#[tokio::test]
async fn non_2xx_response_is_a_miss() {
    let port = spawn_controller("503 Service Unavailable", "{}").await;
    let disco = Discovery::new(test_config(port)).unwrap();

    let err = disco.run_over(vec![net("127.0.0.0/29")]).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Exhausted { .. }));
}

#[tokio::test]
async fn explicit_override_skips_scanning() {
    let port = spawn_controller("200 OK", PAYLOAD).await;
    let cfg = Config {
        controller_ip: Some(Ipv4Addr::new(127, 0, 0, 1)),
        ..test_config(port)
    };
    let disco = Discovery::new(cfg).unwrap();

    let found = disco.run().await.unwrap();
    assert_eq!(found.controller, Ipv4Addr::new(127, 0, 0, 1));
    assert_eq!(found.subnet, None);
    assert!(found.payload.is_some());
}

#[tokio::test]
async fn trusted_override_survives_dead_endpoint() {
    let port = free_port().await;
    let cfg = Config {
        controller_ip: Some(Ipv4Addr::new(127, 0, 0, 1)),
        ..test_config(port)
    };
    let disco = Discovery::new(cfg).unwrap();

    let found = disco.run().await.unwrap();
    assert_eq!(found.controller, Ipv4Addr::new(127, 0, 0, 1));
    assert!(found.payload.is_none());
    // Defaults fill in for the missing payload.
    assert_eq!(found.openflow_port(), 6653);
    assert_eq!(found.vip(), Ipv4Addr::new(10, 0, 0, 100));
}

#[tokio::test]
async fn strict_override_fails_on_dead_endpoint() {
    let port = free_port().await;
    let cfg = Config {
        controller_ip: Some(Ipv4Addr::new(127, 0, 0, 1)),
        strict_override: true,
        ..test_config(port)
    };
    let disco = Discovery::new(cfg).unwrap();

    let err = disco.run().await.unwrap_err();
    assert!(matches!(err, DiscoveryError::Unvalidated { .. }));
    assert!(err.to_string().contains("127.0.0.1"));
}

#[tokio::test]
async fn empty_candidate_list_fails_fast() {
    let disco = Discovery::new(test_config(free_port().await)).unwrap();
    let err = disco.run_over(Vec::new()).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::NoCandidates));
}

#[tokio::test]
async fn payload_controller_ip_wins_over_responding_host() {
    let port = spawn_controller(
        "200 OK",
        r#"{"controller": {"ip": "192.168.56.121"}, "vip": {"ip": "10.0.0.100"}}"#,
    )
    .await;
    let disco = Discovery::new(test_config(port)).unwrap();

    let found = disco.run_over(vec![net("127.0.0.0/29")]).await.unwrap();
    assert_eq!(found.controller, Ipv4Addr::new(192, 168, 56, 121));
}
