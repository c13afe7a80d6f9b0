//! Controller discovery for the hybrid load-balancer lab.
//!
//! Two hosts have to find each other with no static configuration: the
//! controller VM picks which of its addresses to advertise, and the
//! dataplane VM locates the controller's REST endpoint by sweeping
//! ranked candidate subnets. This crate is that discovery subsystem;
//! installing, extracting and launching the actual topology stay with
//! the surrounding tooling.

pub mod candidates;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod netif;
pub mod rank;
pub mod scan;
pub mod types;

pub use config::Config;
pub use discovery::Discovery;
pub use error::DiscoveryError;
pub use types::{Discovered, DiscoveryPayload, LocalAddress, ScanOutcome};
