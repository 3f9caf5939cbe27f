//! # proto-flood
//!
//! Builds raw IPv4 packets for a dozen protocol families and injects them
//! towards a host or a CIDR range, optionally wrapped in GRE.
//!
//! # Disclaimer
//!
//! - The software is for educational and authorized testing purposes only.
//! - Unauthorized use (especially against systems you don't own or lack explicit permission to test) is strictly prohibited and may be illegal.

pub mod audit;
pub mod buffer;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod monitor;
pub mod network;
pub mod protocol;
pub mod random;
pub mod registry;
pub mod sender;
pub mod simulation;
pub mod stats;
pub mod target;
pub mod turbo;
pub mod validation;
pub mod worker;

pub use config::Config;
pub use error::{FloodError, Result};
pub use protocol::synthesize;
pub use registry::{ProtocolModule, Selection, MODULES};
