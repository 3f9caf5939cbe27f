//! Packet transmission
//!
//! The emission loop only sees [`PacketSender`]. The raw sender owns one
//! layer-3 pnet channel with the IP header supplied by the builders; the
//! dry-run sender only counts.

use std::io;
use std::net::IpAddr;
use std::thread;

use pnet::packet::ip::IpNextHeaderProtocol;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::transport::{transport_channel, TransportChannelType, TransportSender};
use tracing::{debug, trace};

use crate::config::Config;
use crate::constants::{ipproto, SEND_RETRY_LIMIT, SEND_RETRY_WAIT};
use crate::error::{MapError, NetworkError, Result};

const CHANNEL_BUFFER_SIZE: usize = 4096;

pub trait PacketSender {
    /// Sends one fully built IPv4 packet to `config.ip.daddr`.
    fn send(&mut self, packet: &[u8], config: &Config) -> Result<()>;

    /// Releases the underlying socket. Safe to call more than once.
    fn close(&mut self);
}

pub struct RawSocketSender {
    tx: Option<TransportSender>,
}

impl RawSocketSender {
    pub fn new() -> Result<Self> {
        let protocol = TransportChannelType::Layer3(IpNextHeaderProtocol::new(ipproto::RAW));
        let (tx, _) = transport_channel(CHANNEL_BUFFER_SIZE, protocol)
            .map_network_error("raw IPv4 channel")?;
        debug!("Raw IPv4 channel opened");
        Ok(Self { tx: Some(tx) })
    }

    fn is_transient(error: &io::Error) -> bool {
        matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
    }
}

impl PacketSender for RawSocketSender {
    fn send(&mut self, packet: &[u8], config: &Config) -> Result<()> {
        let tx = self
            .tx
            .as_mut()
            .ok_or_else(|| NetworkError::PacketSend("channel already closed".to_string()))?;
        let destination = IpAddr::V4(config.ip.daddr);

        let mut attempt = 0;
        loop {
            let ipv4 = Ipv4Packet::new(packet)
                .ok_or_else(|| NetworkError::PacketSend("packet shorter than an IPv4 header".to_string()))?;
            match tx.send_to(ipv4, destination) {
                Ok(_) => return Ok(()),
                Err(e) if Self::is_transient(&e) && attempt < SEND_RETRY_LIMIT => {
                    attempt += 1;
                    trace!("Transient send failure ({}), retry {}", e, attempt);
                    thread::sleep(SEND_RETRY_WAIT);
                }
                Err(e) => {
                    return Err(NetworkError::PacketSend(format!("to {}: {}", destination, e)).into());
                }
            }
        }
    }

    fn close(&mut self) {
        if self.tx.take().is_some() {
            debug!("Raw IPv4 channel closed");
        }
    }
}

impl Drop for RawSocketSender {
    fn drop(&mut self) {
        self.close();
    }
}

/// Accepts every packet without touching the network.
#[derive(Debug, Default)]
pub struct DryRunSender {
    pub packets: u64,
    pub bytes: u64,
    closed: bool,
}

impl DryRunSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl PacketSender for DryRunSender {
    fn send(&mut self, packet: &[u8], _config: &Config) -> Result<()> {
        if self.closed {
            return Err(NetworkError::PacketSend("dry-run sender already closed".to_string()).into());
        }
        self.packets += 1;
        self.bytes += packet.len() as u64;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Opens the sender selected by `safety.dry_run`.
pub fn open(config: &Config) -> Result<Box<dyn PacketSender>> {
    if config.safety.dry_run {
        Ok(Box::new(DryRunSender::new()))
    } else {
        Ok(Box::new(RawSocketSender::new()?))
    }
}
