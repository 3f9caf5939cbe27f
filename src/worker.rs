//! Emission loop
//!
//! One [`Worker`] per process. Each iteration draws a destination from the
//! CIDR range, picks the next module, builds into the process buffer and
//! hands the bytes to the sender.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::buffer::PacketBuffer;
use crate::config::Config;
use crate::constants::{stats, YIELD_INTERVAL};
use crate::error::Result;
use crate::protocol::synthesize;
use crate::random::Randomizer;
use crate::registry::{self, ProtocolModule, Selection};
use crate::sender::PacketSender;
use crate::stats::FloodStats;
use crate::target::CidrTarget;

/// How many packets a process emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Flood,
    Packets(u64),
}

impl Budget {
    pub fn from_config(config: &Config) -> Self {
        if config.emission.flood {
            Budget::Flood
        } else {
            Budget::Packets(config.emission.threshold)
        }
    }
}

pub struct Worker {
    config: Config,
    target: CidrTarget,
    selection: Selection,
    order: Vec<usize>,
    cursor: usize,
    buffer: PacketBuffer,
    rng: Randomizer,
    sender: Box<dyn PacketSender>,
    stats: Arc<FloodStats>,
    running: Arc<AtomicBool>,
}

impl Worker {
    pub fn new(
        config: Config,
        target: CidrTarget,
        selection: Selection,
        sender: Box<dyn PacketSender>,
        stats: Arc<FloodStats>,
        running: Arc<AtomicBool>,
        rng: Randomizer,
    ) -> Self {
        let order = match selection {
            Selection::Single(index) => vec![index],
            Selection::All => (0..registry::count()).collect(),
        };

        Self {
            config,
            target,
            selection,
            order,
            cursor: 0,
            buffer: PacketBuffer::new(),
            rng,
            sender,
            stats,
            running,
        }
    }

    /// Next module in cycling order, reshuffling at the start of every pass
    /// when `emission.shuffle` is set.
    pub fn next_module(&mut self) -> &'static ProtocolModule {
        if self.cursor == 0 && self.selection == Selection::All && self.config.emission.shuffle {
            self.rng.shuffle(&mut self.order);
        }
        let index = self.order[self.cursor];
        self.cursor = (self.cursor + 1) % self.order.len();
        &registry::MODULES[index]
    }

    /// Builds and sends one packet.
    pub fn emit_one(&mut self) -> Result<()> {
        self.config.ip.daddr = self.target.next_address(&mut self.rng);
        let module = self.next_module();

        let packet = synthesize(&mut self.config, module, &mut self.buffer, &mut self.rng)?;
        self.sender.send(packet, &self.config)?;
        self.stats.increment_sent(packet.len() as u64, module.acronym);

        let sent = self.stats.sent();
        if sent % stats::LOG_FREQUENCY == 0 {
            trace!("{} packets sent, last {} to {}", sent, module.acronym, self.config.ip.daddr);
        }
        Ok(())
    }

    /// Emits until the budget is spent, the run is stopped or a fatal error
    /// occurs. Returns the number of packets attempted.
    pub async fn run(mut self, budget: Budget) -> Result<u64> {
        let mut attempted = 0u64;
        let result = loop {
            if !self.running.load(Ordering::Relaxed) {
                break Ok(attempted);
            }
            if let Budget::Packets(limit) = budget {
                if attempted >= limit {
                    break Ok(attempted);
                }
            }

            attempted += 1;
            if let Err(e) = self.emit_one() {
                if e.is_fatal() || self.config.emission.strict {
                    break Err(e);
                }
                debug!("Send failed: {}", e);
                self.stats.increment_failed();
            }

            if attempted % YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        };

        self.sender.close();
        result
    }
}
