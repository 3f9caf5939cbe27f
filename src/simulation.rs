//! Run orchestration and lifecycle management
//!
//! Wires one process's worker to its sender, reporting tasks and signal
//! handling. In turbo mode both processes run a `Simulation`; only the parent
//! writes the audit entry and reaps the child.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time;
use tracing::{error, info, warn};

use crate::audit::create_audit_entry;
use crate::config::Config;
use crate::constants::GRACEFUL_SHUTDOWN_TIMEOUT;
use crate::error::{MapError, Result};
use crate::monitor::SystemMonitor;
use crate::random::Randomizer;
use crate::registry::{self, Selection};
use crate::sender;
use crate::stats::FloodStats;
use crate::target::CidrTarget;
use crate::turbo::{self, Role};
use crate::worker::{Budget, Worker};

/// Per-process run controller
pub struct Simulation {
    config: Config,
    target_ip: Ipv4Addr,
    target: CidrTarget,
    selection: Selection,
    role: Role,
    stats: Arc<FloodStats>,
    running: Arc<AtomicBool>,
    system_monitor: Arc<SystemMonitor>,
}

impl Simulation {
    pub fn new(config: Config, target_ip: Ipv4Addr, selection: Selection, role: Role) -> Result<Self> {
        let target = CidrTarget::new(target_ip, config.target.bits)?;
        let stats = Arc::new(FloodStats::new(
            config.export.enabled.then_some(config.export.clone()),
        ));
        let running = Arc::new(AtomicBool::new(true));
        let system_monitor = Arc::new(SystemMonitor::new(config.monitoring.system_monitoring));

        Ok(Self {
            config,
            target_ip,
            target,
            selection,
            role,
            stats,
            running,
            system_monitor,
        })
    }

    pub fn stats(&self) -> Arc<FloodStats> {
        self.stats.clone()
    }

    /// Runs until the budget is spent or a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        if self.role != Role::Child {
            self.setup_audit_logging()?;
            self.print_simulation_info();
        }
        self.spawn_monitoring_tasks();

        let budget = turbo::budget_for(self.role, &self.config);
        let sender = sender::open(&self.config)?;
        let worker = Worker::new(
            self.config.clone(),
            self.target,
            self.selection,
            sender,
            self.stats.clone(),
            self.running.clone(),
            Randomizer::from_entropy(),
        );

        let mut interrupted = false;
        let outcome = tokio::select! {
            received = shutdown_signal() => {
                interrupted = true;
                received.map(|name| info!("🛑 Received {}, shutting down gracefully...", name))
            }
            result = worker.run(budget) => result.map(|attempted| {
                info!("Emission finished after {} packets", attempted);
            }),
        };
        self.running.store(false, Ordering::Relaxed);

        if let Role::Parent { child } = self.role {
            self.reap_child(child, interrupted).await;
        }

        self.finalize_simulation().await;
        outcome
    }

    fn setup_audit_logging(&self) -> Result<()> {
        if self.config.safety.audit_logging {
            create_audit_entry(&self.config, &self.target_ip, &self.stats.session_id)?;
        }
        Ok(())
    }

    async fn reap_child(&self, child: libc::pid_t, interrupted: bool) {
        if interrupted {
            turbo::terminate_child(child);
        }
        match tokio::task::spawn_blocking(move || turbo::wait_for_child(child)).await {
            Ok(Ok(0)) => {}
            Ok(Ok(code)) => warn!("Child process {} exited with status {}", child, code),
            Ok(Err(e)) => error!("{}", e),
            Err(e) => error!("Unable to wait for child process {}: {}", child, e),
        }
    }

    fn spawn_monitoring_tasks(&self) {
        self.spawn_stats_reporter();
        self.spawn_export_task();
    }

    fn spawn_stats_reporter(&self) {
        let stats = self.stats.clone();
        let running = self.running.clone();
        let system_monitor = self.system_monitor.clone();
        let stats_interval = self.config.monitoring.stats_interval.max(1);

        tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                time::sleep(StdDuration::from_secs(stats_interval)).await;
                let sys_stats = system_monitor.get_system_stats().await;
                stats.print_stats(sys_stats.as_ref());
            }
        });
    }

    fn spawn_export_task(&self) {
        if let Some(export_interval) = self.config.monitoring.export_interval {
            if self.config.export.enabled {
                let stats = self.stats.clone();
                let running = self.running.clone();

                tokio::spawn(async move {
                    while running.load(Ordering::Relaxed) {
                        time::sleep(StdDuration::from_secs(export_interval.max(1))).await;
                        if let Err(e) = stats.export_stats(None).await {
                            error!("Failed to export stats: {}", e);
                        }
                    }
                });
            }
        }
    }

    fn print_simulation_info(&self) {
        let version = env!("CARGO_PKG_VERSION");

        if self.config.safety.dry_run {
            info!("🔍 Starting proto-flood v{} (DRY-RUN)", version);
            info!("   ⚠️  DRY-RUN MODE: No actual packets will be sent!");
        } else {
            info!("🚀 Starting proto-flood v{}", version);
        }

        info!("   Session ID: {}", self.stats.session_id);
        info!(
            "   Target: {}/{} ({} hosts from {})",
            self.target_ip,
            self.config.target.bits,
            self.target.host_id_range().max(1),
            self.target.first_address()
        );

        let protocol = match self.selection {
            Selection::All => format!("all {} protocols", registry::count()),
            Selection::Single(index) => registry::MODULES[index].description.to_string(),
        };
        info!("   Protocol: {}", protocol);

        match Budget::from_config(&self.config) {
            Budget::Flood => info!("   Mode: flood"),
            Budget::Packets(n) => info!("   Threshold: {} packets", n),
        }
        if self.config.emission.turbo {
            info!("   Turbo: work split across two processes");
        }
        if self.config.encapsulated {
            info!("   Encapsulation: GRE");
        }
        if self.config.bogus_csum {
            info!("   Checksums: bogus");
        }

        info!("   Press Ctrl+C to stop gracefully");
    }

    async fn finalize_simulation(&self) {
        time::sleep(GRACEFUL_SHUTDOWN_TIMEOUT).await;

        if self.config.safety.dry_run {
            info!("📈 Final Statistics (DRY-RUN):");
        } else {
            info!("📈 Final Statistics:");
        }

        let sys_stats = self.system_monitor.get_system_stats().await;
        self.stats.print_stats(sys_stats.as_ref());

        if self.config.export.enabled {
            if let Err(e) = self.stats.export_stats(sys_stats.as_ref()).await {
                error!("Failed to export final stats: {}", e);
            }
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM, naming the signal received.
async fn shutdown_signal() -> Result<&'static str> {
    let mut terminate = signal(SignalKind::terminate()).map_system_error("SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_system_error("Ctrl+C handler")?;
            Ok("Ctrl+C")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}
