use crate::stats::SystemStats;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::Mutex;

/// Resource usage of the current process
///
/// In turbo mode parent and child each own a monitor, so every report
/// describes only the process that prints it.
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Pid,
    monitoring_enabled: bool,
}

impl SystemMonitor {
    pub fn new(monitoring_enabled: bool) -> Self {
        let pid = Pid::from_u32(std::process::id());
        let mut system = System::new();
        if monitoring_enabled {
            system.refresh_memory();
            system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        }

        Self {
            system: Mutex::new(system),
            pid,
            monitoring_enabled,
        }
    }

    pub async fn get_system_stats(&self) -> Option<SystemStats> {
        if !self.monitoring_enabled {
            return None;
        }

        let mut system = self.system.lock().await;
        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        let process = system.process(self.pid)?;

        Some(SystemStats {
            pid: self.pid.as_u32(),
            cpu_usage: process.cpu_usage(),
            memory_usage: process.memory(),
            memory_total: system.total_memory(),
        })
    }
}
