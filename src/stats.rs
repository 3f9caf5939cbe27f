use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::config::{ExportConfig, ExportFormat};
use crate::constants::{stats as stats_constants, STATS_EXPORT_DIR};
use crate::error::{Result, StatsError};
use crate::registry;

/// Per-process emission counters with export capabilities
pub struct FloodStats {
    pub packets_sent: AtomicU64,
    pub packets_failed: AtomicU64,
    pub bytes_sent: AtomicU64,
    pub start_time: Instant,
    pub session_id: String,
    /// Sent packets per module acronym.
    pub protocol_stats: BTreeMap<&'static str, AtomicU64>,
    pub export_config: Option<ExportConfig>,
}

impl Default for FloodStats {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub packets_sent: u64,
    pub packets_failed: u64,
    pub bytes_sent: u64,
    pub duration_secs: f64,
    pub packets_per_second: f64,
    pub megabits_per_second: f64,
    pub protocol_breakdown: BTreeMap<String, u64>,
    pub system_stats: Option<SystemStats>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SystemStats {
    pub pid: u32,
    pub cpu_usage: f32,
    pub memory_usage: u64,
    pub memory_total: u64,
}

impl FloodStats {
    pub fn new(export_config: Option<ExportConfig>) -> Self {
        let protocol_stats = registry::MODULES
            .iter()
            .map(|module| (module.acronym, AtomicU64::new(0)))
            .collect();

        Self {
            packets_sent: AtomicU64::new(0),
            packets_failed: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            start_time: Instant::now(),
            session_id: Uuid::new_v4().to_string(),
            protocol_stats,
            export_config,
        }
    }

    pub fn increment_sent(&self, bytes: u64, acronym: &str) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);

        if let Some(counter) = self.protocol_stats.get(acronym) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_failed(&self) {
        self.packets_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.packets_sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.packets_failed.load(Ordering::Relaxed)
    }

    pub fn protocol_count(&self, acronym: &str) -> u64 {
        self.protocol_stats
            .get(acronym)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn print_stats(&self, system_stats: Option<&SystemStats>) {
        let stats = self.get_session_stats(system_stats);

        println!(
            "📊 Stats - Sent: {}, Failed: {}, Rate: {:.1} pps, {:.2} Mbps",
            stats.packets_sent, stats.packets_failed, stats.packets_per_second, stats.megabits_per_second
        );

        for (protocol, count) in &stats.protocol_breakdown {
            if *count > 0 {
                println!("   {}: {} packets", protocol, count);
            }
        }

        if let Some(sys_stats) = system_stats {
            println!(
                "   Process {}: CPU {:.1}%, Memory: {} MB",
                sys_stats.pid,
                sys_stats.cpu_usage,
                sys_stats.memory_usage / stats_constants::BYTES_TO_MB_DIVISOR
            );
        }
    }

    pub async fn export_stats(&self, system_stats: Option<&SystemStats>) -> Result<()> {
        self.export_stats_to(Path::new(STATS_EXPORT_DIR), system_stats).await
    }

    /// Writes the configured export formats into `dir`.
    pub async fn export_stats_to(&self, dir: &Path, system_stats: Option<&SystemStats>) -> Result<()> {
        let Some(export_config) = &self.export_config else {
            return Ok(());
        };
        if !export_config.enabled {
            return Ok(());
        }

        let stats = self.get_session_stats(system_stats);

        fs::create_dir_all(dir)
            .await
            .map_err(|e| StatsError::ExportFailed(format!("Failed to create export directory: {}", e)))?;

        match export_config.format {
            ExportFormat::Json => self.export_json(dir, &stats, export_config).await?,
            ExportFormat::Csv => self.export_csv(dir, &stats, export_config)?,
            ExportFormat::Both => {
                self.export_json(dir, &stats, export_config).await?;
                self.export_csv(dir, &stats, export_config)?;
            }
        }
        Ok(())
    }

    pub fn get_session_stats(&self, system_stats: Option<&SystemStats>) -> SessionStats {
        let sent = self.sent();
        let failed = self.failed();
        let bytes = self.bytes_sent.load(Ordering::Relaxed);

        let elapsed = self.start_time.elapsed().as_secs_f64().max(f64::EPSILON);
        let pps = sent as f64 / elapsed;
        let mbps = (bytes as f64 * 8.0) / (elapsed * stats_constants::MEGABITS_DIVISOR);

        let protocol_breakdown = self
            .protocol_stats
            .iter()
            .map(|(k, v)| (k.to_string(), v.load(Ordering::Relaxed)))
            .collect();

        SessionStats {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
            packets_sent: sent,
            packets_failed: failed,
            bytes_sent: bytes,
            duration_secs: elapsed,
            packets_per_second: pps,
            megabits_per_second: mbps,
            protocol_breakdown,
            system_stats: system_stats.cloned(),
        }
    }

    fn export_path(dir: &Path, config: &ExportConfig, extension: &str) -> std::path::PathBuf {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("{}_stats_{}.{}", config.filename_pattern, timestamp, extension))
    }

    async fn export_json(&self, dir: &Path, stats: &SessionStats, config: &ExportConfig) -> Result<()> {
        let filename = Self::export_path(dir, config, "json");

        let json = serde_json::to_string_pretty(stats)
            .map_err(|e| StatsError::SerializationError(format!("Failed to serialize stats: {}", e)))?;

        fs::write(&filename, json)
            .await
            .map_err(|e| StatsError::FileWriteError(format!("Failed to write JSON stats: {}", e)))?;

        info!("Stats exported to {}", filename.display());
        Ok(())
    }

    /// One row per session; one column per registered module.
    fn export_csv(&self, dir: &Path, stats: &SessionStats, config: &ExportConfig) -> Result<()> {
        let filename = Self::export_path(dir, config, "csv");

        let mut writer = Writer::from_path(&filename)
            .map_err(|e| StatsError::FileWriteError(format!("Failed to create CSV file: {}", e)))?;

        let mut header = vec![
            "session_id".to_string(),
            "timestamp".to_string(),
            "packets_sent".to_string(),
            "packets_failed".to_string(),
            "bytes_sent".to_string(),
            "duration_secs".to_string(),
            "packets_per_second".to_string(),
            "megabits_per_second".to_string(),
        ];
        let mut row = vec![
            stats.session_id.clone(),
            stats.timestamp.to_rfc3339(),
            stats.packets_sent.to_string(),
            stats.packets_failed.to_string(),
            stats.bytes_sent.to_string(),
            stats.duration_secs.to_string(),
            stats.packets_per_second.to_string(),
            stats.megabits_per_second.to_string(),
        ];
        for module in registry::MODULES.iter() {
            header.push(format!("{}_packets", module.acronym.to_lowercase()));
            row.push(stats.protocol_breakdown.get(module.acronym).unwrap_or(&0).to_string());
        }

        writer
            .write_record(&header)
            .map_err(|e| StatsError::FileWriteError(format!("Failed to write CSV header: {}", e)))?;
        writer
            .write_record(&row)
            .map_err(|e| StatsError::FileWriteError(format!("Failed to write CSV data: {}", e)))?;
        writer
            .flush()
            .map_err(|e| StatsError::FileWriteError(format!("Failed to flush CSV: {}", e)))?;

        info!("Stats exported to {}", filename.display());
        Ok(())
    }
}
