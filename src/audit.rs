use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::{AuditError, Result};

pub const AUDIT_LOG_FILE: &str = "proto_flood_audit.log";

/// One JSON line per run
#[derive(Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub target_ip: String,
    pub prefix_bits: u8,
    pub protocol: String,
    /// `None` when flooding.
    pub threshold: Option<u64>,
    pub turbo: bool,
    pub encapsulated: bool,
    pub bogus_csum: bool,
    pub dry_run: bool,
    pub user: String,
    pub session_id: String,
}

impl AuditEntry {
    pub fn for_run(config: &Config, target: &Ipv4Addr, session_id: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: "flood_start".to_string(),
            target_ip: target.to_string(),
            prefix_bits: config.target.bits,
            protocol: config.emission.protocol.clone(),
            threshold: (!config.emission.flood).then_some(config.emission.threshold),
            turbo: config.emission.turbo,
            encapsulated: config.encapsulated,
            bogus_csum: config.bogus_csum,
            dry_run: config.safety.dry_run,
            user: std::env::var("USER").unwrap_or_else(|_| "unknown".to_string()),
            session_id: session_id.to_string(),
        }
    }
}

/// Appends `entry` to the log at `path`.
pub fn write_audit_entry(path: &Path, entry: &AuditEntry) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AuditError::LogCreationFailed(format!("{}: {}", path.display(), e)))?;

    let log_line = format!(
        "{}\n",
        serde_json::to_string(entry).map_err(|e| AuditError::FormatError(e.to_string()))?
    );

    file.write_all(log_line.as_bytes())
        .map_err(|e| AuditError::WriteError(e.to_string()))?;

    info!("Audit entry created for session {}", entry.session_id);
    Ok(())
}

pub fn create_audit_entry(config: &Config, target: &Ipv4Addr, session_id: &str) -> Result<()> {
    let entry = AuditEntry::for_run(config, target, session_id);
    write_audit_entry(Path::new(AUDIT_LOG_FILE), &entry)
}
