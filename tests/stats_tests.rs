//! Statistics module tests

use proto_flood::config::{ExportConfig, ExportFormat};
use proto_flood::stats::{FloodStats, SystemStats};
use std::fs;
use tempfile::TempDir;

fn export_config(format: ExportFormat) -> ExportConfig {
    ExportConfig {
        enabled: true,
        format,
        filename_pattern: "test".to_string(),
        include_system_stats: true,
    }
}

fn files_with_extension(dir: &TempDir, extension: &str) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |e| e == extension))
        .collect()
}

#[test]
fn test_counters_and_breakdown() {
    let stats = FloodStats::default();
    stats.increment_sent(40, "TCP");
    stats.increment_sent(40, "TCP");
    stats.increment_sent(28, "ICMP");
    stats.increment_sent(10, "NOT-A-MODULE");
    stats.increment_failed();

    assert_eq!(stats.sent(), 4);
    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.protocol_count("TCP"), 2);
    assert_eq!(stats.protocol_count("ICMP"), 1);
    assert_eq!(stats.protocol_count("NOT-A-MODULE"), 0);

    let session = stats.get_session_stats(None);
    assert_eq!(session.bytes_sent, 118);
    assert_eq!(session.protocol_breakdown.len(), 13);
    assert_eq!(session.protocol_breakdown["TCP"], 2);
}

#[test]
fn test_session_ids_are_unique() {
    assert_ne!(FloodStats::default().session_id, FloodStats::default().session_id);
}

#[tokio::test]
async fn test_json_export() {
    let dir = TempDir::new().unwrap();
    let stats = FloodStats::new(Some(export_config(ExportFormat::Json)));
    stats.increment_sent(52, "RIPv1");
    let system = SystemStats {
        pid: 42,
        cpu_usage: 1.5,
        memory_usage: 1024,
        memory_total: 4096,
    };

    stats.export_stats_to(dir.path(), Some(&system)).await.unwrap();

    let files = files_with_extension(&dir, "json");
    assert_eq!(files.len(), 1);
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(json["packets_sent"], 1);
    assert_eq!(json["protocol_breakdown"]["RIPv1"], 1);
    assert_eq!(json["system_stats"]["pid"], 42);
    assert_eq!(json["session_id"], stats.session_id.as_str());
}

#[tokio::test]
async fn test_csv_export_has_module_columns() {
    let dir = TempDir::new().unwrap();
    let stats = FloodStats::new(Some(export_config(ExportFormat::Both)));
    stats.increment_sent(44, "OSPF");

    stats.export_stats_to(dir.path(), None).await.unwrap();

    assert_eq!(files_with_extension(&dir, "json").len(), 1);
    let csv_files = files_with_extension(&dir, "csv");
    assert_eq!(csv_files.len(), 1);

    let mut reader = csv::Reader::from_path(&csv_files[0]).unwrap();
    let headers = reader.headers().unwrap().clone();
    let record = reader.records().next().unwrap().unwrap();
    let column = headers.iter().position(|h| h == "ospf_packets").unwrap();
    assert_eq!(&record[column], "1");
    assert!(headers.iter().any(|h| h == "igmpv3_packets"));
}

#[tokio::test]
async fn test_export_disabled_writes_nothing() {
    let dir = TempDir::new().unwrap();
    FloodStats::default().export_stats_to(dir.path(), None).await.unwrap();

    let mut disabled = export_config(ExportFormat::Json);
    disabled.enabled = false;
    FloodStats::new(Some(disabled)).export_stats_to(dir.path(), None).await.unwrap();

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
