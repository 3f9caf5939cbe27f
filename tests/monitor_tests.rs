//! System monitoring tests

use proto_flood::monitor::*;

#[tokio::test]
async fn test_reports_current_process() {
    let monitor = SystemMonitor::new(true);

    if let Some(stats) = monitor.get_system_stats().await {
        assert_eq!(stats.pid, std::process::id());
        assert!(stats.cpu_usage >= 0.0);
        assert!(stats.memory_usage > 0);
        assert!(stats.memory_total >= stats.memory_usage);
    }
}

#[tokio::test]
async fn test_disabled_system_monitor() {
    let monitor = SystemMonitor::new(false);
    assert!(monitor.get_system_stats().await.is_none());
}
