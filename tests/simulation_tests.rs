//! Run orchestration tests
//!
//! Dry runs only; the raw sender needs root.

use proto_flood::config::{get_default_config, Config};
use proto_flood::registry::{self, Selection, MODULES};
use proto_flood::simulation::Simulation;
use proto_flood::turbo::{budget_for, split_threshold, Role};
use proto_flood::worker::Budget;
use std::net::Ipv4Addr;

fn dry_run_config(protocol: &str, threshold: u64) -> Config {
    let mut config = get_default_config();
    config.emission.protocol = protocol.to_string();
    config.emission.threshold = threshold;
    config.safety.dry_run = true;
    config.safety.audit_logging = false;
    config.monitoring.system_monitoring = false;
    config.monitoring.export_interval = None;
    config
}

#[tokio::test]
async fn test_dry_run_sends_threshold() {
    let mut config = dry_run_config("UDP", 40);
    config.target.bits = 28;
    let simulation = Simulation::new(config, Ipv4Addr::new(192, 168, 1, 0), Selection::Single(5), Role::Single).unwrap();
    let stats = simulation.stats();

    simulation.run().await.unwrap();

    assert_eq!(stats.sent(), 40);
    assert_eq!(stats.protocol_count("UDP"), 40);
}

#[tokio::test]
async fn test_dry_run_all_protocols() {
    let config = dry_run_config("T50", 26);
    let simulation = Simulation::new(config, Ipv4Addr::new(10, 0, 0, 1), Selection::All, Role::Single).unwrap();
    let stats = simulation.stats();

    simulation.run().await.unwrap();

    assert_eq!(stats.sent(), 26);
    for module in MODULES.iter() {
        assert_eq!(stats.protocol_count(module.acronym), 2);
    }
}

#[tokio::test]
async fn test_child_role_takes_half() {
    let mut config = dry_run_config("ICMP", 11);
    config.emission.turbo = true;
    let simulation = Simulation::new(config, Ipv4Addr::new(10, 0, 0, 1), Selection::Single(0), Role::Child).unwrap();
    let stats = simulation.stats();

    simulation.run().await.unwrap();

    assert_eq!(stats.sent(), 5);
}

#[tokio::test]
async fn test_fatal_build_error_fails_the_run() {
    let mut config = dry_run_config("TCP", 3);
    let opts = &mut config.tcp.options;
    opts.mss = true;
    opts.wsopt = true;
    opts.tsopt = true;
    opts.md5 = true;
    opts.cc = true;
    let simulation = Simulation::new(config, Ipv4Addr::new(10, 0, 0, 1), Selection::Single(3), Role::Single).unwrap();

    assert!(simulation.run().await.is_err());
}

#[test]
fn test_invalid_prefix_rejected_at_construction() {
    let mut config = dry_run_config("TCP", 1);
    config.target.bits = 33;
    assert!(Simulation::new(config, Ipv4Addr::new(10, 0, 0, 1), Selection::Single(3), Role::Single).is_err());
}

#[test]
fn test_turbo_budgets() {
    let mut config = dry_run_config("TCP", 1001);
    assert_eq!(split_threshold(1001), (501, 500));
    assert_eq!(budget_for(Role::Single, &config), Budget::Packets(1001));
    assert_eq!(budget_for(Role::Parent { child: 1 }, &config), Budget::Packets(501));
    assert_eq!(budget_for(Role::Child, &config), Budget::Packets(500));

    config.emission.flood = true;
    assert_eq!(budget_for(Role::Child, &config), Budget::Flood);
    assert_eq!(registry::count(), 13);
}
