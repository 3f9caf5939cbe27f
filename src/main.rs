//! # proto-flood - Main Application Entry Point
//!
//! # Disclaimer
//!
//! - The software is for educational and authorized testing purposes only.
//! - Unauthorized use (especially against systems you don't own or lack explicit permission to test) is strictly prohibited and may be illegal.

use std::net::Ipv4Addr;
use std::process;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proto_flood::cli::{handle_pre_execution_commands, parse_arguments, process_cli_config, selection_for};
use proto_flood::config::{load_config, Config};
use proto_flood::error::{MapError, Result};
use proto_flood::network::resolve_host;
use proto_flood::registry::Selection;
use proto_flood::simulation::Simulation;
use proto_flood::turbo;
use proto_flood::validation::{validate_run, validate_system_requirements};

fn setup_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn initialize_configuration(matches: &clap::ArgMatches) -> Result<Config> {
    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let base_config = load_config(config_path)?;
    process_cli_config(matches, base_config)
}

fn perform_validations(config: &Config, target_ip: &Ipv4Addr, selection: Selection) -> Result<()> {
    validate_run(config, target_ip, selection)?;
    validate_system_requirements(config.safety.dry_run)?;
    Ok(())
}

fn run_application() -> Result<()> {
    setup_logging();
    let matches = parse_arguments();

    if handle_pre_execution_commands(&matches) {
        return Ok(());
    }

    let config = initialize_configuration(&matches)?;
    let selection = selection_for(&config)?;
    let target_ip = resolve_host(&config.target.host)?;

    perform_validations(&config, &target_ip, selection)?;

    // fork before any runtime threads or sockets exist
    let role = turbo::split(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_system_error("tokio runtime")?;

    let simulation = Simulation::new(config, target_ip, selection, role)?;
    runtime.block_on(simulation.run())
}

fn main() {
    if let Err(e) = run_application() {
        error!("Application error: {}", e);
        process::exit(1);
    }
}
