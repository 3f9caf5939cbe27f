//! Command-line interface handling
//!
//! Parses arguments with the clap builder API and folds them into the loaded
//! [`Config`]. `--set KEY=VALUE` reaches any configuration field, but a
//! protocol field is only accepted when the selected module reads it.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::str::FromStr;
use tracing::info;

use crate::config::{apply_override, Config, ExportFormat};
use crate::constants::{ALL_PROTOCOLS, DEFAULT_CONFIG_FILE};
use crate::error::{ConfigError, PacketError, Result};
use crate::network::parse_target;
use crate::registry::{self, Selection, COMMON_OPTIONS};

/// Config sections that are not protocol fields and may always be set.
const AMBIENT_SECTIONS: &[&str] = &["target", "emission", "safety", "monitoring", "export"];

pub fn build_command() -> Command {
    Command::new("proto-flood")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Multi-protocol raw IPv4 packet injector for authorized network stress testing")
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_name("HOST[/BITS]")
                .help("Target host or address, optionally with a CIDR prefix (8-32)")
                .required_unless_present_any(["config", "list-protocols"]),
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .short('P')
                .value_name("NAME")
                .help(format!("Protocol acronym, or {} to cycle through all of them", ALL_PROTOCOLS)),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .short('n')
                .value_name("NUM")
                .help("Number of packets to send (ignored with --flood)"),
        )
        .arg(
            Arg::new("flood")
                .long("flood")
                .help("Send until interrupted")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("turbo")
                .long("turbo")
                .help("Split the work across two processes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("shuffle")
                .long("shuffle")
                .help(format!("Shuffle the module order on every pass (with {})", ALL_PROTOCOLS))
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("bogus-csum")
                .long("bogus-csum")
                .help("Replace protocol checksums with random values")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("encapsulated")
                .long("encapsulated")
                .help("Wrap every packet in GRE")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Stop on the first send failure")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sport")
                .long("sport")
                .value_name("PORT")
                .help("Source port for TCP, UDP and DCCP (0 = random)"),
        )
        .arg(
            Arg::new("dport")
                .long("dport")
                .value_name("PORT")
                .help("Destination port for TCP, UDP and DCCP (0 = random)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help(format!("YAML configuration file path (default: {})", DEFAULT_CONFIG_FILE)),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .short('s')
                .value_name("KEY=VALUE")
                .help("Override a configuration field by dotted path, e.g. tcp.options.mss=true")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .value_name("FORMAT")
                .help("Export statistics (json, csv, both)")
                .value_parser(["json", "csv", "both"]),
        )
        .arg(
            Arg::new("list-protocols")
                .long("list-protocols")
                .help("List available protocol modules and their options")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Build packets without sending them (no root needed)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments and return matches
pub fn parse_arguments() -> ArgMatches {
    build_command().get_matches()
}

/// Process CLI arguments and merge with config
pub fn process_cli_config(matches: &ArgMatches, mut config: Config) -> Result<Config> {
    // a config file may carry the prefix in target.host as well
    let configured = config.target.host.clone();
    apply_target(&mut config, &configured)?;
    if let Some(target) = matches.get_one::<String>("target") {
        apply_target(&mut config, target)?;
    }

    if let Some(protocol) = matches.get_one::<String>("protocol") {
        config.emission.protocol = protocol.clone();
    }

    if let Some(threshold) = matches.get_one::<String>("threshold") {
        config.emission.threshold = parse_positive_number(threshold, "threshold")?;
    }

    if let Some(port) = matches.get_one::<String>("sport") {
        config.source_port = parse_port(port, "sport")?;
    }

    if let Some(port) = matches.get_one::<String>("dport") {
        config.dest_port = parse_port(port, "dport")?;
    }

    config.emission.flood |= matches.get_flag("flood");
    config.emission.turbo |= matches.get_flag("turbo");
    config.emission.shuffle |= matches.get_flag("shuffle");
    config.emission.strict |= matches.get_flag("strict");
    config.bogus_csum |= matches.get_flag("bogus-csum");
    config.encapsulated |= matches.get_flag("encapsulated");

    if let Some(export_format) = matches.get_one::<String>("export") {
        config.export.enabled = true;
        config.export.format = parse_export_format(export_format)?;
    }

    let cli_dry_run = matches.get_flag("dry-run");
    if cli_dry_run || config.safety.dry_run {
        config.safety.dry_run = true;
        if cli_dry_run {
            info!("🔍 DRY-RUN MODE ENABLED (CLI) - No packets will be sent");
        } else {
            info!("🔍 DRY-RUN MODE ENABLED (CONFIG) - No packets will be sent");
        }
    }

    if let Some(overrides) = matches.get_many::<String>("set") {
        for item in overrides {
            let (key, value) = parse_override(item)?;
            // an earlier emission.protocol override changes what later keys may name
            let selection = selection_for(&config)?;
            validate_override_key(selection, key, &config.emission.protocol)?;
            apply_override(&mut config, key, value)?;
            if key == "target.host" {
                let host = config.target.host.clone();
                apply_target(&mut config, &host)?;
            }
        }
    }

    Ok(config)
}

fn apply_target(config: &mut Config, target: &str) -> Result<()> {
    let (host, bits) = parse_target(target, config.target.bits)?;
    config.target.host = host;
    config.target.bits = bits;
    Ok(())
}

/// Resolves `emission.protocol` against the registry.
pub fn selection_for(config: &Config) -> Result<Selection> {
    Selection::parse(&config.emission.protocol)
        .ok_or_else(|| PacketError::UnknownProtocol(config.emission.protocol.clone()).into())
}

/// Splits `KEY=VALUE` at the first `=`.
pub fn parse_override(item: &str) -> Result<(&str, &str)> {
    item.split_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "set".to_string(),
                value: item.to_string(),
                reason: "expected KEY=VALUE".to_string(),
            }
            .into()
        })
}

pub fn validate_override_key(selection: Selection, key: &str, protocol: &str) -> Result<()> {
    let section = key.split('.').next().unwrap_or(key);
    if AMBIENT_SECTIONS.contains(&section) || selection.accepts(key) {
        return Ok(());
    }
    Err(ConfigError::UnknownOption {
        option: key.to_string(),
        protocol: protocol.to_string(),
    }
    .into())
}

/// Check if any pre-execution commands were requested
pub fn handle_pre_execution_commands(matches: &ArgMatches) -> bool {
    if matches.get_flag("list-protocols") {
        list_protocols();
        return true;
    }
    false
}

/// Parse positive numbers with field context
pub fn parse_positive_number<T>(value_str: &str, field: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value = value_str.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value_str.to_string(),
        reason: e.to_string(),
    })?;

    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value_str.to_string(),
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }

    Ok(value)
}

/// Port numbers accept 0, which asks for a random port per packet.
pub fn parse_port(value_str: &str, field: &str) -> Result<u16> {
    value_str.parse::<u16>().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value_str.to_string(),
            reason: "must be a port number (0-65535)".to_string(),
        }
        .into()
    })
}

pub fn parse_export_format(format_str: &str) -> Result<ExportFormat> {
    ExportFormat::from_str(format_str).map_err(|reason| {
        ConfigError::InvalidValue {
            field: "export".to_string(),
            value: format_str.to_string(),
            reason,
        }
        .into()
    })
}

fn list_protocols() {
    println!("Available protocol modules ({} cycles through all):", ALL_PROTOCOLS);
    for module in registry::MODULES.iter() {
        println!("  {:<8} {:>3}  {}", module.acronym, module.protocol, module.description);
        println!("           options: {}", module.options.join(", "));
    }
    println!("Common options: {}", COMMON_OPTIONS.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("ip.ttl=64").unwrap(), ("ip.ttl", "64"));
        assert_eq!(parse_override("gre.saddr = 10.0.0.1").unwrap(), ("gre.saddr", "10.0.0.1"));
        assert!(parse_override("ip.ttl").is_err());
        assert!(parse_override("=64").is_err());
    }

    #[test]
    fn test_parse_port_allows_zero() {
        assert_eq!(parse_port("0", "sport").unwrap(), 0);
        assert!(parse_port("65536", "sport").is_err());
    }

    #[test]
    fn test_parse_export_format() {
        assert_eq!(parse_export_format("json").unwrap(), ExportFormat::Json);
        assert_eq!(parse_export_format("BOTH").unwrap(), ExportFormat::Both);
        assert!(parse_export_format("xml").is_err());
    }

    #[test]
    fn test_override_key_checked_against_module() {
        let tcp = Selection::parse("TCP").unwrap();
        assert!(validate_override_key(tcp, "tcp.options.mss", "TCP").is_ok());
        assert!(validate_override_key(tcp, "ip.ttl", "TCP").is_ok());
        assert!(validate_override_key(tcp, "emission.threshold", "TCP").is_ok());
        assert!(validate_override_key(tcp, "ospf.hello_interval", "TCP").is_err());
    }
}
