//! Configuration record
//!
//! One [`Config`] is loaded (YAML file, then CLI overrides) before the run
//! and borrowed by every builder. Wire fields follow one convention: `0`, or
//! `0.0.0.0` for addresses, asks the builder for a random value. Boolean
//! fields control whether an optional block is present at all and are never
//! randomized.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::constants::{defaults, eigrp, egp, icmp, igmp, ip, ospf, rip, rsvp, DEFAULT_CONFIG_FILE, DEFAULT_THRESHOLD};
use crate::error::{ConfigError, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub emission: EmissionConfig,
    pub safety: SafetyConfig,
    pub monitoring: MonitoringConfig,
    pub export: ExportConfig,

    /// Replace every protocol checksum with a random value.
    pub bogus_csum: bool,
    /// Wrap every packet in GRE.
    pub encapsulated: bool,
    /// Source port shared by TCP, UDP and DCCP.
    pub source_port: u16,
    /// Destination port shared by TCP, UDP and DCCP.
    pub dest_port: u16,

    pub ip: IpConfig,
    pub gre: GreConfig,
    pub icmp: IcmpConfig,
    pub igmp: IgmpConfig,
    pub tcp: TcpConfig,
    pub egp: EgpConfig,
    pub rip: RipConfig,
    pub dccp: DccpConfig,
    pub rsvp: RsvpConfig,
    pub ipsec: IpsecConfig,
    pub eigrp: EigrpConfig,
    pub ospf: OspfConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TargetConfig {
    /// Host name or IPv4 address, optionally followed by `/bits`.
    pub host: String,
    pub bits: u8,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: defaults::TARGET_HOST.to_string(),
            bits: 32,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EmissionConfig {
    /// Module acronym, or `T50` to cycle through every module.
    pub protocol: String,
    pub threshold: u64,
    pub flood: bool,
    /// Split the work across two processes.
    pub turbo: bool,
    /// Shuffle the module order on every pass in all-protocols mode.
    pub shuffle: bool,
    /// Treat any send failure as fatal.
    pub strict: bool,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            protocol: defaults::PROTOCOL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            flood: false,
            turbo: false,
            shuffle: false,
            strict: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SafetyConfig {
    pub require_private_ranges: bool,
    pub audit_logging: bool,
    pub dry_run: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            require_private_ranges: true,
            audit_logging: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MonitoringConfig {
    pub stats_interval: u64,
    pub system_monitoring: bool,
    pub export_interval: Option<u64>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_interval: defaults::STATS_INTERVAL,
            system_monitoring: true,
            export_interval: Some(defaults::EXPORT_INTERVAL),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,
    pub format: ExportFormat,
    pub filename_pattern: String,
    pub include_system_stats: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            format: ExportFormat::Json,
            filename_pattern: defaults::FILENAME_PATTERN.to_string(),
            include_system_stats: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Both,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IpConfig {
    pub tos: u8,
    pub id: u16,
    /// Fragment offset in bytes; non-zero also sets MF, zero sets DF.
    pub frag_offset: u16,
    pub ttl: u8,
    /// Protocol of the packet being built, set by the emission loop.
    pub protocol: u8,
    pub saddr: Ipv4Addr,
    /// Destination of the packet being built, set by the emission loop.
    pub daddr: Ipv4Addr,
}

impl Default for IpConfig {
    fn default() -> Self {
        Self {
            tos: ip::DEFAULT_TOS,
            id: 0,
            frag_offset: 0,
            ttl: ip::DEFAULT_TTL,
            protocol: 0,
            saddr: Ipv4Addr::UNSPECIFIED,
            daddr: Ipv4Addr::UNSPECIFIED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GreConfig {
    pub checksum: bool,
    pub key: bool,
    pub sequence: bool,
    pub key_value: u32,
    pub sequence_value: u32,
    /// Inner source; unspecified copies the outer source.
    pub saddr: Ipv4Addr,
    /// Inner destination; unspecified copies the outer destination.
    pub daddr: Ipv4Addr,
}

impl Default for GreConfig {
    fn default() -> Self {
        Self {
            checksum: false,
            key: false,
            sequence: false,
            key_value: 0,
            sequence_value: 0,
            saddr: Ipv4Addr::UNSPECIFIED,
            daddr: Ipv4Addr::UNSPECIFIED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IcmpConfig {
    pub icmp_type: u8,
    pub code: u8,
    pub id: u16,
    pub sequence: u16,
    pub gateway: Ipv4Addr,
}

impl Default for IcmpConfig {
    fn default() -> Self {
        Self {
            icmp_type: icmp::ECHO,
            code: 0,
            id: 0,
            sequence: 0,
            gateway: Ipv4Addr::UNSPECIFIED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IgmpConfig {
    pub igmp_type: u8,
    pub code: u8,
    pub group: Ipv4Addr,
    /// IGMPv3 group record type.
    pub grec_type: u8,
    /// IGMPv3 multicast address of the group record.
    pub grec_mca: Ipv4Addr,
    pub suppress: bool,
    pub qrv: u8,
    pub qqic: u8,
    /// Number of IGMPv3 source addresses.
    pub sources: u8,
    /// Explicit source addresses; missing entries are randomized.
    pub source_addresses: Vec<Ipv4Addr>,
}

impl Default for IgmpConfig {
    fn default() -> Self {
        Self {
            igmp_type: igmp::MEMBERSHIP_QUERY,
            code: 0,
            group: Ipv4Addr::UNSPECIFIED,
            grec_type: igmp::MODE_IS_INCLUDE,
            grec_mca: Ipv4Addr::UNSPECIFIED,
            suppress: false,
            qrv: 0,
            qqic: 0,
            sources: 2,
            source_addresses: Vec::new(),
        }
    }
}

/// Presence of each TCP option.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TcpOptionFlags {
    pub mss: bool,
    pub wsopt: bool,
    pub tsopt: bool,
    pub sack_ok: bool,
    pub cc: bool,
    pub cc_new: bool,
    pub cc_echo: bool,
    pub sack_edge: bool,
    pub md5: bool,
    pub auth: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TcpConfig {
    pub fin: bool,
    pub syn: bool,
    pub rst: bool,
    pub psh: bool,
    pub ack: bool,
    pub urg: bool,
    pub ece: bool,
    pub cwr: bool,
    pub sequence: u32,
    pub acknowledge: u32,
    pub window: u16,
    pub urg_ptr: u16,
    /// Data offset in words; zero computes it from the options.
    pub doff: u8,
    pub options: TcpOptionFlags,
    pub mss: u16,
    pub wscale: u8,
    pub tsval: u32,
    pub tsecr: u32,
    pub cc: u32,
    pub cc_new: u32,
    pub cc_echo: u32,
    pub sack_left: u32,
    pub sack_right: u32,
    pub key_id: u8,
    pub next_key: u8,
    /// NOP bytes placed after the options.
    pub nop: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EgpConfig {
    pub egp_type: u8,
    pub code: u8,
    pub status: u8,
    pub autonomous_system: u16,
    pub sequence: u16,
    pub hello: u16,
    pub poll: u16,
}

impl Default for EgpConfig {
    fn default() -> Self {
        Self {
            egp_type: egp::TYPE_ACQUIRE,
            code: egp::CODE_REQUEST,
            status: egp::STATUS_ACTIVE,
            autonomous_system: 0,
            sequence: 0,
            hello: 0,
            poll: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RipConfig {
    pub command: u8,
    pub family: u16,
    pub address: Ipv4Addr,
    pub metric: u32,
    /// RIPv2 routing domain.
    pub domain: u16,
    pub tag: u16,
    pub netmask: Ipv4Addr,
    pub next_hop: Ipv4Addr,
    /// RIPv2 keyed-MD5 authentication.
    pub auth: bool,
    pub key_id: u8,
    pub sequence: u32,
}

impl Default for RipConfig {
    fn default() -> Self {
        Self {
            command: rip::COMMAND_RESPONSE,
            family: rip::AF_INET,
            address: Ipv4Addr::UNSPECIFIED,
            metric: 0,
            domain: 0,
            tag: 0,
            netmask: Ipv4Addr::UNSPECIFIED,
            next_hop: Ipv4Addr::UNSPECIFIED,
            auth: false,
            key_id: 1,
            sequence: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DccpConfig {
    pub dccp_type: u8,
    pub ccval: u8,
    pub cscov: u8,
    /// Data offset in words; zero computes it.
    pub doff: u8,
    /// Extended (48-bit) sequence numbers.
    pub ext: bool,
    pub sequence_high: u16,
    pub sequence_low: u32,
    pub ack_high: u16,
    pub ack_low: u32,
    pub service: u32,
    pub reset_code: u8,
    pub reset_data: [u8; 3],
}

impl Default for DccpConfig {
    fn default() -> Self {
        Self {
            dccp_type: 0,
            ccval: 0,
            cscov: 0,
            doff: 0,
            ext: true,
            sequence_high: 0,
            sequence_low: 0,
            ack_high: 0,
            ack_low: 0,
            service: 0,
            reset_code: 0,
            reset_data: [0; 3],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RsvpConfig {
    pub flags: u8,
    pub msg_type: u8,
    pub send_ttl: u8,
    pub session_addr: Ipv4Addr,
    pub session_protocol: u8,
    pub session_flags: u8,
    pub session_port: u16,
    pub hop_addr: Ipv4Addr,
    pub hop_iface: u32,
    pub time_refresh: u32,
    pub error_addr: Ipv4Addr,
    pub error_flags: u8,
    pub error_code: u8,
    pub error_value: u16,
    /// Number of SCOPE addresses.
    pub scope: u8,
    pub scope_addresses: Vec<Ipv4Addr>,
    pub style_option: u32,
    pub sender_addr: Ipv4Addr,
    pub sender_port: u16,
    /// SENDER_TSPEC service selector.
    pub tspec: u8,
    pub token_rate: u32,
    pub token_size: u32,
    pub peak_rate: u32,
    pub min_policed: u32,
    pub max_packet: u32,
    /// ADSPEC service selector.
    pub adspec: u8,
    pub adspec_hop: u32,
    pub adspec_path_bw: u32,
    pub adspec_min_latency: u32,
    pub adspec_mtu: u32,
    pub adspec_ctot: u32,
    pub adspec_dtot: u32,
    pub adspec_csum: u32,
    pub adspec_dsum: u32,
    pub confirm_addr: Ipv4Addr,
}

impl Default for RsvpConfig {
    fn default() -> Self {
        Self {
            flags: 1,
            msg_type: rsvp::MSG_PATH,
            send_ttl: 254,
            session_addr: Ipv4Addr::UNSPECIFIED,
            session_protocol: 1,
            session_flags: 1,
            session_port: 0,
            hop_addr: Ipv4Addr::UNSPECIFIED,
            hop_iface: 0,
            time_refresh: 360,
            error_addr: Ipv4Addr::UNSPECIFIED,
            error_flags: 2,
            error_code: 2,
            error_value: 8,
            scope: 1,
            scope_addresses: Vec::new(),
            style_option: 18,
            sender_addr: Ipv4Addr::UNSPECIFIED,
            sender_port: 0,
            tspec: rsvp::TSPEC_TRAFFIC_SERVICE,
            token_rate: 0,
            token_size: 0,
            peak_rate: 0,
            min_policed: 0,
            max_packet: 0,
            adspec: rsvp::ADSPEC_CONTROLLED_SERVICE,
            adspec_hop: 0,
            adspec_path_bw: 0,
            adspec_min_latency: 0,
            adspec_mtu: 0,
            adspec_ctot: 0,
            adspec_dtot: 0,
            adspec_csum: 0,
            adspec_dsum: 0,
            confirm_addr: Ipv4Addr::UNSPECIFIED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct IpsecConfig {
    /// AH integrity check value length in 32-bit words.
    pub ah_length: u8,
    pub ah_spi: u32,
    pub ah_sequence: u32,
    pub esp_spi: u32,
    pub esp_sequence: u32,
}

impl Default for IpsecConfig {
    fn default() -> Self {
        Self {
            ah_length: 4,
            ah_spi: 0,
            ah_sequence: 0,
            esp_spi: 0,
            esp_sequence: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EigrpConfig {
    pub opcode: u8,
    pub flags: u32,
    pub sequence: u32,
    pub acknowledge: u32,
    pub autonomous_system: u32,
    /// TLV emitted for the opcode: a route type for updates, a hello type for hellos.
    pub tlv_type: u16,
    /// TLV length override; zero computes it.
    pub length: u16,
    pub auth: bool,
    pub key_id: u32,
    pub next_hop: Ipv4Addr,
    pub source_router: Ipv4Addr,
    pub source_as: u32,
    pub tag: u32,
    pub external_metric: u32,
    pub external_protocol: u8,
    pub external_flags: u8,
    pub delay: u32,
    pub bandwidth: u32,
    pub mtu: u32,
    pub hop_count: u8,
    pub reliability: u8,
    pub load: u8,
    pub prefix: u8,
    pub destination: Ipv4Addr,
    pub k1: u8,
    pub k2: u8,
    pub k3: u8,
    pub k4: u8,
    pub k5: u8,
    pub hold: u16,
    pub ios_major: u8,
    pub ios_minor: u8,
    pub ver_major: u8,
    pub ver_minor: u8,
    pub sequence_address: Ipv4Addr,
    pub multicast: u32,
}

impl Default for EigrpConfig {
    fn default() -> Self {
        Self {
            opcode: eigrp::OPCODE_UPDATE,
            flags: 0,
            sequence: 0,
            acknowledge: 0,
            autonomous_system: 0,
            tlv_type: eigrp::TYPE_INTERNAL,
            length: 0,
            auth: false,
            key_id: 0,
            next_hop: Ipv4Addr::UNSPECIFIED,
            source_router: Ipv4Addr::UNSPECIFIED,
            source_as: 0,
            tag: 0,
            external_metric: 0,
            external_protocol: 2,
            external_flags: 0,
            delay: 0,
            bandwidth: 0,
            mtu: 0,
            hop_count: 0,
            reliability: 0,
            load: 0,
            prefix: 24,
            destination: Ipv4Addr::UNSPECIFIED,
            k1: 1,
            k2: 0,
            k3: 1,
            k4: 0,
            k5: 0,
            hold: 360,
            ios_major: 12,
            ios_minor: 4,
            ver_major: 1,
            ver_minor: 2,
            sequence_address: Ipv4Addr::UNSPECIFIED,
            multicast: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OspfConfig {
    pub packet_type: u8,
    pub router_id: Ipv4Addr,
    pub area_id: Ipv4Addr,
    pub options: u8,
    pub netmask: Ipv4Addr,
    pub hello_interval: u16,
    pub hello_priority: u8,
    pub hello_dead: u32,
    pub designated: Ipv4Addr,
    pub backup: Ipv4Addr,
    /// Number of Hello neighbors.
    pub neighbors: u8,
    pub neighbor_addresses: Vec<Ipv4Addr>,
    pub dd_mtu: u16,
    pub dd_flags: u8,
    pub dd_sequence: u32,
    /// Append one LSA header to Database Description packets.
    pub dd_include_lsa: bool,
    pub lsa_type: u8,
    pub lsa_age: u16,
    pub lsa_id: Ipv4Addr,
    pub lsa_router: Ipv4Addr,
    pub lsa_sequence: u32,
    pub lsa_metric: u32,
    pub lsa_flags: u8,
    pub lsa_link_id: Ipv4Addr,
    pub lsa_link_data: Ipv4Addr,
    pub lsa_link_type: u8,
    pub lsa_attached: Ipv4Addr,
    /// E-bit of external metrics.
    pub lsa_larger: bool,
    pub lsa_forward: Ipv4Addr,
    pub lsa_external: u32,
    pub vertex_type: u32,
    pub vertex_id: Ipv4Addr,
    /// Cryptographic authentication.
    pub auth: bool,
    pub key_id: u8,
    pub sequence: u32,
    /// Link-Local Signaling block.
    pub lls: bool,
    pub lls_options: u32,
}

impl Default for OspfConfig {
    fn default() -> Self {
        Self {
            packet_type: ospf::TYPE_HELLO,
            router_id: Ipv4Addr::UNSPECIFIED,
            area_id: Ipv4Addr::UNSPECIFIED,
            options: 0x02,
            netmask: Ipv4Addr::UNSPECIFIED,
            hello_interval: 10,
            hello_priority: 1,
            hello_dead: 40,
            designated: Ipv4Addr::UNSPECIFIED,
            backup: Ipv4Addr::UNSPECIFIED,
            neighbors: 0,
            neighbor_addresses: Vec::new(),
            dd_mtu: 1500,
            dd_flags: 0x07,
            dd_sequence: 0,
            dd_include_lsa: false,
            lsa_type: ospf::LSA_ROUTER,
            lsa_age: 0,
            lsa_id: Ipv4Addr::UNSPECIFIED,
            lsa_router: Ipv4Addr::UNSPECIFIED,
            lsa_sequence: 0,
            lsa_metric: 0,
            lsa_flags: 0,
            lsa_link_id: Ipv4Addr::UNSPECIFIED,
            lsa_link_data: Ipv4Addr::UNSPECIFIED,
            lsa_link_type: 1,
            lsa_attached: Ipv4Addr::UNSPECIFIED,
            lsa_larger: false,
            lsa_forward: Ipv4Addr::UNSPECIFIED,
            lsa_external: 0,
            vertex_type: 1,
            vertex_id: Ipv4Addr::UNSPECIFIED,
            auth: false,
            key_id: 0,
            sequence: 0,
            lls: false,
            lls_options: 0,
        }
    }
}

/// Load configuration from a YAML file, falling back to defaults when the
/// file does not exist.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_file = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

    if !Path::new(config_file).exists() {
        info!("Config file {} not found, using defaults", config_file);
        return Ok(get_default_config());
    }

    let config_str = std::fs::read_to_string(config_file)
        .map_err(|e| ConfigError::ParseError(format!("Failed to read config file: {}", e)))?;

    serde_yaml::from_str(&config_str)
        .map_err(|e| ConfigError::ParseError(format!("Failed to parse config file: {}", e)).into())
}

pub fn get_default_config() -> Config {
    Config::default()
}

/// Sets the field at dotted path `key` (e.g. `tcp.options.mss`) from a YAML
/// scalar or sequence, going through the serialized form of the record so
/// every field type is parsed the same way as in the config file.
pub fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: key.to_string(),
        value: value.to_string(),
        reason,
    };

    let mut root = serde_yaml::to_value(&*config).map_err(|e| invalid(e.to_string()))?;
    let mut slot = &mut root;
    for part in key.split('.') {
        slot = slot
            .get_mut(part)
            .ok_or_else(|| invalid("unknown configuration key".to_string()))?;
    }
    *slot = serde_yaml::from_str(value).map_err(|e| invalid(e.to_string()))?;

    *config = serde_yaml::from_value(root).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_nested_field() {
        let mut config = Config::default();
        apply_override(&mut config, "tcp.options.mss", "true").unwrap();
        apply_override(&mut config, "ip.saddr", "10.1.1.1").unwrap();
        assert!(config.tcp.options.mss);
        assert_eq!(config.ip.saddr, Ipv4Addr::new(10, 1, 1, 1));
    }

    #[test]
    fn test_override_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply_override(&mut config, "tcp.bogus", "1").is_err());
        assert!(apply_override(&mut config, "ip.ttl", "300").is_err());
        assert_eq!(config.ip.ttl, ip::DEFAULT_TTL);
    }
}
