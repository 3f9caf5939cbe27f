//! Application constants and wire-format values
//!
//! This module centralizes protocol numbers, header sizes, limits and the
//! other magic numbers used by the builders and the runtime.

use std::time::Duration;

// Configuration file constants
pub const DEFAULT_CONFIG_FILE: &str = "proto_flood.yaml";
pub const STATS_EXPORT_DIR: &str = "exports";

// CIDR limits
pub const CIDR_MINIMUM: u8 = 8;
pub const CIDR_MAXIMUM: u8 = 32;
/// Largest host range a /8 can produce; anything above is an arithmetic fault.
pub const MAXIMUM_HOST_RANGE: u64 = (1 << 24) - 1;

// Pseudo-protocol selecting every module in turn
pub const ALL_PROTOCOLS: &str = "T50";

// IP protocol numbers
pub mod ipproto {
    pub const ICMP: u8 = 1;
    pub const IGMP: u8 = 2;
    pub const TCP: u8 = 6;
    pub const EGP: u8 = 8;
    pub const UDP: u8 = 17;
    pub const DCCP: u8 = 33;
    pub const RSVP: u8 = 46;
    pub const GRE: u8 = 47;
    pub const ESP: u8 = 50;
    pub const AH: u8 = 51;
    pub const EIGRP: u8 = 88;
    pub const OSPF: u8 = 89;
    pub const RAW: u8 = 255;
}

// IPv4 header
pub mod ip {
    pub const VERSION: u8 = 4;
    pub const HEADER_LEN: usize = 20;
    pub const FLAG_DF: u16 = 0x4000;
    pub const FLAG_MF: u16 = 0x2000;
    pub const DEFAULT_TOS: u8 = 0x40;
    pub const DEFAULT_TTL: u8 = 255;
}

// Pseudo-header used by TCP, UDP and DCCP checksums
pub const PSEUDO_HEADER_LEN: usize = 12;

pub mod gre {
    pub const HEADER_LEN: usize = 4;
    pub const CHECKSUM_LEN: usize = 4;
    pub const KEY_LEN: usize = 4;
    pub const SEQUENCE_LEN: usize = 4;
    pub const FLAG_CHECKSUM: u16 = 0x8000;
    pub const FLAG_KEY: u16 = 0x2000;
    pub const FLAG_SEQUENCE: u16 = 0x1000;
    pub const VERSION: u16 = 0;
    pub const ETHERTYPE_IPV4: u16 = 0x0800;
}

pub mod icmp {
    pub const HEADER_LEN: usize = 8;
    pub const ECHO: u8 = 8;
    pub const REDIRECT: u8 = 5;
    pub const REDIRECT_NET: u8 = 0;
    pub const REDIRECT_HOST: u8 = 1;
}

pub mod igmp {
    pub const V1_HEADER_LEN: usize = 8;
    pub const V3_QUERY_LEN: usize = 12;
    pub const V3_REPORT_LEN: usize = 8;
    pub const V3_GROUP_RECORD_LEN: usize = 8;
    pub const MEMBERSHIP_QUERY: u8 = 0x11;
    pub const V3_MEMBERSHIP_REPORT: u8 = 0x22;
    pub const MODE_IS_INCLUDE: u8 = 1;
}

pub mod tcp {
    pub const HEADER_LEN: usize = 20;
    pub const MAX_OPTIONS_LEN: usize = 40;

    pub const OPT_EOL: u8 = 0;
    pub const OPT_NOP: u8 = 1;
    pub const OPT_MSS: u8 = 2;
    pub const OPT_WSOPT: u8 = 3;
    pub const OPT_SACK_OK: u8 = 4;
    pub const OPT_SACK: u8 = 5;
    pub const OPT_TSOPT: u8 = 8;
    pub const OPT_CC: u8 = 11;
    pub const OPT_CC_NEW: u8 = 12;
    pub const OPT_CC_ECHO: u8 = 13;
    pub const OPT_MD5: u8 = 19;
    pub const OPT_AO: u8 = 29;

    pub const OPTLEN_MSS: usize = 4;
    pub const OPTLEN_WSOPT: usize = 3;
    pub const OPTLEN_SACK_OK: usize = 2;
    pub const OPTLEN_SACK_EDGE: usize = 10;
    pub const OPTLEN_TSOPT: usize = 10;
    pub const OPTLEN_CC: usize = 6;
    pub const OPTLEN_MD5: usize = 18;
    pub const OPTLEN_AO: usize = 20;

    pub const FLAG_FIN: u8 = 0x01;
    pub const FLAG_SYN: u8 = 0x02;
    pub const FLAG_RST: u8 = 0x04;
    pub const FLAG_PSH: u8 = 0x08;
    pub const FLAG_ACK: u8 = 0x10;
    pub const FLAG_URG: u8 = 0x20;
    pub const FLAG_ECE: u8 = 0x40;
    pub const FLAG_CWR: u8 = 0x80;
}

pub mod egp {
    pub const VERSION: u8 = 2;
    pub const HEADER_LEN: usize = 10;
    pub const ACQUIRE_LEN: usize = 4;
    pub const TYPE_ACQUIRE: u8 = 3;
    pub const CODE_REQUEST: u8 = 0;
    pub const STATUS_ACTIVE: u8 = 1;
}

pub mod udp {
    pub const HEADER_LEN: usize = 8;
}

pub mod rip {
    pub const PORT: u16 = 520;
    pub const HEADER_LEN: usize = 4;
    pub const MESSAGE_LEN: usize = 20;
    pub const AUTH_LEN: usize = 20;
    pub const TRAILER_LEN: usize = 4;
    pub const COMMAND_RESPONSE: u8 = 2;
    pub const AF_INET: u16 = 2;
    pub const AUTH_FAMILY: u16 = 0xffff;
    pub const AUTH_KEYED_MD5: u16 = 0x0003;
    pub const TRAILER_TYPE: u16 = 0x0001;
}

pub mod dccp {
    pub const HEADER_LEN: usize = 12;
    pub const EXTENDED_LEN: usize = 4;
    pub const ACK_SHORT_LEN: usize = 4;
    pub const ACK_LONG_LEN: usize = 8;
    pub const REQUEST_LEN: usize = 4;
    pub const RESPONSE_LEN: usize = 12;
    pub const RESET_LEN: usize = 12;

    pub const TYPE_REQUEST: u8 = 0;
    pub const TYPE_RESPONSE: u8 = 1;
    pub const TYPE_DATA: u8 = 2;
    pub const TYPE_ACK: u8 = 3;
    pub const TYPE_DATAACK: u8 = 4;
    pub const TYPE_CLOSEREQ: u8 = 5;
    pub const TYPE_CLOSE: u8 = 6;
    pub const TYPE_RESET: u8 = 7;
    pub const TYPE_SYNC: u8 = 8;
    pub const TYPE_SYNCACK: u8 = 9;
}

pub mod rsvp {
    pub const VERSION: u8 = 1;
    pub const HEADER_LEN: usize = 8;
    pub const OBJECT_HEADER_LEN: usize = 4;

    pub const MSG_PATH: u8 = 1;
    pub const MSG_RESV: u8 = 2;
    pub const MSG_PATHERR: u8 = 3;
    pub const MSG_RESVERR: u8 = 4;
    pub const MSG_PATHTEAR: u8 = 5;
    pub const MSG_RESVTEAR: u8 = 6;
    pub const MSG_RESVCONF: u8 = 7;

    pub const CLASS_SESSION: u8 = 1;
    pub const CLASS_RSVP_HOP: u8 = 3;
    pub const CLASS_TIME_VALUES: u8 = 5;
    pub const CLASS_ERROR_SPEC: u8 = 6;
    pub const CLASS_SCOPE: u8 = 7;
    pub const CLASS_STYLE: u8 = 8;
    pub const CLASS_SENDER_TEMPLATE: u8 = 11;
    pub const CLASS_SENDER_TSPEC: u8 = 12;
    pub const CLASS_ADSPEC: u8 = 13;
    pub const CLASS_RESV_CONFIRM: u8 = 15;

    pub const LEN_SESSION: usize = 12;
    pub const LEN_RSVP_HOP: usize = 12;
    pub const LEN_TIME_VALUES: usize = 8;
    pub const LEN_ERROR_SPEC: usize = 12;
    pub const LEN_STYLE: usize = 8;
    pub const LEN_SENDER_TEMPLATE: usize = 12;
    pub const LEN_RESV_CONFIRM: usize = 8;
    /// Object header plus IntServ message header.
    pub const LEN_SENDER_TSPEC: usize = 8;
    /// Object header, IntServ message header and the general parameters fragment.
    pub const LEN_ADSPEC: usize = 44;

    pub const TSPEC_TRAFFIC_SERVICE: u8 = 1;
    pub const TSPEC_GUARANTEED_SERVICE: u8 = 2;
    /// Service header plus the token bucket parameter.
    pub const TSPEC_SERVICE_LEN: usize = 28;
    pub const TSPEC_TOKEN_BUCKET: u8 = 127;

    pub const ADSPEC_GUARANTEED_SERVICE: u8 = 2;
    pub const ADSPEC_CONTROLLED_SERVICE: u8 = 5;
    pub const ADSPEC_GUARANTEED_LEN: usize = 36;
    pub const ADSPEC_CONTROLLED_LEN: usize = 4;
}

pub mod ipsec {
    pub const AH_HEADER_LEN: usize = 12;
    pub const ESP_HEADER_LEN: usize = 8;
    pub const ESP_DATA_LEN: usize = 8;
}

pub mod eigrp {
    pub const VERSION: u8 = 2;
    pub const HEADER_LEN: usize = 20;

    pub const OPCODE_UPDATE: u8 = 1;
    pub const OPCODE_REQUEST: u8 = 2;
    pub const OPCODE_QUERY: u8 = 3;
    pub const OPCODE_REPLY: u8 = 4;
    pub const OPCODE_HELLO: u8 = 5;
    pub const OPCODE_SIA_QUERY: u8 = 10;
    pub const OPCODE_SIA_REPLY: u8 = 11;

    pub const TYPE_PARAMETER: u16 = 0x0001;
    pub const TYPE_AUTH: u16 = 0x0002;
    pub const TYPE_SEQUENCE: u16 = 0x0003;
    pub const TYPE_SOFTWARE: u16 = 0x0004;
    pub const TYPE_MULTICAST: u16 = 0x0005;
    pub const TYPE_INTERNAL: u16 = 0x0102;
    pub const TYPE_EXTERNAL: u16 = 0x0103;

    pub const TLV_PARAMETER: usize = 12;
    pub const TLV_AUTH: usize = 40;
    pub const TLV_SEQUENCE: usize = 9;
    pub const TLV_SOFTWARE: usize = 8;
    pub const TLV_MULTICAST: usize = 8;
    pub const TLV_INTERNAL: usize = 25;
    pub const TLV_EXTERNAL: usize = 45;

    pub const AUTH_HMAC_MD5: u16 = 2;
}

pub mod ospf {
    pub const VERSION: u8 = 2;
    pub const HEADER_LEN: usize = 24;

    pub const TYPE_HELLO: u8 = 1;
    pub const TYPE_DD: u8 = 2;
    pub const TYPE_LSREQUEST: u8 = 3;
    pub const TYPE_LSUPDATE: u8 = 4;
    pub const TYPE_LSACK: u8 = 5;

    pub const LEN_HELLO: usize = 20;
    pub const LEN_DD: usize = 8;
    pub const LEN_LSREQUEST: usize = 12;
    pub const LEN_LSUPDATE: usize = 4;
    pub const LSA_HEADER_LEN: usize = 20;

    pub const LSA_ROUTER: u8 = 1;
    pub const LSA_NETWORK: u8 = 2;
    pub const LSA_SUMMARY_IP: u8 = 3;
    pub const LSA_SUMMARY_AS: u8 = 4;
    pub const LSA_AS_EXTERNAL: u8 = 5;
    pub const LSA_MULTICAST: u8 = 6;
    pub const LSA_NSSA: u8 = 7;

    pub const LSA_LEN_ROUTER: usize = 16;
    pub const LSA_LEN_NETWORK: usize = 8;
    pub const LSA_LEN_SUMMARY: usize = 8;
    pub const LSA_LEN_EXTERNAL: usize = 16;
    pub const LSA_LEN_MULTICAST: usize = 8;

    pub const AUTH_NONE: u16 = 0;
    pub const AUTH_CRYPTO: u16 = 2;
    pub const OPTION_LLS: u8 = 0x10;

    pub const LLS_HEADER_LEN: usize = 4;
    pub const LLS_EXT_OPTIONS_LEN: usize = 8;
    pub const LLS_CRYPTO_AUTH_LEN: usize = 24;
    pub const LLS_TYPE_EXT_OPTIONS: u16 = 1;
    pub const LLS_TYPE_CRYPTO_AUTH: u16 = 2;
}

/// Keyed-MD5 digest length shared by RIPv2, EIGRP, TCP-MD5 and OSPF.
pub const AUTH_DIGEST_LEN: usize = 16;

// Emission
pub const DEFAULT_THRESHOLD: u64 = 1000;
/// Packets emitted between cooperative yields to the runtime.
pub const YIELD_INTERVAL: u64 = 64;
pub const SEND_RETRY_LIMIT: u32 = 5;
pub const SEND_RETRY_WAIT: Duration = Duration::from_millis(10);
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

// Network ranges and limits
pub const PRIVATE_IPV4_RANGES: &[(u32, u32)] = &[
    (0xC0A80000, 0xFFFF0000), // 192.168.0.0/16
    (0x0A000000, 0xFF000000), // 10.0.0.0/8
    (0xAC100000, 0xFFF00000), // 172.16.0.0/12
];

// Default configuration values
pub mod defaults {
    pub const TARGET_HOST: &str = "192.168.1.1";
    pub const PROTOCOL: &str = "TCP";
    pub const STATS_INTERVAL: u64 = 5;
    pub const EXPORT_INTERVAL: u64 = 60;
    pub const FILENAME_PATTERN: &str = "proto_flood";
}

// Statistics and monitoring
pub mod stats {
    pub const LOG_FREQUENCY: u64 = 1000;
    pub const MEGABITS_DIVISOR: f64 = 1_000_000.0;
    pub const BYTES_TO_MB_DIVISOR: u64 = 1024 * 1024;
}

// System validation constants
pub mod validation {
    pub const ROOT_UID: u32 = 0;
}

// Error message constants
pub mod error_messages {
    pub const ROOT_REQUIRED: &str = "This program requires root privileges for raw socket access. Use --dry-run for testing without root.";
    pub const PRIVATE_RANGE_REQUIRED: &str = "Target IP must be in private range for safety";
    pub const PRIVATE_BLOCK_REQUIRED: &str = "Target prefix must stay inside a single private range";
    pub const LOOPBACK_PROHIBITED: &str = "Cannot target loopback, multicast, or broadcast addresses";
    pub const IPV6_UNSUPPORTED: &str = "Only IPv4 targets are supported";
}
