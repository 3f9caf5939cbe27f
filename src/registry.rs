//! Protocol module registry
//!
//! A static table in cycling order. Each entry names the configuration keys
//! its builder reads, which is what `--set` overrides are checked against.

use crate::buffer::PacketBuffer;
use crate::config::Config;
use crate::constants::{ipproto, ALL_PROTOCOLS};
use crate::error::Result;
use crate::protocol::{dccp, egp, eigrp, icmp, igmp, ipsec, ospf, rip, rsvp, tcp, udp};
use crate::random::Randomizer;

pub type BuildFn = fn(&Config, &mut PacketBuffer, &mut Randomizer) -> Result<usize>;
pub type SizeFn = fn(&Config) -> Result<usize>;

pub struct ProtocolModule {
    pub protocol: u8,
    pub acronym: &'static str,
    pub description: &'static str,
    pub build: BuildFn,
    pub packet_size: SizeFn,
    pub options: &'static [&'static str],
}

impl std::fmt::Debug for ProtocolModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolModule")
            .field("protocol", &self.protocol)
            .field("acronym", &self.acronym)
            .finish()
    }
}

/// Keys every module accepts.
pub const COMMON_OPTIONS: &[&str] = &[
    "bogus_csum",
    "encapsulated",
    "ip.tos",
    "ip.id",
    "ip.frag_offset",
    "ip.ttl",
    "ip.saddr",
    "gre.checksum",
    "gre.key",
    "gre.sequence",
    "gre.key_value",
    "gre.sequence_value",
    "gre.saddr",
    "gre.daddr",
];

const ICMP_OPTIONS: &[&str] = &["icmp.icmp_type", "icmp.code", "icmp.id", "icmp.sequence", "icmp.gateway"];

const IGMPV1_OPTIONS: &[&str] = &["igmp.igmp_type", "igmp.code", "igmp.group"];

const IGMPV3_OPTIONS: &[&str] = &[
    "igmp.igmp_type",
    "igmp.code",
    "igmp.group",
    "igmp.grec_type",
    "igmp.grec_mca",
    "igmp.suppress",
    "igmp.qrv",
    "igmp.qqic",
    "igmp.sources",
    "igmp.source_addresses",
];

const TCP_OPTIONS: &[&str] = &[
    "source_port",
    "dest_port",
    "tcp.fin",
    "tcp.syn",
    "tcp.rst",
    "tcp.psh",
    "tcp.ack",
    "tcp.urg",
    "tcp.ece",
    "tcp.cwr",
    "tcp.sequence",
    "tcp.acknowledge",
    "tcp.window",
    "tcp.urg_ptr",
    "tcp.doff",
    "tcp.options.mss",
    "tcp.options.wsopt",
    "tcp.options.tsopt",
    "tcp.options.sack_ok",
    "tcp.options.cc",
    "tcp.options.cc_new",
    "tcp.options.cc_echo",
    "tcp.options.sack_edge",
    "tcp.options.md5",
    "tcp.options.auth",
    "tcp.mss",
    "tcp.wscale",
    "tcp.tsval",
    "tcp.tsecr",
    "tcp.cc",
    "tcp.cc_new",
    "tcp.cc_echo",
    "tcp.sack_left",
    "tcp.sack_right",
    "tcp.key_id",
    "tcp.next_key",
    "tcp.nop",
];

const EGP_OPTIONS: &[&str] = &[
    "egp.egp_type",
    "egp.code",
    "egp.status",
    "egp.autonomous_system",
    "egp.sequence",
    "egp.hello",
    "egp.poll",
];

const UDP_OPTIONS: &[&str] = &["source_port", "dest_port"];

const RIPV1_OPTIONS: &[&str] = &["rip.command", "rip.family", "rip.address", "rip.metric"];

const RIPV2_OPTIONS: &[&str] = &[
    "rip.command",
    "rip.family",
    "rip.address",
    "rip.metric",
    "rip.domain",
    "rip.tag",
    "rip.netmask",
    "rip.next_hop",
    "rip.auth",
    "rip.key_id",
    "rip.sequence",
];

const DCCP_OPTIONS: &[&str] = &[
    "source_port",
    "dest_port",
    "dccp.dccp_type",
    "dccp.ccval",
    "dccp.cscov",
    "dccp.doff",
    "dccp.ext",
    "dccp.sequence_high",
    "dccp.sequence_low",
    "dccp.ack_high",
    "dccp.ack_low",
    "dccp.service",
    "dccp.reset_code",
    "dccp.reset_data",
];

const RSVP_OPTIONS: &[&str] = &[
    "rsvp.flags",
    "rsvp.msg_type",
    "rsvp.send_ttl",
    "rsvp.session_addr",
    "rsvp.session_protocol",
    "rsvp.session_flags",
    "rsvp.session_port",
    "rsvp.hop_addr",
    "rsvp.hop_iface",
    "rsvp.time_refresh",
    "rsvp.error_addr",
    "rsvp.error_flags",
    "rsvp.error_code",
    "rsvp.error_value",
    "rsvp.scope",
    "rsvp.scope_addresses",
    "rsvp.style_option",
    "rsvp.sender_addr",
    "rsvp.sender_port",
    "rsvp.tspec",
    "rsvp.token_rate",
    "rsvp.token_size",
    "rsvp.peak_rate",
    "rsvp.min_policed",
    "rsvp.max_packet",
    "rsvp.adspec",
    "rsvp.adspec_hop",
    "rsvp.adspec_path_bw",
    "rsvp.adspec_min_latency",
    "rsvp.adspec_mtu",
    "rsvp.adspec_ctot",
    "rsvp.adspec_dtot",
    "rsvp.adspec_csum",
    "rsvp.adspec_dsum",
    "rsvp.confirm_addr",
];

const IPSEC_OPTIONS: &[&str] = &[
    "ipsec.ah_length",
    "ipsec.ah_spi",
    "ipsec.ah_sequence",
    "ipsec.esp_spi",
    "ipsec.esp_sequence",
];

const EIGRP_OPTIONS: &[&str] = &[
    "eigrp.opcode",
    "eigrp.flags",
    "eigrp.sequence",
    "eigrp.acknowledge",
    "eigrp.autonomous_system",
    "eigrp.tlv_type",
    "eigrp.length",
    "eigrp.auth",
    "eigrp.key_id",
    "eigrp.next_hop",
    "eigrp.source_router",
    "eigrp.source_as",
    "eigrp.tag",
    "eigrp.external_metric",
    "eigrp.external_protocol",
    "eigrp.external_flags",
    "eigrp.delay",
    "eigrp.bandwidth",
    "eigrp.mtu",
    "eigrp.hop_count",
    "eigrp.reliability",
    "eigrp.load",
    "eigrp.prefix",
    "eigrp.destination",
    "eigrp.k1",
    "eigrp.k2",
    "eigrp.k3",
    "eigrp.k4",
    "eigrp.k5",
    "eigrp.hold",
    "eigrp.ios_major",
    "eigrp.ios_minor",
    "eigrp.ver_major",
    "eigrp.ver_minor",
    "eigrp.sequence_address",
    "eigrp.multicast",
];

const OSPF_OPTIONS: &[&str] = &[
    "ospf.packet_type",
    "ospf.router_id",
    "ospf.area_id",
    "ospf.options",
    "ospf.netmask",
    "ospf.hello_interval",
    "ospf.hello_priority",
    "ospf.hello_dead",
    "ospf.designated",
    "ospf.backup",
    "ospf.neighbors",
    "ospf.neighbor_addresses",
    "ospf.dd_mtu",
    "ospf.dd_flags",
    "ospf.dd_sequence",
    "ospf.dd_include_lsa",
    "ospf.lsa_type",
    "ospf.lsa_age",
    "ospf.lsa_id",
    "ospf.lsa_router",
    "ospf.lsa_sequence",
    "ospf.lsa_metric",
    "ospf.lsa_flags",
    "ospf.lsa_link_id",
    "ospf.lsa_link_data",
    "ospf.lsa_link_type",
    "ospf.lsa_attached",
    "ospf.lsa_larger",
    "ospf.lsa_forward",
    "ospf.lsa_external",
    "ospf.vertex_type",
    "ospf.vertex_id",
    "ospf.auth",
    "ospf.key_id",
    "ospf.sequence",
    "ospf.lls",
    "ospf.lls_options",
];

pub static MODULES: [ProtocolModule; 13] = [
    ProtocolModule {
        protocol: ipproto::ICMP,
        acronym: "ICMP",
        description: "Internet Control Message Protocol",
        build: icmp::build,
        packet_size: icmp::packet_size,
        options: ICMP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::IGMP,
        acronym: "IGMPv1",
        description: "Internet Group Message Protocol v1",
        build: igmp::build_v1,
        packet_size: igmp::packet_size_v1,
        options: IGMPV1_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::IGMP,
        acronym: "IGMPv3",
        description: "Internet Group Message Protocol v3",
        build: igmp::build_v3,
        packet_size: igmp::packet_size_v3,
        options: IGMPV3_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::TCP,
        acronym: "TCP",
        description: "Transmission Control Protocol",
        build: tcp::build,
        packet_size: tcp::packet_size,
        options: TCP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::EGP,
        acronym: "EGP",
        description: "Exterior Gateway Protocol",
        build: egp::build,
        packet_size: egp::packet_size,
        options: EGP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::UDP,
        acronym: "UDP",
        description: "User Datagram Protocol",
        build: udp::build,
        packet_size: udp::packet_size,
        options: UDP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::UDP,
        acronym: "RIPv1",
        description: "Routing Information Protocol v1",
        build: rip::build_v1,
        packet_size: rip::packet_size_v1,
        options: RIPV1_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::UDP,
        acronym: "RIPv2",
        description: "Routing Information Protocol v2",
        build: rip::build_v2,
        packet_size: rip::packet_size_v2,
        options: RIPV2_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::DCCP,
        acronym: "DCCP",
        description: "Datagram Congestion Control Protocol",
        build: dccp::build,
        packet_size: dccp::packet_size,
        options: DCCP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::RSVP,
        acronym: "RSVP",
        description: "Resource ReSerVation Protocol",
        build: rsvp::build,
        packet_size: rsvp::packet_size,
        options: RSVP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::AH,
        acronym: "IPSEC",
        description: "Internet Protocol Security (AH/ESP)",
        build: ipsec::build,
        packet_size: ipsec::packet_size,
        options: IPSEC_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::EIGRP,
        acronym: "EIGRP",
        description: "Enhanced Interior Gateway Routing Protocol",
        build: eigrp::build,
        packet_size: eigrp::packet_size,
        options: EIGRP_OPTIONS,
    },
    ProtocolModule {
        protocol: ipproto::OSPF,
        acronym: "OSPF",
        description: "Open Shortest Path First",
        build: ospf::build,
        packet_size: ospf::packet_size,
        options: OSPF_OPTIONS,
    },
];

pub fn count() -> usize {
    MODULES.len()
}

pub fn entry(index: usize) -> Option<&'static ProtocolModule> {
    MODULES.get(index)
}

/// Option keys accepted by the module at `index`, without the common ones.
pub fn valid_options(index: usize) -> &'static [&'static str] {
    MODULES.get(index).map(|m| m.options).unwrap_or(&[])
}

/// Index of the module named `acronym`, compared case-insensitively.
pub fn find(acronym: &str) -> Option<usize> {
    MODULES
        .iter()
        .position(|m| m.acronym.eq_ignore_ascii_case(acronym))
}

/// Which modules a run cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Single(usize),
    All,
}

impl Selection {
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case(ALL_PROTOCOLS) {
            return Some(Selection::All);
        }
        find(name).map(Selection::Single)
    }

    /// Whether `key` may be overridden for this selection.
    pub fn accepts(&self, key: &str) -> bool {
        if COMMON_OPTIONS.contains(&key) {
            return true;
        }
        match self {
            Selection::Single(index) => valid_options(*index).contains(&key),
            Selection::All => MODULES.iter().any(|m| m.options.contains(&key)),
        }
    }
}
