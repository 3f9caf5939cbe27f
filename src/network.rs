use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use tracing::debug;

use crate::constants::error_messages;
use crate::error::{NetworkError, Result, ValidationError};

/// Resolves a host name or dotted quad to an IPv4 address.
pub fn resolve_host(host: &str) -> Result<Ipv4Addr> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return match addr {
            IpAddr::V4(ipv4) => Ok(ipv4),
            IpAddr::V6(_) => Err(ValidationError::InvalidIpRange {
                ip: host.to_string(),
                reason: error_messages::IPV6_UNSUPPORTED.to_string(),
            }
            .into()),
        };
    }

    let resolved = (host, 0)
        .to_socket_addrs()
        .map_err(|e| NetworkError::ResolutionFailed(format!("{}: {}", host, e)))?
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(ipv4) => Some(ipv4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| NetworkError::ResolutionFailed(format!("{}: no IPv4 address", host)))?;

    debug!("Resolved {} to {}", host, resolved);
    Ok(resolved)
}

/// Splits `HOST[/BITS]`; without a suffix `default_bits` is used.
pub fn parse_target(spec: &str, default_bits: u8) -> Result<(String, u8)> {
    match spec.split_once('/') {
        Some((host, bits)) => {
            let bits = bits
                .parse::<u8>()
                .map_err(|_| NetworkError::InvalidAddress(spec.to_string()))?;
            Ok((host.to_string(), bits))
        }
        None => Ok((spec.to_string(), default_bits)),
    }
}
