use std::net::Ipv4Addr;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::{error_messages, validation::ROOT_UID, CIDR_MAXIMUM, CIDR_MINIMUM, PRIVATE_IPV4_RANGES};
use crate::error::{Result, ValidationError};
use crate::registry::{self, Selection};

pub fn is_private(ip: &Ipv4Addr) -> bool {
    let ip_u32 = u32::from(*ip);
    PRIVATE_IPV4_RANGES
        .iter()
        .any(|(network, mask)| (ip_u32 & mask) == *network)
}

pub fn validate_target_ip(ip: &Ipv4Addr) -> Result<()> {
    if is_private(ip) {
        info!("Target IP {} validated as private range", ip);
        Ok(())
    } else {
        Err(ValidationError::InvalidIpRange {
            ip: ip.to_string(),
            reason: error_messages::PRIVATE_RANGE_REQUIRED.to_string(),
        }
        .into())
    }
}

/// True when every address of `base/bits` lies in the same private range.
pub fn is_private_block(base: &Ipv4Addr, bits: u8) -> bool {
    let mask = u32::MAX.checked_shl(32 - u32::from(bits.min(32))).unwrap_or(0);
    let network = u32::from(*base) & mask;
    let broadcast = network | !mask;
    PRIVATE_IPV4_RANGES
        .iter()
        .any(|(range, range_mask)| network & range_mask == *range && broadcast & range_mask == *range)
}

/// The randomizer draws across the whole prefix, so the block is checked,
/// not just the base address.
pub fn validate_target_block(ip: &Ipv4Addr, bits: u8) -> Result<()> {
    validate_target_ip(ip)?;
    if !is_private_block(ip, bits) {
        return Err(ValidationError::InvalidIpRange {
            ip: format!("{}/{}", ip, bits),
            reason: error_messages::PRIVATE_BLOCK_REQUIRED.to_string(),
        }
        .into());
    }
    Ok(())
}

pub fn is_loopback_or_multicast(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_multicast() || ip.is_broadcast()
}

pub fn validate_prefix(bits: u8) -> Result<()> {
    if !(CIDR_MINIMUM..=CIDR_MAXIMUM).contains(&bits) {
        return Err(ValidationError::InvalidPrefix {
            bits,
            min: CIDR_MINIMUM,
            max: CIDR_MAXIMUM,
        }
        .into());
    }
    Ok(())
}

/// Target and emission checks run once before anything is sent.
pub fn validate_run(config: &Config, target: &Ipv4Addr, selection: Selection) -> Result<()> {
    if is_loopback_or_multicast(target) {
        return Err(ValidationError::InvalidIpRange {
            ip: target.to_string(),
            reason: error_messages::LOOPBACK_PROHIBITED.to_string(),
        }
        .into());
    }

    validate_prefix(config.target.bits)?;

    if config.safety.require_private_ranges {
        validate_target_block(target, config.target.bits)?;
    } else {
        warn!("Private range enforcement disabled for target {}", target);
    }

    let emission = &config.emission;
    if !emission.flood {
        if emission.threshold == 0 {
            return Err(ValidationError::BelowMinimum {
                field: "threshold".to_string(),
                value: 0,
                minimum: 1,
            }
            .into());
        }
        // every module must get at least one packet per run
        let modules = registry::count() as u64;
        if selection == Selection::All && emission.threshold < modules {
            return Err(ValidationError::BelowMinimum {
                field: "threshold".to_string(),
                value: emission.threshold,
                minimum: modules,
            }
            .into());
        }
    }

    if emission.shuffle && selection != Selection::All {
        warn!("Shuffle only applies when cycling through all protocols");
    }

    Ok(())
}

pub fn validate_system_requirements(dry_run: bool) -> Result<()> {
    // raw sockets need root, dry runs never open one
    if !dry_run && unsafe { libc::geteuid() } != ROOT_UID {
        return Err(ValidationError::PrivilegeRequired(error_messages::ROOT_REQUIRED.to_string()).into());
    }

    if dry_run {
        info!("Dry-run mode: Skipping root privilege check");
    }

    Ok(())
}
