use std::net::Ipv4Addr;

use crate::constants::{CIDR_MAXIMUM, MAXIMUM_HOST_RANGE};
use crate::error::{Result, SystemError, ValidationError};
use crate::random::Randomizer;

/// Destination range derived once from `base/bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrTarget {
    first_address: u32,
    host_id_range: u32,
}

impl CidrTarget {
    pub fn new(base: Ipv4Addr, bits: u8) -> Result<Self> {
        if bits > CIDR_MAXIMUM {
            return Err(ValidationError::InvalidPrefix {
                bits,
                min: 0,
                max: CIDR_MAXIMUM,
            }
            .into());
        }

        let (first_address, host_id_range) = if bits < CIDR_MAXIMUM {
            let host_id_range = (1u64 << (32 - bits)) - 2;
            let netmask = !(u32::MAX >> bits);
            ((u32::from(base) & netmask).wrapping_add(1), host_id_range)
        } else {
            (u32::from(base), 0)
        };

        if host_id_range > MAXIMUM_HOST_RANGE {
            return Err(SystemError::Internal(format!(
                "host range {} for /{} exceeds {}",
                host_id_range, bits, MAXIMUM_HOST_RANGE
            ))
            .into());
        }

        Ok(Self {
            first_address,
            host_id_range: host_id_range as u32,
        })
    }

    pub fn first_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.first_address)
    }

    /// Number of assignable hosts; zero means the address is used as given.
    pub fn host_id_range(&self) -> u32 {
        self.host_id_range
    }

    pub fn next_address(&self, rng: &mut Randomizer) -> Ipv4Addr {
        if self.host_id_range == 0 {
            return Ipv4Addr::from(self.first_address);
        }
        Ipv4Addr::from(self.first_address + rng.u32() % self.host_id_range)
    }
}
