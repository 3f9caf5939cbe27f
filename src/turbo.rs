//! Two-process work split
//!
//! The fork happens before any runtime or socket exists, so each process
//! builds its own buffer, randomizer and sender afterwards. The child takes
//! half of the threshold and the parent keeps the rest, including an odd
//! remainder. In flood mode both processes flood.

use std::io;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, SystemError};
use crate::worker::Budget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Turbo mode is off.
    Single,
    Parent { child: libc::pid_t },
    Child,
}

/// `(parent, child)` shares of a finite threshold.
pub fn split_threshold(threshold: u64) -> (u64, u64) {
    let child = threshold / 2;
    (threshold - child, child)
}

pub fn budget_for(role: Role, config: &Config) -> Budget {
    match (Budget::from_config(config), role) {
        (Budget::Flood, _) => Budget::Flood,
        (Budget::Packets(total), Role::Single) => Budget::Packets(total),
        (Budget::Packets(total), Role::Parent { .. }) => Budget::Packets(split_threshold(total).0),
        (Budget::Packets(total), Role::Child) => Budget::Packets(split_threshold(total).1),
    }
}

/// Forks when `emission.turbo` is set and reports which side this is.
pub fn split(config: &Config) -> Result<Role> {
    if !config.emission.turbo {
        return Ok(Role::Single);
    }

    let pid = unsafe { libc::fork() };
    match pid {
        -1 => Err(SystemError::ForkFailed(io::Error::last_os_error().to_string()).into()),
        0 => Ok(Role::Child),
        child => {
            info!("Turbo mode: child process {} started", child);
            Ok(Role::Parent { child })
        }
    }
}

/// Blocks until `child` exits and returns its exit status.
pub fn wait_for_child(child: libc::pid_t) -> Result<i32> {
    let mut status: libc::c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(child, &mut status, 0) };
        if rc == child {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(SystemError::Internal(format!("waitpid({}) failed: {}", child, err)).into());
        }
    }

    let code = if libc::WIFEXITED(status) {
        libc::WEXITSTATUS(status)
    } else {
        // killed by a signal
        1
    };
    debug!("Child process {} exited with status {}", child, code);
    Ok(code)
}

pub fn terminate_child(child: libc::pid_t) {
    if unsafe { libc::kill(child, libc::SIGTERM) } != 0 {
        warn!("Unable to signal child process {}: {}", child, io::Error::last_os_error());
    }
}
