//! Centralized error handling for proto-flood
//!
//! Every layer reports failures through these types. Whether a failure ends
//! the run is decided by [`FloodError::is_fatal`]; only `main` turns a fatal
//! error into a process exit.

use std::fmt;
use std::io;

/// Main error type for the proto-flood application
#[derive(Debug)]
pub enum FloodError {
    /// Configuration-related errors
    Config(ConfigError),
    /// Network-related errors
    Network(NetworkError),
    /// Validation errors
    Validation(ValidationError),
    /// Packet synthesis errors
    Packet(PacketError),
    /// Statistics and export errors
    Stats(StatsError),
    /// System-level errors
    System(SystemError),
    /// Audit logging errors
    Audit(AuditError),
    /// I/O errors
    Io(io::Error),
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    ParseError(String),
    InvalidValue { field: String, value: String, reason: String },
    UnknownOption { option: String, protocol: String },
}

#[derive(Debug)]
pub enum NetworkError {
    ResolutionFailed(String),
    ChannelCreation(String),
    PacketSend(String),
    InvalidAddress(String),
}

#[derive(Debug)]
pub enum ValidationError {
    InvalidIpRange { ip: String, reason: String },
    InvalidPrefix { bits: u8, min: u8, max: u8 },
    BelowMinimum { field: String, value: u64, minimum: u64 },
    PrivilegeRequired(String),
}

#[derive(Debug, PartialEq)]
pub enum PacketError {
    /// A builder asked the buffer manager for zero bytes.
    InvalidSize(usize),
    AllocationFailed { requested: usize },
    BufferOverflow { required: usize, available: usize },
    SizeMismatch { expected: usize, written: usize },
    TcpOptionsTooLarge { size: usize, limit: usize },
    UnknownProtocol(String),
}

#[derive(Debug)]
pub enum StatsError {
    ExportFailed(String),
    SerializationError(String),
    FileWriteError(String),
}

#[derive(Debug)]
pub enum SystemError {
    /// Arithmetic or platform inconsistency that no user input can fix.
    Internal(String),
    ForkFailed(String),
    RuntimeUnavailable(String),
}

#[derive(Debug)]
pub enum AuditError {
    LogCreationFailed(String),
    WriteError(String),
    FormatError(String),
}

impl FloodError {
    /// A single failed send is the only condition the emission loop may
    /// survive; everything else stops the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FloodError::Network(NetworkError::PacketSend(_)))
    }
}

impl fmt::Display for FloodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloodError::Config(e) => write!(f, "Configuration error: {}", e),
            FloodError::Network(e) => write!(f, "Network error: {}", e),
            FloodError::Validation(e) => write!(f, "Validation error: {}", e),
            FloodError::Packet(e) => write!(f, "Packet error: {}", e),
            FloodError::Stats(e) => write!(f, "Statistics error: {}", e),
            FloodError::System(e) => write!(f, "System error: {}", e),
            FloodError::Audit(e) => write!(f, "Audit error: {}", e),
            FloodError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value '{}' for field '{}': {}", value, field, reason)
            }
            ConfigError::UnknownOption { option, protocol } => {
                write!(f, "Option '{}' is not accepted by protocol {}", option, protocol)
            }
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ResolutionFailed(host) => write!(f, "Unable to resolve host: {}", host),
            NetworkError::ChannelCreation(msg) => write!(f, "Failed to create network channel: {}", msg),
            NetworkError::PacketSend(msg) => write!(f, "Failed to send packet: {}", msg),
            NetworkError::InvalidAddress(addr) => write!(f, "Invalid network address: {}", addr),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidIpRange { ip, reason } => {
                write!(f, "IP address {} is invalid: {}", ip, reason)
            }
            ValidationError::InvalidPrefix { bits, min, max } => {
                write!(f, "CIDR prefix /{} is outside the supported range /{}../{}", bits, min, max)
            }
            ValidationError::BelowMinimum { field, value, minimum } => {
                write!(f, "Value {} for {} is below the minimum of {}", value, field, minimum)
            }
            ValidationError::PrivilegeRequired(msg) => write!(f, "Privilege required: {}", msg),
        }
    }
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketError::InvalidSize(size) => write!(f, "Invalid packet buffer size requested: {}", size),
            PacketError::AllocationFailed { requested } => {
                write!(f, "Unable to allocate {} bytes for the packet buffer", requested)
            }
            PacketError::BufferOverflow { required, available } => {
                write!(f, "Buffer too small: required {}, available {}", required, available)
            }
            PacketError::SizeMismatch { expected, written } => {
                write!(f, "Packet size mismatch: expected {} bytes, wrote {}", expected, written)
            }
            PacketError::TcpOptionsTooLarge { size, limit } => {
                write!(f, "TCP options size ({} bytes) is bigger than {} bytes", size, limit)
            }
            PacketError::UnknownProtocol(name) => write!(f, "Unknown protocol: {}", name),
        }
    }
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::ExportFailed(msg) => write!(f, "Failed to export statistics: {}", msg),
            StatsError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            StatsError::FileWriteError(msg) => write!(f, "File write error: {}", msg),
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::Internal(msg) => write!(f, "Internal error: {}", msg),
            SystemError::ForkFailed(msg) => write!(f, "Unable to split workload: {}", msg),
            SystemError::RuntimeUnavailable(msg) => write!(f, "Runtime unavailable: {}", msg),
        }
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditError::LogCreationFailed(msg) => write!(f, "Failed to create audit log: {}", msg),
            AuditError::WriteError(msg) => write!(f, "Audit write error: {}", msg),
            AuditError::FormatError(msg) => write!(f, "Audit format error: {}", msg),
        }
    }
}

impl std::error::Error for FloodError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FloodError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for NetworkError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for PacketError {}
impl std::error::Error for StatsError {}
impl std::error::Error for SystemError {}
impl std::error::Error for AuditError {}

impl From<io::Error> for FloodError {
    fn from(error: io::Error) -> Self {
        FloodError::Io(error)
    }
}

impl From<ConfigError> for FloodError {
    fn from(error: ConfigError) -> Self {
        FloodError::Config(error)
    }
}

impl From<NetworkError> for FloodError {
    fn from(error: NetworkError) -> Self {
        FloodError::Network(error)
    }
}

impl From<ValidationError> for FloodError {
    fn from(error: ValidationError) -> Self {
        FloodError::Validation(error)
    }
}

impl From<PacketError> for FloodError {
    fn from(error: PacketError) -> Self {
        FloodError::Packet(error)
    }
}

impl From<StatsError> for FloodError {
    fn from(error: StatsError) -> Self {
        FloodError::Stats(error)
    }
}

impl From<SystemError> for FloodError {
    fn from(error: SystemError) -> Self {
        FloodError::System(error)
    }
}

impl From<AuditError> for FloodError {
    fn from(error: AuditError) -> Self {
        FloodError::Audit(error)
    }
}

/// Type alias for Results used throughout the application
pub type Result<T> = std::result::Result<T, FloodError>;

/// Helper trait for converting foreign errors into the matching category
pub trait MapError<T> {
    fn map_network_error(self, context: &str) -> Result<T>;
    fn map_system_error(self, context: &str) -> Result<T>;
}

impl<T, E: fmt::Display> MapError<T> for std::result::Result<T, E> {
    fn map_network_error(self, context: &str) -> Result<T> {
        self.map_err(|e| NetworkError::ChannelCreation(format!("{}: {}", context, e)).into())
    }

    fn map_system_error(self, context: &str) -> Result<T> {
        self.map_err(|e| SystemError::RuntimeUnavailable(format!("{}: {}", context, e)).into())
    }
}
