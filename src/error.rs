//! Error types for KNX operations.
//!
//! This module provides structured error types with backtraces and helper
//! methods for error introspection. Every fallible operation in the crate
//! returns `Result<T>` from here; nothing panics on malformed wire input.

use std::backtrace::Backtrace;
use std::fmt;

/// Result type alias for KNX operations.
pub type Result<T> = std::result::Result<T, KnxError>;

// =============================================================================
// Error Kind Enums (Internal)
// =============================================================================

/// Protocol error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolErrorKind {
    InvalidFrame,
    InvalidChecksum,
    UnsupportedVersion,
    UnsupportedServiceType,
    PayloadTooLarge,
    InvalidMessageCode,
    InvalidControlField,
    TruncatedDib,
    UnknownAssignmentMethod,
    MissingDeviceInfoDib,
}

/// Connection error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectionErrorKind {
    Refused,
    Timeout,
    Failed,
    Lost,
    ChannelNotFound,
    NoFreeChannels,
    NotConnected,
    AlreadyConnected,
}

/// Tunneling error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TunnelingErrorKind {
    SequenceMismatch,
    AckFailed,
}

/// Transport error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportErrorKind {
    SendFailed,
    ReceiveFailed,
    BufferTooSmall,
    NotBound,
    SocketError,
}

/// Addressing error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressingErrorKind {
    InvalidIndividualAddress,
    InvalidGroupAddress,
    OutOfRange,
}

/// DPT error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DptErrorKind {
    InvalidData,
    ValueOutOfRange,
    UnsupportedType,
}

/// Cache/client-API error variants (internal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheErrorKind {
    UnknownGroupAddress,
    AlreadyConfigured,
}

// =============================================================================
// Main Error Type
// =============================================================================

/// KNX protocol error types.
///
/// This is the main error type returned by all KNX operations. It contains a
/// backtrace and detailed error information through helper methods.
#[derive(Debug)]
pub enum KnxError {
    /// Protocol-related errors (frame parsing, version, DIB layout, etc.)
    Protocol(ProtocolError),
    /// Connection-related errors (connect, disconnect, etc.)
    Connection(ConnectionError),
    /// Tunneling-related errors (sequence, ACK, etc.)
    Tunneling(TunnelingError),
    /// Transport-related errors (socket, send, receive, etc.)
    Transport(TransportError),
    /// Addressing errors (invalid address format, etc.)
    Addressing(AddressingError),
    /// Datapoint Type errors (encoding, decoding, etc.)
    Dpt(DptError),
    /// Address-value cache / client API errors (unknown GA, etc.)
    Cache(CacheError),
    /// Generic operation errors
    InvalidState,
    UnsupportedOperation,
    Timeout,
}

// =============================================================================
// Structured Error Types
// =============================================================================

macro_rules! structured_error {
    ($name:ident, $kind:ty) => {
        #[derive(Debug)]
        pub struct $name {
            kind: $kind,
            backtrace: Backtrace,
        }

        impl $name {
            pub(crate) fn new(kind: $kind) -> Self {
                Self {
                    kind,
                    backtrace: Backtrace::capture(),
                }
            }

            /// The captured backtrace at the point the error was raised.
            #[must_use]
            pub fn backtrace(&self) -> &Backtrace {
                &self.backtrace
            }
        }
    };
}

structured_error!(ProtocolError, ProtocolErrorKind);
structured_error!(ConnectionError, ConnectionErrorKind);
structured_error!(TunnelingError, TunnelingErrorKind);
structured_error!(TransportError, TransportErrorKind);
structured_error!(AddressingError, AddressingErrorKind);
structured_error!(DptError, DptErrorKind);
structured_error!(CacheError, CacheErrorKind);

impl ProtocolError {
    /// Check if this is an invalid frame error
    pub fn is_invalid_frame(&self) -> bool {
        matches!(self.kind, ProtocolErrorKind::InvalidFrame)
    }

    /// Check if this is an unsupported version error
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self.kind, ProtocolErrorKind::UnsupportedVersion)
    }

    /// Check if a DIB scan hit a truncated payload
    pub fn is_truncated_dib(&self) -> bool {
        matches!(self.kind, ProtocolErrorKind::TruncatedDib)
    }
}

impl ConnectionError {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ConnectionErrorKind::Timeout)
    }

    /// Check if connection was refused
    pub fn is_refused(&self) -> bool {
        matches!(self.kind, ConnectionErrorKind::Refused)
    }

    /// Check if connection was lost
    pub fn is_lost(&self) -> bool {
        matches!(self.kind, ConnectionErrorKind::Lost)
    }
}

impl TunnelingError {
    /// Check if this is a sequence mismatch error
    pub fn is_sequence_mismatch(&self) -> bool {
        matches!(self.kind, TunnelingErrorKind::SequenceMismatch)
    }
}

impl TransportError {
    /// Check if buffer is too small
    pub fn is_buffer_too_small(&self) -> bool {
        matches!(self.kind, TransportErrorKind::BufferTooSmall)
    }

    /// Check if this is a socket error
    pub fn is_socket_error(&self) -> bool {
        matches!(self.kind, TransportErrorKind::SocketError)
    }
}

impl AddressingError {
    /// Check if address is out of range
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, AddressingErrorKind::OutOfRange)
    }
}

impl DptError {
    /// Check if value is out of range
    pub fn is_out_of_range(&self) -> bool {
        matches!(self.kind, DptErrorKind::ValueOutOfRange)
    }
}

impl CacheError {
    /// Check if the group address is unknown to the cache
    pub fn is_unknown_group_address(&self) -> bool {
        matches!(self.kind, CacheErrorKind::UnknownGroupAddress)
    }
}

// =============================================================================
// Convenience Constructors for KnxError
// =============================================================================

impl KnxError {
    // Protocol errors
    pub(crate) fn invalid_frame() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidFrame))
    }

    pub(crate) fn invalid_checksum() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidChecksum))
    }

    pub(crate) fn unsupported_version() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::UnsupportedVersion))
    }

    pub(crate) fn unsupported_service_type() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::UnsupportedServiceType))
    }

    pub(crate) fn payload_too_large() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::PayloadTooLarge))
    }

    pub(crate) fn truncated_dib() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::TruncatedDib))
    }

    pub(crate) fn unknown_assignment_method() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::UnknownAssignmentMethod))
    }

    pub(crate) fn missing_device_info_dib() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::MissingDeviceInfoDib))
    }

    // Connection errors
    pub(crate) fn connection_refused() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::Refused))
    }

    pub(crate) fn connection_timeout() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::Timeout))
    }

    pub(crate) fn connection_failed() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::Failed))
    }

    pub(crate) fn connection_lost() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::Lost))
    }

    pub(crate) fn not_connected() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::NotConnected))
    }

    pub(crate) fn channel_not_found() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::ChannelNotFound))
    }

    pub(crate) fn no_free_channels() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::NoFreeChannels))
    }

    pub(crate) fn already_connected() -> Self {
        Self::Connection(ConnectionError::new(ConnectionErrorKind::AlreadyConnected))
    }

    // Tunneling errors
    pub(crate) fn sequence_mismatch() -> Self {
        Self::Tunneling(TunnelingError::new(TunnelingErrorKind::SequenceMismatch))
    }

    pub(crate) fn tunneling_ack_failed() -> Self {
        Self::Tunneling(TunnelingError::new(TunnelingErrorKind::AckFailed))
    }

    // Transport errors
    pub(crate) fn buffer_too_small() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::BufferTooSmall))
    }

    pub(crate) fn socket_error() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::SocketError))
    }

    pub(crate) fn send_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::SendFailed))
    }

    pub(crate) fn receive_failed() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::ReceiveFailed))
    }

    pub(crate) fn not_bound() -> Self {
        Self::Transport(TransportError::new(TransportErrorKind::NotBound))
    }

    // Addressing errors
    pub(crate) fn invalid_group_address() -> Self {
        Self::Addressing(AddressingError::new(AddressingErrorKind::InvalidGroupAddress))
    }

    pub(crate) fn invalid_individual_address() -> Self {
        Self::Addressing(AddressingError::new(AddressingErrorKind::InvalidIndividualAddress))
    }

    pub(crate) fn address_out_of_range() -> Self {
        Self::Addressing(AddressingError::new(AddressingErrorKind::OutOfRange))
    }

    // DPT errors
    pub(crate) fn invalid_dpt_data() -> Self {
        Self::Dpt(DptError::new(DptErrorKind::InvalidData))
    }

    pub(crate) fn dpt_value_out_of_range() -> Self {
        Self::Dpt(DptError::new(DptErrorKind::ValueOutOfRange))
    }

    pub(crate) fn unsupported_dpt() -> Self {
        Self::Dpt(DptError::new(DptErrorKind::UnsupportedType))
    }

    // cEMI errors (Protocol category)
    pub(crate) fn invalid_message_code() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidMessageCode))
    }

    pub(crate) fn invalid_control_field() -> Self {
        Self::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidControlField))
    }

    // Cache / client-API errors
    pub(crate) fn unknown_group_address() -> Self {
        Self::Cache(CacheError::new(CacheErrorKind::UnknownGroupAddress))
    }

    pub(crate) fn already_configured() -> Self {
        Self::Cache(CacheError::new(CacheErrorKind::AlreadyConfigured))
    }
}

// =============================================================================
// Display Implementation
// =============================================================================

impl fmt::Display for KnxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnxError::Protocol(e) => write!(f, "protocol error: {:?}", e.kind),
            KnxError::Connection(e) => write!(f, "connection error: {:?}", e.kind),
            KnxError::Tunneling(e) => write!(f, "tunneling error: {:?}", e.kind),
            KnxError::Transport(e) => write!(f, "transport error: {:?}", e.kind),
            KnxError::Addressing(e) => write!(f, "addressing error: {:?}", e.kind),
            KnxError::Dpt(e) => write!(f, "datapoint error: {:?}", e.kind),
            KnxError::Cache(e) => write!(f, "cache error: {:?}", e.kind),
            KnxError::InvalidState => write!(f, "invalid state"),
            KnxError::UnsupportedOperation => write!(f, "unsupported operation"),
            KnxError::Timeout => write!(f, "operation timeout"),
        }
    }
}

impl std::error::Error for KnxError {}
