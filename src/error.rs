//! Error types for Sockshake
//!
//! This module defines the error taxonomy for the negotiation engine. Every
//! terminal failure is eventually rendered into a [`DetailedStatus`] message
//! through these types' `Display` implementations.
//!
//! [`DetailedStatus`]: crate::socks::types::DetailedStatus

use crate::socks::consts::*;
use std::io;
use thiserror::Error;

/// Main error type for negotiation operations
#[derive(Error, Debug)]
pub enum NegotiateError {
    /// IO error on the underlying socket
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),

    /// Transport error (short read or short write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failure registering a callback with the event manager
    #[error("error registering read handler")]
    Registration,

    /// The proxy refused the CONNECT request
    #[error("{}", reply_message(*.0))]
    Refused(u8),

    /// The negotiation did not complete before the configured deadline
    #[error("timeout")]
    Timeout,
}

/// SOCKS5 protocol-level errors
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Response slice does not match the message's fixed wire length
    #[error("Bad message length: {actual} bytes, expected {expected}")]
    BadMessageLength {
        /// The fixed length the message must have
        expected: usize,
        /// The length actually supplied
        actual: usize,
    },

    /// Unsupported SOCKS version in a response
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Unsupported RFC 1929 sub-negotiation version
    #[error("Unsupported authentication version: {0}")]
    UnsupportedAuthVersion(u8),

    /// The proxy rejected every offered method (0xFF)
    #[error("proxy rejected all authentication methods")]
    NoAcceptableMethod,

    /// The proxy selected a method this engine never offered
    #[error("unknown response {0}")]
    UnknownMethod(u8),

    /// The proxy selected username/password but no credentials are configured
    #[error("proxy requires a password, but negotiation did not offer authentication")]
    AuthNotOffered,

    /// The proxy rejected the supplied username/password
    #[error("authentication rejected by proxy")]
    AuthRejected,

    /// Address type not supported in a response
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Domain name longer than 255 bytes
    #[error("Domain name too long: {0} bytes")]
    DomainTooLong(usize),

    /// Username or password longer than 255 bytes
    #[error("Credential field too long: {0} bytes")]
    CredentialTooLong(usize),
}

/// Reply codes for the SOCKS5 CONNECT response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Request granted
    Succeeded = SOCKS5_REPLY_SUCCEEDED,
    /// General SOCKS server failure
    GeneralFailure = SOCKS5_REPLY_GENERAL_FAILURE,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = SOCKS5_REPLY_CONNECTION_NOT_ALLOWED,
    /// Network unreachable
    NetworkUnreachable = SOCKS5_REPLY_NETWORK_UNREACHABLE,
    /// Host unreachable
    HostUnreachable = SOCKS5_REPLY_HOST_UNREACHABLE,
    /// Connection refused
    ConnectionRefused = SOCKS5_REPLY_CONNECTION_REFUSED,
    /// TTL expired
    TtlExpired = SOCKS5_REPLY_TTL_EXPIRED,
    /// Command not supported
    CommandNotSupported = SOCKS5_REPLY_COMMAND_NOT_SUPPORTED,
    /// Address type not supported
    AddressTypeNotSupported = SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED,
}

impl ReplyCode {
    /// Human-readable message for this reply code
    pub fn message(self) -> &'static str {
        match self {
            ReplyCode::Succeeded => "request granted",
            ReplyCode::GeneralFailure => "general failure",
            ReplyCode::ConnectionNotAllowed => "connection not allowed",
            ReplyCode::NetworkUnreachable => "network unreachable",
            ReplyCode::HostUnreachable => "host unreachable",
            ReplyCode::ConnectionRefused => "connection refused",
            ReplyCode::TtlExpired => "TTL expired",
            ReplyCode::CommandNotSupported => "command not supported",
            ReplyCode::AddressTypeNotSupported => "address type not supported",
        }
    }
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}

impl TryFrom<u8> for ReplyCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            SOCKS5_REPLY_SUCCEEDED => Ok(ReplyCode::Succeeded),
            SOCKS5_REPLY_GENERAL_FAILURE => Ok(ReplyCode::GeneralFailure),
            SOCKS5_REPLY_CONNECTION_NOT_ALLOWED => Ok(ReplyCode::ConnectionNotAllowed),
            SOCKS5_REPLY_NETWORK_UNREACHABLE => Ok(ReplyCode::NetworkUnreachable),
            SOCKS5_REPLY_HOST_UNREACHABLE => Ok(ReplyCode::HostUnreachable),
            SOCKS5_REPLY_CONNECTION_REFUSED => Ok(ReplyCode::ConnectionRefused),
            SOCKS5_REPLY_TTL_EXPIRED => Ok(ReplyCode::TtlExpired),
            SOCKS5_REPLY_COMMAND_NOT_SUPPORTED => Ok(ReplyCode::CommandNotSupported),
            SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED => Ok(ReplyCode::AddressTypeNotSupported),
            other => Err(other),
        }
    }
}

/// Map a raw REP byte to its human-readable message
///
/// Unassigned codes render as `unknown=<n>`.
pub fn reply_message(rep: u8) -> String {
    match ReplyCode::try_from(rep) {
        Ok(code) => code.message().to_string(),
        Err(other) => format!("unknown={}", other),
    }
}
