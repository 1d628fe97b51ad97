//! Core value types for SOCKS5 negotiation
//!
//! Defines the destination endpoint, the optional proxy credentials, and the
//! status values delivered to the user callback.

use std::fmt;

/// Destination endpoint for a CONNECT request
///
/// An immutable hostname/port pair. The hostname may be a dotted-decimal
/// IPv4 literal or a domain name; which wire encoding is used is decided at
/// request-build time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    /// Get the hostname
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the port
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Username/password credentials for RFC 1929 authentication
///
/// An empty username means "no credentials offered": the method request will
/// then advertise only the no-authentication method. Both fields are raw
/// bytes and must each fit in 255 bytes to be encodable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: Vec<u8>,
    password: Vec<u8>,
}

impl Credentials {
    /// Create credentials from raw username and password bytes
    pub fn new(username: impl Into<Vec<u8>>, password: impl Into<Vec<u8>>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create empty credentials (nothing will be offered)
    pub fn none() -> Self {
        Credentials::default()
    }

    /// Whether credentials are offered (non-empty username)
    pub fn is_offered(&self) -> bool {
        !self.username.is_empty()
    }

    /// Get the username bytes
    pub fn username(&self) -> &[u8] {
        &self.username
    }

    /// Get the password bytes
    pub fn password(&self) -> &[u8] {
        &self.password
    }
}

// Passwords must never reach logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Terminal outcome of a negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStatus {
    /// The proxy granted the CONNECT request
    Success,
    /// The negotiation failed (protocol, transport, auth, refusal, timeout)
    Error,
}

/// Opaque human-readable explanation for a terminal outcome
///
/// Constructed by the engine, consumed by the caller's callback. The text is
/// meant for diagnostics and logs; it is not machine-parseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailedStatus(String);

impl DetailedStatus {
    /// Create a detailed status from a message
    pub fn new(message: impl Into<String>) -> Self {
        DetailedStatus(message.into())
    }

    /// Get the message text
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DetailedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
