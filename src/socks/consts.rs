//! SOCKS5 protocol constants
//!
//! Defines all constants used by the client-side SOCKS5 negotiation.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

/// SOCKS5 username/password sub-negotiation version (RFC 1929)
pub const SOCKS5_AUTH_VERSION: u8 = 0x01;

// Authentication methods
/// No authentication required
pub const SOCKS5_AUTH_METHOD_NONE: u8 = 0x00;
/// Username/password authentication
pub const SOCKS5_AUTH_METHOD_PASSWORD: u8 = 0x02;
/// No acceptable methods
pub const SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Commands
/// TCP CONNECT command (the only command this engine issues)
pub const SOCKS5_CMD_TCP_CONNECT: u8 = 0x01;

// Address types
/// IPv4 address
pub const SOCKS5_ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const SOCKS5_ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const SOCKS5_ADDR_TYPE_IPV6: u8 = 0x04;

// Reply codes
/// Succeeded
pub const SOCKS5_REPLY_SUCCEEDED: u8 = 0x00;
/// General SOCKS server failure
pub const SOCKS5_REPLY_GENERAL_FAILURE: u8 = 0x01;
/// Connection not allowed by ruleset
pub const SOCKS5_REPLY_CONNECTION_NOT_ALLOWED: u8 = 0x02;
/// Network unreachable
pub const SOCKS5_REPLY_NETWORK_UNREACHABLE: u8 = 0x03;
/// Host unreachable
pub const SOCKS5_REPLY_HOST_UNREACHABLE: u8 = 0x04;
/// Connection refused
pub const SOCKS5_REPLY_CONNECTION_REFUSED: u8 = 0x05;
/// TTL expired
pub const SOCKS5_REPLY_TTL_EXPIRED: u8 = 0x06;
/// Command not supported
pub const SOCKS5_REPLY_COMMAND_NOT_SUPPORTED: u8 = 0x07;
/// Address type not supported
pub const SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED: u8 = 0x08;

// Reserved byte
/// Reserved byte value (always 0x00)
pub const SOCKS5_RESERVED: u8 = 0x00;

// Field limits
/// Maximum domain name length in a CONNECT request
pub const MAX_DOMAIN_LEN: usize = 255;
/// Maximum username or password length in an RFC 1929 auth request
pub const MAX_CREDENTIAL_LEN: usize = 255;

// Fixed message lengths
/// Length of a method-selection response
pub const METHOD_RESPONSE_LEN: usize = 2;
/// Length of an RFC 1929 auth response
pub const AUTH_RESPONSE_LEN: usize = 2;
/// Length of the CONNECT response header (VER, REP, RSV, ATYP)
pub const CONNECT_RESPONSE_HEADER_LEN: usize = 4;
/// Length of an IPv4 bound address
pub const IPV4_ADDR_LEN: usize = 4;
/// Length of an IPv6 bound address
pub const IPV6_ADDR_LEN: usize = 16;
/// Length of the bound port field
pub const PORT_LEN: usize = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks5_versions() {
        assert_eq!(SOCKS5_VERSION, 5);
        assert_eq!(SOCKS5_AUTH_VERSION, 1);
    }

    #[test]
    fn test_auth_methods() {
        assert_eq!(SOCKS5_AUTH_METHOD_NONE, 0);
        assert_eq!(SOCKS5_AUTH_METHOD_PASSWORD, 2);
        assert_eq!(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE, 255);
    }

    #[test]
    fn test_address_types() {
        assert_eq!(SOCKS5_ADDR_TYPE_IPV4, 1);
        assert_eq!(SOCKS5_ADDR_TYPE_DOMAIN, 3);
        assert_eq!(SOCKS5_ADDR_TYPE_IPV6, 4);
    }

    #[test]
    fn test_reply_codes() {
        assert_eq!(SOCKS5_REPLY_SUCCEEDED, 0);
        assert_eq!(SOCKS5_REPLY_CONNECTION_REFUSED, 5);
        assert_eq!(SOCKS5_REPLY_ADDRESS_TYPE_NOT_SUPPORTED, 8);
    }

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(METHOD_RESPONSE_LEN, 2);
        assert_eq!(AUTH_RESPONSE_LEN, 2);
        assert_eq!(CONNECT_RESPONSE_HEADER_LEN, 4);
        assert_eq!(IPV4_ADDR_LEN + PORT_LEN, 6);
        assert_eq!(IPV6_ADDR_LEN + PORT_LEN, 18);
    }
}
