//! SOCKS5 wire codec
//!
//! Pure build/parse functions for the five messages exchanged during a
//! client-side SOCKS5 negotiation (RFC 1928 method selection and CONNECT,
//! RFC 1929 username/password sub-negotiation). No I/O happens here; the
//! driver feeds these functions the exact byte counts it read.

use super::consts::*;
use super::types::{Credentials, Endpoint};
use crate::error::Socks5Error;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::Ipv4Addr;

/// Build a method request
///
/// Offers only the no-authentication method when no credentials are
/// configured, and no-authentication plus username/password otherwise.
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
pub fn build_method_request(credentials: &Credentials) -> Bytes {
    let mut buf = BytesMut::with_capacity(4);
    buf.put_u8(SOCKS5_VERSION);
    if credentials.is_offered() {
        buf.put_u8(2);
        buf.put_u8(SOCKS5_AUTH_METHOD_NONE);
        buf.put_u8(SOCKS5_AUTH_METHOD_PASSWORD);
    } else {
        buf.put_u8(1);
        buf.put_u8(SOCKS5_AUTH_METHOD_NONE);
    }
    buf.freeze()
}

/// Parse a method-selection response, returning the selected method byte
///
/// The response is exactly 2 bytes: `VER, METHOD`. `VER` must be 5.
pub fn parse_method_response(buf: &[u8]) -> Result<u8, Socks5Error> {
    check_len(buf, METHOD_RESPONSE_LEN)?;
    if buf[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(buf[0]));
    }
    Ok(buf[1])
}

/// Build an RFC 1929 username/password request
///
/// ```text
/// +----+------+----------+------+----------+
/// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
/// +----+------+----------+------+----------+
/// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
/// +----+------+----------+------+----------+
/// ```
///
/// Fails if either field does not fit in the 1-byte length prefix.
pub fn build_auth_request(credentials: &Credentials) -> Result<Bytes, Socks5Error> {
    let username = credentials.username();
    let password = credentials.password();
    if username.len() > MAX_CREDENTIAL_LEN {
        return Err(Socks5Error::CredentialTooLong(username.len()));
    }
    if password.len() > MAX_CREDENTIAL_LEN {
        return Err(Socks5Error::CredentialTooLong(password.len()));
    }

    let mut buf = BytesMut::with_capacity(3 + username.len() + password.len());
    buf.put_u8(SOCKS5_AUTH_VERSION);
    buf.put_u8(username.len() as u8);
    buf.put_slice(username);
    buf.put_u8(password.len() as u8);
    buf.put_slice(password);
    Ok(buf.freeze())
}

/// Parse an RFC 1929 auth response, returning the status byte
///
/// The response is exactly 2 bytes: `VER, STATUS`. A nonzero status means
/// the proxy rejected the credentials; mapping that to an error is the
/// driver's job.
pub fn parse_auth_response(buf: &[u8]) -> Result<u8, Socks5Error> {
    check_len(buf, AUTH_RESPONSE_LEN)?;
    if buf[0] != SOCKS5_AUTH_VERSION {
        return Err(Socks5Error::UnsupportedAuthVersion(buf[0]));
    }
    Ok(buf[1])
}

/// Build a CONNECT request for the given destination
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// A hostname that is syntactically a dotted-decimal IPv4 literal is encoded
/// as ATYP=1 with the 4 raw octets; anything else is sent as a
/// length-prefixed domain name (ATYP=3). Outgoing IPv6 literals are not
/// supported.
pub fn build_connect_request(destination: &Endpoint) -> Result<Bytes, Socks5Error> {
    let mut buf = BytesMut::with_capacity(7 + destination.host().len());
    buf.put_u8(SOCKS5_VERSION);
    buf.put_u8(SOCKS5_CMD_TCP_CONNECT);
    buf.put_u8(SOCKS5_RESERVED);

    if let Ok(ipv4) = destination.host().parse::<Ipv4Addr>() {
        buf.put_u8(SOCKS5_ADDR_TYPE_IPV4);
        buf.put_slice(&ipv4.octets());
    } else {
        let domain = destination.host().as_bytes();
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(Socks5Error::DomainTooLong(domain.len()));
        }
        buf.put_u8(SOCKS5_ADDR_TYPE_DOMAIN);
        buf.put_u8(domain.len() as u8);
        buf.put_slice(domain);
    }

    buf.put_u16(destination.port());
    Ok(buf.freeze())
}

/// Parse a CONNECT response header, returning `(REP, ATYP)`
///
/// The header is exactly 4 bytes: `VER, REP, RSV, ATYP`. `VER` must be 5 and
/// `ATYP` must be one of the three assigned address types. The bound address
/// and port that follow are the driver's to consume; their length comes from
/// [`bound_address_len`].
pub fn parse_connect_response_header(buf: &[u8]) -> Result<(u8, u8), Socks5Error> {
    check_len(buf, CONNECT_RESPONSE_HEADER_LEN)?;
    if buf[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(buf[0]));
    }
    let atyp = buf[3];
    match atyp {
        SOCKS5_ADDR_TYPE_IPV4 | SOCKS5_ADDR_TYPE_DOMAIN | SOCKS5_ADDR_TYPE_IPV6 => {}
        other => return Err(Socks5Error::AddressTypeNotSupported(other)),
    }
    Ok((buf[1], atyp))
}

fn check_len(buf: &[u8], expected: usize) -> Result<(), Socks5Error> {
    if buf.len() != expected {
        return Err(Socks5Error::BadMessageLength {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Fixed bound-address length for an ATYP, or `None` for length-prefixed
/// domain names
pub fn bound_address_len(atyp: u8) -> Result<Option<usize>, Socks5Error> {
    match atyp {
        SOCKS5_ADDR_TYPE_IPV4 => Ok(Some(IPV4_ADDR_LEN)),
        SOCKS5_ADDR_TYPE_IPV6 => Ok(Some(IPV6_ADDR_LEN)),
        SOCKS5_ADDR_TYPE_DOMAIN => Ok(None),
        other => Err(Socks5Error::AddressTypeNotSupported(other)),
    }
}
