//! SOCKS5 protocol support
//!
//! Wire-level building blocks for the client-side negotiation: protocol
//! constants, value types, and the pure message codec.

pub mod codec;
pub mod consts;
pub mod types;

pub use types::{Credentials, DetailedStatus, Endpoint, NegotiationStatus};
