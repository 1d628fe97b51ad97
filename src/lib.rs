//! # Sockshake - SOCKS5 Client Negotiation Engine
//!
//! Sockshake drives the client side of a SOCKS5 handshake (RFC 1928 method
//! negotiation, optional RFC 1929 username/password authentication, and the
//! CONNECT request) over an already-connected byte stream, asynchronously
//! against a reactor-style event manager, with an optional timeout and
//! explicit cancellation.
//!
//! ## Features
//!
//! - **Pure construction**: building a negotiation performs no I/O
//! - **Reactor-driven**: every suspension point arms exactly one read
//!   interest (and optionally one timer) and returns
//! - **Exactly-once termination**: completion, timeout, and cancel race
//!   through an atomic compare-and-swap; the callback fires at most once
//! - **Pluggable collaborators**: the event manager and socket are traits;
//!   a tokio-backed implementation is bundled
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockshake::{Endpoint, Negotiation, TokioEventManager};
//! use std::sync::Arc;
//!
//! let manager = Arc::new(TokioEventManager::new());
//! let socket = Arc::new(manager.attach(stream));
//! let negotiation = Negotiation::builder(
//!     socket,
//!     manager,
//!     Endpoint::new("example.com", 443),
//!     |status, detail| println!("{:?}: {}", status, detail),
//! )
//! .build();
//! negotiation.start()?;
//! ```
//!
//! ## Scope
//!
//! Client side only: no SOCKS5 server, no BIND or UDP ASSOCIATE, no GSSAPI.
//! Establishing the TCP connection to the proxy is the caller's job.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod negotiator;
pub mod reactor;
pub mod socks;

// Re-export commonly used items
pub use error::{reply_message, NegotiateError, ReplyCode, Socks5Error};
pub use negotiator::{Negotiation, NegotiationBuilder};
pub use reactor::{EventManager, SocketHandle, StreamSocket, TimerHandle};
pub use reactor::{TokioEventManager, TokioStreamSocket};
pub use socks::types::{Credentials, DetailedStatus, Endpoint, NegotiationStatus};

/// Version of the Sockshake library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the library
pub const NAME: &str = env!("CARGO_PKG_NAME");
