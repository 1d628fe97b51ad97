//! SOCKS5 client negotiation facade
//!
//! The public surface of the engine: build a [`Negotiation`] (pure
//! construction, no I/O), [`start`] it, and optionally [`cancel`] it from
//! any thread. The outcome arrives through the callback supplied at
//! construction, which fires at most once per attempt — or not at all if a
//! cancel wins the race.
//!
//! ```no_run
//! use sockshake::{Credentials, Endpoint, Negotiation, TokioEventManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> std::io::Result<()> {
//! let manager = Arc::new(TokioEventManager::new());
//! let stream = tokio::net::TcpStream::connect("proxy.example.com:1080").await?;
//! let socket = Arc::new(manager.attach(stream));
//!
//! let negotiation = Negotiation::builder(
//!     socket,
//!     manager,
//!     Endpoint::new("example.com", 443),
//!     |status, detail| println!("{:?}: {}", status, detail),
//! )
//! .credentials(Credentials::new("user", "secret"))
//! .timeout(Duration::from_secs(30))
//! .build();
//!
//! if let Err(err) = negotiation.start() {
//!     eprintln!("first send failed: {}", err);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`start`]: Negotiation::start
//! [`cancel`]: Negotiation::cancel

mod context;
mod driver;

pub use context::NegotiationCallback;

use crate::error::NegotiateError;
use crate::reactor::{EventManager, StreamSocket};
use crate::socks::types::{Credentials, DetailedStatus, Endpoint, NegotiationStatus};
use context::NegotiationContext;
use std::sync::Arc;
use std::time::Duration;

/// Builder for a [`Negotiation`]
///
/// Collects the optional timeout and credentials before the shared context
/// is frozen. Construction performs no I/O.
pub struct NegotiationBuilder {
    socket: Arc<dyn StreamSocket>,
    event_manager: Arc<dyn EventManager>,
    destination: Endpoint,
    callback: NegotiationCallback,
    credentials: Credentials,
    timeout: Option<Duration>,
}

impl NegotiationBuilder {
    /// Set the negotiation timeout; unset means no timer is registered
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the credentials to offer for username/password authentication
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Freeze the configuration into a startable handle
    pub fn build(self) -> Negotiation {
        Negotiation {
            ctx: Arc::new(NegotiationContext::new(
                self.socket,
                self.event_manager,
                self.destination,
                self.credentials,
                self.timeout,
                self.callback,
            )),
        }
    }
}

/// Handle to one SOCKS5 client negotiation attempt
///
/// Cloneable; all clones refer to the same attempt. The context stays alive
/// while any clone or any pending reactor closure still references it.
#[derive(Clone)]
pub struct Negotiation {
    ctx: Arc<NegotiationContext>,
}

impl Negotiation {
    /// Start building a negotiation over an already-connected socket
    pub fn builder<F>(
        socket: Arc<dyn StreamSocket>,
        event_manager: Arc<dyn EventManager>,
        destination: Endpoint,
        callback: F,
    ) -> NegotiationBuilder
    where
        F: FnOnce(NegotiationStatus, DetailedStatus) + Send + 'static,
    {
        NegotiationBuilder {
            socket,
            event_manager,
            destination,
            callback: Box::new(callback),
            credentials: Credentials::none(),
            timeout: None,
        }
    }

    /// Begin the handshake
    ///
    /// Sends the method request and arms the first read interest (and the
    /// timer, when a timeout is configured). Returns `Err` only when the
    /// very first write fails synchronously; that failure is *not* also
    /// delivered through the callback. Every later failure is delivered
    /// only through the callback. Calling `start` again on the same
    /// attempt, active or terminated, is a no-op returning `Ok`.
    pub fn start(&self) -> Result<(), NegotiateError> {
        driver::start(&self.ctx)
    }

    /// Cancel the attempt
    ///
    /// Idempotent. The user callback is suppressed; the socket and timer
    /// are deregistered if this cancel wins the termination race.
    pub fn cancel(&self) {
        self.ctx.terminate(
            NegotiationStatus::Error,
            DetailedStatus::new("canceled"),
            true,
        );
    }
}
