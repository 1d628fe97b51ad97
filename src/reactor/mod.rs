//! Reactor collaborator interfaces
//!
//! The negotiation engine never owns an event loop. It drives an external
//! reactor through the two traits defined here: a byte-stream socket with
//! non-blocking read/write, and an event manager that delivers socket
//! readiness and timer expiry. [`TokioEventManager`] is the bundled
//! production implementation; tests supply deterministic mocks.
//!
//! Readiness callbacks are one-shot: each `register_read` arms exactly one
//! delivery, and the caller re-registers for more. At most one read interest
//! and one timer may be outstanding per negotiation at any instant.
//!
//! [`TokioEventManager`]: runtime::TokioEventManager

pub mod runtime;

pub use runtime::{TokioEventManager, TokioStreamSocket};

use std::fmt;
use std::io;
use std::time::Instant;

/// Opaque identity of a registered socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(pub u64);

impl fmt::Display for SocketHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "socket#{}", self.0)
    }
}

/// Opaque identity of a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Callback invoked when a registered socket becomes readable
pub type ReadCallback = Box<dyn FnOnce() + Send>;

/// Callback invoked when a registered timer expires
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// Byte-stream socket abstraction
///
/// The TCP connection to the proxy is established before negotiation starts;
/// this trait only exposes the already-connected stream. Implementations
/// must be non-blocking: a `read` or `write` returns however many bytes were
/// immediately transferable. The engine treats any count short of what it
/// asked for as a terminal transport error; it never accumulates partial
/// reads.
pub trait StreamSocket: Send + Sync {
    /// Read up to `buf.len()` bytes, returning the count actually read
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write up to `buf.len()` bytes, returning the count actually written
    fn write(&self, buf: &[u8]) -> io::Result<usize>;

    /// Identity of this socket within its event manager
    fn handle(&self) -> SocketHandle;
}

/// Reactor-style event manager
///
/// Delivers socket-readiness and timer-expiry notifications, potentially on
/// different threads. Deregistering an unknown handle is a no-op, so racing
/// deregistrations are harmless.
pub trait EventManager: Send + Sync {
    /// Arm a one-shot readiness callback for `socket`
    ///
    /// Replaces any previously armed read interest for the same socket.
    fn register_read(&self, socket: SocketHandle, callback: ReadCallback) -> io::Result<()>;

    /// Disarm the pending read interest for `socket`, if any
    fn deregister_read(&self, socket: SocketHandle);

    /// Forget `socket` entirely, disarming any pending read interest
    fn deregister_socket(&self, socket: SocketHandle);

    /// Arm a one-shot timer firing at `deadline`
    fn register_timer(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle;

    /// Disarm a pending timer, if it has not fired yet
    fn deregister_timer(&self, timer: TimerHandle);
}
