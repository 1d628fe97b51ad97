//! Per-attempt negotiation state
//!
//! One [`NegotiationContext`] exists per handshake attempt. It is shared
//! behind an `Arc` by the caller's handle and by every closure registered
//! with the event manager; ownership is strictly one-directional (closures
//! hold the context, never the reverse), so no cycle breaking is needed.
//!
//! Termination is the only mutation that matters: the protocol path, the
//! timeout timer, and an explicit cancel all race to [`terminate`], and a
//! compare-and-swap on the termination flag guarantees exactly one winner.
//! The winner deregisters the socket, deregisters and clears the timer, and
//! fires the user callback at most once.
//!
//! [`terminate`]: NegotiationContext::terminate

use crate::reactor::{EventManager, StreamSocket, TimerHandle};
use crate::socks::types::{Credentials, DetailedStatus, Endpoint, NegotiationStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// User callback delivered the terminal outcome, at most once per attempt
pub type NegotiationCallback = Box<dyn FnOnce(NegotiationStatus, DetailedStatus) + Send>;

/// Shared, mutable state of one negotiation attempt
pub struct NegotiationContext {
    destination: Endpoint,
    credentials: Credentials,
    timeout: Option<Duration>,
    socket: Arc<dyn StreamSocket>,
    event_manager: Arc<dyn EventManager>,
    callback: Mutex<Option<NegotiationCallback>>,
    timer: Mutex<Option<TimerHandle>>,
    started: AtomicBool,
    terminated: AtomicBool,
}

impl NegotiationContext {
    /// Create a context; pure construction, no I/O
    pub(crate) fn new(
        socket: Arc<dyn StreamSocket>,
        event_manager: Arc<dyn EventManager>,
        destination: Endpoint,
        credentials: Credentials,
        timeout: Option<Duration>,
        callback: NegotiationCallback,
    ) -> Self {
        NegotiationContext {
            destination,
            credentials,
            timeout,
            socket,
            event_manager,
            callback: Mutex::new(Some(callback)),
            timer: Mutex::new(None),
            started: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    /// Destination endpoint of the CONNECT request
    pub(crate) fn destination(&self) -> &Endpoint {
        &self.destination
    }

    /// Configured credentials (possibly none)
    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Configured timeout; `None` disables the timer
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The socket being negotiated over
    pub(crate) fn socket(&self) -> &dyn StreamSocket {
        &*self.socket
    }

    /// The event manager this attempt registers with
    pub(crate) fn event_manager(&self) -> &dyn EventManager {
        &*self.event_manager
    }

    /// Claim the one-time right to run the handshake
    ///
    /// Only the first caller wins; a repeated `start` on the same attempt
    /// must not re-send the method request or arm a second read interest
    /// or timer.
    pub(crate) fn begin(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether this attempt has already reached a terminal state
    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Record the timeout timer handle
    ///
    /// A displaced handle is disarmed so its timer task cannot outlive the
    /// store. A terminate racing ahead of this store would miss the timer,
    /// so if the flag is already set the timer is disarmed here instead.
    pub(crate) fn set_timer(&self, timer: TimerHandle) {
        if let Some(displaced) = self.lock_timer().replace(timer) {
            self.event_manager.deregister_timer(displaced);
        }
        if self.is_terminated() {
            if let Some(timer) = self.lock_timer().take() {
                self.event_manager.deregister_timer(timer);
            }
        }
    }

    /// Finalize this attempt exactly once
    ///
    /// The first caller to flip the termination flag deregisters the socket
    /// from the event manager, disarms the timer, and (unless suppressed)
    /// fires the user callback with `(status, detail)`. Later callers
    /// observe the flag and return `false` without side effects.
    pub(crate) fn terminate(
        &self,
        status: NegotiationStatus,
        detail: DetailedStatus,
        suppress_callback: bool,
    ) -> bool {
        if self
            .terminated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        debug!(
            destination = %self.destination,
            ?status,
            %detail,
            suppress_callback,
            "negotiation terminated"
        );

        self.event_manager.deregister_socket(self.socket.handle());

        if let Some(timer) = self.lock_timer().take() {
            self.event_manager.deregister_timer(timer);
        }

        if !suppress_callback {
            if let Some(callback) = self.take_callback() {
                callback(status, detail);
            }
        }
        true
    }

    fn take_callback(&self) -> Option<NegotiationCallback> {
        self.callback
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<TimerHandle>> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for NegotiationContext {
    // Safety net for contexts dropped mid-flight without ever terminating:
    // an armed timer must not outlive the attempt it guards.
    fn drop(&mut self) {
        if let Some(timer) = self.lock_timer().take() {
            self.event_manager.deregister_timer(timer);
        }
    }
}
