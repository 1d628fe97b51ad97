//! Test utilities and mocks for Sockshake
//!
//! Provides a deterministic event manager, a scripted socket, and a callback
//! recorder so negotiation scenarios can be driven step by step without real
//! I/O or timers.

use sockshake::socks::consts::*;
use sockshake::{
    Credentials, DetailedStatus, Endpoint, EventManager, Negotiation, NegotiationStatus,
    SocketHandle, StreamSocket, TimerHandle,
};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type ReadCallback = Box<dyn FnOnce() + Send>;
type TimerCallback = Box<dyn FnOnce() + Send>;

/// Event manager whose readiness and timer events are fired manually
#[derive(Default)]
pub struct MockEventManager {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    read_callbacks: HashMap<SocketHandle, ReadCallback>,
    timer_callbacks: HashMap<TimerHandle, TimerCallback>,
    next_timer: u64,
    fail_register_read: bool,
    read_registrations: usize,
    read_deregistrations: usize,
    socket_deregistrations: usize,
    timer_deregistrations: usize,
}

impl MockEventManager {
    pub fn new() -> Arc<Self> {
        Arc::new(MockEventManager::default())
    }

    /// Make every subsequent `register_read` fail
    pub fn fail_register_read(&self) {
        self.inner.lock().unwrap().fail_register_read = true;
    }

    /// Deliver the pending readiness event for `socket`, if any
    ///
    /// The callback runs without the registry lock held, exactly like a
    /// reactor thread would run it.
    pub fn fire_read(&self, socket: SocketHandle) -> bool {
        let callback = self.inner.lock().unwrap().read_callbacks.remove(&socket);
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Deliver the first pending timer event, if any
    pub fn fire_timer(&self) -> bool {
        let callback = {
            let mut inner = self.inner.lock().unwrap();
            let key = inner.timer_callbacks.keys().next().copied();
            key.and_then(|key| inner.timer_callbacks.remove(&key))
        };
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    pub fn has_pending_read(&self, socket: SocketHandle) -> bool {
        self.inner.lock().unwrap().read_callbacks.contains_key(&socket)
    }

    pub fn has_pending_timer(&self) -> bool {
        !self.inner.lock().unwrap().timer_callbacks.is_empty()
    }

    pub fn read_registrations(&self) -> usize {
        self.inner.lock().unwrap().read_registrations
    }

    pub fn read_deregistrations(&self) -> usize {
        self.inner.lock().unwrap().read_deregistrations
    }

    pub fn socket_deregistrations(&self) -> usize {
        self.inner.lock().unwrap().socket_deregistrations
    }

    pub fn timer_deregistrations(&self) -> usize {
        self.inner.lock().unwrap().timer_deregistrations
    }
}

impl EventManager for MockEventManager {
    fn register_read(
        &self,
        socket: SocketHandle,
        callback: Box<dyn FnOnce() + Send>,
    ) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_register_read {
            return Err(io::Error::new(io::ErrorKind::Other, "registration refused"));
        }
        inner.read_registrations += 1;
        inner.read_callbacks.insert(socket, callback);
        Ok(())
    }

    fn deregister_read(&self, socket: SocketHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.read_deregistrations += 1;
        inner.read_callbacks.remove(&socket);
    }

    fn deregister_socket(&self, socket: SocketHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.socket_deregistrations += 1;
        inner.read_callbacks.remove(&socket);
    }

    fn register_timer(
        &self,
        _deadline: Instant,
        callback: Box<dyn FnOnce() + Send>,
    ) -> TimerHandle {
        let mut inner = self.inner.lock().unwrap();
        inner.next_timer += 1;
        let handle = TimerHandle(inner.next_timer);
        inner.timer_callbacks.insert(handle, callback);
        handle
    }

    fn deregister_timer(&self, timer: TimerHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.timer_deregistrations += 1;
        inner.timer_callbacks.remove(&timer);
    }
}

/// Socket serving scripted response bytes and recording written bytes
pub struct ScriptedSocket {
    handle: SocketHandle,
    incoming: Mutex<Vec<u8>>,
    written: Mutex<Vec<u8>>,
    write_error: Mutex<Option<io::ErrorKind>>,
    write_cap: Mutex<Option<usize>>,
}

impl ScriptedSocket {
    pub fn new(handle: SocketHandle) -> Arc<Self> {
        Arc::new(ScriptedSocket {
            handle,
            incoming: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            write_error: Mutex::new(None),
            write_cap: Mutex::new(None),
        })
    }

    /// Queue bytes the next reads will serve
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.incoming.lock().unwrap().extend_from_slice(bytes);
    }

    /// All bytes written so far
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    /// Drain and return the bytes written so far
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut *self.written.lock().unwrap())
    }

    /// Make every subsequent write fail with the given kind
    pub fn fail_writes(&self, kind: io::ErrorKind) {
        *self.write_error.lock().unwrap() = Some(kind);
    }

    /// Cap every subsequent write to at most `cap` bytes (forces short writes)
    pub fn cap_writes(&self, cap: usize) {
        *self.write_cap.lock().unwrap() = Some(cap);
    }
}

impl StreamSocket for ScriptedSocket {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut incoming = self.incoming.lock().unwrap();
        let n = buf.len().min(incoming.len());
        buf[..n].copy_from_slice(&incoming[..n]);
        incoming.drain(..n);
        Ok(n)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = *self.write_error.lock().unwrap() {
            return Err(io::Error::new(kind, "scripted write failure"));
        }
        let n = match *self.write_cap.lock().unwrap() {
            Some(cap) => buf.len().min(cap),
            None => buf.len(),
        };
        self.written.lock().unwrap().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn handle(&self) -> SocketHandle {
        self.handle
    }
}

/// Records every callback invocation for later assertions
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(NegotiationStatus, String)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    /// A callback that appends its arguments to this recorder
    pub fn callback(&self) -> impl FnOnce(NegotiationStatus, DetailedStatus) + Send + 'static {
        let calls = self.calls.clone();
        move |status, detail| {
            calls
                .lock()
                .unwrap()
                .push((status, detail.message().to_string()));
        }
    }

    pub fn calls(&self) -> Vec<(NegotiationStatus, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Assemble a negotiation over the mock collaborators
pub fn build_negotiation(
    socket: &Arc<ScriptedSocket>,
    manager: &Arc<MockEventManager>,
    destination: Endpoint,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    recorder: &Recorder,
) -> Negotiation {
    let mut builder = Negotiation::builder(
        socket.clone() as Arc<dyn StreamSocket>,
        manager.clone() as Arc<dyn EventManager>,
        destination,
        recorder.callback(),
    );
    if let Some(credentials) = credentials {
        builder = builder.credentials(credentials);
    }
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Server method-selection response
pub fn method_response(method: u8) -> Vec<u8> {
    vec![SOCKS5_VERSION, method]
}

/// Server RFC 1929 auth response
pub fn auth_response(status: u8) -> Vec<u8> {
    vec![SOCKS5_AUTH_VERSION, status]
}

/// Server CONNECT response with an IPv4 bound address
pub fn connect_response(rep: u8) -> Vec<u8> {
    vec![
        SOCKS5_VERSION,
        rep,
        SOCKS5_RESERVED,
        SOCKS5_ADDR_TYPE_IPV4,
        0,
        0,
        0,
        0,
        0,
        0,
    ]
}
