//! Tokio-backed event manager
//!
//! Implements the [`EventManager`] and [`StreamSocket`] collaborator
//! interfaces on top of the tokio runtime. Readiness interests become tasks
//! awaiting [`TcpStream::readable`], timers become [`sleep_until`] tasks,
//! and deregistration aborts the corresponding task.
//!
//! [`sleep_until`]: tokio::time::sleep_until

use super::{EventManager, ReadCallback, SocketHandle, StreamSocket, TimerCallback, TimerHandle};
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// Event manager running socket-readiness and timer tasks on tokio
///
/// Sockets are attached with [`attach`], which wraps a connected
/// [`TcpStream`] into a [`TokioStreamSocket`] and registers its identity.
/// All callbacks run on runtime worker threads; they must not block.
///
/// [`attach`]: TokioEventManager::attach
pub struct TokioEventManager {
    rt: Handle,
    next_id: AtomicU64,
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    streams: HashMap<SocketHandle, Arc<TcpStream>>,
    readers: HashMap<SocketHandle, JoinHandle<()>>,
    timers: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioEventManager {
    /// Create an event manager bound to the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime context.
    pub fn new() -> Self {
        TokioEventManager {
            rt: Handle::current(),
            next_id: AtomicU64::new(1),
            inner: Mutex::new(Registry::default()),
        }
    }

    /// Attach a connected stream, making it addressable by handle
    ///
    /// The stream must already be connected; this performs no I/O.
    pub fn attach(&self, stream: TcpStream) -> TokioStreamSocket {
        let handle = SocketHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let stream = Arc::new(stream);
        self.registry().streams.insert(handle, stream.clone());
        trace!(%handle, "stream attached");
        TokioStreamSocket { handle, stream }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TokioEventManager {
    fn default() -> Self {
        TokioEventManager::new()
    }
}

impl EventManager for TokioEventManager {
    fn register_read(&self, socket: SocketHandle, callback: ReadCallback) -> io::Result<()> {
        let stream = {
            let registry = self.registry();
            registry.streams.get(&socket).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} is not attached", socket))
            })?
        };

        // The registry lock is never held while awaiting or while running
        // the callback.
        let task = self.rt.spawn(async move {
            if stream.readable().await.is_ok() {
                callback();
            }
        });

        if let Some(previous) = self.registry().readers.insert(socket, task) {
            previous.abort();
        }
        Ok(())
    }

    fn deregister_read(&self, socket: SocketHandle) {
        if let Some(task) = self.registry().readers.remove(&socket) {
            task.abort();
        }
    }

    fn deregister_socket(&self, socket: SocketHandle) {
        let (stream, reader) = {
            let mut registry = self.registry();
            (
                registry.streams.remove(&socket),
                registry.readers.remove(&socket),
            )
        };
        if let Some(task) = reader {
            task.abort();
        }
        if stream.is_some() {
            trace!(%socket, "stream detached");
        }
    }

    fn register_timer(&self, deadline: Instant, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let task = self.rt.spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            callback();
        });
        self.registry().timers.insert(handle, task);
        handle
    }

    fn deregister_timer(&self, timer: TimerHandle) {
        if let Some(task) = self.registry().timers.remove(&timer) {
            task.abort();
        }
    }
}

/// A connected TCP stream attached to a [`TokioEventManager`]
///
/// Reads and writes are non-blocking (`try_read`/`try_write`); the engine
/// only reads after the manager has signaled readiness.
pub struct TokioStreamSocket {
    handle: SocketHandle,
    stream: Arc<TcpStream>,
}

impl StreamSocket for TokioStreamSocket {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    fn write(&self, buf: &[u8]) -> io::Result<usize> {
        self.stream.try_write(buf)
    }

    fn handle(&self) -> SocketHandle {
        self.handle
    }
}
