//! Listener Loop
//!
//! Binds one address and services connections strictly one at a time:
//!
//! ```text
//! bind ──> ┌─────────────────────────────────────────────────────────┐
//!          │ loop                                                    │
//!          │   accept ──ok──> print addr ──> one read ──> print data │
//!          │     │                                                   │
//!          │     └──err──> log, back off, continue                   │
//!          └─────────────────────────────────────────────────────────┘
//!                  │ shutdown future resolves
//!                  ▼
//!          listener dropped, socket closed
//! ```
//!
//! Handling is awaited inline, never spawned, so a client that connects and
//! stays silent holds up every client queued behind it. There are no
//! timeouts. Its address is printed as soon as it is accepted, so the
//! stalled client can be identified.

use crate::connection::{handle, Connection, ConnectionStats};
use crate::listener::{Accept, AcceptBackoff, BackoffConfig};
use crate::output::{Reception, Sink};
use crate::DEFAULT_BUFFER_CAPACITY;
use std::future::{poll_fn, Future};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Errors raised by the listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The address is invalid, cannot be resolved, or is already in use.
    /// Fatal: the process reports it and stops.
    #[error("failed to bind {addr}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A single accept call failed. The loop logs it and keeps going.
    #[error("failed to accept connection")]
    Accept(#[source] io::Error),
}

impl ListenerError {
    /// Returns the underlying I/O error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            ListenerError::Bind { source, .. } => source,
            ListenerError::Accept(source) => source,
        }
    }
}

/// A bound listener that services one connection at a time.
///
/// The listening socket is owned here and closed when the listener is
/// dropped; [`Listener::run_until`] consumes the listener so that happens on
/// every exit path.
#[derive(Debug)]
pub struct Listener<A = TcpListener> {
    inner: A,
    local_addr: SocketAddr,
    capacity: usize,
    backoff: BackoffConfig,
    stats: Arc<ConnectionStats>,
}

impl Listener {
    /// Binds and listens on `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Bind`] if the address is invalid or already
    /// in use. No retry is attempted.
    pub async fn bind(addr: &str) -> Result<Self, ListenerError> {
        let bind_err = |source| ListenerError::Bind {
            addr: addr.to_string(),
            source,
        };

        let inner = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;

        info!(address = %local_addr, "Listening");

        Ok(Self::from_acceptor(inner, local_addr))
    }
}

impl<A: Accept> Listener<A> {
    /// Wraps an already listening accept source bound to `local_addr`.
    pub fn from_acceptor(acceptor: A, local_addr: SocketAddr) -> Self {
        Self {
            inner: acceptor,
            local_addr,
            capacity: DEFAULT_BUFFER_CAPACITY,
            backoff: BackoffConfig::default(),
            stats: Arc::new(ConnectionStats::new()),
        }
    }

    /// Sets how many bytes the single read per connection may return.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the pause schedule used after failed accepts.
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the address actually bound (useful after binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the shared counters.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Waits for the next client.
    pub async fn accept_next(&self) -> Result<Connection<A::Stream>, ListenerError> {
        match poll_fn(|cx| Accept::poll_accept(&self.inner, cx)).await {
            Ok((stream, remote)) => {
                self.stats.connection_accepted();
                debug!(client = %remote, "Accepted connection");
                Ok(Connection::new(stream, remote))
            }
            Err(e) => {
                self.stats.accept_failed();
                Err(ListenerError::Accept(e))
            }
        }
    }

    /// Reports the client, reads once from `connection`, emits the result
    /// and closes it.
    pub async fn handle<K>(&self, connection: Connection<A::Stream>, sink: &mut K) -> Reception
    where
        K: Sink + ?Sized,
    {
        handle(connection, self.capacity, sink, &self.stats).await
    }

    /// Runs the loop forever.
    pub async fn run<K: Sink>(self, sink: K) {
        self.run_until(sink, std::future::pending()).await
    }

    /// Runs the loop until `shutdown` resolves.
    ///
    /// A connection being read when `shutdown` resolves is dropped; its
    /// address has already been reported, its payload is not. The listening
    /// socket is closed before this returns.
    pub async fn run_until<K, F>(self, mut sink: K, shutdown: F)
    where
        K: Sink,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut backoff = AcceptBackoff::new(self.backoff.clone());

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, closing listener");
                    break;
                }
                _ = self.step(&mut sink, &mut backoff) => {}
            }
        }

        info!(address = %self.local_addr, "Listener closed");
    }

    /// One iteration: accept and handle, or back off after a failed accept.
    async fn step<K: Sink>(&self, sink: &mut K, backoff: &mut AcceptBackoff) {
        match self.accept_next().await {
            Ok(connection) => {
                backoff.record_success();
                self.handle(connection, sink).await;
            }
            Err(e) => {
                let delay = backoff.record_failure();
                if backoff.should_escalate() {
                    error!(
                        error = %e.io_error(),
                        consecutive_failures = backoff.consecutive_failures(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Accept keeps failing"
                    );
                } else {
                    warn!(
                        error = %e.io_error(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Accept failed, continuing"
                    );
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}
