//! The record emitted for one handled connection.
//!
//! A reception is deliberately small: the remote address, the bytes of the
//! single bounded read, and how that read went. The payload is kept as raw
//! `Bytes` so that non-UTF-8 input survives until the moment it is printed.

use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::net::SocketAddr;

/// How the single read on a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The read returned `n > 0` bytes.
    Data(usize),

    /// The client closed the connection without sending anything.
    Empty,

    /// The read failed. The payload is empty.
    Failed(io::ErrorKind),
}

/// What one connection delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    /// Address of the client that sent the payload
    pub remote: SocketAddr,

    /// At most one buffer's worth of bytes
    pub payload: Bytes,

    /// Result of the read that produced `payload`
    pub outcome: ReadOutcome,
}

impl Reception {
    /// Creates a reception from a successful read.
    ///
    /// An empty payload is recorded as [`ReadOutcome::Empty`].
    pub fn data(remote: SocketAddr, payload: Bytes) -> Self {
        let outcome = if payload.is_empty() {
            ReadOutcome::Empty
        } else {
            ReadOutcome::Data(payload.len())
        };

        Self {
            remote,
            payload,
            outcome,
        }
    }

    /// Creates a reception for a read that failed.
    pub fn failed(remote: SocketAddr, kind: io::ErrorKind) -> Self {
        Self {
            remote,
            payload: Bytes::new(),
            outcome: ReadOutcome::Failed(kind),
        }
    }

    /// Decodes the payload as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Returns true if nothing was received.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Returns true if the read filled a buffer of `capacity` bytes, meaning
    /// the client may have sent more than was kept.
    pub fn filled(&self, capacity: usize) -> bool {
        capacity > 0 && self.payload.len() >= capacity
    }
}

/// Renders the remote address line followed by the payload text.
impl fmt::Display for Reception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.remote, self.text())
    }
}
