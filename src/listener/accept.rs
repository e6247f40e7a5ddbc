//! Source of accepted connections.
//!
//! The accept loop only needs "give me the next stream and its peer". That
//! is [`Accept`], implemented for tokio's `TcpListener`. Anything else that
//! implements it (an in-memory script of streams and failures, for
//! instance) can drive the same loop.

use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;
use tokio::net::{TcpListener, TcpStream};

/// Yields accepted streams together with the peer's address.
pub trait Accept {
    type Stream: AsyncRead + Unpin;

    /// Polls for the next connection. Must be cancel safe: dropping a
    /// pending accept loses no connection.
    fn poll_accept(&self, cx: &mut Context<'_>)
        -> Poll<io::Result<(Self::Stream, SocketAddr)>>;
}

impl Accept for TcpListener {
    type Stream = TcpStream;

    fn poll_accept(&self, cx: &mut Context<'_>) -> Poll<io::Result<(TcpStream, SocketAddr)>> {
        TcpListener::poll_accept(self, cx)
    }
}
