//! Output sinks.
//!
//! The listener never prints directly. It hands every [`Reception`] to a
//! [`Sink`], which keeps the accept loop testable and lets an embedder route
//! receptions somewhere other than the console.

use crate::output::Reception;
use std::io::{self, Write};
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Destination for receptions.
///
/// Errors returned by either method are logged by the caller and never stop
/// the accept loop.
pub trait Sink {
    /// Called as soon as a client is accepted, before its read starts.
    fn accepted(&mut self, remote: SocketAddr) -> io::Result<()> {
        let _ = remote;
        Ok(())
    }

    /// Called once the single read on a connection has finished.
    fn emit(&mut self, reception: &Reception) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn accepted(&mut self, remote: SocketAddr) -> io::Result<()> {
        (**self).accepted(remote)
    }

    fn emit(&mut self, reception: &Reception) -> io::Result<()> {
        (**self).emit(reception)
    }
}

/// Writes the remote address line on accept, then the payload text line once
/// the read finishes.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

/// The sink the binary uses.
pub type StdoutSink = WriterSink<io::Stdout>;

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn accepted(&mut self, remote: SocketAddr) -> io::Result<()> {
        writeln!(self.writer, "{}", remote)?;
        self.writer.flush()
    }

    fn emit(&mut self, reception: &Reception) -> io::Result<()> {
        writeln!(self.writer, "{}", reception.text())?;
        self.writer.flush()
    }
}

/// Forwards receptions over an unbounded channel.
///
/// Only finished receptions are forwarded; each one carries its remote
/// address. Useful when the receptions are consumed by another task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Reception>,
}

impl ChannelSink {
    /// Creates a sink together with the receiving half of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Reception>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Sink for ChannelSink {
    fn emit(&mut self, reception: &Reception) -> io::Result<()> {
        self.tx
            .send(reception.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "reception receiver dropped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn reception(payload: &'static str) -> Reception {
        Reception::data(peer(), Bytes::from(payload))
    }

    fn peer() -> SocketAddr {
        "10.0.0.7:51234".parse().unwrap()
    }

    #[test]
    fn test_writer_sink_prints_addr_then_payload() {
        let mut sink = WriterSink::new(Vec::new());
        sink.accepted(peer()).unwrap();
        sink.emit(&reception("hello")).unwrap();
        assert_eq!(sink.into_inner(), b"10.0.0.7:51234\nhello\n");
    }

    #[test]
    fn test_writer_sink_prints_addr_on_accept() {
        let mut sink = WriterSink::new(Vec::new());
        sink.accepted(peer()).unwrap();
        // Nothing read yet, but the client is already visible
        assert_eq!(sink.into_inner(), b"10.0.0.7:51234\n");
    }

    #[test]
    fn test_writer_sink_empty_payload() {
        let mut sink = WriterSink::new(Vec::new());
        sink.accepted(peer()).unwrap();
        sink.emit(&reception("")).unwrap();
        assert_eq!(sink.into_inner(), b"10.0.0.7:51234\n\n");
    }

    #[test]
    fn test_writer_sink_through_mut_ref() {
        fn emit_both<K: Sink>(mut sink: K) {
            sink.accepted(peer()).unwrap();
            sink.emit(&reception("a")).unwrap();
            sink.accepted(peer()).unwrap();
            sink.emit(&reception("b")).unwrap();
        }

        let mut sink = WriterSink::new(Vec::new());
        emit_both(&mut sink);
        assert_eq!(sink.into_inner(), b"10.0.0.7:51234\na\n10.0.0.7:51234\nb\n");
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (mut sink, mut rx) = ChannelSink::new();
        sink.accepted(peer()).unwrap();
        assert!(rx.try_recv().is_err());
        sink.emit(&reception("hello")).unwrap();
        assert_eq!(rx.try_recv().unwrap().text(), "hello");
    }

    #[test]
    fn test_channel_sink_closed_receiver() {
        let (mut sink, rx) = ChannelSink::new();
        drop(rx);
        let err = sink.emit(&reception("lost")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
