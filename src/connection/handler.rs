//! Connection Handler
//!
//! One accepted socket, one read. Anything the client sends beyond the
//! buffer capacity is never read; it is discarded when the socket closes.
//!
//! Read failures are not errors from the caller's point of view: a failed
//! read produces an empty reception, exactly like a client that connected
//! and left without sending anything.

use crate::output::{Reception, Sink};
use bytes::{Bytes, BytesMut};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Counters for the listener and the connections it handles
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Connections whose single read has completed and been reported
    pub connections_handled: AtomicU64,
    /// Failed accept calls
    pub accept_failures: AtomicU64,
    /// Reads that returned an error
    pub read_failures: AtomicU64,
    /// Reads that returned zero bytes
    pub empty_reads: AtomicU64,
    /// Reads that filled the whole buffer
    pub filled_reads: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_accepted(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_handled(&self) {
        self.connections_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accept_failed(&self) {
        self.accept_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_failed(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn empty_read(&self) {
        self.empty_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn filled_read(&self) {
        self.filled_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// An accepted client connection.
///
/// The connection owns its stream. [`handle`] consumes it, so the stream is
/// closed when handling returns, whichever way the read went.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    /// The byte stream for this connection
    stream: S,

    /// Client's address (for logging and output)
    remote: SocketAddr,
}

impl<S> Connection<S> {
    pub fn new(stream: S, remote: SocketAddr) -> Self {
        Self { stream, remote }
    }

    /// Returns the client's address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}

/// Performs exactly one read of at most `capacity` bytes.
///
/// Returns an empty `Bytes` when the peer has closed the stream. Bytes the
/// peer sent beyond `capacity` are left unread.
pub async fn read_bounded<R>(reader: &mut R, capacity: usize) -> io::Result<Bytes>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(capacity);
    let n = reader.read(&mut buf[..]).await?;
    buf.truncate(n);
    Ok(buf.freeze())
}

/// Handles a client connection.
///
/// Reports the client to `sink` before reading, so a client that never
/// sends anything is still visible. Then reads once, reports the result and
/// drops the connection. Never fails: read errors become an empty reception
/// and sink errors are logged. The returned reception is the one that was
/// emitted.
///
/// # Arguments
///
/// * `connection` - The accepted connection, consumed and closed on return
/// * `capacity` - Maximum number of bytes to read
/// * `sink` - Where the reception is emitted
/// * `stats` - Shared counters
pub async fn handle<S, K>(
    connection: Connection<S>,
    capacity: usize,
    sink: &mut K,
    stats: &ConnectionStats,
) -> Reception
where
    S: AsyncRead + Unpin,
    K: Sink + ?Sized,
{
    let remote = connection.remote_addr();
    if let Err(e) = sink.accepted(remote) {
        warn!(client = %remote, error = %e, "Failed to report accepted client");
    }

    let Connection { mut stream, .. } = connection;

    let reception = match read_bounded(&mut stream, capacity).await {
        Ok(payload) => {
            let reception = Reception::data(remote, payload);
            if reception.is_empty() {
                stats.empty_read();
                debug!(client = %remote, "Client sent no data");
            } else {
                stats.bytes_read(reception.payload.len());
                if reception.filled(capacity) {
                    stats.filled_read();
                    debug!(
                        client = %remote,
                        capacity = capacity,
                        "Buffer filled, any remaining bytes are dropped"
                    );
                }
                info!(client = %remote, bytes = reception.payload.len(), "Received payload");
            }
            reception
        }
        Err(e) => {
            stats.read_failed();
            debug!(client = %remote, error = %e, "Read failed, treating as empty");
            Reception::failed(remote, e.kind())
        }
    };

    // The socket is closed before the sink runs.
    drop(stream);
    trace!(client = %remote, "Connection closed");

    stats.connection_handled();

    if let Err(e) = sink.emit(&reception) {
        warn!(client = %remote, error = %e, "Failed to emit reception");
    }

    reception
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{ReadOutcome, WriterSink};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    fn remote() -> SocketAddr {
        "127.0.0.1:45678".parse().unwrap()
    }

    #[tokio::test]
    async fn test_read_bounded_returns_data() {
        let mut mock = Builder::new().read(b"hello").build();
        let payload = read_bounded(&mut mock, 1024).await.unwrap();
        assert_eq!(&payload[..], b"hello");
    }

    #[tokio::test]
    async fn test_read_bounded_eof_is_empty() {
        let mut input: &[u8] = b"";
        let payload = read_bounded(&mut input, 1024).await.unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_read_bounded_truncates_at_capacity() {
        let data: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();
        let mut input: &[u8] = &data;

        let payload = read_bounded(&mut input, 1024).await.unwrap();

        assert_eq!(payload.len(), 1024);
        assert_eq!(&payload[..], &data[..1024]);
        // The rest was never consumed
        assert_eq!(input.len(), 976);
    }

    #[tokio::test]
    async fn test_read_bounded_propagates_error() {
        let mut mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let err = read_bounded(&mut mock, 1024).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_handle_emits_addr_and_payload() {
        let stats = ConnectionStats::new();
        let mut sink = WriterSink::new(Vec::new());
        let connection = Connection::new(Builder::new().read(b"hello").build(), remote());

        let reception = handle(connection, 1024, &mut sink, &stats).await;

        assert_eq!(reception.outcome, ReadOutcome::Data(5));
        assert_eq!(sink.into_inner(), b"127.0.0.1:45678\nhello\n");
        assert_eq!(stats.connections_handled.load(Ordering::Relaxed), 1);
        assert_eq!(stats.bytes_read.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_handle_read_error_is_empty() {
        let stats = ConnectionStats::new();
        let mut sink = WriterSink::new(Vec::new());
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let reception = handle(Connection::new(mock, remote()), 1024, &mut sink, &stats).await;

        assert!(reception.is_empty());
        assert_eq!(
            reception.outcome,
            ReadOutcome::Failed(io::ErrorKind::ConnectionReset)
        );
        assert_eq!(sink.into_inner(), b"127.0.0.1:45678\n\n");
        assert_eq!(stats.read_failures.load(Ordering::Relaxed), 1);
        assert_eq!(stats.connections_handled.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_handle_counts_empty_and_filled_reads() {
        let stats = ConnectionStats::new();
        let mut sink = WriterSink::new(Vec::new());

        let empty: &[u8] = b"";
        handle(Connection::new(empty, remote()), 4, &mut sink, &stats).await;

        let full: &[u8] = b"abcdefgh";
        let reception = handle(Connection::new(full, remote()), 4, &mut sink, &stats).await;

        assert_eq!(reception.text(), "abcd");
        assert_eq!(stats.empty_reads.load(Ordering::Relaxed), 1);
        assert_eq!(stats.filled_reads.load(Ordering::Relaxed), 1);
        assert_eq!(stats.connections_handled.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_handle_closes_tcp_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        let (stream, peer) = listener.accept().await.unwrap();

        client.write_all(b"ping").await.unwrap();

        let stats = ConnectionStats::new();
        let mut sink = WriterSink::new(Vec::new());
        let reception = handle(Connection::new(stream, peer), 1024, &mut sink, &stats).await;
        assert_eq!(reception.text(), "ping");
        assert_eq!(reception.remote, client.local_addr().unwrap());

        // Server side is closed, so the client reads EOF and no response bytes
        let mut buf = [0u8; 16];
        let n = tokio::time::timeout(
            tokio::time::Duration::from_secs(2),
            client.read(&mut buf),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(n, 0);
    }
}
