//! # tapline - a serial, receive-only TCP listener
//!
//! tapline binds one TCP address and services clients strictly one at a
//! time. For each accepted connection it performs a single bounded read,
//! reports the client's address together with the decoded text, and closes
//! the connection before accepting the next one. Nothing is written back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            tapline                               │
//! │                                                                  │
//! │  ┌─────────────┐  Connection  ┌─────────────┐  Reception  ┌─────┐ │
//! │  │  Listener   │─────────────>│   handle    │────────────>│Sink │ │
//! │  │  (accept)   │              │ (one read)  │             │     │ │
//! │  └──────┬──────┘              └─────────────┘             └─────┘ │
//! │         │ accept error                                           │
//! │         ▼                                                        │
//! │  ┌─────────────┐                                                 │
//! │  │AcceptBackoff│  log, pause, continue                           │
//! │  └─────────────┘                                                 │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use tapline::{Listener, StdoutSink};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = Listener::bind("127.0.0.1:8080").await?;
//!     listener.run(StdoutSink::stdout()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Behaviour
//!
//! - **Bind failure is fatal**: [`ListenerError::Bind`] is returned, no retry.
//! - **Accept failure is not**: logged, followed by a growing pause, then the
//!   loop continues.
//! - **Read failure is empty input**: the client is reported with no text.
//! - **Bounded read**: at most [`DEFAULT_BUFFER_CAPACITY`] bytes by default;
//!   anything beyond is dropped with the connection.
//! - **Serial**: a silent client blocks everyone behind it. There are no
//!   timeouts.
//!
//! ## Module Overview
//!
//! - [`listener`]: the bound socket, the accept loop and accept backoff
//! - [`connection`]: accepted connections, the bounded read, counters
//! - [`output`]: the reception record and output sinks
//! - [`config`]: command-line configuration

pub mod config;
pub mod connection;
pub mod listener;
pub mod output;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, Invocation};
pub use connection::{handle, read_bounded, Connection, ConnectionStats};
pub use listener::{Accept, AcceptBackoff, BackoffConfig, Listener, ListenerError};
pub use output::{ChannelSink, ReadOutcome, Reception, Sink, StdoutSink, WriterSink};

/// The default port tapline listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host tapline binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Bytes read from each connection unless configured otherwise
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Version of tapline
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
