//! Listener Module
//!
//! The single component of the service: a bound TCP endpoint and the serial
//! loop that accepts one client, reads from it once and moves on.
//!
//! ## Example
//!
//! ```no_run
//! use tapline::listener::Listener;
//! use tapline::output::StdoutSink;
//!
//! # async fn demo() -> Result<(), tapline::listener::ListenerError> {
//! let listener = Listener::bind("127.0.0.1:8080").await?;
//! listener.run(StdoutSink::stdout()).await;
//! # Ok(())
//! # }
//! ```

pub mod accept;
pub mod backoff;
pub mod server;

pub use accept::Accept;
pub use backoff::{AcceptBackoff, BackoffConfig};
pub use server::{Listener, ListenerError};
