//! Output Module
//!
//! Everything a handled connection produces ends up here. A [`Sink`] hears
//! about each client twice: once when it is accepted (its address), and once
//! when its single bounded read has finished (a [`Reception`]: the address
//! plus whatever the read returned).
//!
//! ```text
//!   handle(connection)
//!          │        accepted(addr)   ┌──────────────────────────┐
//!          ├────────────────────────>│ Sink                     │
//!          ▼                         │  WriterSink  (stdout)    │
//!   ┌─────────────┐     emit()       │  ChannelSink (mpsc)      │
//!   │  Reception  │─────────────────>│                          │
//!   │ addr + data │                  └──────────────────────────┘
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tapline::output::{Reception, Sink, WriterSink};
//! use bytes::Bytes;
//!
//! let remote = "127.0.0.1:50000".parse().unwrap();
//! let mut sink = WriterSink::new(Vec::new());
//! sink.accepted(remote).unwrap();
//! sink.emit(&Reception::data(remote, Bytes::from("hello"))).unwrap();
//! assert_eq!(sink.into_inner(), b"127.0.0.1:50000\nhello\n");
//! ```

pub mod reception;
pub mod sink;

pub use reception::{ReadOutcome, Reception};
pub use sink::{ChannelSink, Sink, StdoutSink, WriterSink};
