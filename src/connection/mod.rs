//! Connection Module
//!
//! This module handles individual client connections. A connection lives
//! for exactly one bounded read: it is accepted, read once, reported and
//! then dropped, which closes the socket.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Listener Loop                           │
//! │                   (listener::server)                        │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ accept()
//!                        ▼
//!           ┌────────────────────────┐
//!           │      Connection        │
//!           │  (stream + remote)     │
//!           └────────────┬───────────┘
//!                        │
//!                        │ handle()  (awaited inline, never spawned)
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │  │ One bounded  │───>│  Reception   │───>│  Sink::emit  │   │
//! │  │ read (≤ cap) │    │ addr + bytes │    │              │   │
//! │  └──────────────┘    └──────────────┘    └──────────────┘   │
//! │                                                             │
//! │  connection dropped here: socket closed exactly once        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is written back to the client.

pub mod handler;

pub use handler::{handle, read_bounded, Connection, ConnectionStats};
