//! Session protocol over TCP.
//!
//! - [`frames`]: Fixed-size wire frames.
//! - [`session`]: Per-game actor that relays and validates moves.
//! - [`server`]: Accept loop pairing players into sessions.
//! - [`registry`]: Directory of live sessions for status reporting.
//! - [`client`]: Peer side of the protocol.

pub mod client;
pub mod frames;
pub mod registry;
pub mod server;
pub mod session;

pub use client::PeerClient;
pub use frames::{ProtocolError, Update};
pub use registry::{SessionId, SessionRegistry, SessionState};
pub use server::serve;
pub use session::{spawn_session, SessionEnd};
