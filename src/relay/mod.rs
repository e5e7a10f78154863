//! The transport-agnostic half of the signaling relay: connection bookkeeping, the WebSocket handshake and
//! frame codec, and room fan-out. Everything here works on any ByteStream, so it can be driven by the mio
//! event loop in production and by in-memory mock streams in tests.

use super::*;

mod connection;
mod connection_table;
mod error;
pub mod frame;
mod handshake;
mod message;
#[allow(clippy::module_inception)]
mod relay;
mod stream;

pub use connection::{Connection, ConnectionState, InboundFrame, ReadOutcome};
pub use connection_table::{ConnectionKey, ConnectionTable};
pub use error::{ConnectionError, TableFull};
pub use handshake::{accept_token, find_request_end, parse_upgrade_request, upgrade_response};
#[cfg(test)]
pub use handshake::ROOM_CAPACITY;
pub use message::PresenceMessage;
pub use relay::{Relay, RelayLimits};
pub use stream::ByteStream;

use std::{
    fmt::{Debug, Display, Formatter},
    io::{self, ErrorKind},
};
