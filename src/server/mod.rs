//! The OS-facing half: sockets, TLS and the readiness loop that drives the relay

use super::*;

mod acceptor;
mod event_loop;
mod plain_stream;
mod quit_handle;
mod server_config;
mod tls_config;
mod tls_stream;

pub use acceptor::{Acceptor, TransportStream};
pub use event_loop::EventLoop;
pub use quit_handle::QuitHandle;
pub use server_config::{server_config_entries, ServerConfig, TlsConfig};
pub use tls_config::load_tls_config;

use config::ConfigEntry;
use plain_stream::PlainStream;
use relay::{ByteStream, ConnectionError, ConnectionKey, Relay, RelayLimits};
use std::{
    fmt::{Debug, Formatter},
    io::{self, ErrorKind, Read, Write},
    net::{Shutdown, SocketAddr},
    sync::{
        atomic::{AtomicBool, Ordering::SeqCst},
        Arc,
    },
};
use tls_stream::TlsStream;
