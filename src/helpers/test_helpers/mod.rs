use super::*;

use std::{
    any::Any,
    collections::{HashMap, VecDeque},
    io::{self, ErrorKind, Read, Write},
    net::SocketAddr,
    ops::Deref,
    sync::{
        atomic::{AtomicBool, Ordering::SeqCst},
        mpsc::{
            channel,
            RecvTimeoutError::{Disconnected, Timeout},
        },
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

mod attempt_any_to_string;
mod client_frames;
mod mock_filesystem;
mod provision_socket;
mod run_with_timeout;
mod test_certificate;
mod test_client;

pub use attempt_any_to_string::*;
pub use client_frames::*;
pub use mock_filesystem::*;
pub use mock_stream::*;
pub use provision_socket::*;
pub use run_with_timeout::*;
pub use test_certificate::*;
pub use test_client::*;
