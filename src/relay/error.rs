use super::*;

/// Why a connection is being torn down. Every variant is local to a single connection.
#[derive(Debug)]
pub enum ConnectionError {
    /// The peer closed the stream or sent a close frame
    Closed,
    /// Reading from or writing to the stream failed with something other than WouldBlock
    Transport(io::Error),
    /// The peer sent something that is not a valid upgrade request or frame
    Protocol(String),
    /// The receive buffer filled up before a complete request or frame arrived
    BufferOverflow { capacity: usize },
    /// The peer stopped reading and its outbound queue grew past the limit
    SlowConsumer { queued: usize },
}

impl ConnectionError {
    pub fn protocol<T: Into<String>>(message: T) -> Self {
        ConnectionError::Protocol(message.into())
    }
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionError::Closed => write!(f, "closed by peer"),
            ConnectionError::Transport(e) => write!(f, "transport error: {}", e),
            ConnectionError::Protocol(message) => write!(f, "protocol error: {}", message),
            ConnectionError::BufferOverflow { capacity } => {
                write!(f, "receive buffer of {} bytes overflowed", capacity)
            }
            ConnectionError::SlowConsumer { queued } => {
                write!(f, "peer is not reading, {} bytes queued", queued)
            }
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConnectionError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConnectionError {
    fn from(e: io::Error) -> Self {
        ConnectionError::Transport(e)
    }
}

/// The connection table has no free slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFull {
    pub capacity: usize,
}

impl Display for TableFull {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection table is full ({} connections)", self.capacity)
    }
}

impl Error for TableFull {}
