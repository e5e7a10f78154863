use super::*;

/// Where a connection is in its lifecycle. Closed connections are removed from the table, so there is no
/// Closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, transport handshake (TLS) still in progress
    Connecting,
    /// Transport is up, accumulating the HTTP upgrade request
    AwaitingHandshake,
    /// Relaying frames
    Upgraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Received(usize),
    WouldBlock,
}

/// One fully received frame with its payload already unmasked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub fin: bool,
    pub opcode: u8,
    pub payload: Vec<u8>,
}

/// A single client: its stream, protocol state, room, and both directions of buffering. The receive buffer
/// never grows past buffer_capacity and the outbound queue never grows past max_outbound.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    state: ConnectionState,
    room: String,
    inbound: Vec<u8>,
    buffer_capacity: usize,
    /// Bytes accepted for sending that the stream has not taken yet
    outbound: Vec<u8>,
    max_outbound: usize,
}

impl<S: ByteStream> Connection<S> {
    pub fn new(stream: S, limits: &RelayLimits) -> Self {
        let state = if stream.is_handshaking() {
            ConnectionState::Connecting
        } else {
            ConnectionState::AwaitingHandshake
        };
        Self {
            stream,
            state,
            room: String::new(),
            inbound: Vec::new(),
            buffer_capacity: limits.buffer_capacity,
            outbound: Vec::new(),
            max_outbound: limits.max_outbound,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_upgraded(&self) -> bool {
        self.state == ConnectionState::Upgraded
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    #[cfg(test)]
    pub fn buffered_len(&self) -> usize {
        self.inbound.len()
    }

    #[cfg(test)]
    pub fn queued_len(&self) -> usize {
        self.outbound.len()
    }

    /// Reads once into the free part of the receive buffer. A full buffer means the peer sent more than we
    /// are willing to hold before it makes sense, so that is an error rather than a reason to stop reading.
    pub fn read_available(&mut self) -> Result<ReadOutcome, ConnectionError> {
        let filled = self.inbound.len();
        if filled >= self.buffer_capacity {
            return Err(ConnectionError::BufferOverflow {
                capacity: self.buffer_capacity,
            });
        }
        self.inbound.resize(self.buffer_capacity, 0);
        let result = loop {
            match self.stream.read(&mut self.inbound[filled..]) {
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                result => break result,
            }
        };
        let outcome = match result {
            Ok(0) => {
                self.inbound.truncate(filled);
                return Err(ConnectionError::Closed);
            }
            Ok(len) => {
                self.inbound.truncate(filled + len);
                ReadOutcome::Received(len)
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                self.inbound.truncate(filled);
                ReadOutcome::WouldBlock
            }
            Err(e) => {
                self.inbound.truncate(filled);
                return Err(ConnectionError::Transport(e));
            }
        };
        if self.state == ConnectionState::Connecting && !self.stream.is_handshaking() {
            self.state = ConnectionState::AwaitingHandshake;
        }
        Ok(outcome)
    }

    /// Removes and returns the request head once the blank line that ends it has arrived. Anything after the
    /// head stays buffered.
    pub fn take_request_head(&mut self) -> Option<Vec<u8>> {
        let end = find_request_end(&self.inbound)?;
        Some(self.inbound.drain(..end).collect())
    }

    /// Removes and returns the next complete frame, unmasked
    pub fn next_frame(&mut self) -> Result<Option<InboundFrame>, ConnectionError> {
        let descriptor = match frame::parse(&self.inbound) {
            frame::Parsed::Complete(descriptor) => descriptor,
            frame::Parsed::Incomplete => return Ok(None),
            frame::Parsed::Invalid(reason) => return Err(ConnectionError::protocol(reason)),
        };
        let payload = &mut self.inbound[descriptor.payload_range()];
        if let Some(mask_key) = descriptor.mask_key {
            frame::apply_mask(payload, mask_key);
        }
        let frame = InboundFrame {
            fin: descriptor.fin,
            opcode: descriptor.opcode,
            payload: payload.to_vec(),
        };
        self.inbound.drain(..descriptor.total_len);
        Ok(Some(frame))
    }

    /// Moves to the upgraded state. The room is fixed from here on.
    pub fn upgrade(&mut self, room: String) {
        debug_assert!(!self.is_upgraded(), "connection upgraded twice");
        self.room = room;
        self.state = ConnectionState::Upgraded;
    }

    /// Queues data behind anything already waiting and sends as much as the stream will take right now
    pub fn send(&mut self, data: &[u8]) -> Result<(), ConnectionError> {
        let queued = self.outbound.len() + data.len();
        if queued > self.max_outbound {
            return Err(ConnectionError::SlowConsumer { queued });
        }
        self.outbound.extend_from_slice(data);
        self.flush()
    }

    /// Sends queued data until the queue is empty or the stream would block
    pub fn flush(&mut self) -> Result<(), ConnectionError> {
        while !self.outbound.is_empty() {
            match self.stream.write(&self.outbound) {
                Ok(0) => break,
                Ok(len) => {
                    self.outbound.drain(..len);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => return Err(ConnectionError::Transport(e)),
            }
        }
        match self.stream.flush_pending() {
            Ok(_) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(()),
            Err(e) => Err(ConnectionError::Transport(e)),
        }
    }

    /// Shuts the stream down and hands it back so the owner can release the transport
    pub fn into_stream(mut self) -> S {
        self.stream.shutdown();
        self.stream
    }
}
