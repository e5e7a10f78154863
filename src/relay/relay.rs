use super::*;

/// Per-process limits, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayLimits {
    /// Capacity of the connection table
    pub max_clients: usize,
    /// Receive buffer capacity of each connection
    pub buffer_capacity: usize,
    /// How much unsent data a connection may have queued before it is dropped as a slow consumer
    pub max_outbound: usize,
}

impl Default for RelayLimits {
    fn default() -> Self {
        Self {
            max_clients: 256,
            buffer_capacity: 16 * 1024,
            max_outbound: 1024 * 1024,
        }
    }
}

/// Owns the connection table and runs the per-connection protocol. Driven by readiness notifications from
/// the outside; never blocks. Streams of connections that have been torn down pile up until the owner takes
/// them with take_released(), so it can deregister them from whatever is producing readiness events.
pub struct Relay<S> {
    table: ConnectionTable<S>,
    limits: RelayLimits,
    released: Vec<S>,
}

impl<S: ByteStream> Relay<S> {
    pub fn new(limits: RelayLimits) -> Self {
        Self {
            table: ConnectionTable::new(limits.max_clients),
            limits,
            released: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }

    pub fn connection_count(&self) -> usize {
        self.table.len()
    }

    pub fn connection(&self, key: ConnectionKey) -> Option<&Connection<S>> {
        self.table.lookup(key)
    }

    /// Registers a newly accepted stream. When the table is full the stream is shut down and dropped
    /// without creating any state.
    pub fn accept(&mut self, mut stream: S) -> Result<ConnectionKey, TableFull> {
        if self.table.is_full() {
            stream.shutdown();
            return Err(TableFull {
                capacity: self.table.capacity(),
            });
        }
        self.table
            .allocate(Connection::new(stream, &self.limits))
    }

    /// Upgraded connections in the room, including any that just joined
    pub fn peer_count(&self, room: &str) -> usize {
        self.room_members(room).len()
    }

    fn room_members(&self, room: &str) -> Vec<ConnectionKey> {
        self.table
            .keys_where(|connection| connection.is_upgraded() && connection.room() == room)
    }

    /// Reads everything the stream has, processing complete requests and frames as they arrive
    pub fn handle_readable(&mut self, key: ConnectionKey) {
        if let Err(e) = self.read_and_process(key) {
            self.close(key, e);
        }
    }

    /// Sends whatever is queued for the connection
    pub fn handle_writable(&mut self, key: ConnectionKey) {
        let result = match self.table.lookup_mut(key) {
            Some(connection) => connection.flush(),
            None => return,
        };
        if let Err(e) = result {
            self.close(key, e);
        }
    }

    /// Tears a connection down: releases its slot, shuts its stream down, and tells the room if it had
    /// joined one. Does nothing for a key that is already gone.
    pub fn close(&mut self, key: ConnectionKey, reason: ConnectionError) {
        let connection = match self.table.release(key) {
            Some(connection) => connection,
            None => return,
        };
        match reason {
            ConnectionError::Closed => debug!("{} closed by peer", key),
            ref e => warn!("closing {}: {}", key, e),
        }
        let left_room = if connection.is_upgraded() {
            Some(connection.room().to_string())
        } else {
            None
        };
        self.released.push(connection.into_stream());
        if let Some(room) = left_room {
            info!("{} left room {:?}", key, room);
            self.broadcast(None, &room, &PresenceMessage::Leave.to_frame());
        }
    }

    /// Streams of every connection closed since the last call
    pub fn take_released(&mut self) -> Vec<S> {
        std::mem::take(&mut self.released)
    }

    fn read_and_process(&mut self, key: ConnectionKey) -> Result<(), ConnectionError> {
        loop {
            let connection = match self.table.lookup_mut(key) {
                Some(connection) => connection,
                None => return Ok(()),
            };
            match connection.read_available()? {
                ReadOutcome::WouldBlock => return Ok(()),
                ReadOutcome::Received(_) => self.process_buffered(key)?,
            }
        }
    }

    /// Consumes as many complete units (the upgrade request, then frames) as the buffer holds
    fn process_buffered(&mut self, key: ConnectionKey) -> Result<(), ConnectionError> {
        loop {
            let connection = match self.table.lookup_mut(key) {
                Some(connection) => connection,
                None => return Ok(()),
            };
            match connection.state() {
                ConnectionState::Connecting => return Ok(()),
                ConnectionState::AwaitingHandshake => match connection.take_request_head() {
                    Some(head) => self.complete_handshake(key, &head)?,
                    None => return Ok(()),
                },
                ConnectionState::Upgraded => match connection.next_frame()? {
                    Some(inbound) => self.relay_frame(key, inbound)?,
                    None => return Ok(()),
                },
            }
        }
    }

    fn complete_handshake(&mut self, key: ConnectionKey, head: &[u8]) -> Result<(), ConnectionError> {
        let request = parse_upgrade_request(head)?;
        let response = upgrade_response(&accept_token(&request.key));
        let room = request.room;
        {
            let connection = self
                .table
                .lookup_mut(key)
                .ok_or(ConnectionError::Closed)?;
            connection.send(response.as_bytes())?;
            connection.upgrade(room.clone());
        }
        let count = self.peer_count(&room);
        info!("{} joined room {:?} ({} peers)", key, room, count);
        if let Some(connection) = self.table.lookup_mut(key) {
            connection.send(&PresenceMessage::Peers(count).to_frame())?;
        }
        self.broadcast(Some(key), &room, &PresenceMessage::Join.to_frame());
        Ok(())
    }

    fn relay_frame(&mut self, key: ConnectionKey, inbound: InboundFrame) -> Result<(), ConnectionError> {
        match inbound.opcode {
            frame::OPCODE_CLOSE => return Err(ConnectionError::Closed),
            frame::OPCODE_PING | frame::OPCODE_PONG => {
                debug!("ignoring control frame {:#x} from {}", inbound.opcode, key);
                return Ok(());
            }
            _ => (),
        }
        let room = match self.table.lookup(key) {
            Some(connection) => connection.room().to_string(),
            None => return Ok(()),
        };
        trace!(
            "relaying {} byte frame from {} to room {:?}",
            inbound.payload.len(),
            key,
            room
        );
        let bytes = frame::encode(inbound.fin, inbound.opcode, &inbound.payload, None);
        self.broadcast(Some(key), &room, &bytes);
        Ok(())
    }

    /// Best-effort delivery to every upgraded member of the room except the sender. A destination that
    /// fails is closed after everyone else has been served.
    fn broadcast(&mut self, sender: Option<ConnectionKey>, room: &str, bytes: &[u8]) {
        let mut failed = Vec::new();
        for member in self.room_members(room) {
            if Some(member) == sender {
                continue;
            }
            if let Some(connection) = self.table.lookup_mut(member) {
                if let Err(e) = connection.send(bytes) {
                    failed.push((member, e));
                }
            }
        }
        for (member, e) in failed {
            self.close(member, e);
        }
    }
}
