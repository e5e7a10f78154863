use super::*;
use slotmap::DenseSlotMap;

new_key_type! {
    pub struct ConnectionKey;
}

impl Display for ConnectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        format_slotmap_key(f, "connection", *self)
    }
}

/// Fixed-capacity registry of live connections. Keys are versioned, so a key held after its connection was
/// released never finds a newer connection that reused the slot.
pub struct ConnectionTable<S> {
    connections: DenseSlotMap<ConnectionKey, Connection<S>>,
    capacity: usize,
}

impl<S: ByteStream> ConnectionTable<S> {
    pub fn new(capacity: usize) -> Self {
        Self {
            connections: DenseSlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_full(&self) -> bool {
        self.connections.len() >= self.capacity
    }

    pub fn allocate(&mut self, connection: Connection<S>) -> Result<ConnectionKey, TableFull> {
        if self.is_full() {
            return Err(TableFull {
                capacity: self.capacity,
            });
        }
        Ok(self.connections.insert(connection))
    }

    pub fn lookup(&self, key: ConnectionKey) -> Option<&Connection<S>> {
        self.connections.get(key)
    }

    pub fn lookup_mut(&mut self, key: ConnectionKey) -> Option<&mut Connection<S>> {
        self.connections.get_mut(key)
    }

    pub fn release(&mut self, key: ConnectionKey) -> Option<Connection<S>> {
        self.connections.remove(key)
    }

    /// Keys of every connection matching the predicate. A linear scan, which is fine at this table size, and
    /// collecting keys lets the caller mutate connections while walking the result.
    pub fn keys_where<P>(&self, mut predicate: P) -> Vec<ConnectionKey>
    where
        P: FnMut(&Connection<S>) -> bool,
    {
        self.connections
            .iter()
            .filter(|(_, connection)| predicate(connection))
            .map(|(key, _)| key)
            .collect()
    }
}
