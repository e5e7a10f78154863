use super::*;
use mio::{
    net::{TcpListener, TcpStream},
    Events, Poll, PollOpt, Ready, Registration, Token,
};
use slotmap::{Key, KeyData};
use std::time::Duration;

#[cfg(not(target_pointer_width = "64"))]
compile_error!("connection tokens carry a whole slotmap key, which needs a 64 bit usize");

const LISTENER: Token = Token(0);
const QUIT: Token = Token(1);
const EVENTS_CAPACITY: usize = 1024;
/// How long to wait before accepting again after accept itself failed (out of file descriptors, for example)
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Occupied slotmap keys always have an odd version in the high half, so they never collide with LISTENER or
/// QUIT.
fn connection_token(key: ConnectionKey) -> Token {
    Token(key.data().as_ffi() as usize)
}

fn token_connection(token: Token) -> ConnectionKey {
    KeyData::from_ffi(token.0 as u64).into()
}

/// Single-threaded readiness loop: accepts connections, routes readiness to the relay, and deregisters whatever
/// the relay has closed.
pub struct EventLoop {
    poll: Poll,
    listener: TcpListener,
    acceptor: Acceptor,
    relay: Relay<TransportStream>,
    should_quit: Arc<AtomicBool>,
    /// The listener is edge triggered, so a failed accept gets no new event for connections left in the backlog
    accept_retry_pending: bool,
    /// Kept alive so the quit handle can wake the poll
    _quit_registration: Registration,
    quit_handle: QuitHandle,
}

impl EventLoop {
    /// Binds the listening socket. Fails if the address is in use or otherwise unavailable.
    pub fn bind(config: &ServerConfig, acceptor: Acceptor) -> Result<Self, Box<dyn Error>> {
        let addr = config.socket_addr();
        let listener =
            TcpListener::bind(&addr).map_err(|e| format!("failed to listen on {}: {}", addr, e))?;
        let poll = Poll::new()?;
        poll.register(&listener, LISTENER, Ready::readable(), PollOpt::edge())?;
        let (quit_registration, set_readiness) = Registration::new2();
        poll.register(&quit_registration, QUIT, Ready::readable(), PollOpt::edge())?;
        let should_quit = Arc::new(AtomicBool::new(false));
        let event_loop = Self {
            poll,
            listener,
            acceptor,
            relay: Relay::new(config.limits.clone()),
            quit_handle: QuitHandle::new(should_quit.clone(), set_readiness),
            should_quit,
            accept_retry_pending: false,
            _quit_registration: quit_registration,
        };
        info!(
            "listening on {} ({}, up to {} clients)",
            event_loop.local_addr()?,
            match event_loop.acceptor {
                Acceptor::Tls(_) => "TLS",
                Acceptor::Plain => "unencrypted",
            },
            config.limits.max_clients
        );
        Ok(event_loop)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit_handle.clone()
    }

    /// Runs until the quit handle is used. Only a failure of the poll itself is an error.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);
        while !self.should_quit.load(SeqCst) {
            self.turn(&mut events)?;
        }
        info!(
            "shutting down, dropping {} connections",
            self.relay.connection_count()
        );
        Ok(())
    }

    /// Waits for one batch of events and handles it
    fn turn(&mut self, events: &mut Events) -> Result<(), Box<dyn Error>> {
        let timeout = if self.accept_retry_pending {
            Some(ACCEPT_RETRY_DELAY)
        } else {
            None
        };
        match self.poll.poll(events, timeout) {
            Ok(_) => (),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => return Ok(()),
            Err(e) => return Err(format!("polling for events: {}", e).into()),
        }
        let mut accept = self.accept_retry_pending;
        for event in events.iter() {
            match event.token() {
                LISTENER => accept = true,
                QUIT => (),
                token => self.connection_ready(token, event.readiness()),
            }
        }
        // Released sockets free up descriptors for the accept below
        self.release_closed();
        if accept {
            self.accept_all();
        }
        Ok(())
    }

    fn connection_ready(&mut self, token: Token, readiness: Ready) {
        let key = token_connection(token);
        if readiness.is_writable() {
            self.relay.handle_writable(key);
        }
        if readiness.is_readable() {
            self.relay.handle_readable(key);
        }
    }

    /// Edge triggered, so keep accepting until there is nothing left
    fn accept_all(&mut self) {
        self.accept_retry_pending = false;
        loop {
            match self.listener.accept() {
                Ok((socket, addr)) => self.admit(socket, addr),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => {
                    error!(
                        "accepting connection: {}, retrying in {:?}",
                        e, ACCEPT_RETRY_DELAY
                    );
                    self.accept_retry_pending = true;
                    return;
                }
            }
        }
    }

    fn admit(&mut self, socket: TcpStream, addr: SocketAddr) {
        if self.relay.is_full() {
            warn!(
                "refusing {}: all {} connection slots are in use",
                addr,
                self.relay.connection_count()
            );
            socket
                .shutdown(Shutdown::Both)
                .or_log_warn("shutting down refused socket");
            return;
        }
        socket.set_nodelay(true).or_log_warn("setting TCP_NODELAY");
        let stream = match self.acceptor.wrap(socket) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("failed to set up transport for {}: {}", addr, e);
                return;
            }
        };
        let key = match self.relay.accept(stream) {
            Ok(key) => key,
            Err(e) => {
                warn!("refusing {}: {}", addr, e);
                return;
            }
        };
        let registered = match self.relay.connection(key) {
            Some(connection) => self.poll.register(
                connection.stream().socket(),
                connection_token(key),
                Ready::readable() | Ready::writable(),
                PollOpt::edge(),
            ),
            None => return,
        };
        match registered {
            Ok(()) => debug!("accepted {} from {}", key, addr),
            Err(e) => self.relay.close(key, ConnectionError::Transport(e)),
        }
    }

    /// Closed connections leave the poll before their sockets are dropped
    fn release_closed(&mut self) {
        for stream in self.relay.take_released() {
            self.poll
                .deregister(stream.socket())
                .or_log_warn("deregistering closed connection");
        }
    }
}
