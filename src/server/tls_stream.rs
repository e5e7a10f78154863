use super::*;
use mio::net::TcpStream;
use rustls::ServerConnection;

/// A TLS session over a nonblocking socket. Plaintext goes in and out through rustls, which holds whatever
/// ciphertext the socket has not taken yet until flush_pending() gets it out.
#[derive(Debug)]
pub struct TlsStream {
    socket: TcpStream,
    session: ServerConnection,
}

impl TlsStream {
    pub fn new(socket: TcpStream, config: Arc<rustls::ServerConfig>) -> Result<Self, rustls::Error> {
        Ok(Self {
            socket,
            session: ServerConnection::new(config)?,
        })
    }

    pub fn socket(&self) -> &TcpStream {
        &self.socket
    }

    /// Pulls ciphertext off the socket into rustls. Ok(false) means the socket hit EOF.
    fn receive_tls(&mut self) -> io::Result<bool> {
        let received = loop {
            match self.session.read_tls(&mut self.socket) {
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                result => break result?,
            }
        };
        if received == 0 {
            return Ok(false);
        }
        if let Err(e) = self.session.process_new_packets() {
            // Get the alert out to the peer before giving up on it
            let _ = self.flush_pending();
            return Err(io::Error::new(ErrorKind::InvalidData, e));
        }
        Ok(true)
    }
}

impl ByteStream for TlsStream {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.session.reader().read(buffer) {
                // Ok(0) is the peer's close_notify
                Ok(len) => return Ok(len),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => (),
                Err(e) => return Err(e),
            }
            if !self.receive_tls()? {
                return Ok(0);
            }
            // Handshake records need to go out for the client to make progress
            self.flush_pending()?;
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        // Ok(0) once rustls has buffered as much as it is willing to
        let accepted = self.session.writer().write(data)?;
        self.flush_pending()?;
        Ok(accepted)
    }

    fn flush_pending(&mut self) -> io::Result<bool> {
        while self.session.wants_write() {
            match self.session.write_tls(&mut self.socket) {
                Ok(0) => return Err(ErrorKind::WriteZero.into()),
                Ok(_) => (),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => return Ok(false),
                Err(ref e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    fn is_handshaking(&self) -> bool {
        self.session.is_handshaking()
    }

    fn shutdown(&mut self) {
        self.session.send_close_notify();
        if let Err(e) = self.flush_pending() {
            debug!("sending TLS close_notify: {}", e);
        }
        if let Err(e) = self.socket.shutdown(Shutdown::Both) {
            if e.kind() != ErrorKind::NotConnected {
                warn!("shutting down socket: {}", e);
            }
        }
    }
}
