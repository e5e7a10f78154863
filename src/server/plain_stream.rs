use super::*;
use mio::net::TcpStream;

/// Unencrypted WebSockets, for development or running behind a TLS terminating proxy
#[derive(Debug)]
pub struct PlainStream {
    socket: TcpStream,
}

impl PlainStream {
    pub fn new(socket: TcpStream) -> Self {
        Self { socket }
    }

    pub fn socket(&self) -> &TcpStream {
        &self.socket
    }
}

impl ByteStream for PlainStream {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.socket.read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.socket.write(data)
    }

    fn flush_pending(&mut self) -> io::Result<bool> {
        Ok(true)
    }

    fn is_handshaking(&self) -> bool {
        false
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.socket.shutdown(Shutdown::Both) {
            if e.kind() != ErrorKind::NotConnected {
                warn!("shutting down socket: {}", e);
            }
        }
    }
}
