use super::*;
use mio::net::TcpStream;

/// A connection's transport, whichever kind the server was configured for
#[derive(Debug)]
pub enum TransportStream {
    Plain(PlainStream),
    Tls(TlsStream),
}

impl TransportStream {
    /// The socket to register for readiness
    pub fn socket(&self) -> &TcpStream {
        match self {
            Self::Plain(stream) => stream.socket(),
            Self::Tls(stream) => stream.socket(),
        }
    }

    fn inner(&mut self) -> &mut dyn ByteStream {
        match self {
            Self::Plain(stream) => stream,
            Self::Tls(stream) => stream,
        }
    }
}

impl ByteStream for TransportStream {
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        self.inner().read(buffer)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner().write(data)
    }

    fn flush_pending(&mut self) -> io::Result<bool> {
        self.inner().flush_pending()
    }

    fn is_handshaking(&self) -> bool {
        match self {
            Self::Plain(stream) => stream.is_handshaking(),
            Self::Tls(stream) => stream.is_handshaking(),
        }
    }

    fn shutdown(&mut self) {
        self.inner().shutdown()
    }
}

/// Turns accepted sockets into transports
#[derive(Debug, Clone)]
pub enum Acceptor {
    Plain,
    Tls(Arc<rustls::ServerConfig>),
}

impl Acceptor {
    /// Loads the certificate and key if TLS is enabled, failing if either is unusable
    pub fn new(config: &ServerConfig, fs: &Filesystem) -> Result<Self, Box<dyn Error>> {
        match &config.tls {
            Some(tls) => Ok(Self::Tls(load_tls_config(tls, fs)?)),
            None => {
                warn!("TLS is disabled, WebSocket traffic will not be encrypted");
                Ok(Self::Plain)
            }
        }
    }

    pub fn wrap(&self, socket: TcpStream) -> Result<TransportStream, Box<dyn Error>> {
        Ok(match self {
            Self::Plain => TransportStream::Plain(PlainStream::new(socket)),
            Self::Tls(config) => TransportStream::Tls(TlsStream::new(socket, config.clone())?),
        })
    }
}
