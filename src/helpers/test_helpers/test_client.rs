use super::*;
use crate::relay::frame;
use rustls::{pki_types::ServerName, ClientConfig, ClientConnection, StreamOwned};
use std::{convert::TryFrom, net::TcpStream};

pub const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(2);

trait ClientStream: Read + Write + Send {}

impl<T: Read + Write + Send> ClientStream for T {}

/// A blocking WebSocket client for driving a real server
pub struct TestClient {
    stream: Box<dyn ClientStream>,
    received: Vec<u8>,
}

impl TestClient {
    fn tcp(addr: SocketAddr) -> TcpStream {
        let socket = TcpStream::connect(addr).expect("failed to connect to server");
        socket
            .set_read_timeout(Some(CLIENT_READ_TIMEOUT))
            .expect("failed to set read timeout");
        socket
    }

    pub fn connect_plain(addr: SocketAddr) -> Self {
        Self {
            stream: Box::new(Self::tcp(addr)),
            received: Vec::new(),
        }
    }

    /// The TLS handshake happens lazily on the first read or write
    pub fn connect_tls(addr: SocketAddr, roots: rustls::RootCertStore) -> Self {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("no usable protocol versions")
            .with_root_certificates(roots)
            .with_no_client_auth();
        let server_name = ServerName::try_from("localhost").expect("invalid server name");
        let session = ClientConnection::new(Arc::new(config), server_name)
            .expect("failed to create client connection");
        Self {
            stream: Box::new(StreamOwned::new(session, Self::tcp(addr))),
            received: Vec::new(),
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0; 4096];
        let len = self.stream.read(&mut chunk)?;
        self.received.extend_from_slice(&chunk[..len]);
        Ok(len)
    }

    fn fill_or_panic(&mut self, waiting_for: &str) {
        match self.fill() {
            Ok(0) => panic!("server closed the connection while waiting for {}", waiting_for),
            Ok(_) => (),
            Err(e) => panic!("read failed while waiting for {}: {}", waiting_for, e),
        }
    }

    pub fn send_raw(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    /// Sends the upgrade request and returns the response head
    pub fn upgrade(&mut self, room: Option<&str>) -> String {
        self.send_raw(&upgrade_request(room))
            .expect("failed to send upgrade request");
        loop {
            if let Some(end) = crate::relay::find_request_end(&self.received) {
                let head: Vec<u8> = self.received.drain(..end).collect();
                return String::from_utf8(head).expect("response head is not UTF-8");
            }
            self.fill_or_panic("upgrade response");
        }
    }

    pub fn send_text(&mut self, text: &str) {
        self.send_raw(&client_frame(frame::OPCODE_TEXT, text.as_bytes()))
            .expect("failed to send frame");
    }

    pub fn recv_frame(&mut self) -> (u8, Vec<u8>) {
        loop {
            match frame::parse(&self.received) {
                frame::Parsed::Complete(descriptor) => {
                    assert!(!descriptor.masked(), "server sent a masked frame");
                    let payload = self.received[descriptor.payload_range()].to_vec();
                    self.received.drain(..descriptor.total_len);
                    return (descriptor.opcode, payload);
                }
                frame::Parsed::Incomplete => self.fill_or_panic("frame"),
                frame::Parsed::Invalid(reason) => panic!("server sent an invalid frame: {}", reason),
            }
        }
    }

    pub fn recv_text(&mut self) -> String {
        let (opcode, payload) = self.recv_frame();
        assert_eq!(opcode, frame::OPCODE_TEXT, "expected a text frame");
        String::from_utf8(payload).expect("text frame is not UTF-8")
    }

    /// Panics unless the server ends the connection (rather than the read timing out)
    pub fn expect_closed(&mut self) {
        loop {
            match self.fill() {
                Ok(0) => return,
                Ok(_) => panic!("unexpected data {:?} from server", self.received),
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    panic!("server did not close the connection")
                }
                Err(_) => return,
            }
        }
    }
}
