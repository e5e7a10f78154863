use super::*;
use std::net::{IpAddr, Ipv4Addr, TcpListener};

struct KnownSocket {
    addr: SocketAddr,
    is_locked: AtomicBool,
}

pub struct ReservedSocket(Arc<KnownSocket>);

impl Deref for ReservedSocket {
    type Target = SocketAddr;

    fn deref(&self) -> &Self::Target {
        &self.0.addr
    }
}

impl Drop for ReservedSocket {
    fn drop(&mut self) {
        self.0.is_locked.store(false, SeqCst);
    }
}

struct Sockets {
    known: Vec<Arc<KnownSocket>>,
    port: u16,
}

lazy_static::lazy_static! {
    static ref SOCKETS: Mutex<Sockets> = Mutex::new(Sockets{
        known: Vec::new(),
        port: 52_443, // Anything over 49152 works
    });
}

/// A loopback address that was free when checked and that no other test in this process will be handed until the
/// ReservedSocket is dropped. Addresses are pooled and reused.
pub fn provision_socket() -> ReservedSocket {
    let mut sockets = SOCKETS.lock().unwrap();
    // is_locked only goes from false to true while SOCKETS is locked
    if let Some(socket) = sockets.known.iter().find(|socket| !socket.is_locked.load(SeqCst)) {
        socket.is_locked.store(true, SeqCst);
        return ReservedSocket(socket.clone());
    }
    // IPv4 loopback, IPv6 is not available everywhere tests run
    let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
    loop {
        sockets.port += 1;
        if sockets.port >= 65535 {
            panic!("provision_socket() could not find a free socket");
        }
        let addr = SocketAddr::new(ip, sockets.port);
        if TcpListener::bind(addr).is_ok() {
            let socket = Arc::new(KnownSocket {
                addr,
                is_locked: AtomicBool::new(true),
            });
            sockets.known.push(socket.clone());
            return ReservedSocket(socket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisioned_socket_is_loopback() {
        assert!(provision_socket().ip().is_loopback());
    }

    #[test]
    fn multiple_calls_results_in_multiple_sockets() {
        let a = provision_socket();
        let b = provision_socket();
        assert_ne!(*a, *b);
    }

    #[test]
    fn does_not_provision_new_socket_if_not_needed() {
        for _ in 0..100 {
            let _ = provision_socket();
        }
        // This is a global pool, so this test is banking on the assumption that >50 sockets will never be needed at once
        assert!(SOCKETS.lock().unwrap().known.len() < 50);
    }
}
