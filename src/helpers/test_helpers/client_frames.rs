use super::*;
use crate::relay::frame;

/// The nonce from RFC 6455 section 1.3
pub const TEST_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

pub const TEST_MASK: [u8; 4] = [0x37, 0xfa, 0x21, 0x3d];

/// A single final frame, masked the way a browser would send it
pub fn client_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    frame::encode(true, opcode, payload, Some(TEST_MASK))
}

/// A well formed upgrade request, with ?room= if room is Some
pub fn upgrade_request(room: Option<&str>) -> Vec<u8> {
    let target = match room {
        Some(room) => format!("/signal?room={}", room),
        None => "/signal".to_string(),
    };
    format!(
        concat!(
            "GET {} HTTP/1.1\r\n",
            "Host: localhost\r\n",
            "Upgrade: websocket\r\n",
            "Connection: Upgrade\r\n",
            "Sec-WebSocket-Key: {}\r\n",
            "Sec-WebSocket-Version: 13\r\n",
            "\r\n"
        ),
        target, TEST_KEY
    )
    .into_bytes()
}

/// Splits server output into the frames it contains, checking each is complete, final and unmasked
pub fn decode_server_frames(mut bytes: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let descriptor = match frame::parse(bytes) {
            frame::Parsed::Complete(descriptor) => descriptor,
            frame::Parsed::Incomplete => panic!("server output ends with a partial frame"),
            frame::Parsed::Invalid(reason) => panic!("server sent an invalid frame: {}", reason),
        };
        assert!(!descriptor.masked(), "server sent a masked frame");
        assert!(descriptor.fin, "server split a message across frames");
        frames.push((descriptor.opcode, bytes[descriptor.payload_range()].to_vec()));
        bytes = &bytes[descriptor.total_len..];
    }
    frames
}
