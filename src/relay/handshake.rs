use super::*;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha1::{Digest, Sha1};

/// Appended to the client's key before hashing (RFC 6455 section 1.3)
pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Longest room name a client may ask for, in bytes
pub const ROOM_CAPACITY: usize = 32;

const HEADERS_TERMINATOR: &[u8] = b"\r\n\r\n";
const KEY_HEADER: &str = "sec-websocket-key";
const ROOM_PARAM: &str = "room=";
const NONCE_LEN: usize = 16;

/// What we need out of an HTTP upgrade request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub key: String,
    pub room: String,
}

/// If the request head has fully arrived, returns its length including the blank line
pub fn find_request_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADERS_TERMINATOR.len())
        .position(|window| window == HEADERS_TERMINATOR)
        .map(|start| start + HEADERS_TERMINATOR.len())
}

fn room_from_target(target: &str) -> Result<String, ConnectionError> {
    let query = match target.split_once('?') {
        Some((_, query)) => query,
        None => return Ok(String::new()),
    };
    for param in query.split('&') {
        if let Some(room) = param.strip_prefix(ROOM_PARAM) {
            if room.len() > ROOM_CAPACITY {
                return Err(ConnectionError::protocol(format!(
                    "room name is {} bytes, the limit is {}",
                    room.len(),
                    ROOM_CAPACITY
                )));
            }
            return Ok(room.to_string());
        }
    }
    Ok(String::new())
}

fn validate_key(key: &str) -> Result<(), ConnectionError> {
    match BASE64.decode(key) {
        Ok(nonce) if nonce.len() == NONCE_LEN => Ok(()),
        Ok(nonce) => Err(ConnectionError::protocol(format!(
            "Sec-WebSocket-Key decodes to {} bytes instead of {}",
            nonce.len(),
            NONCE_LEN
        ))),
        Err(e) => Err(ConnectionError::protocol(format!(
            "Sec-WebSocket-Key is not base64: {}",
            e
        ))),
    }
}

/// Pulls the key and room out of a complete request head (as found by find_request_end())
pub fn parse_upgrade_request(head: &[u8]) -> Result<UpgradeRequest, ConnectionError> {
    let head = std::str::from_utf8(head)
        .map_err(|_| ConnectionError::protocol("request head is not UTF-8"))?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version), None) => (method, target, version),
        _ => {
            return Err(ConnectionError::protocol(format!(
                "malformed request line {:?}",
                request_line
            )))
        }
    };
    if method != "GET" {
        return Err(ConnectionError::protocol(format!(
            "{} request can not be upgraded",
            method
        )));
    }
    if !version.starts_with("HTTP/") {
        return Err(ConnectionError::protocol(format!(
            "unknown protocol version {:?}",
            version
        )));
    }
    let room = room_from_target(target)?;

    let mut key = None;
    for line in lines.take_while(|line| !line.is_empty()) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case(KEY_HEADER) {
                key = Some(value.trim().to_string());
            }
        }
    }
    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => return Err(ConnectionError::protocol("missing Sec-WebSocket-Key header")),
    };
    validate_key(&key)?;
    Ok(UpgradeRequest { key, room })
}

/// Base64(SHA-1(key + GUID)), proving to the client that we understood its upgrade request
pub fn accept_token(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

pub fn upgrade_response(accept: &str) -> String {
    format!(
        concat!(
            "HTTP/1.1 101 Switching Protocols\r\n",
            "Upgrade: websocket\r\n",
            "Connection: Upgrade\r\n",
            "Sec-WebSocket-Accept: {}\r\n",
            "Access-Control-Allow-Origin: *\r\n",
            "\r\n"
        ),
        accept
    )
}
