//! WebSocket frame headers (RFC 6455 section 5.2), limited to what a relay needs: no extensions, no
//! reassembly of fragmented messages.

use std::{convert::TryFrom, ops::Range};

pub const OPCODE_CONTINUATION: u8 = 0x0;
pub const OPCODE_TEXT: u8 = 0x1;
pub const OPCODE_BINARY: u8 = 0x2;
pub const OPCODE_CLOSE: u8 = 0x8;
pub const OPCODE_PING: u8 = 0x9;
pub const OPCODE_PONG: u8 = 0xA;

const FIN_BIT: u8 = 0x80;
const RSV_BITS: u8 = 0x70;
const OPCODE_BITS: u8 = 0x0F;
const MASK_BIT: u8 = 0x80;
const LENGTH_BITS: u8 = 0x7F;
const LENGTH_16: u8 = 126;
const LENGTH_64: u8 = 127;
const MAX_CONTROL_PAYLOAD: usize = 125;

/// Where the parts of one complete frame sit in a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub fin: bool,
    pub opcode: u8,
    pub mask_key: Option<[u8; 4]>,
    pub payload_offset: usize,
    pub payload_len: usize,
    /// Header plus payload
    pub total_len: usize,
}

impl FrameDescriptor {
    #[cfg(test)]
    pub fn masked(&self) -> bool {
        self.mask_key.is_some()
    }

    pub fn payload_range(&self) -> Range<usize> {
        self.payload_offset..self.payload_offset + self.payload_len
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Complete(FrameDescriptor),
    /// More bytes are needed before the frame can be described
    Incomplete,
    Invalid(&'static str),
}

fn is_known_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        OPCODE_CONTINUATION | OPCODE_TEXT | OPCODE_BINARY | OPCODE_CLOSE | OPCODE_PING | OPCODE_PONG
    )
}

/// Describes the frame at the start of buffer. Never reads past buffer, and never trusts a length field
/// without checking it against what has actually arrived.
pub fn parse(buffer: &[u8]) -> Parsed {
    if buffer.len() < 2 {
        return Parsed::Incomplete;
    }
    let (byte0, byte1) = (buffer[0], buffer[1]);
    if byte0 & RSV_BITS != 0 {
        return Parsed::Invalid("reserved bits set without a negotiated extension");
    }
    let opcode = byte0 & OPCODE_BITS;
    if !is_known_opcode(opcode) {
        return Parsed::Invalid("reserved opcode");
    }
    let masked = byte1 & MASK_BIT != 0;
    let base_len = byte1 & LENGTH_BITS;
    let extended_len = match base_len {
        LENGTH_16 => 2,
        LENGTH_64 => 8,
        _ => 0,
    };
    let mask_len = if masked { 4 } else { 0 };
    let header_len = 2 + extended_len + mask_len;
    if buffer.len() < header_len {
        return Parsed::Incomplete;
    }

    let payload_len = match base_len {
        LENGTH_16 => u16::from_be_bytes([buffer[2], buffer[3]]) as u64,
        LENGTH_64 => {
            let mut bytes = [0; 8];
            bytes.copy_from_slice(&buffer[2..10]);
            u64::from_be_bytes(bytes)
        }
        literal => literal as u64,
    };
    if payload_len >> 63 != 0 {
        return Parsed::Invalid("most significant bit of 64-bit length is set");
    }
    let payload_len = match usize::try_from(payload_len) {
        Ok(len) => len,
        Err(_) => return Parsed::Invalid("payload length does not fit in memory"),
    };
    if opcode >= OPCODE_CLOSE && payload_len > MAX_CONTROL_PAYLOAD {
        return Parsed::Invalid("control frame payload longer than 125 bytes");
    }
    let total_len = match header_len.checked_add(payload_len) {
        Some(len) => len,
        None => return Parsed::Invalid("frame length overflows"),
    };
    if buffer.len() < total_len {
        return Parsed::Incomplete;
    }

    let mask_key = if masked {
        let start = 2 + extended_len;
        let mut key = [0; 4];
        key.copy_from_slice(&buffer[start..start + 4]);
        Some(key)
    } else {
        None
    };
    Parsed::Complete(FrameDescriptor {
        fin: byte0 & FIN_BIT != 0,
        opcode,
        mask_key,
        payload_offset: header_len,
        payload_len,
        total_len,
    })
}

/// XORs payload with the mask key in place. Applying it twice restores the original bytes.
pub fn apply_mask(payload: &mut [u8], mask_key: [u8; 4]) {
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte ^= mask_key[i % 4];
    }
}

/// Builds a complete single frame using the shortest length encoding. Servers send unmasked frames; a mask
/// key is only given when acting as a client.
pub fn encode(fin: bool, opcode: u8, payload: &[u8], mask_key: Option<[u8; 4]>) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 14);
    frame.push((if fin { FIN_BIT } else { 0 }) | (opcode & OPCODE_BITS));
    let mask_bit = if mask_key.is_some() { MASK_BIT } else { 0 };
    let len = payload.len();
    if len < LENGTH_16 as usize {
        frame.push(mask_bit | len as u8);
    } else if len <= u16::MAX as usize {
        frame.push(mask_bit | LENGTH_16);
        frame.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        frame.push(mask_bit | LENGTH_64);
        frame.extend_from_slice(&(len as u64).to_be_bytes());
    }
    let payload_offset = frame.len() + if mask_key.is_some() { 4 } else { 0 };
    if let Some(key) = mask_key {
        frame.extend_from_slice(&key);
    }
    frame.extend_from_slice(payload);
    if let Some(key) = mask_key {
        apply_mask(&mut frame[payload_offset..], key);
    }
    frame
}
