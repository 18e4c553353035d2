//! miIO packet framing
//!
//! Every packet starts with a 32-byte big-endian header:
//!
//! ```text
//!  0      2      4          8          12         16                 32
//!  | 2131 | len  | unknown  | device id| stamp    | checksum (MD5)   | payload...
//! ```
//!
//! The checksum is `MD5(header[0..16] || token || encrypted payload)`.
//! Hello packets and their replies carry no payload.

use crate::error::MiioError;
use crate::token::{md5, Token};

pub const MAGIC: u16 = 0x2131;
pub const HEADER_LEN: usize = 32;

/// Decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub length: u16,
    pub unknown: u32,
    pub device_id: u32,
    pub stamp: u32,
    pub checksum: [u8; 16],
}

impl Header {
    pub fn parse(buf: &[u8]) -> Result<Self, MiioError> {
        if buf.len() < HEADER_LEN {
            return Err(MiioError::Packet(format!(
                "packet too short: {} bytes",
                buf.len()
            )));
        }

        let magic = u16::from_be_bytes([buf[0], buf[1]]);
        if magic != MAGIC {
            return Err(MiioError::Packet(format!("bad magic 0x{:04x}", magic)));
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&buf[16..32]);

        Ok(Self {
            length: u16::from_be_bytes([buf[2], buf[3]]),
            unknown: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            device_id: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            stamp: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
            checksum,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&self.length.to_be_bytes());
        out.extend_from_slice(&self.unknown.to_be_bytes());
        out.extend_from_slice(&self.device_id.to_be_bytes());
        out.extend_from_slice(&self.stamp.to_be_bytes());
        out.extend_from_slice(&self.checksum);
    }
}

/// The discovery/handshake packet: magic, length 32, then all `0xFF`.
pub fn hello() -> [u8; HEADER_LEN] {
    let mut packet = [0xffu8; HEADER_LEN];
    packet[..2].copy_from_slice(&MAGIC.to_be_bytes());
    packet[2..4].copy_from_slice(&(HEADER_LEN as u16).to_be_bytes());
    packet
}

/// Build an encrypted command packet
pub fn encode(token: &Token, device_id: u32, stamp: u32, payload: &[u8]) -> Vec<u8> {
    let encrypted = token.encrypt(payload);
    let header = Header {
        length: (HEADER_LEN + encrypted.len()) as u16,
        unknown: 0,
        device_id,
        stamp,
        checksum: *token.as_bytes(),
    };

    let mut packet = Vec::with_capacity(header.length as usize);
    header.write(&mut packet);
    packet.extend_from_slice(&encrypted);

    let checksum = md5(&[&packet[..]]);
    packet[16..HEADER_LEN].copy_from_slice(&checksum);
    packet
}

/// Parse a received packet, verify its checksum and decrypt the payload.
///
/// Packets without payload (hello replies) skip checksum verification and
/// return an empty payload.
pub fn decode(token: &Token, buf: &[u8]) -> Result<(Header, Vec<u8>), MiioError> {
    let header = Header::parse(buf)?;
    let length = header.length as usize;

    if length < HEADER_LEN || length > buf.len() {
        return Err(MiioError::Packet(format!(
            "declared length {} does not match {} received bytes",
            length,
            buf.len()
        )));
    }

    let body = &buf[HEADER_LEN..length];
    if body.is_empty() {
        return Ok((header, Vec::new()));
    }

    let expected = md5(&[&buf[..16], &token.as_bytes()[..], body]);
    if expected != header.checksum {
        return Err(MiioError::Packet("checksum mismatch".to_string()));
    }

    let plaintext = token.decrypt(body)?;
    Ok((header, plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Token {
        Token::from_hex("00112233445566778899aabbccddeeff").unwrap()
    }

    #[test]
    fn test_hello_packet_layout() {
        let packet = hello();
        assert_eq!(&packet[..4], &[0x21, 0x31, 0x00, 0x20]);
        assert!(packet[4..].iter().all(|b| *b == 0xff));

        let header = Header::parse(&packet).unwrap();
        assert_eq!(header.length, 32);
        assert_eq!(header.unknown, 0xffff_ffff);
    }

    #[test]
    fn test_encode_header_fields() {
        let payload = br#"{"id":1,"method":"get_prop_fm","params":""}"#;
        let packet = encode(&token(), 0x0102_0304, 42, payload);

        let header = Header::parse(&packet).unwrap();
        assert_eq!(header.length as usize, packet.len());
        assert_eq!(header.unknown, 0);
        assert_eq!(header.device_id, 0x0102_0304);
        assert_eq!(header.stamp, 42);
        assert_ne!(&header.checksum, token().as_bytes());
        assert_eq!((packet.len() - HEADER_LEN) % 16, 0);
    }

    #[test]
    fn test_decode_encoded_packet() {
        let payload = br#"{"id":9,"result":["ok"]}"#;
        let packet = encode(&token(), 7, 1000, payload);

        let (header, plaintext) = decode(&token(), &packet).unwrap();
        assert_eq!(header.device_id, 7);
        assert_eq!(header.stamp, 1000);
        assert_eq!(plaintext, payload.to_vec());
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let mut packet = encode(&token(), 7, 1000, b"{\"id\":1}");
        let last = packet.len() - 1;
        packet[last] ^= 0x01;

        match decode(&token(), &packet) {
            Err(MiioError::Packet(msg)) => assert!(msg.contains("checksum")),
            other => panic!("Expected checksum error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut packet = hello();
        packet[0] = 0x00;
        assert!(matches!(decode(&token(), &packet), Err(MiioError::Packet(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_packet() {
        let packet = encode(&token(), 7, 1000, b"{\"id\":1}");
        let result = decode(&token(), &packet[..packet.len() - 4]);
        assert!(matches!(result, Err(MiioError::Packet(_))));

        assert!(matches!(Header::parse(&packet[..10]), Err(MiioError::Packet(_))));
    }

    #[test]
    fn test_decode_hello_reply_has_empty_payload() {
        let mut reply = hello();
        reply[4..8].copy_from_slice(&0u32.to_be_bytes());
        reply[8..12].copy_from_slice(&0x00ab_cdefu32.to_be_bytes());
        reply[12..16].copy_from_slice(&5000u32.to_be_bytes());

        let (header, payload) = decode(&token(), &reply).unwrap();
        assert_eq!(header.device_id, 0x00ab_cdef);
        assert_eq!(header.stamp, 5000);
        assert!(payload.is_empty());
    }
}
