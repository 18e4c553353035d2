//! Private miIO client for gateway device communication
//!
//! This crate provides a minimal blocking client for the miIO protocol spoken
//! by Xiaomi gateways: a UDP handshake followed by AES-128-CBC encrypted JSON
//! request/reply exchanges keyed from the device token.

mod error;
pub mod packet;
mod token;

pub use error::MiioError;
pub use token::Token;

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use serde_json::{json, Value};

/// Default miIO UDP port
pub const DEFAULT_PORT: u16 = 54321;

/// Default socket read timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Device id and clock learned from the hello exchange
#[derive(Debug, Clone, Copy)]
struct Handshake {
    device_id: u32,
    device_stamp: u32,
    received_at: Instant,
}

impl Handshake {
    /// Stamp for the next request: device clock plus elapsed seconds, plus one
    fn next_stamp(&self) -> u32 {
        let elapsed = self.received_at.elapsed().as_secs() as u32;
        self.device_stamp.wrapping_add(elapsed).wrapping_add(1)
    }
}

/// A minimal miIO client bound to a single device
#[derive(Debug)]
pub struct MiioClient {
    socket: UdpSocket,
    addr: SocketAddr,
    token: Token,
    timeout: Duration,
    handshake: Option<Handshake>,
    next_id: u32,
}

impl MiioClient {
    /// Create a client for `host` (optionally `host:port`) with the default timeout
    pub fn new(host: &str, token: &str) -> Result<Self, MiioError> {
        Self::with_timeout(host, token, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom socket read timeout
    pub fn with_timeout(host: &str, token: &str, timeout: Duration) -> Result<Self, MiioError> {
        let token = Token::from_hex(token)?;
        let addr = resolve(host)?;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .map_err(|e| MiioError::network("Failed to bind UDP socket", e))?;
        socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| MiioError::network("Failed to set read timeout", e))?;

        Ok(Self {
            socket,
            addr,
            token,
            timeout,
            handshake: None,
            next_id: 1,
        })
    }

    /// Address of the device this client talks to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Perform the hello exchange and remember the device id and clock
    pub fn handshake(&mut self) -> Result<(), MiioError> {
        self.socket
            .send_to(&packet::hello(), self.addr)
            .map_err(|e| MiioError::network("Failed to send hello", e))?;

        let mut buf = [0u8; 1024];
        let size = self.recv(&mut buf, Instant::now() + self.timeout)?;
        let (header, _) = packet::decode(&self.token, &buf[..size])?;

        tracing::debug!(
            "miIO handshake with {}: device id {:08x}, stamp {}",
            self.addr,
            header.device_id,
            header.stamp
        );

        self.handshake = Some(Handshake {
            device_id: header.device_id,
            device_stamp: header.stamp,
            received_at: Instant::now(),
        });
        Ok(())
    }

    /// Send a remote-procedure call and return its `result` value.
    ///
    /// A handshake is performed first when none is cached. Any failure drops
    /// the cached handshake so that the next call starts fresh.
    pub fn send(&mut self, method: &str, params: Value) -> Result<Value, MiioError> {
        let result = self.exchange(method, params);
        if result.is_err() {
            self.handshake = None;
        }
        result
    }

    fn exchange(&mut self, method: &str, params: Value) -> Result<Value, MiioError> {
        if self.handshake.is_none() {
            self.handshake()?;
        }
        let handshake = self
            .handshake
            .ok_or_else(|| MiioError::Network("handshake not established".to_string()))?;

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);

        let request = json!({ "id": id, "method": method, "params": params });
        let payload = serde_json::to_vec(&request).map_err(|e| MiioError::Parse(e.to_string()))?;
        let outgoing = packet::encode(&self.token, handshake.device_id, handshake.next_stamp(), &payload);

        tracing::trace!("miIO request to {}: {}", self.addr, request);
        self.socket
            .send_to(&outgoing, self.addr)
            .map_err(|e| MiioError::network("Failed to send request", e))?;

        // Stale replies are skipped, but only until the read timeout elapses
        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; 4096];
        loop {
            let size = self.recv(&mut buf, deadline)?;
            let (_, plaintext) = packet::decode(&self.token, &buf[..size])?;
            if plaintext.is_empty() {
                // Late hello reply
                continue;
            }

            let reply = parse_reply(&plaintext)?;
            match reply.get("id").and_then(Value::as_u64) {
                Some(reply_id) if reply_id == u64::from(id) => return extract_result(reply),
                other => {
                    tracing::debug!("Skipping miIO reply with id {:?}, waiting for {}", other, id);
                }
            }
        }
    }

    fn recv(&self, buf: &mut [u8], deadline: Instant) -> Result<usize, MiioError> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(MiioError::Timeout(self.addr.to_string()));
            }
            self.socket
                .set_read_timeout(Some(remaining))
                .map_err(|e| MiioError::network("Failed to set read timeout", e))?;

            match self.socket.recv_from(buf) {
                Ok((size, from)) if from == self.addr => return Ok(size),
                Ok((_, from)) => {
                    tracing::debug!("Ignoring datagram from unexpected peer {}", from);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Err(MiioError::Timeout(self.addr.to_string()));
                }
                Err(e) => return Err(MiioError::network("Socket error", e)),
            }
        }
    }
}

fn resolve(host: &str) -> Result<SocketAddr, MiioError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(MiioError::Network("empty host address".to_string()));
    }

    let resolved = match host.to_socket_addrs() {
        Ok(addrs) => addrs.into_iter().next(),
        Err(_) => (host, DEFAULT_PORT)
            .to_socket_addrs()
            .map_err(|e| MiioError::network(&format!("Failed to resolve {}", host), e))?
            .next(),
    };

    resolved.ok_or_else(|| MiioError::Network(format!("No address found for {}", host)))
}

fn parse_reply(plaintext: &[u8]) -> Result<Value, MiioError> {
    let end = plaintext
        .iter()
        .rposition(|b| *b != 0)
        .map(|i| i + 1)
        .unwrap_or(0);

    serde_json::from_slice(&plaintext[..end])
        .map_err(|e| MiioError::Parse(format!("invalid JSON reply: {}", e)))
}

fn extract_result(mut reply: Value) -> Result<Value, MiioError> {
    if let Some(error) = reply.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(MiioError::Device { code, message });
    }

    reply
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| MiioError::Parse("reply has neither result nor error".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_port() {
        let addr = resolve("127.0.0.1").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_resolve_explicit_port() {
        let addr = resolve("127.0.0.1:4000").unwrap();
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn test_resolve_empty_host() {
        assert!(matches!(resolve("  "), Err(MiioError::Network(_))));
    }

    #[test]
    fn test_parse_reply_strips_trailing_nul() {
        let reply = parse_reply(b"{\"id\":3,\"result\":[\"ok\"]}\0\0").unwrap();
        assert_eq!(reply["id"], 3);
    }

    #[test]
    fn test_parse_reply_rejects_garbage() {
        assert!(matches!(parse_reply(b"not json"), Err(MiioError::Parse(_))));
    }

    #[test]
    fn test_extract_result() {
        let result = extract_result(json!({"id": 1, "result": {"current_volume": 40}})).unwrap();
        assert_eq!(result["current_volume"], 40);
    }

    #[test]
    fn test_extract_device_error() {
        let reply = json!({"id": 1, "error": {"code": -5001, "message": "command error"}});
        match extract_result(reply) {
            Err(MiioError::Device { code, message }) => {
                assert_eq!(code, -5001);
                assert_eq!(message, "command error");
            }
            other => panic!("Expected Device error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_missing_result() {
        assert!(matches!(extract_result(json!({"id": 1})), Err(MiioError::Parse(_))));
    }

    #[test]
    fn test_new_rejects_bad_token() {
        assert!(matches!(
            MiioClient::new("127.0.0.1", "short"),
            Err(MiioError::InvalidToken(_))
        ));
    }
}
