//! Transports — where outbound messages go.
//!
//! The scheduler treats every transport as fire-and-forget: a failed send is
//! logged and the next note goes out as usual.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::{Arc, Mutex, PoisonError};

use rosc::{encoder, OscMessage, OscPacket};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("could not resolve {0}")]
    Resolve(String),
    #[error("could not encode {addr}: {reason}")]
    Encode { addr: String, reason: String },
}

/// A one-way sink for OSC messages.
pub trait Transport: Send {
    fn send(&mut self, msg: &OscMessage) -> Result<(), TransportError>;
}

/// Sends each message as a UDP datagram.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral local socket aimed at `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let target = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Resolve(format!("{host}:{port}")))?;
        let local = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local)?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, msg: &OscMessage) -> Result<(), TransportError> {
        let bytes = encoder::encode(&OscPacket::Message(msg.clone())).map_err(|e| {
            TransportError::Encode {
                addr: msg.addr.clone(),
                reason: format!("{e:?}"),
            }
        })?;
        self.socket.send_to(&bytes, self.target)?;
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogTransport;

impl Transport for LogTransport {
    fn send(&mut self, msg: &OscMessage) -> Result<(), TransportError> {
        info!(addr = %msg.addr, args = ?msg.args, "osc");
        Ok(())
    }
}

/// Keeps every message in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<OscMessage>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first.
    pub fn messages(&self) -> Vec<OscMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take everything sent so far, leaving the log empty.
    pub fn take(&self) -> Vec<OscMessage> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, msg: &OscMessage) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(msg.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{decoder, OscType};
    use std::time::Duration;

    fn ping() -> OscMessage {
        OscMessage {
            addr: "/g_new".to_string(),
            args: vec![OscType::Int(1), OscType::Int(0), OscType::Int(0)],
        }
    }

    #[test]
    fn udp_send_and_receive() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut transport = UdpTransport::connect("127.0.0.1", port).unwrap();
        assert_eq!(transport.target().port(), port);
        transport.send(&ping()).unwrap();

        let mut buf = [0u8; 1024];
        let (size, _) = receiver.recv_from(&mut buf).unwrap();
        let (_, packet) = decoder::decode_udp(&buf[..size]).unwrap();
        match packet {
            OscPacket::Message(msg) => assert_eq!(msg, ping()),
            OscPacket::Bundle(_) => panic!("expected a message"),
        }
    }

    #[test]
    fn udp_send_without_listener_does_not_block() {
        // Nothing listens on the target; the datagram is simply lost.
        let probe = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);
        let mut transport = UdpTransport::connect("127.0.0.1", port).unwrap();
        let _ = transport.send(&ping());
    }

    #[test]
    fn recording_transport_shares_log() {
        let recorder = RecordingTransport::new();
        let mut boxed: Box<dyn Transport> = Box::new(recorder.clone());
        boxed.send(&ping()).unwrap();
        boxed.send(&ping()).unwrap();
        assert_eq!(recorder.messages().len(), 2);
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.messages().is_empty());
    }

    #[test]
    fn log_transport_accepts_everything() {
        assert!(LogTransport.send(&ping()).is_ok());
    }
}
