//! OSC (Open Sound Control) output — note triggers for the external synth server.

pub mod config;
pub mod message;
pub mod transport;

pub use config::OscConfig;
pub use message::{note_messages, Instrument};
pub use transport::{LogTransport, RecordingTransport, Transport, TransportError, UdpTransport};
