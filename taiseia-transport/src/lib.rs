//! Transport layer for the TaiSEIA 101 bridge
//!
//! This crate provides the serial port that talks to the appliance and the
//! line-oriented TCP connection used by operator clients.

pub mod serial;
pub mod stream;
pub mod tcp;

pub use serial::{SerialReadHalf, SerialSettings, SerialTransport, SerialWriteHalf};
pub use stream::{LineRead, StreamAccessor, TransportLayer};
pub use tcp::{KeepaliveSettings, MAX_LINE_LENGTH, TcpTransport};
