//! Stream accessor traits for the transport layer

use async_trait::async_trait;
use std::time::Duration;
use taiseia_core::TaiseiaResult;

/// Outcome of waiting for one line of client input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// A line with its terminator removed
    Line(String),
    /// Nothing complete arrived within the timeout
    Timeout,
    /// The peer closed the connection
    Closed,
}

/// Line-oriented access to a connected client stream
///
/// Connection handlers only talk to their client through this trait so they
/// can be driven by scripted streams in tests.
#[async_trait]
pub trait StreamAccessor: Send {
    /// Wait up to `timeout` for the next line
    ///
    /// A timeout is not an error; the caller re-checks its own state and
    /// tries again. Bytes received before the timeout are kept for the next
    /// call.
    async fn receive_line(&mut self, timeout: Duration) -> TaiseiaResult<LineRead>;

    /// Write all data to the stream
    async fn send_all(&mut self, data: &[u8]) -> TaiseiaResult<()>;

    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream
    async fn close(&mut self) -> TaiseiaResult<()>;
}

/// Transport that has to be opened before use
#[async_trait]
pub trait TransportLayer: Send {
    /// Open the physical layer connection
    async fn open(&mut self) -> TaiseiaResult<()>;

    /// Whether `open` has succeeded
    fn is_open(&self) -> bool;
}
