//! TCP transport implementation
//!
//! Operator clients speak a line protocol: one command per line, `\n` or
//! `\r\n` terminated. A line longer than the configured maximum closes the
//! connection.

use crate::stream::{LineRead, StreamAccessor};
use async_trait::async_trait;
use bytes::BytesMut;
use socket2::{SockRef, TcpKeepalive};
use std::net::SocketAddr;
use std::time::Duration;
use taiseia_core::{TaiseiaError, TaiseiaResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const READ_CHUNK: usize = 1024;

/// Longest command line accepted from a client, terminator excluded
pub const MAX_LINE_LENGTH: usize = 1024;

/// TCP keepalive probing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepaliveSettings {
    /// Idle time before the first probe
    pub idle: Duration,
    /// Time between probes
    pub interval: Duration,
    /// Unanswered probes before the connection is dropped
    pub retries: u32,
}

impl Default for KeepaliveSettings {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(1),
            interval: Duration::from_secs(1),
            retries: 3,
        }
    }
}

/// Accepted client connection
#[derive(Debug)]
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    max_line_length: usize,
    eof: bool,
    closed: bool,
}

impl TcpTransport {
    /// Wrap an accepted stream
    pub fn from_connected_stream(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            max_line_length: MAX_LINE_LENGTH,
            eof: false,
            closed: false,
        }
    }

    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length.max(1);
        self
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Enable keepalive probing and disable Nagle's algorithm
    pub fn configure_keepalive(&self, settings: KeepaliveSettings) -> TaiseiaResult<()> {
        let socket = SockRef::from(&self.stream);

        let keepalive = TcpKeepalive::new().with_time(settings.idle);
        #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "macos",
            target_os = "freebsd",
        ))]
        let keepalive = keepalive
            .with_interval(settings.interval)
            .with_retries(settings.retries);

        socket.set_tcp_keepalive(&keepalive)?;
        self.stream.set_nodelay(true)?;
        Ok(())
    }

    /// Cut the next complete line out of the receive buffer
    ///
    /// Fails once the pending line is longer than the maximum, whether or
    /// not its terminator has arrived.
    fn take_line(&mut self) -> TaiseiaResult<Option<String>> {
        let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
            // one byte of slack for the '\r' of a "\r\n" terminator
            if self.buffer.len() > self.max_line_length + 1 {
                return Err(self.line_too_long());
            }
            return Ok(None);
        };
        let length = match self.buffer[..end].last() {
            Some(b'\r') => end - 1,
            _ => end,
        };
        if length > self.max_line_length {
            return Err(self.line_too_long());
        }
        let line = self.buffer.split_to(end + 1);
        Ok(Some(decode_line(&line)))
    }

    fn line_too_long(&mut self) -> TaiseiaError {
        self.buffer.clear();
        self.closed = true;
        TaiseiaError::Connection(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "line from {} exceeds {} bytes",
                self.peer, self.max_line_length
            ),
        ))
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

#[async_trait]
impl StreamAccessor for TcpTransport {
    async fn receive_line(&mut self, timeout: Duration) -> TaiseiaResult<LineRead> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(line) = self.take_line()? {
                return Ok(LineRead::Line(line));
            }
            if self.eof || self.closed {
                // flush an unterminated tail once, then report the close
                if self.buffer.is_empty() {
                    return Ok(LineRead::Closed);
                }
                let rest = self.buffer.split();
                return Ok(LineRead::Line(decode_line(&rest)));
            }

            // read_buf is cancel safe, so a timeout never loses bytes
            match tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.buffer)).await
            {
                Err(_) => return Ok(LineRead::Timeout),
                Ok(Ok(0)) => self.eof = true,
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    self.closed = true;
                    return Err(TaiseiaError::Connection(e));
                }
            }
        }
    }

    async fn send_all(&mut self, data: &[u8]) -> TaiseiaResult<()> {
        if self.closed {
            return Err(TaiseiaError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "TCP stream closed",
            )));
        }
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> TaiseiaResult<()> {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.stream.shutdown().await {
                log::debug!("Shutdown of {} failed: {}", self.peer, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn connected_pair() -> (TcpTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, peer) = listener.accept().await.unwrap();
        (TcpTransport::from_connected_stream(server, peer), client)
    }

    #[test]
    fn test_keepalive_defaults() {
        let settings = KeepaliveSettings::default();
        assert_eq!(settings.idle, Duration::from_secs(1));
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert_eq!(settings.retries, 3);
    }

    #[tokio::test]
    async fn test_receive_lines() {
        let (mut transport, mut client) = connected_pair().await;
        transport
            .configure_keepalive(KeepaliveSettings::default())
            .unwrap();

        client.write_all(b"poweron\r\nfanlevel 3\nregi").await.unwrap();
        let timeout = Duration::from_secs(2);
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Line("poweron".to_string())
        );
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Line("fanlevel 3".to_string())
        );

        client.write_all(b"ster\n").await.unwrap();
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Line("register".to_string())
        );
    }

    #[tokio::test]
    async fn test_receive_timeout_keeps_partial_line() {
        let (mut transport, mut client) = connected_pair().await;

        client.write_all(b"pow").await.unwrap();
        assert_eq!(
            transport
                .receive_line(Duration::from_millis(100))
                .await
                .unwrap(),
            LineRead::Timeout
        );

        client.write_all(b"er\n").await.unwrap();
        assert_eq!(
            transport.receive_line(Duration::from_secs(2)).await.unwrap(),
            LineRead::Line("power".to_string())
        );
    }

    #[tokio::test]
    async fn test_line_length_limit() {
        let (transport, mut client) = connected_pair().await;
        let mut transport = transport.with_max_line_length(8);
        let timeout = Duration::from_secs(2);

        client.write_all(b"12345678\r\n").await.unwrap();
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Line("12345678".to_string())
        );
        client.write_all(b"123456789\n").await.unwrap();
        assert!(matches!(
            transport.receive_line(timeout).await,
            Err(TaiseiaError::Connection(_))
        ));
        assert!(transport.is_closed());
        assert_eq!(transport.receive_line(timeout).await.unwrap(), LineRead::Closed);

    }

    #[tokio::test]
    async fn test_unterminated_flood_is_bounded() {
        let (mut transport, mut client) = connected_pair().await;

        let writer = tokio::spawn(async move {
            let chunk = vec![b'a'; 64 * 1024];
            for _ in 0..16 {
                if client.write_all(&chunk).await.is_err() {
                    break;
                }
            }
            client
        });

        let result = loop {
            match transport.receive_line(Duration::from_millis(5)).await {
                Ok(LineRead::Timeout) => {
                    assert!(transport.buffer.len() <= MAX_LINE_LENGTH + 1);
                }
                other => break other,
            }
        };
        match result {
            Err(TaiseiaError::Connection(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::InvalidData)
            }
            other => panic!("expected an oversized line error, got {:?}", other),
        }
        assert!(transport.buffer.is_empty());

        transport.close().await.unwrap();
        drop(transport);
        let _ = writer.await;
    }

    #[tokio::test]
    async fn test_peer_close() {
        let (mut transport, mut client) = connected_pair().await;

        client.write_all(b"exit").await.unwrap();
        drop(client);

        let timeout = Duration::from_secs(2);
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Line("exit".to_string())
        );
        assert_eq!(
            transport.receive_line(timeout).await.unwrap(),
            LineRead::Closed
        );
    }

    #[tokio::test]
    async fn test_send_and_close() {
        let (mut transport, mut client) = connected_pair().await;

        transport.send_all(b"ok\n").await.unwrap();
        let mut buf = [0u8; 3];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ok\n");

        transport.close().await.unwrap();
        assert!(transport.is_closed());
        assert!(transport.send_all(b"late").await.is_err());

        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }
}
