//! Command listener
//!
//! Accepts operator clients over TCP and feeds their command lines into the
//! command queue. Each client is served by its own task.

use crate::config::BridgeConfig;
use crate::link::LinkState;
use crate::queue::CommandSender;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use taiseia_core::{TaiseiaError, TaiseiaResult};
use taiseia_transport::{KeepaliveSettings, LineRead, StreamAccessor, TcpTransport};
use tokio::net::{TcpListener, TcpSocket};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Line prefix that ends a client session
pub const EXIT_COMMAND: &str = "exit";

/// Bind the command listener with address reuse and a short backlog
pub fn bind_listener(address: SocketAddr, backlog: u32) -> TaiseiaResult<TcpListener> {
    let socket = if address.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(address).map_err(|e| {
        TaiseiaError::Connection(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("Failed to bind to {}: {}", address, e),
        ))
    })?;
    Ok(socket.listen(backlog)?)
}

/// Accept loop for operator clients
pub struct ConnectionManager {
    listener: TcpListener,
    sender: CommandSender,
    link: LinkState,
    token: CancellationToken,
    accept_timeout: Duration,
    client_read_timeout: Duration,
    keepalive: KeepaliveSettings,
    max_line_length: usize,
}

impl ConnectionManager {
    pub fn new(
        listener: TcpListener,
        config: &BridgeConfig,
        sender: CommandSender,
        link: LinkState,
        token: CancellationToken,
    ) -> Self {
        Self {
            listener,
            sender,
            link,
            token,
            accept_timeout: config.accept_timeout,
            client_read_timeout: config.client_read_timeout,
            keepalive: config.keepalive,
            max_line_length: config.max_line_length,
        }
    }

    pub fn local_addr(&self) -> TaiseiaResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept clients until cancelled or the serial link is lost
    ///
    /// Returns the handlers still running; the caller cancels the token and
    /// joins them during teardown.
    pub async fn run(self) -> JoinSet<()> {
        let mut clients = JoinSet::new();
        match self.listener.local_addr() {
            Ok(addr) => log::info!("Waiting for connection on {}", addr),
            Err(e) => log::warn!("Listener has no local address: {}", e),
        }

        loop {
            if !self.link.is_connected() {
                log::warn!("serial link lost, no longer accepting clients");
                break;
            }

            let accepted = tokio::select! {
                _ = self.token.cancelled() => break,
                accepted = tokio::time::timeout(self.accept_timeout, self.listener.accept()) => accepted,
            };

            match accepted {
                Ok(Ok((stream, peer))) => {
                    log::info!("Connected by {}", peer);
                    let transport = TcpTransport::from_connected_stream(stream, peer)
                        .with_max_line_length(self.max_line_length);
                    let label = transport.peer_addr();
                    if let Err(e) = transport.configure_keepalive(self.keepalive) {
                        log::warn!("Failed to configure keepalive for {}: {}", label, e);
                    }
                    let handler = ClientHandler::new(
                        transport,
                        label,
                        self.sender.clone(),
                        self.token.clone(),
                        self.client_read_timeout,
                    );
                    clients.spawn(handler.run());
                }
                Ok(Err(e)) => log::error!("Error accepting connection: {}", e),
                Err(_) => {}
            }

            while let Some(finished) = clients.try_join_next() {
                if let Err(e) = finished {
                    log::error!("client handler failed: {}", e);
                }
            }
        }

        clients
    }
}

/// Serves one client connection
pub struct ClientHandler<S> {
    stream: S,
    label: String,
    sender: CommandSender,
    token: CancellationToken,
    read_timeout: Duration,
}

impl<S: StreamAccessor> ClientHandler<S> {
    pub fn new(
        stream: S,
        label: impl fmt::Display,
        sender: CommandSender,
        token: CancellationToken,
        read_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            label: label.to_string(),
            sender,
            token,
            read_timeout,
        }
    }

    /// Forward lines until the client leaves or the bridge shuts down
    ///
    /// The connection is closed on every exit path.
    pub async fn run(mut self) {
        if let Err(e) = self.serve().await {
            log::error!("client({}) error: {}", self.label, e);
        }
        if let Err(e) = self.stream.close().await {
            log::debug!("client({}) close failed: {}", self.label, e);
        }
        log::info!("client({}) disconnected", self.label);
    }

    async fn serve(&mut self) -> TaiseiaResult<()> {
        loop {
            let read = tokio::select! {
                _ = self.token.cancelled() => return Ok(()),
                read = self.stream.receive_line(self.read_timeout) => read?,
            };

            let line = match read {
                LineRead::Line(line) => line,
                LineRead::Timeout => continue,
                LineRead::Closed => return Ok(()),
            };

            log::info!("client({}) data: {}", self.label, line);
            if line.starts_with(EXIT_COMMAND) {
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }
            self.sender.push(line)?;
        }
    }
}
