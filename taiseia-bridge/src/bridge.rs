//! Bridge orchestration
//!
//! Wires the serial reader, the serial writer and the connection manager
//! together and tears them down in order: cancel, join reader, join writer,
//! join clients.

use crate::config::BridgeConfig;
use crate::link::LinkState;
use crate::listener::{ConnectionManager, bind_listener};
use crate::queue::command_queue;
use crate::reader::{FrameObserver, LogObserver, SerialReader};
use crate::writer::SerialWriter;
use std::net::SocketAddr;
use std::sync::Arc;
use taiseia_command::CommandTranslator;
use taiseia_core::{ServiceRegistry, TaiseiaResult};
use taiseia_packet::LinkStatistics;
use taiseia_transport::{SerialReadHalf, SerialTransport, SerialWriteHalf, TransportLayer};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Open the configured serial port and split it for the reader and writer
pub async fn open_serial(config: &BridgeConfig) -> TaiseiaResult<(SerialReadHalf, SerialWriteHalf)> {
    let mut transport = SerialTransport::new(config.serial.clone());
    transport.open().await?;
    transport.into_split()
}

/// A bridge with its command listener bound
pub struct Bridge {
    config: BridgeConfig,
    listener: TcpListener,
    registry: Arc<ServiceRegistry>,
    observers: Vec<Arc<dyn FrameObserver>>,
    token: CancellationToken,
}

impl Bridge {
    /// Bind the command listener
    ///
    /// Cancelling `token` shuts the running bridge down.
    pub async fn bind(config: BridgeConfig, token: CancellationToken) -> TaiseiaResult<Self> {
        config.validate()?;
        let listener = bind_listener(config.listen_address, config.listen_backlog)?;
        let registry = ServiceRegistry::shared();
        Ok(Self {
            observers: vec![Arc::new(LogObserver::new(registry.clone()))],
            config,
            listener,
            registry,
            token,
        })
    }

    /// Also deliver decoded frames to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn FrameObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn local_addr(&self) -> TaiseiaResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until cancelled or the serial link is lost
    ///
    /// Returns the combined reader and writer counters.
    pub async fn run<R, W>(self, serial_read: R, serial_write: W) -> LinkStatistics
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let link = LinkState::new();
        link.connection_made();
        let (sender, receiver) = command_queue();

        let mut reader = SerialReader::new(serial_read, link.clone(), self.token.clone());
        for observer in self.observers {
            reader = reader.with_observer(observer);
        }
        let reader = tokio::spawn(reader.run());

        let writer = SerialWriter::new(
            serial_write,
            receiver,
            CommandTranslator::new(self.registry.clone()),
            link.clone(),
            self.token.clone(),
        )
        .with_wait_timeout(self.config.queue_wait_timeout)
        .with_max_write_failures(self.config.max_write_failures);
        let writer = tokio::spawn(writer.run());

        let manager = ConnectionManager::new(
            self.listener,
            &self.config,
            sender,
            link,
            self.token.clone(),
        );
        let mut clients = manager.run().await;

        log::debug!("stopping serial and client tasks");
        self.token.cancel();

        let mut stats = LinkStatistics::new();
        match reader.await {
            Ok(reader_stats) => stats.merge(&reader_stats),
            Err(e) => log::error!("serial reader task failed: {}", e),
        }
        match writer.await {
            Ok(writer_stats) => stats.merge(&writer_stats),
            Err(e) => log::error!("serial writer task failed: {}", e),
        }
        while let Some(finished) = clients.join_next().await {
            if let Err(e) = finished {
                log::error!("client handler failed: {}", e);
            }
        }

        log::info!("bridge stopped: {}", stats);
        stats
    }
}
