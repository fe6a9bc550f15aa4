//! Serial reader
//!
//! Reads the serial port continuously, cuts the byte stream into frames and
//! hands every decoded frame to the registered observers.

use crate::link::LinkState;
use std::sync::Arc;
use taiseia_core::{ServiceRegistry, to_hex_list};
use taiseia_packet::{FrameAssembler, LinkStatistics, ResponseFrame};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

const READ_BUFFER_SIZE: usize = 256;

/// Receiver of decoded appliance frames
pub trait FrameObserver: Send + Sync {
    fn on_frame(&self, frame: &ResponseFrame);
}

/// Logs every frame as structured JSON
#[derive(Debug, Clone)]
pub struct LogObserver {
    registry: Arc<ServiceRegistry>,
}

impl LogObserver {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }
}

impl FrameObserver for LogObserver {
    fn on_frame(&self, frame: &ResponseFrame) {
        let kind = match frame {
            ResponseFrame::Common(_) => "common",
            ResponseFrame::Register(_) => "register",
        };
        log::debug!("recv {} frame: {}", kind, frame.describe(&self.registry));
    }
}

/// Task that owns the serial read half
pub struct SerialReader<R> {
    port: R,
    assembler: FrameAssembler,
    observers: Vec<Arc<dyn FrameObserver>>,
    link: LinkState,
    token: CancellationToken,
    stats: LinkStatistics,
}

impl<R: AsyncRead + Unpin + Send> SerialReader<R> {
    pub fn new(port: R, link: LinkState, token: CancellationToken) -> Self {
        Self {
            port,
            assembler: FrameAssembler::new(),
            observers: Vec::new(),
            link,
            token,
            stats: LinkStatistics::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FrameObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Read until cancelled, end of stream, or a read error
    ///
    /// End of stream and read errors mark the link as lost.
    pub async fn run(mut self) -> LinkStatistics {
        self.link.connection_made();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let read = tokio::select! {
                _ = self.token.cancelled() => break,
                read = self.port.read(&mut buf) => read,
            };
            match read {
                Ok(0) => {
                    self.link.connection_lost("end of stream");
                    break;
                }
                Ok(n) => self.data_received(&buf[..n]),
                Err(e) => {
                    self.link.connection_lost(&e.to_string());
                    break;
                }
            }
        }
        if !self.assembler.buffered().is_empty() {
            log::debug!(
                "discarding incomplete frame {}",
                to_hex_list(self.assembler.buffered())
            );
        }
        log::debug!("serial reader exit ({})", self.stats);
        self.stats
    }

    fn data_received(&mut self, data: &[u8]) {
        log::debug!("serial recv {}", to_hex_list(data));
        self.stats.add_bytes_received(data.len());

        for frame in self.assembler.extend(data) {
            self.stats.increment_frames_received();
            log::info!("data frame hex: {}", to_hex_list(&frame));

            let response = match ResponseFrame::decode(&frame) {
                Ok(response) => response,
                Err(e) => {
                    log::warn!("frame dropped: {}", e);
                    self.stats.increment_frames_rejected();
                    continue;
                }
            };
            if !response.checksum_valid() {
                log::warn!(
                    "checksum mismatch in frame {} (carried {:02x})",
                    to_hex_list(&frame),
                    response.checksum()
                );
                self.stats.increment_checksum_mismatches();
            }
            for observer in &self.observers {
                observer.on_frame(&response);
            }
        }
    }
}
