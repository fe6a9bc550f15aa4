//! Serial writer
//!
//! The only task that writes to the serial port. Commands are taken off the
//! queue one at a time, translated, and written as one frame each, so frames
//! are never interleaved.

use crate::link::LinkState;
use crate::queue::CommandReceiver;
use std::time::Duration;
use taiseia_command::CommandTranslator;
use taiseia_core::{TaiseiaError, to_hex_list};
use taiseia_packet::LinkStatistics;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Queue consumer that owns the serial write half
pub struct SerialWriter<W> {
    port: W,
    receiver: CommandReceiver,
    translator: CommandTranslator,
    link: LinkState,
    token: CancellationToken,
    wait_timeout: Duration,
    max_write_failures: u32,
    consecutive_failures: u32,
    stats: LinkStatistics,
}

impl<W: AsyncWrite + Unpin + Send> SerialWriter<W> {
    pub fn new(
        port: W,
        receiver: CommandReceiver,
        translator: CommandTranslator,
        link: LinkState,
        token: CancellationToken,
    ) -> Self {
        Self {
            port,
            receiver,
            translator,
            link,
            token,
            wait_timeout: Duration::from_secs(3),
            max_write_failures: 3,
            consecutive_failures: 0,
            stats: LinkStatistics::new(),
        }
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_max_write_failures(mut self, count: u32) -> Self {
        self.max_write_failures = count.max(1);
        self
    }

    /// Run until cancelled, the queue closes, or the port stops accepting
    /// writes. Returns the writer's counters.
    pub async fn run(mut self) -> LinkStatistics {
        log::debug!("serial writer running");
        loop {
            let next = tokio::select! {
                _ = self.token.cancelled() => break,
                next = self.receiver.recv_timeout(self.wait_timeout) => next,
            };

            match next {
                Ok(Some(command)) => self.handle_command(&command).await,
                Ok(None) => {
                    log::debug!("command queue closed");
                    break;
                }
                Err(e) if e.is_recoverable() => {}
                Err(e) => {
                    log::error!("command queue error: {}", e);
                    break;
                }
            }

            if self.consecutive_failures >= self.max_write_failures {
                self.link.connection_lost(&format!(
                    "{} consecutive serial write failures",
                    self.consecutive_failures
                ));
                break;
            }
        }
        log::debug!("serial writer exit ({})", self.stats);
        self.stats
    }

    async fn handle_command(&mut self, command: &str) {
        self.stats.increment_commands_received();
        let command = command.replace(['\r', '\n'], "");
        log::debug!("recv queue cmd: {}", command);

        let frame = match self.translator.translate(&command) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("command '{}' ignored: {}", command, e);
                self.stats.increment_commands_rejected();
                return;
            }
        };

        let written = async {
            self.port.write_all(&frame).await?;
            self.port.flush().await
        }
        .await;

        match written {
            Ok(()) => {
                log::debug!("send bytes command {}", to_hex_list(&frame));
                self.stats.increment_frames_sent();
                self.consecutive_failures = 0;
            }
            Err(e) => {
                let error = TaiseiaError::Transport(format!("serial write failed: {}", e));
                log::error!("{}", error);
                self.stats.increment_write_errors();
                self.consecutive_failures += 1;
            }
        }
    }
}
