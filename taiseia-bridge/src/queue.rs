//! Command queue between client handlers and the serial writer
//!
//! Many producers (one per client), one consumer. Commands leave in the
//! order they were pushed.
//!
//! The queue is unbounded: a client flooding commands faster than the serial
//! line drains them grows memory without limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taiseia_core::{TaiseiaError, TaiseiaResult};
use tokio::sync::mpsc;

/// Create a connected sender/receiver pair
pub fn command_queue() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(AtomicUsize::new(0));
    (
        CommandSender {
            tx,
            pending: pending.clone(),
        },
        CommandReceiver { rx, pending },
    )
}

/// Producer side, cloned into every client handler
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<String>,
    pending: Arc<AtomicUsize>,
}

impl CommandSender {
    /// Enqueue one command
    ///
    /// Fails only when the serial writer has gone away.
    pub fn push(&self, command: impl Into<String>) -> TaiseiaResult<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(command.into()).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            TaiseiaError::Transport("command queue is closed".to_string())
        })
    }

    /// Commands waiting to be written
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Consumer side, owned by the serial writer
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::UnboundedReceiver<String>,
    pending: Arc<AtomicUsize>,
}

impl CommandReceiver {
    /// Wait up to `timeout` for the next command
    ///
    /// Returns `Ok(None)` once every sender is dropped and the queue is
    /// drained, and `Err(Timeout)` when nothing arrived in time. Cancel safe.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> TaiseiaResult<Option<String>> {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(command)) => {
                self.pending.fetch_sub(1, Ordering::SeqCst);
                Ok(Some(command))
            }
            Ok(None) => Ok(None),
            Err(_) => Err(TaiseiaError::Timeout),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
