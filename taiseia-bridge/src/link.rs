//! Serial link liveness

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag telling whether the serial link is usable
///
/// Set by the serial tasks, polled by the connection manager between
/// accepts.
#[derive(Debug, Clone, Default)]
pub struct LinkState {
    connected: Arc<AtomicBool>,
}

impl LinkState {
    /// New state, not yet connected
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_made(&self) {
        if !self.connected.swap(true, Ordering::SeqCst) {
            log::debug!("serial connection made");
        }
    }

    pub fn connection_lost(&self, reason: &str) {
        if self.connected.swap(false, Ordering::SeqCst) {
            log::warn!("serial connection lost: {}", reason);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_state() {
        let link = LinkState::new();
        let observer = link.clone();
        assert!(!observer.is_connected());

        link.connection_made();
        assert!(observer.is_connected());

        link.connection_lost("end of stream");
        assert!(!observer.is_connected());
        // repeated loss is harmless
        link.connection_lost("again");
        assert!(!observer.is_connected());
    }
}
