//! Bridge configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use taiseia_core::{TaiseiaError, TaiseiaResult};
use taiseia_transport::{KeepaliveSettings, MAX_LINE_LENGTH, SerialSettings};

/// Default TCP port operator clients connect to
pub const DEFAULT_LOCAL_PORT: u16 = 7778;

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Serial port the appliance is attached to
    pub serial: SerialSettings,
    /// Address the command listener binds
    pub listen_address: SocketAddr,
    /// Pending connection backlog of the listener
    pub listen_backlog: u32,
    /// How long a client read waits before re-checking for shutdown
    pub client_read_timeout: Duration,
    /// How long the serial writer waits on the queue before re-checking
    pub queue_wait_timeout: Duration,
    /// How long an accept waits before the serial link is re-checked
    pub accept_timeout: Duration,
    /// Consecutive failed serial writes after which the link counts as lost
    pub max_write_failures: u32,
    /// Keepalive applied to every client socket
    pub keepalive: KeepaliveSettings,
    /// Longest command line a client may send before it is disconnected
    pub max_line_length: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            serial: SerialSettings::new("/dev/ttyUSB0", SerialSettings::DEFAULT_BAUD_RATE),
            listen_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_LOCAL_PORT)),
            listen_backlog: 2,
            client_read_timeout: Duration::from_secs(3),
            queue_wait_timeout: Duration::from_secs(3),
            accept_timeout: Duration::from_secs(1),
            max_write_failures: 3,
            keepalive: KeepaliveSettings::default(),
            max_line_length: MAX_LINE_LENGTH,
        }
    }
}

impl BridgeConfig {
    /// Default configuration for the given serial port
    pub fn new(serial: SerialSettings) -> Self {
        Self {
            serial,
            ..Self::default()
        }
    }

    pub fn with_listen_address(mut self, address: SocketAddr) -> Self {
        self.listen_address = address;
        self
    }

    /// Listen on all interfaces at `port`
    pub fn with_local_port(mut self, port: u16) -> Self {
        self.listen_address.set_port(port);
        self
    }

    pub fn with_client_read_timeout(mut self, timeout: Duration) -> Self {
        self.client_read_timeout = timeout;
        self
    }

    pub fn with_queue_wait_timeout(mut self, timeout: Duration) -> Self {
        self.queue_wait_timeout = timeout;
        self
    }

    pub fn with_accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = timeout;
        self
    }

    pub fn with_max_write_failures(mut self, count: u32) -> Self {
        self.max_write_failures = count;
        self
    }

    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// Reject settings the bridge cannot run with
    pub fn validate(&self) -> TaiseiaResult<()> {
        if self.serial.port_name.is_empty() {
            return Err(TaiseiaError::InvalidData(
                "serial port name cannot be empty".to_string(),
            ));
        }
        if self.serial.baud_rate == 0 {
            return Err(TaiseiaError::InvalidData(
                "baud rate must be greater than zero".to_string(),
            ));
        }
        if self.listen_backlog == 0 {
            return Err(TaiseiaError::InvalidData(
                "listen backlog must be greater than zero".to_string(),
            ));
        }
        for (name, timeout) in [
            ("client read", self.client_read_timeout),
            ("queue wait", self.queue_wait_timeout),
            ("accept", self.accept_timeout),
        ] {
            if timeout.is_zero() {
                return Err(TaiseiaError::InvalidData(format!(
                    "{} timeout must be greater than zero",
                    name
                )));
            }
        }
        if self.max_write_failures == 0 {
            return Err(TaiseiaError::InvalidData(
                "max write failures must be at least 1".to_string(),
            ));
        }
        if self.max_line_length == 0 {
            return Err(TaiseiaError::InvalidData(
                "max line length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.listen_address.port(), 7778);
        assert_eq!(config.listen_backlog, 2);
        assert_eq!(config.client_read_timeout, Duration::from_secs(3));
        assert_eq!(config.queue_wait_timeout, Duration::from_secs(3));
        assert_eq!(config.accept_timeout, Duration::from_secs(1));
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.max_line_length, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = BridgeConfig::new(SerialSettings::new("/dev/ttyS1", 19200))
            .with_local_port(9000)
            .with_accept_timeout(Duration::from_millis(200))
            .with_max_write_failures(5);
        assert_eq!(config.serial.port_name, "/dev/ttyS1");
        assert_eq!(config.listen_address.port(), 9000);
        assert!(config.listen_address.ip().is_unspecified());
        assert_eq!(config.accept_timeout, Duration::from_millis(200));
        assert_eq!(config.max_write_failures, 5);
    }

    #[test]
    fn test_validate() {
        assert!(BridgeConfig::new(SerialSettings::new("", 9600))
            .validate()
            .is_err());
        assert!(BridgeConfig::default()
            .with_queue_wait_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(BridgeConfig::default()
            .with_max_write_failures(0)
            .validate()
            .is_err());
        assert!(BridgeConfig::default()
            .with_max_line_length(0)
            .validate()
            .is_err());
    }
}
