//! Serial port transport implementation

use crate::stream::TransportLayer;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use taiseia_core::{TaiseiaError, TaiseiaResult};
use tokio::io::{ReadHalf, WriteHalf};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, SerialStream, StopBits};

/// Read half handed to the serial reader task
pub type SerialReadHalf = ReadHalf<SerialStream>;

/// Write half handed to the serial writer task
pub type SerialWriteHalf = WriteHalf<SerialStream>;

/// Serial port transport layer settings
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    /// Initial RTS level, left untouched when `None`
    pub rts: Option<bool>,
    /// Initial DTR level, left untouched when `None`
    pub dtr: Option<bool>,
    pub timeout: Duration,
}

impl SerialSettings {
    /// Default line speed of TaiSEIA 101 appliances
    pub const DEFAULT_BAUD_RATE: u32 = 9600;

    /// Create new serial settings with 8N1 framing and no flow control
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::None,
            rts: None,
            dtr: None,
            timeout: Duration::from_secs(1),
        }
    }

    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    pub fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    pub fn with_rts(mut self, level: Option<bool>) -> Self {
        self.rts = level;
        self
    }

    pub fn with_dtr(mut self, level: Option<bool>) -> Self {
        self.dtr = level;
        self
    }

    /// Parity from its one-letter name (`N`, `E`, `O`)
    ///
    /// Mark and space parity (`M`, `S`) are recognised but not supported by
    /// the serial backend, so they are rejected.
    pub fn parse_parity(name: &str) -> TaiseiaResult<Parity> {
        match name.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Parity::None),
            "E" => Ok(Parity::Even),
            "O" => Ok(Parity::Odd),
            "M" | "S" => Err(TaiseiaError::InvalidData(format!(
                "parity '{}' (mark/space) is not supported by this serial backend",
                name
            ))),
            other => Err(TaiseiaError::InvalidData(format!(
                "unknown parity '{}'",
                other
            ))),
        }
    }

    /// Flow control from the two command line switches
    ///
    /// Hardware flow control wins when both are requested.
    pub fn flow_control_from_flags(rtscts: bool, xonxoff: bool) -> FlowControl {
        if rtscts {
            FlowControl::Hardware
        } else if xonxoff {
            FlowControl::Software
        } else {
            FlowControl::None
        }
    }
}

/// Serial port transport layer implementation
pub struct SerialTransport {
    stream: Option<SerialStream>,
    settings: SerialSettings,
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("settings", &self.settings)
            .field("open", &self.stream.is_some())
            .finish()
    }
}

impl SerialTransport {
    /// Create a new serial transport layer
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
        }
    }

    /// Split the open port into independently owned halves
    ///
    /// Both halves must be dropped for the port to close.
    pub fn into_split(self) -> TaiseiaResult<(SerialReadHalf, SerialWriteHalf)> {
        let stream = self.stream.ok_or_else(|| {
            TaiseiaError::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial port not open",
            ))
        })?;
        Ok(tokio::io::split(stream))
    }

    fn apply_modem_lines(&self, stream: &mut SerialStream) -> TaiseiaResult<()> {
        if let Some(level) = self.settings.rts {
            stream
                .write_request_to_send(level)
                .map_err(|e| TaiseiaError::Transport(format!("Failed to set RTS: {}", e)))?;
        }
        if let Some(level) = self.settings.dtr {
            stream
                .write_data_terminal_ready(level)
                .map_err(|e| TaiseiaError::Transport(format!("Failed to set DTR: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> TaiseiaResult<()> {
        if self.stream.is_some() {
            return Err(TaiseiaError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Serial port has already been opened",
            )));
        }

        let builder = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control)
            .timeout(self.settings.timeout);

        let mut stream = SerialStream::open(&builder).map_err(|e| {
            TaiseiaError::Transport(format!(
                "Failed to open serial port {}: {}",
                self.settings.port_name, e
            ))
        })?;
        self.apply_modem_lines(&mut stream)?;

        log::info!(
            "Opened serial port {} at {} baud ({:?} parity, {:?} flow control)",
            self.settings.port_name,
            self.settings.baud_rate,
            self.settings.parity,
            self.settings.flow_control
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_settings() {
        let settings = SerialSettings::new("/dev/ttyUSB0", SerialSettings::DEFAULT_BAUD_RATE);
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.rts, None);

        let settings = settings.with_parity(Parity::Even).with_rts(Some(true));
        assert_eq!(settings.parity, Parity::Even);
        assert_eq!(settings.rts, Some(true));
    }

    #[test]
    fn test_parse_parity() {
        assert_eq!(SerialSettings::parse_parity("N").unwrap(), Parity::None);
        assert_eq!(SerialSettings::parse_parity("e").unwrap(), Parity::Even);
        assert_eq!(SerialSettings::parse_parity("O").unwrap(), Parity::Odd);
        assert!(matches!(
            SerialSettings::parse_parity("M"),
            Err(TaiseiaError::InvalidData(_))
        ));
        assert!(SerialSettings::parse_parity("S").is_err());
        assert!(SerialSettings::parse_parity("X").is_err());
    }

    #[test]
    fn test_flow_control_from_flags() {
        assert_eq!(
            SerialSettings::flow_control_from_flags(false, false),
            FlowControl::None
        );
        assert_eq!(
            SerialSettings::flow_control_from_flags(false, true),
            FlowControl::Software
        );
        assert_eq!(
            SerialSettings::flow_control_from_flags(true, true),
            FlowControl::Hardware
        );
    }

    #[test]
    fn test_split_before_open_fails() {
        let transport = SerialTransport::new(SerialSettings::new("/dev/null", 9600));
        assert!(!transport.is_open());
        assert!(transport.into_split().is_err());
    }

    #[tokio::test]
    async fn test_open_missing_port() {
        let mut transport =
            SerialTransport::new(SerialSettings::new("/dev/taiseia-does-not-exist", 9600));
        assert!(matches!(
            transport.open().await,
            Err(TaiseiaError::Transport(_))
        ));
        assert!(!transport.is_open());
    }
}
