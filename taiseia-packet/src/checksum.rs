//! Frame checksum
//!
//! Every TaiSEIA 101 frame ends with a single byte holding the running XOR of
//! all bytes before it.

use taiseia_core::{TaiseiaError, TaiseiaResult};

/// Running XOR checksum calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumCalc {
    value: u8,
}

impl ChecksumCalc {
    /// Create a new calculator
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Reset to the initial state
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Fold a single byte into the checksum
    pub fn update(&mut self, byte: u8) {
        self.value ^= byte;
    }

    /// Fold a slice of bytes into the checksum
    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Current checksum value
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Compare against the checksum byte carried by a frame
    pub fn validate(&self, expected: u8) -> TaiseiaResult<()> {
        if self.value != expected {
            Err(TaiseiaError::Field(format!(
                "checksum has wrong value: 0x{:02X}, frame carries 0x{:02X}",
                self.value, expected
            )))
        } else {
            Ok(())
        }
    }

    /// Checksum of a whole slice
    pub fn of(data: &[u8]) -> u8 {
        let mut calc = Self::new();
        calc.update_bytes(data);
        calc.value()
    }
}
