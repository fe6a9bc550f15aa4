//! Link statistics collection

use std::fmt;

/// Serial link statistics
///
/// Counters are owned by the task that updates them (the serial writer or
/// the serial reader) and handed back when the task finishes, so no locking
/// is involved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStatistics {
    /// Commands taken off the queue
    pub commands_received: u64,
    /// Commands rejected by the translator
    pub commands_rejected: u64,
    /// Request frames written to the serial port
    pub frames_sent: u64,
    /// Failed serial writes
    pub write_errors: u64,
    /// Raw bytes read from the serial port
    pub bytes_received: u64,
    /// Complete frames cut by the assembler
    pub frames_received: u64,
    /// Frames dropped because they failed to decode
    pub frames_rejected: u64,
    /// Decoded frames whose checksum byte did not match
    pub checksum_mismatches: u64,
}

impl LinkStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_commands_received(&mut self) {
        self.commands_received += 1;
    }

    pub fn increment_commands_rejected(&mut self) {
        self.commands_rejected += 1;
    }

    pub fn increment_frames_sent(&mut self) {
        self.frames_sent += 1;
    }

    pub fn increment_write_errors(&mut self) {
        self.write_errors += 1;
    }

    pub fn add_bytes_received(&mut self, count: usize) {
        self.bytes_received += count as u64;
    }

    pub fn increment_frames_received(&mut self) {
        self.frames_received += 1;
    }

    pub fn increment_frames_rejected(&mut self) {
        self.frames_rejected += 1;
    }

    pub fn increment_checksum_mismatches(&mut self) {
        self.checksum_mismatches += 1;
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &LinkStatistics) {
        self.commands_received += other.commands_received;
        self.commands_rejected += other.commands_rejected;
        self.frames_sent += other.frames_sent;
        self.write_errors += other.write_errors;
        self.bytes_received += other.bytes_received;
        self.frames_received += other.frames_received;
        self.frames_rejected += other.frames_rejected;
        self.checksum_mismatches += other.checksum_mismatches;
    }
}

impl fmt::Display for LinkStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commands {} (rejected {}), frames sent {} (write errors {}), \
             bytes received {}, frames received {} (rejected {}, bad checksum {})",
            self.commands_received,
            self.commands_rejected,
            self.frames_sent,
            self.write_errors,
            self.bytes_received,
            self.frames_received,
            self.frames_rejected,
            self.checksum_mismatches
        )
    }
}
