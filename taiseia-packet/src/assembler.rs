//! Frame assembler
//!
//! Turns the unbounded serial byte stream into length-delimited frames. The
//! first buffered byte declares the frame length; once the buffer holds that
//! many bytes it is emitted and the assembler starts over.
//!
//! # Known limitation
//! There is no resynchronisation. A corrupted length byte (or a declared
//! length of 0, which can never be reached) keeps the assembler accumulating
//! until the device itself resets the stream. This is inherited from the
//! protocol, which has no start-of-frame marker.

use bytes::{Bytes, BytesMut};

/// Assembler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Nothing buffered
    Empty,
    /// Waiting for `declared - buffered` more bytes
    Accumulating { declared: usize, buffered: usize },
}

/// Length-prefixed frame assembler
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: BytesMut,
}

impl FrameAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(u8::MAX as usize),
        }
    }

    /// Push one byte, returning a frame when it completes one
    pub fn push(&mut self, byte: u8) -> Option<Bytes> {
        self.buffer.extend_from_slice(&[byte]);
        if usize::from(self.buffer[0]) == self.buffer.len() {
            Some(self.buffer.split().freeze())
        } else {
            None
        }
    }

    /// Push a chunk, returning every frame it completes in order
    pub fn extend(&mut self, data: &[u8]) -> Vec<Bytes> {
        data.iter().filter_map(|&byte| self.push(byte)).collect()
    }

    /// Current state
    pub fn state(&self) -> AssemblerState {
        match self.buffer.first() {
            None => AssemblerState::Empty,
            Some(&declared) => AssemblerState::Accumulating {
                declared: usize::from(declared),
                buffered: self.buffer.len(),
            },
        }
    }

    /// Bytes of the frame in progress
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop the frame in progress
    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slice a stream wherever the running buffer length equals its first byte
    fn reference_slices(stream: &[u8]) -> (Vec<Vec<u8>>, Vec<u8>) {
        let mut frames = Vec::new();
        let mut current = Vec::new();
        for &byte in stream {
            current.push(byte);
            if current[0] as usize == current.len() {
                frames.push(std::mem::take(&mut current));
            }
        }
        (frames, current)
    }

    #[test]
    fn test_single_frame() {
        let mut assembler = FrameAssembler::new();
        let frame = [0x06, 0x04, 0x8e, 0x00, 0x03, 0x8f];

        for &byte in &frame[..5] {
            assert!(assembler.push(byte).is_none());
        }
        assert_eq!(
            assembler.state(),
            AssemblerState::Accumulating {
                declared: 6,
                buffered: 5
            }
        );

        let emitted = assembler.push(frame[5]).unwrap();
        assert_eq!(&emitted[..], &frame);
        assert_eq!(assembler.state(), AssemblerState::Empty);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut assembler = FrameAssembler::new();
        let stream = [
            0x06, 0x04, 0x80, 0x00, 0x01, 0x83, // power on
            0x01, // degenerate one-byte frame
            0x04, 0x04, 0x0e, 0x0e,
        ];
        let frames = assembler.extend(&stream);
        assert_eq!(frames.len(), 3);
        assert_eq!(&frames[0][..], &stream[..6]);
        assert_eq!(&frames[1][..], &[0x01]);
        assert_eq!(&frames[2][..], &stream[7..]);
        assert!(assembler.buffered().is_empty());
    }

    #[test]
    fn test_split_across_chunks() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.extend(&[0x06, 0x04]).is_empty());
        assert!(assembler.extend(&[0x8e, 0x00]).is_empty());
        let frames = assembler.extend(&[0x03, 0x8f, 0x06]);
        assert_eq!(frames.len(), 1);
        assert_eq!(assembler.buffered(), &[0x06]);
    }

    #[test]
    fn test_zero_length_never_completes() {
        let mut assembler = FrameAssembler::new();
        let frames = assembler.extend(&[0x00; 300]);
        assert!(frames.is_empty());
        assert_eq!(assembler.buffered().len(), 300);
        assembler.reset();
        assert_eq!(assembler.state(), AssemblerState::Empty);
    }

    #[test]
    fn test_matches_reference_slicing() {
        // pseudo-random stream from a small LCG
        let mut seed: u32 = 0x1234_5678;
        let mut stream = Vec::new();
        for _ in 0..4096 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let byte = (seed >> 16) as u8;
            // keep declared lengths small so frames actually complete
            stream.push(if stream.len() % 7 == 0 { byte % 12 + 1 } else { byte });
        }

        let mut assembler = FrameAssembler::new();
        let emitted: Vec<Vec<u8>> = assembler
            .extend(&stream)
            .into_iter()
            .map(|frame| frame.to_vec())
            .collect();
        let (expected, leftover) = reference_slices(&stream);

        assert_eq!(emitted, expected);
        assert_eq!(assembler.buffered(), leftover.as_slice());
        let total: usize = emitted.iter().map(Vec::len).sum::<usize>() + leftover.len();
        assert_eq!(total, stream.len());
    }
}
