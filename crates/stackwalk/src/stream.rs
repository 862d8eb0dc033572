//! Framed codec for the stack stream.
//!
//! Stacks travel as a flat sequence of fixed-width little-endian `u16`
//! words: each stack is its package ids in admission order followed by one
//! [`STREAM_DELIMITER`] word, and a single [`STREAM_STOP`] word closes the
//! stream after the last stack. In-band sentinels are used instead of
//! length prefixes because the producer does not know a stack's length
//! until the stack is final and wants to write incrementally.

use std::io::{self, Read, Write};

use crate::error::{Result, WalkError};
use crate::graph::PackageId;

/// In-band word separating one stack from the next.
pub const STREAM_DELIMITER: PackageId = PackageId::MAX - 1;

/// In-band word closing the whole stream.
pub const STREAM_STOP: PackageId = PackageId::MAX;

/// Size in bytes of one stream word, for readers decoding the raw bytes.
pub const ITEM_SIZE: usize = std::mem::size_of::<PackageId>();

/// Writes finished stacks to a byte sink.
///
/// Writes are raw and unbuffered, so when the sink is a pipe a slow reader
/// back-pressures the producer directly.
#[derive(Debug)]
pub struct StackWriter<W: Write> {
    sink: W,
}

impl<W: Write> StackWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Write one finished stack followed by the stack delimiter.
    pub fn write_stack(&mut self, packages: &[PackageId]) -> io::Result<()> {
        for &package in packages {
            self.write_word(package)?;
        }
        self.write_word(STREAM_DELIMITER)
    }

    /// Write the end-of-stream marker.
    pub fn write_stop(&mut self) -> io::Result<()> {
        self.write_word(STREAM_STOP)
    }

    fn write_word(&mut self, word: PackageId) -> io::Result<()> {
        self.sink.write_all(&word.to_le_bytes())
    }
}

/// Decodes a stack stream produced by [`StackWriter`].
///
/// This is the consumer half of the wire format, used by hosts reading the
/// producer's pipe and by the integration tests.
#[derive(Debug)]
pub struct StackReader<R: Read> {
    source: R,
}

impl<R: Read> StackReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Read the next stack from the stream.
    ///
    /// Returns `Ok(None)` at the stop marker. End of file before the stop
    /// marker means the producer died mid-stream and is reported as
    /// [`WalkError::PrematureStreamEnd`].
    pub fn next_stack(&mut self) -> Result<Option<Vec<PackageId>>> {
        let mut stack = Vec::new();
        loop {
            match self.read_word()? {
                STREAM_DELIMITER => return Ok(Some(stack)),
                STREAM_STOP => return Ok(None),
                package => stack.push(package),
            }
        }
    }

    /// Read all remaining stacks up to the stop marker.
    pub fn read_to_stop(&mut self) -> Result<Vec<Vec<PackageId>>> {
        let mut stacks = Vec::new();
        while let Some(stack) = self.next_stack()? {
            stacks.push(stack);
        }
        Ok(stacks)
    }

    fn read_word(&mut self) -> Result<PackageId> {
        let mut buf = [0u8; ITEM_SIZE];
        match self.source.read_exact(&mut buf) {
            Ok(()) => Ok(PackageId::from_le_bytes(buf)),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(WalkError::PrematureStreamEnd)
            }
            Err(err) => Err(err.into()),
        }
    }
}
