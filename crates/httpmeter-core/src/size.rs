//! Byte-counting write sink.

use std::io;

/// A `Write` sink that keeps only the number of bytes handed to it.
///
/// Used to measure a serialized request without allocating the serialized
/// form. Writes never fail and the total is cumulative across calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct SizeCounter {
    size: u64,
}

impl SizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes written so far.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl io::Write for SizeCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let l = buf.len();
        self.size += l as u64;
        Ok(l)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
