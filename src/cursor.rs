use crate::error::{EdfError, Result};

/// Bounds-checked sequential reader over an in-memory byte buffer.
///
/// Reads only ever move forward. The cursor borrows the buffer, so the
/// slices it hands out live as long as the source itself.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, offset: 0 }
    }

    /// Reads exactly `n` bytes and advances past them.
    ///
    /// Fails with [`EdfError::TruncatedInput`] without consuming anything
    /// when fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(EdfError::TruncatedInput {
                expected: n,
                remaining,
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Reads `n` bytes as 7-bit ASCII text.
    pub fn read_ascii(&mut self, n: usize) -> Result<&'a str> {
        let start = self.offset;
        let bytes = self.read_bytes(n)?;
        if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
            // leave the cursor where it was, the caller aborts anyway
            self.offset = start;
            return Err(EdfError::EncodingError { offset: start + pos });
        }
        // ASCII is always valid UTF-8
        std::str::from_utf8(bytes).map_err(|_| EdfError::EncodingError { offset: start })
    }

    pub fn total_size(&self) -> usize {
        self.data.len()
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.data.len()
    }
}
