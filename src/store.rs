use std::ops::Range;

use crate::cursor::ByteCursor;
use crate::error::{EdfError, IndexKind, Result};
use crate::layout::Layout;

/// Owns the raw data record region and hands out borrowed slices into it.
///
/// Nothing is decoded up front; [`RecordStore::extract`] only touches the
/// bytes of the signal and records it is asked for.
#[derive(Debug, Clone)]
pub struct RecordStore {
    bytes: Vec<u8>,
    region: Range<usize>,
    layout: Layout,
}

impl RecordStore {
    /// Consumes the record region from `cursor` and checks that nothing
    /// follows it.
    ///
    /// Returns the byte range of the region within the cursor's source.
    pub fn claim_region(cursor: &mut ByteCursor<'_>, layout: &Layout) -> Result<Range<usize>> {
        let start = cursor.position();
        cursor.read_bytes(layout.region_size())?;
        if !cursor.at_end() {
            return Err(EdfError::TrailingData {
                remaining: cursor.remaining(),
            });
        }
        Ok(start..cursor.position())
    }

    /// Wraps the full source buffer. `region` comes from
    /// [`RecordStore::claim_region`] over the same bytes and must span
    /// exactly the layout's record region.
    pub(crate) fn new(bytes: Vec<u8>, region: Range<usize>, layout: Layout) -> Result<Self> {
        let expected = layout.region_size();
        if region.start > region.end || region.end > bytes.len() || region.len() != expected {
            return Err(EdfError::TruncatedInput {
                expected,
                remaining: bytes.len().saturating_sub(region.start),
            });
        }
        Ok(RecordStore {
            bytes,
            region,
            layout,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn num_records(&self) -> usize {
        self.layout.num_data_records()
    }

    /// The whole data record region.
    pub fn region(&self) -> &[u8] {
        &self.bytes[self.region.clone()]
    }

    fn check_record(&self, record: usize) -> Result<()> {
        if record >= self.num_records() {
            return Err(EdfError::IndexOutOfRange {
                kind: IndexKind::Record,
                index: record,
                len: self.num_records(),
            });
        }
        Ok(())
    }

    /// Raw bytes of one full data record.
    pub fn record(&self, record: usize) -> Result<&[u8]> {
        self.check_record(record)?;
        let size = self.layout.data_record_size();
        let start = record * size;
        Ok(&self.region()[start..start + size])
    }

    /// Raw bytes of `signal` within `record`.
    pub fn slice(&self, record: usize, signal: usize) -> Result<&[u8]> {
        let (offset, stop) = self.layout.signal_range(signal).ok_or(EdfError::IndexOutOfRange {
            kind: IndexKind::Signal,
            index: signal,
            len: self.layout.num_signals(),
        })?;
        self.check_record(record)?;
        let base = record * self.layout.data_record_size();
        Ok(&self.region()[base + offset..base + stop])
    }

    /// Digital samples of `signal`, one row per entry of `records`.
    ///
    /// Rows follow the order of `records`; duplicates are allowed.
    pub fn extract(&self, signal: usize, records: &[usize]) -> Result<Vec<Vec<i16>>> {
        records
            .iter()
            .map(|&record| self.slice(record, signal).map(decode_samples))
            .collect()
    }
}

/// Reinterprets little-endian byte pairs as signed 16-bit samples.
pub fn decode_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}
