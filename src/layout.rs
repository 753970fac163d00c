use crate::error::{EdfError, Result};
use crate::types::SignalMetadata;
use crate::{BYTES_PER_SAMPLE, HEADER_BLOCK_SIZE};

/// Byte layout of the data record region.
///
/// `signal_byte_offsets` has one entry per signal plus a trailing sentinel
/// equal to the data record size, so signal `i` occupies
/// `offsets[i]..offsets[i + 1]` inside every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    signal_byte_offsets: Vec<usize>,
    num_data_records: usize,
}

impl Layout {
    /// Computes the layout for `signals` and resolves the record count.
    ///
    /// A declared count of `-1` is inferred from `total_file_size`; any other
    /// value is taken as written.
    pub fn resolve(
        signals: &[SignalMetadata],
        declared_records: i64,
        total_file_size: usize,
    ) -> Result<Self> {
        let signal_byte_offsets = signal_byte_offsets(signals)?;
        let data_record_size = *signal_byte_offsets.last().unwrap_or(&0);

        let num_data_records = if declared_records == -1 {
            let inferred = infer_record_count(total_file_size, signals.len(), data_record_size)?;
            log::info!(
                "Record count not declared, inferred {} records of {} bytes from file size",
                inferred,
                data_record_size
            );
            inferred
        } else {
            usize::try_from(declared_records)
                .map_err(|_| EdfError::malformed("num_data_records", &declared_records.to_string()))?
        };

        let layout = Layout {
            signal_byte_offsets,
            num_data_records,
        };
        // reject counts whose region size cannot be addressed
        layout.checked_region_size()?;

        log::debug!(
            "Layout: {} signals, {} bytes per record, {} records",
            signals.len(),
            data_record_size,
            num_data_records
        );
        Ok(layout)
    }

    pub fn signal_byte_offsets(&self) -> &[usize] {
        &self.signal_byte_offsets
    }

    pub fn num_signals(&self) -> usize {
        self.signal_byte_offsets.len() - 1
    }

    pub fn data_record_size(&self) -> usize {
        *self.signal_byte_offsets.last().unwrap_or(&0)
    }

    pub fn num_data_records(&self) -> usize {
        self.num_data_records
    }

    /// Byte range of `signal` relative to the start of a record.
    pub fn signal_range(&self, signal: usize) -> Option<(usize, usize)> {
        let start = *self.signal_byte_offsets.get(signal)?;
        let stop = *self.signal_byte_offsets.get(signal + 1)?;
        Some((start, stop))
    }

    /// Total size of the data record region.
    pub fn region_size(&self) -> usize {
        self.num_data_records * self.data_record_size()
    }

    fn checked_region_size(&self) -> Result<usize> {
        self.num_data_records
            .checked_mul(self.data_record_size())
            .ok_or_else(|| EdfError::malformed("num_data_records", &self.num_data_records.to_string()))
    }
}

/// Size of both header blocks for `num_signals` signals.
pub fn header_size(num_signals: usize) -> usize {
    HEADER_BLOCK_SIZE + HEADER_BLOCK_SIZE * num_signals
}

/// Cumulative per-signal byte offsets with a trailing record-size sentinel.
pub fn signal_byte_offsets(signals: &[SignalMetadata]) -> Result<Vec<usize>> {
    let mut offsets = Vec::with_capacity(signals.len() + 1);
    let mut offset = 0usize;
    offsets.push(offset);
    for signal in signals {
        offset = signal
            .num_samples
            .checked_mul(BYTES_PER_SAMPLE)
            .and_then(|width| offset.checked_add(width))
            .ok_or_else(|| EdfError::malformed("num_samples", &signal.num_samples.to_string()))?;
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Infers the record count of a file whose header declared it as unknown.
///
/// Everything after the header must divide into whole records.
pub fn infer_record_count(
    total_file_size: usize,
    num_signals: usize,
    data_record_size: usize,
) -> Result<usize> {
    let header_size = header_size(num_signals);
    let remaining = total_file_size
        .checked_sub(header_size)
        .ok_or(EdfError::TruncatedInput {
            expected: header_size,
            remaining: total_file_size,
        })?;

    if data_record_size == 0 || remaining % data_record_size != 0 {
        return Err(EdfError::InconsistentFileSize {
            remaining,
            record_size: data_record_size,
        });
    }
    Ok(remaining / data_record_size)
}
