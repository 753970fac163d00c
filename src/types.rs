use chrono::NaiveDateTime;

use crate::error::Result;
use crate::utils::parse_edf_datetime;
use crate::ANNOTATION_LABEL;

/// The fixed 256-byte file header.
///
/// Text fields are kept as written, minus their padding spaces. The raw
/// date/time strings are retained; use [`FileMetadata::start_datetime`]
/// for a parsed timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetadata {
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    /// `dd.mm.yy`
    pub start_date: String,
    /// `hh.mm.ss`
    pub start_time: String,
    pub num_bytes_header_record: i64,
    pub reserved: String,
    /// Declared record count; `-1` when the producer left it unknown.
    pub num_data_records: i64,
    /// Duration of one data record in seconds.
    pub data_record_duration: f64,
    pub num_signals: usize,
}

impl FileMetadata {
    /// Parses the start date and time into a timestamp.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edfview::FileMetadata;
    /// use chrono::Datelike;
    ///
    /// let meta = FileMetadata {
    ///     start_date: "24.04.89".to_string(),
    ///     start_time: "16.13.00".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(meta.start_datetime()?.year(), 1989);
    /// # Ok::<(), edfview::EdfError>(())
    /// ```
    pub fn start_datetime(&self) -> Result<NaiveDateTime> {
        parse_edf_datetime(&self.start_date, &self.start_time)
    }

    /// Whether the header declared the record count as unknown.
    pub fn record_count_unknown(&self) -> bool {
        self.num_data_records == -1
    }
}

/// Per-signal header fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalMetadata {
    pub label: String,
    pub transducer_type: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefiltering: String,
    /// Samples of this signal in each data record.
    pub num_samples: usize,
    pub reserved: String,
}

impl SignalMetadata {
    /// True for the embedded `EDF Annotations` text channel.
    pub fn is_annotation(&self) -> bool {
        self.label == ANNOTATION_LABEL
    }

    /// Bytes this signal occupies inside one data record.
    pub fn bytes_per_record(&self) -> usize {
        self.num_samples * crate::BYTES_PER_SAMPLE
    }

    /// Samples per second, given the file's record duration.
    pub fn sample_rate(&self, data_record_duration: f64) -> f64 {
        self.num_samples as f64 / data_record_duration
    }
}
