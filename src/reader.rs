use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::cursor::ByteCursor;
use crate::error::{EdfError, IndexKind, Result};
use crate::header::decode_header;
use crate::layout::{header_size, Layout};
use crate::store::RecordStore;
use crate::transform::{decode_annotation_text, time_axis, LinearScale};
use crate::types::{FileMetadata, SignalMetadata};

/// A fully decoded EDF recording.
///
/// An `Experiment` is built once from a complete byte source and never
/// changes afterwards. Header fields are decoded eagerly; sample data stays
/// in its on-disk form and is only converted for the signal and records a
/// query asks for. All accessors take `&self`, so one `Experiment` can be
/// shared between threads without locking.
///
/// # Examples
///
/// ## Basic usage
///
/// ```rust
/// use edfview::Experiment;
///
/// # // Generate test file (hidden from docs)
/// # let dir = tempfile::tempdir()?;
/// # let path = dir.path().join("recording.edf");
/// # edfview::doctest_utils::create_simple_test_file(&path)?;
/// #
/// let experiment = Experiment::open(&path)?;
///
/// println!("Patient: {}", experiment.file_metadata().patient_id);
/// println!("Records: {}", experiment.record_count());
///
/// for (index, label) in experiment.list_signals() {
///     let rows = experiment.samples(index, &[0])?;
///     println!("{}: {} samples in record 0", label, rows[0].len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// ## Reading annotations
///
/// ```rust
/// use edfview::Experiment;
///
/// # let bytes = edfview::doctest_utils::simple_fixture().to_bytes();
/// let experiment = Experiment::from_bytes(bytes)?;
///
/// for record in 0..experiment.record_count() {
///     let text = experiment.annotations(record)?;
///     if !text.is_empty() {
///         println!("record {}: {:?}", record, text);
///     }
/// }
/// # Ok::<(), edfview::EdfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Experiment {
    file_metadata: FileMetadata,
    signals: Vec<SignalMetadata>,
    annotations_index: Option<usize>,
    store: RecordStore,
}

impl Experiment {
    /// Opens and decodes an EDF file from disk.
    ///
    /// The whole file is read into memory before decoding starts.
    ///
    /// # Errors
    ///
    /// * `EdfError::FileNotFound` - the file doesn't exist or can't be opened
    /// * any decode error listed on [`Experiment::from_bytes`]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .map_err(|e| EdfError::FileNotFound(format!("{}: {}", path.as_ref().display(), e)))?;
        log::debug!("Reading EDF file {}", path.as_ref().display());
        Self::from_reader(BufReader::new(file))
    }

    /// Reads `reader` to the end and decodes the result.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Decodes a base64 payload, as delivered by browser upload widgets.
    ///
    /// A leading `data:<mime>;base64,` prefix is stripped if present, and
    /// whitespace inside the payload (line-wrapped MIME output) is skipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use base64::Engine;
    /// use edfview::Experiment;
    ///
    /// let bytes = edfview::doctest_utils::two_signal_fixture().to_bytes();
    /// let upload = format!(
    ///     "data:application/octet-stream;base64,{}",
    ///     base64::engine::general_purpose::STANDARD.encode(&bytes)
    /// );
    ///
    /// let experiment = Experiment::from_base64(&upload)?;
    /// assert_eq!(experiment.record_count(), 3);
    /// # Ok::<(), edfview::EdfError>(())
    /// ```
    pub fn from_base64(content: &str) -> Result<Self> {
        use base64::Engine;

        let content = content.trim();
        let payload = match content.split_once(',') {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => content,
        };
        let payload: Vec<u8> = payload
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        Self::from_bytes(bytes)
    }

    /// Decodes a complete EDF file held in memory.
    ///
    /// # Errors
    ///
    /// * `EdfError::TruncatedInput` - the file ends inside the header or a data record
    /// * `EdfError::EncodingError` - the header contains non-ASCII bytes
    /// * `EdfError::MalformedField` - a numeric header field doesn't parse
    /// * `EdfError::InconsistentFileSize` - an unknown record count can't be inferred
    /// * `EdfError::TrailingData` - bytes follow the last data record
    ///
    /// Decoding is all or nothing; no partial `Experiment` is returned.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (file_metadata, signals, layout, region) = {
            let mut cursor = ByteCursor::new(&bytes);
            let (file_metadata, signals) = decode_header(&mut cursor)?;
            let layout = Layout::resolve(&signals, file_metadata.num_data_records, cursor.total_size())?;
            let region = RecordStore::claim_region(&mut cursor, &layout)?;
            (file_metadata, signals, layout, region)
        };

        let annotations_index = signals.iter().position(SignalMetadata::is_annotation);
        if let Some(index) = annotations_index {
            log::debug!("Annotations channel at signal {}", index);
        }

        Ok(Experiment {
            file_metadata,
            signals,
            annotations_index,
            store: RecordStore::new(bytes, region, layout)?,
        })
    }

    pub fn file_metadata(&self) -> &FileMetadata {
        &self.file_metadata
    }

    /// All signals in file order, the annotations channel included.
    pub fn signals(&self) -> &[SignalMetadata] {
        &self.signals
    }

    pub fn signal_metadata(&self, signal: usize) -> Result<&SignalMetadata> {
        self.signals.get(signal).ok_or(EdfError::IndexOutOfRange {
            kind: IndexKind::Signal,
            index: signal,
            len: self.signals.len(),
        })
    }

    /// `(index, label)` of every waveform signal.
    ///
    /// The annotations channel is left out; indexes are positions in
    /// [`Experiment::signals`], so they can be passed straight to
    /// [`Experiment::samples`].
    pub fn list_signals(&self) -> Vec<(usize, &str)> {
        self.signals
            .iter()
            .enumerate()
            .filter(|(_, signal)| !signal.is_annotation())
            .map(|(index, signal)| (index, signal.label.as_str()))
            .collect()
    }

    pub fn annotations_index(&self) -> Option<usize> {
        self.annotations_index
    }

    /// Number of data records, inferred from the file size when the header
    /// left it unknown.
    pub fn record_count(&self) -> usize {
        self.store.num_records()
    }

    pub fn layout(&self) -> &Layout {
        self.store.layout()
    }

    pub fn data_record_size(&self) -> usize {
        self.layout().data_record_size()
    }

    pub fn header_size(&self) -> usize {
        header_size(self.signals.len())
    }

    /// Recording length in seconds.
    pub fn file_duration(&self) -> f64 {
        self.record_count() as f64 * self.file_metadata.data_record_duration
    }

    /// Time offsets in seconds of the samples of `signal` within one record.
    ///
    /// The axis has `num_samples` points spaced `duration / num_samples`
    /// apart, starting at zero and stopping short of the record duration.
    pub fn time_series(&self, signal: usize) -> Result<Vec<f64>> {
        let metadata = self.signal_metadata(signal)?;
        Ok(time_axis(self.file_metadata.data_record_duration, metadata.num_samples))
    }

    fn waveform(&self, signal: usize) -> Result<&SignalMetadata> {
        let metadata = self.signal_metadata(signal)?;
        if metadata.is_annotation() {
            return Err(EdfError::AnnotationSignal(signal));
        }
        Ok(metadata)
    }

    /// Raw digital samples of `signal`, one row per requested record.
    pub fn digital_samples(&self, signal: usize, records: &[usize]) -> Result<Vec<Vec<i16>>> {
        self.waveform(signal)?;
        self.store.extract(signal, records)
    }

    /// Physical values of `signal`, one row of `num_samples` values per
    /// requested record.
    ///
    /// Rows follow the order of `records`, duplicates included.
    ///
    /// # Errors
    ///
    /// * `EdfError::IndexOutOfRange` - `signal` or one of `records` doesn't exist
    /// * `EdfError::AnnotationSignal` - `signal` is the annotations channel; use
    ///   [`Experiment::annotations`] instead
    /// * `EdfError::DegenerateRange` - the signal's digital min equals its digital max
    ///
    /// # Examples
    ///
    /// ```rust
    /// use edfview::Experiment;
    ///
    /// # let bytes = edfview::doctest_utils::two_signal_fixture().to_bytes();
    /// let experiment = Experiment::from_bytes(bytes)?;
    ///
    /// let rows = experiment.samples(1, &[2, 0])?;
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows[1], vec![0.0, 10.0]);
    ///
    /// // out of range indexes are an error, never an empty result
    /// assert!(experiment.samples(2, &[0]).is_err());
    /// # Ok::<(), edfview::EdfError>(())
    /// ```
    pub fn samples(&self, signal: usize, records: &[usize]) -> Result<Vec<Vec<f64>>> {
        let metadata = self.waveform(signal)?;
        let scale = LinearScale::from_signal(metadata).ok_or(EdfError::DegenerateRange { signal })?;
        let digital = self.store.extract(signal, records)?;
        Ok(digital.iter().map(|row| scale.apply(row)).collect())
    }

    /// Annotation text of one record, or an empty string when the file has
    /// no annotations channel.
    pub fn annotations(&self, record: usize) -> Result<String> {
        match self.annotations_index {
            Some(signal) => Ok(decode_annotation_text(self.store.slice(record, signal)?)),
            None => {
                self.store.record(record)?;
                Ok(String::new())
            }
        }
    }

    /// Annotation text of every record in order.
    pub fn all_annotations(&self) -> Result<Vec<String>> {
        (0..self.record_count()).map(|record| self.annotations(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{simple_fixture, two_signal_fixture};

    #[test]
    fn test_experiment_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Experiment>();
    }

    #[test]
    fn test_accessors() {
        let experiment = Experiment::from_bytes(two_signal_fixture().to_bytes()).unwrap();
        assert_eq!(experiment.record_count(), 3);
        assert_eq!(experiment.header_size(), 768);
        assert_eq!(experiment.data_record_size(), 12);
        assert_eq!(experiment.layout().signal_byte_offsets(), &[0, 8, 12]);
        assert_eq!(experiment.file_duration(), 3.0);
        assert_eq!(experiment.annotations_index(), None);
        assert_eq!(experiment.signal_metadata(1).unwrap().label, "Resp oro-nasal");
        assert!(experiment.signal_metadata(2).is_err());
    }

    #[test]
    fn test_annotations_without_channel() {
        let experiment = Experiment::from_bytes(two_signal_fixture().to_bytes()).unwrap();
        assert_eq!(experiment.annotations(0).unwrap(), "");
        assert!(matches!(
            experiment.annotations(3),
            Err(EdfError::IndexOutOfRange { kind: IndexKind::Record, .. })
        ));
    }

    #[test]
    fn test_annotation_channel_is_not_a_waveform() {
        let experiment = Experiment::from_bytes(simple_fixture().to_bytes()).unwrap();
        assert_eq!(experiment.annotations_index(), Some(1));
        assert!(matches!(experiment.samples(1, &[0]), Err(EdfError::AnnotationSignal(1))));
        assert!(matches!(experiment.digital_samples(1, &[0]), Err(EdfError::AnnotationSignal(1))));
        assert_eq!(experiment.annotations(0).unwrap(), "+0\x14Lights off\x14");
    }

    #[test]
    fn test_degenerate_range_is_local_to_query() {
        let mut fixture = two_signal_fixture();
        fixture.signals[1].digital_min = 7;
        fixture.signals[1].digital_max = 7;
        let experiment = Experiment::from_bytes(fixture.to_bytes()).unwrap();

        assert!(matches!(experiment.samples(1, &[0]), Err(EdfError::DegenerateRange { signal: 1 })));
        assert_eq!(experiment.digital_samples(1, &[0]).unwrap(), vec![vec![0, 1000]]);
        assert!(experiment.samples(0, &[0]).is_ok());
    }
}
