//! Fixed-width ASCII header decoding.
//!
//! Both header blocks are described by static field tables: a name, a byte
//! width and a store function that parses the text and writes it into the
//! target. The file block fills one [`FileMetadata`]. The signal block is
//! stored field-major on disk (every label, then every transducer type, ...)
//! so it fills one column per field and is transposed into per-signal rows
//! at the end.

use crate::cursor::ByteCursor;
use crate::error::{EdfError, Result};
use crate::types::{FileMetadata, SignalMetadata};
use crate::utils::{parse_float_field, parse_int_field};
use crate::HEADER_BLOCK_SIZE;

type StoreFn<T> = fn(&mut T, &'static str, &str) -> Result<()>;

/// One fixed-width header field.
pub struct FieldSpec<T> {
    pub name: &'static str,
    pub width: usize,
    store: StoreFn<T>,
}

fn text(raw: &str) -> String {
    raw.trim().to_string()
}

fn store_version(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.version = text(t);
    Ok(())
}

fn store_patient_id(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.patient_id = text(t);
    Ok(())
}

fn store_recording_id(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.recording_id = text(t);
    Ok(())
}

fn store_start_date(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.start_date = text(t);
    Ok(())
}

fn store_start_time(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.start_time = text(t);
    Ok(())
}

fn store_header_bytes(m: &mut FileMetadata, n: &'static str, t: &str) -> Result<()> {
    m.num_bytes_header_record = parse_int_field(n, t)?;
    Ok(())
}

fn store_file_reserved(m: &mut FileMetadata, _: &'static str, t: &str) -> Result<()> {
    m.reserved = text(t);
    Ok(())
}

/// `-1` marks an unknown count; anything lower is malformed.
fn store_record_count(m: &mut FileMetadata, n: &'static str, t: &str) -> Result<()> {
    let declared: i64 = parse_int_field(n, t)?;
    if declared < -1 {
        return Err(EdfError::malformed(n, t));
    }
    m.num_data_records = declared;
    Ok(())
}

fn store_record_duration(m: &mut FileMetadata, n: &'static str, t: &str) -> Result<()> {
    m.data_record_duration = parse_float_field(n, t)?;
    Ok(())
}

fn store_num_signals(m: &mut FileMetadata, n: &'static str, t: &str) -> Result<()> {
    m.num_signals = parse_int_field(n, t)?;
    Ok(())
}

pub const FILE_FIELDS: [FieldSpec<FileMetadata>; 10] = [
    FieldSpec { name: "version", width: 8, store: store_version },
    FieldSpec { name: "patient_id", width: 80, store: store_patient_id },
    FieldSpec { name: "recording_id", width: 80, store: store_recording_id },
    FieldSpec { name: "start_date", width: 8, store: store_start_date },
    FieldSpec { name: "start_time", width: 8, store: store_start_time },
    FieldSpec { name: "num_bytes_header_record", width: 8, store: store_header_bytes },
    FieldSpec { name: "reserved", width: 44, store: store_file_reserved },
    FieldSpec { name: "num_data_records", width: 8, store: store_record_count },
    FieldSpec { name: "data_record_duration", width: 8, store: store_record_duration },
    FieldSpec { name: "num_signals", width: 4, store: store_num_signals },
];

/// Column buffers for the field-major signal block.
#[derive(Debug, Default)]
pub struct SignalColumns {
    label: Vec<String>,
    transducer_type: Vec<String>,
    physical_dimension: Vec<String>,
    physical_min: Vec<f64>,
    physical_max: Vec<f64>,
    digital_min: Vec<i32>,
    digital_max: Vec<i32>,
    prefiltering: Vec<String>,
    num_samples: Vec<usize>,
    reserved: Vec<String>,
}

impl SignalColumns {
    fn with_capacity(n: usize) -> Self {
        SignalColumns {
            label: Vec::with_capacity(n),
            transducer_type: Vec::with_capacity(n),
            physical_dimension: Vec::with_capacity(n),
            physical_min: Vec::with_capacity(n),
            physical_max: Vec::with_capacity(n),
            digital_min: Vec::with_capacity(n),
            digital_max: Vec::with_capacity(n),
            prefiltering: Vec::with_capacity(n),
            num_samples: Vec::with_capacity(n),
            reserved: Vec::with_capacity(n),
        }
    }

    /// Transposes the columns into one record per signal.
    fn into_rows(self) -> Vec<SignalMetadata> {
        let mut label = self.label.into_iter();
        let mut transducer_type = self.transducer_type.into_iter();
        let mut physical_dimension = self.physical_dimension.into_iter();
        let mut prefiltering = self.prefiltering.into_iter();
        let mut reserved = self.reserved.into_iter();

        (0..self.num_samples.len())
            .map(|i| SignalMetadata {
                label: label.next().unwrap_or_default(),
                transducer_type: transducer_type.next().unwrap_or_default(),
                physical_dimension: physical_dimension.next().unwrap_or_default(),
                physical_min: self.physical_min[i],
                physical_max: self.physical_max[i],
                digital_min: self.digital_min[i],
                digital_max: self.digital_max[i],
                prefiltering: prefiltering.next().unwrap_or_default(),
                num_samples: self.num_samples[i],
                reserved: reserved.next().unwrap_or_default(),
            })
            .collect()
    }
}

fn push_label(c: &mut SignalColumns, _: &'static str, t: &str) -> Result<()> {
    c.label.push(text(t));
    Ok(())
}

fn push_transducer_type(c: &mut SignalColumns, _: &'static str, t: &str) -> Result<()> {
    c.transducer_type.push(text(t));
    Ok(())
}

fn push_physical_dimension(c: &mut SignalColumns, _: &'static str, t: &str) -> Result<()> {
    c.physical_dimension.push(text(t));
    Ok(())
}

fn push_physical_min(c: &mut SignalColumns, n: &'static str, t: &str) -> Result<()> {
    c.physical_min.push(parse_float_field(n, t)?);
    Ok(())
}

fn push_physical_max(c: &mut SignalColumns, n: &'static str, t: &str) -> Result<()> {
    c.physical_max.push(parse_float_field(n, t)?);
    Ok(())
}

fn push_digital_min(c: &mut SignalColumns, n: &'static str, t: &str) -> Result<()> {
    c.digital_min.push(parse_int_field(n, t)?);
    Ok(())
}

fn push_digital_max(c: &mut SignalColumns, n: &'static str, t: &str) -> Result<()> {
    c.digital_max.push(parse_int_field(n, t)?);
    Ok(())
}

fn push_prefiltering(c: &mut SignalColumns, _: &'static str, t: &str) -> Result<()> {
    c.prefiltering.push(text(t));
    Ok(())
}

fn push_num_samples(c: &mut SignalColumns, n: &'static str, t: &str) -> Result<()> {
    c.num_samples.push(parse_int_field(n, t)?);
    Ok(())
}

fn push_signal_reserved(c: &mut SignalColumns, _: &'static str, t: &str) -> Result<()> {
    c.reserved.push(text(t));
    Ok(())
}

pub const SIGNAL_FIELDS: [FieldSpec<SignalColumns>; 10] = [
    FieldSpec { name: "label", width: 16, store: push_label },
    FieldSpec { name: "transducer_type", width: 80, store: push_transducer_type },
    FieldSpec { name: "physical_dimension", width: 8, store: push_physical_dimension },
    FieldSpec { name: "physical_min", width: 8, store: push_physical_min },
    FieldSpec { name: "physical_max", width: 8, store: push_physical_max },
    FieldSpec { name: "digital_min", width: 8, store: push_digital_min },
    FieldSpec { name: "digital_max", width: 8, store: push_digital_max },
    FieldSpec { name: "prefiltering", width: 80, store: push_prefiltering },
    FieldSpec { name: "num_samples", width: 8, store: push_num_samples },
    FieldSpec { name: "reserved", width: 32, store: push_signal_reserved },
];

/// Total on-disk width of a field table.
pub fn table_width<T>(fields: &[FieldSpec<T>]) -> usize {
    fields.iter().map(|f| f.width).sum()
}

/// Decodes the 256-byte file header block.
pub fn decode_file_metadata(cursor: &mut ByteCursor<'_>) -> Result<FileMetadata> {
    let mut meta = FileMetadata::default();
    for field in FILE_FIELDS.iter() {
        let raw = cursor.read_ascii(field.width)?;
        (field.store)(&mut meta, field.name, raw)?;
    }
    Ok(meta)
}

/// Decodes the signal header block for `num_signals` signals.
pub fn decode_signal_metadata(
    cursor: &mut ByteCursor<'_>,
    num_signals: usize,
) -> Result<Vec<SignalMetadata>> {
    let mut columns = SignalColumns::with_capacity(num_signals);
    for field in SIGNAL_FIELDS.iter() {
        for _ in 0..num_signals {
            let raw = cursor.read_ascii(field.width)?;
            (field.store)(&mut columns, field.name, raw)?;
        }
    }
    Ok(columns.into_rows())
}

/// Decodes both header blocks, leaving the cursor on the first data record.
pub fn decode_header(cursor: &mut ByteCursor<'_>) -> Result<(FileMetadata, Vec<SignalMetadata>)> {
    let file_metadata = decode_file_metadata(cursor)?;
    log::debug!(
        "EDF header: version {:?}, {} signals, {} data records declared",
        file_metadata.version,
        file_metadata.num_signals,
        file_metadata.num_data_records
    );

    let signals = decode_signal_metadata(cursor, file_metadata.num_signals)?;

    let expected = (file_metadata.num_signals as i64 + 1) * HEADER_BLOCK_SIZE as i64;
    if file_metadata.num_bytes_header_record != expected {
        log::warn!(
            "Header declares {} bytes but {} signals occupy {} bytes",
            file_metadata.num_bytes_header_record,
            file_metadata.num_signals,
            expected
        );
    }

    Ok((file_metadata, signals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{pad, EdfFixture, FixtureSignal};

    #[test]
    fn test_tables_cover_one_block() {
        assert_eq!(table_width(&FILE_FIELDS), HEADER_BLOCK_SIZE);
        assert_eq!(table_width(&SIGNAL_FIELDS), HEADER_BLOCK_SIZE);
    }

    #[test]
    fn test_decode_file_metadata() {
        let bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG Fpz-Cz", 4))
            .to_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        let meta = decode_file_metadata(&mut cursor).unwrap();

        assert_eq!(cursor.position(), HEADER_BLOCK_SIZE);
        assert_eq!(meta.version, "0");
        assert_eq!(meta.patient_id, "X X X X");
        assert_eq!(meta.start_date, "01.01.24");
        assert_eq!(meta.start_time, "12.00.00");
        assert_eq!(meta.num_bytes_header_record, 512);
        assert_eq!(meta.num_data_records, 0);
        assert_eq!(meta.data_record_duration, 1.0);
        assert_eq!(meta.num_signals, 1);
    }

    #[test]
    fn test_signal_block_is_field_major() {
        let bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG Fpz-Cz", 100).with_dimension("uV"))
            .with_signal(
                FixtureSignal::waveform("Resp", 1)
                    .with_dimension("mV")
                    .with_ranges(-2048, 2047, -500.0, 500.0),
            )
            .to_bytes();

        // labels of both signals come first, back to back
        let block = &bytes[HEADER_BLOCK_SIZE..];
        assert_eq!(&block[..16], pad("EEG Fpz-Cz", 16).as_bytes());
        assert_eq!(&block[16..32], pad("Resp", 16).as_bytes());

        let mut cursor = ByteCursor::new(&bytes);
        let (meta, signals) = decode_header(&mut cursor).unwrap();
        assert_eq!(meta.num_signals, 2);
        assert_eq!(cursor.position(), 3 * HEADER_BLOCK_SIZE);

        assert_eq!(signals[0].label, "EEG Fpz-Cz");
        assert_eq!(signals[0].physical_dimension, "uV");
        assert_eq!(signals[0].num_samples, 100);
        assert_eq!(signals[1].label, "Resp");
        assert_eq!(signals[1].physical_dimension, "mV");
        assert_eq!(signals[1].digital_min, -2048);
        assert_eq!(signals[1].digital_max, 2047);
        assert_eq!(signals[1].physical_min, -500.0);
        assert_eq!(signals[1].physical_max, 500.0);
        assert_eq!(signals[1].num_samples, 1);
    }

    #[test]
    fn test_non_numeric_field_is_malformed() {
        let mut bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG", 4))
            .to_bytes();
        // num_signals lives in the last four bytes of the file block
        bytes[252..256].copy_from_slice(b"ab  ");
        let mut cursor = ByteCursor::new(&bytes);
        match decode_header(&mut cursor) {
            Err(EdfError::MalformedField { field, value }) => {
                assert_eq!(field, "num_signals");
                assert_eq!(value, "ab  ");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_negative_sample_count_is_malformed() {
        let bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG", 4))
            .to_bytes();
        let mut bytes = bytes;
        // num_samples for a single signal starts 216 bytes into the signal block
        let start = HEADER_BLOCK_SIZE + 216;
        bytes[start..start + 8].copy_from_slice(pad("-4", 8).as_bytes());
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(
            decode_header(&mut cursor),
            Err(EdfError::MalformedField { field: "num_samples", .. })
        ));
    }

    #[test]
    fn test_record_count_below_unknown_is_malformed() {
        let bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG", 4))
            .with_declared_records(-2)
            .to_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        assert!(matches!(
            decode_file_metadata(&mut cursor),
            Err(EdfError::MalformedField { field: "num_data_records", .. })
        ));
    }

    #[test]
    fn test_truncated_signal_block() {
        let bytes = EdfFixture::new()
            .with_signal(FixtureSignal::waveform("EEG", 4))
            .to_bytes();
        let mut cursor = ByteCursor::new(&bytes[..HEADER_BLOCK_SIZE + 100]);
        assert!(matches!(
            decode_header(&mut cursor),
            Err(EdfError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_zero_signals() {
        let bytes = EdfFixture::new().to_bytes();
        let mut cursor = ByteCursor::new(&bytes);
        let (meta, signals) = decode_header(&mut cursor).unwrap();
        assert_eq!(meta.num_signals, 0);
        assert!(signals.is_empty());
        assert!(cursor.at_end());
    }
}
