// Internal utilities for documentation tests
// Builds synthetic EDF files in memory so doctests and tests need no fixtures on disk

use std::path::Path;

use crate::{Result, ANNOTATION_LABEL};

/// Left-aligns `value` in a space-padded field of `width` bytes.
pub fn pad(value: &str, width: usize) -> String {
    let mut field = format!("{:<width$}", value, width = width);
    field.truncate(width);
    field
}

/// One signal of a synthetic file.
#[derive(Debug, Clone)]
pub struct FixtureSignal {
    pub label: String,
    pub transducer_type: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefiltering: String,
    pub num_samples: usize,
}

impl FixtureSignal {
    /// A full-range 16-bit waveform mapped onto +/-100 uV.
    pub fn waveform(label: &str, num_samples: usize) -> Self {
        FixtureSignal {
            label: label.to_string(),
            transducer_type: "AgAgCl electrode".to_string(),
            physical_dimension: "uV".to_string(),
            physical_min: -100.0,
            physical_max: 100.0,
            digital_min: -32768,
            digital_max: 32767,
            prefiltering: "HP:0.1Hz LP:70Hz".to_string(),
            num_samples,
        }
    }

    /// An `EDF Annotations` channel holding `num_samples * 2` text bytes per record.
    pub fn annotations(num_samples: usize) -> Self {
        FixtureSignal {
            label: ANNOTATION_LABEL.to_string(),
            transducer_type: String::new(),
            physical_dimension: String::new(),
            physical_min: -1.0,
            physical_max: 1.0,
            digital_min: -32768,
            digital_max: 32767,
            prefiltering: String::new(),
            num_samples,
        }
    }

    pub fn with_dimension(mut self, dimension: &str) -> Self {
        self.physical_dimension = dimension.to_string();
        self
    }

    pub fn with_ranges(mut self, digital_min: i32, digital_max: i32, physical_min: f64, physical_max: f64) -> Self {
        self.digital_min = digital_min;
        self.digital_max = digital_max;
        self.physical_min = physical_min;
        self.physical_max = physical_max;
        self
    }
}

/// Packs annotation text into the samples of an annotations channel,
/// NUL-padded to `num_samples * 2` bytes.
pub fn annotation_samples(text: &str, num_samples: usize) -> Vec<i16> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(num_samples * 2, 0);
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Builder for a complete EDF file.
#[derive(Debug, Clone)]
pub struct EdfFixture {
    pub patient_id: String,
    pub recording_id: String,
    pub start_date: String,
    pub start_time: String,
    pub record_duration: f64,
    pub declared_records: Option<i64>,
    pub signals: Vec<FixtureSignal>,
    /// Per record, per signal samples.
    pub records: Vec<Vec<Vec<i16>>>,
}

impl Default for EdfFixture {
    fn default() -> Self {
        EdfFixture {
            patient_id: "X X X X".to_string(),
            recording_id: "Startdate 01-JAN-2024 X X X".to_string(),
            start_date: "01.01.24".to_string(),
            start_time: "12.00.00".to_string(),
            record_duration: 1.0,
            declared_records: None,
            signals: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl EdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signal(mut self, signal: FixtureSignal) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn with_record(mut self, samples: Vec<Vec<i16>>) -> Self {
        self.records.push(samples);
        self
    }

    /// Overrides the record count written to the header; defaults to the
    /// number of records added.
    pub fn with_declared_records(mut self, declared: i64) -> Self {
        self.declared_records = Some(declared);
        self
    }

    pub fn with_record_duration(mut self, seconds: f64) -> Self {
        self.record_duration = seconds;
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.signals.len();
        let declared = self.declared_records.unwrap_or(self.records.len() as i64);

        let mut header = String::new();
        header.push_str(&pad("0", 8));
        header.push_str(&pad(&self.patient_id, 80));
        header.push_str(&pad(&self.recording_id, 80));
        header.push_str(&pad(&self.start_date, 8));
        header.push_str(&pad(&self.start_time, 8));
        header.push_str(&pad(&((n + 1) * 256).to_string(), 8));
        header.push_str(&pad("", 44));
        header.push_str(&pad(&declared.to_string(), 8));
        header.push_str(&pad(&self.record_duration.to_string(), 8));
        header.push_str(&pad(&n.to_string(), 4));

        let columns: [(usize, fn(&FixtureSignal) -> String); 10] = [
            (16, |s| s.label.clone()),
            (80, |s| s.transducer_type.clone()),
            (8, |s| s.physical_dimension.clone()),
            (8, |s| s.physical_min.to_string()),
            (8, |s| s.physical_max.to_string()),
            (8, |s| s.digital_min.to_string()),
            (8, |s| s.digital_max.to_string()),
            (80, |s| s.prefiltering.clone()),
            (8, |s| s.num_samples.to_string()),
            (32, |_| String::new()),
        ];
        for (width, value) in columns.iter() {
            for signal in &self.signals {
                header.push_str(&pad(&value(signal), *width));
            }
        }

        let mut bytes = header.into_bytes();
        for record in &self.records {
            for samples in record {
                for sample in samples {
                    bytes.extend_from_slice(&sample.to_le_bytes());
                }
            }
        }
        bytes
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

/// Two waveform signals (4 and 2 samples per record) over three records,
/// with distinct digital values in every slot.
pub fn two_signal_fixture() -> EdfFixture {
    EdfFixture::new()
        .with_signal(FixtureSignal::waveform("EEG Fpz-Cz", 4))
        .with_signal(
            FixtureSignal::waveform("Resp oro-nasal", 2)
                .with_dimension("mV")
                .with_ranges(0, 1000, 0.0, 10.0),
        )
        .with_record(vec![vec![-32768, 0, 32767, 100], vec![0, 1000]])
        .with_record(vec![vec![1, 2, 3, 4], vec![500, 250]])
        .with_record(vec![vec![-1, -2, -3, -4], vec![1, 999]])
}

/// Writes a small recording with one EEG channel and an annotations channel.
pub fn create_simple_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    simple_fixture().write_to(path)
}

pub fn simple_fixture() -> EdfFixture {
    let samples: Vec<i16> = (0..256).map(|i| ((i as f64 / 256.0 * 20.0).sin() * 16000.0) as i16).collect();
    EdfFixture::new()
        .with_signal(FixtureSignal::waveform("EEG Fpz-Cz", 256))
        .with_signal(FixtureSignal::annotations(30))
        .with_record(vec![samples.clone(), annotation_samples("+0\x14Lights off\x14", 30)])
        .with_record(vec![samples, annotation_samples("+1\x14Lights on\x14", 30)])
}
