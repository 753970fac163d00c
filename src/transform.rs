use crate::types::SignalMetadata;

/// Linear digital-to-physical mapping of one signal.
///
/// `physical = physical_min + (digital - digital_min) * scale` with
/// `scale = (physical_max - physical_min) / (digital_max - digital_min)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    physical_min: f64,
    digital_min: f64,
    scale: f64,
}

impl LinearScale {
    /// Returns `None` when the digital range is empty and no mapping exists.
    pub fn from_signal(signal: &SignalMetadata) -> Option<Self> {
        let digital_range = signal.digital_max as f64 - signal.digital_min as f64;
        if digital_range == 0.0 {
            return None;
        }
        Some(LinearScale {
            physical_min: signal.physical_min,
            digital_min: signal.digital_min as f64,
            scale: (signal.physical_max - signal.physical_min) / digital_range,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_physical(&self, digital: i16) -> f64 {
        self.physical_min + (digital as f64 - self.digital_min) * self.scale
    }

    pub fn apply(&self, digital: &[i16]) -> Vec<f64> {
        digital.iter().map(|&d| self.to_physical(d)).collect()
    }
}

/// Sample offsets in seconds within one data record.
///
/// Covers `[0, duration)` in `num_samples` equal steps; the record end
/// itself is never included.
pub fn time_axis(data_record_duration: f64, num_samples: usize) -> Vec<f64> {
    if num_samples == 0 {
        return Vec::new();
    }
    let period = data_record_duration / num_samples as f64;
    (0..num_samples).map(|i| i as f64 * period).collect()
}

/// Decodes the raw bytes of an annotations channel into text.
///
/// Text ends at the first NUL byte. Bytes outside 7-bit ASCII are dropped
/// rather than failing the decode; a warning is logged when that happens.
pub fn decode_annotation_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text: String = bytes[..end]
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect();

    let dropped = end - text.len();
    if dropped > 0 {
        log::warn!("Dropped {} non-ASCII bytes from annotation text", dropped);
    }
    text
}

/// Same as [`decode_annotation_text`], starting from the channel's samples.
pub fn decode_annotation_samples(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    decode_annotation_text(&bytes)
}
