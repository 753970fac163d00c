//! # EDF decoding for Rust
//!
//! A pure Rust decoder for EDF (European Data Format) files, the fixed-layout
//! binary format used for multi-channel biosignal recordings such as
//! polysomnography.
//!
//! A file is decoded once into an [`Experiment`]. The header is parsed
//! eagerly; the data records stay in memory in their on-disk form and are
//! only converted when a signal is requested, so repeated queries are cheap.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfview::{Experiment, Result};
//!
//! fn main() -> Result<()> {
//!     # let bytes = edfview::doctest_utils::simple_fixture().to_bytes();
//!     let experiment = Experiment::from_bytes(bytes)?;
//!
//!     let meta = experiment.file_metadata();
//!     println!("Patient: {}", meta.patient_id);
//!     println!("Started: {} {}", meta.start_date, meta.start_time);
//!     println!("{} records of {} s", experiment.record_count(), meta.data_record_duration);
//!
//!     // Every waveform signal, the annotations channel excluded
//!     for (index, label) in experiment.list_signals() {
//!         let time = experiment.time_series(index)?;
//!         let rows = experiment.samples(index, &[0, 1])?;
//!         println!("{}: {} points per record, {} rows", label, time.len(), rows.len());
//!     }
//!
//!     // Text of the embedded annotations channel
//!     println!("{:?}", experiment.annotations(0)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Physical vs Digital Values
//!
//! EDF stores samples as 16-bit little-endian integers. Each signal declares
//! a digital range and the physical range it maps onto:
//!
//! ```rust
//! use edfview::{LinearScale, SignalMetadata};
//!
//! let signal = SignalMetadata {
//!     label: "EEG Fpz-Cz".to_string(),
//!     physical_min: -100.0,
//!     physical_max: 100.0,
//!     digital_min: -32768,
//!     digital_max: 32767,
//!     num_samples: 100,
//!     ..Default::default()
//! };
//!
//! let scale = LinearScale::from_signal(&signal).expect("non-empty digital range");
//! assert_eq!(scale.to_physical(-32768), -100.0);
//! assert_eq!(scale.to_physical(0), -100.0 + 32768.0 * (200.0 / 65535.0));
//! ```
//!
//! Browser uploads arrive base64 encoded; [`Experiment::from_base64`] accepts
//! them directly, with or without a `data:` URL prefix.

pub mod cursor;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod store;
pub mod transform;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use cursor::ByteCursor;
pub use error::{EdfError, IndexKind, Result};
pub use layout::Layout;
pub use reader::Experiment;
pub use store::RecordStore;
pub use transform::LinearScale;
pub use types::{FileMetadata, SignalMetadata};

/// Size of the file header block and of each signal's share of the signal header.
pub const HEADER_BLOCK_SIZE: usize = 256;
/// Every sample is a little-endian `i16`.
pub const BYTES_PER_SAMPLE: usize = 2;
/// Label of the embedded annotations channel.
pub const ANNOTATION_LABEL: &str = "EDF Annotations";

/// Library version
///
/// # Examples
///
/// ```rust
/// let version = edfview::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
