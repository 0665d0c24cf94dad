/*!
# Neuromask Shared Decoding Library

This crate holds the decoding core used by the Neuromask binary log tools:
locating records inside a raw byte stream and turning each one into a
structured [`Record`].

## Core Types

- [`FrameScanner`] / [`FrameReader`] - marker-based frame synchronization
- [`RawFrame`] - one framed record, markers included
- [`RecordDecoder`] - nibble de-scrambling, header and parameter extraction
- [`Record`] - decoded header fields plus named sensor values

## Modules

- [`scanner`] - byte stream to frame blocks
- [`decoder`] - frame block to record
- [`nibble`] - the nibble-swap transform
- [`tag`] - sensor tag to field name table
- [`rounding`] - half-up decimal rounding of sensor values
- [`record`] - record type and JSON line rendering
- [`diagnostics`] - recoverable decode anomalies and their sinks
- [`encode`] - building framed records (synthetic data and fixtures)
- [`error`] - common error types
*/

pub mod decoder;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod nibble;
pub mod record;
pub mod rounding;
pub mod scanner;
pub mod tag;

// Re-export commonly used types
pub use decoder::{decode_stream, RecordDecoder};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::{DecodeError, Result};
pub use record::{MissingFields, Record, RecordHeader};
pub use scanner::{FrameReader, FrameScanner, RawFrame, ScanState};
pub use tag::FieldTag;

/// Version information for the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol constants
pub mod protocol {
    /// Record start marker as it appears in the stream (0xF0 then 0xAA)
    pub const RECORD_START_MARKER: u16 = 0xF0AA;

    /// Record end marker as it appears in the stream (0xF1 then 0xAA)
    pub const RECORD_END_MARKER: u16 = 0xF1AA;

    /// Start marker bytes in stream order
    pub const RECORD_START: [u8; 2] = RECORD_START_MARKER.to_be_bytes();

    /// End marker bytes in stream order
    pub const RECORD_END: [u8; 2] = RECORD_END_MARKER.to_be_bytes();

    /// Length of either marker in bytes
    pub const MARKER_LEN: usize = 2;

    /// Offset of the little-endian u16 size field
    pub const SIZE_OFFSET: usize = 2;

    /// Offset of the little-endian 24-bit record id
    pub const ID_OFFSET: usize = 4;

    /// Offset of the little-endian u32 timestamp
    pub const TIMESTAMP_OFFSET: usize = 7;

    /// Offset of the first parameter group (tag byte + f32 payload)
    pub const PARAMS_OFFSET: usize = 11;

    /// Length of one parameter group
    pub const PARAM_GROUP_LEN: usize = 5;

    /// Bytes not counted by the declared size: both markers and the size field
    pub const FRAME_OVERHEAD: usize = 6;

    /// Smallest frame that carries a full header
    pub const MIN_FRAME_LEN: usize = PARAMS_OFFSET + MARKER_LEN;

    /// Largest frame the 16-bit size field can describe
    pub const MAX_FRAME_LEN: usize = u16::MAX as usize + FRAME_OVERHEAD;

    /// Decimal places used when no precision is configured
    pub const DEFAULT_FLOAT_PRECISION: u32 = 3;

    /// Read buffer size for input streams
    pub const READ_BUFFER_SIZE: usize = 1024;
}
