/*!
Record decoding.

Turns one [`RawFrame`] into a [`Record`]: reverse the nibble swap, read the
fixed header, check the declared size against the frame length, then walk
the 5-byte parameter groups up to the end marker. Anomalies go to the
decoder's [`DiagnosticSink`]; only read failures surface as errors.
*/

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::Result;
use crate::nibble;
use crate::protocol::{
    DEFAULT_FLOAT_PRECISION, FRAME_OVERHEAD, MARKER_LEN, MIN_FRAME_LEN, PARAMS_OFFSET,
    PARAM_GROUP_LEN,
};
use crate::record::{Record, RecordHeader};
use crate::rounding::round_half_up;
use crate::scanner::{FrameReader, RawFrame};
use crate::tag::FieldTag;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Decodes frames into records at a fixed decimal precision
#[derive(Debug, Clone)]
pub struct RecordDecoder<S = TracingSink> {
    precision: u32,
    sink: S,
}

impl RecordDecoder<TracingSink> {
    /// Create a decoder that logs diagnostics through `tracing`
    pub fn new(precision: u32) -> Self {
        Self::with_sink(precision, TracingSink)
    }
}

impl Default for RecordDecoder<TracingSink> {
    fn default() -> Self {
        Self::new(DEFAULT_FLOAT_PRECISION)
    }
}

impl<S: DiagnosticSink> RecordDecoder<S> {
    /// Create a decoder reporting diagnostics to `sink`
    pub fn with_sink(precision: u32, sink: S) -> Self {
        Self { precision, sink }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Decode one frame. Returns `None` if the frame was dropped.
    pub fn decode(&self, frame: &RawFrame) -> Option<Record> {
        self.decode_bytes(frame.as_bytes())
    }

    /// Decode one frame given as raw (still scrambled) bytes, markers included
    pub fn decode_bytes(&self, raw: &[u8]) -> Option<Record> {
        if raw.len() < MIN_FRAME_LEN {
            self.drop_frame(raw, Diagnostic::FrameTooShort { len: raw.len(), min: MIN_FRAME_LEN });
            return None;
        }

        let frame = nibble::descramble(raw);
        let Some(header) = RecordHeader::parse(&frame) else {
            self.drop_frame(raw, Diagnostic::FrameTooShort { len: raw.len(), min: MIN_FRAME_LEN });
            return None;
        };

        let actual = frame.len() - FRAME_OVERHEAD;
        if usize::from(header.size) != actual {
            self.drop_frame(raw, Diagnostic::SizeMismatch { declared: header.size, actual });
            return None;
        }

        debug!("size = {}, id = {}, time = {}", header.size, header.id, header.timestamp);

        // Parameter groups stop before the end marker
        let params_end = frame.len() - MARKER_LEN;
        let mut parameters = BTreeMap::new();
        let mut offset = PARAMS_OFFSET;

        while offset + PARAM_GROUP_LEN <= params_end {
            let tag = FieldTag(frame[offset]);
            let payload = [frame[offset + 1], frame[offset + 2], frame[offset + 3], frame[offset + 4]];

            match tag.name() {
                Some(name) => {
                    let value = round_half_up(f32::from_le_bytes(payload), self.precision);
                    debug!("{}: {}", name, value);
                    parameters.insert(name, value);
                }
                None => self.sink.report(Diagnostic::UnknownTag {
                    tag,
                    record_id: header.id,
                    offset,
                }),
            }

            offset += PARAM_GROUP_LEN;
        }

        if offset < params_end {
            self.sink.report(Diagnostic::TrailingBytes {
                count: params_end - offset,
                record_id: header.id,
            });
        }

        Some(Record::new(header, parameters))
    }

    /// Lazily decode every frame in a byte source.
    /// A read error is yielded once and ends the sequence.
    pub fn records<'a, R: Read + 'a>(&'a self, reader: R) -> impl Iterator<Item = Result<Record>> + 'a {
        FrameReader::new(reader).filter_map(move |frame| match frame {
            Ok(frame) => self.decode(&frame).map(Ok),
            Err(e) => Some(Err(e.into())),
        })
    }

    /// Decode a whole byte source.
    /// A read error aborts the source; no records are returned for it.
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Vec<Record>> {
        let mut frames = FrameReader::new(reader);
        let mut records = Vec::new();

        for frame in frames.by_ref() {
            if let Some(record) = self.decode(&frame?) {
                records.push(record);
            }
        }

        let stats = frames.stats();
        debug!(
            "Found {} frames, decoded {} records ({} truncated, {} oversized, {} bytes skipped)",
            stats.frames_emitted,
            records.len(),
            stats.frames_truncated,
            stats.frames_oversized,
            stats.bytes_skipped
        );

        Ok(records)
    }

    /// Decode a log file
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Record>> {
        let file = File::open(path.as_ref())?;
        self.decode_reader(file)
    }

    fn drop_frame(&self, raw: &[u8], diagnostic: Diagnostic) {
        debug!("Dropped frame: {}", hex::encode(raw));
        self.sink.report(diagnostic);
    }
}

/// Decode a byte source at `precision`, logging diagnostics through `tracing`
pub fn decode_stream<R: Read>(reader: R, precision: u32) -> Result<Vec<Record>> {
    RecordDecoder::new(precision).decode_reader(reader)
}
