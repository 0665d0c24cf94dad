/*!
Recoverable decode anomalies.

Malformed frames, unknown tags and serialization failures never abort a
batch. They are reported to a [`DiagnosticSink`] and processing continues
with the next frame, field or record.
*/

use crate::tag::FieldTag;
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// A recoverable anomaly found while decoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Frame too short to hold a header; dropped
    #[error("frame of {len} bytes is shorter than the {min} byte minimum, skipping")]
    FrameTooShort { len: usize, min: usize },

    /// Declared size disagrees with the frame length; dropped
    #[error("declared size {declared} does not match frame payload of {actual} bytes, skipping")]
    SizeMismatch { declared: u16, actual: usize },

    /// Parameter tag missing from the field table; field skipped
    #[error("{tag} key not found (record {record_id}, offset {offset})")]
    UnknownTag { tag: FieldTag, record_id: u32, offset: usize },

    /// Bytes before the end marker that do not form a whole parameter group; ignored
    #[error("{count} trailing bytes after the last parameter of record {record_id}")]
    TrailingBytes { count: usize, record_id: u32 },

    /// Record could not be rendered as text; omitted from output
    #[error("record {record_id} could not be serialized: {message}")]
    Serialization { record_id: u32, message: String },
}

/// Receiver for decode diagnostics
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic)
    }
}

/// Logs every diagnostic as a `tracing` warning
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.diagnostics().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        match self.diagnostics.lock() {
            Ok(mut diagnostics) => diagnostics.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.report(Diagnostic::SizeMismatch { declared: 12, actual: 17 });
        (&sink).report(Diagnostic::FrameTooShort { len: 4, min: 13 });

        assert_eq!(sink.len(), 2);
        assert_eq!(
            sink.diagnostics()[0],
            Diagnostic::SizeMismatch { declared: 12, actual: 17 }
        );
    }

    #[test]
    fn test_messages() {
        let diagnostic = Diagnostic::UnknownTag { tag: FieldTag(0x99), record_id: 7, offset: 16 };
        assert_eq!(diagnostic.to_string(), "99 key not found (record 7, offset 16)");
    }
}
