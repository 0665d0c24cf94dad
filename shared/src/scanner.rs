/*!
Marker-based frame synchronization.

Records are delimited by a two-byte start marker and a two-byte end marker.
The scanner keeps a rolling two-byte window while seeking the start marker,
discarding any noise before it, then buffers bytes until the end marker
closes the frame. A frame still open when the stream ends is discarded.
*/

use crate::protocol::{MARKER_LEN, MAX_FRAME_LEN, READ_BUFFER_SIZE, RECORD_END, RECORD_START};
use std::io::{self, BufReader, Bytes, Read};
use tracing::{debug, warn};

/// One framed record exactly as it appeared in the stream, both markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Wrap raw frame bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Frame synchronization state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Discarding bytes until the start marker is seen
    SeekingStart,
    /// Collecting frame bytes until the end marker is seen
    Buffering,
}

/// Counters kept by the scanner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames closed by an end marker
    pub frames_emitted: u64,
    /// Frames dropped for growing past the largest describable size
    pub frames_oversized: u64,
    /// Frames left open when the stream ended
    pub frames_truncated: u64,
    /// Bytes discarded outside of any frame
    pub bytes_skipped: u64,
}

/// Frame synchronization engine, fed one byte at a time
pub struct FrameScanner {
    state: ScanState,
    previous: Option<u8>,
    frame_buffer: Vec<u8>,
    stats: ScanStats,
}

impl FrameScanner {
    /// Create a new scanner waiting for a start marker
    pub fn new() -> Self {
        Self {
            state: ScanState::SeekingStart,
            previous: None,
            frame_buffer: Vec::new(),
            stats: ScanStats::default(),
        }
    }

    /// Get current state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Get statistics
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Process one byte.
    /// Returns Some(frame) when the byte completes an end marker.
    pub fn process_byte(&mut self, byte: u8) -> Option<RawFrame> {
        match self.state {
            ScanState::SeekingStart => {
                if self.previous == Some(RECORD_START[0]) && byte == RECORD_START[1] {
                    self.frame_buffer.clear();
                    self.frame_buffer.extend_from_slice(&RECORD_START);
                    self.previous = None;
                    self.state = ScanState::Buffering;
                } else {
                    if self.previous.is_some() {
                        self.stats.bytes_skipped += 1;
                    }
                    self.previous = Some(byte);
                }
                None
            }

            ScanState::Buffering => {
                self.frame_buffer.push(byte);
                let len = self.frame_buffer.len();

                // The end marker may not overlap the start marker
                if len >= 2 * MARKER_LEN && self.frame_buffer[len - MARKER_LEN..] == RECORD_END {
                    self.stats.frames_emitted += 1;
                    self.state = ScanState::SeekingStart;
                    debug!("Frame complete ({} bytes)", len);
                    return Some(RawFrame::new(std::mem::take(&mut self.frame_buffer)));
                }

                if len > MAX_FRAME_LEN {
                    warn!("Frame exceeds {} bytes without an end marker, resynchronizing", MAX_FRAME_LEN);
                    self.stats.frames_oversized += 1;
                    self.stats.bytes_skipped += len as u64;
                    self.frame_buffer.clear();
                    self.state = ScanState::SeekingStart;
                }
                None
            }
        }
    }

    /// Signal end of stream. Any partially buffered frame is discarded.
    /// Returns the number of discarded bytes.
    pub fn finish(&mut self) -> usize {
        let mut discarded = 0;

        if self.previous.take().is_some() {
            self.stats.bytes_skipped += 1;
        }

        if self.state == ScanState::Buffering {
            discarded = self.frame_buffer.len();
            debug!("Stream ended inside a frame, discarding {} bytes", discarded);
            self.stats.frames_truncated += 1;
            self.stats.bytes_skipped += discarded as u64;
            self.frame_buffer.clear();
            self.state = ScanState::SeekingStart;
        }

        discarded
    }

    /// Get current frame buffer (for debugging)
    pub fn current_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }
}

impl Default for FrameScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy, single-pass sequence of frames read from a byte source.
///
/// A read error is yielded once and ends the sequence.
pub struct FrameReader<R: Read> {
    bytes: Bytes<BufReader<R>>,
    scanner: FrameScanner,
    done: bool,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::with_capacity(READ_BUFFER_SIZE, reader).bytes(),
            scanner: FrameScanner::new(),
            done: false,
        }
    }

    /// Scanner statistics so far
    pub fn stats(&self) -> ScanStats {
        self.scanner.stats()
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = io::Result<RawFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for byte in &mut self.bytes {
            match byte {
                Ok(byte) => {
                    if let Some(frame) = self.scanner.process_byte(byte) {
                        return Some(Ok(frame));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        self.done = true;
        self.scanner.finish();
        None
    }
}
