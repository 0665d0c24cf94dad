/*!
Building framed records.

The inverse of [`crate::decoder`]: lays out the header and parameter groups,
applies the nibble swap and wraps the result in markers. Used to generate
synthetic logs and test fixtures.
*/

use crate::error::{DecodeError, Result};
use crate::nibble;
use crate::protocol::{
    FRAME_OVERHEAD, ID_OFFSET, MARKER_LEN, PARAMS_OFFSET, PARAM_GROUP_LEN, RECORD_END, RECORD_START,
};

/// Largest value the 24-bit id field holds
pub const MAX_RECORD_ID: u32 = 0x00FF_FFFF;

/// Encode one record as it would appear in a log file.
///
/// Fails if the id does not fit in 24 bits, if the record is too large for
/// the size field, or if the scrambled body would contain an end marker.
pub fn encode_frame(id: u32, timestamp: u32, params: &[(u8, f32)]) -> Result<Vec<u8>> {
    if id > MAX_RECORD_ID {
        return Err(DecodeError::invalid_frame(format!("record id {:#x} exceeds 24 bits", id)));
    }

    // Size counts the id, the timestamp and every parameter group
    let size = u16::try_from(PARAMS_OFFSET - ID_OFFSET + params.len() * PARAM_GROUP_LEN)
        .map_err(|_| {
            DecodeError::invalid_frame(format!("{} parameters do not fit in one record", params.len()))
        })?;

    let mut frame = Vec::with_capacity(usize::from(size) + FRAME_OVERHEAD);
    frame.extend_from_slice(&[0, 0]);
    frame.extend_from_slice(&size.to_le_bytes());
    frame.extend_from_slice(&id.to_le_bytes()[..3]);
    frame.extend_from_slice(&timestamp.to_le_bytes());
    for &(tag, value) in params {
        frame.push(tag);
        frame.extend_from_slice(&value.to_le_bytes());
    }
    frame.extend_from_slice(&[0, 0]);

    nibble::swap_frame_in_place(&mut frame);

    let len = frame.len();
    if frame[MARKER_LEN..len - MARKER_LEN].windows(2).any(|w| w == RECORD_END) {
        return Err(DecodeError::invalid_frame(format!(
            "record {} would contain an end marker",
            id
        )));
    }

    frame[..MARKER_LEN].copy_from_slice(&RECORD_START);
    frame[len - MARKER_LEN..].copy_from_slice(&RECORD_END);

    Ok(frame)
}
