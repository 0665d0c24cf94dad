/*!
The nibble-swap transform.

Devices store every byte of a record with its high and low nibbles
exchanged, except for parameter tag bytes which are written as-is. The
transform is its own inverse, so the same routine scrambles and
de-scrambles.
*/

use crate::protocol::{PARAMS_OFFSET, PARAM_GROUP_LEN};

/// Exchange the high and low 4-bit halves of a byte
#[inline]
pub fn swap_nibbles(byte: u8) -> u8 {
    byte.rotate_left(4)
}

/// Check whether a frame offset holds a parameter tag byte.
/// Tags sit at 11, 16, 21, ...
#[inline]
pub fn is_tag_offset(offset: usize) -> bool {
    offset >= PARAMS_OFFSET && (offset - PARAMS_OFFSET) % PARAM_GROUP_LEN == 0
}

/// Apply the transform in place to every non-tag byte of a frame
pub fn swap_frame_in_place(frame: &mut [u8]) {
    for (offset, byte) in frame.iter_mut().enumerate() {
        if !is_tag_offset(offset) {
            *byte = swap_nibbles(*byte);
        }
    }
}

/// Return a de-scrambled copy of a raw frame
pub fn descramble(raw: &[u8]) -> Vec<u8> {
    let mut frame = raw.to_vec();
    swap_frame_in_place(&mut frame);
    frame
}

/// Return the scrambled form of a plain frame
pub fn scramble(plain: &[u8]) -> Vec<u8> {
    descramble(plain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_nibbles() {
        assert_eq!(swap_nibbles(0x12), 0x21);
        assert_eq!(swap_nibbles(0xF0), 0x0F);
        assert_eq!(swap_nibbles(0xAA), 0xAA);
        assert_eq!(swap_nibbles(0x00), 0x00);
    }

    #[test]
    fn test_swap_is_involution() {
        for byte in 0..=u8::MAX {
            assert_eq!(swap_nibbles(swap_nibbles(byte)), byte);
        }
    }

    #[test]
    fn test_tag_offsets() {
        assert!(!is_tag_offset(0));
        assert!(!is_tag_offset(10));
        assert!(is_tag_offset(11));
        assert!(!is_tag_offset(12));
        assert!(!is_tag_offset(15));
        assert!(is_tag_offset(16));
        assert!(is_tag_offset(21));
    }

    #[test]
    fn test_descramble_leaves_tags_untouched() {
        let raw: Vec<u8> = (0u8..22).collect();
        let plain = descramble(&raw);

        for (offset, (&before, &after)) in raw.iter().zip(plain.iter()).enumerate() {
            if is_tag_offset(offset) {
                assert_eq!(before, after, "tag byte at {} was swapped", offset);
            } else {
                assert_eq!(swap_nibbles(before), after, "byte at {} not swapped once", offset);
            }
        }

        assert_eq!(scramble(&plain), raw);
    }
}
