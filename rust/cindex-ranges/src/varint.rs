//! Zigzag LEB128 varints, the primitive integer layout of the range codec.

use cindex_common::{Result, verify_data};

/// Appends `value` to `target` as a zigzag-encoded LEB128 varint.
///
/// Small magnitudes of either sign occupy a single byte; the worst case for
/// an `i64` is ten bytes.
pub fn write_varint(value: i64, target: &mut Vec<u8>) {
    let mut bits = ((value << 1) ^ (value >> 63)) as u64;
    loop {
        let byte = (bits & 0x7f) as u8;
        bits >>= 7;
        if bits == 0 {
            target.push(byte);
            return;
        }
        target.push(byte | 0x80);
    }
}

/// Reads one varint from `data` starting at `*pos`, advancing `pos` past the
/// consumed bytes.
///
/// Fails with an encoding error when the stream ends inside a varint or the
/// continuation chain exceeds the ten bytes an `i64` can occupy.
pub fn read_varint(data: &[u8], pos: &mut usize) -> Result<i64> {
    let mut bits = 0u64;
    let mut shift = 0u32;
    loop {
        verify_data!(varint, *pos < data.len());
        verify_data!(varint, shift < 64);
        let byte = data[*pos];
        *pos += 1;
        bits |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(((bits >> 1) as i64) ^ -((bits & 1) as i64))
}
