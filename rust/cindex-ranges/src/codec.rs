//! Encoding and decoding of flattened range-quadruple sequences.

use cindex_common::{Result, error::Error, verify_data};

use crate::varint::{read_varint, write_varint};

/// Number of integers in one source range: start line, start character,
/// end line, end character.
pub const RANGE_QUAD_LEN: usize = 4;

/// Upper bound on a single zero-run marker, guarding decode against
/// allocating unbounded output from a corrupt stream.
const MAX_ZERO_RUN: i64 = u32::MAX as i64;

/// Encodes a flattened sequence of range quadruples into a compact blob.
///
/// The input length must be a multiple of [`RANGE_QUAD_LEN`]; an empty input
/// encodes to an empty blob. The layout is columnar: the quads are transposed
/// into four sequences (start line, start character, line distance, character
/// distance), each sequence is delta-encoded against the previous quad, the
/// fourth column is reversed so its trailing zero run abuts the third
/// column's, and the concatenation is written as zigzag varints with zero
/// runs collapsed into `(0, count)` pairs.
pub fn encode_ranges(values: &[i32]) -> Result<Vec<u8>> {
    if values.len() % RANGE_QUAD_LEN != 0 {
        return Err(Error::encoding(
            "ranges",
            format!(
                "sequence length {} is not a multiple of {RANGE_QUAD_LEN}",
                values.len()
            ),
        ));
    }
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let count = values.len() / RANGE_QUAD_LEN;
    let mut columns = vec![0i32; values.len()];
    for column in 0..RANGE_QUAD_LEN {
        let deltas = &mut columns[column * count..(column + 1) * count];
        let mut previous = 0i32;
        for (i, quad) in values.chunks_exact(RANGE_QUAD_LEN).enumerate() {
            let value = column_value(quad, column);
            deltas[i] = value.wrapping_sub(previous);
            previous = value;
        }
    }
    columns[3 * count..].reverse();

    let mut encoded = Vec::with_capacity(values.len());
    write_compressed(&columns, &mut encoded);
    Ok(encoded)
}

/// Decodes a blob produced by [`encode_ranges`] back into the original
/// flattened quadruple sequence.
///
/// Fails with an encoding error on a truncated or malformed varint stream,
/// a corrupt zero-run marker, or a decoded element count that is not a
/// multiple of [`RANGE_QUAD_LEN`].
pub fn decode_ranges(data: &[u8]) -> Result<Vec<i32>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let mut columns = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let value = read_varint(data, &mut pos)?;
        if value == 0 {
            verify_data!(ranges, pos < data.len());
            let run = read_varint(data, &mut pos)?;
            verify_data!(ranges, run > 0 && run <= MAX_ZERO_RUN);
            columns.resize(columns.len() + run as usize, 0i32);
        } else {
            verify_data!(ranges, (i32::MIN as i64..=i32::MAX as i64).contains(&value));
            columns.push(value as i32);
        }
    }
    verify_data!(ranges, columns.len() % RANGE_QUAD_LEN == 0);

    let count = columns.len() / RANGE_QUAD_LEN;
    columns[3 * count..].reverse();

    let mut values = vec![0i32; columns.len()];
    let mut running = [0i32; RANGE_QUAD_LEN];
    for i in 0..count {
        for (column, sum) in running.iter_mut().enumerate() {
            *sum = sum.wrapping_add(columns[column * count + i]);
        }
        let quad = &mut values[i * RANGE_QUAD_LEN..(i + 1) * RANGE_QUAD_LEN];
        quad[0] = running[0];
        quad[1] = running[1];
        quad[2] = running[0].wrapping_add(running[2]);
        quad[3] = running[1].wrapping_add(running[3]);
    }
    Ok(values)
}

/// Projects one quad onto the given column of the columnar transform.
/// Columns 2 and 3 store distances rather than absolute end positions.
fn column_value(quad: &[i32], column: usize) -> i32 {
    match column {
        0 => quad[0],
        1 => quad[1],
        2 => quad[2].wrapping_sub(quad[0]),
        _ => quad[3].wrapping_sub(quad[1]),
    }
}

/// Writes `values` as zigzag varints with zero-run compression: a zero is
/// followed by a second varint carrying the length of the run it begins.
fn write_compressed(values: &[i32], target: &mut Vec<u8>) {
    let mut i = 0;
    while i < values.len() {
        let value = values[i];
        if value == 0 {
            let mut run = 1;
            while i + run < values.len() && values[i + run] == 0 {
                run += 1;
            }
            write_varint(0, target);
            write_varint(run as i64, target);
            i += run;
        } else {
            write_varint(value as i64, target);
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_ranges, encode_ranges};

    fn round_trip(values: &[i32]) -> Vec<u8> {
        let encoded = encode_ranges(values).unwrap();
        assert_eq!(decode_ranges(&encoded).unwrap(), values);
        encoded
    }

    #[test]
    fn test_empty_round_trip() {
        let encoded = encode_ranges(&[]).unwrap();
        assert!(encoded.is_empty());
        assert!(decode_ranges(&encoded).unwrap().is_empty());
    }

    #[test]
    fn test_single_quad_layout() {
        // All-zero columns collapse to one run marker, then the reversed
        // character-distance column contributes the only literal.
        let encoded = round_trip(&[0, 0, 0, 5]);
        assert_eq!(encoded, vec![0x00, 0x06, 0x0a]);
    }

    #[test]
    fn test_regular_occurrences_compress_well() {
        // Ten same-width, single-line occurrences on consecutive lines.
        let mut values = Vec::new();
        for line in 0..10 {
            values.extend_from_slice(&[line, 4, line, 9]);
        }
        let encoded = round_trip(&values);
        assert!(encoded.len() < values.len());
    }

    #[test]
    fn test_multi_line_and_negative_deltas() {
        round_trip(&[
            10, 2, 12, 8, //
            3, 40, 3, 44, //
            3, 1, 3, 5, //
            100, 0, 100, 1,
        ]);
    }

    #[test]
    fn test_length_validation() {
        for len in [1, 2, 3, 5, 7] {
            assert!(encode_ranges(&vec![1; len]).is_err());
        }
    }

    #[test]
    fn test_decode_truncated_varint() {
        let encoded = encode_ranges(&[1000, 2000, 3000, 4000]).unwrap();
        assert!(decode_ranges(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn test_decode_truncated_run_marker() {
        // A lone zero with no run length following it.
        assert!(decode_ranges(&[0x00]).is_err());
    }

    #[test]
    fn test_decode_spurious_element_count() {
        // Three literal values cannot be split into quad columns.
        assert!(decode_ranges(&[0x02, 0x04, 0x06]).is_err());
    }

    #[test]
    fn test_decode_zero_length_run() {
        assert!(decode_ranges(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn test_randomized_round_trip() {
        fastrand::seed(42);
        for _ in 0..100 {
            let quads = fastrand::usize(0..64);
            let mut values = Vec::with_capacity(quads * 4);
            for _ in 0..quads {
                let start_line = fastrand::i32(0..10_000);
                let start_char = fastrand::i32(0..200);
                values.push(start_line);
                values.push(start_char);
                values.push(start_line + fastrand::i32(0..3));
                values.push(start_char + fastrand::i32(0..80));
            }
            round_trip(&values);
        }
    }
}
