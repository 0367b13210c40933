//! Persisted alignment blob: 8 bytes per alignment, four little-endian `u16`s in the
//! order `from_start, from_end, to_start, to_end`.

use crate::error::AlignmentError;
use crate::types::Alignment;

pub const ALIGNMENT_BYTES: usize = 8;

pub fn encode_alignments(alignments: &[Alignment]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(alignments.len() * ALIGNMENT_BYTES);
    for a in alignments {
        for field in [a.from_start, a.from_end, a.to_start, a.to_end] {
            blob.extend_from_slice(&field.to_le_bytes());
        }
    }
    blob
}

pub fn decode_alignments(blob: &[u8]) -> Result<Vec<Alignment>, AlignmentError> {
    if blob.len() % ALIGNMENT_BYTES != 0 {
        return Err(AlignmentError::invalid_input(format!(
            "alignment blob length {} is not a multiple of {ALIGNMENT_BYTES}",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(ALIGNMENT_BYTES)
        .map(|chunk| {
            let field = |i: usize| u16::from_le_bytes([chunk[2 * i], chunk[2 * i + 1]]);
            Alignment::new(field(0), field(1), field(2), field(3))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_layout_is_little_endian_in_field_order() {
        let blob = encode_alignments(&[Alignment::new(0, 10, 0x0102, 0xFFFF)]);
        assert_eq!(blob, [0, 0, 10, 0, 0x02, 0x01, 0xFF, 0xFF]);
    }

    #[test]
    fn decode_preserves_order() {
        let alignments = vec![Alignment::new(10, 11, 5, 6), Alignment::new(0, 10, 0, 5)];
        let decoded = decode_alignments(&encode_alignments(&alignments)).unwrap();
        assert_eq!(decoded, alignments);
    }

    #[test]
    fn empty_blob_is_empty_set() {
        assert!(encode_alignments(&[]).is_empty());
        assert!(decode_alignments(&[]).unwrap().is_empty());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let err = decode_alignments(&[0, 0, 1]).unwrap_err();
        assert!(matches!(err, AlignmentError::InvalidInput { .. }));
    }
}
