//! Audio frame normalization.
//!
//! Inbound binary messages carry raw 16-bit little-endian mono PCM with no
//! header. A payload with an odd byte count is padded with a single zero
//! byte so the recognizer always sees whole samples.

use tracing::trace;

/// Bytes per PCM sample (16-bit).
pub const BYTES_PER_SAMPLE: usize = 2;

/// One normalized buffer of 16-bit PCM samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioFrame {
    bytes: Vec<u8>,
    padded: bool,
}

impl AudioFrame {
    /// Raw little-endian sample bytes. Always an even length.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of whole samples in the frame.
    pub fn sample_count(&self) -> usize {
        self.bytes.len() / BYTES_PER_SAMPLE
    }

    /// Whether a zero byte was appended during normalization.
    pub fn was_padded(&self) -> bool {
        self.padded
    }

    /// Whether the frame carries no samples.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the frame into signed 16-bit samples.
    pub fn samples(&self) -> Vec<i16> {
        self.bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// Consume the frame, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Normalize an inbound binary payload into an [`AudioFrame`].
///
/// Odd-length input gets exactly one trailing zero byte. Content is
/// otherwise passed through untouched.
pub fn normalize(raw: impl Into<Vec<u8>>) -> AudioFrame {
    let mut bytes = raw.into();
    let padded = bytes.len() % BYTES_PER_SAMPLE != 0;
    if padded {
        trace!(len = bytes.len(), "padding odd-length audio frame");
        bytes.push(0);
    }
    AudioFrame { bytes, padded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_length_passes_through() {
        let frame = normalize(vec![1, 2, 3, 4]);
        assert_eq!(frame.as_bytes(), &[1, 2, 3, 4]);
        assert!(!frame.was_padded());
        assert_eq!(frame.sample_count(), 2);
    }

    #[test]
    fn odd_length_gets_one_zero_byte() {
        let frame = normalize(vec![7, 8, 9]);
        assert_eq!(frame.as_bytes(), &[7, 8, 9, 0]);
        assert!(frame.was_padded());
    }

    #[test]
    fn single_byte_becomes_one_sample() {
        let frame = normalize(vec![0xff]);
        assert_eq!(frame.sample_count(), 1);
        assert_eq!(frame.samples(), vec![0x00ff]);
    }

    #[test]
    fn empty_payload_is_empty_frame() {
        let frame = normalize(Vec::new());
        assert!(frame.is_empty());
        assert!(!frame.was_padded());
    }

    #[test]
    fn samples_are_little_endian() {
        let frame = normalize(vec![0x01, 0x00, 0xff, 0xff, 0x00, 0x80]);
        assert_eq!(frame.samples(), vec![1, -1, i16::MIN]);
    }

    proptest! {
        #[test]
        fn odd_payload_is_padded_by_exactly_one_zero(
            raw in proptest::collection::vec(any::<u8>(), 0..512)
                .prop_filter("odd length", |v| v.len() % 2 == 1)
        ) {
            let frame = normalize(raw.clone());
            prop_assert_eq!(frame.as_bytes().len(), raw.len() + 1);
            prop_assert_eq!(&frame.as_bytes()[..raw.len()], raw.as_slice());
            prop_assert_eq!(frame.as_bytes()[raw.len()], 0);
            prop_assert!(frame.as_bytes().len() % 2 == 0);
        }

        #[test]
        fn even_payload_is_unchanged(
            raw in proptest::collection::vec(any::<u8>(), 0..256)
                .prop_map(|mut v| { if v.len() % 2 == 1 { let _ = v.pop(); } v })
        ) {
            let frame = normalize(raw.clone());
            prop_assert_eq!(frame.into_bytes(), raw);
        }
    }
}
