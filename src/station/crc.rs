use crc::{Crc, CRC_16_XMODEM};

/// CRC algorithm used by the VantagePro console: CRC-CCITT with polynomial
/// 0x1021, processed MSB-first with a zero seed and no final XOR. That is
/// exactly CRC-16/XMODEM, so the standard table from the `crc` crate applies.
///
/// The console appends the checksum big-endian, so computing the CRC over a
/// complete frame (checksum included) reduces a valid frame to zero.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculate the CRC over a byte buffer. Pure, table-driven.
pub fn compute(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Check a received frame: valid iff non-empty and the CRC over the whole
/// buffer, trailing checksum included, is zero.
pub fn verify(data: &[u8]) -> bool {
    !data.is_empty() && compute(data) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Builds a self-consistent frame: payload followed by its big-endian CRC.
    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut frame = payload.to_vec();
        frame.extend_from_slice(&compute(payload).to_be_bytes());
        frame
    }

    #[test]
    fn test_known_check_value() {
        // CRC-16/XMODEM check value for "123456789"
        assert_eq!(compute(b"123456789"), 0x31c3);
    }

    #[test]
    fn test_valid_frame_reduces_to_zero() {
        let frame = framed(b"LOO test payload");
        assert_eq!(compute(&frame), 0);
        assert!(verify(&frame));
    }

    #[test]
    fn test_single_bit_flip_detected() {
        let frame = framed(&[0x4c, 0x4f, 0x4f, 0x00, 0x14, 0x2a, 0x7f, 0xff]);
        assert!(verify(&frame));
        for byte in 0..frame.len() {
            for bit in 0..8 {
                let mut corrupted = frame.clone();
                corrupted[byte] ^= 1 << bit;
                assert!(
                    !verify(&corrupted),
                    "flip of byte {} bit {} went undetected",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_empty_buffer_invalid() {
        assert!(!verify(&[]));
    }
}
