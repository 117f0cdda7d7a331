//! Positional XOR keystream used by cached `.psv` clips.
//!
//! For an absolute file offset `p` the keystream byte is
//! `A[p % 11] ^ B[p % 101] ^ (p % 251)`. The transform is its own inverse and carries
//! no key material beyond the two tables below, so it is an obfuscation layer and
//! nothing more.
//!
//! The keystream repeats every `11 * 101 * 251` bytes, which lets us compute one
//! period up front and turn every later byte into a table lookup.

use std::sync::LazyLock;

const TABLE_A: &[u8; 11] = b"pluralsight";

const TABLE_B: &[u8; 101] = &[
    0x06, 0x3f, 0x7a, 0x59, 0xa2, 0xb2, 0x85, 0x9f, 0x4c, 0xbe, 0xee, 0x30,
    0xd6, 0x2e, 0xec, 0x17, 0x23, 0xa9, 0x3e, 0xc5, 0xa3, 0x51, 0x05, 0xa4,
    0xb0, 0x01, 0x38, 0xde, 0x5e, 0x8e, 0xfa, 0x19, 0x4c, 0x71, 0xdf, 0x27,
    0x9d, 0x03, 0xdf, 0x45, 0x9e, 0x4d, 0x80, 0x27, 0x78, 0x3a, 0x00, 0x7e,
    0xb9, 0x01, 0xff, 0x20, 0x34, 0xb3, 0xf5, 0x03, 0xc3, 0xa7, 0xca, 0x0e,
    0x41, 0xcb, 0xbc, 0x90, 0xe8, 0x9e, 0xee, 0x7e, 0x8b, 0x9a, 0xe2, 0x1b,
    0xb8, 0x55, 0x44, 0x3c, 0x7f, 0x4b, 0xe7, 0x2a, 0x1d, 0xf6, 0xe6, 0x37,
    0x48, 0x0b, 0x15, 0x41, 0x72, 0xfd, 0x2a, 0x76, 0xf7, 0x25, 0xc2, 0xfe,
    0xbe, 0xe4, 0x3b, 0x70, 0xfc,
];

const DIFFUSION: u64 = 251;

/// Number of bytes after which the keystream repeats.
pub const PERIOD: usize = TABLE_A.len() * TABLE_B.len() * DIFFUSION as usize;

static KEYSTREAM: LazyLock<Box<[u8]>> =
    LazyLock::new(|| (0..PERIOD as u64).map(keystream_byte).collect());

/// Keystream byte for the absolute file offset `position`.
pub fn keystream_byte(position: u64) -> u8 {
    let a = TABLE_A[(position % TABLE_A.len() as u64) as usize];
    let b = TABLE_B[(position % TABLE_B.len() as u64) as usize];
    a ^ b ^ (position % DIFFUSION) as u8
}

/// XOR the keystream into `buffer` in place.
///
/// `position` must be the offset of `buffer[0]` from the start of the encrypted file.
/// Passing a buffer relative index instead silently produces garbage.
/// Applying the transform twice with the same `position` restores the input.
pub fn apply_keystream(buffer: &mut [u8], position: u64) {
    let keystream = &**KEYSTREAM;
    let mut index = (position % PERIOD as u64) as usize;

    for byte in buffer.iter_mut() {
        *byte ^= keystream[index];
        index += 1;

        if index == PERIOD {
            index = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 + 7) as u8).collect()
    }

    #[test]
    fn test_known_keystream_bytes() {
        assert_eq!(keystream_byte(0), 0x76);
        assert_eq!(keystream_byte(1), 0x52);
        assert_eq!(keystream_byte(100), 0xf4);
        assert_eq!(keystream_byte(250), 0x24);
        assert_eq!(keystream_byte(251), 0x69);
    }

    #[test]
    fn test_involution() {
        let original = sample(4096);

        for position in [0, 1, 250, 251, 1_000_003, PERIOD as u64 - 5] {
            let mut data = original.clone();
            apply_keystream(&mut data, position);
            assert_ne!(data, original);
            apply_keystream(&mut data, position);
            assert_eq!(data, original);
        }
    }

    #[test]
    fn test_deterministic() {
        let mut a = sample(1024);
        let mut b = sample(1024);
        apply_keystream(&mut a, 12345);
        apply_keystream(&mut b, 12345);
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_position_does_not_decrypt() {
        let original = sample(512);
        let mut data = original.clone();
        apply_keystream(&mut data, 0);
        apply_keystream(&mut data, 1);
        assert_ne!(data, original);
    }

    #[test]
    fn test_table_matches_direct_formula_across_period_boundary() {
        let start = PERIOD as u64 - 300;
        let mut data = vec![0; 600];
        apply_keystream(&mut data, start);

        for (i, byte) in data.iter().enumerate() {
            assert_eq!(*byte, keystream_byte(start + i as u64));
        }
    }

    #[test]
    fn test_blocks_match_whole_buffer() {
        let original = sample(10_000);
        let mut whole = original.clone();
        apply_keystream(&mut whole, 0);

        let mut blocks = original.clone();
        for (i, chunk) in blocks.chunks_mut(777).enumerate() {
            apply_keystream(chunk, (i * 777) as u64);
        }

        assert_eq!(whole, blocks);
    }

    #[test]
    fn test_empty_buffer() {
        let mut data: [u8; 0] = [];
        apply_keystream(&mut data, 99);
    }
}
