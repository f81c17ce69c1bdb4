//! Counter-mode payload cipher
//!
//! Containers encrypt their payload with AES-128-CTR using a big-endian
//! 128-bit counter. A read that starts at block `n` of the encrypted region
//! starts from `seed + n`.

use aes::Aes128;
use ctr::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Advances a big-endian counter seed by `blocks`, wrapping at 2^128
pub fn counter_at(seed: &[u8; 16], blocks: u64) -> [u8; 16] {
    u128::from_be_bytes(*seed)
        .wrapping_add(u128::from(blocks))
        .to_be_bytes()
}

/// XORs `data` with the keystream starting at block `blocks` past `seed`
///
/// Counter mode is symmetric, so this both encrypts and decrypts.
pub fn apply_ctr_keystream(key: &[u8; 16], seed: &[u8; 16], blocks: u64, data: &mut [u8]) {
    let counter = counter_at(seed, blocks);
    let mut cipher = Aes128Ctr::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(&counter),
    );
    cipher.apply_keystream(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_carries_across_bytes() {
        let mut seed = [0u8; 16];
        seed[15] = 0xFF;
        let next = counter_at(&seed, 1);
        assert_eq!(next[14], 1);
        assert_eq!(next[15], 0);
    }

    #[test]
    fn test_counter_wraps() {
        assert_eq!(counter_at(&[0xFF; 16], 1), [0; 16]);
    }

    #[test]
    fn test_keystream_round_trip() {
        let key = [0x11; 16];
        let seed = [0x22; 16];
        let plain: Vec<u8> = (0u8..64).collect();
        let mut data = plain.clone();
        apply_ctr_keystream(&key, &seed, 3, &mut data);
        assert_ne!(data, plain);
        apply_ctr_keystream(&key, &seed, 3, &mut data);
        assert_eq!(data, plain);
    }

    #[test]
    fn test_block_offset_matches_continuous_stream() {
        let key = [0; 16];
        let seed = [0; 16];
        let mut whole = vec![0u8; 48];
        apply_ctr_keystream(&key, &seed, 0, &mut whole);

        let mut tail = vec![0u8; 16];
        apply_ctr_keystream(&key, &seed, 2, &mut tail);
        assert_eq!(&whole[32..], &tail[..]);
    }

    #[test]
    fn test_known_zero_key_block() {
        // AES-128 of an all-zero block under an all-zero key.
        let mut block = [0u8; 16];
        apply_ctr_keystream(&[0; 16], &[0; 16], 0, &mut block);
        assert_eq!(
            block,
            [
                0x66, 0xE9, 0x4B, 0xD4, 0xEF, 0x8A, 0x2C, 0x3B, 0x88, 0x4C, 0xFA, 0x59, 0xCA,
                0x34, 0x2B, 0x2E
            ]
        );
    }
}
