//! The DES block cipher, as FIPS 46 defines it.
//!
//! VNC authentication (RFC 6143 §7.2.2) is specified in terms of DES and
//! nothing else, so a bit-exact implementation is carried here for
//! interoperability. DES has been broken for decades; this module buys
//! wire compatibility, not secrecy, and must never be used for anything
//! but the VNC challenge.
//!
//! Permutation tables use the standard's 1-based bit numbering where bit 1
//! is the most significant bit of the input.

/// Permuted Choice 1: selects the 56 key bits from the 64-bit key,
/// discarding the parity bits.
#[rustfmt::skip]
const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,
     1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27,
    19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,
     7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29,
    21, 13,  5, 28, 20, 12,  4,
];

/// Permuted Choice 2: compresses the rotated 56-bit halves into a 48-bit
/// round subkey.
#[rustfmt::skip]
const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,
     3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8,
    16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55,
    30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53,
    46, 42, 50, 36, 29, 32,
];

/// Per-round left-rotation amounts for the key-schedule halves.
const ROTATIONS: [u8; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

/// Initial Permutation of the 64-bit block.
#[rustfmt::skip]
const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2,
    60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6,
    64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1,
    59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5,
    63, 55, 47, 39, 31, 23, 15,  7,
];

/// Final Permutation, the inverse of [`IP`].
#[rustfmt::skip]
const FP: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32,
    39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30,
    37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28,
    35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26,
    33,  1, 41,  9, 49, 17, 57, 25,
];

/// Expansion table: widens the 32-bit half to 48 bits before the subkey
/// XOR.
#[rustfmt::skip]
const E: [u8; 48] = [
    32,  1,  2,  3,  4,  5,
     4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13,
    12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21,
    20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29,
    28, 29, 30, 31, 32,  1,
];

/// Permutation applied to the concatenated S-box outputs.
#[rustfmt::skip]
const P: [u8; 32] = [
    16,  7, 20, 21,
    29, 12, 28, 17,
     1, 15, 23, 26,
     5, 18, 31, 10,
     2,  8, 24, 14,
    32, 27,  3,  9,
    19, 13, 30,  6,
    22, 11,  4, 25,
];

/// The eight selection functions S1..S8, each four rows of sixteen.
#[rustfmt::skip]
const SBOXES: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

/// Applies a permutation table to a `width`-bit value.
///
/// Table entries are 1-based positions counted from the most significant
/// bit; the output gathers them most-significant first.
fn permute(value: u64, width: u32, table: &[u8]) -> u64 {
    let mut out = 0u64;
    for &pos in table {
        out <<= 1;
        out |= (value >> (width - u32::from(pos))) & 1;
    }
    out
}

/// The Feistel function: expand, mix with the subkey, substitute, permute.
fn feistel(half: u32, subkey: u64) -> u32 {
    let mixed = permute(u64::from(half), 32, &E) ^ subkey;

    let mut substituted = 0u32;
    for (i, sbox) in SBOXES.iter().enumerate() {
        let group = ((mixed >> (42 - 6 * i)) & 0x3f) as usize;
        // Outer bits select the row, inner four the column.
        let row = ((group & 0x20) >> 4) | (group & 1);
        let column = (group >> 1) & 0xf;
        substituted = (substituted << 4) | u32::from(sbox[row * 16 + column]);
    }

    permute(u64::from(substituted), 32, &P) as u32
}

/// A precomputed schedule of the sixteen 48-bit round subkeys.
///
/// Build one per direction: [`init_encrypt`](Self::init_encrypt) for
/// forward order, [`init_decrypt`](Self::init_decrypt) for the same keys
/// reversed. The schedule is cheap to derive and intended to be
/// short-lived.
#[derive(Clone)]
pub struct KeySchedule {
    subkeys: [u64; 16],
}

impl KeySchedule {
    /// Derives the encryption schedule from a 64-bit key (parity bits are
    /// ignored, per the standard).
    #[must_use]
    pub fn init_encrypt(key: u64) -> Self {
        let selected = permute(key, 64, &PC1);
        let mut c = ((selected >> 28) & 0x0fff_ffff) as u32;
        let mut d = (selected & 0x0fff_ffff) as u32;

        let mut subkeys = [0u64; 16];
        for (round, subkey) in subkeys.iter_mut().enumerate() {
            let by = u32::from(ROTATIONS[round]);
            c = ((c << by) | (c >> (28 - by))) & 0x0fff_ffff;
            d = ((d << by) | (d >> (28 - by))) & 0x0fff_ffff;
            *subkey = permute((u64::from(c) << 28) | u64::from(d), 56, &PC2);
        }
        Self { subkeys }
    }

    /// Derives the decryption schedule: the encryption subkeys applied in
    /// reverse order.
    #[must_use]
    pub fn init_decrypt(key: u64) -> Self {
        let mut schedule = Self::init_encrypt(key);
        schedule.subkeys.reverse();
        schedule
    }

    /// Runs one 8-byte block through the sixteen Feistel rounds in place.
    ///
    /// The block is interpreted as a big-endian 64-bit integer, permuted
    /// through IP, processed, half-swapped, and written back through the
    /// final permutation. Encrypting or decrypting is solely a property of
    /// the schedule's subkey order.
    pub fn process_block(&self, block: &mut [u8; 8]) {
        let permuted = permute(u64::from_be_bytes(*block), 64, &IP);
        let mut left = (permuted >> 32) as u32;
        let mut right = permuted as u32;

        for &subkey in &self.subkeys {
            let next = left ^ feistel(right, subkey);
            left = right;
            right = next;
        }

        // The halves swap once more after round 16.
        let preoutput = (u64::from(right) << 32) | u64::from(left);
        *block = permute(preoutput, 64, &FP).to_be_bytes();
    }
}
