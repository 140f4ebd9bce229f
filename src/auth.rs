//! VNC Authentication (RFB security type 2).
//!
//! The server sends a random 16-byte challenge; the client DES-encrypts it
//! under a key derived from the password and sends the result back.
//!
//! Key derivation is VNC-specific: the password is truncated or
//! NUL-padded to 8 bytes, then the bit order of *each byte* is reversed,
//! because the original VNC server fed the key to a DES library that
//! numbered bits LSB-first. The challenge is encrypted as two independent
//! ECB blocks.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::des::KeySchedule;

/// Verifier for one VNC authentication exchange.
pub(crate) struct VncAuth {
    schedule: KeySchedule,
}

impl VncAuth {
    /// Derives the DES schedule from a password: first 8 bytes, NUL
    /// padded, each byte bit-reversed.
    pub(crate) fn new(password: &str) -> Self {
        let mut key = [0u8; 8];
        for (i, &byte) in password.as_bytes().iter().take(8).enumerate() {
            key[i] = byte.reverse_bits();
        }
        Self {
            schedule: KeySchedule::init_encrypt(u64::from_be_bytes(key)),
        }
    }

    /// Produces a fresh 16-byte challenge from the system RNG.
    pub(crate) fn generate_challenge() -> [u8; 16] {
        let mut challenge = [0u8; 16];
        OsRng.fill_bytes(&mut challenge);
        challenge
    }

    /// Computes the response a correctly authenticating client will send:
    /// the challenge encrypted as two 8-byte ECB blocks.
    pub(crate) fn expected_response(&self, challenge: &[u8; 16]) -> [u8; 16] {
        let mut response = [0u8; 16];
        for (i, chunk) in challenge.chunks_exact(8).enumerate() {
            let mut block = [0u8; 8];
            block.copy_from_slice(chunk);
            self.schedule.process_block(&mut block);
            response[i * 8..(i + 1) * 8].copy_from_slice(&block);
        }
        response
    }

    /// Checks the client's response byte-for-byte.
    pub(crate) fn verify(&self, challenge: &[u8; 16], response: &[u8; 16]) -> bool {
        self.expected_response(challenge) == *response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_eight_password_bytes_matter() {
        let challenge = [0u8; 16];
        let short = VncAuth::new("hunter22").expected_response(&challenge);
        let long = VncAuth::new("hunter22-and-then-some").expected_response(&challenge);
        assert_eq!(short, long);
    }

    #[test]
    fn short_passwords_are_nul_padded() {
        let challenge = [0x5au8; 16];
        let padded = VncAuth::new("secret").expected_response(&challenge);
        let explicit = VncAuth::new("secret\0\0").expected_response(&challenge);
        assert_eq!(padded, explicit);
    }

    #[test]
    fn ecb_blocks_are_independent() {
        // Identical challenge halves must produce identical response halves.
        let mut challenge = [0u8; 16];
        challenge[..8].copy_from_slice(b"\x01\x23\x45\x67\x89\xab\xcd\xef");
        challenge[8..].copy_from_slice(b"\x01\x23\x45\x67\x89\xab\xcd\xef");
        let response = VncAuth::new("secret").expected_response(&challenge);
        assert_eq!(response[..8], response[8..]);
    }

    #[test]
    fn verify_rejects_a_tampered_response() {
        let auth = VncAuth::new("secret");
        let challenge = VncAuth::generate_challenge();
        let mut response = auth.expected_response(&challenge);
        assert!(auth.verify(&challenge, &response));

        response[11] ^= 0x01;
        assert!(!auth.verify(&challenge, &response));
    }

    #[test]
    fn key_bytes_are_bit_reversed() {
        // 'a' = 0x61 reversed is 0x86; a password of eight 'a's and a key
        // of eight 0x86 bytes must agree, while the unreversed key must
        // not.
        let challenge = [0x33u8; 16];
        let from_password = VncAuth::new("aaaaaaaa").expected_response(&challenge);

        let reversed = KeySchedule::init_encrypt(u64::from_be_bytes([0x86; 8]));
        let mut block = [0x33u8; 8];
        reversed.process_block(&mut block);
        assert_eq!(from_password[..8], block);

        let plain = KeySchedule::init_encrypt(u64::from_be_bytes([0x61; 8]));
        let mut block = [0x33u8; 8];
        plain.process_block(&mut block);
        assert_ne!(from_password[..8], block);
    }
}
