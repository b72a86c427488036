//! Optional AES-CTR PRF backend (Cargo feature `aes-ni`).
//!
//! Not one of the names `config_force_implementation` accepts (`spec.md`
//! §6's name table is exhaustive and does not mention AES); reachable
//! only by constructing a [`crate::Config`] with [`DESCRIPTOR`] directly.
//! A 256-bit key + 96-bit nonce; each call evaluates the block cipher on
//! `nonce || (4*counter + k)` for `k` in `0..4`, CTR style, producing one
//! 64-byte block per call to stay interchangeable with the ChaCha
//! backends' block-size contract. The `4*counter+k` sub-indexing (rather
//! than `counter+k`) keeps `idx_step == output_len / 64 == 1`, satisfying
//! [`PrfDescriptor::check_invariants`] the same way every ChaCha
//! descriptor does: the generator core advances `block_counter` by
//! `idx_step` between calls, so a backend packing N sub-blocks per call
//! must consume N counter values per increment of 1, not of N.

use aes::Aes256;
use cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};

use super::{CpuCaps, PrfDescriptor};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Bytes of key material: 32-byte key || 12-byte nonce.
pub(crate) const STATE_BYTES: usize = KEY_LEN + NONCE_LEN;

fn setup(state: &mut [u8], key_bytes: &[u8]) {
    debug_assert_eq!(state.len(), STATE_BYTES);
    debug_assert_eq!(key_bytes.len(), STATE_BYTES);
    state.copy_from_slice(key_bytes);
}

fn generate(state: &[u8], out: &mut [u8], counter: u32) {
    debug_assert_eq!(state.len(), STATE_BYTES);
    debug_assert_eq!(out.len(), 64);

    let cipher = Aes256::new_from_slice(&state[..KEY_LEN]).expect("32-byte key");
    let nonce = &state[KEY_LEN..];
    let base = counter.wrapping_mul(4);

    for k in 0..4u32 {
        let mut block = [0u8; 16];
        block[..NONCE_LEN].copy_from_slice(nonce);
        block[NONCE_LEN..].copy_from_slice(&base.wrapping_add(k).to_be_bytes());
        let mut generic = GenericArray::from(block);
        cipher.encrypt_block(&mut generic);
        out[(k as usize) * 16..][..16].copy_from_slice(&generic);
    }
}

/// The AES-CTR PRF descriptor, constructed behind the `aes-ni` feature.
pub const DESCRIPTOR: PrfDescriptor = PrfDescriptor {
    name: "AES-CTR",
    implementation: "AES-CTR",
    flavor: "AES-CTR",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 64,
    idx_step: 1,
    required_cpucap: CpuCaps::AESNI,
    setup,
    generate,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_key_and_counter() {
        let key = [9u8; STATE_BYTES];
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        generate(&key, &mut a, 0);
        generate(&key, &mut b, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn counter_changes_output() {
        let key = [9u8; STATE_BYTES];
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        generate(&key, &mut a, 0);
        generate(&key, &mut b, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn descriptor_satisfies_generic_prf_invariants() {
        assert!(DESCRIPTOR.check_invariants());
    }
}
