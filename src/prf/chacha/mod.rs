//! ChaCha8/12/20 PRF backends.
//!
//! Two flavors of the same family, named after `chacha_merged.c` /
//! `chacha_krovetz.c`: `merged` is the portable scalar implementation,
//! `krovetz` is the vectorized one. Both consume the same 40-byte key
//! material layout and, for a given round count, must produce
//! bit-identical output.

pub(crate) mod merged;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) mod krovetz;

use super::{CpuCaps, PrfDescriptor};

/// `"expand 32-byte k"` read as four little-endian 32-bit words.
pub(crate) const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Bytes of key material: 32-byte key || 8-byte nonce.
pub(crate) const STATE_BYTES: usize = 40;

/// One ChaCha double-round count, selecting the round family.
pub(crate) trait Rounds {
    /// Number of column+diagonal double-rounds.
    const COUNT: usize;
    /// Family name, e.g. `"CHACHA20"`.
    const NAME: &'static str;
}

/// ChaCha8: 4 double-rounds.
pub(crate) struct R8;
impl Rounds for R8 {
    const COUNT: usize = 4;
    const NAME: &'static str = "CHACHA8";
}

/// ChaCha12: 6 double-rounds.
pub(crate) struct R12;
impl Rounds for R12 {
    const COUNT: usize = 6;
    const NAME: &'static str = "CHACHA12";
}

/// ChaCha20: 10 double-rounds.
pub(crate) struct R20;
impl Rounds for R20 {
    const COUNT: usize = 10;
    const NAME: &'static str = "CHACHA20";
}

/// Splits `state_bytes` (32-byte key || 8-byte nonce) into key/nonce word
/// arrays, shared by every backend so the state layout lives in one
/// place.
pub(crate) fn key_and_nonce_words(state: &[u8]) -> ([u32; 8], [u32; 2]) {
    debug_assert_eq!(state.len(), STATE_BYTES);
    let mut key = [0u32; 8];
    for (word, chunk) in key.iter_mut().zip(state[0..32].chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
    }
    let mut nonce = [0u32; 2];
    for (word, chunk) in nonce.iter_mut().zip(state[32..40].chunks_exact(4)) {
        *word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
    }
    (key, nonce)
}

/// Copies `key_bytes` (exactly [`STATE_BYTES`] bytes) into `state`.
/// Shared `setup` implementation for every ChaCha backend: the backend
/// state *is* the key material, verbatim.
pub(crate) fn setup(state: &mut [u8], key_bytes: &[u8]) {
    debug_assert_eq!(state.len(), STATE_BYTES);
    debug_assert_eq!(key_bytes.len(), STATE_BYTES);
    state.copy_from_slice(key_bytes);
}

/// Scalar ChaCha8 descriptor.
pub const CHACHA8_MERGED: PrfDescriptor = PrfDescriptor {
    name: "CHACHA8",
    implementation: "CHACHA8-NOSIMD",
    flavor: "CHACHA8-NOSIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 64,
    idx_step: 1,
    required_cpucap: CpuCaps::empty(),
    setup,
    generate: merged::generate_r8,
};

/// Scalar ChaCha12 descriptor.
pub const CHACHA12_MERGED: PrfDescriptor = PrfDescriptor {
    name: "CHACHA12",
    implementation: "CHACHA12-NOSIMD",
    flavor: "CHACHA12-NOSIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 64,
    idx_step: 1,
    required_cpucap: CpuCaps::empty(),
    setup,
    generate: merged::generate_r12,
};

/// Scalar ChaCha20 descriptor.
pub const CHACHA20_MERGED: PrfDescriptor = PrfDescriptor {
    name: "CHACHA20",
    implementation: "CHACHA20-NOSIMD",
    flavor: "CHACHA20-NOSIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 64,
    idx_step: 1,
    required_cpucap: CpuCaps::empty(),
    setup,
    generate: merged::generate_r20,
};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
/// SIMD ChaCha8 descriptor: 4 blocks (256 bytes) per call.
pub const CHACHA8_KROVETZ: PrfDescriptor = PrfDescriptor {
    name: "CHACHA8",
    implementation: "CHACHA8-SIMD",
    flavor: "CHACHA8-SIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 256,
    idx_step: 4,
    required_cpucap: CpuCaps::SSE2,
    setup,
    generate: krovetz::generate_r8,
};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
/// SIMD ChaCha12 descriptor: 4 blocks (256 bytes) per call.
pub const CHACHA12_KROVETZ: PrfDescriptor = PrfDescriptor {
    name: "CHACHA12",
    implementation: "CHACHA12-SIMD",
    flavor: "CHACHA12-SIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 256,
    idx_step: 4,
    required_cpucap: CpuCaps::SSE2,
    setup,
    generate: krovetz::generate_r12,
};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
/// SIMD ChaCha20 descriptor: 4 blocks (256 bytes) per call.
pub const CHACHA20_KROVETZ: PrfDescriptor = PrfDescriptor {
    name: "CHACHA20",
    implementation: "CHACHA20-SIMD",
    flavor: "CHACHA20-SIMD",
    state_len: STATE_BYTES,
    state_bytes: STATE_BYTES,
    output_len: 256,
    idx_step: 4,
    required_cpucap: CpuCaps::SSE2,
    setup,
    generate: krovetz::generate_r20,
};

/// The SIMD ChaCha20 descriptor, if this target compiles one in.
#[must_use]
pub(crate) fn chacha20_krovetz() -> Option<PrfDescriptor> {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        Some(CHACHA20_KROVETZ)
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        None
    }
}

fn krovetz_for(name: &str) -> Option<PrfDescriptor> {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        match name {
            "CHACHA8" => Some(CHACHA8_KROVETZ),
            "CHACHA12" => Some(CHACHA12_KROVETZ),
            "CHACHA" | "CHACHA20" => Some(CHACHA20_KROVETZ),
            _ => None,
        }
    }
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        let _ = name;
        None
    }
}

fn merged_for(name: &str) -> Option<PrfDescriptor> {
    match name {
        "CHACHA8" => Some(CHACHA8_MERGED),
        "CHACHA12" => Some(CHACHA12_MERGED),
        "CHACHA" | "CHACHA20" => Some(CHACHA20_MERGED),
        _ => None,
    }
}

pub(crate) fn lookup(name: &str, caps: CpuCaps) -> Option<PrfDescriptor> {
    let (family, suffix) = split_suffix(name);
    match suffix {
        Suffix::None => {
            let merged = merged_for(family)?;
            match krovetz_for(family) {
                Some(simd) if caps.contains(simd.required_cpucap) => Some(simd),
                _ => Some(merged),
            }
        }
        Suffix::NoSimd => merged_for(family),
        Suffix::Simd => {
            let simd = krovetz_for(family)?;
            if caps.contains(simd.required_cpucap) {
                Some(simd)
            } else {
                None
            }
        }
    }
}

enum Suffix {
    None,
    Simd,
    NoSimd,
}

fn split_suffix(name: &str) -> (&str, Suffix) {
    if let Some(base) = name.strip_suffix("-NOSIMD") {
        (base, Suffix::NoSimd)
    } else if let Some(base) = name.strip_suffix("-SIMD") {
        (base, Suffix::Simd)
    } else {
        (name, Suffix::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7539 / draft-nir test vector: zero key, zero nonce, counter 0.
    const RFC7539_BLOCK0: [u8; 64] = hex_literal::hex!(
        "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7"
        "da41597c5157488d7724e03fb8d84a376a43b8f41518a11cc387b669b2ee6586"
    );

    #[test]
    fn chacha20_zero_key_zero_nonce_matches_rfc7539() {
        let state = [0u8; STATE_BYTES];
        let mut out = [0u8; 64];
        merged::generate_r20(&state, &mut out, 0);
        assert_eq!(out, RFC7539_BLOCK0);
    }

    // Scenario 3 ("rekey boundary") from `spec.md` §8: the key/nonce pair
    // and byte offset are taken verbatim from
    // `examples/original_source/test/test_vectors.c:107`'s
    // `X("helloworld!helloworld!helloworld", "!hellowo", 8192)` case,
    // where `8192` is a byte skip into the raw keystream (8192 / 64 =
    // 128 blocks). That harness only prints the resulting bytes rather
    // than recording an expected hex constant, so this checks the
    // property `spec.md` actually states: block 128 of the keystream,
    // produced by calling the raw PRF directly at counter 128, must
    // equal the same 64 bytes reached by stepping the counter up from 0.
    #[test]
    fn rekey_boundary_counter_128_matches_byte_offset_8192() {
        let key = b"helloworld!helloworld!helloworld";
        let nonce = b"!hellowo";
        let mut state = [0u8; STATE_BYTES];
        state[..32].copy_from_slice(key);
        state[32..40].copy_from_slice(nonce);

        let mut direct = [0u8; 64];
        merged::generate_r20(&state, &mut direct, 128);

        let mut block = [0u8; 64];
        for counter in 0..=128u32 {
            merged::generate_r20(&state, &mut block, counter);
        }
        assert_eq!(direct, block, "block at counter 128 must match the 128th sequential block");
    }

    #[test]
    fn setup_is_a_verbatim_copy() {
        let key_bytes: [u8; STATE_BYTES] = core::array::from_fn(|i| i as u8);
        let mut state = [0u8; STATE_BYTES];
        setup(&mut state, &key_bytes);
        assert_eq!(state, key_bytes);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn merged_and_krovetz_agree_for_every_round_count() {
        let state: [u8; STATE_BYTES] = core::array::from_fn(|i| (i as u8).wrapping_mul(7));
        for counter in [0u32, 1, 128, u32::MAX - 3] {
            let mut scalar_blocks = [0u8; 256];
            for k in 0..4u32 {
                merged::generate_r20(&state, &mut scalar_blocks[(k as usize) * 64..][..64], counter.wrapping_add(k));
            }
            let mut simd_blocks = [0u8; 256];
            krovetz::generate_r20(&state, &mut simd_blocks, counter);
            assert_eq!(scalar_blocks, simd_blocks, "mismatch at counter {counter}");
        }
    }

    #[test]
    fn lookup_resolves_documented_names() {
        assert!(lookup("CHACHA20-NOSIMD", CpuCaps::empty()).is_some());
        assert!(lookup("CHACHA20-SIMD", CpuCaps::empty()).is_none());
        assert!(lookup("BOGUS", CpuCaps::all()).is_none());
    }
}
