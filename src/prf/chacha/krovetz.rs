//! Vectorized ChaCha block function ("krovetz": SSE2, 4 blocks per call).
//!
//! Each `__m128i` lane holds one of 4 independently-keystreamed blocks at
//! counters `counter..counter+3`; the quarter-round arithmetic is
//! identical to [`super::merged`], just applied lane-wise, so the two
//! backends are bit-identical by construction (exercised by
//! `merged_and_krovetz_agree_for_every_round_count` in the parent
//! module's tests).

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::{key_and_nonce_words, Rounds, CONSTANTS, R12, R20, R8};

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn rotl(x: __m128i, n: i32) -> __m128i {
    _mm_or_si128(_mm_slli_epi32(x, n), _mm_srli_epi32(x, 32 - n))
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn quarter_round(v: &mut [__m128i; 16], a: usize, b: usize, c: usize, d: usize) {
    v[a] = _mm_add_epi32(v[a], v[b]);
    v[d] = _mm_xor_si128(v[d], v[a]);
    v[d] = rotl(v[d], 16);

    v[c] = _mm_add_epi32(v[c], v[d]);
    v[b] = _mm_xor_si128(v[b], v[c]);
    v[b] = rotl(v[b], 12);

    v[a] = _mm_add_epi32(v[a], v[b]);
    v[d] = _mm_xor_si128(v[d], v[a]);
    v[d] = rotl(v[d], 8);

    v[c] = _mm_add_epi32(v[c], v[d]);
    v[b] = _mm_xor_si128(v[b], v[c]);
    v[b] = rotl(v[b], 7);
}

#[target_feature(enable = "sse2")]
unsafe fn generate_blocks<R: Rounds>(state: &[u8], out: &mut [u8], counter: u32) {
    debug_assert_eq!(out.len(), 256);
    let (key, nonce) = key_and_nonce_words(state);

    #[allow(clippy::cast_possible_wrap)]
    let counters = _mm_add_epi32(
        _mm_set1_epi32(counter as i32),
        _mm_setr_epi32(0, 1, 2, 3),
    );

    let mut v: [__m128i; 16] = [
        _mm_set1_epi32(CONSTANTS[0] as i32),
        _mm_set1_epi32(CONSTANTS[1] as i32),
        _mm_set1_epi32(CONSTANTS[2] as i32),
        _mm_set1_epi32(CONSTANTS[3] as i32),
        _mm_set1_epi32(key[0] as i32),
        _mm_set1_epi32(key[1] as i32),
        _mm_set1_epi32(key[2] as i32),
        _mm_set1_epi32(key[3] as i32),
        _mm_set1_epi32(key[4] as i32),
        _mm_set1_epi32(key[5] as i32),
        _mm_set1_epi32(key[6] as i32),
        _mm_set1_epi32(key[7] as i32),
        counters,
        _mm_setzero_si128(),
        _mm_set1_epi32(nonce[0] as i32),
        _mm_set1_epi32(nonce[1] as i32),
    ];
    let initial = v;

    for _ in 0..R::COUNT {
        quarter_round(&mut v, 0, 4, 8, 12);
        quarter_round(&mut v, 1, 5, 9, 13);
        quarter_round(&mut v, 2, 6, 10, 14);
        quarter_round(&mut v, 3, 7, 11, 15);

        quarter_round(&mut v, 0, 5, 10, 15);
        quarter_round(&mut v, 1, 6, 11, 12);
        quarter_round(&mut v, 2, 7, 8, 13);
        quarter_round(&mut v, 3, 4, 9, 14);
    }

    for i in 0..16 {
        v[i] = _mm_add_epi32(v[i], initial[i]);
    }

    let mut lanes = [0i32; 4];
    for (word_idx, word) in v.iter().enumerate() {
        _mm_storeu_si128(lanes.as_mut_ptr().cast(), *word);
        for (block, &lane) in lanes.iter().enumerate() {
            let offset = block * 64 + word_idx * 4;
            #[allow(clippy::cast_sign_loss)]
            out[offset..offset + 4].copy_from_slice(&(lane as u32).to_le_bytes());
        }
    }
}

macro_rules! wrapper {
    ($name:ident, $rounds:ty) => {
        pub(crate) fn $name(state: &[u8], out: &mut [u8], counter: u32) {
            // Safety: the PRF registry (`super::lookup`) only ever selects
            // this descriptor when `CpuCaps::detect()` reports SSE2.
            unsafe { generate_blocks::<$rounds>(state, out, counter) }
        }
    };
}

wrapper!(generate_r8, R8);
wrapper!(generate_r12, R12);
wrapper!(generate_r20, R20);
