//! Scalar ChaCha block function ("merged": one 16-word state, no SIMD).

use super::{key_and_nonce_words, Rounds, CONSTANTS, R12, R20, R8};

#[inline]
fn quarter_round(v: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].wrapping_add(v[b]);
    v[d] ^= v[a];
    v[d] = v[d].rotate_left(16);

    v[c] = v[c].wrapping_add(v[d]);
    v[b] ^= v[c];
    v[b] = v[b].rotate_left(12);

    v[a] = v[a].wrapping_add(v[b]);
    v[d] ^= v[a];
    v[d] = v[d].rotate_left(8);

    v[c] = v[c].wrapping_add(v[d]);
    v[b] ^= v[c];
    v[b] = v[b].rotate_left(7);
}

fn generate<R: Rounds>(state: &[u8], out: &mut [u8], counter: u32) {
    debug_assert_eq!(out.len(), 64);
    let (key, nonce) = key_and_nonce_words(state);

    // Word 13 is reserved: this crate's counter is strictly the 32-bit
    // value at word 12, never spanning into word 13.
    let initial: [u32; 16] = [
        CONSTANTS[0], CONSTANTS[1], CONSTANTS[2], CONSTANTS[3],
        key[0], key[1], key[2], key[3], key[4], key[5], key[6], key[7],
        counter, 0, nonce[0], nonce[1],
    ];
    let mut v = initial;

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

    for (word, init) in v.iter_mut().zip(initial.iter()) {
        *word = word.wrapping_add(*init);
    }
    for (chunk, word) in out.chunks_exact_mut(4).zip(v.iter()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

pub(crate) fn generate_r8(state: &[u8], out: &mut [u8], counter: u32) {
    generate::<R8>(state, out, counter);
}

pub(crate) fn generate_r12(state: &[u8], out: &mut [u8], counter: u32) {
    generate::<R12>(state, out, counter);
}

pub(crate) fn generate_r20(state: &[u8], out: &mut [u8], counter: u32) {
    generate::<R20>(state, out, counter);
}
