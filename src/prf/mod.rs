//! PRF (pseudorandom function) abstraction.
//!
//! A PRF here is a keyed stream cipher used as a counter-indexed,
//! random-access keystream: `generate(state, out, counter)` must be a
//! pure function of `(state, counter)`, and scalar/SIMD backends of the
//! same family (round count) must agree bit-for-bit.

pub mod chacha;

#[cfg(feature = "aes-ni")]
pub mod aes_ctr;

use bitflags::bitflags;

/// Hard bound on [`PrfDescriptor::state_len`].
pub const MAX_STATE_LEN: usize = 256;
/// Hard bound on [`PrfDescriptor::state_bytes`].
pub const MAX_STATE_BYTES: usize = 64;
/// Hard bound on [`PrfDescriptor::output_len`].
pub const MAX_OUTPUT_LEN: usize = 256;

bitflags! {
    /// CPU capability bits a PRF backend may require before it can be
    /// selected.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CpuCaps: u32 {
        const SSE2   = 0b0000_0001;
        const AVX2   = 0b0000_0010;
        const AESNI  = 0b0000_0100;
        const RDRAND = 0b0000_1000;
    }
}

impl CpuCaps {
    /// Detects the capability bits available on the running host.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            cpufeatures::new!(sse2_cpuid, "sse2");
            cpufeatures::new!(avx2_cpuid, "avx2");
            cpufeatures::new!(aes_cpuid, "aes");
            cpufeatures::new!(rdrand_cpuid, "rdrand");

            let mut caps = Self::empty();
            if sse2_cpuid::init().get() {
                caps |= Self::SSE2;
            }
            if avx2_cpuid::init().get() {
                caps |= Self::AVX2;
            }
            if aes_cpuid::init().get() {
                caps |= Self::AESNI;
            }
            if rdrand_cpuid::init().get() {
                caps |= Self::RDRAND;
            }
            caps
        }
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        {
            Self::empty()
        }
    }
}

/// Immutable record describing one PRF (stream-cipher) variant.
///
/// `setup`/`generate` are plain function pointers, not a trait object,
/// so that the whole registry can be built from `const` values: there is
/// exactly one monomorphization per round count, chosen at compile time,
/// and the *choice between* monomorphizations (which backend to run) is
/// the only thing resolved at runtime (see [`lookup`]).
#[derive(Clone, Copy)]
pub struct PrfDescriptor {
    /// Family name, e.g. `"CHACHA20"`.
    pub name: &'static str,
    /// Implementation name, e.g. `"CHACHA20-SIMD"`.
    pub implementation: &'static str,
    /// Flavor alias. Equal to `implementation` for every backend in this
    /// crate today; kept as a distinct field to mirror the descriptor's
    /// three-name shape.
    pub flavor: &'static str,
    /// Bytes of opaque backend state.
    pub state_len: usize,
    /// Bytes of key material consumed by `setup`.
    pub state_bytes: usize,
    /// Bytes produced per call to `generate`.
    pub output_len: usize,
    /// Counter increment between adjacent `generate` calls.
    pub idx_step: u32,
    /// CPU features `generate` requires.
    pub required_cpucap: CpuCaps,
    /// Initializes `state` from `state_bytes` bytes of key material.
    pub setup: fn(state: &mut [u8], key_bytes: &[u8]),
    /// Emits one `output_len`-byte block at counter value `counter`.
    pub generate: fn(state: &[u8], out: &mut [u8], counter: u32),
}

impl core::fmt::Debug for PrfDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrfDescriptor")
            .field("implementation", &self.implementation)
            .field("state_bytes", &self.state_bytes)
            .field("output_len", &self.output_len)
            .field("idx_step", &self.idx_step)
            .finish()
    }
}

impl PrfDescriptor {
    /// Checks the invariants every descriptor must satisfy:
    /// `state_len <= MAX_STATE_LEN`, `state_bytes <= MAX_STATE_BYTES`,
    /// `output_len <= MAX_OUTPUT_LEN`, `state_bytes <= output_len`.
    #[must_use]
    pub(crate) fn check_invariants(&self) -> bool {
        self.state_len <= MAX_STATE_LEN
            && self.state_bytes <= MAX_STATE_BYTES
            && self.output_len <= MAX_OUTPUT_LEN
            && self.state_bytes <= self.output_len
            && self.output_len % 64 == 0
            && self.idx_step as usize == self.output_len / 64
    }
}

fn best_of(merged: PrfDescriptor, simd: Option<PrfDescriptor>, caps: CpuCaps) -> PrfDescriptor {
    match simd {
        Some(d) if caps.contains(d.required_cpucap) => d,
        _ => merged,
    }
}

/// Resolves one of the implementation names `config_force_implementation`
/// accepts (`CHACHA`, `CHACHA8`, `CHACHA12`, `CHACHA20`, each optionally
/// suffixed `-SIMD` or `-NOSIMD`) to a concrete, currently-usable
/// [`PrfDescriptor`]. An unsuffixed name resolves to the best backend the
/// host supports; a `-SIMD` name that the host cannot run (no matching
/// CPU capability, or the backend was not compiled in) resolves to
/// `None`, same as an unrecognized name.
#[must_use]
pub fn lookup(name: &str) -> Option<PrfDescriptor> {
    let caps = CpuCaps::detect();
    chacha::lookup(name, caps)
}

/// The PRF used when nothing is forced via [`crate::Config`].
#[must_use]
pub fn default_descriptor() -> PrfDescriptor {
    best_of(chacha::CHACHA20_MERGED, chacha::chacha20_krovetz(), CpuCaps::detect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_descriptor_satisfies_invariants() {
        for name in [
            "CHACHA", "CHACHA8", "CHACHA12", "CHACHA20",
            "CHACHA-NOSIMD", "CHACHA8-NOSIMD", "CHACHA12-NOSIMD", "CHACHA20-NOSIMD",
        ] {
            let d = lookup(name).unwrap_or_else(|| panic!("{name} should resolve"));
            assert!(d.check_invariants(), "{name} descriptor violates invariants");
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("CHACHA7").is_none());
        assert!(lookup("").is_none());
    }
}
