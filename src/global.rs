//! The process-wide implicit-state engine: a single lazily-initialized
//! [`locked::Engine`], matching the `arc4random`/`ottery_global_*`
//! convention of a shared default instance behind free functions.

use std::sync::OnceLock;

use crate::config::Config;
use crate::error::Error;
use crate::generator::locked::Engine;
use crate::generator::nolock::EngineNolock;

static GLOBAL: OnceLock<Engine> = OnceLock::new();

fn global() -> &'static Engine {
    GLOBAL.get_or_init(|| {
        Engine::init(Config::new()).unwrap_or_else(|e| {
            crate::fatal::fatal(e.with_flag(Error::FLAG_GLOBAL_PRNG_INIT))
        })
    })
}

/// Explicitly initializes the global engine with `cfg`, replacing
/// whatever default it would otherwise lazily construct on first use.
///
/// # Errors
///
/// Returns an [`Error`] if `cfg` names an unavailable PRF or the initial
/// reseed fails, and does not touch the global engine in that case.
///
/// # Panics
///
/// Panics if the global engine has already been established (by a
/// prior call to `init` or by any other free function in this module).
pub fn init(cfg: Option<Config>) -> Result<(), Error> {
    let engine = Engine::init(cfg.unwrap_or_default())?;
    GLOBAL.set(engine).map_err(|_| ()).expect(
        "global engine already initialized; call init() before any other arc4rng free function",
    );
    Ok(())
}

/// Mixes `seed` into the global engine's running key, or draws fresh
/// entropy if `seed` is `None`.
///
/// # Errors
///
/// Propagates [`Error`] from the entropy combiner as documented on
/// [`Engine::add_seed`].
pub fn add_seed(seed: Option<&[u8]>) -> Result<(), Error> {
    global().add_seed(seed)
}

/// Fills `out` with CSPRNG output from the global engine.
pub fn rand_bytes(out: &mut [u8]) {
    global().rand_bytes(out);
}

/// A uniformly random machine `unsigned int` (`u32`) from the global engine.
#[must_use]
pub fn rand_unsigned() -> u32 {
    global().rand_unsigned()
}

/// A uniformly random `u32` from the global engine.
#[must_use]
pub fn rand_uint32() -> u32 {
    global().rand_uint32()
}

/// A uniformly random `u64` from the global engine.
#[must_use]
pub fn rand_uint64() -> u64 {
    global().rand_uint64()
}

/// A uniformly random `u32` in `[0, top]` from the global engine.
#[must_use]
pub fn rand_range(top: u32) -> u32 {
    global().rand_range(top)
}

/// A uniformly random `u64` in `[0, top]` from the global engine.
#[must_use]
pub fn rand_range64(top: u64) -> u64 {
    global().rand_range64(top)
}

/// A documented no-op retained for API compatibility with the global
/// engine's `stir` counterpart.
pub fn stir() {
    global().stir();
}

/// Zeroes the global engine's key material. Any later call besides
/// [`init`] is fatal, matching the per-instance contract.
pub fn wipe() {
    global().wipe();
}

/// Size in bytes of a [`Config`] record.
#[must_use]
pub fn get_sizeof_config() -> usize {
    core::mem::size_of::<Config>()
}

/// Size in bytes of the locked engine's internal state record.
#[must_use]
pub fn get_sizeof_state() -> usize {
    Engine::size_of_state()
}

/// Size in bytes of the nolock engine's internal state record. Exposed
/// alongside [`get_sizeof_state`] so callers embedding either flavor can
/// size their own storage without depending on `core::mem::size_of` on a
/// type this crate otherwise keeps out of its public surface.
#[must_use]
pub fn get_sizeof_state_nolock() -> usize {
    EngineNolock::size_of_state()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizeof_helpers_report_nonzero_sizes() {
        assert!(get_sizeof_config() > 0);
        assert!(get_sizeof_state() > 0);
        assert!(get_sizeof_state_nolock() > 0);
    }

    #[test]
    fn global_engine_produces_output() {
        let mut out = [0u8; 64];
        rand_bytes(&mut out);
        assert_ne!(out, [0u8; 64]);
        assert!(rand_range(10) <= 10);
        assert!(rand_range64(10) <= 10);
        stir();
    }
}
