//! Engine and entropy-source configuration.
//!
//! Mirrors `ottery_config`/`ottery_osrng_config`: a config object is
//! populated before `init` and then consumed by it; it has no effect on
//! an already-initialized engine.

use crate::entropy::SourceFlags;
use crate::error::Error;
use crate::prf::{self, PrfDescriptor};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Entropy-source configuration: device path override, disable mask, and
/// an optional EGD daemon address.
#[derive(Clone, Debug)]
pub struct EntropyConfig {
    pub(crate) urandom_device: PathBuf,
    pub(crate) disabled_sources: SourceFlags,
    pub(crate) egd_addr: Option<SocketAddr>,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        EntropyConfig {
            urandom_device: PathBuf::from("/dev/urandom"),
            disabled_sources: SourceFlags::empty(),
            egd_addr: None,
        }
    }
}

/// Engine configuration, built before `init` and consumed by it.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub(crate) prf: Option<PrfDescriptor>,
    pub(crate) entropy: EntropyConfig,
}

impl Config {
    /// Equivalent to `config_init`: a configuration with every field at
    /// its default (best-available PRF, `/dev/urandom`, no sources
    /// disabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces a specific PRF implementation by name (`config_force_implementation`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::INVALID_ARGUMENT`] if `name` is not one of the
    /// documented implementation names, or names a backend this binary
    /// cannot run on the current host (e.g. a `-SIMD` name without the
    /// required CPU capability, or without being compiled in).
    pub fn force_implementation(&mut self, name: &str) -> Result<(), Error> {
        match prf::lookup(name) {
            Some(descriptor) => {
                self.prf = Some(descriptor);
                Ok(())
            }
            None => Err(Error::INVALID_ARGUMENT),
        }
    }

    /// Forces a specific PRF descriptor directly. This is how backends
    /// not named in the `config_force_implementation` string table (the
    /// optional AES-CTR backend behind the `aes-ni` feature) are
    /// reached.
    pub fn force_prf_descriptor(&mut self, descriptor: PrfDescriptor) {
        self.prf = Some(descriptor);
    }

    /// Overrides the device-RNG path (`config_set_urandom_device`).
    pub fn set_urandom_device(&mut self, path: impl AsRef<Path>) {
        self.entropy.urandom_device = path.as_ref().to_path_buf();
    }

    /// Disables the entropy sources set in `mask` (`config_disable_entropy_sources`).
    pub fn disable_entropy_sources(&mut self, mask: SourceFlags) {
        self.entropy.disabled_sources = mask;
    }

    /// Enables the `EGD` entropy source, connecting to the daemon at
    /// `addr` on each seed/reseed.
    pub fn set_egd_address(&mut self, addr: SocketAddr) {
        self.entropy.egd_addr = Some(addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_implementation_name_is_invalid_argument() {
        let mut cfg = Config::new();
        assert_eq!(cfg.force_implementation("NOT-A-PRF"), Err(Error::INVALID_ARGUMENT));
    }

    #[test]
    fn known_implementation_name_is_accepted() {
        let mut cfg = Config::new();
        assert!(cfg.force_implementation("CHACHA20-NOSIMD").is_ok());
        assert_eq!(cfg.prf.unwrap().implementation, "CHACHA20-NOSIMD");
    }

    #[test]
    fn default_urandom_device_is_dev_urandom() {
        let cfg = Config::new();
        assert_eq!(cfg.entropy.urandom_device, PathBuf::from("/dev/urandom"));
    }
}
