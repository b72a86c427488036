use core::fmt;

/// Stable, ABI-style error code.
///
/// Mirrors the `OTTERY_ERR_*` taxonomy: a base code in the low 12 bits,
/// plus high-bit flags (`STATE_INIT`, `FLAG_GLOBAL_PRNG_INIT`,
/// `FLAG_POSTFORK_RESEED`) OR'd in when a fatal condition carries extra
/// context. [`Error::is_fatal`] is exactly `(code & !0xfff) != 0`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Error(u32);

impl Error {
    /// No error.
    pub const NONE: Error = Error(0);
    /// Mutex (or other synchronization primitive) failed to initialize.
    pub const LOCK_INIT: Error = Error(1);
    /// An internal invariant was violated (e.g. a malformed PRF descriptor).
    pub const INTERNAL: Error = Error(2);
    /// A strong entropy source could not be opened/acquired.
    pub const INIT_STRONG_RNG: Error = Error(3);
    /// A strong entropy source was opened but did not yield enough bytes.
    pub const ACCESS_STRONG_RNG: Error = Error(4);
    /// A caller-supplied argument (e.g. an implementation name) is invalid.
    pub const INVALID_ARGUMENT: Error = Error(5);
    /// An engine is not aligned to the 16-byte SIMD boundary it requires.
    pub const STATE_ALIGNMENT: Error = Error(6);

    /// Flag: the engine was observed in an uninitialized state.
    pub const STATE_INIT: u32 = 0x1000;
    /// Flag: the failure happened while initializing the global engine.
    pub const FLAG_GLOBAL_PRNG_INIT: u32 = 0x2000;
    /// Flag: the failure happened during an automatic postfork reseed.
    pub const FLAG_POSTFORK_RESEED: u32 = 0x4000;

    const BASE_MASK: u32 = 0xfff;

    /// Builds an error from a raw code, for values not covered by a
    /// named constant (flag combinations).
    #[must_use]
    pub const fn from_raw(code: u32) -> Self {
        Error(code)
    }

    /// The raw numeric code, flags included.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Returns this error with `flag` OR'd into the high bits.
    #[must_use]
    pub const fn with_flag(self, flag: u32) -> Self {
        Error(self.0 | flag)
    }

    /// True iff no error occurred.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True iff this error class is fatal: any flag bit above the low
    /// 12 bits is set. Fatal errors are routed to the installed
    /// [`crate::fatal`] handler rather than returned to the caller.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        (self.0 & !Self::BASE_MASK) != 0
    }

    /// The base (non-flag) portion of the code.
    #[must_use]
    pub const fn base(self) -> u32 {
        self.0 & Self::BASE_MASK
    }

    fn base_message(self) -> &'static str {
        match self.base() {
            0 => "no error",
            1 => "lock initialization failed",
            2 => "internal invariant violation",
            3 => "failed to initialize a strong entropy source",
            4 => "failed to read from a strong entropy source",
            5 => "invalid argument",
            6 => "engine state is not 16-byte aligned",
            _ => "unknown error",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("base", &self.base())
            .field("is_fatal", &self.is_fatal())
            .field("code", &format_args!("{:#06x}", self.0))
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_message())?;
        if self.0 & Self::STATE_INIT != 0 {
            write!(f, " (engine uninitialized)")?;
        }
        if self.0 & Self::FLAG_GLOBAL_PRNG_INIT != 0 {
            write!(f, " (global engine initialization)")?;
        }
        if self.0 & Self::FLAG_POSTFORK_RESEED != 0 {
            write!(f, " (postfork reseed)")?;
        }
        Ok(())
    }
}

impl core::error::Error for Error {}

impl From<Error> for u32 {
    fn from(err: Error) -> u32 {
        err.0
    }
}

/// Convenience alias for this crate's fallible return type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification_matches_flag_bits() {
        assert!(!Error::NONE.is_fatal());
        assert!(!Error::INVALID_ARGUMENT.is_fatal());
        assert!(Error::INTERNAL.with_flag(Error::STATE_INIT).is_fatal());
        assert!(Error::NONE.with_flag(Error::FLAG_POSTFORK_RESEED).is_fatal());
    }

    #[test]
    fn base_strips_flags() {
        let e = Error::ACCESS_STRONG_RNG.with_flag(Error::FLAG_POSTFORK_RESEED);
        assert_eq!(e.base(), Error::ACCESS_STRONG_RNG.code());
    }
}
