#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/media/8f1a9894/logo.svg"
)]

//! # Usage
//!
//! The simplest way to use this crate is through the free functions,
//! which operate on a lazily-initialized, process-wide engine:
//!
//! ```
//! let mut buf = [0u8; 32];
//! arc4rng::rand_bytes(&mut buf);
//! let die = arc4rng::rand_range(5); // uniform in [0, 5]
//! ```
//!
//! Programs that want their own engine, a non-default PRF, or control
//! over entropy sources construct a [`Config`] and build an
//! [`Engine`] (thread-safe) or [`EngineNolock`] (unsynchronized)
//! directly:
//!
//! ```
//! use arc4rng::{Config, Engine};
//!
//! let mut cfg = Config::new();
//! cfg.force_implementation("CHACHA20-NOSIMD")?;
//! let engine = Engine::init(cfg)?;
//!
//! let mut buf = [0u8; 16];
//! engine.rand_bytes(&mut buf);
//! # Ok::<(), arc4rng::Error>(())
//! ```
//!
//! # Design
//!
//! - A PRF registry ([`mod@prf`]) of interchangeable ChaCha8/12/20
//!   backends (scalar and SSE2, plus an optional AES-CTR backend behind
//!   the `aes-ni` feature), selected by name or by CPU capability.
//! - A buffered generator core ([`mod@generator`], not public — reached
//!   only through [`Engine`]/[`EngineNolock`]) that rekeys itself from
//!   its own output before ever yielding a byte, giving forward secrecy,
//!   and detects `fork()` by polling the owning pid.
//! - A multi-source entropy combiner ([`mod@entropy`]) that XORs
//!   together whichever of `/dev/urandom`, the OS CSPRNG syscall,
//!   `RDRAND`, and an optional EGD daemon are available and enabled.
//! - A small, stable error ABI ([`Error`]) and an installable
//!   fatal-error hook ([`set_fatal_handler`]) for the small set of
//!   conditions (uninitialized/wiped engine, misaligned state, a failed
//!   postfork reseed) this crate treats as unrecoverable.

mod config;
mod entropy;
mod error;
mod fatal;
mod generator;
mod global;
pub mod prf;

pub use config::{Config, EntropyConfig};
pub use entropy::SourceFlags;
pub use error::{Error, Result};
pub use fatal::{clear_fatal_handler, set_fatal_handler, FatalHandler};
pub use generator::locked::Engine;
pub use generator::nolock::EngineNolock;
pub use global::{
    add_seed, get_sizeof_config, get_sizeof_state, get_sizeof_state_nolock, init, rand_bytes,
    rand_range, rand_range64, rand_uint32, rand_uint64, rand_unsigned, stir, wipe,
};
