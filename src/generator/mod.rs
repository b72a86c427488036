//! The buffered, forward-secure, fork-safe generator core.
//!
//! Grounded line-for-line against `ottery_st_*` in `original_source`: a
//! single `Inner` state machine shared by the locked ([`crate::Engine`])
//! and nolock ([`crate::EngineNolock`]) public wrappers.

pub(crate) mod locked;
pub(crate) mod nolock;

use crate::config::{Config, EntropyConfig};
use crate::entropy::{self, egd, rdrand, syscall, urandom, Source, SourceFlags};
use crate::error::Error;
use crate::fatal;
use crate::prf::{self, PrfDescriptor};
use zeroize::Zeroize;

/// `addr(state) XOR MAGIC_XOR` is stored in `magic`; any mismatch means
/// the engine was never initialized (or has since been wiped).
const MAGIC_XOR: usize = 0x11b0_7734;

/// The generator's mutable record. 16-byte aligned so its buffer/state
/// arrays satisfy the SIMD backends' alignment requirement by
/// construction (see [`Inner::is_aligned`] for the runtime check this
/// crate still performs, matching the source contract).
#[repr(align(16))]
pub(crate) struct Inner {
    buffer: [u8; prf::MAX_OUTPUT_LEN],
    state: [u8; prf::MAX_STATE_LEN],
    prf: PrfDescriptor,
    block_counter: u32,
    pos: usize,
    magic: usize,
    pid: u32,
    osrng_config: EntropyConfig,
    last_osrng_flags: SourceFlags,
    entropy_src_flags: SourceFlags,
}

fn current_pid() -> u32 {
    std::process::id()
}

fn build_sources(cfg: &EntropyConfig) -> Vec<Box<dyn Source>> {
    let mut sources: Vec<Box<dyn Source>> = vec![
        Box::new(urandom::RandomDev::new(cfg.urandom_device.clone())),
        Box::new(syscall::Syscall),
    ];
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    sources.push(Box::new(rdrand::Rdrand));
    if let Some(addr) = cfg.egd_addr {
        sources.push(Box::new(egd::Egd::new(egd::EgdAddr::Tcp(addr))));
    }
    sources
}

impl Inner {
    /// `init(engine, config)`: selects a PRF, validates it, rejects a
    /// misaligned record, reseeds from the entropy combiner, and records
    /// the owning pid. Magic is set only once every other step succeeds.
    pub(crate) fn init(cfg: Config) -> Result<Self, Error> {
        let prf = cfg.prf.unwrap_or_else(prf::default_descriptor);
        if !prf.check_invariants() {
            return Err(Error::INTERNAL);
        }

        let mut inner = Inner {
            buffer: [0u8; prf::MAX_OUTPUT_LEN],
            state: [0u8; prf::MAX_STATE_LEN],
            prf,
            block_counter: 0,
            pos: 0,
            magic: 0,
            pid: 0,
            osrng_config: cfg.entropy,
            last_osrng_flags: SourceFlags::empty(),
            entropy_src_flags: SourceFlags::empty(),
        };

        if !inner.is_aligned() {
            return Err(Error::STATE_ALIGNMENT);
        }

        inner.reseed()?;
        inner.pid = current_pid();
        inner.magic = inner.expected_magic();
        Ok(inner)
    }

    fn expected_magic(&self) -> usize {
        (core::ptr::addr_of!(self.state) as usize) ^ MAGIC_XOR
    }

    fn is_aligned(&self) -> bool {
        (core::ptr::addr_of!(self.state) as usize).trailing_zeros() >= 4
    }

    /// Panics-as-fatal guard used at the top of every operation except
    /// `init`: an engine whose magic doesn't match was never
    /// successfully initialized (or has been `wipe`d since).
    fn check_ready(&self) {
        if self.magic != self.expected_magic() {
            fatal::fatal(Error::from_raw(Error::STATE_INIT));
        }
    }

    /// Reseeds-on-fork: if the owning pid changed since the last
    /// (re)seed, parent and child must diverge before either yields
    /// another byte. A reseed failure here has no safe fallback and is
    /// therefore fatal, unlike a reseed failure from an explicit
    /// `init`/`add_seed` call.
    fn check_postfork(&mut self) {
        let pid = current_pid();
        if pid != self.pid {
            match self.reseed() {
                Ok(()) => self.pid = pid,
                Err(e) => fatal::fatal(e.with_flag(Error::FLAG_POSTFORK_RESEED)),
            }
        }
    }

    /// Internal: pulls a fresh seed from the entropy combiner, keys the
    /// PRF from it, and establishes the forward-secrecy invariant via
    /// [`Self::nextblock_rekey`].
    fn reseed(&mut self) -> Result<(), Error> {
        let k = self.prf.state_bytes;
        let mut seed = [0u8; prf::MAX_STATE_BYTES];
        let sources = build_sources(&self.osrng_config);
        let refs: Vec<&dyn Source> = sources.iter().map(std::convert::AsRef::as_ref).collect();
        let flags = entropy::combine(&refs, &mut seed[..k], self.osrng_config.disabled_sources, SourceFlags::empty())?;

        (self.prf.setup)(&mut self.state[..self.prf.state_len], &seed[..k]);
        self.block_counter = 0;
        self.nextblock_rekey();

        seed.zeroize();
        self.last_osrng_flags = flags;
        self.entropy_src_flags |= flags;
        Ok(())
    }

    /// `nextblock_norekey`: emits one block at the current counter,
    /// advances it by `idx_step`, then wipes a fixed-size stack region
    /// to purge any cipher intermediates the backend may have spilled.
    fn nextblock_norekey(&mut self) {
        let l = self.prf.output_len;
        (self.prf.generate)(&self.state[..self.prf.state_len], &mut self.buffer[..l], self.block_counter);
        self.block_counter = self.block_counter.wrapping_add(self.prf.idx_step);
        wipe_stack_scratch();
    }

    /// `nextblock_rekey`: `nextblock_norekey`, then re-key the PRF from
    /// the first `state_bytes` of the block just produced and zero them
    /// — the core forward-secrecy step. `pos` lands on `state_bytes`:
    /// those bytes are consumed as the new key and are never handed to
    /// a caller.
    fn nextblock_rekey(&mut self) {
        self.nextblock_norekey();
        let k = self.prf.state_bytes;
        let state_len = self.prf.state_len;
        (self.prf.setup)(&mut self.state[..state_len], &self.buffer[..k]);
        self.buffer[..k].zeroize();
        self.block_counter = 0;
        self.pos = k;
    }

    /// Copies up to `out.len()` bytes from the current buffer position,
    /// zeroing what it yields, rekeying if that exhausts the block.
    /// Returns the number of bytes written (may be less than
    /// `out.len()` if the buffer ran out first).
    fn serve_from_buffer(&mut self, out: &mut [u8]) -> usize {
        let l = self.prf.output_len;
        let available = l - self.pos;
        let take = out.len().min(available);
        let pos = self.pos;
        out[..take].copy_from_slice(&self.buffer[pos..pos + take]);
        self.buffer[pos..pos + take].zeroize();
        self.pos += take;
        if self.pos == l {
            self.nextblock_rekey();
        }
        take
    }

    /// `rand_bytes`: the main generator algorithm. Small/medium requests
    /// rekey at every block boundary they cross; large requests drain
    /// whole blocks in bulk and rekey once at the end.
    pub(crate) fn rand_bytes(&mut self, out: &mut [u8]) {
        self.check_ready();
        self.check_postfork();

        let l = self.prf.output_len;
        let k = self.prf.state_bytes;
        let mut written = 0usize;

        if out.len() + self.pos < 2 * l - k - 1 {
            while written < out.len() {
                written += self.serve_from_buffer(&mut out[written..]);
            }
        } else {
            written += self.serve_from_buffer(&mut out[written..]);
            let mut remaining = out.len() - written;

            while remaining >= l {
                self.nextblock_norekey();
                out[written..written + l].copy_from_slice(&self.buffer[..l]);
                self.buffer[..l].zeroize();
                written += l;
                remaining -= l;
            }

            self.nextblock_rekey();
            while written < out.len() {
                written += self.serve_from_buffer(&mut out[written..]);
            }
        }
        debug_assert_eq!(written, out.len());
    }

    fn rand_fixed<const S: usize>(&mut self) -> [u8; S] {
        self.check_ready();
        self.check_postfork();

        let l = self.prf.output_len;
        let mut out = [0u8; S];

        if self.pos + S <= l {
            let pos = self.pos;
            out.copy_from_slice(&self.buffer[pos..pos + S]);
            self.buffer[pos..pos + S].zeroize();
            self.pos += S;
            if self.pos == l {
                self.nextblock_rekey();
            }
        } else {
            let pos = self.pos;
            self.buffer[pos..l].zeroize();
            self.pos = l;
            self.nextblock_rekey();

            let pos = self.pos;
            out.copy_from_slice(&self.buffer[pos..pos + S]);
            self.buffer[pos..pos + S].zeroize();
            self.pos += S;
        }
        out
    }

    /// `rand_unsigned`: a machine `unsigned int`, modeled as `u32`.
    pub(crate) fn rand_unsigned(&mut self) -> u32 {
        self.rand_uint32()
    }

    pub(crate) fn rand_uint32(&mut self) -> u32 {
        u32::from_le_bytes(self.rand_fixed::<4>())
    }

    pub(crate) fn rand_uint64(&mut self) -> u64 {
        u64::from_le_bytes(self.rand_fixed::<8>())
    }

    /// Rejection-sampled uniform integer in `[0, top]`.
    pub(crate) fn rand_range(&mut self, top: u32) -> u32 {
        let lim = top.wrapping_add(1);
        let divisor: u32 = if lim == 0 { 1 } else { u32::MAX / lim };
        loop {
            let q = self.rand_uint32() / divisor;
            if q <= top {
                return q;
            }
        }
    }

    /// Rejection-sampled uniform integer in `[0, top]`, 64-bit.
    pub(crate) fn rand_range64(&mut self, top: u64) -> u64 {
        let lim = top.wrapping_add(1);
        let divisor: u64 = if lim == 0 { 1 } else { u64::MAX / lim };
        loop {
            let q = self.rand_uint64() / divisor;
            if q <= top {
                return q;
            }
        }
    }

    /// Runs the usual init/postfork checks and returns what a caller
    /// needs to draw seed entropy *without* holding the engine lock:
    /// the number of key bytes required and a clone of the entropy
    /// config. Used by [`locked::Engine::add_seed`] to release the
    /// mutex around the (possibly blocking) entropy combiner call when
    /// the caller supplied no seed of their own, per `spec.md` §5.
    pub(crate) fn snapshot_for_unlocked_seed(&mut self) -> (usize, EntropyConfig) {
        self.check_ready();
        self.check_postfork();
        (self.prf.state_bytes, self.osrng_config.clone())
    }

    /// `add_seed`: mixes `seed` (or, if `None`/empty, fresh entropy) into
    /// the running key in chunks of at most `state_bytes`, rekeying once
    /// more at the end to restore the forward-secrecy invariant.
    pub(crate) fn add_seed(&mut self, seed: Option<&[u8]>) -> Result<(), Error> {
        self.check_ready();
        self.check_postfork();

        let k = self.prf.state_bytes;
        let l = self.prf.output_len;
        let mut owned_seed = [0u8; prf::MAX_STATE_BYTES];

        let seed_slice: &[u8] = match seed {
            Some(s) if !s.is_empty() => s,
            _ => {
                let sources = build_sources(&self.osrng_config);
                let refs: Vec<&dyn Source> = sources.iter().map(std::convert::AsRef::as_ref).collect();
                entropy::combine(&refs, &mut owned_seed[..k], self.osrng_config.disabled_sources, SourceFlags::empty())?;
                &owned_seed[..k]
            }
        };

        let mut remaining = seed_slice;
        while !remaining.is_empty() {
            let m = remaining.len().min(k);
            self.nextblock_norekey();
            for (b, s) in self.buffer[..m].iter_mut().zip(&remaining[..m]) {
                *b ^= s;
            }
            let state_len = self.prf.state_len;
            (self.prf.setup)(&mut self.state[..state_len], &self.buffer[..k]);
            self.buffer[..l].zeroize();
            self.block_counter = 0;
            remaining = &remaining[m..];
        }
        self.nextblock_rekey();

        owned_seed.zeroize();
        Ok(())
    }

    /// `stir`: a no-op in this crate, which always enforces
    /// byte-granularity forward secrecy (every yielded byte is cleared
    /// already; there is no compile-time toggle to disable that).
    pub(crate) fn stir(&self) {
        self.check_ready();
    }

    /// `wipe`: overwrites every secret-bearing field with zero and
    /// clears `magic`, returning the engine to the uninitialized state.
    pub(crate) fn wipe(&mut self) {
        self.check_ready();
        self.buffer.zeroize();
        self.state.zeroize();
        self.block_counter = 0;
        self.pos = 0;
        self.magic = 0;
        self.pid = 0;
        self.last_osrng_flags = SourceFlags::empty();
        self.entropy_src_flags = SourceFlags::empty();
    }

    /// Size in bytes of this record, for `get_sizeof_state[_nolock]`.
    pub(crate) const fn size_of() -> usize {
        core::mem::size_of::<Inner>()
    }
}

/// Non-elidable wipe of 512 bytes of stack, run after every block
/// generation to purge any cipher intermediates a backend spilled.
/// The exact mechanism isn't mandated beyond "a write the compiler may
/// not elide"; `zeroize` is the same crate the rest of this module uses
/// for that purpose.
fn wipe_stack_scratch() {
    let mut scratch = [0xa5u8; 512];
    scratch.zeroize();
    core::hint::black_box(&scratch);
}
