//! End-to-end tests against the public API, covering the scenarios in
//! `spec.md` §8 that don't need access to `generator::Inner`'s private
//! fields (those live alongside the implementation in `generator/mod.rs`).

use arc4rng::{Config, Engine, EngineNolock, Error};

#[test]
fn rand_bytes_never_touches_bytes_outside_the_requested_range() {
    let engine = Engine::init(Config::new()).unwrap();
    let mut arena = [0xccu8; 96];
    engine.rand_bytes(&mut arena[32..64]);
    assert!(arena[..32].iter().all(|&b| b == 0xcc));
    assert!(arena[64..].iter().all(|&b| b == 0xcc));
}

#[test]
fn rand_bytes_handles_zero_length_requests() {
    let engine = Engine::init(Config::new()).unwrap();
    let mut empty: [u8; 0] = [];
    engine.rand_bytes(&mut empty);
}

#[test]
fn rand_bytes_handles_large_bulk_requests() {
    // Exercises the bulk path in `rand_bytes` (several whole blocks plus
    // a trailing partial block), not just the small/medium path.
    let engine = Engine::init(Config::new()).unwrap();
    let mut out = vec![0u8; 10_000];
    engine.rand_bytes(&mut out);
    assert!(out.iter().any(|&b| b != 0), "10000 random bytes should not all be zero");
}

#[test]
fn range_is_tight_and_never_exceeds_top() {
    // Scenario 4: for top = 5, 1000 draws must hit every value in
    // 0..=5 and never exceed it.
    let engine = Engine::init(Config::new()).unwrap();
    let mut seen = [false; 6];
    for _ in 0..2000 {
        let v = engine.rand_range(5);
        assert!(v <= 5);
        seen[v as usize] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn range64_is_tight_and_never_exceeds_top() {
    let engine = Engine::init(Config::new()).unwrap();
    let mut seen = [false; 4];
    for _ in 0..2000 {
        let v = engine.rand_range64(3);
        assert!(v <= 3);
        seen[v as usize] = true;
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn range_handles_all_ones_top_without_looping_forever() {
    let engine = Engine::init(Config::new()).unwrap();
    for _ in 0..32 {
        assert!(engine.rand_range(u32::MAX) <= u32::MAX);
        assert!(engine.rand_range64(u64::MAX) <= u64::MAX);
    }
}

#[test]
fn force_implementation_accepts_every_documented_name() {
    for name in [
        "CHACHA", "CHACHA8", "CHACHA12", "CHACHA20",
        "CHACHA-NOSIMD", "CHACHA8-NOSIMD", "CHACHA12-NOSIMD", "CHACHA20-NOSIMD",
    ] {
        let mut cfg = Config::new();
        cfg.force_implementation(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        Engine::init(cfg).unwrap_or_else(|e| panic!("{name}: init failed: {e}"));
    }
}

#[test]
fn force_implementation_rejects_unknown_names() {
    let mut cfg = Config::new();
    assert_eq!(cfg.force_implementation("ARCFOUR"), Err(Error::INVALID_ARGUMENT));
}

#[test]
fn two_independently_seeded_engines_never_agree() {
    // Both engines draw fresh OS entropy at `init`, so even with the
    // same forced PRF their streams must not coincide.
    let mut cfg = Config::new();
    cfg.force_implementation("CHACHA20-NOSIMD").unwrap();
    let a = Engine::init(cfg.clone()).unwrap();
    let b = Engine::init(cfg).unwrap();

    let mut out_a = [0u8; 256];
    let mut out_b = [0u8; 256];
    a.rand_bytes(&mut out_a);
    b.rand_bytes(&mut out_b);
    assert_ne!(out_a, out_b);
}

#[test]
fn add_seed_perturbs_future_output() {
    let engine = Engine::init(Config::new()).unwrap();
    let mut before = [0u8; 64];
    engine.rand_bytes(&mut before);

    engine.add_seed(Some(b"chosen by fair dice roll.")).unwrap();

    let mut after = [0u8; 64];
    engine.rand_bytes(&mut after);
    assert_ne!(before, after);
}

#[test]
fn add_seed_with_no_seed_draws_fresh_entropy() {
    let engine = Engine::init(Config::new()).unwrap();
    engine.add_seed(None).unwrap();
    let mut out = [0u8; 32];
    engine.rand_bytes(&mut out);
    assert_ne!(out, [0u8; 32]);
}

#[test]
fn add_seed_longer_than_state_bytes_is_chunked_without_losing_bytes() {
    // `state_bytes` for every ChaCha descriptor is 40; this exercises
    // the multi-chunk path in `add_seed` (`m = min(n, state_bytes)`).
    let engine = Engine::init(Config::new()).unwrap();
    let seed = [0x5au8; 137];
    engine.add_seed(Some(&seed)).unwrap();
    let mut out = [0u8; 32];
    engine.rand_bytes(&mut out);
    assert_ne!(out, [0u8; 32]);
}

#[test]
fn nolock_engine_produces_output_and_can_move_across_threads() {
    let engine = EngineNolock::init(Config::new()).unwrap();
    let out = std::thread::spawn(move || {
        let mut buf = [0u8; 128];
        engine.rand_bytes(&mut buf);
        buf
    })
    .join()
    .unwrap();
    assert_ne!(out, [0u8; 128]);
}

#[test]
fn global_free_functions_round_trip() {
    let mut buf = [0u8; 32];
    arc4rng::rand_bytes(&mut buf);
    assert_ne!(buf, [0u8; 32]);

    assert!(arc4rng::rand_range(10) <= 10);
    assert!(arc4rng::rand_range64(10) <= 10);
    let _ = arc4rng::rand_unsigned();
    let _ = arc4rng::rand_uint32();
    let _ = arc4rng::rand_uint64();
    arc4rng::stir();

    assert!(arc4rng::get_sizeof_config() > 0);
    assert!(arc4rng::get_sizeof_state() > 0);
    assert!(arc4rng::get_sizeof_state_nolock() > 0);
}

#[test]
fn sizeof_state_and_state_nolock_agree_on_the_shared_inner_layout() {
    // Both engine flavors wrap the same `Inner`; only the synchronization
    // wrapper differs, so the two introspection sizes must be equal.
    assert_eq!(arc4rng::get_sizeof_state(), arc4rng::get_sizeof_state_nolock());
}

// Scenario 5: parent and child must diverge within the first 16 bytes
// after `fork()`, with overwhelming probability. `libc` is an ordinary
// (non-dev) dependency of this crate on unix, so it's reachable here too.
#[cfg(unix)]
#[test]
fn fork_divergence() {
    use std::io::{Read, Write};
    use std::os::unix::io::FromRawFd;

    // Touch the global engine before forking so the child inherits an
    // already-initialized copy of its state, same as a real fork() would
    // see mid-process.
    let mut warmup = [0u8; 8];
    arc4rng::rand_bytes(&mut warmup);

    let mut fds = [0i32; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    let (read_fd, write_fd) = (fds[0], fds[1]);

    let pid = unsafe { libc::fork() };
    assert!(pid >= 0, "fork() failed");

    if pid == 0 {
        // Child: read, report back over the pipe, and exit without
        // running any other test's destructors.
        unsafe { libc::close(read_fd) };
        let mut buf = [0u8; 256];
        arc4rng::rand_bytes(&mut buf);
        let mut writer = unsafe { std::fs::File::from_raw_fd(write_fd) };
        let _ = writer.write_all(&buf);
        drop(writer);
        unsafe { libc::_exit(0) };
    }

    unsafe { libc::close(write_fd) };
    let mut child_buf = [0u8; 256];
    let mut reader = unsafe { std::fs::File::from_raw_fd(read_fd) };
    reader.read_exact(&mut child_buf).expect("child should report 256 bytes");
    drop(reader);

    let mut status = 0i32;
    unsafe { libc::waitpid(pid, &mut status, 0) };

    let mut parent_buf = [0u8; 256];
    arc4rng::rand_bytes(&mut parent_buf);

    assert_ne!(
        parent_buf[..16],
        child_buf[..16],
        "parent and child must diverge within the first 16 bytes after fork()"
    );
}
