//! Fatal-error handler hook.
//!
//! Five error classes are fatal (uninitialized use, misaligned state,
//! lock-init failure, postfork-reseed failure, internal invariant
//! violation). They are never silently ignored: the installed handler is
//! invoked, and the process aborts whether or not the handler returns.
//! A handler that wants to do anything other than log/record the error
//! before termination has already exceeded its documented contract.

use crate::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fatal-error callback. See the [module docs](self) for the contract.
pub type FatalHandler = fn(Error);

static HANDLER: AtomicUsize = AtomicUsize::new(0);

/// Installs `handler` as the process-wide fatal-error callback,
/// replacing any previously installed handler.
pub fn set_fatal_handler(handler: FatalHandler) {
    HANDLER.store(handler as usize, Ordering::SeqCst);
}

/// Removes any installed handler, reverting to abort-only behavior.
pub fn clear_fatal_handler() {
    HANDLER.store(0, Ordering::SeqCst);
}

fn installed_handler() -> Option<FatalHandler> {
    let raw = HANDLER.load(Ordering::SeqCst);
    if raw == 0 {
        None
    } else {
        // Safety: the only values ever stored are `0` or a `FatalHandler`
        // cast to `usize` by `set_fatal_handler`, so the transmute below
        // reconstructs a valid function pointer of the original type.
        Some(unsafe { core::mem::transmute::<usize, FatalHandler>(raw) })
    }
}

/// Reports a fatal error: invokes the installed handler (if any), then
/// unconditionally terminates the process. Never returns.
pub(crate) fn fatal(err: Error) -> ! {
    if let Some(handler) = installed_handler() {
        handler(err);
    }
    std::process::abort()
}
