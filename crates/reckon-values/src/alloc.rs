//! Fallible allocation seam for matrix backing buffers.
//!
//! Every fresh buffer the store hands out is reserved through these helpers
//! so that an allocation failure surfaces as `InsufficientMemory` instead of
//! aborting the process. Callers must obtain all buffers they need *before*
//! mutating any existing state; the rollback guarantees in `matrix` depend
//! on that ordering.
//!
//! With the `testing` feature enabled, [`fault`] lets tests trip a failure
//! at a chosen allocation, which is the only practical way to exercise the
//! rollback paths deterministically.

use crate::error::{CalcError, Result};

/// Allocate a vector of `len` copies of `fill`.
pub fn try_vec<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
    fault_check()?;
    let mut v: Vec<T> = Vec::new();
    if v.try_reserve_exact(len).is_err() {
        return Err(CalcError::InsufficientMemory);
    }
    v.resize(len, fill);
    Ok(v)
}

/// Clone a slice into a freshly allocated buffer.
pub fn try_clone<T: Clone>(src: &[T]) -> Result<Vec<T>> {
    fault_check()?;
    let mut v: Vec<T> = Vec::new();
    if v.try_reserve_exact(src.len()).is_err() {
        return Err(CalcError::InsufficientMemory);
    }
    v.extend_from_slice(src);
    Ok(v)
}

/// Reserve room for `extra` additional elements on an existing buffer.
pub fn try_grow<T>(v: &mut Vec<T>, extra: usize) -> Result<()> {
    fault_check()?;
    v.try_reserve_exact(extra)
        .map_err(|_| CalcError::InsufficientMemory)
}

/// A shrinking reallocation can fail too; rollback paths must see that
/// failure before any element is truncated.
pub fn shrink_check() -> Result<()> {
    fault_check()
}

#[cfg(feature = "testing")]
pub mod fault {
    //! Deterministic allocation-failure injection.

    use std::cell::Cell;

    thread_local! {
        static REMAINING: Cell<Option<usize>> = const { Cell::new(None) };
    }

    /// Let the next `n` allocation checks succeed, then fail every later one
    /// until [`reset`] is called.
    pub fn fail_after(n: usize) {
        REMAINING.with(|r| r.set(Some(n)));
    }

    /// Disarm the injector.
    pub fn reset() {
        REMAINING.with(|r| r.set(None));
    }

    pub(crate) fn tripped() -> bool {
        REMAINING.with(|r| match r.get() {
            None => false,
            Some(0) => true,
            Some(n) => {
                r.set(Some(n - 1));
                false
            }
        })
    }
}

fn fault_check() -> Result<()> {
    #[cfg(feature = "testing")]
    if fault::tripped() {
        return Err(CalcError::InsufficientMemory);
    }
    Ok(())
}
