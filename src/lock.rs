//! Mutual-exclusion seam for dispatcher operations.
//!
//! Every data operation runs its body under [`LockPolicy::try_with`].
//! The scoped-closure shape guarantees the resource is released on
//! every exit path, including errors raised inside the body.

/// External mutual-exclusion resource consumed by the dispatcher.
///
/// Acquisition is allowed to fail; the dispatcher turns a failed
/// acquisition into [`NvmError::LockContended`](crate::NvmError::LockContended)
/// without blocking or retrying.
pub trait LockPolicy {
    /// Runs `f` under the lock, or returns `None` if the lock could
    /// not be acquired.
    fn try_with<R>(&mut self, f: impl FnOnce() -> R) -> Option<R>;
}

/// Lock backed by [`critical_section`].
///
/// Acquisition cannot fail; suitable when dispatcher calls may race
/// with interrupt-context access.
#[derive(Debug, Default, Clone, Copy)]
pub struct CriticalSectionLock;

impl LockPolicy for CriticalSectionLock {
    fn try_with<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
        Some(critical_section::with(|_| f()))
    }
}

/// No-op lock for single-logical-caller builds.
///
/// Assumes no interrupt-context or multi-thread access to the handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLock;

impl LockPolicy for NoLock {
    fn try_with<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
        Some(f())
    }
}
