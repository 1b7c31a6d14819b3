//! Accounting for backend-owned handles.
//!
//! Read ops, write ops and attribute iterators each hold a [`HandleGuard`].
//! Dropping the guard releases the handle, so a handle is released exactly
//! once no matter how the owning code returns. Executors that want to audit
//! leaks share a [`HandleStats`] with the guards they hand out.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The kinds of handle an executor hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    ReadOp,
    WriteOp,
    XattrIter,
}

impl HandleKind {
    fn index(self) -> usize {
        match self {
            Self::ReadOp => 0,
            Self::WriteOp => 1,
            Self::XattrIter => 2,
        }
    }
}

/// Counters of created and live handles, per kind.
#[derive(Debug, Default)]
pub struct HandleStats {
    created: [AtomicUsize; 3],
    live: [AtomicUsize; 3],
}

impl HandleStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new handle and return the guard that releases it.
    pub fn acquire(self: &Arc<Self>, kind: HandleKind) -> HandleGuard {
        self.created[kind.index()].fetch_add(1, Ordering::SeqCst);
        self.live[kind.index()].fetch_add(1, Ordering::SeqCst);
        HandleGuard {
            kind,
            stats: Some(Arc::clone(self)),
        }
    }

    /// Handles of `kind` acquired so far.
    pub fn created(&self, kind: HandleKind) -> usize {
        self.created[kind.index()].load(Ordering::SeqCst)
    }

    /// Handles of `kind` acquired and not yet released.
    pub fn live(&self, kind: HandleKind) -> usize {
        self.live[kind.index()].load(Ordering::SeqCst)
    }

    /// Returns `true` when no handle of any kind is outstanding.
    pub fn all_released(&self) -> bool {
        [HandleKind::ReadOp, HandleKind::WriteOp, HandleKind::XattrIter]
            .into_iter()
            .all(|kind| self.live(kind) == 0)
    }
}

/// Ownership token for one backend handle; releases it on drop.
pub struct HandleGuard {
    kind: HandleKind,
    stats: Option<Arc<HandleStats>>,
}

impl HandleGuard {
    /// A guard that is not accounted anywhere.
    pub fn untracked(kind: HandleKind) -> Self {
        Self { kind, stats: None }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        if let Some(stats) = &self.stats {
            stats.live[self.kind.index()].fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl fmt::Debug for HandleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleGuard")
            .field("kind", &self.kind)
            .field("tracked", &self.stats.is_some())
            .finish()
    }
}
