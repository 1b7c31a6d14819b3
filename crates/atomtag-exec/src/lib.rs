//! Remote execution contract for atomtag.
//!
//! The storage backend is reached through a small set of primitives: allocate
//! a read or write batch, schedule suboperations on it, execute it against one
//! object, and read back per-step results. This crate defines those
//! primitives and the status codes they report.
//!
//! # Modules
//!
//! - [`status`] -- raw [`Status`] codes and errno constants
//! - [`error`] -- [`ExecError`], the status-to-error translation
//! - [`op`] -- batch handles [`ReadOp`] and [`WriteOp`], [`CmpXattrOp`], [`CreateMode`]
//! - [`xattr`] -- the attribute cursor [`XattrIter`]
//! - [`handles`] -- handle release guards and [`HandleStats`]
//! - [`traits`] -- the [`ObjectExecutor`] trait
//! - [`memory`] -- [`MemoryCluster`], an in-memory executor for tests and embedding
//!
//! # Contract
//!
//! 1. A batch executes atomically against a single object.
//! 2. Read steps report individual statuses; callers must check each one.
//! 3. Handles (batches, attribute iterators) are released by dropping them.
//! 4. No retries happen at this layer.

pub mod error;
pub mod handles;
pub mod memory;
pub mod op;
pub mod status;
pub mod traits;
pub mod xattr;

pub use error::{ExecError, ExecResult};
pub use handles::{HandleGuard, HandleKind, HandleStats};
pub use memory::{Fault, MemoryCluster, StoredObject};
pub use op::{
    CmpXattrOp, CreateMode, ReadOp, ReadReply, ReadSlot, ReadStep, WriteOp, WriteStep, XattrsSlot,
};
pub use status::Status;
pub use traits::ObjectExecutor;
pub use xattr::{XattrEntry, XattrIter};
