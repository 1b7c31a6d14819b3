use std::sync::Arc;

use crate::op::{ReadOp, WriteOp};
use crate::status::Status;

/// Remote execution service for atomic object batches.
///
/// Implementations must satisfy these invariants:
/// - Every step of a batch runs in scheduled order against one object.
/// - A write batch is all-or-nothing: if any step fails, none of its effects
///   are visible to any other batch.
/// - Batches on the same object are serialized.
/// - `operate_read` reports per-step results through the op's replies; the
///   returned status covers the batch as a whole.
/// - Calls block until the backend answers; timeouts surface as a negative
///   status, never as a panic.
pub trait ObjectExecutor: Send + Sync {
    /// Allocate a read batch handle.
    fn create_read_op<'a>(&self) -> ReadOp<'a>;

    /// Allocate a write batch handle.
    fn create_write_op(&self) -> WriteOp;

    /// Execute a read batch against `oid`.
    fn operate_read(&self, op: &mut ReadOp<'_>, oid: &str) -> Status;

    /// Execute a write batch against `oid`.
    fn operate_write(&self, op: &WriteOp, oid: &str) -> Status;
}

impl<E: ObjectExecutor + ?Sized> ObjectExecutor for Arc<E> {
    fn create_read_op<'a>(&self) -> ReadOp<'a> {
        (**self).create_read_op()
    }

    fn create_write_op(&self) -> WriteOp {
        (**self).create_write_op()
    }

    fn operate_read(&self, op: &mut ReadOp<'_>, oid: &str) -> Status {
        (**self).operate_read(op, oid)
    }

    fn operate_write(&self, op: &WriteOp, oid: &str) -> Status {
        (**self).operate_write(op, oid)
    }
}
