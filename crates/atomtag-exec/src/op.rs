//! Batch handles: read ops and write ops.
//!
//! A batch is built by scheduling suboperations on a handle, then handed to
//! an [`ObjectExecutor`](crate::ObjectExecutor) which runs every step as one
//! atomic unit. Read steps report their results through slots returned at
//! scheduling time.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;

use crate::handles::HandleGuard;
use crate::status::{Status, EIO};
use crate::xattr::XattrIter;

/// Comparison applied by a compare-attribute step.
///
/// The stored attribute value is the left operand, the scheduled value the
/// right one. Values compare as byte strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpXattrOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpXattrOp {
    /// Evaluate the comparison.
    pub fn matches(self, current: &[u8], operand: &[u8]) -> bool {
        let ord = current.cmp(operand);
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ne => ord != Ordering::Equal,
            Self::Gt => ord == Ordering::Greater,
            Self::Gte => ord != Ordering::Less,
            Self::Lt => ord == Ordering::Less,
            Self::Lte => ord != Ordering::Greater,
        }
    }
}

impl fmt::Display for CmpXattrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        };
        f.write_str(s)
    }
}

/// Behaviour of a create step when the object already exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreateMode {
    /// Fail the batch with `EEXIST`.
    Exclusive,
    /// Succeed without touching the object.
    Idempotent,
}

// ---------------------------------------------------------------------------
// Read ops
// ---------------------------------------------------------------------------

/// A scheduled read step.
#[derive(Debug)]
pub enum ReadStep<'a> {
    /// Copy up to `dest.len()` bytes starting at `offset` into `dest`.
    Read { offset: u64, dest: &'a mut [u8] },
    /// List the object's extended attributes.
    GetXattrs,
}

/// Result of a read step, filled in by the executor.
#[derive(Debug)]
pub enum ReadReply {
    Read { filled: usize, status: Status },
    Xattrs { iter: Option<XattrIter>, status: Status },
}

/// Handle to the result of a scheduled range read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadSlot(usize);

/// Handle to the result of a scheduled attribute listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XattrsSlot(usize);

/// An atomic read batch.
///
/// Steps the executor never reached report `-EIO`.
#[derive(Debug)]
pub struct ReadOp<'a> {
    steps: Vec<ReadStep<'a>>,
    replies: Vec<Option<ReadReply>>,
    _guard: HandleGuard,
}

impl<'a> ReadOp<'a> {
    pub fn new(guard: HandleGuard) -> Self {
        Self {
            steps: Vec::new(),
            replies: Vec::new(),
            _guard: guard,
        }
    }

    /// Schedule a range read into `dest`.
    pub fn read(&mut self, offset: u64, dest: &'a mut [u8]) -> ReadSlot {
        self.steps.push(ReadStep::Read { offset, dest });
        self.replies.push(None);
        ReadSlot(self.steps.len() - 1)
    }

    /// Schedule an attribute listing.
    pub fn get_xattrs(&mut self) -> XattrsSlot {
        self.steps.push(ReadStep::GetXattrs);
        self.replies.push(None);
        XattrsSlot(self.steps.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Scheduled steps, for executors.
    pub fn steps_mut(&mut self) -> &mut [ReadStep<'a>] {
        &mut self.steps
    }

    /// Record step replies, in step order. Executors call this once.
    pub fn complete(&mut self, replies: Vec<ReadReply>) {
        for (slot, reply) in self.replies.iter_mut().zip(replies) {
            *slot = Some(reply);
        }
    }

    /// Bytes filled and status of a range read.
    pub fn read_reply(&self, slot: ReadSlot) -> (usize, Status) {
        match self.replies.get(slot.0) {
            Some(Some(ReadReply::Read { filled, status })) => (*filled, *status),
            _ => (0, Status::from_errno(EIO)),
        }
    }

    /// Take the iterator and status of an attribute listing.
    ///
    /// The iterator can be taken once; later calls return `None` for it.
    pub fn take_xattrs(&mut self, slot: XattrsSlot) -> (Option<XattrIter>, Status) {
        match self.replies.get_mut(slot.0) {
            Some(Some(ReadReply::Xattrs { iter, status })) => (iter.take(), *status),
            _ => (None, Status::from_errno(EIO)),
        }
    }
}

// ---------------------------------------------------------------------------
// Write ops
// ---------------------------------------------------------------------------

/// A scheduled write step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteStep {
    Create(CreateMode),
    CmpXattr {
        name: String,
        op: CmpXattrOp,
        value: Bytes,
    },
    /// Replace the whole object body.
    WriteFull(Bytes),
    SetXattr {
        name: String,
        value: Bytes,
    },
}

/// An atomic write batch. Arguments are copied when scheduled.
#[derive(Debug)]
pub struct WriteOp {
    steps: Vec<WriteStep>,
    _guard: HandleGuard,
}

impl WriteOp {
    pub fn new(guard: HandleGuard) -> Self {
        Self {
            steps: Vec::new(),
            _guard: guard,
        }
    }

    pub fn create(&mut self, mode: CreateMode) {
        self.steps.push(WriteStep::Create(mode));
    }

    pub fn cmp_xattr(&mut self, name: &str, op: CmpXattrOp, value: &[u8]) {
        self.steps.push(WriteStep::CmpXattr {
            name: name.to_string(),
            op,
            value: Bytes::copy_from_slice(value),
        });
    }

    pub fn write_full(&mut self, data: &[u8]) {
        self.steps.push(WriteStep::WriteFull(Bytes::copy_from_slice(data)));
    }

    pub fn set_xattr(&mut self, name: &str, value: &[u8]) {
        self.steps.push(WriteStep::SetXattr {
            name: name.to_string(),
            value: Bytes::copy_from_slice(value),
        });
    }

    pub fn steps(&self) -> &[WriteStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
