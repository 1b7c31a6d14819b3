use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use tracing::debug;

use crate::handles::{HandleKind, HandleStats};
use crate::op::{CreateMode, ReadOp, ReadReply, ReadStep, WriteOp, WriteStep};
use crate::status::{Status, ECANCELED, EEXIST, ENOENT};
use crate::traits::ObjectExecutor;
use crate::xattr::XattrIter;

/// An object as held by [`MemoryCluster`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Bytes,
    /// Extended attributes, listed in name order.
    pub xattrs: BTreeMap<String, Bytes>,
}

impl StoredObject {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            xattrs: BTreeMap::new(),
        }
    }

    pub fn with_xattr(mut self, name: &str, value: impl Into<Bytes>) -> Self {
        self.xattrs.insert(name.to_string(), value.into());
        self
    }
}

/// A one-shot failure injected into [`MemoryCluster`].
///
/// `Operate` is consumed by the next batch of either kind. The step and
/// iterator faults stay queued until a read batch reaches an existing object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The whole batch fails with `-errno`.
    Operate(i32),
    /// The range read step of a read batch fails with `-errno`.
    ReadStep(i32),
    /// The attribute listing step of a read batch fails with `-errno`.
    XattrsStep(i32),
    /// The attribute iterator fails on its `index`-th advance.
    XattrIterAt { index: usize, errno: i32 },
}

/// In-memory executor.
///
/// Write batches run under the write lock against a staged copy of the
/// object and are committed only if every step succeeds. Read batches run
/// under the read lock and hand out attribute snapshots. Every handle is
/// accounted in [`HandleStats`].
pub struct MemoryCluster {
    objects: RwLock<HashMap<String, StoredObject>>,
    handles: Arc<HandleStats>,
    faults: Mutex<VecDeque<Fault>>,
    operations: AtomicUsize,
}

impl MemoryCluster {
    /// Create an empty cluster.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            handles: Arc::new(HandleStats::new()),
            faults: Mutex::new(VecDeque::new()),
            operations: AtomicUsize::new(0),
        }
    }

    /// Handle counters for this cluster.
    pub fn handles(&self) -> &HandleStats {
        &self.handles
    }

    /// Number of batches executed so far.
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Queue a fault; see [`Fault`] for which batch consumes it.
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().expect("lock poisoned").push_back(fault);
    }

    /// Copy of the object stored under `oid`.
    pub fn object(&self, oid: &str) -> Option<StoredObject> {
        self.objects.read().expect("lock poisoned").get(oid).cloned()
    }

    /// Store `object` under `oid`, bypassing batches.
    pub fn insert(&self, oid: &str, object: StoredObject) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(oid.to_string(), object);
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no object is stored.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Count a batch and take the first queued `Operate` fault, if any.
    fn begin(&self) -> Option<i32> {
        self.operations.fetch_add(1, Ordering::SeqCst);
        match self.take_fault(|f| matches!(f, Fault::Operate(_))) {
            Some(Fault::Operate(errno)) => Some(errno),
            _ => None,
        }
    }

    fn take_fault(&self, applies: impl FnMut(&Fault) -> bool) -> Option<Fault> {
        let mut faults = self.faults.lock().expect("lock poisoned");
        let index = faults.iter().position(applies)?;
        faults.remove(index)
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectExecutor for MemoryCluster {
    fn create_read_op<'a>(&self) -> ReadOp<'a> {
        ReadOp::new(self.handles.acquire(HandleKind::ReadOp))
    }

    fn create_write_op(&self) -> WriteOp {
        WriteOp::new(self.handles.acquire(HandleKind::WriteOp))
    }

    fn operate_read(&self, op: &mut ReadOp<'_>, oid: &str) -> Status {
        if let Some(errno) = self.begin() {
            debug!(oid, errno, "injected read batch failure");
            return Status::from_errno(errno);
        }

        let objects = self.objects.read().expect("lock poisoned");
        let Some(object) = objects.get(oid) else {
            return Status::from_errno(ENOENT);
        };
        let fault = self.take_fault(|f| !matches!(f, Fault::Operate(_)));

        let mut replies = Vec::with_capacity(op.len());
        for step in op.steps_mut() {
            let reply = match step {
                ReadStep::Read { offset, dest } => match fault {
                    Some(Fault::ReadStep(errno)) => ReadReply::Read {
                        filled: 0,
                        status: Status::from_errno(errno),
                    },
                    _ => ReadReply::Read {
                        filled: copy_range(&object.data, *offset, dest),
                        status: Status::OK,
                    },
                },
                ReadStep::GetXattrs => match fault {
                    Some(Fault::XattrsStep(errno)) => ReadReply::Xattrs {
                        iter: None,
                        status: Status::from_errno(errno),
                    },
                    _ => {
                        let entries = object
                            .xattrs
                            .iter()
                            .map(|(name, value)| (name.clone(), value.clone()))
                            .collect();
                        let mut iter =
                            XattrIter::new(entries, self.handles.acquire(HandleKind::XattrIter));
                        if let Some(Fault::XattrIterAt { index, errno }) = fault {
                            iter = iter.fail_at(index, Status::from_errno(errno));
                        }
                        ReadReply::Xattrs {
                            iter: Some(iter),
                            status: Status::OK,
                        }
                    }
                },
            };
            replies.push(reply);
        }
        op.complete(replies);
        Status::OK
    }

    fn operate_write(&self, op: &WriteOp, oid: &str) -> Status {
        if let Some(errno) = self.begin() {
            debug!(oid, errno, "injected write batch failure");
            return Status::from_errno(errno);
        }

        let mut objects = self.objects.write().expect("lock poisoned");
        let mut staged = objects.get(oid).cloned();
        for (index, step) in op.steps().iter().enumerate() {
            if let Err(status) = apply_write_step(&mut staged, step) {
                debug!(oid, step = index, code = status.raw(), "write batch aborted");
                return status;
            }
        }
        if let Some(object) = staged {
            objects.insert(oid.to_string(), object);
        }
        Status::OK
    }
}

impl std::fmt::Debug for MemoryCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCluster")
            .field("object_count", &self.len())
            .field("operations", &self.operations())
            .finish()
    }
}

fn copy_range(data: &[u8], offset: u64, dest: &mut [u8]) -> usize {
    let Ok(start) = usize::try_from(offset) else {
        return 0;
    };
    if start >= data.len() {
        return 0;
    }
    let n = dest.len().min(data.len() - start);
    dest[..n].copy_from_slice(&data[start..start + n]);
    n
}

fn apply_write_step(staged: &mut Option<StoredObject>, step: &WriteStep) -> Result<(), Status> {
    match step {
        WriteStep::Create(CreateMode::Exclusive) => {
            if staged.is_some() {
                return Err(Status::from_errno(EEXIST));
            }
            *staged = Some(StoredObject::default());
        }
        WriteStep::Create(CreateMode::Idempotent) => {
            staged.get_or_insert_with(StoredObject::default);
        }
        WriteStep::CmpXattr { name, op, value } => {
            let object = staged.as_ref().ok_or(Status::from_errno(ENOENT))?;
            match object.xattrs.get(name) {
                Some(current) if op.matches(current, value) => {}
                _ => return Err(Status::from_errno(ECANCELED)),
            }
        }
        WriteStep::WriteFull(data) => {
            staged.get_or_insert_with(StoredObject::default).data = data.clone();
        }
        WriteStep::SetXattr { name, value } => {
            staged
                .get_or_insert_with(StoredObject::default)
                .xattrs
                .insert(name.clone(), value.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::CmpXattrOp;
    use crate::status::EIO;

    fn seeded() -> MemoryCluster {
        let cluster = MemoryCluster::new();
        cluster.insert(
            "obj",
            StoredObject::new(&b"hello world"[..])
                .with_xattr("tag", &b"v1"[..])
                .with_xattr("owner", &b"alice"[..]),
        );
        cluster
    }

    // -----------------------------------------------------------------------
    // Read batches
    // -----------------------------------------------------------------------

    #[test]
    fn read_batch_fills_buffer_and_lists_xattrs() {
        let cluster = seeded();
        let mut buf = [0u8; 5];
        let mut op = cluster.create_read_op();
        let read = op.read(6, &mut buf);
        let xattrs = op.get_xattrs();

        assert!(cluster.operate_read(&mut op, "obj").is_ok());
        assert_eq!(op.read_reply(read), (5, Status::OK));

        let (iter, status) = op.take_xattrs(xattrs);
        assert!(status.is_ok());
        let mut iter = iter.expect("iterator");
        // Attributes come back in name order.
        assert_eq!(iter.next_entry().name.as_deref(), Some("owner"));
        assert_eq!(iter.next_entry().name.as_deref(), Some("tag"));
        assert!(iter.next_entry().is_end());

        drop(iter);
        drop(op);
        assert_eq!(&buf, b"world");
        assert!(cluster.handles().all_released());
    }

    #[test]
    fn short_and_past_end_reads() {
        let cluster = seeded();
        let mut big = [0u8; 64];
        let mut op = cluster.create_read_op();
        let slot = op.read(0, &mut big);
        cluster.operate_read(&mut op, "obj");
        assert_eq!(op.read_reply(slot).0, 11);
        drop(op);

        let mut buf = [0u8; 4];
        let mut op = cluster.create_read_op();
        let slot = op.read(100, &mut buf);
        cluster.operate_read(&mut op, "obj");
        assert_eq!(op.read_reply(slot), (0, Status::OK));
    }

    #[test]
    fn read_missing_object_is_enoent() {
        let cluster = MemoryCluster::new();
        let mut buf = [0u8; 4];
        let mut op = cluster.create_read_op();
        op.read(0, &mut buf);
        assert_eq!(cluster.operate_read(&mut op, "nope"), Status::from_errno(ENOENT));
    }

    #[test]
    fn iterator_snapshot_ignores_later_writes() {
        let cluster = seeded();
        let mut op = cluster.create_read_op();
        let slot = op.get_xattrs();
        cluster.operate_read(&mut op, "obj");
        let mut iter = op.take_xattrs(slot).0.expect("iterator");

        cluster.insert("obj", StoredObject::new(&b"x"[..]));

        assert_eq!(iter.next_entry().name.as_deref(), Some("owner"));
    }

    // -----------------------------------------------------------------------
    // Write batches
    // -----------------------------------------------------------------------

    #[test]
    fn exclusive_create_then_conflict() {
        let cluster = MemoryCluster::new();
        let mut op = cluster.create_write_op();
        op.create(CreateMode::Exclusive);
        op.write_full(b"one");
        assert!(cluster.operate_write(&op, "obj").is_ok());
        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(EEXIST));
        assert_eq!(cluster.object("obj").unwrap().data, Bytes::from_static(b"one"));
    }

    #[test]
    fn idempotent_create_tolerates_existing_object() {
        let cluster = seeded();
        let mut op = cluster.create_write_op();
        op.create(CreateMode::Idempotent);
        assert!(cluster.operate_write(&op, "obj").is_ok());
        assert_eq!(
            cluster.object("obj").unwrap().data,
            Bytes::from_static(b"hello world")
        );
    }

    #[test]
    fn failed_compare_discards_every_step() {
        let cluster = seeded();
        let mut op = cluster.create_write_op();
        op.write_full(b"clobbered");
        op.set_xattr("tag", b"v9");
        op.cmp_xattr("tag", CmpXattrOp::Eq, b"stale");

        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(ECANCELED));
        let object = cluster.object("obj").unwrap();
        assert_eq!(object.data, Bytes::from_static(b"hello world"));
        assert_eq!(object.xattrs["tag"], Bytes::from_static(b"v1"));
    }

    #[test]
    fn compare_against_missing_attribute_cancels() {
        let cluster = MemoryCluster::new();
        cluster.insert("obj", StoredObject::new(&b"data"[..]));
        let mut op = cluster.create_write_op();
        op.cmp_xattr("tag", CmpXattrOp::Eq, b"");
        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(ECANCELED));
    }

    #[test]
    fn compare_on_missing_object_is_enoent() {
        let cluster = MemoryCluster::new();
        let mut op = cluster.create_write_op();
        op.cmp_xattr("tag", CmpXattrOp::Eq, b"v1");
        op.write_full(b"data");
        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(ENOENT));
        assert!(cluster.is_empty());
    }

    #[test]
    fn ordered_comparisons_gate_the_batch() {
        let cluster = seeded();
        let cases = [
            (CmpXattrOp::Gt, b"v0", true),
            (CmpXattrOp::Gt, b"v1", false),
            (CmpXattrOp::Gte, b"v1", true),
            (CmpXattrOp::Lt, b"v2", true),
            (CmpXattrOp::Lte, b"v0", false),
            (CmpXattrOp::Ne, b"v1", false),
        ];
        for (cmp, operand, expect_ok) in cases {
            let mut op = cluster.create_write_op();
            op.cmp_xattr("tag", cmp, operand);
            let status = cluster.operate_write(&op, "obj");
            assert_eq!(status.is_ok(), expect_ok, "{cmp} {:?}", operand);
        }
    }

    #[test]
    fn write_full_replaces_rather_than_appends() {
        let cluster = seeded();
        let mut op = cluster.create_write_op();
        op.write_full(b"hi");
        cluster.operate_write(&op, "obj");
        assert_eq!(cluster.object("obj").unwrap().data, Bytes::from_static(b"hi"));
    }

    // -----------------------------------------------------------------------
    // Faults and accounting
    // -----------------------------------------------------------------------

    #[test]
    fn injected_faults_are_one_shot() {
        let cluster = seeded();
        cluster.inject(Fault::Operate(EIO));
        let mut op = cluster.create_write_op();
        op.write_full(b"new");
        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(EIO));
        assert!(cluster.operate_write(&op, "obj").is_ok());
        assert_eq!(cluster.operations(), 2);
    }

    #[test]
    fn step_fault_leaves_batch_status_ok() {
        let cluster = seeded();
        cluster.inject(Fault::XattrsStep(EIO));
        let mut buf = [0u8; 4];
        let mut op = cluster.create_read_op();
        let read = op.read(0, &mut buf);
        let xattrs = op.get_xattrs();

        assert!(cluster.operate_read(&mut op, "obj").is_ok());
        assert!(op.read_reply(read).1.is_ok());
        let (iter, status) = op.take_xattrs(xattrs);
        assert!(iter.is_none());
        assert_eq!(status, Status::from_errno(EIO));
    }

    #[test]
    fn step_faults_wait_for_a_read_batch() {
        let cluster = seeded();
        cluster.inject(Fault::XattrsStep(EIO));

        let mut op = cluster.create_write_op();
        op.write_full(b"rewritten");
        assert!(cluster.operate_write(&op, "obj").is_ok());
        drop(op);

        let mut op = cluster.create_read_op();
        assert_eq!(cluster.operate_read(&mut op, "missing"), Status::from_errno(ENOENT));
        drop(op);

        let mut op = cluster.create_read_op();
        let xattrs = op.get_xattrs();
        assert!(cluster.operate_read(&mut op, "obj").is_ok());
        assert_eq!(op.take_xattrs(xattrs).1, Status::from_errno(EIO));
    }

    #[test]
    fn operate_fault_skips_queued_step_faults() {
        let cluster = seeded();
        cluster.inject(Fault::ReadStep(EIO));
        cluster.inject(Fault::Operate(EIO));

        let mut op = cluster.create_write_op();
        op.write_full(b"x");
        assert_eq!(cluster.operate_write(&op, "obj"), Status::from_errno(EIO));
        drop(op);

        let mut buf = [0u8; 4];
        let mut op = cluster.create_read_op();
        let read = op.read(0, &mut buf);
        assert!(cluster.operate_read(&mut op, "obj").is_ok());
        assert_eq!(op.read_reply(read), (0, Status::from_errno(EIO)));
    }

    #[test]
    fn handles_are_counted_until_dropped() {
        let cluster = seeded();
        let op = cluster.create_write_op();
        assert_eq!(cluster.handles().live(HandleKind::WriteOp), 1);
        drop(op);
        assert!(cluster.handles().all_released());
        assert_eq!(cluster.handles().created(HandleKind::WriteOp), 1);
    }
}
