//! Atomic read of object bytes together with the object's current tag.

use atomtag_exec::{ExecError, ObjectExecutor, Status};
use tracing::debug;

use crate::attrs::Attributes;
use crate::error::{Result, Step, TagError};
use crate::objects::TaggedObjects;
use crate::tag::Tag;

impl<E: ObjectExecutor> TaggedObjects<E> {
    /// Read up to `buffer.len()` bytes of `oid` starting at `offset`, and the
    /// value of attribute `attr`, in one atomic batch.
    ///
    /// Returns the number of bytes read and the tag, or `None` if the object
    /// has no such attribute. An empty `buffer` returns `(0, None)` without
    /// contacting the backend. On error the contents of `buffer` are
    /// unspecified.
    pub fn read_tagged(
        &self,
        oid: &str,
        attr: &str,
        buffer: &mut [u8],
        offset: u64,
    ) -> Result<(usize, Option<Tag>)> {
        if buffer.is_empty() {
            return Ok((0, None));
        }

        let mut op = self.executor.create_read_op();
        let read = op.read(offset, buffer);
        let xattrs = op.get_xattrs();

        let status = self.executor.operate_read(&mut op, oid);
        if let Err(source) = status.into_result() {
            debug!(oid, code = status.raw(), "tagged read batch failed");
            return Err(TagError::Transport {
                oid: oid.to_string(),
                source,
            });
        }

        let (filled, read_status) = op.read_reply(read);
        let (cursor, list_status) = op.take_xattrs(xattrs);
        drop(op);

        check_step(oid, Step::Read, read_status)?;
        check_step(oid, Step::ListAttributes, list_status)?;
        let cursor = cursor.ok_or_else(|| TagError::Suboperation {
            oid: oid.to_string(),
            step: Step::ListAttributes,
            source: ExecError::Io,
        })?;

        let tag = Attributes::new(cursor)
            .find(attr)
            .map_err(|source| TagError::Suboperation {
                oid: oid.to_string(),
                step: Step::IterateAttributes,
                source,
            })?
            .map(Tag::from);

        debug!(oid, attr, bytes = filled, tagged = tag.is_some(), "tagged read");
        Ok((filled, tag))
    }

    /// [`read_tagged`](Self::read_tagged) from the start of the object.
    pub fn read_tagged_full(
        &self,
        oid: &str,
        attr: &str,
        buffer: &mut [u8],
    ) -> Result<(usize, Option<Tag>)> {
        self.read_tagged(oid, attr, buffer, 0)
    }

    /// [`read_tagged`](Self::read_tagged) using the configured default attribute.
    pub fn read(&self, oid: &str, buffer: &mut [u8], offset: u64) -> Result<(usize, Option<Tag>)> {
        self.read_tagged(oid, &self.config.default_attribute, buffer, offset)
    }
}

fn check_step(oid: &str, step: Step, status: Status) -> Result<()> {
    status.into_result().map_err(|source| {
        debug!(oid, %step, code = status.raw(), "tagged read step failed");
        TagError::Suboperation {
            oid: oid.to_string(),
            step,
            source,
        }
    })
}
