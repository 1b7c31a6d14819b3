//! Compare-and-swap write: replace object bytes and advance the tag in one
//! atomic batch, gated on the tag's current value.

use atomtag_exec::{CmpXattrOp, CreateMode, ExecError, ObjectExecutor};
use tracing::{debug, warn};

use crate::error::{Result, TagError};
use crate::objects::TaggedObjects;
use crate::tag::ExpectedTag;

impl<E: ObjectExecutor> TaggedObjects<E> {
    /// Overwrite `oid` with `data` and set attribute `attr` to `new_tag`,
    /// provided the attribute currently equals `expected_tag`.
    ///
    /// An `expected_tag` of `""` (or `"0"`, unless disabled in the config)
    /// instead requires that the object does not exist yet, and creates it.
    /// Either every effect lands or none does. A lost race surfaces as
    /// [`TagError::VersionConflict`]; re-read the tag and retry.
    pub fn write_tagged(
        &self,
        oid: &str,
        attr: &str,
        expected_tag: &str,
        new_tag: &str,
        data: &[u8],
    ) -> Result<()> {
        let expected = ExpectedTag::parse(expected_tag, self.config.zero_is_sentinel);
        self.write_tagged_expected(oid, attr, &expected, new_tag.as_bytes(), data)
    }

    /// [`write_tagged`](Self::write_tagged) with a parsed guard and byte tags.
    pub fn write_tagged_expected(
        &self,
        oid: &str,
        attr: &str,
        expected: &ExpectedTag,
        new_tag: &[u8],
        data: &[u8],
    ) -> Result<()> {
        let mut op = self.executor.create_write_op();
        match expected {
            ExpectedTag::NoPriorVersion => op.create(CreateMode::Exclusive),
            ExpectedTag::Value(tag) => op.cmp_xattr(attr, CmpXattrOp::Eq, tag),
        }
        op.write_full(data);
        op.set_xattr(attr, new_tag);

        let status = self.executor.operate_write(&op, oid);
        drop(op);

        match status.into_result() {
            Ok(()) => {
                debug!(oid, attr, bytes = data.len(), "tagged write");
                Ok(())
            }
            Err(source) if is_conflict(source) => {
                debug!(oid, attr, %source, "tagged write lost the race");
                Err(TagError::VersionConflict {
                    oid: oid.to_string(),
                    source,
                })
            }
            Err(source) => {
                warn!(oid, attr, code = status.raw(), "tagged write batch failed");
                Err(TagError::Transport {
                    oid: oid.to_string(),
                    source,
                })
            }
        }
    }

    /// [`write_tagged`](Self::write_tagged) using the configured default attribute.
    pub fn write(&self, oid: &str, expected_tag: &str, new_tag: &str, data: &[u8]) -> Result<()> {
        self.write_tagged(oid, &self.config.default_attribute, expected_tag, new_tag, data)
    }
}

/// Failures of the guard step: compare mismatch, object already exists, or
/// the object holding the expected tag is gone.
fn is_conflict(err: ExecError) -> bool {
    matches!(
        err,
        ExecError::Canceled | ExecError::AlreadyExists | ExecError::NotFound
    )
}
