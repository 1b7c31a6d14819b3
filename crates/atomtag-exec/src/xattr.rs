use bytes::Bytes;

use crate::handles::HandleGuard;
use crate::status::Status;

/// One reply from [`XattrIter::next_entry`].
///
/// End of iteration is signalled by `name == None` with a zero `len`; that
/// entry carries a success status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XattrEntry {
    pub name: Option<String>,
    pub value: Bytes,
    pub len: usize,
    pub status: Status,
}

impl XattrEntry {
    fn end() -> Self {
        Self {
            name: None,
            value: Bytes::new(),
            len: 0,
            status: Status::OK,
        }
    }

    fn failed(status: Status) -> Self {
        Self {
            name: None,
            value: Bytes::new(),
            len: 0,
            status,
        }
    }

    /// Returns `true` for the end-of-iteration entry.
    pub fn is_end(&self) -> bool {
        self.name.is_none() && self.len == 0 && self.status.is_ok()
    }
}

/// Backend cursor over an object's extended attributes.
///
/// The cursor owns a snapshot taken when the read batch ran, so later writes
/// to the object are not observed. The handle is released when the iterator
/// is dropped.
#[derive(Debug)]
pub struct XattrIter {
    entries: std::vec::IntoIter<(String, Bytes)>,
    position: usize,
    fail_at: Option<(usize, Status)>,
    _guard: HandleGuard,
}

impl XattrIter {
    pub fn new(entries: Vec<(String, Bytes)>, guard: HandleGuard) -> Self {
        Self {
            entries: entries.into_iter(),
            position: 0,
            fail_at: None,
            _guard: guard,
        }
    }

    /// Make the `index`-th call to [`next_entry`](Self::next_entry) fail with
    /// `status`, as a backend losing the cursor would.
    pub fn fail_at(mut self, index: usize, status: Status) -> Self {
        self.fail_at = Some((index, status));
        self
    }

    /// Advance the cursor.
    pub fn next_entry(&mut self) -> XattrEntry {
        let position = self.position;
        self.position += 1;
        if let Some((index, status)) = self.fail_at {
            if index == position {
                return XattrEntry::failed(status);
            }
        }
        match self.entries.next() {
            Some((name, value)) => XattrEntry {
                len: value.len(),
                name: Some(name),
                value,
                status: Status::OK,
            },
            None => XattrEntry::end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handles::HandleKind;
    use crate::status::EIO;

    fn iter(entries: &[(&str, &[u8])]) -> XattrIter {
        let entries = entries
            .iter()
            .map(|(n, v)| (n.to_string(), Bytes::copy_from_slice(v)))
            .collect();
        XattrIter::new(entries, HandleGuard::untracked(HandleKind::XattrIter))
    }

    #[test]
    fn yields_entries_then_end_marker() {
        let mut it = iter(&[("a", b"1"), ("b", b"22")]);

        let first = it.next_entry();
        assert_eq!(first.name.as_deref(), Some("a"));
        assert_eq!(first.len, 1);

        let second = it.next_entry();
        assert_eq!(second.value, Bytes::from_static(b"22"));

        assert!(it.next_entry().is_end());
        assert!(it.next_entry().is_end());
    }

    #[test]
    fn empty_iterator_ends_immediately() {
        let mut it = iter(&[]);
        assert!(it.next_entry().is_end());
    }

    #[test]
    fn injected_failure_surfaces_status() {
        let mut it = iter(&[("a", b"1"), ("b", b"2")]).fail_at(1, Status::from_errno(EIO));
        assert!(it.next_entry().status.is_ok());
        let failed = it.next_entry();
        assert!(failed.status.is_err());
        assert!(!failed.is_end());
    }
}
