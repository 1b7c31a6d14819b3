use atomtag_exec::{ExecError, XattrIter};
use bytes::Bytes;

/// Lazy iterator over an object's `(name, value)` attributes.
///
/// Ends normally at the backend's end-of-iteration entry. A failed advance
/// yields one `Err` and then ends. The backend cursor is released when this
/// iterator is dropped.
#[derive(Debug)]
pub struct Attributes {
    cursor: XattrIter,
    done: bool,
}

impl Attributes {
    pub fn new(cursor: XattrIter) -> Self {
        Self {
            cursor,
            done: false,
        }
    }

    /// Value of the first attribute called `name`, scanning in order.
    pub fn find(self, name: &str) -> Result<Option<Bytes>, ExecError> {
        for entry in self {
            let (attr, value) = entry?;
            if attr == name {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl Iterator for Attributes {
    type Item = Result<(String, Bytes), ExecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = self.cursor.next_entry();
        if let Err(e) = entry.status.into_result() {
            self.done = true;
            return Some(Err(e));
        }
        match entry.name {
            Some(name) => {
                let len = entry.len.min(entry.value.len());
                Some(Ok((name, entry.value.slice(..len))))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for Attributes {}
