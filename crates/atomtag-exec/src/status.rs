//! Raw status codes returned by the execution service.
//!
//! Every primitive reports an `i32` status: zero or positive is success, a
//! negative value is a negated errno. [`Status`] wraps that integer so it
//! cannot be confused with a byte count.

use std::fmt;

use crate::error::{ExecError, ExecResult};

pub const EPERM: i32 = 1;
pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const EACCES: i32 = 13;
pub const EEXIST: i32 = 17;
pub const EINVAL: i32 = 22;
pub const ERANGE: i32 = 34;
pub const ENODATA: i32 = 61;
pub const ETIMEDOUT: i32 = 110;
pub const ECANCELED: i32 = 125;

/// Status of a batch or of a single suboperation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    /// The success status.
    pub const OK: Status = Status(0);

    /// Wrap a raw status as reported by the backend.
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Build a failure status from a (positive) errno.
    pub const fn from_errno(errno: i32) -> Self {
        if errno < 0 {
            Self(errno)
        } else {
            Self(errno.wrapping_neg())
        }
    }

    /// The raw integer value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns `true` for zero or positive statuses.
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    /// Returns `true` for negative statuses.
    pub const fn is_err(self) -> bool {
        self.0 < 0
    }

    /// Translate into a `Result`, mapping negative statuses through
    /// [`ExecError::from_status`].
    pub fn into_result(self) -> ExecResult<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(ExecError::from_status(self))
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_decides_success() {
        assert!(Status::OK.is_ok());
        assert!(Status::new(7).is_ok());
        assert!(Status::new(-1).is_err());
    }

    #[test]
    fn from_errno_always_negates() {
        assert_eq!(Status::from_errno(ENOENT).raw(), -2);
        assert_eq!(Status::from_errno(-ENOENT).raw(), -2);
    }

    #[test]
    fn into_result_maps_failures() {
        assert!(Status::new(3).into_result().is_ok());
        assert_eq!(
            Status::from_errno(EEXIST).into_result().unwrap_err(),
            ExecError::AlreadyExists
        );
    }
}
