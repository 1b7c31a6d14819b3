use crate::status::{
    Status, EACCES, ECANCELED, EEXIST, EINVAL, EIO, ENODATA, ENOENT, EPERM, ERANGE, ETIMEDOUT,
};

/// Errors reported by the execution service.
///
/// Each variant corresponds to one errno family; [`ExecError::status`] gives
/// back the status the error was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ExecError {
    /// The target object does not exist.
    #[error("object not found")]
    NotFound,

    /// Exclusive create hit an existing object.
    #[error("object already exists")]
    AlreadyExists,

    /// An attribute comparison failed and the batch was aborted.
    #[error("operation canceled: attribute comparison failed")]
    Canceled,

    /// The requested attribute has no data.
    #[error("no data available")]
    NoData,

    /// The caller lacks permission (`EPERM` or `EACCES`).
    #[error("permission denied (errno {errno})")]
    PermissionDenied { errno: i32 },

    /// The backend did not answer in time.
    #[error("operation timed out")]
    TimedOut,

    /// Backend I/O failure.
    #[error("i/o error")]
    Io,

    /// The batch was malformed.
    #[error("invalid argument")]
    InvalidArgument,

    /// A length or offset was out of range.
    #[error("result out of range")]
    OutOfRange,

    /// Any status without a dedicated variant.
    #[error("backend error (status {0})")]
    Other(i32),
}

impl ExecError {
    /// Translate a failure status into an error.
    ///
    /// Non-negative statuses are not errors; passing one yields
    /// [`ExecError::Other`] carrying the value unchanged.
    pub fn from_status(status: Status) -> Self {
        match status.raw().wrapping_neg() {
            ENOENT => Self::NotFound,
            EEXIST => Self::AlreadyExists,
            ECANCELED => Self::Canceled,
            ENODATA => Self::NoData,
            errno @ (EPERM | EACCES) => Self::PermissionDenied { errno },
            ETIMEDOUT => Self::TimedOut,
            EIO => Self::Io,
            EINVAL => Self::InvalidArgument,
            ERANGE => Self::OutOfRange,
            _ => Self::Other(status.raw()),
        }
    }

    /// The status this error stands for.
    pub fn status(&self) -> Status {
        match *self {
            Self::NotFound => Status::from_errno(ENOENT),
            Self::AlreadyExists => Status::from_errno(EEXIST),
            Self::Canceled => Status::from_errno(ECANCELED),
            Self::NoData => Status::from_errno(ENODATA),
            Self::PermissionDenied { errno } => Status::from_errno(errno),
            Self::TimedOut => Status::from_errno(ETIMEDOUT),
            Self::Io => Status::from_errno(EIO),
            Self::InvalidArgument => Status::from_errno(EINVAL),
            Self::OutOfRange => Status::from_errno(ERANGE),
            Self::Other(raw) => Status::new(raw),
        }
    }
}

/// Result alias for execution service calls.
pub type ExecResult<T> = Result<T, ExecError>;
