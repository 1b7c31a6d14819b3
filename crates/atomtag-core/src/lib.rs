//! Tag-guarded atomic object access.
//!
//! Every object may carry a named extended attribute, its *tag*, that acts as
//! an optimistic-concurrency version marker. This crate composes the backend
//! primitives of [`atomtag_exec`] into two single-batch operations:
//!
//! - [`TaggedObjects::read_tagged`] reads a byte range and the current tag in
//!   one atomic round trip.
//! - [`TaggedObjects::write_tagged`] overwrites the object and advances the
//!   tag, only if the tag still holds the expected value (or, for the
//!   "no prior version" sentinel, only if the object does not exist).
//!
//! Together they give compare-and-swap over opaque blobs without a lock
//! service. There is no retry at this layer: a lost race comes back as
//! [`TagError::VersionConflict`] and the caller re-reads and tries again.
//!
//! # Modules
//!
//! - [`error`] -- [`TagError`] and the failing [`Step`]
//! - [`tag`] -- [`Tag`] values and the [`ExpectedTag`] guard
//! - [`attrs`] -- [`Attributes`], a lazy iterator over an object's attributes
//! - [`config`] -- [`TaggedConfig`]
//! - [`objects`] -- the [`TaggedObjects`] entry point; reads and writes live
//!   in `read` and `write`

pub mod attrs;
pub mod config;
pub mod error;
pub mod objects;
mod read;
pub mod tag;
mod write;

pub use attrs::Attributes;
pub use config::TaggedConfig;
pub use error::{Result, Step, TagError};
pub use objects::TaggedObjects;
pub use tag::{ExpectedTag, Tag, LEGACY_NO_PRIOR_TAG, NO_PRIOR_TAG};
