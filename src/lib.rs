//! # flyfs
//!
//! A **storage abstraction layer**: one uniform API for files on local disk,
//! in memory, and in S3-compatible object storage.
//!
//! Callers talk to a [`Filesystem`] façade. The façade normalizes paths,
//! merges options, and forwards every call to a pluggable
//! [`FilesystemAdapter`]. Adapters are the only code that touches a backend.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use flyfs::{Filesystem, InMemoryAdapter};
//!
//! let fs = Filesystem::new(InMemoryAdapter::new());
//! fs.create_directory("resources/tmp", None)?;
//! fs.write("resources/tmp/tmp.txt", "hello world", None)?;
//!
//! assert_eq!(fs.read("resources/tmp/tmp.txt")?, b"hello world");
//! assert_eq!(fs.file_size("resources/tmp/tmp.txt")?, 11);
//! assert!(fs.has("resources/tmp")?);
//!
//! fs.move_file("resources/tmp/tmp.txt", "resources/", None)?;
//! assert!(fs.file_exists("resources/tmp.txt")?);
//! # Ok::<(), flyfs::FsError>(())
//! ```
//!
//! Swap [`InMemoryAdapter`] for [`LocalAdapter`] or [`S3Adapter`] and the
//! calling code stays the same.
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Filesystem`] | Caller-facing façade |
//! | [`FilesystemAdapter`] | Backend contract ([`FilesystemReader`] + [`FilesystemWriter`]) |
//! | [`FsError`] | One error kind per operation, with location and reason |
//! | [`Config`] | Per-call and base options (`mode`, `encoding`, `visibility`, ...) |
//! | [`Visibility`] | Portable `public` / `private` access level |
//! | [`PathNormalizer`] | Strategy for canonicalizing paths |
//!
//! ---
//!
//! ## Adapters
//!
//! | Adapter | Backend | Visibility | Temporary URLs |
//! |---------|---------|------------|----------------|
//! | [`LocalAdapter`] | Directory tree on disk | Unix permission bits | [`FsError::NotSupported`] |
//! | [`InMemoryAdapter`] | Virtual tree in memory | Stored per entry | [`FsError::NotSupported`] |
//! | [`S3Adapter`] | S3-compatible bucket | [`FsError::NotSupported`] | Pre-signed `GET` |
//!
//! ---
//!
//! ## Error Handling
//!
//! Every operation returns `Result<T, FsError>`. The variant names the
//! failed operation; the message carries the location and the backend's
//! reason:
//!
//! ```rust
//! use flyfs::{FsError, Operation};
//!
//! let err = FsError::write("resources/tmp3/tmp.txt", "parent directory does not exist");
//! assert_eq!(err.operation(), Operation::Write);
//! assert_eq!(err.location(), "resources/tmp3/tmp.txt");
//! assert_eq!(
//!     err.to_string(),
//!     "Unable to write file from location: resources/tmp3/tmp.txt. parent directory does not exist"
//! );
//! ```
//!
//! ---
//!
//! ## Logging
//!
//! Adapters emit [`tracing`] events: `debug` for mutations, `trace` for
//! existence probes, `warn` when a move leaves a duplicate behind. The crate
//! never installs a subscriber.
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. A [`Filesystem`] or an
//! adapter can be shared across threads behind an `Arc`. Concurrent
//! mutations of the same path follow the backend's own semantics.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `s3` | yes | [`S3Adapter`] via `object_store` |
//! | `serde` | no | Serialization for [`Config`], [`Visibility`], [`Operation`], and JSON helpers |

// Private modules
mod adapters;
mod config;
mod error;
mod ext;
mod filesystem;
mod mime;
mod path;
mod traits;
mod visibility;

// Public re-exports - error types
pub use error::{FsError, Operation};

// Public re-exports - façade
pub use filesystem::Filesystem;

// Public re-exports - adapter contract
pub use traits::{
    FilesystemAdapter, FilesystemReader, FilesystemWriter, ReadStream, TEMPORARY_URL_EXPIRY,
};

// Public re-exports - adapters
pub use adapters::{InMemoryAdapter, LocalAdapter};
#[cfg(feature = "s3")]
pub use adapters::{BuildError, DELETE_BATCH_SIZE, DIRECTORY_MARKER, S3Adapter, S3Config};

// Public re-exports - options and policies
pub use config::{Config, DecodePolicy, Encoding, InvalidOption, OpenMode};
pub use mime::{ExtensionMimeTypeDetector, MimeTypeDetector};
pub use path::{LexicalNormalizer, PathNormalizer, normalize};
pub use visibility::{PortableUnixVisibilityConverter, UnixVisibilityConverter, Visibility};

// Public re-exports - infrastructure
pub use ext::AdapterExt;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::AdapterExtJson;

/// Everything needed to call adapters directly.
///
/// ```rust
/// use flyfs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{AdapterExt, FilesystemAdapter, FilesystemReader, FilesystemWriter};

    #[cfg(feature = "serde")]
    pub use crate::AdapterExtJson;
}
