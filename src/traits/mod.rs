//! # Adapter Traits
//!
//! The capability contract every storage backend implements.
//!
//! ## Trait Layout
//!
//! ```text
//! FilesystemReader + FilesystemWriter = FilesystemAdapter
//! ```
//!
//! | Trait | Operations |
//! |-------|------------|
//! | [`FilesystemReader`] | `file_exists`, `directory_exists`, `read`, `read_stream`, `file_size`, `mime_type`, `last_modified`, `visibility`, `list_contents`, `temporary_url` |
//! | [`FilesystemWriter`] | `write`, `write_stream`, `set_visibility`, `delete`, `delete_directory`, `create_directory`, `copy`, `move_file` |
//!
//! ## Blanket Implementation
//!
//! Implement the two component traits and [`FilesystemAdapter`] comes for
//! free. The [`Filesystem`](crate::Filesystem) façade only ever holds a
//! `Box<dyn FilesystemAdapter>`, never a concrete backend type.
//!
//! ## Path Contract
//!
//! Adapters receive normalized paths: `/`-separated, no `.`/`..` segments,
//! no trailing slash, the root as `""`. They must not normalize again.
//!
//! ## Error Contract
//!
//! Every failure crosses the adapter boundary as an [`FsError`](crate::FsError)
//! whose kind matches the operation. Backend-native error types never leak.

mod reader;
mod writer;

pub use reader::{FilesystemReader, ReadStream, TEMPORARY_URL_EXPIRY};
pub use writer::FilesystemWriter;

/// A complete storage adapter.
///
/// Automatically implemented for any type implementing both
/// [`FilesystemReader`] and [`FilesystemWriter`].
///
/// # Example
///
/// ```rust
/// use flyfs::prelude::*;
/// use flyfs::{FsError, InMemoryAdapter};
///
/// fn backup(adapter: &dyn FilesystemAdapter, src: &str, dst: &str) -> Result<(), FsError> {
///     let data = adapter.read(src)?;
///     adapter.write(dst, &data, &Default::default())
/// }
///
/// let memory = InMemoryAdapter::new();
/// memory.write("notes.txt", b"hello", &Default::default()).unwrap();
/// backup(&memory, "notes.txt", "notes.bak").unwrap();
/// assert_eq!(memory.read("notes.bak").unwrap(), b"hello");
/// ```
pub trait FilesystemAdapter: FilesystemReader + FilesystemWriter {}

impl<T: FilesystemReader + FilesystemWriter> FilesystemAdapter for T {}
