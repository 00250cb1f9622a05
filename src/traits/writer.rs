//! Mutating operations for storage adapters.

use std::io::Read;

use crate::{Config, FsError, Visibility};

/// Mutating operations of a storage adapter.
///
/// Paths arrive already normalized and `config` is already merged by the
/// [`Filesystem`](crate::Filesystem) façade. Unknown option keys must be
/// ignored, never rejected.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Concurrent mutations of the same
/// path are not coordinated; the backend's native semantics apply.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FilesystemWriter`.
pub trait FilesystemWriter: Send + Sync {
    /// Write `contents` to a file.
    ///
    /// Honours `mode`, `encoding`, `errors` and `visibility` from `config`.
    ///
    /// # Errors
    ///
    /// - [`FsError::WriteFailed`] if the parent is missing, the target is a
    ///   directory, access is denied, or the contents violate `encoding`
    fn write(&self, path: &str, contents: &[u8], config: &Config) -> Result<(), FsError>;

    /// Write a file from a readable source.
    ///
    /// Reads `chunk_size` blocks when configured, otherwise reads to the end.
    ///
    /// # Errors
    ///
    /// - [`FsError::WriteFailed`] under the same conditions as [`write`](Self::write),
    ///   or if reading `source` fails
    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &Config,
    ) -> Result<(), FsError>;

    /// Change the visibility of `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::SetVisibilityFailed`] if the backend rejects the change
    /// - [`FsError::NotSupported`] if the backend has no visibility concept
    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::DeleteFailed`] if `path` is a directory, missing, or the
    ///   backend rejects the delete
    fn delete(&self, path: &str) -> Result<(), FsError>;

    /// Recursively delete a directory. Returns `true` on success.
    ///
    /// # Errors
    ///
    /// - [`FsError::DeleteDirectoryFailed`] if `path` is a file or the backend
    ///   rejects the delete
    fn delete_directory(&self, path: &str) -> Result<bool, FsError>;

    /// Create a directory and any missing parents. Returns `true` on success.
    ///
    /// Idempotent: an existing directory is not an error.
    ///
    /// # Errors
    ///
    /// - [`FsError::CreateDirectoryFailed`] on permission or path conflicts
    fn create_directory(&self, path: &str, config: &Config) -> Result<bool, FsError>;

    /// Copy a file. A `destination` ending in `/` names a directory and the
    /// source's basename is appended.
    ///
    /// # Errors
    ///
    /// - [`FsError::CopyFailed`] if `source` is a directory or missing, or
    ///   the backend rejects the copy
    fn copy(&self, source: &str, destination: &str, config: &Config) -> Result<(), FsError>;

    /// Move a file. Destination resolution follows [`copy`](Self::copy).
    ///
    /// Backends without a native rename copy and then delete the source. If
    /// that delete fails the copy is left in place and the error is reported.
    ///
    /// # Errors
    ///
    /// - [`FsError::MoveFailed`] if `source` is a directory or missing, the
    ///   backend rejects the move, or the source survives the copy
    fn move_file(&self, source: &str, destination: &str, config: &Config)
    -> Result<(), FsError>;
}
