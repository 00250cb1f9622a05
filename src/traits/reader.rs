//! Read and inspection operations for storage adapters.

use std::io::Read;
use std::time::Duration;

use crate::{FsError, Operation, Visibility};

/// Default lifetime of a pre-signed URL: one week.
pub const TEMPORARY_URL_EXPIRY: Duration = Duration::from_secs(7 * 24 * 3600);

/// Readable handle returned by [`FilesystemReader::read_stream`].
///
/// Single owner, single use. Dropping the handle releases the underlying
/// descriptor or connection on every exit path.
pub type ReadStream = Box<dyn Read + Send>;

/// Non-destructive operations of a storage adapter.
///
/// Paths arrive already normalized (see [`normalize`](crate::normalize));
/// implementations must not normalize them again.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods take `&self`; adapters
/// with mutable state use interior mutability.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FilesystemReader`.
pub trait FilesystemReader: Send + Sync {
    /// Whether a file exists at `path`.
    ///
    /// A missing path is `Ok(false)`, never an error.
    ///
    /// # Errors
    ///
    /// - [`FsError::ExistenceCheckFailed`] if the backend cannot be reached
    fn file_exists(&self, path: &str) -> Result<bool, FsError>;

    /// Whether a directory exists at `path`.
    ///
    /// Backends without real directories answer whether any object lives
    /// under `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::ExistenceCheckFailed`] if the backend cannot be reached
    fn directory_exists(&self, path: &str) -> Result<bool, FsError>;

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// - [`FsError::ReadFailed`] if `path` is a directory, missing, or unreadable
    fn read(&self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Open the file for streaming reads.
    ///
    /// # Errors
    ///
    /// - [`FsError::ReadFailed`] under the same conditions as [`read`](Self::read)
    fn read_stream(&self, path: &str) -> Result<ReadStream, FsError>;

    /// File size in bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::RetrieveMetadataFailed`] if `path` is missing or a directory
    fn file_size(&self, path: &str) -> Result<u64, FsError>;

    /// MIME type of the file, `None` when it cannot be determined.
    ///
    /// # Errors
    ///
    /// - [`FsError::RetrieveMetadataFailed`] if `path` is missing or a directory
    fn mime_type(&self, path: &str) -> Result<Option<String>, FsError>;

    /// Last modification time in milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// - [`FsError::RetrieveMetadataFailed`] if `path` is missing
    fn last_modified(&self, path: &str) -> Result<u64, FsError>;

    /// Current visibility of `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::RetrieveMetadataFailed`] if `path` is missing
    /// - [`FsError::NotSupported`] if the backend has no visibility concept
    fn visibility(&self, path: &str) -> Result<Visibility, FsError>;

    /// Every entry beneath `path`, recursively.
    ///
    /// Ordering is deterministic for a given adapter but not across adapters.
    ///
    /// # Errors
    ///
    /// - [`FsError::ListContentsFailed`] if the backend listing fails
    fn list_contents(&self, path: &str) -> Result<Vec<String>, FsError>;

    /// Pre-signed URL granting read access to the file for `expires_in`.
    ///
    /// Only backends with URL signing override this; the default returns
    /// [`FsError::NotSupported`].
    ///
    /// # Errors
    ///
    /// - [`FsError::TemporaryUrlFailed`] if `path` is a directory, missing,
    ///   or cannot be signed
    /// - [`FsError::NotSupported`] if the backend cannot sign URLs
    fn temporary_url(&self, path: &str, expires_in: Duration) -> Result<String, FsError> {
        let _ = expires_in;
        Err(FsError::not_supported(Operation::TemporaryUrl, path))
    }
}
