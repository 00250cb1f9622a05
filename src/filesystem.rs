//! The caller-facing façade.

use std::io::Read;
use std::time::Duration;

use crate::ext::AdapterExt;
use crate::path::resolve_destination;
use crate::{
    Config, FilesystemAdapter, FsError, LexicalNormalizer, PathNormalizer, ReadStream,
    TEMPORARY_URL_EXPIRY, Visibility,
};

/// Uniform file operations over any [`FilesystemAdapter`].
///
/// The façade normalizes every path argument once, merges per-call options
/// over its base [`Config`], validates visibility strings, and forwards to
/// the adapter. It performs no I/O of its own.
///
/// # Example
///
/// ```rust
/// use flyfs::{Config, Filesystem, InMemoryAdapter, OpenMode};
///
/// let fs = Filesystem::new(InMemoryAdapter::new());
/// fs.create_directory("resources/tmp", None)?;
/// fs.write("resources/./tmp/../tmp/tmp.txt", "hello world", None)?;
/// assert_eq!(fs.read("resources/tmp/tmp.txt")?, b"hello world");
/// assert_eq!(fs.file_size("resources/tmp/tmp.txt")?, 11);
///
/// let append = Config::new().with_mode(OpenMode::Append);
/// fs.write("resources/tmp/tmp.txt", "!", Some(&append))?;
/// assert_eq!(fs.read("resources/tmp/tmp.txt")?, b"hello world!");
/// # Ok::<(), flyfs::FsError>(())
/// ```
pub struct Filesystem {
    adapter: Box<dyn FilesystemAdapter>,
    config: Config,
    normalizer: Box<dyn PathNormalizer>,
}

impl Filesystem {
    /// Façade over `adapter` with an empty base configuration and the
    /// [`LexicalNormalizer`].
    pub fn new(adapter: impl FilesystemAdapter + 'static) -> Self {
        Self::from_boxed(Box::new(adapter))
    }

    /// Façade over an already boxed adapter.
    pub fn from_boxed(adapter: Box<dyn FilesystemAdapter>) -> Self {
        Self {
            adapter,
            config: Config::default(),
            normalizer: Box::new(LexicalNormalizer),
        }
    }

    /// Set the base configuration merged under every call's options.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the path normalizer.
    pub fn with_normalizer(mut self, normalizer: impl PathNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// The wrapped adapter.
    pub fn adapter(&self) -> &dyn FilesystemAdapter {
        self.adapter.as_ref()
    }

    /// The base configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn path(&self, path: &str) -> String {
        self.normalizer.normalize(path)
    }

    fn options(&self, options: Option<&Config>) -> Config {
        match options {
            Some(overrides) => self.config.merge(overrides),
            None => self.config.clone(),
        }
    }

    /// Normalized `(source, destination)`; a destination ending in a
    /// separator receives the source's basename.
    fn transfer_paths(&self, source: &str, destination: &str) -> (String, String) {
        let source = self.path(source);
        let destination = self.path(&resolve_destination(&source, destination));
        (source, destination)
    }

    /// Whether a file or directory exists at `path`.
    ///
    /// # Errors
    ///
    /// [`FsError::ExistenceCheckFailed`] if the backend cannot be reached.
    pub fn has(&self, path: &str) -> Result<bool, FsError> {
        self.adapter.has(&self.path(path))
    }

    /// Whether a file exists at `path`.
    ///
    /// # Errors
    ///
    /// [`FsError::ExistenceCheckFailed`] if the backend cannot be reached.
    pub fn file_exists(&self, path: &str) -> Result<bool, FsError> {
        self.adapter.file_exists(&self.path(path))
    }

    /// Whether a directory exists at `path`.
    ///
    /// # Errors
    ///
    /// [`FsError::ExistenceCheckFailed`] if the backend cannot be reached.
    pub fn directory_exists(&self, path: &str) -> Result<bool, FsError> {
        self.adapter.directory_exists(&self.path(path))
    }

    /// Write `contents` to `path`.
    ///
    /// # Errors
    ///
    /// [`FsError::WriteFailed`] if the parent is missing, the target is a
    /// directory, or the contents violate the configured encoding.
    pub fn write(
        &self,
        path: &str,
        contents: impl AsRef<[u8]>,
        options: Option<&Config>,
    ) -> Result<(), FsError> {
        self.adapter
            .write(&self.path(path), contents.as_ref(), &self.options(options))
    }

    /// Write `path` from a readable source.
    ///
    /// # Errors
    ///
    /// [`FsError::WriteFailed`] as for [`write`](Self::write), or if reading
    /// `source` fails.
    pub fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        options: Option<&Config>,
    ) -> Result<(), FsError> {
        self.adapter
            .write_stream(&self.path(path), source, &self.options(options))
    }

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// [`FsError::ReadFailed`] if `path` is missing or a directory.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        self.adapter.read(&self.path(path))
    }

    /// Read the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`FsError::ReadFailed`] as for [`read`](Self::read), or if the
    /// contents are not UTF-8.
    pub fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        self.adapter.read_to_string(&self.path(path))
    }

    /// Open the file for streaming reads.
    ///
    /// # Errors
    ///
    /// [`FsError::ReadFailed`] if `path` is missing or a directory.
    pub fn read_stream(&self, path: &str) -> Result<ReadStream, FsError> {
        self.adapter.read_stream(&self.path(path))
    }

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// [`FsError::DeleteFailed`] if `path` is a directory or missing.
    pub fn delete(&self, path: &str) -> Result<(), FsError> {
        self.adapter.delete(&self.path(path))
    }

    /// Recursively delete a directory.
    ///
    /// # Errors
    ///
    /// [`FsError::DeleteDirectoryFailed`] if `path` is a file or the backend
    /// rejects the delete.
    pub fn delete_directory(&self, path: &str) -> Result<bool, FsError> {
        self.adapter.delete_directory(&self.path(path))
    }

    /// Create a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// [`FsError::CreateDirectoryFailed`] on permission or path conflicts.
    pub fn create_directory(&self, path: &str, options: Option<&Config>) -> Result<bool, FsError> {
        self.adapter
            .create_directory(&self.path(path), &self.options(options))
    }

    /// Copy a file. A destination ending in `/` or `\` names a directory.
    ///
    /// # Errors
    ///
    /// [`FsError::CopyFailed`] if `source` is a directory or missing.
    pub fn copy(
        &self,
        source: &str,
        destination: &str,
        options: Option<&Config>,
    ) -> Result<(), FsError> {
        let (source, destination) = self.transfer_paths(source, destination);
        self.adapter
            .copy(&source, &destination, &self.options(options))
    }

    /// Move a file. Destination resolution follows [`copy`](Self::copy).
    ///
    /// # Errors
    ///
    /// [`FsError::MoveFailed`] if `source` is a directory or missing, or the
    /// source could not be removed after copying.
    pub fn move_file(
        &self,
        source: &str,
        destination: &str,
        options: Option<&Config>,
    ) -> Result<(), FsError> {
        let (source, destination) = self.transfer_paths(source, destination);
        self.adapter
            .move_file(&source, &destination, &self.options(options))
    }

    /// Set the visibility of `path` from its string form.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidVisibilityProvided`] unless `visibility` is
    ///   `"public"` or `"private"`; the adapter is not called
    /// - [`FsError::SetVisibilityFailed`] if the backend rejects the change
    /// - [`FsError::NotSupported`] if the backend has no visibility concept
    pub fn set_visibility(&self, path: &str, visibility: &str) -> Result<(), FsError> {
        let visibility = Visibility::validate(visibility)?;
        self.adapter.set_visibility(&self.path(path), visibility)
    }

    /// Current visibility of `path`.
    ///
    /// # Errors
    ///
    /// [`FsError::RetrieveMetadataFailed`] if `path` is missing, or
    /// [`FsError::NotSupported`] for backends without visibility.
    pub fn visibility(&self, path: &str) -> Result<Visibility, FsError> {
        self.adapter.visibility(&self.path(path))
    }

    /// Size of the file in bytes.
    ///
    /// # Errors
    ///
    /// [`FsError::RetrieveMetadataFailed`] if `path` is missing or a directory.
    pub fn file_size(&self, path: &str) -> Result<u64, FsError> {
        self.adapter.file_size(&self.path(path))
    }

    /// MIME type of the file, when one can be determined.
    ///
    /// # Errors
    ///
    /// [`FsError::RetrieveMetadataFailed`] if `path` is missing or a directory.
    pub fn mime_type(&self, path: &str) -> Result<Option<String>, FsError> {
        self.adapter.mime_type(&self.path(path))
    }

    /// Last modification time in milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// [`FsError::RetrieveMetadataFailed`] if `path` is missing.
    pub fn last_modified(&self, path: &str) -> Result<u64, FsError> {
        self.adapter.last_modified(&self.path(path))
    }

    /// Every entry beneath the directory at `path`, recursively.
    ///
    /// # Errors
    ///
    /// [`FsError::ListContentsFailed`] if the backend listing fails.
    pub fn list_contents(&self, path: &str) -> Result<Vec<String>, FsError> {
        self.adapter.list_contents(&self.path(path))
    }

    /// Pre-signed URL for reading the file, valid for `expires_in`
    /// ([`TEMPORARY_URL_EXPIRY`] when `None`).
    ///
    /// # Errors
    ///
    /// - [`FsError::TemporaryUrlFailed`] if `path` is a directory or missing
    /// - [`FsError::NotSupported`] for backends that cannot sign URLs
    pub fn temporary_url(
        &self,
        path: &str,
        expires_in: Option<Duration>,
    ) -> Result<String, FsError> {
        let expires_in = expires_in.unwrap_or(TEMPORARY_URL_EXPIRY);
        self.adapter.temporary_url(&self.path(path), expires_in)
    }
}

impl std::fmt::Debug for Filesystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filesystem")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
