//! # Extension Traits
//!
//! Convenience methods for storage adapters.
//!
//! [`AdapterExt`] is blanket-implemented, so any
//! [`FilesystemAdapter`](crate::FilesystemAdapter) (including trait objects)
//! gets these for free.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`has`](AdapterExt::has) | File or directory exists |
//! | [`read_to_string`](AdapterExt::read_to_string) | Read and decode UTF-8 |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature, `AdapterExtJson` adds `read_json` and
//! `write_json`.

use crate::{FilesystemAdapter, FsError};

/// Extension methods for any storage adapter.
///
/// # Example
///
/// ```rust
/// use flyfs::prelude::*;
/// use flyfs::InMemoryAdapter;
///
/// let adapter = InMemoryAdapter::new();
/// adapter.create_directory("data", &Default::default()).unwrap();
/// assert!(adapter.has("data").unwrap());
/// assert!(!adapter.has("data/missing.txt").unwrap());
/// ```
pub trait AdapterExt: FilesystemAdapter {
    /// Whether a file or a directory exists at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::ExistenceCheckFailed`] if either probe cannot reach the backend
    fn has(&self, path: &str) -> Result<bool, FsError> {
        Ok(self.file_exists(path)? || self.directory_exists(path)?)
    }

    /// Read the file and decode it as UTF-8.
    ///
    /// # Errors
    ///
    /// - [`FsError::ReadFailed`] if the read fails or the contents are not UTF-8
    fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| FsError::read(path, e))
    }
}

impl<A: FilesystemAdapter + ?Sized> AdapterExt for A {}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use crate::Config;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON serialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait AdapterExtJson: FilesystemAdapter {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - [`FsError::ReadFailed`] if the read or the deserialization fails
        fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let bytes = self.read(path)?;
            serde_json::from_slice(&bytes).map_err(|e| FsError::read(path, e))
        }

        /// Serialize `value` as pretty JSON and write it.
        ///
        /// # Errors
        ///
        /// - [`FsError::WriteFailed`] if the serialization or the write fails
        fn write_json<T: Serialize>(
            &self,
            path: &str,
            value: &T,
            config: &Config,
        ) -> Result<(), FsError> {
            let bytes = serde_json::to_vec_pretty(value).map_err(|e| FsError::write(path, e))?;
            self.write(path, &bytes, config)
        }
    }

    impl<A: FilesystemAdapter + ?Sized> AdapterExtJson for A {}
}

#[cfg(feature = "serde")]
pub use json::AdapterExtJson;
