//! S3-compatible object storage adapter.
//!
//! Objects are flat keys; directories are key prefixes. An empty
//! directory is kept alive by a zero-byte [`DIRECTORY_MARKER`] object,
//! which listings report as the directory itself.
//!
//! The adapter is synchronous. It owns a current-thread tokio runtime and
//! blocks on each `object_store` future, so it must not be called from
//! inside another async runtime.

use std::future::Future;
use std::io::{self, Read};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, FuturesUnordered, StreamExt, TryStreamExt};
use http::Method;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, GetOptions, MultipartUpload, ObjectMeta, ObjectStore, PutMode,
    PutMultipartOpts, PutOptions, PutPayload, UploadPart,
};
use tokio::runtime::{Builder, Runtime};

use crate::path::resolve_destination;
use crate::{
    Config, ExtensionMimeTypeDetector, FilesystemReader, FilesystemWriter, FsError,
    MimeTypeDetector, OpenMode, Operation, ReadStream, Visibility,
};

/// Upper bound on keys per batch delete request.
pub const DELETE_BATCH_SIZE: usize = 1000;

/// Name of the placeholder object that keeps an empty directory alive.
pub const DIRECTORY_MARKER: &str = ".keep";

/// Parts uploaded concurrently by a multipart stream write.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Size of every multipart part except the last; S3 rejects smaller ones.
const PART_SIZE: usize = 5 * 1024 * 1024;

/// Connection settings for [`S3Adapter::new`].
///
/// Credentials left unset fall back to the usual AWS environment lookup.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct S3Config {
    /// Custom endpoint URL (MinIO, LocalStack, ...). Enables path-style requests.
    pub endpoint: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Bucket name.
    pub bucket: String,
    /// Region name.
    pub region: String,
}

impl S3Config {
    /// Settings for `bucket` in `region`.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    /// Set a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set static credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

/// Errors raised while constructing an [`S3Adapter`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// The object store client could not be configured.
    #[error("failed to create S3 store: {0}")]
    Store(#[from] object_store::Error),

    /// The runtime driving the client could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] io::Error),
}

/// Adapter over an S3-compatible bucket.
///
/// # Example
///
/// ```rust,no_run
/// use flyfs::{Filesystem, S3Adapter, S3Config};
///
/// let config = S3Config::new("assets", "us-east-1")
///     .with_endpoint("http://localhost:9000")
///     .with_credentials("minio", "minio123");
/// let fs = Filesystem::new(S3Adapter::new(&config)?);
/// fs.write("images/logo.png", [0x89, b'P', b'N', b'G'], None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct S3Adapter {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    runtime: Arc<Runtime>,
    mime: Box<dyn MimeTypeDetector>,
}

impl S3Adapter {
    /// Connect to the bucket described by `config`.
    ///
    /// The client also signs [`temporary_url`](FilesystemReader::temporary_url)
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the client or its runtime cannot be created.
    pub fn new(config: &S3Config) -> Result<Self, BuildError> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(key_id) = &config.access_key_id {
            builder = builder.with_access_key_id(key_id);
        }

        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let store = Arc::new(builder.build()?);
        tracing::debug!(bucket = config.bucket.as_str(), "created S3 store");
        Ok(Self::with_store(store.clone())?.with_signer(store))
    }

    /// Wrap an existing object store.
    ///
    /// Any [`ObjectStore`] works, which lets tests run against
    /// `object_store::memory::InMemory`. Without a
    /// [`with_signer`](Self::with_signer) call, temporary URLs are
    /// [`FsError::NotSupported`].
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Runtime`] if the runtime cannot start.
    pub fn with_store(store: Arc<dyn ObjectStore>) -> Result<Self, BuildError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            store,
            signer: None,
            runtime: Arc::new(runtime),
            mime: Box::new(ExtensionMimeTypeDetector),
        })
    }

    /// Sign temporary URLs with `signer`.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Replace the MIME type detector used for uploads and lookups.
    pub fn with_mime_detector(mut self, detector: impl MimeTypeDetector + 'static) -> Self {
        self.mime = Box::new(detector);
        self
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn to_object_path(path: &str) -> ObjectPath {
        ObjectPath::from(path.trim_start_matches('/'))
    }

    fn attributes_for(&self, path: &str) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(mime) = self.mime.detect(path) {
            attributes.insert(Attribute::ContentType, mime.into());
        }
        attributes
    }

    fn put(&self, path: &str, contents: Vec<u8>, mode: PutMode) -> object_store::Result<()> {
        let options = PutOptions {
            mode,
            attributes: self.attributes_for(path),
            ..Default::default()
        };
        self.block_on(self.store.put_opts(
            &Self::to_object_path(path),
            PutPayload::from(contents),
            options,
        ))
        .map(|_| ())
    }

    /// Store `contents` under the open mode in `config`.
    fn store_bytes(&self, path: &str, contents: Vec<u8>, config: &Config) -> Result<(), String> {
        let stored = match config.open_mode() {
            OpenMode::Truncate => self.put(path, contents, PutMode::Overwrite),
            OpenMode::CreateNew => self.put(path, contents, PutMode::Create),
            OpenMode::Append => {
                let mut existing = match self.fetch(path) {
                    Ok(bytes) => bytes.to_vec(),
                    Err(object_store::Error::NotFound { .. }) => Vec::new(),
                    Err(e) => return Err(e.to_string()),
                };
                existing.extend_from_slice(&contents);
                self.put(path, existing, PutMode::Overwrite)
            }
        };
        stored.map_err(|e| e.to_string())
    }

    fn fetch(&self, path: &str) -> object_store::Result<Bytes> {
        let location = Self::to_object_path(path);
        self.block_on(async { self.store.get(&location).await?.bytes().await })
    }

    fn upload_multipart(
        &self,
        path: &str,
        source: &mut dyn Read,
        chunk_size: usize,
    ) -> Result<usize, String> {
        let location = Self::to_object_path(path);
        let options = PutMultipartOpts {
            attributes: self.attributes_for(path),
            ..Default::default()
        };
        self.block_on(async {
            let upload = self
                .store
                .put_multipart_opts(&location, options)
                .await
                .map_err(|e| e.to_string())?;
            stream_parts(upload, source, chunk_size, PART_SIZE).await
        })
    }

    /// Every object under `path`, excluding an object keyed exactly `path`.
    fn list_objects(&self, path: &str) -> object_store::Result<Vec<ObjectMeta>> {
        let prefix = (!path.is_empty()).then(|| Self::to_object_path(path));
        self.block_on(async {
            self.store
                .list(prefix.as_ref())
                .try_filter(|meta| future::ready(Some(&meta.location) != prefix.as_ref()))
                .try_collect()
                .await
        })
    }

    /// Check that `path` names an existing object rather than a prefix.
    fn ensure_file(&self, path: &str) -> Result<(), String> {
        if path.is_empty() || path.ends_with('/') {
            return Err("path is a directory".to_owned());
        }
        match self.file_exists(path) {
            Ok(true) => Ok(()),
            Ok(false) if self.directory_exists(path).unwrap_or(false) => {
                Err("path is a directory".to_owned())
            }
            Ok(false) => Err("file does not exist".to_owned()),
            Err(e) => Err(e.reason().to_owned()),
        }
    }

    fn head(&self, path: &str) -> Result<ObjectMeta, FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::retrieve_metadata(path, "path is a directory"));
        }
        self.block_on(self.store.head(&Self::to_object_path(path)))
            .map_err(|e| FsError::retrieve_metadata(path, e))
    }

    fn copy_object(&self, source: &str, destination: &str) -> object_store::Result<()> {
        self.block_on(self.store.copy(
            &Self::to_object_path(source),
            &Self::to_object_path(destination),
        ))
    }
}

/// Feed `source` through `upload` and complete it, aborting the upload on
/// any failure so no parts are left behind in the bucket.
async fn stream_parts(
    mut upload: Box<dyn MultipartUpload>,
    source: &mut dyn Read,
    chunk_size: usize,
    part_size: usize,
) -> Result<usize, String> {
    let outcome = match send_parts(upload.as_mut(), source, chunk_size, part_size).await {
        Ok(written) => upload
            .complete()
            .await
            .map(|_| written)
            .map_err(|e| e.to_string()),
        Err(reason) => Err(reason),
    };
    if outcome.is_err() {
        if let Err(e) = upload.abort().await {
            tracing::warn!(error = %e, "could not abort multipart upload");
        }
    }
    outcome
}

/// Upload `source` in parts of `part_size` bytes, at most
/// [`MAX_CONCURRENT_PARTS`] in flight.
async fn send_parts(
    upload: &mut dyn MultipartUpload,
    source: &mut dyn Read,
    chunk_size: usize,
    part_size: usize,
) -> Result<usize, String> {
    let mut in_flight: FuturesUnordered<UploadPart> = FuturesUnordered::new();
    let mut buffer = vec![0; chunk_size];
    let mut part = Vec::with_capacity(part_size);
    let mut written = 0;
    loop {
        let read = match source.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.to_string()),
        };
        written += read;
        part.extend_from_slice(&buffer[..read]);
        while part.len() >= part_size {
            let rest = part.split_off(part_size);
            let full = std::mem::replace(&mut part, rest);
            if in_flight.len() >= MAX_CONCURRENT_PARTS {
                if let Some(done) = in_flight.next().await {
                    done.map_err(|e| e.to_string())?;
                }
            }
            in_flight.push(upload.put_part(PutPayload::from(full)));
        }
    }
    if !part.is_empty() {
        in_flight.push(upload.put_part(PutPayload::from(part)));
    }
    while let Some(done) = in_flight.next().await {
        done.map_err(|e| e.to_string())?;
    }
    Ok(written)
}

impl std::fmt::Debug for S3Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Adapter")
            .field("store", &format_args!("{}", self.store))
            .field("signs_urls", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

/// Blocking reader over an object's body stream.
///
/// Dropping it drops the underlying stream and its connection.
struct ObjectReader {
    runtime: Arc<Runtime>,
    stream: BoxStream<'static, object_store::Result<Bytes>>,
    chunk: Bytes,
}

impl Read for ObjectReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.chunk.is_empty() {
            match self.runtime.block_on(self.stream.next()) {
                Some(Ok(chunk)) => self.chunk = chunk,
                Some(Err(e)) => return Err(io::Error::other(e)),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.chunk.len());
        buf[..n].copy_from_slice(&self.chunk[..n]);
        self.chunk = self.chunk.slice(n..);
        Ok(n)
    }
}

impl FilesystemReader for S3Adapter {
    fn file_exists(&self, path: &str) -> Result<bool, FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Ok(false);
        }
        tracing::trace!(path, "s3 head");
        match self.block_on(self.store.head(&Self::to_object_path(path))) {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(FsError::file_existence(path, e)),
        }
    }

    fn directory_exists(&self, path: &str) -> Result<bool, FsError> {
        if path.is_empty() {
            return Ok(true);
        }
        tracing::trace!(path, "s3 prefix probe");
        let prefix = Self::to_object_path(path);
        let found = self.block_on(async {
            let mut listing = self.store.list(Some(&prefix));
            while let Some(meta) = listing.next().await {
                if meta?.location != prefix {
                    return Ok(true);
                }
            }
            Ok::<_, object_store::Error>(false)
        });
        found.map_err(|e| FsError::directory_existence(path, e))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::read(path, "path is a directory"));
        }
        self.fetch(path)
            .map(|bytes| bytes.to_vec())
            .map_err(|e| FsError::read(path, e))
    }

    fn read_stream(&self, path: &str) -> Result<ReadStream, FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::read(path, "path is a directory"));
        }
        let result = self
            .block_on(self.store.get(&Self::to_object_path(path)))
            .map_err(|e| FsError::read(path, e))?;
        Ok(Box::new(ObjectReader {
            runtime: Arc::clone(&self.runtime),
            stream: result.into_stream(),
            chunk: Bytes::new(),
        }))
    }

    fn file_size(&self, path: &str) -> Result<u64, FsError> {
        Ok(self.head(path)?.size as u64)
    }

    fn mime_type(&self, path: &str) -> Result<Option<String>, FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::retrieve_metadata(path, "path is a directory"));
        }
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = self
            .block_on(self.store.get_opts(&Self::to_object_path(path), options))
            .map_err(|e| FsError::retrieve_metadata(path, e))?;
        let stored = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        Ok(stored.or_else(|| self.mime.detect(path)))
    }

    fn last_modified(&self, path: &str) -> Result<u64, FsError> {
        let meta = self.head(path)?;
        Ok(u64::try_from(meta.last_modified.timestamp_millis()).unwrap_or(0))
    }

    fn visibility(&self, path: &str) -> Result<Visibility, FsError> {
        Err(FsError::not_supported(Operation::RetrieveMetadata, path))
    }

    fn list_contents(&self, path: &str) -> Result<Vec<String>, FsError> {
        let objects = self
            .list_objects(path)
            .map_err(|e| FsError::list_contents(path, e))?;
        let rooted = path.starts_with('/');
        let mut entries: Vec<String> = objects
            .into_iter()
            .filter_map(|meta| {
                let key = meta.location.to_string();
                let entry = match key.strip_suffix(DIRECTORY_MARKER) {
                    Some("") => return None,
                    Some(dir) if dir.ends_with('/') => dir.trim_end_matches('/').to_owned(),
                    _ => key,
                };
                Some(if rooted { format!("/{entry}") } else { entry })
            })
            .filter(|entry| entry != path)
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn temporary_url(&self, path: &str, expires_in: Duration) -> Result<String, FsError> {
        let Some(signer) = &self.signer else {
            return Err(FsError::not_supported(Operation::TemporaryUrl, path));
        };
        self.ensure_file(path)
            .map_err(|reason| FsError::temporary_url(path, reason))?;
        let url = self
            .block_on(signer.signed_url(Method::GET, &Self::to_object_path(path), expires_in))
            .map_err(|e| FsError::temporary_url(path, e))?;
        tracing::debug!(path, expires_secs = expires_in.as_secs(), "signed temporary url");
        Ok(url.to_string())
    }
}

impl FilesystemWriter for S3Adapter {
    fn write(&self, path: &str, contents: &[u8], config: &Config) -> Result<(), FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::write(path, "path is a directory"));
        }
        let encoded = config
            .encode(contents)
            .map_err(|reason| FsError::write(path, reason))?;
        let length = encoded.len();
        self.store_bytes(path, encoded.into_owned(), config)
            .map_err(|reason| FsError::write(path, reason))?;
        tracing::debug!(path, bytes = length, "uploaded object");
        Ok(())
    }

    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &Config,
    ) -> Result<(), FsError> {
        if path.is_empty() || path.ends_with('/') {
            return Err(FsError::write(path, "path is a directory"));
        }
        let written = match (config.chunk_size, config.open_mode()) {
            (Some(chunk_size), OpenMode::Truncate) => self
                .upload_multipart(path, source, chunk_size.max(1))
                .map_err(|reason| FsError::write(path, reason))?,
            _ => {
                let mut contents = Vec::new();
                source
                    .read_to_end(&mut contents)
                    .map_err(|e| FsError::write(path, e))?;
                let length = contents.len();
                self.store_bytes(path, contents, config)
                    .map_err(|reason| FsError::write(path, reason))?;
                length
            }
        };
        tracing::debug!(path, bytes = written, "streamed object");
        Ok(())
    }

    fn set_visibility(&self, path: &str, _visibility: Visibility) -> Result<(), FsError> {
        Err(FsError::not_supported(Operation::SetVisibility, path))
    }

    fn delete(&self, path: &str) -> Result<(), FsError> {
        self.ensure_file(path)
            .map_err(|reason| FsError::delete(path, reason))?;
        self.block_on(self.store.delete(&Self::to_object_path(path)))
            .map_err(|e| FsError::delete(path, e))?;
        tracing::debug!(path, "deleted object");
        Ok(())
    }

    fn delete_directory(&self, path: &str) -> Result<bool, FsError> {
        if self.file_exists(path).map_err(|e| FsError::delete_directory(path, e.reason()))? {
            return Err(FsError::delete_directory(path, "path is a file"));
        }
        let locations: Vec<ObjectPath> = self
            .list_objects(path)
            .map_err(|e| FsError::delete_directory(path, e))?
            .into_iter()
            .map(|meta| meta.location)
            .collect();

        for batch in locations.chunks(DELETE_BATCH_SIZE) {
            tracing::debug!(path, keys = batch.len(), "deleting object batch");
            self.block_on(async {
                let batch = stream::iter(batch.iter().cloned().map(Ok)).boxed();
                self.store
                    .delete_stream(batch)
                    .try_collect::<Vec<ObjectPath>>()
                    .await
            })
            .map_err(|e| FsError::delete_directory(path, e))?;
        }
        Ok(true)
    }

    fn create_directory(&self, path: &str, _config: &Config) -> Result<bool, FsError> {
        let directory = path.trim_end_matches('/');
        if directory.is_empty() {
            return Ok(true);
        }
        if self
            .file_exists(directory)
            .map_err(|e| FsError::create_directory(path, e.reason()))?
        {
            return Err(FsError::create_directory(path, "a file exists at this path"));
        }
        let marker = format!("{directory}/{DIRECTORY_MARKER}");
        self.put(&marker, Vec::new(), PutMode::Overwrite)
            .map_err(|e| FsError::create_directory(path, e))?;
        tracing::debug!(path, "created directory marker");
        Ok(true)
    }

    fn copy(&self, source: &str, destination: &str, _config: &Config) -> Result<(), FsError> {
        let destination = resolve_destination(source, destination);
        self.ensure_file(source)
            .map_err(|reason| FsError::copy(source, &destination, reason))?;
        let occupied = self
            .directory_exists(&destination)
            .map_err(|e| FsError::copy(source, &destination, e.reason()))?;
        if occupied {
            return Err(FsError::copy(source, &destination, "destination is a directory"));
        }
        self.copy_object(source, &destination)
            .map_err(|e| FsError::copy(source, &destination, e))?;
        tracing::debug!(source, destination = destination.as_str(), "copied object");
        Ok(())
    }

    fn move_file(
        &self,
        source: &str,
        destination: &str,
        _config: &Config,
    ) -> Result<(), FsError> {
        let destination = resolve_destination(source, destination);
        if destination.trim_start_matches('/') == source.trim_start_matches('/') {
            return self
                .ensure_file(source)
                .map_err(|reason| FsError::move_file(source, &destination, reason));
        }
        self.ensure_file(source)
            .map_err(|reason| FsError::move_file(source, &destination, reason))?;
        let occupied = self
            .directory_exists(&destination)
            .map_err(|e| FsError::move_file(source, &destination, e.reason()))?;
        if occupied {
            return Err(FsError::move_file(
                source,
                &destination,
                "destination is a directory",
            ));
        }
        self.copy_object(source, &destination)
            .map_err(|e| FsError::move_file(source, &destination, e))?;

        if let Err(e) = self.block_on(self.store.delete(&Self::to_object_path(source))) {
            tracing::warn!(
                source,
                destination = destination.as_str(),
                error = %e,
                "source survived move; copy left at destination"
            );
            return Err(FsError::move_file(
                source,
                &destination,
                format!("copied but could not delete source: {e}"),
            ));
        }
        tracing::debug!(source, destination = destination.as_str(), "moved object");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::AdapterExt;
    use crate::TEMPORARY_URL_EXPIRY;
    use object_store::memory::InMemory;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn adapter() -> (S3Adapter, Arc<InMemory>) {
        let store = Arc::new(InMemory::new());
        let adapter = S3Adapter::with_store(store.clone()).unwrap();
        (adapter, store)
    }

    fn config() -> Config {
        Config::default()
    }

    fn keys(adapter: &S3Adapter) -> Vec<String> {
        adapter
            .block_on(adapter.store.list(None).try_collect::<Vec<_>>())
            .unwrap()
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect()
    }

    #[test]
    fn write_read_and_probe() {
        let (fs, _) = adapter();
        fs.write("resources/tmp/tmp.txt", b"hello world", &config())
            .unwrap();
        assert_eq!(fs.read("resources/tmp/tmp.txt").unwrap(), b"hello world");
        assert_eq!(fs.file_size("resources/tmp/tmp.txt").unwrap(), 11);
        assert!(fs.file_exists("resources/tmp/tmp.txt").unwrap());
        assert!(!fs.file_exists("resources/tmp").unwrap());
        assert!(fs.directory_exists("resources/tmp").unwrap());
        assert!(fs.directory_exists("resources").unwrap());
        assert!(!fs.directory_exists("resources/tmp/tmp.txt").unwrap());
        assert!(fs.directory_exists("").unwrap());
    }

    #[test]
    fn leading_slash_maps_to_same_key() {
        let (fs, _) = adapter();
        fs.write("/a.txt", b"x", &config()).unwrap();
        assert_eq!(keys(&fs), vec!["a.txt"]);
        assert!(fs.file_exists("a.txt").unwrap());
    }

    #[test]
    fn write_modes() {
        let (fs, _) = adapter();
        fs.write("log", b"a", &config()).unwrap();
        fs.write("log", b"b", &Config::new().with_mode(OpenMode::Append))
            .unwrap();
        assert_eq!(fs.read("log").unwrap(), b"ab");
        let err = fs
            .write("log", b"c", &Config::new().with_mode(OpenMode::CreateNew))
            .unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
        assert!(matches!(
            fs.write("dir/", b"x", &config()),
            Err(FsError::WriteFailed { .. })
        ));
    }

    #[test]
    fn content_type_is_stored_on_upload() {
        let (fs, _) = adapter();
        fs.write("doc.json", b"{}", &config()).unwrap();
        assert_eq!(
            fs.mime_type("doc.json").unwrap().as_deref(),
            Some("application/json")
        );
        assert!(fs.mime_type("missing.json").is_err());
    }

    #[test]
    fn multipart_stream_write() {
        let (fs, _) = adapter();
        let payload = vec![3_u8; 64];
        let mut source = Cursor::new(payload.clone());
        fs.write_stream("big.bin", &mut source, &Config::new().with_chunk_size(16))
            .unwrap();
        assert_eq!(fs.read("big.bin").unwrap(), payload);
    }

    #[test]
    fn buffered_stream_write() {
        let (fs, _) = adapter();
        let mut source = Cursor::new(b"small".to_vec());
        fs.write_stream("small.txt", &mut source, &config()).unwrap();
        assert_eq!(fs.read_to_string("small.txt").unwrap(), "small");
    }

    #[test]
    fn read_stream_is_incremental() {
        let (fs, _) = adapter();
        fs.write("a.txt", b"hello world", &config()).unwrap();
        let mut reader = fs.read_stream("a.txt").unwrap();
        let mut head = [0_u8; 5];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"hello");
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b" world");
        assert!(matches!(
            fs.read_stream("missing"),
            Err(FsError::ReadFailed { .. })
        ));
    }

    #[test]
    fn directory_markers() {
        let (fs, _) = adapter();
        assert!(fs.create_directory("empty", &config()).unwrap());
        assert!(fs.directory_exists("empty").unwrap());
        assert_eq!(keys(&fs), vec!["empty/.keep"]);
        assert_eq!(fs.list_contents("").unwrap(), vec!["empty"]);
        assert!(fs.list_contents("empty").unwrap().is_empty());
    }

    #[test]
    fn create_directory_over_file_fails() {
        let (fs, _) = adapter();
        fs.write("taken", b"x", &config()).unwrap();
        assert!(matches!(
            fs.create_directory("taken", &config()),
            Err(FsError::CreateDirectoryFailed { .. })
        ));
    }

    #[test]
    fn list_contents_is_recursive() {
        let (fs, _) = adapter();
        fs.create_directory("docs", &config()).unwrap();
        fs.write("docs/a.txt", b"", &config()).unwrap();
        fs.write("docs/sub/b.txt", b"", &config()).unwrap();
        assert_eq!(
            fs.list_contents("docs").unwrap(),
            vec!["docs/a.txt", "docs/sub/b.txt"]
        );
        assert!(fs.list_contents("docs/a.txt").unwrap().is_empty());
    }

    #[test]
    fn visibility_is_not_supported() {
        let (fs, _) = adapter();
        fs.write("a", b"", &config()).unwrap();
        assert!(fs.set_visibility("a", Visibility::Public).unwrap_err().is_not_supported());
        assert!(fs.visibility("a").unwrap_err().is_not_supported());
    }

    #[test]
    fn delete_refuses_prefixes() {
        let (fs, _) = adapter();
        fs.write("dir/a.txt", b"", &config()).unwrap();
        assert!(matches!(fs.delete("dir"), Err(FsError::DeleteFailed { .. })));
        assert!(matches!(fs.delete("nope"), Err(FsError::DeleteFailed { .. })));
        fs.delete("dir/a.txt").unwrap();
        assert!(!fs.has("dir").unwrap());
    }

    #[test]
    fn delete_directory_spans_batches() {
        let (fs, _) = adapter();
        for i in 0..(DELETE_BATCH_SIZE + 5) {
            fs.write(&format!("bulk/{i}"), b"", &config()).unwrap();
        }
        fs.write("bulky", b"", &config()).unwrap();
        assert!(fs.delete_directory("bulk").unwrap());
        assert!(!fs.directory_exists("bulk").unwrap());
        assert_eq!(keys(&fs), vec!["bulky"]);
    }

    #[test]
    fn delete_directory_on_file_fails() {
        let (fs, _) = adapter();
        fs.write("f", b"", &config()).unwrap();
        assert!(matches!(
            fs.delete_directory("f"),
            Err(FsError::DeleteDirectoryFailed { .. })
        ));
        assert!(fs.file_exists("f").unwrap());
    }

    #[test]
    fn copy_and_move() {
        let (fs, _) = adapter();
        fs.write("src/a.txt", b"data", &config()).unwrap();
        fs.copy("src/a.txt", "dst/", &config()).unwrap();
        assert!(fs.file_exists("src/a.txt").unwrap());
        assert_eq!(fs.read("dst/a.txt").unwrap(), b"data");

        fs.move_file("src/a.txt", "moved.txt", &config()).unwrap();
        assert!(!fs.file_exists("src/a.txt").unwrap());
        assert_eq!(fs.read("moved.txt").unwrap(), b"data");

        fs.move_file("moved.txt", "moved.txt", &config()).unwrap();
        assert!(fs.file_exists("moved.txt").unwrap());
    }

    #[test]
    fn copy_rejects_prefixes() {
        let (fs, _) = adapter();
        fs.write("dir/a.txt", b"", &config()).unwrap();
        assert!(matches!(
            fs.copy("dir", "elsewhere/", &config()),
            Err(FsError::CopyFailed { .. })
        ));
        assert!(matches!(
            fs.move_file("missing", "elsewhere", &config()),
            Err(FsError::MoveFailed { .. })
        ));
    }

    #[test]
    fn copy_and_move_onto_prefix_fail() {
        let (fs, _) = adapter();
        fs.write("a.txt", b"data", &config()).unwrap();
        fs.write("dir/inner.txt", b"", &config()).unwrap();

        let err = fs.copy("a.txt", "dir", &config()).unwrap_err();
        assert!(matches!(err, FsError::CopyFailed { .. }));
        assert_eq!(err.reason(), "destination is a directory");

        let err = fs.move_file("a.txt", "dir", &config()).unwrap_err();
        assert!(matches!(err, FsError::MoveFailed { .. }));

        assert!(!fs.file_exists("dir").unwrap());
        assert!(fs.file_exists("a.txt").unwrap());
        assert_eq!(keys(&fs), vec!["a.txt", "dir/inner.txt"]);
    }

    fn signing_adapter() -> S3Adapter {
        let signer = AmazonS3Builder::new()
            .with_bucket_name("assets")
            .with_region("us-east-1")
            .with_access_key_id("key-id")
            .with_secret_access_key("secret")
            .build()
            .unwrap();
        let (fs, _) = adapter();
        fs.with_signer(Arc::new(signer))
    }

    #[test]
    fn temporary_url_is_signed() {
        let fs = signing_adapter();
        fs.write("docs/a.txt", b"hello", &config()).unwrap();

        let url = fs.temporary_url("docs/a.txt", TEMPORARY_URL_EXPIRY).unwrap();
        assert!(url.contains("docs/a.txt"), "{url}");
        assert!(url.contains("X-Amz-Expires=604800"), "{url}");
        assert!(url.contains("X-Amz-Signature="), "{url}");

        let url = fs
            .temporary_url("docs/a.txt", Duration::from_secs(60))
            .unwrap();
        assert!(url.contains("X-Amz-Expires=60&") || url.ends_with("X-Amz-Expires=60"));
    }

    #[test]
    fn temporary_url_rejects_directories_and_missing_files() {
        let fs = signing_adapter();
        fs.write("docs/a.txt", b"hello", &config()).unwrap();

        for path in ["docs", "docs/", "", "docs/missing.txt"] {
            let err = fs.temporary_url(path, TEMPORARY_URL_EXPIRY).unwrap_err();
            assert!(matches!(err, FsError::TemporaryUrlFailed { .. }), "{path}: {err}");
            assert_eq!(err.operation(), Operation::TemporaryUrl);
        }
    }

    #[test]
    fn temporary_url_without_signer_is_not_supported() {
        let (fs, _) = adapter();
        fs.write("a.txt", b"", &config()).unwrap();
        let err = fs.temporary_url("a.txt", TEMPORARY_URL_EXPIRY).unwrap_err();
        assert!(err.is_not_supported());
        assert_eq!(err.operation(), Operation::TemporaryUrl);
    }

    /// Multipart upload with scripted failures that records aborts.
    #[derive(Debug, Default)]
    struct ScriptedUpload {
        reject_parts: bool,
        reject_complete: bool,
        parts: Arc<AtomicUsize>,
        aborted: Arc<AtomicBool>,
    }

    fn rejected(what: &'static str) -> object_store::Error {
        object_store::Error::Generic {
            store: "scripted",
            source: what.into(),
        }
    }

    #[async_trait::async_trait]
    impl MultipartUpload for ScriptedUpload {
        fn put_part(&mut self, _data: PutPayload) -> UploadPart {
            self.parts.fetch_add(1, Ordering::SeqCst);
            let reject = self.reject_parts;
            Box::pin(async move {
                if reject {
                    Err(rejected("part rejected"))
                } else {
                    Ok(())
                }
            })
        }

        async fn complete(&mut self) -> object_store::Result<object_store::PutResult> {
            if self.reject_complete {
                return Err(rejected("complete rejected"));
            }
            Ok(object_store::PutResult {
                e_tag: None,
                version: None,
            })
        }

        async fn abort(&mut self) -> object_store::Result<()> {
            self.aborted.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenSource;

    impl Read for BrokenSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("source broke"))
        }
    }

    #[test]
    fn stream_parts_splits_and_completes() {
        let upload = ScriptedUpload::default();
        let (parts, aborted) = (upload.parts.clone(), upload.aborted.clone());
        let mut source = Cursor::new(vec![1_u8; 10]);
        let written =
            futures::executor::block_on(stream_parts(Box::new(upload), &mut source, 3, 4))
                .unwrap();
        assert_eq!(written, 10);
        assert_eq!(parts.load(Ordering::SeqCst), 3);
        assert!(!aborted.load(Ordering::SeqCst));
    }

    #[test]
    fn stream_parts_aborts_when_a_part_fails() {
        let upload = ScriptedUpload {
            reject_parts: true,
            ..Default::default()
        };
        let aborted = upload.aborted.clone();
        let mut source = Cursor::new(vec![1_u8; 16]);
        let err = futures::executor::block_on(stream_parts(Box::new(upload), &mut source, 4, 4))
            .unwrap_err();
        assert!(err.contains("part rejected"), "{err}");
        assert!(aborted.load(Ordering::SeqCst));
    }

    #[test]
    fn stream_parts_aborts_when_the_last_part_fails() {
        let upload = ScriptedUpload {
            reject_parts: true,
            ..Default::default()
        };
        let aborted = upload.aborted.clone();
        let mut source = Cursor::new(vec![1_u8; 2]);
        let err = futures::executor::block_on(stream_parts(Box::new(upload), &mut source, 4, 4))
            .unwrap_err();
        assert!(err.contains("part rejected"), "{err}");
        assert!(aborted.load(Ordering::SeqCst));
    }

    #[test]
    fn stream_parts_aborts_when_complete_fails() {
        let upload = ScriptedUpload {
            reject_complete: true,
            ..Default::default()
        };
        let aborted = upload.aborted.clone();
        let mut source = Cursor::new(vec![1_u8; 5]);
        let err = futures::executor::block_on(stream_parts(Box::new(upload), &mut source, 4, 4))
            .unwrap_err();
        assert!(err.contains("complete rejected"), "{err}");
        assert!(aborted.load(Ordering::SeqCst));
    }

    #[test]
    fn stream_parts_aborts_when_the_source_fails() {
        let upload = ScriptedUpload::default();
        let aborted = upload.aborted.clone();
        let err =
            futures::executor::block_on(stream_parts(Box::new(upload), &mut BrokenSource, 4, 4))
                .unwrap_err();
        assert_eq!(err, "source broke");
        assert!(aborted.load(Ordering::SeqCst));
    }
}
