//! Local disk adapter.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::adapters::epoch_millis;
use crate::path::resolve_destination;
use crate::{
    Config, ExtensionMimeTypeDetector, FilesystemReader, FilesystemWriter, FsError,
    MimeTypeDetector, OpenMode, Operation, PortableUnixVisibilityConverter, ReadStream,
    UnixVisibilityConverter, Visibility,
};

/// Adapter over a directory tree on local disk.
///
/// Every path is resolved beneath the root location; a leading `/` is
/// relative to the root, never to the host filesystem root.
///
/// Visibility maps to Unix permission bits through a
/// [`UnixVisibilityConverter`]. On non-Unix targets the visibility
/// operations return [`FsError::NotSupported`].
///
/// # Example
///
/// ```rust,no_run
/// use flyfs::{Filesystem, LocalAdapter};
///
/// let fs = Filesystem::new(LocalAdapter::new("/var/lib/app"));
/// fs.create_directory("reports/2024", None)?;
/// fs.write("reports/2024/summary.txt", "done", None)?;
/// # Ok::<(), flyfs::FsError>(())
/// ```
pub struct LocalAdapter {
    root: PathBuf,
    converter: Box<dyn UnixVisibilityConverter>,
    mime: Box<dyn MimeTypeDetector>,
}

impl LocalAdapter {
    /// Adapter rooted at `root` with the portable visibility table.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            converter: Box::new(PortableUnixVisibilityConverter::new()),
            mime: Box::new(ExtensionMimeTypeDetector),
        }
    }

    /// Replace the visibility converter.
    pub fn with_visibility_converter(
        mut self,
        converter: impl UnixVisibilityConverter + 'static,
    ) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Replace the MIME type detector.
    pub fn with_mime_detector(mut self, detector: impl MimeTypeDetector + 'static) -> Self {
        self.mime = Box::new(detector);
        self
    }

    /// The root location.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }

    fn open_for_write(&self, path: &str, config: &Config) -> Result<File, FsError> {
        let full = self.full_path(path);
        if path.is_empty() || path.ends_with('/') || full.is_dir() {
            return Err(FsError::write(path, "target is a directory"));
        }

        let mut options = OpenOptions::new();
        match config.open_mode() {
            OpenMode::Truncate => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::CreateNew => options.write(true).create_new(true),
        };
        options.open(&full).map_err(|e| FsError::write(path, e))
    }

    fn apply_file_visibility(&self, full: &Path, config: &Config) -> io::Result<()> {
        match config.visibility {
            Some(visibility) => chmod(full, self.converter.for_file(visibility)),
            None => Ok(()),
        }
    }

    fn metadata(&self, path: &str) -> Result<fs::Metadata, FsError> {
        fs::metadata(self.full_path(path)).map_err(|e| FsError::retrieve_metadata(path, e))
    }

    fn ensure_source_file(&self, source: &str) -> Result<PathBuf, String> {
        let full = self.full_path(source);
        if source.is_empty() || source.ends_with('/') || full.is_dir() {
            return Err("source is a directory".to_owned());
        }
        Ok(full)
    }

    /// Remove everything under the root, keeping the root itself.
    fn clear_root(&self) -> io::Result<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn collect_entries(
        &self,
        location: &str,
        dir: &Path,
        out: &mut Vec<String>,
    ) -> Result<(), FsError> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| FsError::list_contents(location, e))? {
            let entry = entry.map_err(|e| FsError::list_contents(location, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| FsError::list_contents(location, e))?
                .is_dir();
            children.push((entry.file_name(), entry.path(), is_dir));
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, child_path, is_dir) in children {
            let name = name.to_string_lossy();
            let child = if location.is_empty() {
                name.into_owned()
            } else {
                format!("{location}/{name}")
            };
            out.push(child.clone());
            if is_dir {
                self.collect_entries(&child, &child_path, out)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn chmod(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn chmod(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

impl FilesystemReader for LocalAdapter {
    fn file_exists(&self, path: &str) -> Result<bool, FsError> {
        tracing::trace!(path, "local file_exists");
        Ok(self.full_path(path).is_file())
    }

    fn directory_exists(&self, path: &str) -> Result<bool, FsError> {
        tracing::trace!(path, "local directory_exists");
        Ok(self.full_path(path).is_dir())
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let full = self.full_path(path);
        if full.is_dir() {
            return Err(FsError::read(path, "target is a directory"));
        }
        fs::read(&full).map_err(|e| FsError::read(path, e))
    }

    fn read_stream(&self, path: &str) -> Result<ReadStream, FsError> {
        let full = self.full_path(path);
        if full.is_dir() {
            return Err(FsError::read(path, "target is a directory"));
        }
        let file = File::open(&full).map_err(|e| FsError::read(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn file_size(&self, path: &str) -> Result<u64, FsError> {
        let metadata = self.metadata(path)?;
        if metadata.is_dir() {
            return Err(FsError::retrieve_metadata(path, "target is a directory"));
        }
        Ok(metadata.len())
    }

    fn mime_type(&self, path: &str) -> Result<Option<String>, FsError> {
        let metadata = self.metadata(path)?;
        if !metadata.is_file() {
            return Err(FsError::retrieve_metadata(path, "target is not a file"));
        }
        Ok(self.mime.detect(path))
    }

    fn last_modified(&self, path: &str) -> Result<u64, FsError> {
        let modified = self
            .metadata(path)?
            .modified()
            .map_err(|e| FsError::retrieve_metadata(path, e))?;
        Ok(epoch_millis(modified))
    }

    fn visibility(&self, path: &str) -> Result<Visibility, FsError> {
        let metadata = self.metadata(path)?;
        let Some(mode) = permission_bits(&metadata) else {
            return Err(FsError::not_supported(Operation::RetrieveMetadata, path));
        };
        Ok(if metadata.is_dir() {
            self.converter.inverse_for_directory(mode)
        } else {
            self.converter.inverse_for_file(mode)
        })
    }

    fn list_contents(&self, path: &str) -> Result<Vec<String>, FsError> {
        let full = self.full_path(path);
        let mut entries = Vec::new();
        if full.is_dir() {
            self.collect_entries(path, &full, &mut entries)?;
        }
        Ok(entries)
    }
}

impl FilesystemWriter for LocalAdapter {
    fn write(&self, path: &str, contents: &[u8], config: &Config) -> Result<(), FsError> {
        let encoded = config
            .encode(contents)
            .map_err(|reason| FsError::write(path, reason))?;
        let mut file = self.open_for_write(path, config)?;
        file.write_all(&encoded)
            .map_err(|e| FsError::write(path, e))?;
        self.apply_file_visibility(&self.full_path(path), config)
            .map_err(|e| FsError::write(path, e))?;
        tracing::debug!(path, bytes = encoded.len(), "wrote file");
        Ok(())
    }

    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &Config,
    ) -> Result<(), FsError> {
        let mut file = self.open_for_write(path, config)?;
        let mut written = 0;
        match config.chunk_size {
            Some(chunk_size) => {
                let mut buffer = vec![0; chunk_size.max(1)];
                loop {
                    let read = match source.read(&mut buffer) {
                        Ok(0) => break,
                        Ok(read) => read,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(FsError::write(path, e)),
                    };
                    file.write_all(&buffer[..read])
                        .map_err(|e| FsError::write(path, e))?;
                    written += read;
                }
            }
            None => {
                let mut buffer = Vec::new();
                source
                    .read_to_end(&mut buffer)
                    .map_err(|e| FsError::write(path, e))?;
                file.write_all(&buffer)
                    .map_err(|e| FsError::write(path, e))?;
                written = buffer.len();
            }
        }
        self.apply_file_visibility(&self.full_path(path), config)
            .map_err(|e| FsError::write(path, e))?;
        tracing::debug!(path, bytes = written, "streamed file");
        Ok(())
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError> {
        if !cfg!(unix) {
            return Err(FsError::not_supported(Operation::SetVisibility, path));
        }
        let full = self.full_path(path);
        let metadata = fs::metadata(&full).map_err(|e| FsError::set_visibility(path, e))?;
        let mode = if metadata.is_dir() {
            self.converter.for_directory(visibility)
        } else {
            self.converter.for_file(visibility)
        };
        chmod(&full, mode).map_err(|e| FsError::set_visibility(path, e))?;
        tracing::debug!(path, %visibility, "set visibility");
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), FsError> {
        let full = self.full_path(path);
        if path.is_empty() || path.ends_with('/') || full.is_dir() {
            return Err(FsError::delete(path, "Could not delete directory"));
        }
        fs::remove_file(&full).map_err(|e| FsError::delete(path, e))?;
        tracing::debug!(path, "deleted file");
        Ok(())
    }

    fn delete_directory(&self, path: &str) -> Result<bool, FsError> {
        let full = self.full_path(path);
        let metadata =
            fs::symlink_metadata(&full).map_err(|e| FsError::delete_directory(path, e))?;
        if !metadata.is_dir() {
            return Err(FsError::delete_directory(path, "target is not a directory"));
        }
        if full == self.root {
            self.clear_root().map_err(|e| FsError::delete_directory(path, e))?;
            tracing::debug!("cleared root directory");
            return Ok(true);
        }
        fs::remove_dir_all(&full).map_err(|e| FsError::delete_directory(path, e))?;
        tracing::debug!(path, "deleted directory");
        Ok(true)
    }

    fn create_directory(&self, path: &str, config: &Config) -> Result<bool, FsError> {
        let full = self.full_path(path);
        fs::create_dir_all(&full).map_err(|e| FsError::create_directory(path, e))?;
        if let Some(visibility) = config.directory_visibility {
            chmod(&full, self.converter.for_directory(visibility))
                .map_err(|e| FsError::create_directory(path, e))?;
        }
        tracing::debug!(path, "created directory");
        Ok(true)
    }

    fn copy(&self, source: &str, destination: &str, config: &Config) -> Result<(), FsError> {
        let destination = resolve_destination(source, destination);
        let from = self
            .ensure_source_file(source)
            .map_err(|reason| FsError::copy(source, &destination, reason))?;
        let to = self.full_path(&destination);
        if to.is_dir() {
            return Err(FsError::copy(source, &destination, "destination is a directory"));
        }
        // `fs::copy` truncates the destination before reading the source.
        if from == to {
            if !from.is_file() {
                return Err(FsError::copy(source, &destination, "source file does not exist"));
            }
        } else {
            fs::copy(&from, &to).map_err(|e| FsError::copy(source, &destination, e))?;
        }
        self.apply_file_visibility(&to, config)
            .map_err(|e| FsError::copy(source, &destination, e))?;
        tracing::debug!(source, destination = destination.as_str(), "copied file");
        Ok(())
    }

    fn move_file(
        &self,
        source: &str,
        destination: &str,
        config: &Config,
    ) -> Result<(), FsError> {
        let destination = resolve_destination(source, destination);
        let from = self
            .ensure_source_file(source)
            .map_err(|reason| FsError::move_file(source, &destination, reason))?;
        let to = self.full_path(&destination);
        if to.is_dir() {
            return Err(FsError::move_file(
                source,
                &destination,
                "destination is a directory",
            ));
        }
        fs::rename(&from, &to).map_err(|e| FsError::move_file(source, &destination, e))?;
        self.apply_file_visibility(&to, config)
            .map_err(|e| FsError::move_file(source, &destination, e))?;
        tracing::debug!(source, destination = destination.as_str(), "moved file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ext::AdapterExt;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn adapter() -> (LocalAdapter, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (LocalAdapter::new(temp_dir.path()), temp_dir)
    }

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn create_write_read_scenario() {
        let (fs, _dir) = adapter();
        assert!(fs.create_directory("resources/tmp", &config()).unwrap());
        fs.write("resources/tmp/tmp.txt", b"hello world", &config())
            .unwrap();

        assert_eq!(fs.read("resources/tmp/tmp.txt").unwrap(), b"hello world");
        assert_eq!(fs.file_size("resources/tmp/tmp.txt").unwrap(), 11);
        assert!(!fs.file_exists("resources/tmp/tmp2.txt").unwrap());
        assert!(!fs.file_exists("resources/tmp").unwrap());
        assert!(fs.directory_exists("resources/tmp").unwrap());
        assert!(!fs.directory_exists("resources/tmp/tmp.txt").unwrap());
    }

    #[test]
    fn create_directory_is_idempotent() {
        let (fs, _dir) = adapter();
        assert!(fs.create_directory("a/b/c", &config()).unwrap());
        assert!(fs.create_directory("a/b/c", &config()).unwrap());
        assert!(fs.directory_exists("a/b").unwrap());
    }

    #[test]
    fn create_directory_over_file_fails() {
        let (fs, _dir) = adapter();
        fs.write("taken", b"x", &config()).unwrap();
        let err = fs.create_directory("taken", &config()).unwrap_err();
        assert!(matches!(err, FsError::CreateDirectoryFailed { .. }));
    }

    #[test]
    fn write_without_parent_fails() {
        let (fs, _dir) = adapter();
        let err = fs
            .write("resources/tmp3/tmp.txt", b"hello world", &config())
            .unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
        assert_eq!(err.location(), "resources/tmp3/tmp.txt");
    }

    #[test]
    fn write_to_directory_fails() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();
        let err = fs.write("resources/tmp", b"x", &config()).unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
        let err = fs.write("resources/tmp/", b"x", &config()).unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
    }

    #[test]
    fn write_modes() {
        let (fs, _dir) = adapter();
        fs.write("log.txt", b"one", &config()).unwrap();
        fs.write(
            "log.txt",
            b"-two",
            &Config::new().with_mode(OpenMode::Append),
        )
        .unwrap();
        assert_eq!(fs.read("log.txt").unwrap(), b"one-two");

        let err = fs
            .write("log.txt", b"x", &Config::new().with_mode(OpenMode::CreateNew))
            .unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));

        fs.write("log.txt", b"reset", &config()).unwrap();
        assert_eq!(fs.read("log.txt").unwrap(), b"reset");
    }

    #[test]
    fn write_enforces_encoding() {
        let (fs, _dir) = adapter();
        let strict = Config::new().with_encoding(crate::Encoding::Utf8);
        let err = fs.write("bad.txt", b"\xff", &strict).unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
        assert!(!fs.file_exists("bad.txt").unwrap());
    }

    #[test]
    fn write_stream_in_chunks() {
        let (fs, _dir) = adapter();
        let mut source = Cursor::new(b"hello world".to_vec());
        fs.write_stream("stream.txt", &mut source, &Config::new().with_chunk_size(3))
            .unwrap();
        assert_eq!(fs.read_to_string("stream.txt").unwrap(), "hello world");

        let mut source = Cursor::new(b"whole".to_vec());
        fs.write_stream("whole.txt", &mut source, &config()).unwrap();
        assert_eq!(fs.read("whole.txt").unwrap(), b"whole");
    }

    #[test]
    fn write_stream_without_parent_fails() {
        let (fs, _dir) = adapter();
        let mut source = Cursor::new(b"x".to_vec());
        let err = fs
            .write_stream("missing/a.txt", &mut source, &config())
            .unwrap_err();
        assert!(matches!(err, FsError::WriteFailed { .. }));
    }

    #[test]
    fn read_failures() {
        let (fs, _dir) = adapter();
        fs.create_directory("dir", &config()).unwrap();
        assert!(matches!(fs.read("dir"), Err(FsError::ReadFailed { .. })));
        assert!(matches!(fs.read("nope.txt"), Err(FsError::ReadFailed { .. })));
        assert!(matches!(
            fs.read_stream("dir"),
            Err(FsError::ReadFailed { .. })
        ));
    }

    #[test]
    fn read_stream_returns_contents() {
        let (fs, _dir) = adapter();
        fs.write("a.txt", b"streamed", &config()).unwrap();
        let mut contents = String::new();
        fs.read_stream("a.txt")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "streamed");
    }

    #[test]
    fn metadata_operations() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"hello world", &config())
            .unwrap();

        assert_eq!(
            fs.mime_type("resources/tmp/tmp.txt").unwrap().as_deref(),
            Some("text/plain")
        );
        assert!(matches!(
            fs.mime_type("resources/tmp"),
            Err(FsError::RetrieveMetadataFailed { .. })
        ));
        assert!(matches!(
            fs.file_size("resources/tmp"),
            Err(FsError::RetrieveMetadataFailed { .. })
        ));
        assert!(matches!(
            fs.file_size("missing.txt"),
            Err(FsError::RetrieveMetadataFailed { .. })
        ));

        let now = epoch_millis(std::time::SystemTime::now());
        let modified = fs.last_modified("resources/tmp/tmp.txt").unwrap();
        assert!(now.abs_diff(modified) < 60 * 60 * 1000);
        assert!(fs.last_modified("resources/tmp").is_ok());
        assert!(fs.last_modified("missing").is_err());
    }

    #[test]
    fn list_contents_is_recursive_and_sorted() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp/nested", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"x", &config()).unwrap();
        fs.write("resources/tmp/nested/deep.txt", b"x", &config())
            .unwrap();

        assert_eq!(
            fs.list_contents("resources/tmp").unwrap(),
            vec![
                "resources/tmp/nested",
                "resources/tmp/nested/deep.txt",
                "resources/tmp/tmp.txt",
            ]
        );
        assert!(fs.list_contents("resources/tmp/tmp.txt").unwrap().is_empty());
        assert!(fs.list_contents("missing").unwrap().is_empty());
    }

    #[test]
    fn copy_and_move() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();
        fs.create_directory("resources/tmp2", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"hello", &config()).unwrap();

        fs.copy("resources/tmp/tmp.txt", "resources/tmp2/copy.txt", &config())
            .unwrap();
        assert!(fs.file_exists("resources/tmp/tmp.txt").unwrap());
        assert_eq!(fs.read("resources/tmp2/copy.txt").unwrap(), b"hello");

        fs.copy("resources/tmp/tmp.txt", "resources/tmp2/", &config())
            .unwrap();
        assert!(fs.file_exists("resources/tmp2/tmp.txt").unwrap());

        fs.move_file("resources/tmp/tmp.txt", "resources/moved.txt", &config())
            .unwrap();
        assert!(!fs.file_exists("resources/tmp/tmp.txt").unwrap());
        assert!(fs.file_exists("resources/moved.txt").unwrap());
    }

    #[test]
    fn copy_onto_itself_keeps_contents() {
        let (fs, _dir) = adapter();
        fs.create_directory("a", &config()).unwrap();
        fs.write("a/x.txt", b"hello world", &config()).unwrap();

        fs.copy("a/x.txt", "a/", &config()).unwrap();
        assert_eq!(fs.read("a/x.txt").unwrap(), b"hello world");

        fs.copy("a/x.txt", "/a/x.txt", &config()).unwrap();
        assert_eq!(fs.read("a/x.txt").unwrap(), b"hello world");

        let err = fs.copy("a/absent.txt", "a/", &config()).unwrap_err();
        assert!(matches!(err, FsError::CopyFailed { .. }));
    }

    #[test]
    fn copy_and_move_failures() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();

        let err = fs
            .copy("resources/tmp", "resources/tmp2/", &config())
            .unwrap_err();
        assert!(matches!(err, FsError::CopyFailed { .. }));
        assert_eq!(err.location(), "resources/tmp");

        let err = fs.copy("missing.txt", "resources/", &config()).unwrap_err();
        assert!(matches!(err, FsError::CopyFailed { .. }));

        let err = fs
            .move_file("resources/tmp", "elsewhere", &config())
            .unwrap_err();
        assert!(matches!(err, FsError::MoveFailed { .. }));

        let err = fs
            .move_file("missing.txt", "resources/", &config())
            .unwrap_err();
        assert!(matches!(err, FsError::MoveFailed { .. }));
    }

    #[test]
    fn delete_rules() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"x", &config()).unwrap();

        assert!(matches!(
            fs.delete("resources/tmp"),
            Err(FsError::DeleteFailed { .. })
        ));
        assert!(matches!(
            fs.delete("resources/tmp.txt"),
            Err(FsError::DeleteFailed { .. })
        ));
        fs.delete("resources/tmp/tmp.txt").unwrap();
        assert!(!fs.file_exists("resources/tmp/tmp.txt").unwrap());
    }

    #[test]
    fn delete_directory_rules() {
        let (fs, _dir) = adapter();
        fs.create_directory("resources/tmp/nested", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"x", &config()).unwrap();

        assert!(matches!(
            fs.delete_directory("resources/tmp/tmp.txt"),
            Err(FsError::DeleteDirectoryFailed { .. })
        ));
        assert!(matches!(
            fs.delete_directory("resources/missing"),
            Err(FsError::DeleteDirectoryFailed { .. })
        ));
        assert!(fs.delete_directory("resources/tmp").unwrap());
        assert!(!fs.directory_exists("resources/tmp").unwrap());
        assert!(fs.directory_exists("resources").unwrap());
    }

    #[test]
    fn delete_directory_on_root_keeps_root() {
        let (fs, dir) = adapter();
        fs.create_directory("resources/tmp", &config()).unwrap();
        fs.write("resources/tmp/tmp.txt", b"x", &config()).unwrap();
        fs.write("top.txt", b"x", &config()).unwrap();

        assert!(fs.delete_directory("").unwrap());
        assert!(dir.path().is_dir());
        assert!(fs.directory_exists("").unwrap());
        assert!(fs.list_contents("").unwrap().is_empty());

        fs.write("b.txt", b"after", &config()).unwrap();
        assert_eq!(fs.read("b.txt").unwrap(), b"after");
    }

    #[test]
    fn leading_slash_stays_under_root() {
        let (fs, dir) = adapter();
        fs.write("/rooted.txt", b"x", &config()).unwrap();
        assert!(dir.path().join("rooted.txt").is_file());
        assert!(fs.file_exists("rooted.txt").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn visibility_roundtrip() {
        let (fs, _dir) = adapter();
        fs.write("secret.txt", b"x", &config()).unwrap();
        fs.set_visibility("secret.txt", Visibility::Private).unwrap();
        assert_eq!(fs.visibility("secret.txt").unwrap(), Visibility::Private);
        fs.set_visibility("secret.txt", Visibility::Public).unwrap();
        assert_eq!(fs.visibility("secret.txt").unwrap(), Visibility::Public);

        fs.create_directory(
            "private_dir",
            &Config::new().with_directory_visibility(Visibility::Private),
        )
        .unwrap();
        assert_eq!(fs.visibility("private_dir").unwrap(), Visibility::Private);

        fs.write(
            "written_private.txt",
            b"x",
            &Config::new().with_visibility(Visibility::Private),
        )
        .unwrap();
        assert_eq!(
            fs.visibility("written_private.txt").unwrap(),
            Visibility::Private
        );
    }

    #[test]
    fn set_visibility_on_missing_path_fails() {
        let (fs, _dir) = adapter();
        let err = fs.set_visibility("ghost", Visibility::Public).unwrap_err();
        if cfg!(unix) {
            assert!(matches!(err, FsError::SetVisibilityFailed { .. }));
        } else {
            assert!(err.is_not_supported());
        }
    }
}
