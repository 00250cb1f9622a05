//! In-memory adapter.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::{self, Cursor, Read};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::adapters::epoch_millis;
use crate::path::{basename, parent, resolve_destination};
use crate::{
    Config, ExtensionMimeTypeDetector, FilesystemReader, FilesystemWriter, FsError,
    MimeTypeDetector, OpenMode, ReadStream, Visibility,
};

#[derive(Debug, Clone)]
enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

#[derive(Debug, Clone)]
struct FileNode {
    contents: Vec<u8>,
    visibility: Visibility,
    last_modified: u64,
}

#[derive(Debug, Clone)]
struct DirectoryNode {
    children: BTreeMap<String, Node>,
    visibility: Visibility,
    last_modified: u64,
}

impl DirectoryNode {
    fn new(visibility: Visibility, last_modified: u64) -> Self {
        Self {
            children: BTreeMap::new(),
            visibility,
            last_modified,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn lookup<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    segments(path).try_fold(root, |node, name| match node {
        Node::Directory(dir) => dir.children.get(name),
        Node::File(_) => None,
    })
}

fn lookup_mut<'a>(root: &'a mut Node, path: &str) -> Option<&'a mut Node> {
    segments(path).try_fold(root, |node, name| match node {
        Node::Directory(dir) => dir.children.get_mut(name),
        Node::File(_) => None,
    })
}

/// Split `path` into its parent directory and final name.
fn parent_mut<'a, 'p>(
    root: &'a mut Node,
    path: &'p str,
) -> Result<(&'a mut DirectoryNode, &'p str), &'static str> {
    let trimmed = path.trim_end_matches('/');
    let name = basename(trimmed);
    if name.is_empty() {
        return Err("path is the root directory");
    }
    match lookup_mut(root, parent(trimmed).unwrap_or("")) {
        Some(Node::Directory(dir)) => Ok((dir, name)),
        Some(Node::File(_)) => Err("parent path is a file"),
        None => Err("parent directory does not exist"),
    }
}

fn collect_entries(dir: &DirectoryNode, prefix: &str, out: &mut Vec<String>) {
    for (name, node) in &dir.children {
        let child = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };
        out.push(child.clone());
        if let Node::Directory(sub) = node {
            collect_entries(sub, &child, out);
        }
    }
}

fn now() -> u64 {
    epoch_millis(SystemTime::now())
}

/// Adapter over a process-lifetime virtual tree.
///
/// State lives behind an `RwLock`, so one instance can be shared across
/// threads. Writes require the parent directory to exist, the same rule a
/// real filesystem applies.
///
/// # Example
///
/// ```rust
/// use flyfs::prelude::*;
/// use flyfs::InMemoryAdapter;
///
/// let memory = InMemoryAdapter::new();
/// memory.create_directory("cache", &Default::default()).unwrap();
/// memory.write("cache/entry", b"42", &Default::default()).unwrap();
/// assert_eq!(memory.list_contents("").unwrap(), vec!["cache", "cache/entry"]);
/// ```
pub struct InMemoryAdapter {
    root: RwLock<Node>,
    default_visibility: Visibility,
    mime: Box<dyn MimeTypeDetector>,
}

impl InMemoryAdapter {
    /// Empty tree; new entries are public.
    pub fn new() -> Self {
        Self::with_default_visibility(Visibility::Public)
    }

    /// Empty tree with the given visibility for new entries.
    pub fn with_default_visibility(visibility: Visibility) -> Self {
        Self {
            root: RwLock::new(Node::Directory(DirectoryNode::new(visibility, now()))),
            default_visibility: visibility,
            mime: Box::new(ExtensionMimeTypeDetector),
        }
    }

    /// Replace the MIME type detector.
    pub fn with_mime_detector(mut self, detector: impl MimeTypeDetector + 'static) -> Self {
        self.mime = Box::new(detector);
        self
    }

    fn tree(&self) -> RwLockReadGuard<'_, Node> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, Node> {
        self.root.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, path: &str, contents: Vec<u8>, config: &Config) -> Result<(), FsError> {
        let mut root = self.tree_mut();
        let (dir, name) = parent_mut(&mut root, path).map_err(|r| FsError::write(path, r))?;
        let timestamp = now();
        match dir.children.entry(name.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(Node::File(FileNode {
                    contents,
                    visibility: config.visibility.unwrap_or(self.default_visibility),
                    last_modified: timestamp,
                }));
            }
            Entry::Occupied(mut slot) => {
                let Node::File(file) = slot.get_mut() else {
                    return Err(FsError::write(path, "target is a directory"));
                };
                match config.open_mode() {
                    OpenMode::CreateNew => {
                        return Err(FsError::write(path, "file already exists"));
                    }
                    OpenMode::Append => file.contents.extend_from_slice(&contents),
                    OpenMode::Truncate => file.contents = contents,
                }
                file.last_modified = timestamp;
                if let Some(visibility) = config.visibility {
                    file.visibility = visibility;
                }
            }
        }
        Ok(())
    }

    fn source_file(&self, root: &Node, source: &str) -> Result<FileNode, &'static str> {
        match lookup(root, source) {
            Some(Node::File(file)) => Ok(file.clone()),
            Some(Node::Directory(_)) => Err("source is a directory"),
            None => Err("source file does not exist"),
        }
    }

    fn place(
        root: &mut Node,
        destination: &str,
        mut file: FileNode,
        config: &Config,
    ) -> Result<(), &'static str> {
        let (dir, name) = parent_mut(root, destination)?;
        if let Some(Node::Directory(_)) = dir.children.get(name) {
            return Err("destination is a directory");
        }
        file.last_modified = now();
        if let Some(visibility) = config.visibility {
            file.visibility = visibility;
        }
        dir.children.insert(name.to_owned(), Node::File(file));
        Ok(())
    }
}

impl Default for InMemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAdapter")
            .field("default_visibility", &self.default_visibility)
            .finish_non_exhaustive()
    }
}

impl FilesystemReader for InMemoryAdapter {
    fn file_exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(matches!(lookup(&self.tree(), path), Some(Node::File(_))))
    }

    fn directory_exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(matches!(lookup(&self.tree(), path), Some(Node::Directory(_))))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FsError> {
        match lookup(&self.tree(), path) {
            Some(Node::File(file)) => Ok(file.contents.clone()),
            Some(Node::Directory(_)) => Err(FsError::read(path, "target is a directory")),
            None => Err(FsError::read(path, "file does not exist")),
        }
    }

    fn read_stream(&self, path: &str) -> Result<ReadStream, FsError> {
        let contents = self.read(path)?;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn file_size(&self, path: &str) -> Result<u64, FsError> {
        match lookup(&self.tree(), path) {
            Some(Node::File(file)) => Ok(file.contents.len() as u64),
            Some(Node::Directory(_)) => {
                Err(FsError::retrieve_metadata(path, "target is a directory"))
            }
            None => Err(FsError::retrieve_metadata(path, "file does not exist")),
        }
    }

    fn mime_type(&self, path: &str) -> Result<Option<String>, FsError> {
        match lookup(&self.tree(), path) {
            Some(Node::File(_)) => Ok(self.mime.detect(path)),
            Some(Node::Directory(_)) => {
                Err(FsError::retrieve_metadata(path, "target is a directory"))
            }
            None => Err(FsError::retrieve_metadata(path, "file does not exist")),
        }
    }

    fn last_modified(&self, path: &str) -> Result<u64, FsError> {
        match lookup(&self.tree(), path) {
            Some(Node::File(file)) => Ok(file.last_modified),
            Some(Node::Directory(dir)) => Ok(dir.last_modified),
            None => Err(FsError::retrieve_metadata(path, "path does not exist")),
        }
    }

    fn visibility(&self, path: &str) -> Result<Visibility, FsError> {
        match lookup(&self.tree(), path) {
            Some(Node::File(file)) => Ok(file.visibility),
            Some(Node::Directory(dir)) => Ok(dir.visibility),
            None => Err(FsError::retrieve_metadata(path, "path does not exist")),
        }
    }

    fn list_contents(&self, path: &str) -> Result<Vec<String>, FsError> {
        let mut entries = Vec::new();
        if let Some(Node::Directory(dir)) = lookup(&self.tree(), path) {
            collect_entries(dir, path, &mut entries);
        }
        Ok(entries)
    }
}

impl FilesystemWriter for InMemoryAdapter {
    fn write(&self, path: &str, contents: &[u8], config: &Config) -> Result<(), FsError> {
        let encoded = config
            .encode(contents)
            .map_err(|reason| FsError::write(path, reason))?;
        self.store(path, encoded.into_owned(), config)?;
        tracing::debug!(path, bytes = contents.len(), "wrote file");
        Ok(())
    }

    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &Config,
    ) -> Result<(), FsError> {
        let mut contents = Vec::new();
        match config.chunk_size {
            Some(chunk_size) => {
                let mut buffer = vec![0; chunk_size.max(1)];
                loop {
                    match source.read(&mut buffer) {
                        Ok(0) => break,
                        Ok(read) => contents.extend_from_slice(&buffer[..read]),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(FsError::write(path, e)),
                    }
                }
            }
            None => {
                source
                    .read_to_end(&mut contents)
                    .map_err(|e| FsError::write(path, e))?;
            }
        }
        let written = contents.len();
        self.store(path, contents, config)?;
        tracing::debug!(path, bytes = written, "streamed file");
        Ok(())
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<(), FsError> {
        let mut root = self.tree_mut();
        match lookup_mut(&mut root, path) {
            Some(Node::File(file)) => file.visibility = visibility,
            Some(Node::Directory(dir)) => dir.visibility = visibility,
            None => return Err(FsError::set_visibility(path, "path does not exist")),
        }
        tracing::debug!(path, %visibility, "set visibility");
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), FsError> {
        let mut root = self.tree_mut();
        let (dir, name) = parent_mut(&mut root, path)
            .map_err(|_| FsError::delete(path, "Could not delete directory"))?;
        match dir.children.get(name).map(|node| matches!(node, Node::File(_))) {
            Some(true) => {
                dir.children.remove(name);
            }
            Some(false) => return Err(FsError::delete(path, "Could not delete directory")),
            None => return Err(FsError::delete(path, "file does not exist")),
        }
        tracing::debug!(path, "deleted file");
        Ok(())
    }

    fn delete_directory(&self, path: &str) -> Result<bool, FsError> {
        let mut root = self.tree_mut();
        if segments(path).next().is_none() {
            if let Node::Directory(dir) = &mut *root {
                dir.children.clear();
            }
            tracing::debug!(path, "cleared root directory");
            return Ok(true);
        }

        let (dir, name) =
            parent_mut(&mut root, path).map_err(|r| FsError::delete_directory(path, r))?;
        match dir.children.get(name).map(|node| matches!(node, Node::Directory(_))) {
            Some(true) => {
                dir.children.remove(name);
            }
            Some(false) => {
                return Err(FsError::delete_directory(path, "target is not a directory"));
            }
            None => return Err(FsError::delete_directory(path, "directory does not exist")),
        }
        tracing::debug!(path, "deleted directory");
        Ok(true)
    }

    fn create_directory(&self, path: &str, config: &Config) -> Result<bool, FsError> {
        let visibility = config.directory_visibility.unwrap_or(self.default_visibility);
        let timestamp = now();
        let mut root = self.tree_mut();
        let mut current: &mut Node = &mut root;
        for name in segments(path) {
            let Node::Directory(dir) = current else {
                return Err(FsError::create_directory(path, "parent path is a file"));
            };
            current = dir
                .children
                .entry(name.to_owned())
                .or_insert_with(|| Node::Directory(DirectoryNode::new(visibility, timestamp)));
        }
        match current {
            Node::Directory(dir) => {
                if let Some(visibility) = config.directory_visibility {
                    dir.visibility = visibility;
                }
            }
            Node::File(_) => {
                return Err(FsError::create_directory(path, "a file exists at this path"));
            }
        }
        tracing::debug!(path, "created directory");
        Ok(true)
    }

    fn copy(&self, source: &str, destination: &str, config: &Config) -> Result<(), FsError> {
        let destination = resolve_destination(source, destination);
        let mut root = self.tree_mut();
        let file = self
            .source_file(&root, source)
            .map_err(|r| FsError::copy(source, &destination, r))?;
        Self::place(&mut root, &destination, file, config)
            .map_err(|r| FsError::copy(source, &destination, r))?;
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
        let mut root = self.tree_mut();
        let file = self
            .source_file(&root, source)
            .map_err(|r| FsError::move_file(source, &destination, r))?;

        // Validate the destination before detaching the source.
        match parent_mut(&mut root, &destination) {
            Ok((dir, name)) => {
                if let Some(Node::Directory(_)) = dir.children.get(name) {
                    return Err(FsError::move_file(
                        source,
                        &destination,
                        "destination is a directory",
                    ));
                }
            }
            Err(reason) => return Err(FsError::move_file(source, &destination, reason)),
        }

        if let Ok((dir, name)) = parent_mut(&mut root, source) {
            dir.children.remove(name);
        }
        Self::place(&mut root, &destination, file, config)
            .map_err(|r| FsError::move_file(source, &destination, r))?;
        tracing::debug!(source, destination = destination.as_str(), "moved file");
        Ok(())
    }
}
