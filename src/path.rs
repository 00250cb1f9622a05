//! # Path Normalization
//!
//! Strategy trait for canonicalizing caller-supplied paths before they reach
//! an adapter.
//!
//! ## Canonical Form
//!
//! - `\` separators become `/`
//! - runs of `/` collapse to one
//! - `.` segments are dropped, `..` pops the preceding segment
//! - a `..` with nothing to pop is discarded (paths cannot climb above the root)
//! - no trailing `/`; the root itself is the empty string
//! - a leading `/` is kept as exactly one `/`
//!
//! Resolution is purely lexical: nothing touches a backend. Names that merely
//! contain dots (`dirname.`, `10-75..stl`) are ordinary segments.
//!
//! ```rust
//! use flyfs::normalize;
//!
//! assert_eq!(normalize("\\dirname\\\\subdir"), "/dirname/subdir");
//! assert_eq!(normalize("dirname/../"), "");
//! assert_eq!(normalize("C:\\dirname\\subdir"), "C:/dirname/subdir");
//! ```

/// Strategy trait for path normalization.
///
/// The [`Filesystem`](crate::Filesystem) façade owns one normalizer and runs
/// every path argument through it exactly once per call.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the façade may be shared across
/// threads.
///
/// # Contract
///
/// `normalize` is total and must be idempotent:
/// `normalize(normalize(p)) == normalize(p)`.
pub trait PathNormalizer: Send + Sync {
    /// Canonicalize `path`.
    fn normalize(&self, path: &str) -> String;
}

/// Default lexical normalizer. See the [module docs](self) for the rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalNormalizer;

impl PathNormalizer for LexicalNormalizer {
    fn normalize(&self, path: &str) -> String {
        normalize(path)
    }
}

/// Canonicalize `path` with the [`LexicalNormalizer`] rules.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let absolute = path.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    let joined = segments.join("/");
    if absolute && !joined.is_empty() {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Final segment of a normalized path (empty for the root).
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parent of a normalized path, or `None` for a top-level entry.
pub(crate) fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx])
}

/// Apply the "trailing separator means directory" convention for copy and
/// move destinations: `dir/` becomes `dir/<basename of source>`.
pub(crate) fn resolve_destination(source: &str, destination: &str) -> String {
    if destination.ends_with('/') || destination.ends_with('\\') {
        format!("{destination}{}", basename(source.trim_end_matches('/')))
    } else {
        destination.to_owned()
    }
}
