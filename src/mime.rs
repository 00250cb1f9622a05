//! MIME type lookup used by `mime_type` and S3 uploads.

/// Detects the MIME type of a path.
pub trait MimeTypeDetector: Send + Sync {
    /// MIME type for `path`, or `None` when unknown.
    fn detect(&self, path: &str) -> Option<String>;
}

/// Looks the MIME type up from the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionMimeTypeDetector;

const TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("xml", "application/xml"),
    ("json", "application/json"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    ("toml", "application/toml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("wasm", "application/wasm"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("stl", "model/stl"),
];

impl MimeTypeDetector for ExtensionMimeTypeDetector {
    fn detect(&self, path: &str) -> Option<String> {
        let name = crate::path::basename(path);
        let (stem, extension) = name.rsplit_once('.')?;
        // dotfile without an extension, e.g. `.keep`
        if stem.is_empty() {
            return None;
        }
        let extension = extension.to_ascii_lowercase();
        TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| (*mime).to_owned())
    }
}
