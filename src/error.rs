//! Error types for the flyfs filesystem abstraction.

use std::fmt;

/// The operation an [`FsError`] was raised from.
///
/// A closed set: every error kind maps to exactly one operation family, so
/// callers can branch on it without inspecting message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Operation {
    /// Writing file contents.
    Write,
    /// Reading file contents.
    Read,
    /// Probing whether a file exists.
    FileExists,
    /// Probing whether a directory exists.
    DirectoryExists,
    /// Creating a directory.
    CreateDirectory,
    /// Deleting a file.
    Delete,
    /// Recursively deleting a directory.
    DeleteDirectory,
    /// Moving a file.
    Move,
    /// Copying a file.
    Copy,
    /// Reading size, MIME type, modification time or visibility.
    RetrieveMetadata,
    /// Changing visibility.
    SetVisibility,
    /// Listing directory contents.
    ListContents,
    /// Generic existence probe (file or directory).
    ExistenceCheck,
    /// Generating a pre-signed URL.
    TemporaryUrl,
}

impl Operation {
    /// Upper-snake tag for this operation, e.g. `"DELETE_DIRECTORY"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Write => "WRITE",
            Operation::Read => "READ",
            Operation::FileExists => "FILE_EXISTS",
            Operation::DirectoryExists => "DIRECTORY_EXISTS",
            Operation::CreateDirectory => "CREATE_DIRECTORY",
            Operation::Delete => "DELETE",
            Operation::DeleteDirectory => "DELETE_DIRECTORY",
            Operation::Move => "MOVE",
            Operation::Copy => "COPY",
            Operation::RetrieveMetadata => "RETRIEVE_METADATA",
            Operation::SetVisibility => "SET_VISIBILITY",
            Operation::ListContents => "LIST_CONTENTS",
            Operation::ExistenceCheck => "EXISTENCE_CHECK",
            Operation::TemporaryUrl => "TEMPORARY_URL",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem error raised by every adapter operation.
///
/// Each variant carries the location involved and the backend's reason.
/// Use [`operation`](FsError::operation), [`location`](FsError::location)
/// and [`reason`](FsError::reason) for programmatic handling; the message is
/// meant for logs.
///
/// # Examples
///
/// ```rust
/// use flyfs::{FsError, Operation};
///
/// let err = FsError::read("docs/missing.txt", "No such file or directory");
/// assert_eq!(err.operation(), Operation::Read);
/// assert_eq!(err.location(), "docs/missing.txt");
/// assert_eq!(
///     err.to_string(),
///     "Unable to read file from location: docs/missing.txt. No such file or directory"
/// );
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The backend could not answer an existence probe.
    #[error("{}", describe(existence_subject(.operation), .location, .reason))]
    ExistenceCheckFailed {
        /// [`Operation::FileExists`] or [`Operation::DirectoryExists`].
        operation: Operation,
        /// The probed path.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target is a directory, its parent is missing, or access was denied.
    #[error("{}", describe("write file", .location, .reason))]
    WriteFailed {
        /// The path being written.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target is a directory, missing, or unreadable.
    #[error("{}", describe("read file", .location, .reason))]
    ReadFailed {
        /// The path being read.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target is a directory, missing, or the backend rejected the delete.
    #[error("{}", describe("delete file", .location, .reason))]
    DeleteFailed {
        /// The path being deleted.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target is a file, missing, or the backend rejected the delete.
    #[error("{}", describe("delete directory", .location, .reason))]
    DeleteDirectoryFailed {
        /// The directory being deleted.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Permission or path conflict while creating a directory.
    #[error("{}", describe("create directory", .location, .reason))]
    CreateDirectoryFailed {
        /// The directory being created.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Source is a directory, missing, or the backend rejected the copy.
    #[error("{}", describe_transfer("copy", .location, .destination, .reason))]
    CopyFailed {
        /// The source path.
        location: String,
        /// The resolved destination path.
        destination: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Source is a directory, the backend rejected the move, or the source
    /// could not be removed after a successful copy.
    #[error("{}", describe_transfer("move", .location, .destination, .reason))]
    MoveFailed {
        /// The source path.
        location: String,
        /// The resolved destination path.
        destination: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target missing, or a directory where file metadata was requested.
    #[error("{}", describe("retrieve metadata", .location, .reason))]
    RetrieveMetadataFailed {
        /// The path being inspected.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// The backend rejected a visibility change.
    #[error("{}", describe("set visibility", .location, .reason))]
    SetVisibilityFailed {
        /// The path being changed.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// The backend could not enumerate a directory.
    #[error("{}", describe("list contents", .location, .reason))]
    ListContentsFailed {
        /// The directory being listed.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// Target is a directory, missing, or the URL could not be signed.
    #[error("{}", describe("generate pre-signed url", .location, .reason))]
    TemporaryUrlFailed {
        /// The path the URL was requested for.
        location: String,
        /// Backend failure detail.
        reason: String,
    },

    /// A visibility string other than `public` or `private`.
    #[error(
        "Invalid visibility provided. Expected either 'public' or 'private', received '{visibility}'"
    )]
    InvalidVisibilityProvided {
        /// The rejected value.
        visibility: String,
    },

    /// The adapter has no native support for this operation.
    #[error("Operation {operation} is not supported for location: {location}")]
    NotSupported {
        /// The unsupported operation.
        operation: Operation,
        /// The path the operation was attempted on.
        location: String,
    },
}

fn existence_subject(operation: &Operation) -> &'static str {
    match operation {
        Operation::DirectoryExists => "check existence directory",
        _ => "check existence file",
    }
}

fn describe(subject: &str, location: &str, reason: &str) -> String {
    format!("Unable to {subject} from location: {location}. {reason}")
        .trim_end()
        .to_owned()
}

fn describe_transfer(verb: &str, location: &str, destination: &str, reason: &str) -> String {
    format!("Unable to {verb} file from location: {location} to {destination}. {reason}")
        .trim_end()
        .to_owned()
}

impl FsError {
    /// File existence probe failed.
    pub fn file_existence(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::ExistenceCheckFailed {
            operation: Operation::FileExists,
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Directory existence probe failed.
    pub fn directory_existence(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::ExistenceCheckFailed {
            operation: Operation::DirectoryExists,
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Write failed.
    pub fn write(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::WriteFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Read failed.
    pub fn read(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::ReadFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// File delete failed.
    pub fn delete(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::DeleteFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Directory delete failed.
    pub fn delete_directory(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::DeleteDirectoryFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Directory creation failed.
    pub fn create_directory(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::CreateDirectoryFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Copy failed.
    pub fn copy(
        location: impl Into<String>,
        destination: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        FsError::CopyFailed {
            location: location.into(),
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }

    /// Move failed.
    pub fn move_file(
        location: impl Into<String>,
        destination: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        FsError::MoveFailed {
            location: location.into(),
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }

    /// Metadata lookup failed.
    pub fn retrieve_metadata(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::RetrieveMetadataFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Visibility change failed.
    pub fn set_visibility(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::SetVisibilityFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Listing failed.
    pub fn list_contents(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::ListContentsFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Pre-signed URL generation failed.
    pub fn temporary_url(location: impl Into<String>, reason: impl ToString) -> Self {
        FsError::TemporaryUrlFailed {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Operation not supported by this adapter.
    pub fn not_supported(operation: Operation, location: impl Into<String>) -> Self {
        FsError::NotSupported {
            operation,
            location: location.into(),
        }
    }

    /// The operation this error was raised from.
    pub fn operation(&self) -> Operation {
        match self {
            FsError::ExistenceCheckFailed { operation, .. } => *operation,
            FsError::WriteFailed { .. } => Operation::Write,
            FsError::ReadFailed { .. } => Operation::Read,
            FsError::DeleteFailed { .. } => Operation::Delete,
            FsError::DeleteDirectoryFailed { .. } => Operation::DeleteDirectory,
            FsError::CreateDirectoryFailed { .. } => Operation::CreateDirectory,
            FsError::CopyFailed { .. } => Operation::Copy,
            FsError::MoveFailed { .. } => Operation::Move,
            FsError::RetrieveMetadataFailed { .. } => Operation::RetrieveMetadata,
            FsError::SetVisibilityFailed { .. } => Operation::SetVisibility,
            FsError::ListContentsFailed { .. } => Operation::ListContents,
            FsError::TemporaryUrlFailed { .. } => Operation::TemporaryUrl,
            FsError::InvalidVisibilityProvided { .. } => Operation::SetVisibility,
            FsError::NotSupported { operation, .. } => *operation,
        }
    }

    /// The path involved (the source path for copy and move).
    ///
    /// Empty for [`FsError::InvalidVisibilityProvided`].
    pub fn location(&self) -> &str {
        match self {
            FsError::ExistenceCheckFailed { location, .. }
            | FsError::WriteFailed { location, .. }
            | FsError::ReadFailed { location, .. }
            | FsError::DeleteFailed { location, .. }
            | FsError::DeleteDirectoryFailed { location, .. }
            | FsError::CreateDirectoryFailed { location, .. }
            | FsError::CopyFailed { location, .. }
            | FsError::MoveFailed { location, .. }
            | FsError::RetrieveMetadataFailed { location, .. }
            | FsError::SetVisibilityFailed { location, .. }
            | FsError::ListContentsFailed { location, .. }
            | FsError::TemporaryUrlFailed { location, .. }
            | FsError::NotSupported { location, .. } => location,
            FsError::InvalidVisibilityProvided { .. } => "",
        }
    }

    /// Backend failure detail, possibly empty.
    pub fn reason(&self) -> &str {
        match self {
            FsError::ExistenceCheckFailed { reason, .. }
            | FsError::WriteFailed { reason, .. }
            | FsError::ReadFailed { reason, .. }
            | FsError::DeleteFailed { reason, .. }
            | FsError::DeleteDirectoryFailed { reason, .. }
            | FsError::CreateDirectoryFailed { reason, .. }
            | FsError::CopyFailed { reason, .. }
            | FsError::MoveFailed { reason, .. }
            | FsError::RetrieveMetadataFailed { reason, .. }
            | FsError::SetVisibilityFailed { reason, .. }
            | FsError::ListContentsFailed { reason, .. }
            | FsError::TemporaryUrlFailed { reason, .. } => reason,
            FsError::InvalidVisibilityProvided { visibility } => visibility,
            FsError::NotSupported { .. } => "",
        }
    }

    /// Returns `true` for [`FsError::NotSupported`].
    pub fn is_not_supported(&self) -> bool {
        matches!(self, FsError::NotSupported { .. })
    }
}
