//! Visibility model and its mapping to Unix permission bits.

use std::fmt;
use std::str::FromStr;

use crate::FsError;

/// Access level of a file or directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Visibility {
    /// Readable by everyone.
    Public,
    /// Readable by the owner only.
    Private,
}

impl Visibility {
    /// Parse a visibility string, rejecting anything but `public`/`private`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidVisibilityProvided`] for any other value
    ///
    /// ```rust
    /// use flyfs::{FsError, Visibility};
    ///
    /// assert_eq!(Visibility::validate("private").unwrap(), Visibility::Private);
    /// assert!(matches!(
    ///     Visibility::validate("invalid-visibility"),
    ///     Err(FsError::InvalidVisibilityProvided { .. })
    /// ));
    /// ```
    pub fn validate(visibility: &str) -> Result<Self, FsError> {
        match visibility {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(FsError::InvalidVisibilityProvided {
                visibility: other.to_owned(),
            }),
        }
    }

    /// The canonical string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl FromStr for Visibility {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visibility::validate(s)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts between [`Visibility`] and Unix permission bits.
///
/// Used by adapters backed by a Unix-like filesystem.
pub trait UnixVisibilityConverter: Send + Sync {
    /// Mode for directories created without an explicit visibility.
    fn default_for_directory(&self) -> u32;

    /// Mode for a file with the given visibility.
    fn for_file(&self, visibility: Visibility) -> u32;

    /// Mode for a directory with the given visibility.
    fn for_directory(&self, visibility: Visibility) -> u32;

    /// Visibility of a file with the given mode.
    fn inverse_for_file(&self, mode: u32) -> Visibility;

    /// Visibility of a directory with the given mode.
    fn inverse_for_directory(&self, mode: u32) -> Visibility;
}

/// Table-driven converter with portable defaults.
///
/// | | public | private |
/// |---|---|---|
/// | file | `0o644` | `0o600` |
/// | directory | `0o755` | `0o700` |
///
/// Modes matching neither entry are reported as public.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortableUnixVisibilityConverter {
    file_public: u32,
    file_private: u32,
    directory_public: u32,
    directory_private: u32,
    default_directory: Visibility,
}

impl PortableUnixVisibilityConverter {
    /// Converter with the default table.
    pub const fn new() -> Self {
        Self {
            file_public: 0o644,
            file_private: 0o600,
            directory_public: 0o755,
            directory_private: 0o700,
            default_directory: Visibility::Private,
        }
    }

    /// Override the file modes.
    pub const fn with_file_modes(mut self, public: u32, private: u32) -> Self {
        self.file_public = public;
        self.file_private = private;
        self
    }

    /// Override the directory modes.
    pub const fn with_directory_modes(mut self, public: u32, private: u32) -> Self {
        self.directory_public = public;
        self.directory_private = private;
        self
    }

    /// Override the visibility used by [`default_for_directory`](UnixVisibilityConverter::default_for_directory).
    pub const fn with_default_directory(mut self, visibility: Visibility) -> Self {
        self.default_directory = visibility;
        self
    }
}

impl Default for PortableUnixVisibilityConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl UnixVisibilityConverter for PortableUnixVisibilityConverter {
    fn default_for_directory(&self) -> u32 {
        self.for_directory(self.default_directory)
    }

    fn for_file(&self, visibility: Visibility) -> u32 {
        match visibility {
            Visibility::Public => self.file_public,
            Visibility::Private => self.file_private,
        }
    }

    fn for_directory(&self, visibility: Visibility) -> u32 {
        match visibility {
            Visibility::Public => self.directory_public,
            Visibility::Private => self.directory_private,
        }
    }

    fn inverse_for_file(&self, mode: u32) -> Visibility {
        if mode == self.file_private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    fn inverse_for_directory(&self, mode: u32) -> Visibility {
        if mode == self.directory_private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }
}
