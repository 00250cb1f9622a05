//! Per-call operation options and the merge rule shared by every adapter.
//!
//! The [`Filesystem`](crate::Filesystem) façade holds a base [`Config`] and
//! merges each call's options over it before delegating:
//!
//! ```rust
//! use flyfs::{Config, OpenMode};
//!
//! let base = Config::new().with_chunk_size(4096);
//! let call = Config::new().with_mode(OpenMode::Append);
//!
//! let effective = base.merge(&call);
//! assert_eq!(effective.chunk_size, Some(4096));
//! assert_eq!(effective.mode, Some(OpenMode::Append));
//! ```

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::Visibility;

/// How `write` opens its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenMode {
    /// Create or truncate (`w`).
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "w"))]
    Truncate,
    /// Create or append (`a`).
    #[cfg_attr(feature = "serde", serde(rename = "a"))]
    Append,
    /// Create, failing if the target exists (`x`).
    #[cfg_attr(feature = "serde", serde(rename = "x"))]
    CreateNew,
}

/// Text encoding enforced on `write` contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Encoding {
    /// UTF-8.
    #[cfg_attr(feature = "serde", serde(rename = "utf-8", alias = "utf8"))]
    Utf8,
    /// 7-bit ASCII.
    #[cfg_attr(feature = "serde", serde(rename = "ascii"))]
    Ascii,
}

/// What to do with contents that are invalid in the requested [`Encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecodePolicy {
    /// Reject the write.
    #[default]
    Strict,
    /// Substitute a replacement character.
    Replace,
    /// Drop invalid sequences.
    Ignore,
}

/// A string option value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value '{value}' for option '{key}'")]
pub struct InvalidOption {
    /// The option key.
    pub key: String,
    /// The rejected value.
    pub value: String,
}

impl FromStr for OpenMode {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(OpenMode::Truncate),
            "a" => Ok(OpenMode::Append),
            "x" => Ok(OpenMode::CreateNew),
            other => Err(invalid("mode", other)),
        }
    }
}

impl FromStr for Encoding {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(invalid("encoding", s)),
        }
    }
}

impl FromStr for DecodePolicy {
    type Err = InvalidOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(DecodePolicy::Strict),
            "replace" => Ok(DecodePolicy::Replace),
            "ignore" => Ok(DecodePolicy::Ignore),
            other => Err(invalid("errors", other)),
        }
    }
}

fn invalid(key: &str, value: &str) -> InvalidOption {
    InvalidOption {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

/// Options for write-family operations.
///
/// Every field is optional; unset fields fall back to the base configuration
/// and then to the adapter's default. Keys an adapter does not recognise are
/// kept in [`extra`](Config::extra) and never cause an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Encoding the written contents must satisfy.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub encoding: Option<Encoding>,
    /// Open mode for `write` and `write_stream`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub mode: Option<OpenMode>,
    /// Policy for contents invalid in [`encoding`](Config::encoding).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub errors: Option<DecodePolicy>,
    /// Block size for streaming writes.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub chunk_size: Option<usize>,
    /// Visibility applied to written or copied files.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub visibility: Option<Visibility>,
    /// Visibility applied to created directories.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub directory_visibility: Option<Visibility>,
    /// Options not recognised by this crate, passed through untouched.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub extra: BTreeMap<String, String>,
}

impl Config {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Set the open mode.
    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the decode-error policy.
    pub fn with_errors(mut self, errors: DecodePolicy) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Set the streaming block size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Set the visibility for written files.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Set the visibility for created directories.
    pub fn with_directory_visibility(mut self, visibility: Visibility) -> Self {
        self.directory_visibility = Some(visibility);
        self
    }

    /// Set an option by its string key.
    ///
    /// Recognised keys (`encoding`, `mode`, `errors`, `chunk_size`,
    /// `visibility`, `directory_visibility`) are parsed into their typed
    /// field; anything else lands in [`extra`](Config::extra).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOption`] when a recognised key has an unparseable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), InvalidOption> {
        match key {
            "encoding" => self.encoding = Some(value.parse()?),
            "mode" => self.mode = Some(value.parse()?),
            "errors" => self.errors = Some(value.parse()?),
            "chunk_size" => {
                let size = value
                    .parse::<usize>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| invalid(key, value))?;
                self.chunk_size = Some(size);
            }
            "visibility" => {
                self.visibility = Some(Visibility::validate(value).map_err(|_| invalid(key, value))?)
            }
            "directory_visibility" => {
                self.directory_visibility =
                    Some(Visibility::validate(value).map_err(|_| invalid(key, value))?)
            }
            _ => {
                self.extra.insert(key.to_owned(), value.to_owned());
            }
        }
        Ok(())
    }

    /// Shallow merge: fields set in `overrides` win, unset fields keep
    /// `self`'s value. `extra` entries are unioned with `overrides` winning.
    pub fn merge(&self, overrides: &Config) -> Config {
        let mut extra = self.extra.clone();
        extra.extend(
            overrides
                .extra
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Config {
            encoding: overrides.encoding.or(self.encoding),
            mode: overrides.mode.or(self.mode),
            errors: overrides.errors.or(self.errors),
            chunk_size: overrides.chunk_size.or(self.chunk_size),
            visibility: overrides.visibility.or(self.visibility),
            directory_visibility: overrides.directory_visibility.or(self.directory_visibility),
            extra,
        }
    }

    /// Effective open mode.
    pub fn open_mode(&self) -> OpenMode {
        self.mode.unwrap_or_default()
    }

    /// Apply [`encoding`](Config::encoding) and [`errors`](Config::errors)
    /// to `contents`.
    ///
    /// Returns the bytes to store; unchanged when no encoding is set.
    /// The error string describes the first invalid sequence under the
    /// strict policy.
    pub fn encode<'a>(&self, contents: &'a [u8]) -> Result<Cow<'a, [u8]>, String> {
        let Some(encoding) = self.encoding else {
            return Ok(Cow::Borrowed(contents));
        };
        let policy = self.errors.unwrap_or_default();
        match encoding {
            Encoding::Utf8 => encode_utf8(contents, policy),
            Encoding::Ascii => encode_ascii(contents, policy),
        }
    }
}

fn encode_utf8(contents: &[u8], policy: DecodePolicy) -> Result<Cow<'_, [u8]>, String> {
    if let Err(e) = std::str::from_utf8(contents) {
        if policy == DecodePolicy::Strict {
            return Err(format!("'utf-8' codec can't decode contents: {e}"));
        }
    } else {
        return Ok(Cow::Borrowed(contents));
    }

    let mut out = String::with_capacity(contents.len());
    for chunk in contents.utf8_chunks() {
        out.push_str(chunk.valid());
        if !chunk.invalid().is_empty() && policy == DecodePolicy::Replace {
            out.push(char::REPLACEMENT_CHARACTER);
        }
    }
    Ok(Cow::Owned(out.into_bytes()))
}

fn encode_ascii(contents: &[u8], policy: DecodePolicy) -> Result<Cow<'_, [u8]>, String> {
    let Some(position) = contents.iter().position(|byte| !byte.is_ascii()) else {
        return Ok(Cow::Borrowed(contents));
    };
    match policy {
        DecodePolicy::Strict => Err(format!(
            "'ascii' codec can't encode byte 0x{:02x} in position {position}",
            contents[position]
        )),
        DecodePolicy::Replace => Ok(Cow::Owned(
            contents
                .iter()
                .map(|byte| if byte.is_ascii() { *byte } else { b'?' })
                .collect(),
        )),
        DecodePolicy::Ignore => Ok(Cow::Owned(
            contents.iter().copied().filter(u8::is_ascii).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_call_options_override_base() {
        let base = Config::new()
            .with_mode(OpenMode::Truncate)
            .with_chunk_size(8)
            .with_visibility(Visibility::Public);
        let call = Config::new()
            .with_mode(OpenMode::Append)
            .with_visibility(Visibility::Private);

        let merged = base.merge(&call);
        assert_eq!(merged.mode, Some(OpenMode::Append));
        assert_eq!(merged.chunk_size, Some(8));
        assert_eq!(merged.visibility, Some(Visibility::Private));
    }

    #[test]
    fn extra_keys_merge_shallowly() {
        let mut base = Config::new();
        base.set("ContentType", "text/plain").unwrap();
        base.set("CacheControl", "no-cache").unwrap();
        let mut call = Config::new();
        call.set("ContentType", "application/json").unwrap();

        let merged = base.merge(&call);
        assert_eq!(merged.extra["ContentType"], "application/json");
        assert_eq!(merged.extra["CacheControl"], "no-cache");
    }

    #[test]
    fn set_parses_known_keys() {
        let mut config = Config::new();
        config.set("encoding", "UTF-8").unwrap();
        config.set("mode", "x").unwrap();
        config.set("errors", "replace").unwrap();
        config.set("chunk_size", "1024").unwrap();
        config.set("visibility", "private").unwrap();
        assert_eq!(config.encoding, Some(Encoding::Utf8));
        assert_eq!(config.mode, Some(OpenMode::CreateNew));
        assert_eq!(config.errors, Some(DecodePolicy::Replace));
        assert_eq!(config.chunk_size, Some(1024));
        assert_eq!(config.visibility, Some(Visibility::Private));
        assert!(config.extra.is_empty());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::new();
        assert!(config.set("mode", "rw").is_err());
        assert!(config.set("chunk_size", "0").is_err());
        assert!(config.set("visibility", "hidden").is_err());
        assert!(config.set("encoding", "latin-9").is_err());
    }

    #[test]
    fn encode_passes_through_without_encoding() {
        let config = Config::new();
        let bytes = [0xff, 0xfe];
        assert_eq!(config.encode(&bytes).unwrap().as_ref(), &bytes);
    }

    #[test]
    fn utf8_policies() {
        let invalid = b"ab\xffcd";
        let strict = Config::new().with_encoding(Encoding::Utf8);
        assert!(strict.encode(invalid).is_err());
        assert_eq!(strict.encode(b"hello").unwrap().as_ref(), b"hello");

        let replace = strict.clone().with_errors(DecodePolicy::Replace);
        assert_eq!(
            replace.encode(invalid).unwrap().as_ref(),
            "ab\u{FFFD}cd".as_bytes()
        );

        let ignore = strict.with_errors(DecodePolicy::Ignore);
        assert_eq!(ignore.encode(invalid).unwrap().as_ref(), b"abcd");
    }

    #[test]
    fn ascii_policies() {
        let contents = "caf\u{e9}".as_bytes();
        let strict = Config::new().with_encoding(Encoding::Ascii);
        assert!(strict.encode(contents).is_err());
        let replace = strict.clone().with_errors(DecodePolicy::Replace);
        assert_eq!(replace.encode(contents).unwrap().as_ref(), b"caf??");
        let ignore = strict.with_errors(DecodePolicy::Ignore);
        assert_eq!(ignore.encode(contents).unwrap().as_ref(), b"caf");
    }
}
