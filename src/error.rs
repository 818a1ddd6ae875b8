use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong while reading, resolving or persisting entries.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("{}: desktop file does not start with [Desktop Entry]", path.display())]
    MissingSection { path: PathBuf },

    #[error("{}:{line}: malformed line, expected `key value`", path.display())]
    MalformedLine { path: PathBuf, line: usize },

    #[error("{}:{line}: empty key or value", path.display())]
    EmptyKeyOrValue { path: PathBuf, line: usize },

    #[error("{}:{line}: non-closed \" in arguments", path.display())]
    UnterminatedQuote { path: PathBuf, line: usize },

    #[error("{}: invalid entry type `{value}`", path.display())]
    InvalidType { path: PathBuf, value: String },

    #[error("{}: type `system` is not allowed in .qsrun files", path.display())]
    ForbiddenSystemType { path: PathBuf },

    #[error("cannot resolve inherited entry `{reference}`: {reason}")]
    InheritResolutionFailed { reference: String, reason: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("only user entries with a backing file can be saved or deleted")]
    NotSavable,

    #[error("`{field}` cannot be written to a .qsrun file and read back unchanged")]
    Unrepresentable { field: &'static str },

    #[error("{} was updated on disk, but the rescan failed: {}", path.display(), source)]
    RescanAfterWrite {
        path: PathBuf,
        #[source]
        source: Box<EntryError>,
    },
}

impl EntryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Attaches a file path to format errors raised by the pure parsers,
    /// which only know about line numbers.
    pub fn in_file(self, file: &Path) -> Self {
        let file = file.to_path_buf();
        match self {
            Self::MissingSection { path } if path.as_os_str().is_empty() => {
                Self::MissingSection { path: file }
            }
            Self::MalformedLine { path, line } if path.as_os_str().is_empty() => {
                Self::MalformedLine { path: file, line }
            }
            Self::EmptyKeyOrValue { path, line } if path.as_os_str().is_empty() => {
                Self::EmptyKeyOrValue { path: file, line }
            }
            Self::UnterminatedQuote { path, line } if path.as_os_str().is_empty() => {
                Self::UnterminatedQuote { path: file, line }
            }
            Self::InvalidType { path, value } if path.as_os_str().is_empty() => {
                Self::InvalidType { path: file, value }
            }
            Self::ForbiddenSystemType { path } if path.as_os_str().is_empty() => {
                Self::ForbiddenSystemType { path: file }
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, EntryError>;
