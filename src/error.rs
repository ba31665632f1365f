//! Error types for bkmk operations.

use thiserror::Error;

/// Errors that can occur while reading, normalizing or writing bookmarks.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecognized node discriminator, unsupported or missing version marker.
    #[error("format error: {0}")]
    Format(String),

    /// Malformed or unbalanced markup, missing required root.
    #[error("structure error: {0}")]
    Structure(String),

    /// The caller asked for something the tree or registry cannot satisfy.
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match e.classify() {
            Category::Io => Error::Io(e.into()),
            Category::Syntax | Category::Eof => Error::Structure(e.to_string()),
            Category::Data => Error::Format(e.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        match e {
            quick_xml::Error::Io(io) => Error::Io(std::io::Error::new(io.kind(), io.to_string())),
            other => Error::Structure(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
