use std::io;

use thiserror::Error;

/// Errors raised while reading, parsing or querying a JSON document.
#[derive(Error, Debug)]
pub enum Error {
    /// The document bytes had to be parsed and are not well-formed JSON.
    #[error("malformed document: {0}")]
    Malformed(#[source] serde_json::Error),

    /// A strict leaf accessor found no node of the requested type at `path`.
    #[error("No such field of specified type: {path}")]
    NoSuchField {
        /// The path exactly as the caller passed it.
        path: String,
    },

    /// The stream or file behind a source could not be read.
    #[error("failed to read document source: {0}")]
    Io(#[from] io::Error),

    /// A builder can only extend a document whose root is an object.
    #[error("expected a JSON object at the document root, found {found}")]
    NotAnObject {
        /// Kind of the root value that was found instead.
        found: &'static str,
    },
}

impl Error {
    pub(crate) fn no_such_field(path: &str) -> Self {
        Self::NoSuchField {
            path: path.to_owned(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
