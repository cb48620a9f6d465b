use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during metadata assembly
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The metadata source document is required; a build must not proceed
    /// without one.
    #[error("metadata document not found at {path:?}: {source}")]
    MissingInput { path: PathBuf, source: io::Error },

    #[error("failed to parse metadata document: {0}")]
    MalformedManifest(#[from] XmlError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Syntax error raised while decoding a metadata document
#[derive(Error, Debug)]
#[error("{message} at line {line}, column {column}")]
pub struct XmlError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}
