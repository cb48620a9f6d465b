//! Extension metadata assembly for the widget build pipeline
//!
//! This crate owns the second generation step of the build: once per build,
//! during asset collection, the widget's `metadata.xml` is loaded, the
//! extension package identity is patched from the build configuration, the
//! generated bundle file resources are injected, and the result is
//! re-serialized as a build output asset.
//!
//! The document is modeled as a tree of named elements with ordered
//! attributes (`Document`/`Element`); the markup codec round-trips that tree
//! and nothing else. Schema validation is out of scope - only the known
//! fields are patched.

pub mod assembler;
pub mod document;
pub mod errors;

mod parser;
mod writer;

pub use assembler::{
    assemble_str, patch_document, AssemblyPhase, MetadataAssembler, MetadataAsset,
    METADATA_ASSET_PATH, METADATA_FILE_NAME,
};
pub use document::{Document, Element};
pub use errors::{MetadataError, XmlError};
