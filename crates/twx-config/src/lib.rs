//! Build configuration surface for the widget build pipeline
//!
//! The surrounding build describes the widget package in its `package.json`.
//! This crate carries the fields the generation steps consume: the package
//! name plus the descriptor metadata that ends up in the extension package
//! manifest. The configuration is read-only input; nothing here is persisted
//! back.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading the build configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse package descriptor: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Package metadata consumed by the metadata assembler.
///
/// Field names map onto the `package.json` keys the build reads. All fields
/// except `auto_update` default to empty strings so a sparse descriptor
/// still assembles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub version: String,

    /// Oldest platform release the widget supports.
    #[serde(default, rename = "minimumThingWorxVersion")]
    pub minimum_thingworx_version: String,

    /// Free-form auto-update descriptor. When present, its JSON form becomes
    /// the extension package's build number.
    #[serde(default, rename = "autoUpdate", skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<serde_json::Value>,
}

/// The externally supplied build configuration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Package name; also names the widget and its emitted bundles.
    pub package_name: String,
    pub package: PackageDescriptor,
}

impl BuildConfig {
    pub fn new(package_name: impl Into<String>, package: PackageDescriptor) -> Self {
        BuildConfig {
            package_name: package_name.into(),
            package,
        }
    }

    /// Load the configuration from a `package.json` file.
    ///
    /// The package name comes from the `name` key; unrelated keys are
    /// ignored.
    pub fn from_package_json(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading build configuration from {:?}", path);

        let content = std::fs::read_to_string(path)?;
        let parsed: PackageJson = serde_json::from_str(&content)?;

        Ok(BuildConfig {
            package_name: parsed.name,
            package: parsed.descriptor,
        })
    }
}

/// On-disk shape of `package.json`, reduced to the keys the build reads.
#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    name: String,
    #[serde(flatten)]
    descriptor: PackageDescriptor,
}
