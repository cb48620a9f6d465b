//! Metadata document assembly
//!
//! Once per build, during asset collection, the widget's `metadata.xml` is
//! loaded, patched with the package identity from the build configuration
//! and with the generated bundle file resources, then re-serialized as a
//! build output asset. Reading and parsing are the only fallible phases; a
//! build must never publish a partially patched or unpatched manifest, so
//! both failures are logged and re-raised.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};
use twx_config::BuildConfig;

use crate::document::{Document, Element};
use crate::errors::MetadataError;

/// Well-known name of the metadata source document, relative to the
/// project root.
pub const METADATA_FILE_NAME: &str = "metadata.xml";

/// Where the patched document is published, relative to the build output
/// root.
pub const METADATA_ASSET_PATH: &str = "../../metadata.xml";

/// Assembly progress. Terminal states are `Emitted` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyPhase {
    Idle,
    ReadingFile,
    Parsing,
    Patching,
    Serializing,
    Emitted,
    Failed,
}

/// Drives one metadata assembly per build invocation.
///
/// The file system location and the build configuration are explicit inputs;
/// nothing is read from ambient build state.
pub struct MetadataAssembler {
    project_root: PathBuf,
    config: BuildConfig,
    phase: AssemblyPhase,
}

impl MetadataAssembler {
    pub fn new(project_root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        MetadataAssembler {
            project_root: project_root.into(),
            config,
            phase: AssemblyPhase::Idle,
        }
    }

    /// Current phase, observable after `assemble` returns.
    pub fn phase(&self) -> AssemblyPhase {
        self.phase
    }

    /// Load, patch and serialize the metadata document.
    ///
    /// Runs to completion or failure; there is no cancellation. Awaiting the
    /// returned future is the completion signal for the build's asset
    /// collection step.
    pub async fn assemble(&mut self) -> Result<MetadataAsset, MetadataError> {
        let path = self.project_root.join(METADATA_FILE_NAME);

        self.phase = AssemblyPhase::ReadingFile;
        debug!("Reading metadata document from {:?}", path);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(source) => {
                self.phase = AssemblyPhase::Failed;
                error!("Error reading metadata document {:?}: {}", path, source);
                return Err(MetadataError::MissingInput { path, source });
            }
        };

        self.phase = AssemblyPhase::Parsing;
        let mut document = match Document::parse(&text) {
            Ok(document) => document,
            Err(source) => {
                self.phase = AssemblyPhase::Failed;
                error!("Error parsing metadata document {:?}: {}", path, source);
                return Err(MetadataError::MalformedManifest(source));
            }
        };

        self.phase = AssemblyPhase::Patching;
        patch_document(&mut document, &self.config);

        self.phase = AssemblyPhase::Serializing;
        let source = document.to_xml();

        self.phase = AssemblyPhase::Emitted;
        let asset = MetadataAsset {
            path: PathBuf::from(METADATA_ASSET_PATH),
            source,
        };
        info!(
            "Assembled metadata for {} ({} bytes)",
            self.config.package_name,
            asset.size()
        );
        Ok(asset)
    }
}

/// Patch caller-supplied metadata text and return the serialized result.
///
/// The Parsing through Serializing core of [`MetadataAssembler::assemble`],
/// usable without touching the file system.
pub fn assemble_str(text: &str, config: &BuildConfig) -> Result<String, MetadataError> {
    let mut document = Document::parse(text)?;
    patch_document(&mut document, config);
    Ok(document.to_xml())
}

/// Patch the parsed document in place from the build configuration.
///
/// Patching cannot fail: structural elements that are missing are created on
/// demand. Known limitation: each call appends the two bundle file resources
/// again, so patching an already patched document duplicates them - assembly
/// is expected to start from the pristine source document every build.
pub fn patch_document(document: &mut Document, config: &BuildConfig) {
    let entities = &mut document.root;
    patch_extension_package(entities, config);
    patch_widget(entities, config);
}

fn patch_extension_package(entities: &mut Element, config: &BuildConfig) {
    let package = entities
        .get_or_create_child("ExtensionPackages")
        .get_or_create_child("ExtensionPackage");

    package.set_attribute("name", config.package_name.as_str());
    package.set_attribute("description", config.package.description.as_str());
    package.set_attribute("vendor", config.package.author.as_str());
    package.set_attribute(
        "minimumThingWorxVersion",
        config.package.minimum_thingworx_version.as_str(),
    );
    package.set_attribute("packageVersion", config.package.version.as_str());

    // The build number is only managed when auto update is configured; an
    // existing value stays untouched otherwise.
    if let Some(auto_update) = &config.package.auto_update {
        package.set_attribute("buildNumber", auto_update.to_string());
    }
}

fn patch_widget(entities: &mut Element, config: &BuildConfig) {
    let widget = entities
        .get_or_create_child("Widgets")
        .get_or_create_child("Widget");

    widget.set_attribute("name", config.package_name.as_str());

    let container = reset_resource_container(widget);
    container.push_child(file_resource(&config.package_name, BundleKind::Ide));
    container.push_child(file_resource(&config.package_name, BundleKind::Runtime));
}

/// Guarantee the widget has a `UIResources` container holding a
/// `FileResource` list.
///
/// A container without any `FileResource` children is replaced wholesale,
/// dropping whatever attributes or unrelated children it carried. Containers
/// that already hold file resources are kept and appended to.
fn reset_resource_container(widget: &mut Element) -> &mut Element {
    let container = widget.get_or_create_child("UIResources");
    if container.child("FileResource").is_none() {
        *container = Element::new("UIResources");
    }
    container
}

/// Which generated bundle a file resource refers to.
#[derive(Debug, Clone, Copy)]
enum BundleKind {
    Ide,
    Runtime,
}

fn file_resource(package_name: &str, kind: BundleKind) -> Element {
    let (bundle, is_development, is_runtime) = match kind {
        BundleKind::Ide => ("ide", "true", "false"),
        BundleKind::Runtime => ("runtime", "false", "true"),
    };

    let mut resource = Element::new("FileResource");
    resource.set_attribute("type", "JS");
    resource.set_attribute("file", format!("{package_name}.{bundle}.bundle.js"));
    resource.set_attribute("description", "");
    resource.set_attribute("isDevelopment", is_development);
    resource.set_attribute("isRuntime", is_runtime);
    resource
}

/// The assembled document, ready to be published as a build asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAsset {
    /// Output location, relative to the build output root.
    pub path: PathBuf,
    /// Serialized document text.
    pub source: String,
}

impl MetadataAsset {
    /// Asset size in bytes.
    pub fn size(&self) -> usize {
        self.source.len()
    }

    /// Write the asset under the given output root, creating parent
    /// directories as needed. Returns the resolved target path.
    pub async fn write_to(&self, output_root: &Path) -> Result<PathBuf, MetadataError> {
        let target = output_root.join(&self.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, self.source.as_bytes()).await?;

        debug!("Wrote metadata asset to {:?} ({} bytes)", target, self.size());
        Ok(target)
    }
}
