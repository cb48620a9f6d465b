//! Host-facing entry points for the widget build pipeline
//!
//! The surrounding build orchestrator drives two independent phases:
//! - source transformation: [`BuildPipeline::on_compilation_unit`] runs once
//!   per compilation unit and synthesizes description annotations;
//! - asset collection: [`BuildPipeline::on_asset_collection`] runs once per
//!   build and assembles the extension metadata asset.
//!
//! All context is passed in explicitly - the project root and build
//! configuration at construction, the declaration tree per call - so the
//! pipeline runs the same under a real build host and under tests.

pub mod logging;

use anyhow::Context;
use std::path::PathBuf;
use tracing::debug;

use twx_ast::{CompilationUnit, DescriptionSynthesizer};
use twx_config::BuildConfig;
use twx_metadata::{MetadataAsset, MetadataAssembler};

pub use twx_ast::{has_annotation, Annotated};
pub use twx_config::PackageDescriptor;
pub use twx_metadata::MetadataError;

/// One build's generation steps, wired to a project root and its
/// configuration.
pub struct BuildPipeline {
    project_root: PathBuf,
    config: BuildConfig,
    synthesizer: DescriptionSynthesizer,
}

impl BuildPipeline {
    pub fn new(project_root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        BuildPipeline {
            project_root: project_root.into(),
            config,
            synthesizer: DescriptionSynthesizer::new(),
        }
    }

    /// Wire a pipeline for the project root, reading the configuration from
    /// its `package.json`.
    pub fn from_project(project_root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let project_root = project_root.into();
        let config = BuildConfig::from_package_json(&project_root.join("package.json"))
            .context("failed to load the build configuration")?;
        Ok(BuildPipeline::new(project_root, config))
    }

    /// Replace the synthesizer, e.g. for a custom documentation tag
    /// priority.
    pub fn with_synthesizer(mut self, synthesizer: DescriptionSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Source-transform hook, invoked by the host compiler once per
    /// compilation unit. Returns the number of synthesized annotations.
    pub fn on_compilation_unit(&self, unit: &mut CompilationUnit) -> usize {
        let synthesized = self.synthesizer.transform(unit);
        debug!(
            "Compilation unit {:?}: {} description annotation(s) synthesized",
            unit.path, synthesized
        );
        synthesized
    }

    /// Asset-collection hook, invoked by the host bundler once per build.
    ///
    /// Completion of the returned future is the signal that metadata
    /// assembly finished; the build's asset collection must not be
    /// considered done before then. Failures abort the build - an unpatched
    /// manifest is never published.
    pub async fn on_asset_collection(&self) -> anyhow::Result<MetadataAsset> {
        let mut assembler = MetadataAssembler::new(&self.project_root, self.config.clone());
        let asset = assembler.assemble().await.with_context(|| {
            format!("metadata assembly failed for {}", self.config.package_name)
        })?;
        Ok(asset)
    }
}
