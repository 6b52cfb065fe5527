//! Release pipeline orchestration.
//!
//! This module wires the components into one strictly sequential chain:
//! resolve dependencies for the build target, install them in declared order,
//! invoke the freeze tool, then post-process the artifact tree. The working
//! directory and the interpreter environment are mutated in place by
//! sequential steps; no concurrent writers are permitted within one run.

pub mod error;
pub mod freeze;
pub mod install;
pub mod manifest;
pub mod postprocess;
pub mod resolver;
pub mod target;
pub mod utils;

pub use error::{Error, ErrorExt, Result};

use install::plan::{InstallStep, StepKind};
use install::InstallContext;
use std::path::PathBuf;
use target::{BuildTarget, Platform};

/// Relative path of the application's own dependency manifest.
const REQUIREMENTS_MANIFEST: &str = "requirements.txt";

/// One packaging run for a frozen-tree platform (Windows or macOS).
#[derive(Clone, Debug)]
pub struct Pipeline {
    target: BuildTarget,
    ctx: InstallContext,
    /// CI output-channel file for emitted variables, if configured
    output_channel: Option<PathBuf>,
}

impl Pipeline {
    /// Creates a pipeline for one build target.
    pub fn new(target: BuildTarget, ctx: InstallContext, output_channel: Option<PathBuf>) -> Self {
        Self {
            target,
            ctx,
            output_channel,
        }
    }

    /// Builds the install plan for the target platform.
    ///
    /// The order is a hard constraint: the native extension wheel must be in
    /// the environment before the umbrella dependency manifest resolves, and
    /// the in-tree application package installs last. Independent artifacts
    /// (themes, toolkit binaries) sit between those anchors.
    fn build_plan(&self) -> Result<Vec<InstallStep>> {
        let mut steps = vec![InstallStep {
            name: "skytemple-rust",
            requires: &[],
            kind: StepKind::Dependency(resolver::resolve(&resolver::skytemple_rust(), self.target)?),
        }];

        if self.target.platform == Platform::Windows {
            steps.push(InstallStep {
                name: "arc-theme",
                requires: &[],
                kind: StepKind::Dependency(resolver::resolve(&resolver::arc_theme(), self.target)?),
            });
            steps.push(InstallStep {
                name: "armips",
                requires: &[],
                kind: StepKind::Dependency(resolver::resolve(&resolver::armips(), self.target)?),
            });
        }

        steps.push(InstallStep {
            name: "requirements",
            requires: &["skytemple-rust"],
            kind: StepKind::PipRequirements(REQUIREMENTS_MANIFEST),
        });
        steps.push(InstallStep {
            name: "application",
            requires: &["requirements"],
            kind: StepKind::PipApplication,
        });

        Ok(steps)
    }

    /// Runs the full pipeline and returns the finished artifact tree.
    ///
    /// Aborts on the first error; a failed run leaves the environment
    /// inconsistent and must be retried from a clean one.
    pub async fn run(&self, version: Option<String>) -> Result<PathBuf> {
        log::info!("Packaging for target {:?}", self.target);

        let steps = self.build_plan()?;
        install::plan::validate_order(&steps)?;

        for step in &steps {
            log::info!("Install step: {}", step.name);
            match &step.kind {
                StepKind::Dependency(resolved) => install::install(resolved, &self.ctx).await?,
                StepKind::PipRequirements(manifest) => {
                    install::install_requirements(manifest, &self.ctx).await?
                }
                StepKind::PipApplication => install::install_application(&self.ctx).await?,
            }
        }

        let tree = freeze::run_freeze(&self.ctx).await?;

        postprocess::relocate_certificates(&tree).await?;
        postprocess::prune_artifacts(&tree).await?;

        // Version query must happen after the install phase.
        let stamp = postprocess::resolve_version(version, &self.ctx).await?;
        postprocess::stamp_version(&tree, &stamp, self.output_channel.as_deref()).await?;

        log::info!("Artifact ready at {}", tree.display());
        Ok(tree)
    }
}
