//! Container build manifest rendering.
//!
//! The Linux packaging path does not run the install/freeze pipeline itself;
//! it renders a build manifest that an external container builder consumes.
//! The renderer performs pure substitution into a fixed, hand-authored module
//! template. Module and source order in that template encode build-order
//! invariants (the assembler toolchain module precedes modules that compile
//! native code) and are preserved verbatim — the renderer never reorders.

pub mod template;

use crate::pipeline::error::{Error, Result};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level shape of the rendered build manifest.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BuildManifest {
    /// Application identifier
    #[serde(rename = "app-id")]
    pub app_id: String,
    /// Runtime descriptor
    pub runtime: String,
    /// Runtime version
    #[serde(rename = "runtime-version")]
    pub runtime_version: String,
    /// SDK descriptor
    pub sdk: String,
    /// Command the container runs
    pub command: String,
    /// Permission grants
    #[serde(rename = "finish-args")]
    pub finish_args: Vec<String>,
    /// Ordered module list; declared order is build order
    pub modules: Vec<ModuleNode>,
}

/// One unit in the module-dependency list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModuleNode {
    /// Module name
    pub name: String,
    /// Build system kind
    pub buildsystem: String,
    /// Ordered build commands
    #[serde(rename = "build-commands", default, skip_serializing_if = "Vec::is_empty")]
    pub build_commands: Vec<String>,
    /// Ordered source list
    pub sources: Vec<SourceEntry>,
}

/// A single module source, tagged by kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceEntry {
    /// Git reference
    Git {
        /// Repository URL
        url: String,
        /// Tag or branch to check out
        tag: String,
    },
    /// Remote archive with checksum
    Archive {
        /// Archive URL
        url: String,
        /// SHA-256 of the archive (hex)
        sha256: String,
    },
    /// Local file with checksum
    File {
        /// Path relative to the manifest
        path: String,
        /// SHA-256 of the file (hex)
        sha256: String,
    },
    /// Local patch applied to the module source
    Patch {
        /// Path relative to the manifest
        path: String,
    },
    /// Nested included document
    Include {
        /// Path of the included manifest fragment
        path: String,
    },
}

/// A source slot in the template: either a literal entry or a named group
/// placeholder expanded at render time.
#[derive(Clone, Debug)]
pub enum TemplateSource {
    /// Carried into the output after string substitution
    Entry(SourceEntry),
    /// Replaced in place by the caller-supplied entry list for this name
    Group(&'static str),
}

/// One module of the fixed template.
#[derive(Clone, Debug)]
pub struct TemplateModule {
    /// Module name
    pub name: &'static str,
    /// Build system kind
    pub buildsystem: &'static str,
    /// Ordered build commands, possibly containing `{{placeholders}}`
    pub build_commands: &'static [&'static str],
    /// Ordered source slots
    pub sources: Vec<TemplateSource>,
}

/// Template variables: string substitutions for `{{name}}` placeholders and
/// concrete entry lists for group placeholders.
#[derive(Clone, Debug, Default)]
pub struct ManifestVars {
    /// `{{name}}` -> value substitutions
    pub strings: BTreeMap<String, String>,
    /// group name -> expanded source entries
    pub groups: BTreeMap<String, Vec<SourceEntry>>,
}

/// Renders the fixed template against the supplied variables.
///
/// Unknown `{{placeholders}}` and missing groups are render errors; silence
/// here would ship a manifest with literal placeholder text in it.
pub fn render(vars: &ManifestVars) -> Result<BuildManifest> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);

    let subst = |s: &str| -> Result<String> {
        Ok(handlebars.render_template(s, &vars.strings)?)
    };

    let spec = template::manifest_template();

    let mut modules = Vec::with_capacity(spec.modules.len());
    for module in &spec.modules {
        let mut sources = Vec::new();
        for slot in &module.sources {
            match slot {
                TemplateSource::Entry(entry) => sources.push(substitute_entry(entry, &subst)?),
                TemplateSource::Group(name) => {
                    let group = vars.groups.get(*name).ok_or_else(|| {
                        Error::GenericError(format!("no entries supplied for source group `{name}`"))
                    })?;
                    sources.extend(group.iter().cloned());
                }
            }
        }

        modules.push(ModuleNode {
            name: module.name.to_string(),
            buildsystem: module.buildsystem.to_string(),
            build_commands: module
                .build_commands
                .iter()
                .map(|c| subst(c))
                .collect::<Result<_>>()?,
            sources,
        });
    }

    Ok(BuildManifest {
        app_id: spec.app_id.to_string(),
        runtime: spec.runtime.to_string(),
        runtime_version: spec.runtime_version.to_string(),
        sdk: spec.sdk.to_string(),
        command: spec.command.to_string(),
        finish_args: spec.finish_args.iter().map(|a| a.to_string()).collect(),
        modules,
    })
}

fn substitute_entry<F>(entry: &SourceEntry, subst: &F) -> Result<SourceEntry>
where
    F: Fn(&str) -> Result<String>,
{
    Ok(match entry {
        SourceEntry::Git { url, tag } => SourceEntry::Git {
            url: subst(url)?,
            tag: subst(tag)?,
        },
        SourceEntry::Archive { url, sha256 } => SourceEntry::Archive {
            url: subst(url)?,
            sha256: subst(sha256)?,
        },
        SourceEntry::File { path, sha256 } => SourceEntry::File {
            path: subst(path)?,
            sha256: subst(sha256)?,
        },
        SourceEntry::Patch { path } => SourceEntry::Patch { path: subst(path)? },
        SourceEntry::Include { path } => SourceEntry::Include { path: subst(path)? },
    })
}
