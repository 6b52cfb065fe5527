//! Fixed build-manifest template.
//!
//! The module order below is hand-authored and load-bearing: armips is the
//! assembler toolchain later modules invoke, the Python dependency set must
//! exist before the native extension resolves against it, and the application
//! module comes last. Reordering here changes build semantics.

use super::{SourceEntry, TemplateModule, TemplateSource};

/// Fixed fields of the manifest plus the ordered module template.
pub struct ManifestTemplate {
    pub app_id: &'static str,
    pub runtime: &'static str,
    pub runtime_version: &'static str,
    pub sdk: &'static str,
    pub command: &'static str,
    pub finish_args: &'static [&'static str],
    pub modules: Vec<TemplateModule>,
}

/// Builds the fixed template with placeholder source references.
pub fn manifest_template() -> ManifestTemplate {
    ManifestTemplate {
        app_id: "org.skytemple.SkyTemple",
        runtime: "org.gnome.Platform",
        runtime_version: "47",
        sdk: "org.gnome.Sdk",
        command: "run.sh",
        finish_args: &[
            "--share=ipc",
            "--socket=x11",
            "--socket=wayland",
            "--share=network",
            "--filesystem=home",
        ],
        modules: vec![
            TemplateModule {
                name: "armips",
                buildsystem: "cmake-ninja",
                build_commands: &[],
                sources: vec![TemplateSource::Entry(SourceEntry::Git {
                    url: "https://github.com/Kingcom/armips.git".into(),
                    tag: "{{armips_rev}}".into(),
                })],
            },
            TemplateModule {
                name: "python3-requirements",
                buildsystem: "simple",
                build_commands: &[
                    "pip3 install --no-index --find-links=\"file://${PWD}\" --prefix=${FLATPAK_DEST} -r requirements.txt",
                ],
                sources: vec![
                    TemplateSource::Entry(SourceEntry::File {
                        path: "requirements.txt".into(),
                        sha256: "{{requirements_sha256}}".into(),
                    }),
                    TemplateSource::Group("python-requirements"),
                ],
            },
            TemplateModule {
                name: "skytemple-rust",
                buildsystem: "simple",
                build_commands: &[
                    "pip3 install --no-deps --prefix=${FLATPAK_DEST} .",
                ],
                sources: vec![TemplateSource::Entry(SourceEntry::Git {
                    url: "https://github.com/SkyTemple/skytemple-rust.git".into(),
                    tag: "{{skytemple_rust_rev}}".into(),
                })],
            },
            TemplateModule {
                name: "skytemple",
                buildsystem: "simple",
                build_commands: &[
                    "pip3 install --no-deps --prefix=${FLATPAK_DEST} .",
                    "install -Dm755 run.sh ${FLATPAK_DEST}/bin/run.sh",
                ],
                sources: vec![
                    TemplateSource::Entry(SourceEntry::Git {
                        url: "https://github.com/SkyTemple/skytemple.git".into(),
                        tag: "{{skytemple_rev}}".into(),
                    }),
                    TemplateSource::Entry(SourceEntry::Patch {
                        path: "patches/host-python.patch".into(),
                    }),
                    TemplateSource::Entry(SourceEntry::Include {
                        path: "launcher/run.json".into(),
                    }),
                ],
            },
        ],
    }
}
