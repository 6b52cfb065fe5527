//! Dependency resolution.
//!
//! Maps a static [`DependencySpec`] and a [`BuildTarget`] to a concrete
//! [`ResolvedDependency`]. This component performs no network or filesystem
//! I/O; resolution is a pure function of its inputs, which keeps it testable
//! in isolation and guarantees identical locators for identical targets.

use crate::pipeline::error::{Error, Result};
use crate::pipeline::target::{Arch, BuildTarget, Mode, Platform};

/// A URL/filename-pattern pair with named placeholders.
///
/// The only recognized placeholder is `{branch}`; `file_pattern` is a glob
/// matched against extracted archive contents, where wildcards stand in for
/// the version and interpreter tag that are unknown until fetch time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LocatorTemplate {
    /// URL template, possibly containing `{branch}`
    pub url: &'static str,
    /// Glob matched against the fetched (or extracted) artifact name
    pub file_pattern: &'static str,
}

/// How a fetched artifact is verified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verification {
    /// No verification declared; trust the transport
    None,
    /// SHA-256 of the fetched bytes (hex)
    Sha256(&'static str),
}

/// How a fetched artifact is installed into the build environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InstallMethod {
    /// Unpack the archive into `dest` under the work root
    ExtractArchive {
        /// Destination directory relative to the work root
        dest: &'static str,
    },
    /// Install the matched wheel into the active interpreter environment
    EnvironmentInstall,
    /// Copy the fetched file verbatim to `dest` under the work root
    FileCopy {
        /// Destination path relative to the work root
        dest: &'static str,
    },
}

/// Static declaration of a logical dependency and how to locate it per target.
#[derive(Clone, Copy, Debug)]
pub struct DependencySpec {
    /// Logical dependency name
    pub name: &'static str,
    /// Locator used for Windows builds
    pub windows: Option<LocatorTemplate>,
    /// Locator used for macOS x86_64 builds
    pub macos_x86_64: Option<LocatorTemplate>,
    /// Locator used for macOS Apple Silicon builds
    pub macos_arm64: Option<LocatorTemplate>,
    /// Verification method for the fetched bytes
    pub verify: Verification,
    /// Install method
    pub install: InstallMethod,
}

/// A [`DependencySpec`] instantiated against a concrete [`BuildTarget`].
///
/// Consumed exactly once by the installer, then discarded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedDependency {
    /// Logical dependency name
    pub name: &'static str,
    /// Concrete URL to fetch
    pub url: String,
    /// Glob matched against the fetched (or extracted) artifact name
    pub file_pattern: &'static str,
    /// Branch the locator resolved to
    pub branch: &'static str,
    /// Verification method
    pub verify: Verification,
    /// Install method
    pub install: InstallMethod,
}

/// Select the upstream branch for a build mode.
///
/// The `release` reference is maintained by the upstream publisher to always
/// point at the latest tagged release; the resolver relies on that convention
/// without verifying it.
fn branch_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Development => "master",
        Mode::Release => "release",
    }
}

/// Substitute named placeholders into a locator URL template.
///
/// The placeholder set is closed; an unknown placeholder left in the output
/// would fail loudly at fetch time as an invalid URL, not silently resolve.
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Resolve a dependency spec against a build target.
///
/// Pure computation: identical `(spec, target)` inputs always yield an
/// identical [`ResolvedDependency`]. On macOS, any architecture other than
/// Arm64 takes the x86_64 locator; resolution never fails on architecture
/// ambiguity. It does fail if the spec carries no locator for the target
/// platform, since that indicates a catalog/plan mismatch.
pub fn resolve(spec: &DependencySpec, target: BuildTarget) -> Result<ResolvedDependency> {
    let template = match target.platform {
        Platform::MacOs => match target.arch {
            Arch::Arm64 => spec.macos_arm64,
            _ => spec.macos_x86_64,
        },
        _ => spec.windows,
    };

    let template = template.ok_or(Error::UnsupportedPlatform {
        name: spec.name,
        platform: target.platform,
    })?;

    let branch = branch_for(target.mode);
    let url = substitute(template.url, &[("branch", branch)]);
    let url: String = url::Url::parse(&url)
        .map_err(|e| Error::GenericError(format!("invalid locator URL `{url}`: {e}")))?
        .into();

    log::debug!(
        "resolved {} -> {} (pattern {})",
        spec.name,
        url,
        template.file_pattern
    );

    Ok(ResolvedDependency {
        name: spec.name,
        url,
        file_pattern: template.file_pattern,
        branch,
        verify: spec.verify,
        install: spec.install,
    })
}

/// Native extension wheel bundle, built per branch and architecture by
/// upstream CI and served through the artifact redirector.
pub fn skytemple_rust() -> DependencySpec {
    DependencySpec {
        name: "skytemple-rust",
        // Single fixed Windows pattern; does not vary by architecture.
        windows: Some(LocatorTemplate {
            url: "https://nightly.link/SkyTemple/skytemple-rust/workflows/build-test-publish/{branch}/wheels-windows.zip",
            file_pattern: "skytemple_rust-*-cp3*-win_amd64.whl",
        }),
        macos_x86_64: Some(LocatorTemplate {
            url: "https://nightly.link/SkyTemple/skytemple-rust/workflows/build-test-publish/{branch}/wheels-macos.zip",
            file_pattern: "skytemple_rust-*-cp3*-macosx_*_x86_64.whl",
        }),
        macos_arm64: Some(LocatorTemplate {
            url: "https://nightly.link/SkyTemple/skytemple-rust/workflows/build-test-publish/{branch}/wheels-macos-arm64.zip",
            file_pattern: "skytemple_rust-*-cp3*-macosx_*_arm64.whl",
        }),
        verify: Verification::None,
        install: InstallMethod::EnvironmentInstall,
    }
}

/// GTK theme shipped with the Windows build.
pub fn arc_theme() -> DependencySpec {
    DependencySpec {
        name: "arc-theme",
        windows: Some(LocatorTemplate {
            url: "https://github.com/jnsh/arc-theme/releases/download/20221218/arc-theme-20221218-gtk3.tar.gz",
            file_pattern: "arc-theme-*.tar.gz",
        }),
        macos_x86_64: None,
        macos_arm64: None,
        verify: Verification::Sha256(
            "f797fa9a269401a6e132a9dbdb3819f5f74ff43ac4d07fa56e40d4b685296a6c",
        ),
        install: InstallMethod::ExtractArchive { dest: "share/themes" },
    }
}

/// armips assembler binary bundled with the Windows build for patch support.
pub fn armips() -> DependencySpec {
    DependencySpec {
        name: "armips",
        windows: Some(LocatorTemplate {
            url: "https://github.com/Kingcom/armips/releases/download/v0.11.0/armips.exe",
            file_pattern: "armips.exe",
        }),
        macos_x86_64: None,
        macos_arm64: None,
        verify: Verification::Sha256(
            "a2262a1ff1b76894db545b4b5b6b1e4ff9c1d11eaacb24b2617b6e8fbc68ab7a",
        ),
        install: InstallMethod::FileCopy { dest: "armips.exe" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::target::{Arch, BuildTarget, Mode, Platform};

    fn target(platform: Platform, arch: Arch, mode: Mode) -> BuildTarget {
        BuildTarget {
            platform,
            arch,
            mode,
        }
    }

    #[test]
    fn resolve_is_pure() {
        let spec = skytemple_rust();
        let t = target(Platform::Windows, Arch::Unspecified, Mode::Release);
        let a = resolve(&spec, t).unwrap();
        let b = resolve(&spec, t).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mode_selects_branch() {
        let spec = skytemple_rust();
        let dev = resolve(
            &spec,
            target(Platform::Windows, Arch::Unspecified, Mode::Development),
        )
        .unwrap();
        assert_eq!(dev.branch, "master");
        assert!(dev.url.contains("/master/"));

        let rel = resolve(
            &spec,
            target(Platform::Windows, Arch::Unspecified, Mode::Release),
        )
        .unwrap();
        assert_eq!(rel.branch, "release");
        assert!(rel.url.contains("/release/"));
    }

    #[test]
    fn macos_arm64_gets_arm64_locator() {
        let spec = skytemple_rust();
        let arm = resolve(
            &spec,
            target(Platform::MacOs, Arch::Arm64, Mode::Development),
        )
        .unwrap();
        assert!(arm.url.ends_with("wheels-macos-arm64.zip"));
        assert!(arm.file_pattern.contains("arm64"));
        assert_eq!(arm.branch, "master");
    }

    #[test]
    fn macos_other_arch_gets_x86_64_locator() {
        let spec = skytemple_rust();
        for arch in [Arch::X86_64, Arch::Unspecified] {
            let r = resolve(&spec, target(Platform::MacOs, arch, Mode::Development)).unwrap();
            assert!(r.url.ends_with("wheels-macos.zip"));
            assert!(r.file_pattern.contains("x86_64"));
        }
    }

    #[test]
    fn macos_variants_are_disjoint() {
        let spec = skytemple_rust();
        let arm = resolve(
            &spec,
            target(Platform::MacOs, Arch::Arm64, Mode::Development),
        )
        .unwrap();
        let x86 = resolve(
            &spec,
            target(Platform::MacOs, Arch::X86_64, Mode::Development),
        )
        .unwrap();
        assert_ne!(arm.url, x86.url);
        assert_ne!(arm.file_pattern, x86.file_pattern);
    }

    #[test]
    fn windows_pattern_independent_of_arch() {
        let spec = skytemple_rust();
        let a = resolve(
            &spec,
            target(Platform::Windows, Arch::Unspecified, Mode::Release),
        )
        .unwrap();
        let b = resolve(
            &spec,
            target(Platform::Windows, Arch::Arm64, Mode::Release),
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.file_pattern, "skytemple_rust-*-cp3*-win_amd64.whl");
    }

    #[test]
    fn missing_platform_locator_is_an_error() {
        let spec = arc_theme();
        let err = resolve(
            &spec,
            target(Platform::MacOs, Arch::Arm64, Mode::Release),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform { name: "arc-theme", .. }));
    }

    #[test]
    fn substitute_replaces_named_placeholders_only() {
        assert_eq!(
            substitute("https://x/{branch}/y", &[("branch", "release")]),
            "https://x/release/y"
        );
        assert_eq!(substitute("no placeholders", &[("branch", "z")]), "no placeholders");
    }
}
