//! Build target detection.
//!
//! Environment signals are read exactly once into [`EnvSignals`]; every other
//! component receives an explicit [`BuildTarget`] value instead of probing
//! process-wide state mid-pipeline.

use std::env;

/// Target platform for one pipeline run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    /// Windows frozen-tree packaging (single supported architecture)
    Windows,
    /// macOS frozen-tree packaging (x86_64 or Apple Silicon)
    MacOs,
    /// Linux container packaging via a rendered build manifest
    LinuxContainer,
}

/// Target CPU architecture.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arch {
    /// x86_64 / AMD64
    X86_64,
    /// AArch64 / Apple Silicon
    Arm64,
    /// Architecture plays no role for this platform
    Unspecified,
}

/// Build mode, selecting which upstream branch dependency artifacts come from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Track upstream trunk
    Development,
    /// Track the fixed release reference
    Release,
}

/// The resolved (platform, architecture, mode) triple driving all conditional
/// behavior. Immutable for the duration of one pipeline run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuildTarget {
    /// Target platform
    pub platform: Platform,
    /// Target architecture
    pub arch: Arch,
    /// Build mode
    pub mode: Mode,
}

/// Raw environment signals consumed by target detection.
///
/// Collected in one place so that [`BuildTarget::from_signals`] stays a pure
/// function and unit tests never have to touch the process environment.
#[derive(Clone, Debug, Default)]
pub struct EnvSignals {
    /// `IS_DEV_BUILD` is set
    pub dev_build: bool,
    /// `IS_MACOS` is set
    pub macos: bool,
    /// OS-reported machine architecture, if available
    pub machine_arch: Option<String>,
}

impl EnvSignals {
    /// Read the signals from the process environment.
    pub fn from_env() -> Self {
        Self {
            dev_build: env::var_os("IS_DEV_BUILD").is_some(),
            macos: env::var_os("IS_MACOS").is_some(),
            machine_arch: Some(env::consts::ARCH.to_string()),
        }
    }
}

impl BuildTarget {
    /// Derive the build target from environment signals.
    ///
    /// Unrecognized or absent architecture values fall back to the
    /// non-Apple-Silicon branch rather than aborting; every architecture-specific
    /// artifact in the catalog has an x86_64 variant, so this is always safe.
    pub fn from_signals(signals: &EnvSignals) -> Self {
        let mode = if signals.dev_build {
            Mode::Development
        } else {
            Mode::Release
        };

        if signals.macos {
            let arch = match signals.machine_arch.as_deref() {
                Some("arm64") | Some("aarch64") => Arch::Arm64,
                _ => Arch::X86_64,
            };
            Self {
                platform: Platform::MacOs,
                arch,
                mode,
            }
        } else {
            // Windows artifacts do not vary by architecture in this pipeline.
            Self {
                platform: Platform::Windows,
                arch: Arch::Unspecified,
                mode,
            }
        }
    }

    /// Target for the container-packaging path, used by the manifest subcommand.
    pub fn container(mode: Mode) -> Self {
        Self {
            platform: Platform::LinuxContainer,
            arch: Arch::Unspecified,
            mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(dev: bool, macos: bool, arch: Option<&str>) -> EnvSignals {
        EnvSignals {
            dev_build: dev,
            macos,
            machine_arch: arch.map(str::to_string),
        }
    }

    #[test]
    fn macos_apple_silicon() {
        let t = BuildTarget::from_signals(&signals(false, true, Some("aarch64")));
        assert_eq!(t.platform, Platform::MacOs);
        assert_eq!(t.arch, Arch::Arm64);
        assert_eq!(t.mode, Mode::Release);
    }

    #[test]
    fn macos_unknown_arch_falls_back_to_x86_64() {
        let t = BuildTarget::from_signals(&signals(false, true, Some("sparc64")));
        assert_eq!(t.arch, Arch::X86_64);

        let t = BuildTarget::from_signals(&signals(false, true, None));
        assert_eq!(t.arch, Arch::X86_64);
    }

    #[test]
    fn windows_ignores_architecture_probe() {
        let t = BuildTarget::from_signals(&signals(false, false, Some("aarch64")));
        assert_eq!(t.platform, Platform::Windows);
        assert_eq!(t.arch, Arch::Unspecified);
    }

    #[test]
    fn dev_flag_selects_development_mode() {
        let t = BuildTarget::from_signals(&signals(true, false, None));
        assert_eq!(t.mode, Mode::Development);
    }
}
