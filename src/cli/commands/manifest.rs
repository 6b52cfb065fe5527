//! `manifest` subcommand: the container packaging path.
//!
//! Renders the build manifest that the external container builder consumes.
//! Module resolution, fetching and building are delegated to that builder;
//! this command only performs the substitution step.

use crate::cli::ManifestArgs;
use crate::error::Result;
use crate::pipeline::manifest::{self, ManifestVars, SourceEntry};
use crate::pipeline::target::{BuildTarget, EnvSignals, Mode};

/// Renders the container build manifest to the requested output file.
pub async fn run(args: &ManifestArgs) -> Result<i32> {
    let signals = EnvSignals::from_env();
    let mode = if signals.dev_build {
        Mode::Development
    } else {
        Mode::Release
    };
    let target = BuildTarget::container(mode);
    log::info!("Rendering container manifest for {:?}", target);

    let mut vars = ManifestVars::default();
    for (key, value) in [
        ("skytemple_rev", &args.skytemple_rev),
        ("skytemple_rust_rev", &args.skytemple_rust_rev),
        ("armips_rev", &args.armips_rev),
        ("requirements_sha256", &args.requirements_sha256),
    ] {
        vars.strings.insert(key.to_string(), value.clone());
    }
    vars.groups.insert(
        "python-requirements".to_string(),
        load_requirement_sources(args).await?,
    );

    let rendered = manifest::render(&vars)?;

    let json = serde_json::to_vec_pretty(&rendered)?;
    tokio::fs::write(&args.output, &json).await?;

    log::info!("Manifest written to {}", args.output.display());
    println!("{}", args.output.display());
    Ok(0)
}

/// Loads the expanded Python dependency source entries.
///
/// Each entry is resolved externally (by the dependency-lockfile exporter) to
/// a concrete archive URL plus checksum; a built-in minimal set covers local
/// builds without that exporter.
async fn load_requirement_sources(args: &ManifestArgs) -> Result<Vec<SourceEntry>> {
    if let Some(path) = &args.requirements_sources {
        let bytes = tokio::fs::read(path).await?;
        let entries: Vec<SourceEntry> = serde_json::from_slice(&bytes)?;
        return Ok(entries);
    }

    Ok(vec![
        SourceEntry::Archive {
            url: "https://files.pythonhosted.org/packages/source/e/explorerscript/explorerscript-0.1.2.tar.gz"
                .into(),
            sha256: "a6eebdc52a419f7a4e38693b8b4f26e3a1b8ba0a9e3e67c27984b92dcfd56df5".into(),
        },
        SourceEntry::Archive {
            url: "https://files.pythonhosted.org/packages/source/p/pmdsky-debug-py/pmdsky-debug-py-8.0.5.tar.gz"
                .into(),
            sha256: "2f5e6a4f1a6ac42ff44ad04e232ce1b6f9bbf1f1e0ed1c5a41d9d4fb0e7e063b".into(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ManifestArgs,
    }

    fn manifest_args(extra: &[&str]) -> ManifestArgs {
        let mut argv = vec![
            "test",
            "--skytemple-rev",
            "1.6.3",
            "--skytemple-rust-rev",
            "1.6.2",
            "--requirements-sha256",
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        ];
        argv.extend_from_slice(extra);
        Wrapper::parse_from(argv).args
    }

    #[tokio::test]
    async fn renders_manifest_to_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("manifest.json");
        let mut args = manifest_args(&[]);
        args.output = out.clone();

        let code = run(&args).await.unwrap();
        assert_eq!(code, 0);

        let json: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&out).await.unwrap()).unwrap();
        assert_eq!(json["app-id"], "org.skytemple.SkyTemple");
        assert_eq!(json["modules"][3]["sources"][0]["tag"], "1.6.3");
    }

    #[tokio::test]
    async fn reads_requirement_sources_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().join("sources.json");
        tokio::fs::write(
            &sources,
            serde_json::to_vec(&vec![SourceEntry::Archive {
                url: "https://files.example/only-dep-1.0.tar.gz".into(),
                sha256: "aa".repeat(32),
            }])
            .unwrap(),
        )
        .await
        .unwrap();

        let mut args = manifest_args(&[]);
        args.requirements_sources = Some(sources);
        let entries = load_requirement_sources(&args).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], SourceEntry::Archive { url, .. }
            if url.contains("only-dep")));
    }
}
